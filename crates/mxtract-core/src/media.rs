//! 媒体条目数据模型
//!
//! 每次"提取"得到的结果都由固定的占位模板池合成，与输入链接本身无关。

use serde::{Deserialize, Serialize};

/// 媒体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    /// 卡片角标
    pub fn badge(&self) -> &'static str {
        match self {
            MediaKind::Image => "◻ IMAGE",
            MediaKind::Video => "▶ VIDEO",
        }
    }
}

/// 占位模板
#[derive(Debug, Clone, Copy)]
pub struct MediaTemplate {
    pub kind: MediaKind,
    pub thumbnail: &'static str,
    pub platform: &'static str,
}

/// 固定的占位模板池，按索引取模循环使用
pub const SAMPLE_POOL: [MediaTemplate; 4] = [
    MediaTemplate {
        kind: MediaKind::Image,
        thumbnail: "https://picsum.photos/seed/matrix1/400/300",
        platform: "Instagram",
    },
    MediaTemplate {
        kind: MediaKind::Video,
        thumbnail: "https://picsum.photos/seed/matrix2/400/300",
        platform: "TikTok",
    },
    MediaTemplate {
        kind: MediaKind::Image,
        thumbnail: "https://picsum.photos/seed/matrix3/400/300",
        platform: "Twitter",
    },
    MediaTemplate {
        kind: MediaKind::Image,
        thumbnail: "https://picsum.photos/seed/matrix4/400/300",
        platform: "Facebook",
    },
];

/// 一条"已提取"的占位结果
///
/// 创建后不再修改。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaItem {
    pub id: String,
    pub kind: MediaKind,
    pub thumbnail: String,
    pub platform: String,
    pub extracted: bool,
}

impl MediaItem {
    /// 从模板池合成第 `index` 个结果
    ///
    /// `run_stamp` 标识本次提取，`"{run_stamp}-{index}"` 保证同一轮内 ID 唯一。
    pub fn synthesize(run_stamp: u64, index: usize) -> Self {
        let template = &SAMPLE_POOL[index % SAMPLE_POOL.len()];
        Self {
            id: format!("{run_stamp}-{index}"),
            kind: template.kind,
            thumbnail: template.thumbnail.to_string(),
            platform: template.platform.to_string(),
            extracted: true,
        }
    }

    /// 下载保存时使用的文件名
    pub fn file_name(&self) -> String {
        format!("matrix-extract-{}.jpg", self.id)
    }
}
