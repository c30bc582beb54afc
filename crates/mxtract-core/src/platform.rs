//! 平台识别
//!
//! 通过子串匹配猜测链接所属的社交平台，仅用于界面显示，不影响提取流程。

use serde::{Deserialize, Serialize};
use std::fmt;

/// 已知平台
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Platform {
    Instagram,
    TikTok,
    TwitterX,
    Facebook,
    YouTube,
    Reddit,
    Unknown,
}

/// 按优先级排列的匹配标记，先匹配者胜出
const MARKERS: &[(&str, Platform)] = &[
    ("instagram", Platform::Instagram),
    ("tiktok", Platform::TikTok),
    ("twitter", Platform::TwitterX),
    ("x.com", Platform::TwitterX),
    ("facebook", Platform::Facebook),
    ("youtube", Platform::YouTube),
    ("reddit", Platform::Reddit),
];

impl Platform {
    /// 提示行中列出的受支持平台
    pub const SUPPORTED: [Platform; 6] = [
        Platform::Instagram,
        Platform::TikTok,
        Platform::TwitterX,
        Platform::Facebook,
        Platform::YouTube,
        Platform::Reddit,
    ];

    /// 根据链接文本识别平台
    ///
    /// 大小写敏感的子串包含匹配；无匹配时返回 [`Platform::Unknown`]。
    pub fn detect(url: &str) -> Self {
        MARKERS
            .iter()
            .find(|(marker, _)| url.contains(marker))
            .map_or(Platform::Unknown, |(_, platform)| *platform)
    }

    /// 徽章标签（大写）
    pub fn label(&self) -> &'static str {
        match self {
            Platform::Instagram => "INSTAGRAM",
            Platform::TikTok => "TIKTOK",
            Platform::TwitterX => "TWITTER/X",
            Platform::Facebook => "FACEBOOK",
            Platform::YouTube => "YOUTUBE",
            Platform::Reddit => "REDDIT",
            Platform::Unknown => "UNKNOWN",
        }
    }

    /// 提示文本中使用的显示名称
    pub fn display_name(&self) -> &'static str {
        match self {
            Platform::Instagram => "Instagram",
            Platform::TikTok => "TikTok",
            Platform::TwitterX => "Twitter/X",
            Platform::Facebook => "Facebook",
            Platform::YouTube => "YouTube",
            Platform::Reddit => "Reddit",
            Platform::Unknown => "Unknown",
        }
    }

    /// "Supported: Instagram, TikTok, ..." 提示行
    pub fn supported_hint() -> String {
        let names: Vec<&str> = Self::SUPPORTED.iter().map(Platform::display_name).collect();
        format!("Supported: {}", names.join(", "))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_known_platforms() {
        assert_eq!(
            Platform::detect("https://www.instagram.com/p/x"),
            Platform::Instagram
        );
        assert_eq!(
            Platform::detect("https://www.tiktok.com/@user/video/1"),
            Platform::TikTok
        );
        assert_eq!(
            Platform::detect("https://x.com/user/status/1"),
            Platform::TwitterX
        );
        assert_eq!(
            Platform::detect("https://twitter.com/user/status/1"),
            Platform::TwitterX
        );
        assert_eq!(Platform::detect("https://youtube.com/watch?v=1"), Platform::YouTube);
        assert_eq!(Platform::detect("https://old.reddit.com/r/rust"), Platform::Reddit);
    }

    #[test]
    fn test_detect_unknown() {
        assert_eq!(Platform::detect("https://example.com"), Platform::Unknown);
        assert_eq!(Platform::detect(""), Platform::Unknown);
        assert_eq!(Platform::Unknown.label(), "UNKNOWN");
    }

    #[test]
    fn test_detect_is_case_sensitive() {
        assert_eq!(
            Platform::detect("https://INSTAGRAM.com/p/x"),
            Platform::Unknown
        );
    }

    #[test]
    fn test_first_marker_wins() {
        // instagram 排在 facebook 之前
        assert_eq!(
            Platform::detect("https://facebook.com/share?u=instagram"),
            Platform::Instagram
        );
        // 纯子串匹配："x.com" 同样命中 box.com
        assert_eq!(Platform::detect("https://box.com/f"), Platform::TwitterX);
    }

    #[test]
    fn test_supported_hint() {
        assert_eq!(
            Platform::supported_hint(),
            "Supported: Instagram, TikTok, Twitter/X, Facebook, YouTube, Reddit"
        );
    }
}
