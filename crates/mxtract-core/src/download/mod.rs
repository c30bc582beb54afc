//! 下载模块
//!
//! 把占位缩略图保存到本地下载目录。下载是"发出即忘"的：调用方拿不到结果，
//! 成功或失败只写入日志。

mod saver;

pub use saver::HttpSaver;

use crate::media::MediaItem;
use async_trait::async_trait;
use log::{info, warn};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

/// 批量下载时相邻两次触发的间隔
pub const DOWNLOAD_STAGGER: Duration = Duration::from_millis(200);

/// 下载错误
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("unexpected HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("failed to write file: {0}")]
    Io(#[from] std::io::Error),
}

/// 一次文件保存请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadRequest {
    pub url: String,
    pub file_name: String,
}

impl DownloadRequest {
    pub fn for_item(item: &MediaItem) -> Self {
        Self {
            url: item.thumbnail.clone(),
            file_name: item.file_name(),
        }
    }
}

/// 文件保存后端
#[async_trait]
pub trait MediaSaver: Send + Sync {
    /// 保存文件，返回最终路径
    async fn save(&self, request: DownloadRequest) -> Result<PathBuf, DownloadError>;
}

/// 触发单个条目的下载，不等待结果
pub fn spawn_download(saver: Arc<dyn MediaSaver>, item: &MediaItem) -> JoinHandle<()> {
    let request = DownloadRequest::for_item(item);
    tokio::spawn(async move {
        let file_name = request.file_name.clone();
        match saver.save(request).await {
            Ok(path) => info!("Saved {} to {}", file_name, path.display()),
            Err(e) => warn!("Download of {} failed: {}", file_name, e),
        }
    })
}

/// 依次触发所有条目的下载，每次间隔 [`DOWNLOAD_STAGGER`]
///
/// 各次下载互不等待；返回的句柄在最后一次触发后结束，
/// 其结果是每个条目的下载句柄，需要等待保存完成的调用方可以逐个 await。
pub fn spawn_download_all(
    saver: Arc<dyn MediaSaver>,
    items: Vec<MediaItem>,
) -> JoinHandle<Vec<JoinHandle<()>>> {
    tokio::spawn(async move {
        let mut downloads = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            if index > 0 {
                tokio::time::sleep(DOWNLOAD_STAGGER).await;
            }
            downloads.push(spawn_download(Arc::clone(&saver), item));
        }
        downloads
    })
}
