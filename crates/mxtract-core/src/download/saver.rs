//! 基于 HTTP 的保存后端

use super::{DownloadError, DownloadRequest, MediaSaver};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use std::path::{Path, PathBuf};

/// 下载到本地目录
pub struct HttpSaver {
    client: Client,
    output_dir: PathBuf,
}

impl HttpSaver {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            client: Client::builder()
                .user_agent(concat!("mxtract/", env!("CARGO_PKG_VERSION")))
                .build()
                .unwrap_or_default(),
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 保存路径；文件名中的路径分隔符被替换掉
    pub fn target_path(&self, file_name: &str) -> PathBuf {
        let sanitized: String = file_name
            .chars()
            .map(|c| if matches!(c, '/' | '\\') { '_' } else { c })
            .collect();
        self.output_dir.join(sanitized)
    }
}

#[async_trait]
impl MediaSaver for HttpSaver {
    async fn save(&self, request: DownloadRequest) -> Result<PathBuf, DownloadError> {
        tokio::fs::create_dir_all(&self.output_dir).await?;

        debug!("GET {}", request.url);
        let response = self.client.get(&request.url).send().await?;
        if !response.status().is_success() {
            return Err(DownloadError::Status(response.status()));
        }

        let bytes = response.bytes().await?;
        let path = self.target_path(&request.file_name);
        tokio::fs::write(&path, &bytes).await?;
        debug!("Wrote {} bytes to {:?}", bytes.len(), path);
        Ok(path)
    }
}
