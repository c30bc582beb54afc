//! mxtract Core Library
//!
//! "媒体提取器"终端模拟的核心实现：不做真正的网络提取，
//! 只在随机延迟后逐个产出占位结果。
//!
//! # 模块
//!
//! - **workflow**: 模拟提取流程和状态控制器
//! - **input / platform**: 链接输入面板状态和平台识别
//! - **grid**: 结果卡片的入场与扫描动画
//! - **rain**: 字符雨背景效果
//! - **download**: 占位缩略图的保存
//! - **timer**: 协作式定时器
//!
//! # 使用示例
//!
//! ```ignore
//! use mxtract_core::{Extractor, InputMode, Update};
//!
//! let mut extractor = Extractor::new(InputMode::Batch);
//! extractor.set_input("https://instagram.com/p/a\nhttps://tiktok.com/@u/video/1");
//! extractor.start_extraction();
//!
//! // 在 UI 循环中
//! for update in extractor.poll() {
//!     if let Update::Appended(item) = update {
//!         grid.push(item, Instant::now());
//!     }
//! }
//! ```

pub mod config;
pub mod download;
pub mod grid;
pub mod input;
pub mod logging;
pub mod media;
pub mod platform;
pub mod rain;
pub mod timer;
pub mod workflow;

pub use config::AppSettings;
pub use download::{
    DOWNLOAD_STAGGER, DownloadError, DownloadRequest, HttpSaver, MediaSaver, spawn_download,
    spawn_download_all,
};
pub use grid::{MediaCard, ResultGrid};
pub use input::{InputMode, LinkInput, collect_links};
pub use logging::{LogEntry, LogLevel};
pub use media::{MediaItem, MediaKind, SAMPLE_POOL};
pub use platform::Platform;
pub use rain::{RainCell, RainField, Tone};
pub use timer::{Scheduler, TimerId};
pub use workflow::{Extractor, ExtractorState, MAX_ITEMS_PER_RUN, Update, extraction_stream};
