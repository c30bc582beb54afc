//! 工作流模块
//!
//! 提供模拟提取流程及其状态控制器

pub mod controller;
pub mod extraction;

pub use controller::{Extractor, ExtractorState, RunEvent, Update};
pub use extraction::{
    MAX_DELAY, MAX_ITEMS_PER_RUN, MIN_DELAY, extraction_delay, extraction_stream, planned_items,
    run_stamp,
};
