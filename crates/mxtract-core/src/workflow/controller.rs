//! 提取控制器
//!
//! 唯一持有可变状态（输入文本、进行中标志、结果列表）的地方。
//! UI 只读取 [`Extractor::state`] 快照，并通过命令方法修改状态。

use super::extraction::{extraction_stream, planned_items, run_stamp};
use crate::input::{InputMode, LinkInput};
use crate::media::MediaItem;
use futures_util::StreamExt;
use log::{debug, info};
use tokio::sync::mpsc;
use tokio_util::sync::{CancellationToken, DropGuard};

/// 提取任务发回控制器的事件
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    Item(MediaItem),
    Finished,
}

/// [`Extractor::poll`] 返回的状态变化
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    Appended(MediaItem),
    Finished,
}

/// 控制器状态快照
#[derive(Debug, Clone, Default)]
pub struct ExtractorState {
    pub input: LinkInput,
    pub extracting: bool,
    pub results: Vec<MediaItem>,
}

struct ActiveRun {
    events: mpsc::Receiver<RunEvent>,
    // 控制器销毁时取消后台任务
    _guard: DropGuard,
}

/// 提取控制器
pub struct Extractor {
    state: ExtractorState,
    run: Option<ActiveRun>,
}

impl Extractor {
    pub fn new(mode: InputMode) -> Self {
        Self {
            state: ExtractorState {
                input: LinkInput::new(mode),
                ..Default::default()
            },
            run: None,
        }
    }

    pub fn state(&self) -> &ExtractorState {
        &self.state
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        self.state.input.set_mode(mode);
    }

    pub fn toggle_mode(&mut self) {
        let mode = self.state.input.mode().toggled();
        self.set_mode(mode);
    }

    /// 替换当前模式的输入文本
    pub fn set_input(&mut self, text: impl Into<String>) {
        self.state.input.set_text(text);
    }

    pub fn push_char(&mut self, c: char) {
        self.state.input.push_char(c);
    }

    pub fn paste(&mut self, text: &str) {
        self.state.input.push_str(text);
    }

    pub fn newline(&mut self) {
        self.state.input.newline();
    }

    pub fn backspace(&mut self) {
        self.state.input.backspace();
    }

    pub fn clear_input(&mut self) {
        self.state.input.clear();
    }

    /// 开始一次提取
    ///
    /// 没有有效链接或已有提取在进行时不做任何事并返回 `false`。
    /// 需要在 tokio 运行时中调用。
    pub fn start_extraction(&mut self) -> bool {
        if self.state.extracting {
            debug!("Extraction already running, ignoring");
            return false;
        }
        let links = self.state.input.links();
        if links.is_empty() {
            return false;
        }

        let count = planned_items(links.len());
        let stamp = run_stamp();
        info!(
            "Starting extraction run {} ({} links, {} items)",
            stamp,
            links.len(),
            count
        );

        self.state.extracting = true;
        self.state.results.clear();

        let (tx, rx) = mpsc::channel(count + 1);
        let token = CancellationToken::new();
        let cancelled = token.clone();
        tokio::spawn(async move {
            let mut items = std::pin::pin!(extraction_stream(count, stamp));
            loop {
                tokio::select! {
                    () = cancelled.cancelled() => {
                        debug!("Extraction run {} cancelled", stamp);
                        return;
                    }
                    next = items.next() => match next {
                        Some(item) => {
                            if tx.send(RunEvent::Item(item)).await.is_err() {
                                return;
                            }
                        }
                        None => break,
                    },
                }
            }
            let _ = tx.send(RunEvent::Finished).await;
        });

        self.run = Some(ActiveRun {
            events: rx,
            _guard: token.drop_guard(),
        });
        true
    }

    /// 追加一个结果
    pub fn append_result(&mut self, item: MediaItem) {
        debug!("Extracted {} ({})", item.id, item.platform);
        self.state.results.push(item);
    }

    /// 结束当前提取
    pub fn finish_extraction(&mut self) {
        if self.state.extracting {
            info!("Extraction finished: {} items", self.state.results.len());
        }
        self.state.extracting = false;
        self.run = None;
    }

    /// 处理后台任务发来的事件，返回本次发生的状态变化
    pub fn poll(&mut self) -> Vec<Update> {
        let mut events = Vec::new();
        if let Some(run) = self.run.as_mut() {
            while let Ok(event) = run.events.try_recv() {
                events.push(event);
            }
        }

        let mut updates = Vec::with_capacity(events.len());
        for event in events {
            match event {
                RunEvent::Item(item) => {
                    self.append_result(item.clone());
                    updates.push(Update::Appended(item));
                }
                RunEvent::Finished => {
                    self.finish_extraction();
                    updates.push(Update::Finished);
                }
            }
        }
        updates
    }
}
