//! Application state

use mxtract_core::{
    AppSettings, Extractor, HttpSaver, LogEntry, LogLevel, MediaSaver, RainField, ResultGrid,
    Scheduler, Update, spawn_download, spawn_download_all,
};
use rand::Rng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// 标题故障效果的检查间隔
const GLITCH_CHECK: Duration = Duration::from_secs(3);
/// 故障效果持续时间
const GLITCH_DURATION: Duration = Duration::from_millis(200);
/// 输入光标闪烁间隔
const CURSOR_BLINK: Duration = Duration::from_millis(530);
/// 提取日志逐行出现的间隔
const LOG_LINE_STAGGER: Duration = Duration::from_millis(400);
/// 日志面板保留的最大条数
const MAX_LOGS: usize = 200;

/// 提取进行中显示的日志行
pub const EXTRACTION_LOG: [&str; 3] = [
    "Establishing connection...",
    "Bypassing security protocols...",
    "Extracting media assets...",
];

/// 发往主循环的异步事件
#[derive(Debug)]
pub enum AppEvent {
    LogMessage { level: LogLevel, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum UiTimer {
    Rain,
    GlitchCheck,
    GlitchEnd,
    CursorBlink,
}

pub struct App {
    pub settings: AppSettings,
    pub extractor: Extractor,
    pub grid: ResultGrid,
    pub rain: Option<RainField>,
    pub logs: Vec<LogEntry>,
    pub glitch: bool,
    pub cursor_visible: bool,
    pub run_started: Option<Instant>,
    pub should_quit: bool,
    pub event_tx: mpsc::Sender<AppEvent>,
    event_rx: mpsc::Receiver<AppEvent>,
    saver: Arc<dyn MediaSaver>,
    timers: Scheduler<UiTimer>,
}

impl App {
    pub fn new(settings: AppSettings, width: u16, height: u16) -> Self {
        let (event_tx, event_rx) = mpsc::channel(256);
        let now = Instant::now();

        let mut timers = Scheduler::new();
        timers.schedule_after(now, GLITCH_CHECK, UiTimer::GlitchCheck);
        timers.schedule_after(now, CURSOR_BLINK, UiTimer::CursorBlink);

        let rain = settings.rain.then(|| {
            timers.schedule_after(now, mxtract_core::rain::RAIN_TICK, UiTimer::Rain);
            RainField::new(width, height, &mut rand::thread_rng())
        });

        Self {
            extractor: Extractor::new(settings.start_mode),
            saver: Arc::new(HttpSaver::new(settings.download_dir.clone())),
            settings,
            grid: ResultGrid::new(),
            rain,
            logs: vec![
                LogEntry::new(LogLevel::Info, "mxtract TUI 启动"),
                LogEntry::new(
                    LogLevel::Info,
                    "Tab 切换模式, Enter/F5 提取, Ctrl+A 全部下载, Esc 退出",
                ),
            ],
            glitch: false,
            cursor_visible: true,
            run_started: None,
            should_quit: false,
            event_tx,
            event_rx,
            timers,
        }
    }

    pub fn add_log(&mut self, level: LogLevel, message: impl Into<String>) {
        self.logs.push(LogEntry::new(level, message));
        if self.logs.len() > MAX_LOGS {
            let excess = self.logs.len() - MAX_LOGS;
            self.logs.drain(..excess);
        }
    }

    pub fn start_extraction(&mut self) {
        if self.extractor.start_extraction() {
            self.grid.clear();
            self.run_started = Some(Instant::now());
        }
    }

    /// 单链接模式下 Enter 直接提取，批量模式下换行
    pub fn submit_or_newline(&mut self) {
        match self.extractor.state().input.mode() {
            mxtract_core::InputMode::Single => self.start_extraction(),
            mxtract_core::InputMode::Batch => self.extractor.newline(),
        }
    }

    pub fn download_selected(&mut self) {
        if let Some(item) = self.grid.selected().map(|card| card.item.clone()) {
            self.add_log(LogLevel::Info, format!("Downloading {}", item.file_name()));
            spawn_download(Arc::clone(&self.saver), &item);
        }
    }

    pub fn download_all(&mut self) {
        let items = self.grid.items();
        if items.is_empty() {
            return;
        }
        self.add_log(
            LogLevel::Info,
            format!(
                "Downloading {} items to {}",
                items.len(),
                self.settings.download_dir.display()
            ),
        );
        spawn_download_all(Arc::clone(&self.saver), items);
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        if let Some(rain) = self.rain.as_mut() {
            rain.resize(width, height, &mut rand::thread_rng());
        }
    }

    /// 提取进行中已显示的日志行数
    pub fn visible_log_lines(&self, now: Instant) -> usize {
        self.run_started.map_or(0, |start| {
            let elapsed = now.saturating_duration_since(start);
            let shown = (elapsed.as_millis() / LOG_LINE_STAGGER.as_millis()) as usize + 1;
            shown.min(EXTRACTION_LOG.len())
        })
    }

    /// 距离下一个定时器到期的时间，用于主循环的事件等待
    pub fn time_until_next_timer(&self, now: Instant) -> Duration {
        self.timers
            .next_deadline()
            .map_or(Duration::from_millis(100), |deadline| {
                deadline.saturating_duration_since(now)
            })
    }

    /// Update app state (handle async events and timers)
    pub fn tick(&mut self, now: Instant) {
        while let Ok(event) = self.event_rx.try_recv() {
            match event {
                AppEvent::LogMessage { level, message } => self.add_log(level, message),
            }
        }

        for update in self.extractor.poll() {
            match update {
                Update::Appended(item) => self.grid.push(item, now),
                Update::Finished => self.run_started = None,
            }
        }
        self.grid.tick(now);

        for (deadline, timer) in self.timers.poll_due(now) {
            self.fire(timer, deadline, now);
        }
    }

    fn fire(&mut self, timer: UiTimer, deadline: Instant, now: Instant) {
        match timer {
            UiTimer::Rain => {
                if let Some(rain) = self.rain.as_mut() {
                    rain.step(&mut rand::thread_rng());
                }
                // 卡顿时不补帧，直接从当前时间重新计时
                let next = (deadline + mxtract_core::rain::RAIN_TICK).max(now);
                self.timers.schedule_at(next, UiTimer::Rain);
            }
            UiTimer::GlitchCheck => {
                if rand::thread_rng().r#gen::<f64>() > 0.7 {
                    self.glitch = true;
                    self.timers
                        .schedule_after(now, GLITCH_DURATION, UiTimer::GlitchEnd);
                }
                self.timers
                    .schedule_after(deadline, GLITCH_CHECK, UiTimer::GlitchCheck);
            }
            UiTimer::GlitchEnd => self.glitch = false,
            UiTimer::CursorBlink => {
                self.cursor_visible = !self.cursor_visible;
                self.timers
                    .schedule_after(deadline, CURSOR_BLINK, UiTimer::CursorBlink);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> AppSettings {
        AppSettings {
            download_dir: std::env::temp_dir(),
            rain: false,
            ..Default::default()
        }
    }

    #[test]
    fn test_log_lines_are_staggered() {
        let mut app = App::new(settings(), 80, 24);
        let t0 = Instant::now();
        assert_eq!(app.visible_log_lines(t0), 0);
        app.run_started = Some(t0);
        assert_eq!(app.visible_log_lines(t0), 1);
        assert_eq!(app.visible_log_lines(t0 + Duration::from_millis(450)), 2);
        assert_eq!(app.visible_log_lines(t0 + Duration::from_secs(5)), 3);
    }

    #[test]
    fn test_cursor_blinks() {
        let mut app = App::new(settings(), 80, 24);
        let t0 = Instant::now();
        assert!(app.cursor_visible);
        app.tick(t0 + CURSOR_BLINK + Duration::from_millis(5));
        assert!(!app.cursor_visible);
    }

    #[test]
    fn test_log_is_bounded() {
        let mut app = App::new(settings(), 80, 24);
        for i in 0..(MAX_LOGS + 50) {
            app.add_log(LogLevel::Debug, format!("line {i}"));
        }
        assert_eq!(app.logs.len(), MAX_LOGS);
        assert_eq!(app.logs.last().unwrap().message, format!("line {}", MAX_LOGS + 49));
    }

    #[test]
    fn test_log_events_are_collected() {
        let mut app = App::new(settings(), 80, 24);
        app.event_tx
            .try_send(AppEvent::LogMessage {
                level: LogLevel::Warn,
                message: "hello".to_string(),
            })
            .unwrap();
        app.tick(Instant::now());
        assert_eq!(app.logs.last().unwrap().message, "hello");
    }
}
