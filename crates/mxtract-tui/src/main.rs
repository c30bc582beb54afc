//! mxtract TUI - 交互式终端界面
//!
//! 使用 ratatui 渲染字符雨背景、链接输入面板和提取结果网格。
//!
//! # 日志
//!
//! 日志默认显示在界面底部的 SYSTEM_LOG 面板中。
//! 如需输出到文件进行调试，设置 RUST_LOG 环境变量：
//!
//! ```bash
//! RUST_LOG=debug cargo run -p mxtract-tui 2>> /tmp/mxtract.log
//! ```

mod app;
mod effects;
mod tui_log;
mod ui;

use anyhow::Result;
use crossterm::{
    event::{
        self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use mxtract_core::AppSettings;
use ratatui::prelude::*;
use std::io;
use std::time::{Duration, Instant};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use app::App;
use tui_log::TuiLogLayer;

/// 主循环最长等待时间
const MAX_FRAME_WAIT: Duration = Duration::from_millis(50);

#[tokio::main]
async fn main() -> Result<()> {
    // 日志系统就绪前不能输出警告，先保留加载错误
    let (settings, settings_error) = match AppSettings::try_load() {
        Ok(settings) => (settings, None),
        Err(e) => (AppSettings::default(), Some(e)),
    };

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableBracketedPaste)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let app = App::new(settings, size.width, size.height);

    // 初始化日志系统，发送到 TUI 日志面板
    init_logging(app.event_tx.clone(), app.settings.verbose);
    if let Some(e) = settings_error {
        tracing::warn!("{:#}, using defaults", e);
    }

    // Run app
    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableBracketedPaste
    )?;
    terminal.show_cursor()?;

    res
}

/// 初始化日志系统
///
/// - 总是将日志发送到 TUI 日志面板
/// - 如果设置了 RUST_LOG，同时输出到 stderr（用于调试）
fn init_logging(log_tx: tokio::sync::mpsc::Sender<app::AppEvent>, verbose: bool) {
    // 桥接 log crate（mxtract-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    let tui_layer = TuiLogLayer::new(log_tx);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info,mxtract_core=debug")
        }
    });

    if std::env::var("RUST_LOG").is_ok() {
        use tracing_subscriber::fmt;

        let stderr_layer = fmt::layer()
            .with_writer(io::stderr)
            .with_target(true)
            .compact();

        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tui_layer)
            .with(stderr_layer)
            .try_init();
    } else {
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(tui_layer)
            .try_init();
    }
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|f| ui::draw(f, &app))?;

        // 等到下一个定时器到期，但不超过一帧
        let wait = app.time_until_next_timer(Instant::now()).min(MAX_FRAME_WAIT);
        if event::poll(wait)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(&mut app, key),
                Event::Paste(text) => app.extractor.paste(&text),
                Event::Resize(width, height) => app.resize(width, height),
                _ => {}
            }
        }

        if app.should_quit {
            return Ok(());
        }

        // Update app state (handle async events)
        app.tick(Instant::now());
    }
}

fn handle_key(app: &mut App, key: KeyEvent) {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => app.should_quit = true,
        KeyCode::Char('c') if ctrl => app.should_quit = true,
        KeyCode::Char('e') if ctrl => app.start_extraction(),
        KeyCode::Char('a') if ctrl => app.download_all(),
        KeyCode::Char('d') if ctrl => app.download_selected(),
        KeyCode::Char('l') if ctrl => app.extractor.clear_input(),
        KeyCode::F(5) => app.start_extraction(),
        KeyCode::Tab | KeyCode::BackTab => app.extractor.toggle_mode(),
        KeyCode::Enter => app.submit_or_newline(),
        KeyCode::Backspace => app.extractor.backspace(),
        KeyCode::Up => app.grid.select_previous(),
        KeyCode::Down => app.grid.select_next(),
        KeyCode::Char(c) if !ctrl => app.extractor.push_char(c),
        _ => {}
    }
}
