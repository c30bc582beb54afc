//! UI rendering module

use crate::app::{App, EXTRACTION_LOG};
use crate::effects::{ACCENT, PANEL_BG, Rain, ScanLines, title_spans};
use mxtract_core::{InputMode, LogLevel, MediaCard, Platform};
use ratatui::{
    prelude::*,
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};
use std::time::Instant;

const CONTENT_WIDTH: u16 = 100;
const CARD_WIDTH: u16 = 30;
const CARD_HEIGHT: u16 = 9;
const BATCH_ROWS: u16 = 6;
const DIM_ACCENT: Color = Color::Rgb(0, 140, 36);

pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    let now = Instant::now();

    if let Some(rain) = &app.rain {
        frame.render_widget(Rain(rain), area);
    }

    let content = centered(area, CONTENT_WIDTH);
    let results_height = if app.grid.is_empty() {
        0
    } else {
        results_height(app, content.width)
    };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),                    // Header
            Constraint::Length(terminal_height(app)), // Terminal window
            Constraint::Length(results_height),       // Results
            Constraint::Min(3),                       // System log
            Constraint::Length(1),                    // Footer
        ])
        .split(content);

    draw_header(frame, app, chunks[0]);
    draw_terminal(frame, app, chunks[1], now);
    if !app.grid.is_empty() {
        draw_results(frame, app, chunks[2]);
    }
    draw_log(frame, app, chunks[3]);
    draw_footer(frame, chunks[4]);

    frame.render_widget(ScanLines, area);
}

fn centered(area: Rect, width: u16) -> Rect {
    let width = width.min(area.width);
    Rect {
        x: area.x + (area.width - width) / 2,
        width,
        ..area
    }
}

fn panel(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(DIM_ACCENT))
        .title(Span::styled(title, Style::default().fg(ACCENT)))
        .style(Style::default().bg(PANEL_BG))
}

fn draw_header(frame: &mut Frame, app: &App, area: Rect) {
    let title = title_spans("MEDIA_EXTRACTOR", app.glitch, &mut rand::thread_rng());
    let mut first = vec![Span::styled("⬡ ", Style::default().fg(ACCENT))];
    first.extend(title.spans);

    let lines = vec![
        Line::default(),
        Line::from(first),
        Line::from(vec![
            Span::styled("[", Style::default().fg(DIM_ACCENT)),
            Span::styled(
                "EXTRACT // DOWNLOAD // LIBERATE",
                Style::default().fg(ACCENT),
            ),
            Span::styled("]", Style::default().fg(DIM_ACCENT)),
        ]),
    ];

    frame.render_widget(Clear, area);
    frame.render_widget(
        Paragraph::new(lines)
            .alignment(Alignment::Center)
            .style(Style::default().bg(PANEL_BG)),
        area,
    );
}

fn input_rows(app: &App) -> u16 {
    match app.extractor.state().input.mode() {
        InputMode::Single => 1,
        InputMode::Batch => BATCH_ROWS,
    }
}

fn terminal_height(app: &App) -> u16 {
    // 模式切换、标签、输入框(含边框)、提示、按钮、提取日志 + 外框
    let log_rows = if app.extractor.state().extracting {
        EXTRACTION_LOG.len() as u16
    } else {
        0
    };
    1 + 1 + (input_rows(app) + 2) + 1 + 1 + log_rows + 2
}

fn draw_terminal(frame: &mut Frame, app: &App, area: Rect, now: Instant) {
    let state = app.extractor.state();
    let block = panel(" ● ● ●  neo@matrix:~/extractor ");
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),                   // Mode toggle
            Constraint::Length(1),                   // Label
            Constraint::Length(input_rows(app) + 2), // Input
            Constraint::Length(1),                   // Hint
            Constraint::Length(1),                   // Button
            Constraint::Min(0),                      // Extraction log
        ])
        .split(inner);

    // Mode toggle
    let mode = state.input.mode();
    let toggle = |m: InputMode, icon: &'static str| {
        let style = if m == mode {
            Style::default().fg(Color::Black).bg(ACCENT).bold()
        } else {
            Style::default().fg(DIM_ACCENT)
        };
        Span::styled(format!(" {icon} {} ", m.label()), style)
    };
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            toggle(InputMode::Single, "◉"),
            Span::raw("  "),
            toggle(InputMode::Batch, "◎"),
            Span::styled("   [Tab]", Style::default().fg(DIM_ACCENT)),
        ])),
        chunks[0],
    );

    // Label + platform badge
    let mut label = vec![
        Span::styled("> ", Style::default().fg(ACCENT)),
        Span::styled(mode.prompt(), Style::default().fg(ACCENT).bold()),
    ];
    if let Some(platform) = state.input.platform() {
        label.push(Span::raw(" "));
        label.push(platform_badge(platform));
    }
    frame.render_widget(Paragraph::new(Line::from(label)), chunks[1]);

    draw_input(frame, app, chunks[2]);

    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("◈ ", Style::default().fg(ACCENT)),
            Span::styled(Platform::supported_hint(), Style::default().fg(DIM_ACCENT)),
        ])),
        chunks[3],
    );

    // Extract button
    let button = if state.extracting {
        Span::styled(
            format!(" {} EXTRACTING_DATA... ", spinner()),
            Style::default().fg(Color::Black).bg(DIM_ACCENT).bold(),
        )
    } else {
        Span::styled(
            " ⟁ INITIATE_EXTRACTION [Enter/F5] ",
            Style::default().fg(Color::Black).bg(ACCENT).bold(),
        )
    };
    frame.render_widget(
        Paragraph::new(Line::from(button)).alignment(Alignment::Center),
        chunks[4],
    );

    if state.extracting {
        let lines: Vec<Line> = EXTRACTION_LOG
            .iter()
            .take(app.visible_log_lines(now))
            .map(|text| {
                Line::from(vec![
                    Span::styled("> ", Style::default().fg(ACCENT)),
                    Span::styled(*text, Style::default().fg(DIM_ACCENT)),
                ])
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), chunks[5]);
    }
}

fn platform_badge(platform: Platform) -> Span<'static> {
    let color = if platform == Platform::Unknown {
        DIM_ACCENT
    } else {
        ACCENT
    };
    Span::styled(format!("[{}]", platform.label()), Style::default().fg(color).bold())
}

fn spinner() -> char {
    const FRAMES: [char; 4] = ['◐', '◓', '◑', '◒'];
    let frame = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map(|d| d.as_millis() / 120)
        .unwrap_or_default();
    FRAMES[(frame % FRAMES.len() as u128) as usize]
}

fn draw_input(frame: &mut Frame, app: &App, area: Rect) {
    let input = &app.extractor.state().input;
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(DIM_ACCENT));
    let inner = block.inner(area);
    frame.render_widget(block, area);

    let text_style = Style::default().fg(ACCENT);
    let placeholder_style = Style::default().fg(Color::Rgb(0, 90, 24)).italic();
    let cursor = Span::styled(
        if app.cursor_visible { "_" } else { " " },
        Style::default().fg(ACCENT).bold(),
    );

    match input.mode() {
        InputMode::Single => {
            let mut spans = vec![Span::styled("$ ", Style::default().fg(DIM_ACCENT))];
            if input.text().is_empty() {
                spans.push(cursor);
                spans.push(Span::styled(
                    InputMode::Single.placeholder()[0],
                    placeholder_style,
                ));
            } else {
                // 只显示能放下的尾部
                let room = usize::from(inner.width.saturating_sub(3));
                let text = tail(input.text(), room);
                spans.push(Span::styled(text.to_string(), text_style));
                spans.push(cursor);
            }
            frame.render_widget(Paragraph::new(Line::from(spans)), inner);
        }
        InputMode::Batch => {
            let chunks = Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Length(3), Constraint::Min(1)])
                .split(inner);

            let rows = usize::from(inner.height);
            let line_count = input.line_count();
            let skip = line_count.saturating_sub(rows);

            let gutter: Vec<Line> = (skip..line_count)
                .map(|i| {
                    Line::from(Span::styled(
                        format!("{:02}", i + 1),
                        Style::default().fg(DIM_ACCENT),
                    ))
                })
                .collect();
            frame.render_widget(Paragraph::new(gutter), chunks[0]);

            let lines: Vec<Line> = if input.text().is_empty() {
                InputMode::Batch
                    .placeholder()
                    .iter()
                    .map(|l| Line::from(Span::styled(*l, placeholder_style)))
                    .collect()
            } else {
                let segments: Vec<&str> = input.text().split('\n').collect();
                let last = segments.len() - 1;
                segments
                    .into_iter()
                    .enumerate()
                    .skip(skip)
                    .map(|(i, seg)| {
                        let mut spans = vec![Span::styled(seg.to_string(), text_style)];
                        if i == last {
                            spans.push(cursor.clone());
                        }
                        Line::from(spans)
                    })
                    .collect()
            };
            frame.render_widget(Paragraph::new(lines), chunks[1]);
        }
    }
}

/// 取字符串末尾最多 `max` 个字符
fn tail(text: &str, max: usize) -> &str {
    let count = text.chars().count();
    if count <= max {
        return text;
    }
    let start = text
        .char_indices()
        .nth(count - max)
        .map_or(0, |(i, _)| i);
    &text[start..]
}

fn cards_per_row(width: u16) -> usize {
    usize::from((width.saturating_sub(2) / CARD_WIDTH).max(1))
}

fn results_height(app: &App, width: u16) -> u16 {
    let rows = app.grid.len().div_ceil(cards_per_row(width));
    rows as u16 * CARD_HEIGHT + 2
}

fn draw_results(frame: &mut Frame, app: &App, area: Rect) {
    let title = format!(" ▶ EXTRACTED_MEDIA [{}] ", app.grid.len());
    let block = panel(&title).title_bottom(
        Line::from(Span::styled(
            " ⬇ DOWNLOAD_ALL [Ctrl+A] · ⬇ SELECTED [Ctrl+D] · ↑/↓ select ",
            Style::default().fg(DIM_ACCENT),
        ))
        .right_aligned(),
    );
    let inner = block.inner(area);
    frame.render_widget(Clear, area);
    frame.render_widget(block, area);

    let per_row = cards_per_row(area.width);
    for card in app.grid.cards() {
        if !card.visible {
            continue;
        }
        let col = (card.index % per_row) as u16;
        let row = (card.index / per_row) as u16;
        let rect = Rect {
            x: inner.x + col * CARD_WIDTH,
            y: inner.y + row * CARD_HEIGHT,
            width: CARD_WIDTH.min(inner.width),
            height: CARD_HEIGHT,
        }
        .intersection(inner);
        if rect.height == 0 || rect.width == 0 {
            continue;
        }
        let selected = card.index == app.grid.selected_index();
        draw_card(frame, card, selected, rect);
    }
}

fn draw_card(frame: &mut Frame, card: &MediaCard, selected: bool, area: Rect) {
    let border = if selected {
        Style::default().fg(Color::Rgb(200, 255, 210)).bold()
    } else {
        Style::default().fg(DIM_ACCENT)
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Thick)
        .border_style(border)
        .title(Span::styled(
            format!(" {} ", card.item.kind.badge()),
            Style::default().fg(ACCENT),
        ));
    let block = if selected {
        block.title_bottom(Line::from(" ⬇ DOWNLOAD ").centered())
    } else {
        block
    };
    let inner = block.inner(area);
    frame.render_widget(block, area);

    // 缩略图占位 + 扫描线
    let thumb_rows: u16 = 3;
    let scan_row = if card.is_scanning() {
        Some(u16::from(card.scan_progress) * thumb_rows / 100)
    } else {
        None
    };
    let width = usize::from(inner.width);
    let mut lines: Vec<Line> = (0..thumb_rows)
        .map(|r| {
            if scan_row == Some(r) {
                Line::from(Span::styled(
                    "━".repeat(width),
                    Style::default().fg(ACCENT).bold(),
                ))
            } else {
                let pattern = ["░▒▓", "▒▓░", "▓░▒"][usize::from(r) % 3];
                let fill: String = pattern.chars().cycle().take(width).collect();
                Line::from(Span::styled(fill, Style::default().fg(Color::Rgb(0, 70, 20))))
            }
        })
        .collect();

    let label = Style::default().fg(DIM_ACCENT);
    lines.push(Line::from(vec![
        Span::styled("PLATFORM: ", label),
        Span::styled(card.item.platform.clone(), Style::default().fg(ACCENT)),
    ]));
    lines.push(Line::from(vec![
        Span::styled("STATUS:   ", label),
        Span::styled("EXTRACTED", Style::default().fg(ACCENT).bold()),
    ]));
    lines.push(Line::from(Span::styled(
        "█".repeat(width),
        Style::default().fg(ACCENT),
    )));

    frame.render_widget(Paragraph::new(lines), inner);
}

fn draw_log(frame: &mut Frame, app: &App, area: Rect) {
    let rows = usize::from(area.height.saturating_sub(2));
    let skip = app.logs.len().saturating_sub(rows);
    let lines: Vec<Line> = app
        .logs
        .iter()
        .skip(skip)
        .map(|entry| {
            let color = match entry.level {
                LogLevel::Error => Color::Rgb(255, 60, 60),
                LogLevel::Warn => Color::Rgb(255, 200, 0),
                LogLevel::Info => ACCENT,
                LogLevel::Debug | LogLevel::Trace => DIM_ACCENT,
            };
            Line::from(vec![
                Span::styled(format!("{} ", entry.level.prefix()), Style::default().fg(color)),
                Span::styled(entry.message.clone(), Style::default().fg(color)),
            ])
        })
        .collect();

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(panel(" SYSTEM_LOG ")), area);
}

fn draw_footer(frame: &mut Frame, area: Rect) {
    frame.render_widget(
        Paragraph::new(Line::from(vec![
            Span::styled("[Esc] exit  ·  [Ctrl+L] clear  ·  ", Style::default().fg(DIM_ACCENT)),
            Span::styled("mxtract", Style::default().fg(ACCENT)),
        ]))
        .alignment(Alignment::Center)
        .style(Style::default().bg(PANEL_BG)),
        area,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use mxtract_core::{AppSettings, MediaItem};
    use ratatui::backend::TestBackend;

    fn app() -> App {
        App::new(
            AppSettings {
                download_dir: std::env::temp_dir(),
                rain: false,
                ..Default::default()
            },
            120,
            50,
        )
    }

    fn render(app: &App) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 50)).unwrap();
        terminal.draw(|f| draw(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn test_tail() {
        assert_eq!(tail("abcdef", 3), "def");
        assert_eq!(tail("ab", 3), "ab");
        assert_eq!(tail("ｱｲｳｴ", 2), "ｳｴ");
    }

    #[test]
    fn test_cards_per_row() {
        assert_eq!(cards_per_row(100), 3);
        assert_eq!(cards_per_row(20), 1);
    }

    #[test]
    fn test_renders_platform_badge() {
        let mut app = app();
        app.extractor.set_input("https://www.instagram.com/p/x");
        let screen = render(&app);
        assert!(screen.contains("[INSTAGRAM]"));
        assert!(screen.contains("PASTE_MEDIA_LINK:"));
    }

    #[test]
    fn test_batch_gutter_numbers() {
        let mut app = app();
        app.extractor.toggle_mode();
        app.extractor.paste("a\nb\nc");
        let screen = render(&app);
        assert!(screen.contains("PASTE_MULTIPLE_LINKS:"));
        assert!(screen.contains("03"));
        assert!(!screen.contains("[UNKNOWN]"));
    }

    #[test]
    fn test_renders_visible_cards() {
        let mut app = app();
        let now = Instant::now();
        app.grid.push(MediaItem::synthesize(1, 0), now);
        app.grid.push(MediaItem::synthesize(1, 1), now);
        app.grid.tick(now + std::time::Duration::from_secs(2));
        let screen = render(&app);
        assert!(screen.contains("EXTRACTED_MEDIA [2]"));
        assert!(screen.contains("Instagram"));
        assert!(screen.contains("TikTok"));
        assert!(screen.contains("▶ VIDEO"));
    }
}
