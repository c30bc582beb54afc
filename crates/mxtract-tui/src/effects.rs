//! 装饰效果：字符雨背景、扫描线覆盖层、标题故障
//!
//! 都只写入缓冲区，不读取也不修改应用状态。

use mxtract_core::rain::GLYPHS;
use mxtract_core::{RainField, Tone};
use rand::Rng;
use ratatui::prelude::*;

/// 强调色
pub const ACCENT: Color = Color::Rgb(0, 255, 65);
/// 面板背景
pub const PANEL_BG: Color = Color::Rgb(0, 8, 2);
/// 扫描线颜色
const SCANLINE_BG: Color = Color::Rgb(0, 14, 4);

fn scale(value: u8, factor: f32) -> u8 {
    (f32::from(value) * factor.clamp(0.0, 1.0)) as u8
}

/// 字符雨格子的前景色
pub fn tone_color(tone: Tone, intensity: f32) -> Color {
    let (r, g, b, alpha) = match tone {
        Tone::White => (255, 255, 255, 1.0),
        Tone::Bright => (0, 255, 65, 1.0),
        Tone::Dim(alpha) => (0, 255, 65, alpha),
    };
    let factor = alpha * intensity;
    Color::Rgb(scale(r, factor), scale(g, factor), scale(b, factor))
}

/// 字符雨背景
pub struct Rain<'a>(pub &'a RainField);

impl Widget for Rain<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for (x, y, cell) in self.0.cells() {
            if x >= area.width || y >= area.height {
                continue;
            }
            if let Some(target) = buf.cell_mut((area.x + x, area.y + y)) {
                target
                    .set_char(cell.glyph)
                    .set_fg(tone_color(cell.tone, cell.intensity));
            }
        }
    }
}

/// 静态扫描线覆盖层：隔行给空白格子加上暗色底
pub struct ScanLines;

impl Widget for ScanLines {
    fn render(self, area: Rect, buf: &mut Buffer) {
        for y in (area.top()..area.bottom()).filter(|y| y % 2 == 1) {
            for x in area.left()..area.right() {
                if let Some(cell) = buf.cell_mut((x, y))
                    && matches!(cell.bg, Color::Reset | Color::Black)
                {
                    cell.set_bg(SCANLINE_BG);
                }
            }
        }
    }
}

/// 标题文本；故障时随机替换部分字符并错开颜色
pub fn title_spans<R: Rng + ?Sized>(text: &str, glitch: bool, rng: &mut R) -> Line<'static> {
    let base = Style::default().fg(ACCENT).bold();
    if !glitch {
        return Line::from(Span::styled(text.to_string(), base));
    }

    let spans: Vec<Span<'static>> = text
        .chars()
        .map(|c| {
            let roll: f32 = rng.r#gen();
            if roll > 0.8 {
                let glyph = GLYPHS[rng.gen_range(0..GLYPHS.len())];
                Span::styled(glyph.to_string(), base.fg(Color::Rgb(255, 0, 85)))
            } else if roll > 0.6 {
                Span::styled(c.to_string(), base.fg(Color::Rgb(0, 255, 255)))
            } else {
                Span::styled(c.to_string(), base)
            }
        })
        .collect();
    Line::from(spans)
}
