//! 字符雨背景效果
//!
//! 与渲染后端无关的纯状态：每列一个下落位置，外加一块逐帧衰减的拖尾缓冲，
//! 由 UI 以固定频率调用 [`RainField::step`]。

use rand::Rng;
use std::time::Duration;

/// 刷新间隔
pub const RAIN_TICK: Duration = Duration::from_millis(50);
/// 每列占用的字符格宽度
pub const COLUMN_WIDTH: u16 = 2;
/// 每帧拖尾保留的亮度比例
const FADE: f32 = 0.95;
/// 低于该亮度的拖尾格子被清除
const FADE_CUTOFF: f32 = 0.05;

/// 字形集合：半角片假名、数字、大写字母和符号（全部为单宽字符）
pub const GLYPHS: &[char] = &[
    'ｱ', 'ｲ', 'ｳ', 'ｴ', 'ｵ', 'ｶ', 'ｷ', 'ｸ', 'ｹ', 'ｺ', 'ｻ', 'ｼ', 'ｽ', 'ｾ', 'ｿ', 'ﾀ', 'ﾁ', 'ﾂ',
    'ﾃ', 'ﾄ', 'ﾅ', 'ﾆ', 'ﾇ', 'ﾈ', 'ﾉ', 'ﾊ', 'ﾋ', 'ﾌ', 'ﾍ', 'ﾎ', 'ﾏ', 'ﾐ', 'ﾑ', 'ﾒ', 'ﾓ', 'ﾔ',
    'ﾕ', 'ﾖ', 'ﾗ', 'ﾘ', 'ﾙ', 'ﾚ', 'ﾛ', 'ﾜ', 'ｦ', 'ﾝ', '0', '1', '2', '3', '4', '5', '6', '7',
    '8', '9', 'A', 'B', 'C', 'D', 'E', 'F', 'G', 'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O', 'P',
    'Q', 'R', 'S', 'T', 'U', 'V', 'W', 'X', 'Y', 'Z', '<', '>', '{', '}', '[', ']', '|', '/',
    '\\',
];

/// 字形色调
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tone {
    /// 少量纯白高亮
    White,
    /// 偶尔出现的强调色
    Bright,
    /// 半透明强调色，alpha 取值 0.3..0.7
    Dim(f32),
}

impl Tone {
    fn pick<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let brightness: f32 = rng.r#gen();
        if brightness > 0.98 {
            Tone::White
        } else if brightness > 0.9 {
            Tone::Bright
        } else {
            Tone::Dim(0.3 + rng.r#gen::<f32>() * 0.4)
        }
    }
}

/// 拖尾缓冲中的一个格子
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RainCell {
    pub glyph: char,
    pub tone: Tone,
    /// 1.0 为刚绘制，逐帧衰减
    pub intensity: f32,
}

/// 字符雨状态
#[derive(Debug, Clone)]
pub struct RainField {
    width: u16,
    height: u16,
    /// 每列当前下落位置（行，可为负）
    drops: Vec<f32>,
    trail: Vec<Option<RainCell>>,
}

impl RainField {
    pub fn new<R: Rng + ?Sized>(width: u16, height: u16, rng: &mut R) -> Self {
        let mut field = Self {
            width: 0,
            height: 0,
            drops: Vec::new(),
            trail: Vec::new(),
        };
        field.resize(width, height, rng);
        field
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn columns(&self) -> usize {
        self.drops.len()
    }

    /// 视口变化时重新计算列数
    ///
    /// 已有列保留位置，新增列从视口上方随机位置开始；拖尾缓冲重建。
    pub fn resize<R: Rng + ?Sized>(&mut self, width: u16, height: u16, rng: &mut R) {
        if width == self.width && height == self.height {
            return;
        }
        let columns = usize::from(width / COLUMN_WIDTH);
        self.drops.truncate(columns);
        while self.drops.len() < columns {
            self.drops.push(rng.r#gen::<f32>() * -100.0);
        }
        self.width = width;
        self.height = height;
        self.trail = vec![None; usize::from(width) * usize::from(height)];
    }

    /// 推进一帧
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for cell in &mut self.trail {
            if let Some(c) = cell {
                c.intensity *= FADE;
                if c.intensity < FADE_CUTOFF {
                    *cell = None;
                }
            }
        }

        let height = f32::from(self.height);
        for (col, drop) in self.drops.iter_mut().enumerate() {
            let glyph = GLYPHS[rng.gen_range(0..GLYPHS.len())];
            let tone = Tone::pick(rng);

            if *drop >= 0.0 && *drop < height {
                let x = col * usize::from(COLUMN_WIDTH);
                let y = *drop as usize;
                if let Some(slot) = self.trail.get_mut(y * usize::from(self.width) + x) {
                    *slot = Some(RainCell {
                        glyph,
                        tone,
                        intensity: 1.0,
                    });
                }
            }

            if *drop > height && rng.r#gen::<f32>() > 0.975 {
                *drop = 0.0;
            }
            *drop += 0.5 + rng.r#gen::<f32>() * 0.5;
        }
    }

    /// 读取某个格子
    pub fn cell(&self, x: u16, y: u16) -> Option<RainCell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.trail[usize::from(y) * usize::from(self.width) + usize::from(x)]
    }

    /// 遍历所有非空格子 `(x, y, cell)`
    pub fn cells(&self) -> impl Iterator<Item = (u16, u16, RainCell)> + '_ {
        let width = usize::from(self.width.max(1));
        self.trail.iter().enumerate().filter_map(move |(i, cell)| {
            cell.map(|c| ((i % width) as u16, (i / width) as u16, c))
        })
    }
}
