//! 链接输入面板状态
//!
//! 单链接 / 批量两种模式互斥，各自保留独立的文本，切换模式不会清空另一方。

use crate::platform::Platform;
use serde::{Deserialize, Serialize};

/// 输入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    #[default]
    Single,
    Batch,
}

impl InputMode {
    /// 模式切换按钮文本
    pub fn label(&self) -> &'static str {
        match self {
            InputMode::Single => "SINGLE_LINK",
            InputMode::Batch => "BATCH_MODE",
        }
    }

    /// 输入框上方的提示标签
    pub fn prompt(&self) -> &'static str {
        match self {
            InputMode::Single => "PASTE_MEDIA_LINK:",
            InputMode::Batch => "PASTE_MULTIPLE_LINKS:",
        }
    }

    /// 空输入时的占位提示
    pub fn placeholder(&self) -> &'static [&'static str] {
        match self {
            InputMode::Single => &["https://instagram.com/p/..."],
            InputMode::Batch => &[
                "// Paste one link per line",
                "https://instagram.com/p/...",
                "https://tiktok.com/@user/video/...",
                "https://twitter.com/user/status/...",
            ],
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            InputMode::Single => InputMode::Batch,
            InputMode::Batch => InputMode::Single,
        }
    }
}

/// 两种模式下的原始输入文本
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LinkInput {
    mode: InputMode,
    single: String,
    batch: String,
}

impl LinkInput {
    pub fn new(mode: InputMode) -> Self {
        Self {
            mode,
            ..Default::default()
        }
    }

    pub fn mode(&self) -> InputMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: InputMode) {
        self.mode = mode;
    }

    /// 当前模式的文本
    pub fn text(&self) -> &str {
        self.text_for(self.mode)
    }

    pub fn text_for(&self, mode: InputMode) -> &str {
        match mode {
            InputMode::Single => &self.single,
            InputMode::Batch => &self.batch,
        }
    }

    fn text_mut(&mut self) -> &mut String {
        match self.mode {
            InputMode::Single => &mut self.single,
            InputMode::Batch => &mut self.batch,
        }
    }

    /// 替换当前模式的文本
    pub fn set_text(&mut self, text: impl Into<String>) {
        let mut text = text.into();
        if self.mode == InputMode::Single {
            text.retain(|c| c != '\n' && c != '\r');
        }
        *self.text_mut() = text;
    }

    pub fn push_char(&mut self, c: char) {
        if c == '\n' {
            self.newline();
        } else {
            self.text_mut().push(c);
        }
    }

    /// 追加粘贴的文本；单链接模式下去掉换行
    pub fn push_str(&mut self, s: &str) {
        match self.mode {
            InputMode::Single => self
                .single
                .extend(s.chars().filter(|c| *c != '\n' && *c != '\r')),
            InputMode::Batch => self.batch.extend(s.chars().filter(|c| *c != '\r')),
        }
    }

    /// 仅批量模式插入换行
    pub fn newline(&mut self) {
        if self.mode == InputMode::Batch {
            self.batch.push('\n');
        }
    }

    pub fn backspace(&mut self) {
        self.text_mut().pop();
    }

    pub fn clear(&mut self) {
        self.text_mut().clear();
    }

    /// 单链接模式且有输入时返回识别出的平台
    pub fn platform(&self) -> Option<Platform> {
        (self.mode == InputMode::Single && !self.single.is_empty())
            .then(|| Platform::detect(&self.single))
    }

    /// 批量模式行号栏的行数，至少为 1
    pub fn line_count(&self) -> usize {
        self.batch.split('\n').count().max(1)
    }

    /// 当前模式下的有效链接（去掉空白行）
    pub fn links(&self) -> Vec<String> {
        collect_links(self.text(), self.mode)
    }
}

/// 按模式拆分输入并丢弃空白条目
pub fn collect_links(text: &str, mode: InputMode) -> Vec<String> {
    let entries: Vec<&str> = match mode {
        InputMode::Single => vec![text],
        InputMode::Batch => text.split('\n').collect(),
    };
    entries
        .into_iter()
        .filter(|entry| !entry.trim().is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_switch_preserves_text() {
        let mut input = LinkInput::new(InputMode::Single);
        input.set_text("https://instagram.com/p/abc");
        input.set_mode(InputMode::Batch);
        assert_eq!(input.text(), "");
        input.push_str("a\nb");
        input.set_mode(InputMode::Single);
        assert_eq!(input.text(), "https://instagram.com/p/abc");
        assert_eq!(input.text_for(InputMode::Batch), "a\nb");
    }

    #[test]
    fn test_platform_only_in_single_mode() {
        let mut input = LinkInput::new(InputMode::Single);
        assert_eq!(input.platform(), None);
        input.set_text("https://example.com");
        assert_eq!(input.platform(), Some(Platform::Unknown));
        input.set_text("https://www.instagram.com/p/x");
        assert_eq!(input.platform(), Some(Platform::Instagram));
        input.set_mode(InputMode::Batch);
        input.set_text("https://www.instagram.com/p/x");
        assert_eq!(input.platform(), None);
    }

    #[test]
    fn test_line_count() {
        let mut input = LinkInput::new(InputMode::Batch);
        assert_eq!(input.line_count(), 1);
        input.push_str("a");
        assert_eq!(input.line_count(), 1);
        input.newline();
        assert_eq!(input.line_count(), 2);
        input.push_str("b\n\nc");
        assert_eq!(input.line_count(), 4);
    }

    #[test]
    fn test_single_mode_strips_newlines() {
        let mut input = LinkInput::new(InputMode::Single);
        input.push_str("https://x.com/\na\r\n");
        input.newline();
        assert_eq!(input.text(), "https://x.com/a");
    }

    #[test]
    fn test_collect_links_drops_blank_entries() {
        assert!(collect_links("", InputMode::Single).is_empty());
        assert!(collect_links("   \t", InputMode::Single).is_empty());
        assert!(collect_links("\n  \n\t\n", InputMode::Batch).is_empty());
        assert_eq!(
            collect_links("a\n \nb\n", InputMode::Batch),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(collect_links(" a ", InputMode::Single), vec![" a ".to_string()]);
    }

    #[test]
    fn test_backspace_and_clear() {
        let mut input = LinkInput::new(InputMode::Batch);
        input.push_str("ab\n");
        input.backspace();
        assert_eq!(input.text(), "ab");
        input.clear();
        assert_eq!(input.text(), "");
    }
}
