//! 应用配置和持久化
//!
//! 提供下载目录、启动模式等设置的存储和读取。

use crate::input::InputMode;
use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 应用设置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppSettings {
    /// 下载目录
    pub download_dir: PathBuf,
    /// 启动时的输入模式
    pub start_mode: InputMode,
    /// 是否显示字符雨背景
    pub rain: bool,
    /// 详细日志模式
    pub verbose: bool,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            download_dir: dirs::download_dir().unwrap_or_else(|| PathBuf::from(".")),
            start_mode: InputMode::Single,
            rain: true,
            verbose: false,
        }
    }
}

impl AppSettings {
    /// 获取配置文件路径
    pub fn config_path() -> PathBuf {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("mxtract");
        config_dir.join("settings.toml")
    }

    /// 加载设置（如果文件不存在则使用默认值）
    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// 加载设置，读取或解析失败时记录警告并使用默认值
    pub fn load_from(path: &Path) -> Self {
        Self::try_load_from(path).unwrap_or_else(|e| {
            log::warn!("{:#}, using defaults", e);
            Self::default()
        })
    }

    /// 加载设置，失败时返回错误而不是回退
    ///
    /// 供日志系统尚未就绪的调用方使用，由调用方决定何时报告错误。
    pub fn try_load() -> anyhow::Result<Self> {
        Self::try_load_from(&Self::config_path())
    }

    /// 文件不存在时返回默认值
    pub fn try_load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        let settings = toml::from_str(&content)
            .with_context(|| format!("Failed to parse settings {}", path.display()))?;
        debug!("Loaded settings from {:?}", path);
        Ok(settings)
    }

    /// 保存设置
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path())
    }

    /// 序列化为 TOML 文本
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_toml()?)?;
        debug!("Saved settings to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_settings() {
        let settings = AppSettings::default();
        assert_eq!(settings.start_mode, InputMode::Single);
        assert!(settings.rain);
        assert!(!settings.verbose);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let settings = AppSettings {
            download_dir: PathBuf::from("/tmp/media"),
            start_mode: InputMode::Batch,
            rain: false,
            verbose: true,
        };
        settings.save_to(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("start_mode = \"batch\""), "{content}");
        assert_eq!(AppSettings::load_from(&path), settings);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "rain = false\n").unwrap();

        let settings = AppSettings::load_from(&path);
        assert!(!settings.rain);
        assert_eq!(settings.start_mode, InputMode::Single);
    }

    #[test]
    fn test_invalid_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "rain = \"maybe\"").unwrap();
        assert_eq!(AppSettings::load_from(&path), AppSettings::default());
        assert_eq!(
            AppSettings::load_from(&dir.path().join("missing.toml")),
            AppSettings::default()
        );
    }

    #[test]
    fn test_try_load_reports_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "rain = \"maybe\"").unwrap();

        let err = AppSettings::try_load_from(&path).unwrap_err();
        assert!(format!("{err:#}").contains("Failed to parse settings"), "{err:#}");

        let missing = AppSettings::try_load_from(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(missing, AppSettings::default());
    }
}
