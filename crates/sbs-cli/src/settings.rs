//! User settings, persisted as TOML.
//!
//! Settings are read once at startup. A missing or unreadable file falls
//! back to the defaults so a broken config never blocks a review.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use sbs_core::{BoardOptions, DEFAULT_CHANNELS, DEFAULT_SELECTED_LABEL};
use sbs_ingest::ImportOptions;
use sbs_persistence::AutoSaveConfig;

// =============================================================================
// ROOT SETTINGS
// =============================================================================

/// Application settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Spreadsheet import and header mapping.
    pub import: ImportOptions,

    /// Channel catalog, tabs and selection labels.
    pub board: BoardSettings,

    /// Auto-save next to the spreadsheet.
    pub autosave: AutoSaveConfig,

    /// Batched URL opening.
    pub urls: UrlSettings,

    /// Table output.
    pub display: DisplaySettings,
}

impl Settings {
    /// Load settings from `path`, or from the default location.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path.map_or_else(Self::config_path, Path::to_path_buf);
        Self::load_from(&path)
    }

    /// Load settings from a specific path.
    pub fn load_from(path: &Path) -> Self {
        let Ok(content) = std::fs::read_to_string(path) else {
            tracing::debug!(path = %path.display(), "no settings file, using defaults");
            return Self::default();
        };
        match toml::from_str(&content) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    %error,
                    "settings file is invalid, using defaults"
                );
                Self::default()
            }
        }
    }

    /// Save settings to a specific path.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("failed to create config directory {}", parent.display())
            })?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content)
            .with_context(|| format!("failed to write settings to {}", path.display()))
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("failed to serialize settings")
    }

    /// Get the default config file path.
    pub fn config_path() -> PathBuf {
        directories::ProjectDirs::from("com", "SelectionBoardStudio", "SBS")
            .map(|dirs| dirs.config_dir().join("settings.toml"))
            .unwrap_or_else(|| PathBuf::from("settings.toml"))
    }
}

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoardSettings {
    /// Channels offered by the channel filter.
    pub channel_catalog: Vec<String>,

    /// Category tabs created on load.
    pub max_auto_tabs: usize,

    /// Product recorded when a row is selected without a category filter.
    pub selected_label: String,
}

impl Default for BoardSettings {
    fn default() -> Self {
        Self {
            channel_catalog: DEFAULT_CHANNELS.iter().map(ToString::to_string).collect(),
            max_auto_tabs: 5,
            selected_label: DEFAULT_SELECTED_LABEL.to_string(),
        }
    }
}

impl BoardSettings {
    pub fn options(&self) -> BoardOptions {
        BoardOptions {
            channel_catalog: self.channel_catalog.clone(),
            max_auto_tabs: self.max_auto_tabs,
            selected_label: self.selected_label.clone(),
            ..BoardOptions::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UrlSettings {
    /// URLs opened per batch.
    pub batch_size: usize,

    /// Pause between batches, in milliseconds.
    pub delay_ms: u64,
}

impl Default for UrlSettings {
    fn default() -> Self {
        Self {
            batch_size: 20,
            delay_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplaySettings {
    /// Columns shown by `show` and written by `export`. Empty means all.
    pub columns: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_uses_defaults() {
        let settings = Settings::load_from(Path::new("/nonexistent/settings.toml"));
        assert_eq!(settings, Settings::default());
        assert_eq!(settings.urls.batch_size, 20);
        assert_eq!(settings.autosave.interval_ms, 30_000);
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(
            &path,
            "[board]\nchannel_catalog = [\"블로그\", \"틱톡\"]\n\n[urls]\ndelay_ms = 500\n",
        )
        .unwrap();

        let settings = Settings::load_from(&path);
        assert_eq!(settings.board.channel_catalog, vec!["블로그", "틱톡"]);
        assert_eq!(settings.board.max_auto_tabs, 5);
        assert_eq!(settings.urls.delay_ms, 500);
        assert_eq!(settings.urls.batch_size, 20);
        assert!(settings.import.format_phone_numbers);
    }

    #[test]
    fn test_invalid_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        std::fs::write(&path, "[urls\nbatch_size = ").unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("settings.toml");
        let mut settings = Settings::default();
        settings.display.columns = vec!["이름 및 닉네임".to_string(), "URL".to_string()];
        settings.autosave.suffix = "_중간저장".to_string();

        settings.save_to(&path).unwrap();
        assert_eq!(Settings::load_from(&path), settings);
    }

    #[test]
    fn test_board_options_from_settings() {
        let board = BoardSettings {
            max_auto_tabs: 2,
            ..BoardSettings::default()
        };
        let options = board.options();
        assert_eq!(options.max_auto_tabs, 2);
        assert_eq!(options.channel_catalog.len(), 5);
        assert_eq!(options.primary_view, BoardOptions::default().primary_view);
    }
}
