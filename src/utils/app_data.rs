use crate::query::SearchMode;
use crate::session::SessionOptions;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const APP_NAME: &str = "arcview";
const CONFIG_FILE: &str = "config.json";
const LOG_FILE: &str = "arcview.log";

/// Environment variable naming the archive directory
pub const ARCHIVE_ENV: &str = "ARCVIEW_ARCHIVE";

/// Archive directory used when nothing else names one
pub const DEFAULT_ARCHIVE_DIR: &str = "public";

/// Application configuration stored in the app data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Archive directory to open when no `--archive` flag is given
    #[serde(default)]
    pub archive_dir: Option<PathBuf>,

    /// Search mode the list view starts in
    #[serde(default)]
    pub default_mode: SearchMode,

    /// Key that jumps to the next highlighted match in a conversation
    #[serde(default = "default_next_key")]
    pub next_key: char,

    /// Lines scrolled before the floating navigation appears
    #[serde(default = "default_nav_reveal_lines")]
    pub nav_reveal_lines: u16,
}

fn default_next_key() -> char {
    'n'
}

fn default_nav_reveal_lines() -> u16 {
    10
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            archive_dir: None,
            default_mode: SearchMode::default(),
            next_key: default_next_key(),
            nav_reveal_lines: default_nav_reveal_lines(),
        }
    }
}

impl AppConfig {
    /// Load config from the app data directory, or return default if not found
    pub fn load() -> Result<Self> {
        let config_path = get_config_path()?;
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
            let config: AppConfig = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file {}", config_path.display()))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    /// Engine options carried by this config
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            default_mode: self.default_mode,
            next_key: self.next_key,
            nav_reveal_offset: u32::from(self.nav_reveal_lines),
        }
    }

    /// Pick the archive directory: explicit flag, then environment, then
    /// config, then `./public`
    pub fn resolve_archive_dir(&self, flag: Option<&Path>) -> PathBuf {
        if let Some(dir) = flag {
            return dir.to_path_buf();
        }
        if let Some(dir) = std::env::var_os(ARCHIVE_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
        self.archive_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_ARCHIVE_DIR))
    }
}

/// Get the path to the config file
pub fn get_config_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(CONFIG_FILE))
}

/// Get the path of the interactive browser's log file
pub fn get_log_path() -> Result<PathBuf> {
    let app_dir = get_app_data_dir()?;
    Ok(app_dir.join(LOG_FILE))
}

/// Get the application data directory
pub fn get_app_data_dir() -> Result<PathBuf> {
    let base = if cfg!(target_os = "macos") {
        dirs::home_dir()
            .map(|h| h.join("Library").join("Application Support"))
    } else if cfg!(target_os = "windows") {
        dirs::data_local_dir()
    } else {
        // Linux/Unix: use XDG_DATA_HOME or ~/.local/share
        dirs::data_dir()
    };

    let base = base.context("Could not determine app data directory")?;
    let app_dir = base.join(APP_NAME);

    fs::create_dir_all(&app_dir)?;
    Ok(app_dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.archive_dir, None);
        assert_eq!(config.default_mode, SearchMode::Token);
        assert_eq!(config.next_key, 'n');
        assert_eq!(config.nav_reveal_lines, 10);
    }

    #[test]
    fn test_app_config_serialization() {
        let config = AppConfig {
            archive_dir: Some(PathBuf::from("/srv/archive")),
            default_mode: SearchMode::Substring,
            next_key: 'j',
            nav_reveal_lines: 4,
        };

        let json = serde_json::to_string(&config).unwrap();
        let parsed: AppConfig = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, config);
    }

    #[test]
    fn test_app_config_partial_json() {
        // Should use defaults for missing fields
        let json = r#"{"default_mode": "substring"}"#;
        let config: AppConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.default_mode, SearchMode::Substring);
        assert_eq!(config.next_key, 'n'); // default
    }

    #[test]
    fn test_app_config_empty_json() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_from(&dir.path().join(CONFIG_FILE)).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_load_invalid_file_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, "not json").unwrap();
        assert!(AppConfig::load_from(&path).is_err());
    }

    #[test]
    fn test_session_options() {
        let config = AppConfig {
            next_key: 'j',
            nav_reveal_lines: 3,
            ..AppConfig::default()
        };
        let options = config.session_options();
        assert_eq!(options.next_key, 'j');
        assert_eq!(options.nav_reveal_offset, 3);
        assert_eq!(options.default_mode, SearchMode::Token);
    }

    #[test]
    fn test_flag_wins() {
        let config = AppConfig {
            archive_dir: Some(PathBuf::from("from-config")),
            ..AppConfig::default()
        };
        assert_eq!(
            config.resolve_archive_dir(Some(Path::new("from-flag"))),
            PathBuf::from("from-flag")
        );
    }
}
