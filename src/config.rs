use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::baseline::BaselineWindow;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Application metadata
    pub metadata: ConfigMetadata,

    /// General application settings
    pub settings: AppSettings,

    /// Recovery engine settings
    pub engine: EngineSettings,
}

/// Configuration metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    /// Configuration format version
    pub version: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modification timestamp
    pub updated_at: DateTime<Utc>,
}

/// General application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    /// Data directory path (holds the sample database)
    pub data_dir: PathBuf,

    /// Athlete used when none is given on the command line
    pub default_athlete: Option<String>,
}

/// Recovery engine settings
///
/// Only the baseline window is configurable. The component weights
/// (sleep 40%, HRV 35%, load 25%) are fixed constants: they must sum to
/// exactly 1.0 for the score bounds to hold, so they are deliberately
/// not exposed here.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSettings {
    /// Trailing baseline window length in days
    pub window_days: u32,

    /// Whether the target date's record participates in the baseline
    pub include_target: bool,
}

impl Default for EngineSettings {
    fn default() -> Self {
        EngineSettings {
            window_days: 30,
            include_target: true,
        }
    }
}

impl From<&EngineSettings> for BaselineWindow {
    fn from(settings: &EngineSettings) -> Self {
        BaselineWindow {
            days: settings.window_days,
            include_target: settings.include_target,
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        let now = Utc::now();
        AppConfig {
            metadata: ConfigMetadata {
                version: "1.0".to_string(),
                created_at: now,
                updated_at: now,
            },
            settings: AppSettings {
                data_dir: default_data_dir(),
                default_athlete: None,
            },
            engine: EngineSettings::default(),
        }
    }
}

impl AppConfig {
    /// Default configuration file location for this platform.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(config_dir.join("recoverrs").join("config.toml"))
    }

    /// Load configuration from a file, or defaults when it doesn't exist.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(AppConfig::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration, refreshing the updated-at timestamp.
    pub fn save<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        self.metadata.updated_at = Utc::now();

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;
        Ok(())
    }

    /// Path of the sample database inside the data directory.
    pub fn database_path(&self) -> PathBuf {
        self.settings.data_dir.join("recoverrs.db")
    }
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("recoverrs"))
        .unwrap_or_else(|| PathBuf::from(".recoverrs"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_engine_settings() {
        let config = AppConfig::default();
        assert_eq!(config.engine.window_days, 30);
        assert!(config.engine.include_target);
    }

    #[test]
    fn test_engine_settings_to_window() {
        let settings = EngineSettings {
            window_days: 14,
            include_target: false,
        };
        let window = BaselineWindow::from(&settings);

        assert_eq!(window.days, 14);
        assert!(!window.include_target);
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(dir.path().join("nope.toml")).unwrap();
        assert_eq!(config.engine.window_days, 30);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        config.settings.default_athlete = Some("athlete_1".to_string());
        config.engine.window_days = 21;
        config.save(&path).unwrap();

        let loaded = AppConfig::load(&path).unwrap();
        assert_eq!(loaded.settings.default_athlete.as_deref(), Some("athlete_1"));
        assert_eq!(loaded.engine.window_days, 21);
    }

    #[test]
    fn test_save_refreshes_updated_at() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = AppConfig::default();
        let created = config.metadata.created_at;
        config.save(&path).unwrap();

        assert!(config.metadata.updated_at >= created);
    }
}
