use plotline_engine::{ObserverSettings, SerializeOptions};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Quiet period before a cursor move is mapped to a scene
    pub cursor_debounce_ms: u64,
    /// Quiet period before the whole document is re-analyzed
    pub reanalysis_debounce_ms: u64,
    /// Line written for scene breaks in plain-text files
    pub scene_break: String,
    /// Manuscript opened when no file is given on the command line
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manuscript_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cursor_debounce_ms: 300,
            reanalysis_debounce_ms: 2000,
            scene_break: SerializeOptions::DEFAULT_SCENE_BREAK.to_string(),
            manuscript_path: None,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Option<Self>, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let mut config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        // Expand shell variables and tilde in the loaded manuscript path
        config.manuscript_path = config
            .manuscript_path
            .map(|path| Self::expand_path(&path).unwrap_or(path));

        Ok(Some(config))
    }

    pub fn load() -> Result<Option<Self>, ConfigError> {
        let config_path = Self::config_path();
        Self::load_from_path(&config_path)
    }

    pub fn save_to_path<P: AsRef<Path>>(&self, config_path: P) -> anyhow::Result<()> {
        let config_path = config_path.as_ref();
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(config_path, content)?;
        Ok(())
    }

    pub fn save(&self) -> anyhow::Result<()> {
        let config_path = Self::config_path();
        self.save_to_path(&config_path)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/plotline");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    pub fn cursor_debounce(&self) -> Duration {
        Duration::from_millis(self.cursor_debounce_ms)
    }

    pub fn reanalysis_debounce(&self) -> Duration {
        Duration::from_millis(self.reanalysis_debounce_ms)
    }

    pub fn observer_settings(&self) -> ObserverSettings {
        ObserverSettings {
            cursor_quiet: self.cursor_debounce(),
            reanalysis_quiet: self.reanalysis_debounce(),
        }
    }

    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            scene_break: self.scene_break.clone(),
        }
    }

    fn expand_path(path: &Path) -> Option<PathBuf> {
        let path_str = path.to_string_lossy();
        match shellexpand::full(&path_str) {
            Ok(expanded) => Some(PathBuf::from(expanded.as_ref())),
            Err(_) => None,
        }
    }
}
