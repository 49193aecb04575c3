use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::session::{RecognitionSettings, SessionSettings};

const DEFAULT_CONFIG: &str = r#"[recognition]
lang = "fr-FR"
max_alternatives = 1

[session]
restart_delay_ms = 100
result_delay_ms = 50
wake_lock = true

[telemetry]
enabled = true
log_path = "~/.dictee/dictee.log"
"#;

#[derive(Debug, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub recognition: RecognitionConfig,
    pub session: SessionConfig,
    pub telemetry: TelemetryConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct RecognitionConfig {
    pub lang: String,
    pub max_alternatives: u32,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            lang: "fr-FR".to_owned(),
            max_alternatives: 1,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SessionConfig {
    pub restart_delay_ms: u64,
    pub result_delay_ms: u64,
    pub wake_lock: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            restart_delay_ms: 100,
            result_delay_ms: 50,
            wake_lock: true,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct TelemetryConfig {
    pub enabled: bool,
    pub log_path: String,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            log_path: "~/.dictee/dictee.log".to_owned(),
        }
    }
}

impl Config {
    /// Load config from ~/.dictee.toml
    ///
    /// # Errors
    /// Returns error if HOME is unset, or the file cannot be created, read or parsed
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if !config_path.exists() {
            Self::create_default(&config_path).context("failed to create default config")?;
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit path
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).context("failed to read config file")?;
        Self::from_toml(&contents)
    }

    /// Parse config from TOML text; missing keys take their defaults
    ///
    /// # Errors
    /// Returns error if the TOML is malformed or a value has the wrong type
    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("failed to parse config TOML")
    }

    /// Session tunables derived from this config
    #[must_use]
    pub fn session_settings(&self) -> SessionSettings {
        let mut recognition = RecognitionSettings::single_utterance(&self.recognition.lang);
        recognition.max_alternatives = self.recognition.max_alternatives.max(1);

        SessionSettings {
            recognition,
            restart_delay: Duration::from_millis(self.session.restart_delay_ms),
            result_delay: Duration::from_millis(self.session.result_delay_ms),
            wake_lock: self.session.wake_lock,
        }
    }

    fn config_path() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME environment variable not set")?;
        Ok(PathBuf::from(home).join(".dictee.toml"))
    }

    fn create_default(path: &Path) -> Result<()> {
        fs::write(path, DEFAULT_CONFIG).context("failed to write default config")?;
        Ok(())
    }

    /// Expand ~ in paths to home directory
    ///
    /// # Errors
    /// Returns error if the path starts with `~/` and HOME is unset
    pub fn expand_path(path: &str) -> Result<PathBuf> {
        if let Some(stripped) = path.strip_prefix("~/") {
            let home = std::env::var("HOME").context("HOME environment variable not set")?;
            Ok(PathBuf::from(home).join(stripped))
        } else {
            Ok(PathBuf::from(path))
        }
    }
}
