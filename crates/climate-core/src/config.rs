//! Configuration management for the climate viewer.
//!
//! Loads configuration from ${CLIMATE_HOME}/config.toml with sensible defaults.

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::timeline::{
    DEFAULT_PLAYBACK_INTERVAL, DEFAULT_START_YEAR, TimelineController, TimelineError,
};

/// Environment variable overriding the API base URL.
pub const API_BASE_URL_ENV: &str = "CLIMATE_API_BASE_URL";

/// Environment variable overriding the map tiles token.
pub const MAPBOX_TOKEN_ENV: &str = "MAPBOX_ACCESS_TOKEN";

/// Returns the default config template with comments.
///
/// Embedded from default_config.toml at compile time.
fn default_config_template() -> &'static str {
    include_str!("../default_config.toml")
}

pub mod paths {
    //! Path resolution for configuration.
    //!
    //! CLIMATE_HOME resolution order:
    //! 1. CLIMATE_HOME environment variable (if set)
    //! 2. ~/.config/climate (default)
    //! 3. ./.climate when no home directory can be determined

    use std::path::PathBuf;

    /// Returns the climate viewer home directory.
    pub fn climate_home() -> PathBuf {
        if let Ok(home) = std::env::var("CLIMATE_HOME") {
            return PathBuf::from(home);
        }

        dirs::home_dir().map_or_else(
            || PathBuf::from(".climate"),
            |h| h.join(".config").join("climate"),
        )
    }

    /// Returns the path to the config.toml file.
    pub fn config_path() -> PathBuf {
        climate_home().join("config.toml")
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the climate data API
    pub api_base_url: Option<String>,

    /// First selectable year of the timeline
    pub start_year: i32,

    /// Milliseconds between playback steps (0 uses the default)
    pub playback_interval_ms: u64,

    /// Timeout for API requests in seconds (0 disables)
    pub request_timeout_secs: u32,

    /// Map tiles access token, passed through to the rendering layer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mapbox_access_token: Option<String>,
}

impl Config {
    pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8000";
    const DEFAULT_REQUEST_TIMEOUT_SECS: u32 = 30;

    /// Loads configuration from the default config path.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load() -> Result<Self> {
        Self::load_from(&paths::config_path())
    }

    /// Loads configuration from a specific path.
    /// Returns defaults if file doesn't exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let contents = fs::read_to_string(path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            toml::from_str(&contents)
                .with_context(|| format!("Failed to parse config from {}", path.display()))
        } else {
            Ok(Config::default())
        }
    }

    /// Creates a default config file at the given path.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be written.
    pub fn init(path: &Path) -> Result<()> {
        if path.exists() {
            anyhow::bail!("Config file already exists at {}", path.display());
        }

        Self::write_config(path, default_config_template())
    }

    /// Resolves the API base URL with precedence: env > config > default.
    ///
    /// # Errors
    /// Returns an error if the chosen URL is not well-formed.
    pub fn effective_api_base_url(&self) -> Result<String> {
        resolve_base_url(self.api_base_url.as_deref(), API_BASE_URL_ENV)
    }

    /// Resolves the map tiles token with precedence: env > config.
    pub fn effective_mapbox_access_token(&self) -> Option<String> {
        std::env::var(MAPBOX_TOKEN_ENV)
            .ok()
            .or_else(|| self.mapbox_access_token.clone())
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
    }

    /// Playback tick period. Zero falls back to the default.
    pub fn playback_interval(&self) -> Duration {
        if self.playback_interval_ms == 0 {
            DEFAULT_PLAYBACK_INTERVAL
        } else {
            Duration::from_millis(self.playback_interval_ms)
        }
    }

    /// Request timeout, or `None` when disabled.
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0)
            .then(|| Duration::from_secs(u64::from(self.request_timeout_secs)))
    }

    /// Builds a timeline spanning `start_year` through the current year.
    ///
    /// # Errors
    /// Returns `TimelineError::EmptyRange` if `start_year` is in the future.
    pub fn timeline(&self) -> Result<TimelineController, TimelineError> {
        TimelineController::through_current_year(self.start_year, self.playback_interval())
    }

    /// Writes config content to a file, creating parent directories as needed.
    /// Uses atomic write (temp file + rename) to prevent corruption.
    fn write_config(path: &Path, content: &str) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        let tmp_path = path.with_extension("toml.tmp");
        fs::write(&tmp_path, content)
            .with_context(|| format!("Failed to write config to {}", tmp_path.display()))?;
        fs::rename(&tmp_path, path).with_context(|| {
            format!(
                "Failed to rename {} to {}",
                tmp_path.display(),
                path.display()
            )
        })?;

        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: None,
            start_year: DEFAULT_START_YEAR,
            playback_interval_ms: DEFAULT_PLAYBACK_INTERVAL.as_millis() as u64,
            request_timeout_secs: Self::DEFAULT_REQUEST_TIMEOUT_SECS,
            mapbox_access_token: None,
        }
    }
}

/// Resolves a base URL with precedence: env > config > default.
fn resolve_base_url(config_base_url: Option<&str>, env_var: &str) -> Result<String> {
    let env_url = std::env::var(env_var).ok();
    pick_base_url(env_url.as_deref(), config_base_url)
}

fn pick_base_url(env_url: Option<&str>, config_url: Option<&str>) -> Result<String> {
    for candidate in [env_url, config_url].into_iter().flatten() {
        let trimmed = candidate.trim();
        if !trimmed.is_empty() {
            validate_url(trimmed)?;
            return Ok(trimmed.to_string());
        }
    }
    Ok(Config::DEFAULT_API_BASE_URL.to_string())
}

/// Validates that a URL is well-formed.
fn validate_url(url: &str) -> Result<()> {
    url::Url::parse(url).with_context(|| format!("Invalid API base URL: {url}"))?;
    Ok(())
}
