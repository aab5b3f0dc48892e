//! Configuration management for Sightline
//!
//! Values come from the config file when present, otherwise from `SIGHTLINE_*`
//! environment variables and built-in defaults.
//!
//! Config file location: ~/.config/sightline/config.toml

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::warn;

use crate::core::error::{Result, SightlineError};
use crate::core::types::SearchConfig;

/// Main configuration for Sightline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Matcher worker configuration
    pub matcher: MatcherConfig,
    /// Image search defaults
    pub search: SearchSettings,
    /// Click/type behaviour
    #[serde(default)]
    pub interaction: InteractionConfig,
    /// Browser configuration
    pub browser: BrowserConfig,
    /// Whether to show debug output
    #[serde(default)]
    pub debug: bool,
}

/// Matcher worker process configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatcherConfig {
    /// Interpreter used to run the worker script
    pub python: String,
    /// Worker script to run instead of the bundled one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub script_path: Option<PathBuf>,
    /// How long to wait for the worker to exit on shutdown, in ms
    pub shutdown_timeout_ms: u64,
}

/// Defaults for image searches
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Minimum match confidence (0-1)
    pub threshold: f64,
    /// How long to keep retrying, in ms
    pub timeout_ms: u64,
    /// Delay between attempts, in ms
    pub poll_interval_ms: u64,
    /// Save screenshots of every attempt
    pub save_debug_image: bool,
    /// Where debug screenshots go
    pub debug_dir: PathBuf,
    /// Match on edge maps
    #[serde(default)]
    pub edge_mode: bool,
}

/// Click/type behaviour
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Pause between the click and text insertion, in ms
    pub settle_delay_ms: u64,
}

/// Browser automation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Session name for agent-browser
    pub session_name: String,
    /// Whether to run in headed mode (visible browser)
    pub headed: bool,
}

fn env_flag(key: &str) -> Option<bool> {
    env::var(key).ok().map(|v| v == "true" || v == "1")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            matcher: MatcherConfig::default(),
            search: SearchSettings::default(),
            interaction: InteractionConfig::default(),
            browser: BrowserConfig::default(),
            debug: env_flag("SIGHTLINE_DEBUG").unwrap_or(false),
        }
    }
}

impl Default for MatcherConfig {
    fn default() -> Self {
        Self {
            python: env::var("SIGHTLINE_PYTHON").unwrap_or_else(|_| "python3".to_string()),
            script_path: env::var("SIGHTLINE_WORKER_SCRIPT").ok().map(PathBuf::from),
            shutdown_timeout_ms: 2000,
        }
    }
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            threshold: env::var("SIGHTLINE_THRESHOLD")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(0.8),
            timeout_ms: env::var("SIGHTLINE_TIMEOUT_MS")
                .ok()
                .and_then(|t| t.parse().ok())
                .unwrap_or(30_000),
            poll_interval_ms: 1000,
            save_debug_image: env_flag("SIGHTLINE_DEBUG_IMAGES").unwrap_or(false),
            debug_dir: PathBuf::from("debug/image_search"),
            edge_mode: false,
        }
    }
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: 100,
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            session_name: env::var("SIGHTLINE_BROWSER_SESSION")
                .unwrap_or_else(|_| "sightline".to_string()),
            headed: env_flag("SIGHTLINE_BROWSER_HEADED").unwrap_or(false),
        }
    }
}

impl SearchSettings {
    /// Per-call search options built from these defaults
    pub fn search_config(&self) -> SearchConfig {
        SearchConfig {
            threshold: self.threshold,
            save_debug_image: self.save_debug_image,
            timeout: Duration::from_millis(self.timeout_ms),
            edge_mode: self.edge_mode,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

impl InteractionConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("sightline")
    }

    /// Get the config file path
    pub fn config_file() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Load configuration from file, environment, and defaults
    /// Priority: CLI args > config file > env vars > defaults
    pub fn load() -> Self {
        // Try to load .env file if it exists
        let _ = dotenvy::dotenv();

        Self::load_or_default(&Self::config_file())
    }

    /// Load `path` if it exists, otherwise env-backed defaults.
    ///
    /// A file that exists but cannot be used is logged and skipped.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match Self::read_file(path) {
            Ok(config) => config,
            Err(e) => {
                warn!("Ignoring config file {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// Load configuration from file only
    pub fn load_from_file() -> Result<Self> {
        let config_path = Self::config_file();

        if !config_path.exists() {
            return Err(SightlineError::config("Config file not found"));
        }
        Self::read_file(&config_path)
    }

    fn read_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| SightlineError::config(format!("Failed to read config: {}", e)))?;

        Self::from_toml(&content)
    }

    /// Parse configuration from TOML text
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)
            .map_err(|e| SightlineError::config(format!("Failed to parse config: {}", e)))?;

        config.search.search_config().validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<PathBuf> {
        let config_dir = Self::config_dir();
        let config_path = Self::config_file();

        if !config_dir.exists() {
            fs::create_dir_all(&config_dir)
                .map_err(|e| SightlineError::config(format!("Failed to create config dir: {}", e)))?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| SightlineError::config(format!("Failed to serialize config: {}", e)))?;

        fs::write(&config_path, content)
            .map_err(|e| SightlineError::config(format!("Failed to write config: {}", e)))?;

        Ok(config_path)
    }

    /// Check if a config file exists
    pub fn config_exists() -> bool {
        Self::config_file().exists()
    }

    /// Generate a default config file content for display
    pub fn default_config_toml() -> String {
        let config = Config::default();
        toml::to_string_pretty(&config)
            .unwrap_or_else(|_| String::from("# Error generating config"))
    }
}
