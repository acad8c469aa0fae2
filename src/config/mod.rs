//! Configuration for the bugdeck client
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/bugdeck/config.toml)
//! 3. Built-in defaults (lowest priority)

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

mod observability;
mod serialization;

#[cfg(test)]
mod tests;

pub use observability::{FileLogging, LogRotation, LoggingConfig};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_API_MARKER: &str = "/api/";
pub const DEFAULT_PAGE_SIZE: u32 = 10;
pub const DEFAULT_THEME: &str = "Dark";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the bug tracker REST API
    pub api_url: String,

    /// Requests whose URL contains this marker get the session token
    pub api_marker: String,

    /// Bugs per page on the list screen
    pub page_size: u32,

    /// Whole-request timeout; 0 keeps the transport default
    pub request_timeout_secs: u64,

    /// Theme name: Dark, Light, Nord, Dracula
    pub theme: String,

    /// File holding the persisted session token
    pub token_path: PathBuf,

    /// Whether to run the TUI (false prints logs to stdout)
    pub enable_tui: bool,

    /// Serve a built-in mock API instead of talking to `api_url`
    pub demo_mode: bool,

    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            api_marker: DEFAULT_API_MARKER.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            request_timeout_secs: 0,
            theme: DEFAULT_THEME.to_string(),
            token_path: Self::default_token_path(),
            enable_tui: true,
            demo_mode: false,
            logging: LoggingConfig::default(),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub api_url: Option<String>,
    pub api_marker: Option<String>,
    pub page_size: Option<u32>,
    pub request_timeout_secs: Option<u64>,
    pub theme: Option<String>,
    pub token_path: Option<String>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Directory holding config and token: ~/.config/bugdeck
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|p| p.join(".config").join("bugdeck"))
    }

    /// Get the config file path: ~/.config/bugdeck/config.toml
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|p| p.join("config.toml"))
    }

    fn default_token_path() -> PathBuf {
        Self::config_dir()
            .map(|p| p.join("auth_token"))
            .unwrap_or_else(|| PathBuf::from("auth_token"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };

        if path.exists() {
            return;
        }

        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // Config is optional
            }
        }

        let _ = std::fs::write(&path, Self::default().to_toml());
    }

    /// Parse config file contents
    pub(crate) fn parse_file_config(contents: &str) -> Result<FileConfig, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Load file config if it exists
    ///
    /// A config file that exists but cannot be parsed ends the process with
    /// an actionable message instead of silently using defaults.
    fn load_file_config() -> FileConfig {
        let Some(path) = Self::config_path() else {
            return FileConfig::default();
        };

        match std::fs::read_to_string(&path) {
            Ok(contents) => match Self::parse_file_config(&contents) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                    eprintln!("║  CONFIG ERROR - Failed to parse configuration file          ║");
                    eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                    eprintln!("  File: {}\n", path.display());
                    eprintln!("  Error: {}\n", e);
                    eprintln!("  Tip: Check for:\n");
                    eprintln!("    - Missing quotes around string values");
                    eprintln!("    - Numbers written as strings (page_size = 10, not \"10\")");
                    eprintln!("    - Typos in section names\n");
                    eprintln!("  To reset, run `bugdeck config --reset`.\n");
                    std::process::exit(1);
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => FileConfig::default(),
            Err(e) => {
                eprintln!("\n╔══════════════════════════════════════════════════════════════╗");
                eprintln!("║  CONFIG ERROR - Cannot read configuration file              ║");
                eprintln!("╚══════════════════════════════════════════════════════════════╝\n");
                eprintln!("  File: {}\n", path.display());
                eprintln!("  Error: {}\n", e);
                std::process::exit(1);
            }
        }
    }

    /// Load configuration: env vars > file > defaults
    pub fn from_env() -> Self {
        let file = Self::load_file_config();
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a parsed file with an environment lookup
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // API URL: env > file > default
        let api_url = env("BUGDECK_API_URL")
            .or(file.api_url)
            .unwrap_or(defaults.api_url);

        let api_marker = file.api_marker.unwrap_or(defaults.api_marker);

        // Page size: env > file > default, zero falls back to default
        let page_size = env("BUGDECK_PAGE_SIZE")
            .and_then(|v| v.parse().ok())
            .or(file.page_size)
            .filter(|&n| n > 0)
            .unwrap_or(defaults.page_size);

        let request_timeout_secs = file
            .request_timeout_secs
            .unwrap_or(defaults.request_timeout_secs);

        let theme = env("BUGDECK_THEME")
            .or(file.theme)
            .unwrap_or(defaults.theme);

        let token_path = env("BUGDECK_TOKEN_PATH")
            .or(file.token_path)
            .map(PathBuf::from)
            .unwrap_or(defaults.token_path);

        // TUI toggle: env only (runtime flag)
        let enable_tui = env("BUGDECK_NO_TUI")
            .map(|v| v != "1" && v.to_lowercase() != "true")
            .unwrap_or(true);

        // Demo mode: env only (runtime flag, --demo also sets it)
        let demo_mode = env("BUGDECK_DEMO")
            .map(|v| v == "1" || v.to_lowercase() == "true")
            .unwrap_or(false);

        let logging = LoggingConfig::from_file(file.logging);

        Self {
            api_url,
            api_marker,
            page_size,
            request_timeout_secs,
            theme,
            token_path,
            enable_tui,
            demo_mode,
            logging,
        }
    }

    /// Request timeout, `None` when left to the transport
    pub fn request_timeout(&self) -> Option<Duration> {
        (self.request_timeout_secs > 0).then(|| Duration::from_secs(self.request_timeout_secs))
    }
}
