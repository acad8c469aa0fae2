//! `[logging]` section: filter level for bugdeck's own events and the
//! optional JSON log file written next to the TUI log panel

use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::level_filters::LevelFilter;
use tracing_appender::rolling::{self, RollingFileAppender};

/// How often the JSON log file starts a new segment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogRotation {
    Hourly,
    #[default]
    Daily,
    /// One file for every run
    Never,
}

impl LogRotation {
    /// Case-insensitive; `None` for anything but hourly/daily/never
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hourly" => Some(Self::Hourly),
            "daily" => Some(Self::Daily),
            "never" => Some(Self::Never),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hourly => "hourly",
            Self::Daily => "daily",
            Self::Never => "never",
        }
    }

    /// Appender writing `<dir>/<prefix>[.<period>]`
    pub fn appender(&self, dir: &Path, prefix: &str) -> RollingFileAppender {
        match self {
            Self::Hourly => rolling::hourly(dir, prefix),
            Self::Daily => rolling::daily(dir, prefix),
            Self::Never => rolling::never(dir, prefix),
        }
    }
}

/// Resolved `[logging]` settings
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// Lower-case level name applied to the `bugdeck` target
    pub level: String,
    /// Write JSON lines to a file on top of the log panel or console
    pub file_enabled: bool,
    pub file_dir: PathBuf,
    pub file_rotation: LogRotation,
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file_enabled: false,
            file_dir: PathBuf::from("./logs"),
            file_rotation: LogRotation::Daily,
            file_prefix: "bugdeck".to_string(),
        }
    }
}

impl LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub fn directive(&self) -> String {
        format!("bugdeck={}", self.level)
    }
}

/// `[logging]` as written in config.toml
#[derive(Debug, Deserialize, Default)]
pub struct FileLogging {
    pub level: Option<String>,
    pub file_enabled: Option<bool>,
    pub file_dir: Option<String>,
    pub file_rotation: Option<String>,
    pub file_prefix: Option<String>,
}

impl LoggingConfig {
    /// Fill gaps with defaults; unknown level or rotation names fall back too
    pub fn from_file(file: Option<FileLogging>) -> Self {
        let file = file.unwrap_or_default();
        let defaults = Self::default();

        let level = file
            .level
            .and_then(|raw| raw.parse::<LevelFilter>().ok())
            .map(|level| level.to_string().to_ascii_lowercase())
            .unwrap_or(defaults.level);

        Self {
            level,
            file_enabled: file.file_enabled.unwrap_or(defaults.file_enabled),
            file_dir: file
                .file_dir
                .map(PathBuf::from)
                .unwrap_or(defaults.file_dir),
            file_rotation: file
                .file_rotation
                .and_then(|s| LogRotation::parse(&s))
                .unwrap_or(defaults.file_rotation),
            file_prefix: file
                .file_prefix
                .filter(|p| !p.trim().is_empty())
                .unwrap_or(defaults.file_prefix),
        }
    }
}
