//! Config serialization to TOML
//!
//! Single source of truth for config file format.

use super::Config;

impl Config {
    /// Render the config as a commented TOML file
    pub fn to_toml(&self) -> String {
        format!(
            r#"# bugdeck configuration

# Base URL of the bug tracker REST API (BUGDECK_API_URL overrides)
api_url = "{api_url}"

# Only requests whose URL contains this marker carry the session token
api_marker = "{api_marker}"

# Bugs per page on the list screen (BUGDECK_PAGE_SIZE overrides)
page_size = {page_size}

# Request timeout in seconds, 0 = no timeout beyond the transport default
request_timeout_secs = {timeout}

# Theme: Dark, Light, Nord, Dracula (BUGDECK_THEME overrides)
theme = "{theme}"

# Where the session token is kept between runs (BUGDECK_TOKEN_PATH overrides)
token_path = "{token_path}"

# Logging configuration (RUST_LOG env var overrides)
[logging]
level = "{log_level}"
# File logging (in addition to TUI buffer or stdout)
file_enabled = {log_file_enabled}
file_dir = "{log_file_dir}"
file_rotation = "{log_file_rotation}"  # hourly, daily, never
file_prefix = "{log_file_prefix}"
"#,
            api_url = escape(&self.api_url),
            api_marker = escape(&self.api_marker),
            page_size = self.page_size,
            timeout = self.request_timeout_secs,
            theme = escape(&self.theme),
            token_path = escape(&self.token_path.display().to_string()),
            log_level = escape(&self.logging.level),
            log_file_enabled = self.logging.file_enabled,
            log_file_dir = escape(&self.logging.file_dir.display().to_string()),
            log_file_rotation = self.logging.file_rotation.as_str(),
            log_file_prefix = escape(&self.logging.file_prefix),
        )
    }
}

/// Escape a value for a TOML basic string (Windows paths carry backslashes)
fn escape(value: &str) -> String {
    value.replace('\\', "\\\\").replace('"', "\\\"")
}
