//! Configuration tests
//!
//! These guard the three layers (defaults, file, env) and make sure the
//! generated template stays parseable when fields are added.

use super::*;
use std::collections::HashMap;

fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| map.get(key).cloned()
}

fn no_env() -> impl Fn(&str) -> Option<String> {
    env_from(&[])
}

// ─────────────────────────────────────────────────────────────────────────────
// Template
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_default_template_parses() {
    let toml_str = Config::default().to_toml();
    let parsed = Config::parse_file_config(&toml_str);
    assert!(
        parsed.is_ok(),
        "Default config should parse.\nTOML:\n{}\nError: {:?}",
        toml_str,
        parsed.err()
    );
}

#[test]
fn test_template_preserves_values() {
    let mut config = Config::default();
    config.api_url = "https://bugs.example.com/api".to_string();
    config.page_size = 25;
    config.theme = "Nord".to_string();
    config.token_path = PathBuf::from(r"C:\Users\dev\bugdeck\auth_token");
    config.logging.file_rotation = LogRotation::Hourly;

    let file = Config::parse_file_config(&config.to_toml()).unwrap();
    let resolved = Config::resolve(file, no_env());

    assert_eq!(resolved.api_url, "https://bugs.example.com/api");
    assert_eq!(resolved.page_size, 25);
    assert_eq!(resolved.theme, "Nord");
    assert_eq!(
        resolved.token_path,
        PathBuf::from(r"C:\Users\dev\bugdeck\auth_token")
    );
    assert_eq!(resolved.logging.file_rotation, LogRotation::Hourly);
}

// ─────────────────────────────────────────────────────────────────────────────
// Precedence
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_empty_file_gives_defaults() {
    let config = Config::resolve(FileConfig::default(), no_env());
    assert_eq!(config.api_url, DEFAULT_API_URL);
    assert_eq!(config.api_marker, "/api/");
    assert_eq!(config.page_size, 10);
    assert_eq!(config.request_timeout(), None);
    assert!(config.enable_tui);
    assert!(!config.demo_mode);
    assert!(config.token_path.ends_with("auth_token"));
}

#[test]
fn test_file_overrides_defaults() {
    let file = Config::parse_file_config(
        r#"
api_url = "http://tracker:9000/api"
page_size = 50
request_timeout_secs = 30

[logging]
level = "debug"
file_enabled = true
"#,
    )
    .unwrap();
    let config = Config::resolve(file, no_env());

    assert_eq!(config.api_url, "http://tracker:9000/api");
    assert_eq!(config.page_size, 50);
    assert_eq!(config.request_timeout(), Some(Duration::from_secs(30)));
    assert_eq!(config.logging.level, "debug");
    assert!(config.logging.file_enabled);
    assert_eq!(config.logging.file_prefix, "bugdeck");
}

#[test]
fn test_env_overrides_file() {
    let file = Config::parse_file_config(
        r#"
api_url = "http://from-file/api"
page_size = 50
theme = "Light"
"#,
    )
    .unwrap();
    let env = env_from(&[
        ("BUGDECK_API_URL", "http://from-env/api"),
        ("BUGDECK_PAGE_SIZE", "5"),
        ("BUGDECK_THEME", "Dracula"),
        ("BUGDECK_TOKEN_PATH", "/tmp/token"),
    ]);
    let config = Config::resolve(file, env);

    assert_eq!(config.api_url, "http://from-env/api");
    assert_eq!(config.page_size, 5);
    assert_eq!(config.theme, "Dracula");
    assert_eq!(config.token_path, PathBuf::from("/tmp/token"));
}

#[test]
fn test_zero_or_garbage_page_size_falls_back() {
    let config = Config::resolve(
        FileConfig::default(),
        env_from(&[("BUGDECK_PAGE_SIZE", "lots")]),
    );
    assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);

    let file = Config::parse_file_config("page_size = 0").unwrap();
    assert_eq!(Config::resolve(file, no_env()).page_size, DEFAULT_PAGE_SIZE);
}

#[test]
fn test_runtime_flags() {
    let config = Config::resolve(
        FileConfig::default(),
        env_from(&[("BUGDECK_NO_TUI", "true"), ("BUGDECK_DEMO", "1")]),
    );
    assert!(!config.enable_tui);
    assert!(config.demo_mode);

    let config = Config::resolve(
        FileConfig::default(),
        env_from(&[("BUGDECK_NO_TUI", "0"), ("BUGDECK_DEMO", "no")]),
    );
    assert!(config.enable_tui);
    assert!(!config.demo_mode);
}

#[test]
fn test_invalid_file_is_an_error() {
    assert!(Config::parse_file_config("page_size = \"ten\"").is_err());
    assert!(Config::parse_file_config("[logging\nlevel = 1").is_err());
}

#[test]
fn test_log_rotation_parsing() {
    assert_eq!(LogRotation::parse("HOURLY"), Some(LogRotation::Hourly));
    assert_eq!(LogRotation::parse("never"), Some(LogRotation::Never));
    assert_eq!(LogRotation::parse("weekly"), None);
}

#[test]
fn test_logging_falls_back_on_unknown_values() {
    let logging = LoggingConfig::from_file(Some(FileLogging {
        level: Some("WARN".to_string()),
        file_rotation: Some("weekly".to_string()),
        file_prefix: Some("  ".to_string()),
        ..Default::default()
    }));
    assert_eq!(logging.level, "warn");
    assert_eq!(logging.directive(), "bugdeck=warn");
    assert_eq!(logging.file_rotation, LogRotation::Daily);
    assert_eq!(logging.file_prefix, "bugdeck");

    let logging = LoggingConfig::from_file(Some(FileLogging {
        level: Some("chatty".to_string()),
        ..Default::default()
    }));
    assert_eq!(logging.level, "info");
}
