// bugdeck - terminal client for the bug tracker REST API
//
// Architecture:
// - API client (reqwest): one async fn per resource, requests pass through a
//   middleware pipeline that attaches the session token
// - Session: token state machine shared behind Arc<Mutex>, driven by the
//   Authenticator, persisted to a file in the config directory
// - Views: UI-independent state for the bug list, bug detail and dashboard
// - TUI (ratatui): screens, route guard and an event loop fed by mpsc
// - Demo: optional in-process axum server with fixture data

mod api;
mod cli;
mod config;
mod demo;
mod guard;
mod logging;
mod session;
mod tui;
mod util;
mod views;

use anyhow::{Context, Result};
use api::{ApiClient, PageRequest};
use clap::Parser;
use cli::Cli;
use config::Config;
use logging::{LogBuffer, TuiLogLayer};
use session::{
    Authenticator, FileTokenStore, MemoryTokenStore, ProfileOutcome, SessionCommand,
    SessionStore, TokenStore,
};
use std::sync::{Arc, Mutex};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt::writer::BoxMakeWriter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where console logs go for this run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LogSink {
    /// In-memory buffer shown in the logs panel
    Tui,
    /// stdout, for the long-running headless mode
    Stdout,
    /// stderr, so command output on stdout stays machine-readable
    Stderr,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Config commands run before anything touches the network or logging
    if let Some(command) = cli.command.as_ref() {
        if cli::handle_config_command(command) {
            return Ok(());
        }
    }

    // Ensure config template exists (helps users discover options)
    Config::ensure_config_exists();

    let mut config = Config::from_env();
    if cli.demo {
        config.demo_mode = true;
    }

    let sink = match (&cli.command, config.enable_tui) {
        (Some(_), _) => LogSink::Stderr,
        (None, true) => LogSink::Tui,
        (None, false) => LogSink::Stdout,
    };

    let log_buffer = LogBuffer::new();
    // The guard must outlive every log call so the file writer flushes
    let _file_guard = init_logging(&config, &log_buffer, sink);

    // Keep the demo server alive until main returns
    let _demo_server = if config.demo_mode {
        let server = demo::spawn().await.context("Failed to start demo API")?;
        config.api_url = server.api_url().to_string();
        tracing::info!(
            "Demo mode: log in as {}/{}",
            demo::DEMO_USERNAME,
            demo::DEMO_PASSWORD
        );
        Some(server)
    } else {
        None
    };

    let api = ApiClient::new(&config.api_url, config.request_timeout())
        .with_context(|| format!("Invalid API URL: {}", config.api_url))?;
    tracing::debug!(url = %config.api_url, "API client ready");

    // Demo sessions never touch the real token file
    let token_store: Box<dyn TokenStore> = if config.demo_mode {
        Box::new(MemoryTokenStore::new(None))
    } else {
        Box::new(FileTokenStore::new(&config.token_path))
    };
    let (store, restore) = SessionStore::new(token_store);
    let auth = Authenticator::new(api, Arc::new(Mutex::new(store)), &config.api_marker);

    if let Some(command) = cli.command {
        return cli::run_command(command, &auth, restore, config.page_size).await;
    }

    if config.enable_tui {
        tracing::info!("Starting TUI");
        if let Err(e) = tui::run_tui(auth, restore, log_buffer, config).await {
            tracing::error!("TUI error: {:?}", e);
            return Err(e);
        }
    } else {
        tracing::info!("TUI disabled, running in headless mode");
        run_headless(&auth, restore, config.page_size).await;
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// Initialize tracing with the console sink for this run
///
/// Precedence: RUST_LOG env var > config file > default "info".
/// Returns the file writer guard when file logging is on.
fn init_logging(config: &Config, log_buffer: &LogBuffer, sink: LogSink) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| config.logging.directive().into());

    let tui_layer = (sink == LogSink::Tui).then(|| TuiLogLayer::new(log_buffer.clone()));
    let console_layer = match sink {
        LogSink::Tui => None,
        LogSink::Stdout => Some(BoxMakeWriter::new(std::io::stdout)),
        LogSink::Stderr => Some(BoxMakeWriter::new(std::io::stderr)),
    }
    .map(|writer| tracing_subscriber::fmt::layer().with_writer(writer));

    // File layer uses JSON format for structured log parsing
    let (file_layer, guard) = match file_writer(config) {
        Some((writer, guard)) => (
            Some(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(writer)
                    .with_ansi(false),
            ),
            Some(guard),
        ),
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tui_layer)
        .with(console_layer)
        .with(file_layer)
        .init();

    guard
}

/// Non-blocking rolling file writer, if file logging is enabled and usable
fn file_writer(
    config: &Config,
) -> Option<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    let logging = &config.logging;
    if !logging.file_enabled {
        return None;
    }

    if let Err(e) = std::fs::create_dir_all(&logging.file_dir) {
        // Fall back to console-only logging
        eprintln!(
            "Warning: Could not create log directory {:?}: {}",
            logging.file_dir, e
        );
        return None;
    }

    let appender = logging
        .file_rotation
        .appender(&logging.file_dir, &logging.file_prefix);

    Some(tracing_appender::non_blocking(appender))
}

/// Settle the stored session and log a summary of the first page
async fn run_headless(auth: &Authenticator, restore: Option<SessionCommand>, page_size: u32) {
    match auth.restore(restore).await {
        Some(ProfileOutcome::Authenticated(user)) => {
            tracing::info!(user = %user.username, "Logged in as {}", user.display_name());
        }
        Some(ProfileOutcome::LoggedOut(e)) => {
            tracing::warn!("Stored session rejected: {}", e.user_message());
            return;
        }
        Some(ProfileOutcome::Stale) | None => {
            tracing::warn!("Not logged in. Run `bugdeck login` first.");
            return;
        }
    }

    match auth.api().list_bugs(PageRequest::new(1, page_size)).await {
        Ok(page) => {
            tracing::info!(
                total = page.count,
                pages = page.total_pages(),
                "Loaded first page of bugs"
            );
            for bug in &page.results {
                tracing::info!("{} [{}] {}", bug.bug_id, bug.status.as_str(), bug.subject);
            }
        }
        Err(e) => {
            if e.is_unauthorized() {
                auth.expire();
            }
            tracing::error!("Failed to load bugs: {}", e.user_message());
        }
    }
}
