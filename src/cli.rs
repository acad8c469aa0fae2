// CLI module - command-line argument parsing and handlers
//
// Without a subcommand bugdeck starts the TUI. Subcommands cover:
// - config --show|--path|--edit|--reset: configuration management
// - login / logout / whoami: session management against the API
// - bugs / bug / modifications: headless queries printing JSON

use crate::api::{ApiError, PageRequest, UserProfile};
use crate::config::{Config, VERSION};
use crate::session::{Authenticator, ProfileOutcome, SessionCommand};
use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{BufRead, Write};
use std::process::Command;

/// bugdeck - terminal client for the bug tracker
#[derive(Parser, Debug)]
#[command(name = "bugdeck")]
#[command(version = VERSION)]
#[command(about = "Terminal client for the bug tracker REST API", long_about = None)]
pub struct Cli {
    /// Serve a built-in demo API (login demo/demo) and connect to it
    #[arg(long, global = true)]
    pub demo: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    /// Manage configuration
    Config {
        /// Show effective configuration
        #[arg(long)]
        show: bool,

        /// Reset config file to defaults
        #[arg(long)]
        reset: bool,

        /// Open config file in $EDITOR
        #[arg(long)]
        edit: bool,

        /// Show config file path
        #[arg(long)]
        path: bool,
    },

    /// Log in and store the session token
    Login {
        /// Username (prompted when omitted)
        #[arg(short, long)]
        username: Option<String>,
    },

    /// Forget the stored session token
    Logout,

    /// Show the profile of the logged-in user
    Whoami,

    /// List one page of bugs as JSON
    Bugs {
        #[arg(long, default_value_t = 1)]
        page: u32,

        /// Defaults to the configured page size
        #[arg(long)]
        page_size: Option<u32>,
    },

    /// Show a single bug as JSON
    Bug {
        /// Bug identifier, e.g. BUG-123
        id: String,
    },

    /// Print the modification time series as JSON
    Modifications,
}

impl Commands {
    /// Commands that run without touching the API
    pub fn is_local(&self) -> bool {
        matches!(self, Commands::Config { .. })
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Config commands
// ─────────────────────────────────────────────────────────────────────────────

/// Handle `config` subcommands. Returns true if one was handled (exit after).
pub fn handle_config_command(command: &Commands) -> bool {
    let Commands::Config {
        show,
        reset,
        edit,
        path,
    } = command
    else {
        return false;
    };

    if *path {
        handle_config_path();
    } else if *show {
        handle_config_show();
    } else if *reset {
        handle_config_reset();
    } else if *edit {
        handle_config_edit();
    } else {
        // No flag provided, show help
        println!("Usage: bugdeck config [--show|--reset|--edit|--path]");
        println!();
        println!("Options:");
        println!("  --show    Display effective configuration");
        println!("  --reset   Reset config file to defaults");
        println!("  --edit    Open config file in $EDITOR");
        println!("  --path    Show config file path");
    }
    true
}

fn handle_config_path() {
    match Config::config_path() {
        Some(path) => println!("{}", path.display()),
        None => {
            eprintln!("Error: Could not determine config path");
            std::process::exit(1);
        }
    }
}

fn handle_config_show() {
    let config = Config::from_env();

    println!("# Effective configuration (env > file > defaults)");
    println!();
    print!("{}", config.to_toml());
    println!();
    println!("# Runtime flags");
    println!("# enable_tui = {}", config.enable_tui);
    println!("# demo_mode = {}", config.demo_mode);

    println!();
    if let Some(path) = Config::config_path() {
        if path.exists() {
            println!("# Source: {}", path.display());
        } else {
            println!("# Source: defaults (no config file)");
        }
    }
}

fn handle_config_reset() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if path.exists() {
        eprint!(
            "Config file exists at {}. Overwrite? [y/N] ",
            path.display()
        );
        let answer = read_line().unwrap_or_default();
        if !answer.trim().eq_ignore_ascii_case("y") {
            println!("Aborted.");
            return;
        }
    }

    if let Some(parent) = path.parent() {
        if let Err(e) = std::fs::create_dir_all(parent) {
            eprintln!("Error creating directory: {}", e);
            std::process::exit(1);
        }
    }

    if let Err(e) = std::fs::write(&path, Config::default().to_toml()) {
        eprintln!("Error writing config: {}", e);
        std::process::exit(1);
    }

    println!("Config reset to defaults: {}", path.display());
}

fn handle_config_edit() {
    let Some(path) = Config::config_path() else {
        eprintln!("Error: Could not determine config path");
        std::process::exit(1);
    };

    if !path.exists() {
        Config::ensure_config_exists();
        println!("Created new config file: {}", path.display());
    }

    let editor = std::env::var("EDITOR")
        .or_else(|_| std::env::var("VISUAL"))
        .unwrap_or_else(|_| {
            if cfg!(windows) {
                "notepad".to_string()
            } else {
                "nano".to_string()
            }
        });

    println!("Opening {} with {}", path.display(), editor);

    match Command::new(&editor).arg(&path).status() {
        Ok(s) if s.success() => {}
        Ok(s) => {
            eprintln!("Editor exited with status: {}", s);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("Failed to launch editor '{}': {}", editor, e);
            eprintln!("Set $EDITOR environment variable to your preferred editor");
            std::process::exit(1);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// API commands
// ─────────────────────────────────────────────────────────────────────────────

/// Run a session or query command against the API
///
/// `restore` is the startup command of the session store; query commands
/// settle it first so they only run with a verified session.
pub async fn run_command(
    command: Commands,
    auth: &Authenticator,
    restore: Option<SessionCommand>,
    default_page_size: u32,
) -> Result<()> {
    match command {
        Commands::Config { .. } => Ok(()),
        Commands::Login { username } => {
            let username = match username {
                Some(u) => u,
                None => prompt("Username: ")?,
            };
            let password = prompt("Password: ")?;
            login(auth, &username, &password).await
        }
        Commands::Logout => {
            auth.logout();
            println!("Logged out.");
            Ok(())
        }
        Commands::Whoami => {
            let user = require_session(auth, restore).await?;
            print_json(&user)
        }
        Commands::Bugs { page, page_size } => {
            require_session(auth, restore).await?;
            let request = PageRequest::new(page, page_size.unwrap_or(default_page_size));
            let page = checked(auth, auth.api().list_bugs(request).await)?;
            print_json(&page)
        }
        Commands::Bug { id } => {
            require_session(auth, restore).await?;
            let bug = checked(auth, auth.api().get_bug(&id).await)?;
            print_json(&bug)
        }
        Commands::Modifications => {
            require_session(auth, restore).await?;
            let series = checked(auth, auth.api().modifications().await)?;
            print_json(&series)
        }
    }
}

async fn login(auth: &Authenticator, username: &str, password: &str) -> Result<()> {
    match auth.login(username, password).await {
        Ok(ProfileOutcome::Authenticated(user)) => {
            println!("Logged in as {}.", user.display_name());
            Ok(())
        }
        Ok(ProfileOutcome::LoggedOut(e)) => bail!(
            "Login accepted but the profile could not be loaded: {}",
            e.user_message()
        ),
        Ok(ProfileOutcome::Stale) => bail!("Login superseded by another session change"),
        Err(e) => Err(anyhow!(e)),
    }
}

/// Settle the stored session; fails unless a user is logged in
async fn require_session(
    auth: &Authenticator,
    restore: Option<SessionCommand>,
) -> Result<UserProfile> {
    match auth.restore(restore).await {
        Some(ProfileOutcome::Authenticated(user)) => Ok(user),
        Some(ProfileOutcome::LoggedOut(e)) => bail!(
            "Stored session is no longer valid ({}). Run `bugdeck login`.",
            e.user_message()
        ),
        Some(ProfileOutcome::Stale) | None => auth
            .snapshot()
            .user
            .ok_or_else(|| anyhow!("Not logged in. Run `bugdeck login`.")),
    }
}

/// Turn an API failure into a user-facing error, ending the session on 401
fn checked<T>(auth: &Authenticator, result: Result<T, ApiError>) -> Result<T> {
    result.map_err(|e| {
        if e.is_unauthorized() {
            auth.expire();
        }
        tracing::debug!("API command failed: {}", e);
        anyhow!(e.user_message())
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

fn prompt(label: &str) -> Result<String> {
    eprint!("{}", label);
    std::io::stderr().flush().context("Failed to write prompt")?;
    let line = read_line()?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

fn read_line() -> Result<String> {
    let mut input = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut input)
        .context("Failed to read from stdin")?;
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::demo::{self, DEMO_PASSWORD, DEMO_USERNAME};
    use crate::session::{MemoryTokenStore, SessionStore};
    use clap::CommandFactory;
    use std::sync::{Arc, Mutex};

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn no_subcommand_starts_the_tui() {
        let cli = parse(&["bugdeck"]);
        assert!(cli.command.is_none());
        assert!(!cli.demo);
    }

    #[test]
    fn demo_flag_is_global() {
        let cli = parse(&["bugdeck", "bugs", "--demo", "--page", "2"]);
        assert!(cli.demo);
        assert_eq!(
            cli.command,
            Some(Commands::Bugs {
                page: 2,
                page_size: None
            })
        );
    }

    #[test]
    fn bug_requires_an_id() {
        assert!(Cli::try_parse_from(["bugdeck", "bug"]).is_err());
        let cli = parse(&["bugdeck", "bug", "BUG-123"]);
        assert_eq!(
            cli.command,
            Some(Commands::Bug {
                id: "BUG-123".to_string()
            })
        );
    }

    #[test]
    fn only_config_is_local() {
        let cli = parse(&["bugdeck", "config", "--path"]);
        assert!(cli.command.as_ref().is_some_and(Commands::is_local));
        assert!(!Commands::Whoami.is_local());
    }

    fn demo_auth(server: &demo::DemoServer) -> Authenticator {
        let api = ApiClient::new(server.api_url(), None).unwrap();
        let (store, _) = SessionStore::new(Box::new(MemoryTokenStore::new(None)));
        Authenticator::new(api, Arc::new(Mutex::new(store)), "/api/")
    }

    #[tokio::test]
    async fn queries_need_a_session() {
        let server = demo::spawn().await.unwrap();
        let auth = demo_auth(&server);

        let err = run_command(Commands::Whoami, &auth, None, 10)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Not logged in"));
    }

    #[tokio::test]
    async fn login_then_query() {
        let server = demo::spawn().await.unwrap();
        let auth = demo_auth(&server);

        login(&auth, DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
        run_command(Commands::Whoami, &auth, None, 10).await.unwrap();
        run_command(Commands::Modifications, &auth, None, 10)
            .await
            .unwrap();
        run_command(
            Commands::Bugs {
                page: 3,
                page_size: None,
            },
            &auth,
            None,
            10,
        )
        .await
        .unwrap();

        let err = run_command(
            Commands::Bug {
                id: "BUG-999".to_string(),
            },
            &auth,
            None,
            10,
        )
        .await
        .unwrap_err();
        assert_eq!(err.to_string(), "Not found");
        assert!(auth.snapshot().user.is_some());
    }

    #[tokio::test]
    async fn logout_ends_the_session() {
        let server = demo::spawn().await.unwrap();
        let auth = demo_auth(&server);

        login(&auth, DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
        run_command(Commands::Logout, &auth, None, 10).await.unwrap();

        let err = run_command(Commands::Whoami, &auth, None, 10)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Not logged in"));
    }

    #[tokio::test]
    async fn bad_login_reports_server_message() {
        let server = demo::spawn().await.unwrap();
        let auth = demo_auth(&server);

        let err = login(&auth, DEMO_USERNAME, "wrong").await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid Credentials");
    }
}
