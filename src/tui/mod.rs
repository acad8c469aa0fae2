// TUI module - Terminal User Interface
//
// This module manages the terminal UI using ratatui. It handles:
// - Terminal initialization and cleanup
// - Event loop (keyboard input, timer ticks, finished requests)
// - Routing keys to the modal, the global bindings or the current screen

pub mod app;
pub mod clipboard;
pub mod components;
pub mod layout;
pub mod modal;
pub mod theme;
pub mod ui;

use crate::config::Config;
use crate::logging::LogBuffer;
use crate::session::{Authenticator, SessionCommand};
use anyhow::{Context, Result};
use app::{App, AppMessage, Screen};
use clipboard::CopyFormat;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use modal::{Modal, ModalAction};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tokio::sync::mpsc;

/// Capacity of the channel spawned requests report back on
const MESSAGE_BUFFER: usize = 64;

/// Run the TUI
///
/// Sets up the terminal, settles a persisted session in the background,
/// runs the event loop and restores the terminal when done.
pub async fn run_tui(
    auth: Authenticator,
    restore: Option<SessionCommand>,
    log_buffer: LogBuffer,
    config: Config,
) -> Result<()> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen).context("Failed to setup terminal")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    let (tx, mut rx) = mpsc::channel(MESSAGE_BUFFER);
    let mut app = App::new(auth, tx, log_buffer, &config);
    if let Some(command) = restore {
        app.restore_session(command);
    }
    app.sync_guard();

    let result = run_event_loop(&mut terminal, &mut app, &mut rx).await;

    // Restore terminal
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to restore terminal")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    result
}

/// Main event loop
///
/// Waits on three sources with tokio::select!:
/// 1. Keyboard input
/// 2. Timer ticks (spinner animation, toast expiry)
/// 3. Results of spawned requests
async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    rx: &mut mpsc::Receiver<AppMessage>,
) -> Result<()> {
    let mut tick_interval = tokio::time::interval(Duration::from_millis(200));

    loop {
        terminal
            .draw(|f| ui::draw(f, app))
            .context("Failed to draw terminal")?;

        tokio::select! {
            _ = async {
                if event::poll(Duration::from_millis(10)).unwrap_or(false) {
                    if let Ok(Event::Key(key_event)) = event::read() {
                        handle_key_event(app, key_event);
                    }
                }
            } => {}

            _ = tick_interval.tick() => {
                app.tick();
            }

            Some(message) = rx.recv() => {
                app.handle_message(message);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

/// Handle keyboard input
/// Layered dispatch: Modal → Global → Screen
fn handle_key_event(app: &mut App, key_event: KeyEvent) {
    if key_event.kind != KeyEventKind::Press {
        return;
    }

    // Layer 1: Modal captures all input when active
    if handle_modal_input(app, &key_event) {
        return;
    }

    // Layer 2: Global keys
    if handle_global_keys(app, &key_event) {
        return;
    }

    // Layer 3: Screen keys
    match app.screen {
        Screen::Login => handle_login_keys(app, &key_event),
        Screen::Register => handle_register_keys(app, &key_event),
        Screen::BugList => handle_list_keys(app, key_event.code),
        Screen::BugDetail(_) => handle_detail_keys(app, key_event.code),
        Screen::Dashboard => handle_dashboard_keys(app, key_event.code),
    }

    app.sync_guard();
}

fn handle_modal_input(app: &mut App, key_event: &KeyEvent) -> bool {
    let Some(modal) = app.modal else {
        return false;
    };

    match modal.handle_input(key_event.code) {
        ModalAction::None => {}
        ModalAction::Close => app.modal = None,
        ModalAction::ConfirmLogout => {
            app.modal = None;
            app.logout();
        }
    }
    true
}

fn handle_global_keys(app: &mut App, key_event: &KeyEvent) -> bool {
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key_event.code == KeyCode::Char('c') {
        app.should_quit = true;
        return true;
    }

    // Forms take printable keys as text
    if app.screen.is_form() {
        return false;
    }

    match key_event.code {
        KeyCode::Char('q') => app.should_quit = true,
        KeyCode::Char('?') => app.modal = Some(Modal::Help),
        KeyCode::Char('t') => app.cycle_theme(),
        KeyCode::Char('L') => app.show_logs = !app.show_logs,
        KeyCode::Char('X') => app.modal = Some(Modal::ConfirmLogout),
        KeyCode::Char('1') if app.screen != Screen::BugList => app.navigate(Screen::BugList),
        KeyCode::Char('2') if app.screen != Screen::Dashboard => app.navigate(Screen::Dashboard),
        _ => return false,
    }
    true
}

fn handle_login_keys(app: &mut App, key_event: &KeyEvent) {
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    match key_event.code {
        KeyCode::Char('n') if ctrl => app.navigate(Screen::Register),
        KeyCode::Enter => app.submit_login(),
        KeyCode::Tab | KeyCode::Down => app.login.form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.login.form.focus_prev(),
        KeyCode::Backspace => app.login.form.backspace(),
        KeyCode::Char(c) if !ctrl => app.login.form.input(c),
        _ => {}
    }
}

fn handle_register_keys(app: &mut App, key_event: &KeyEvent) {
    let ctrl = key_event.modifiers.contains(KeyModifiers::CONTROL);
    match key_event.code {
        KeyCode::Esc => app.navigate(Screen::Login),
        KeyCode::Enter => app.submit_register(),
        KeyCode::Tab | KeyCode::Down => app.register.form.focus_next(),
        KeyCode::BackTab | KeyCode::Up => app.register.form.focus_prev(),
        KeyCode::Backspace => app.register.form.backspace(),
        KeyCode::Char(c) if !ctrl => app.register.form.input(c),
        _ => {}
    }
}

fn handle_list_keys(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Down | KeyCode::Char('j') => app.bug_list.select_next(),
        KeyCode::Up | KeyCode::Char('k') => app.bug_list.select_prev(),
        KeyCode::Enter => app.open_selected(),
        KeyCode::Right | KeyCode::Char('n') | KeyCode::PageDown => app.next_page(),
        KeyCode::Left | KeyCode::Char('p') | KeyCode::PageUp => app.prev_page(),
        KeyCode::Char('+') | KeyCode::Char('=') => app.change_page_size(true),
        KeyCode::Char('-') => app.change_page_size(false),
        KeyCode::Char('s') => app.bug_list.cycle_status_filter(),
        KeyCode::Char('f') => app.bug_list.cycle_priority_filter(),
        KeyCode::Char('o') => app.bug_list.toggle_sort(),
        KeyCode::Char('c') => app.bug_list.clear_filters(),
        KeyCode::Char('r') => app.refresh_list(),
        _ => {}
    }
}

fn handle_detail_keys(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Esc | KeyCode::Backspace => app.navigate(Screen::BugList),
        KeyCode::Char(']') => app.step_detail(true),
        KeyCode::Char('[') => app.step_detail(false),
        KeyCode::Char('y') => app.copy_detail(CopyFormat::Readable),
        KeyCode::Char('Y') => app.copy_detail(CopyFormat::Json),
        KeyCode::Char('r') => app.reload_detail(),
        _ => {}
    }
}

fn handle_dashboard_keys(app: &mut App, key: KeyCode) {
    match key {
        KeyCode::Tab | KeyCode::Char('c') => {
            if let Some(dashboard) = app.dashboard.as_mut() {
                dashboard.cycle_chart();
            }
        }
        KeyCode::Esc => app.navigate(Screen::BugList),
        KeyCode::Char('r') => app.reload_dashboard(),
        _ => {}
    }
}
