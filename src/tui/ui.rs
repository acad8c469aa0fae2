// UI rendering
//
// Frame layout, top to bottom: title bar, the current screen, the optional
// system logs panel and the status bar. Modals and the toast draw last so
// they sit on top.

use super::app::{App, Screen};
use super::components::{
    bug_detail_panel, bug_table, chart_panel, form_panel, help, logs_panel, render_placeholder,
    status_bar, title_bar,
};
use super::modal::Modal;
use crate::guard::GuardState;
use ratatui::{
    layout::{Constraint, Layout, Rect},
    Frame,
};

const LOGS_HEIGHT: u16 = 8;

/// Main UI render function, called on every frame
pub fn draw(f: &mut Frame, app: &App) {
    let logs_height = if app.show_logs { LOGS_HEIGHT } else { 0 };
    let [title_area, body_area, logs_area, status_area] = Layout::vertical([
        Constraint::Length(3),
        Constraint::Min(6),
        Constraint::Length(logs_height),
        Constraint::Length(2),
    ])
    .areas(f.area());

    title_bar::render(f, title_area, app);
    draw_screen(f, body_area, app);
    if app.show_logs {
        let entries = app.log_buffer.recent(LOGS_HEIGHT as usize);
        logs_panel::render(f, logs_area, &entries, &app.theme);
    }
    status_bar::render(f, status_area, app);

    match app.modal {
        Some(Modal::Help) => help::render_help(f, f.area(), &app.theme),
        Some(Modal::ConfirmLogout) => help::render_confirm_logout(f, f.area(), &app.theme),
        None => {}
    }

    if let Some(toast) = &app.toast {
        toast.render(f, f.area(), &app.theme);
    }
}

fn draw_screen(f: &mut Frame, area: Rect, app: &App) {
    let theme = &app.theme;
    let spinner = app.spinner_char();

    match &app.screen {
        Screen::Login => form_panel::render(
            f,
            area,
            "Login",
            &app.login.form,
            "Enter to log in · Ctrl+N to register",
            theme,
            spinner,
        ),
        Screen::Register => form_panel::render(
            f,
            area,
            "Register",
            &app.register.form,
            "Enter to register · Esc back to login",
            theme,
            spinner,
        ),
        protected => {
            if app.guard_state() != GuardState::Authenticated {
                render_placeholder(
                    f,
                    area,
                    protected.name(),
                    &format!("{} Checking session…", spinner),
                    theme.muted_style(),
                    theme,
                );
                return;
            }
            draw_protected(f, area, app, protected);
        }
    }
}

fn draw_protected(f: &mut Frame, area: Rect, app: &App, screen: &Screen) {
    let theme = &app.theme;
    let spinner = app.spinner_char();

    match screen {
        Screen::BugList => bug_table::render(f, area, &app.bug_list, theme, spinner),
        Screen::BugDetail(_) => match &app.detail {
            Some(detail) => bug_detail_panel::render(f, area, detail, theme, spinner),
            None => render_placeholder(f, area, "Bug", "Loading…", theme.muted_style(), theme),
        },
        Screen::Dashboard => match &app.dashboard {
            Some(dashboard) => chart_panel::render(f, area, dashboard, theme, spinner),
            None => render_placeholder(
                f,
                area,
                "Dashboard",
                "Loading…",
                theme.muted_style(),
                theme,
            ),
        },
        Screen::Login | Screen::Register => {}
    }
}
