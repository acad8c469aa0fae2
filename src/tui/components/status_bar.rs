// Status bar component
//
// Renders uptime, the API host and key hints for the current screen.

use crate::tui::app::{App, Screen};
use crate::tui::layout::Breakpoint;
use ratatui::{
    layout::Rect,
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Key hints for a screen, most important first
fn hints(screen: &Screen) -> &'static [&'static str] {
    match screen {
        Screen::Login => &["Enter login", "Tab field", "^N register", "^C quit"],
        Screen::Register => &["Enter register", "Tab field", "Esc login", "^C quit"],
        Screen::BugList => &[
            "Enter open",
            "n/p page",
            "s/f filter",
            "o sort",
            "2 dashboard",
            "q quit",
        ],
        Screen::BugDetail(_) => &["Esc back", "]/[ next/prev", "y/Y copy", "r reload"],
        Screen::Dashboard => &["Tab chart", "r reload", "1 bugs", "q quit"],
    }
}

/// Adapts to terminal width: narrow terminals get fewer hints
pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let bp = Breakpoint::from_width(area.width);
    let all = hints(&app.screen);
    let shown = match bp {
        Breakpoint::Compact => &all[..all.len().min(2)],
        Breakpoint::Normal => &all[..all.len().min(4)],
        Breakpoint::Wide => all,
    };

    let status_text = if bp.at_least(Breakpoint::Wide) {
        format!(
            " {} │ {} │ {}",
            app.uptime(),
            app.theme_kind.name(),
            shown.join(" │ ")
        )
    } else {
        format!(" {} │ {}", app.uptime(), shown.join(" │ "))
    };

    let status = Paragraph::new(status_text)
        .style(Style::default().fg(app.theme.status_bar))
        .block(Block::default().borders(Borders::TOP));

    f.render_widget(status, area);
}
