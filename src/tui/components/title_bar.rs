// Title bar component
//
// Renders the app name, the current screen with a spinner while its request
// is in flight, and who is signed in.

use crate::tui::app::App;
use ratatui::{
    layout::Rect,
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

pub fn render(f: &mut Frame, area: Rect, app: &App) {
    let busy = if app.is_busy() {
        format!(" {}", app.spinner_char())
    } else {
        String::new()
    };

    let screen = match &app.screen {
        crate::tui::app::Screen::BugDetail(id) => format!("Bug {}", id),
        other => other.name().to_string(),
    };

    let title_text = format!(" 🐞 bugdeck ──── {}{}", screen, busy);

    let session = app.session();
    let who = match (&session.user, session.is_loading) {
        (Some(user), _) => format!(" {} ● ", user.display_name()),
        (None, true) => " signing in… ".to_string(),
        (None, false) => " signed out ".to_string(),
    };

    let title = Paragraph::new(title_text)
        .style(app.theme.title_style())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(app.theme.border_style(true))
                .title_top(Line::from(who).right_aligned())
                .title_bottom(Line::from(" ? help ").right_aligned()),
        );

    f.render_widget(title, area);
}
