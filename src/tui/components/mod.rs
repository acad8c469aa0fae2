// Components module - reusable UI building blocks
//
// Shell components are rendered on every screen:
// - Title bar: app name, current screen, signed-in user
// - Status bar: uptime, key hints
// - Logs panel: system log entries (toggle with L)
//
// Screen components take the state they draw plus the theme, never the App.

pub mod bug_detail_panel;
pub mod bug_table;
pub mod chart_panel;
pub mod form_panel;
pub mod help;
pub mod logs_panel;
pub mod status_bar;
pub mod title_bar;
pub mod toast;

pub use toast::Toast;

use super::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    style::Style,
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

/// Centered single message inside a titled block
///
/// Used for the loading, empty, not-found and error placeholders so every
/// screen shows them the same way.
pub fn render_placeholder(
    f: &mut Frame,
    area: Rect,
    title: &str,
    message: &str,
    style: Style,
    theme: &Theme,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(theme.border_style(false))
        .title(format!(" {} ", title));

    let inner_height = area.height.saturating_sub(2);
    let pad = inner_height.saturating_sub(1) / 2;
    let mut text = "\n".repeat(pad as usize);
    text.push_str(message);

    let paragraph = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(style)
        .wrap(Wrap { trim: true })
        .block(block);
    f.render_widget(paragraph, area);
}
