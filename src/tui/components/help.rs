//! Help and confirmation overlays

use crate::tui::layout::centered_rect;
use crate::tui::modal::HELP_SECTIONS;
use crate::tui::theme::Theme;
use ratatui::{
    layout::{Alignment, Rect},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

pub fn render_help(f: &mut Frame, area: Rect, theme: &Theme) {
    let mut lines: Vec<Line> = Vec::new();
    for (section, bindings) in HELP_SECTIONS {
        lines.push(Line::raw(""));
        lines.push(Line::from(Span::styled(format!("  {}", section), theme.title_style())));
        for (key, desc) in bindings.iter() {
            lines.push(Line::from(vec![
                Span::raw("    "),
                Span::styled(format!("{:<16}", key), theme.selected_style()),
                Span::styled(desc.to_string(), theme.base_style()),
            ]));
        }
    }
    lines.push(Line::raw(""));

    let height = lines.len() as u16 + 2;
    let rect = centered_rect(60, height, area);
    let help = Paragraph::new(Text::from(lines)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .title(" Keys · Esc to close "),
    );

    f.render_widget(Clear, rect);
    f.render_widget(help, rect);
}

pub fn render_confirm_logout(f: &mut Frame, area: Rect, theme: &Theme) {
    let rect = centered_rect(36, 5, area);
    let prompt = Paragraph::new(vec![
        Line::raw(""),
        Line::styled("Log out?  [y] yes  [n] no", theme.base_style()),
    ])
    .alignment(Alignment::Center)
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .title(" Logout "),
    );

    f.render_widget(Clear, rect);
    f.render_widget(prompt, rect);
}
