//! Login and register form panel
//!
//! A centered box: optional server banner, then one row per field with its
//! validation message underneath. Secret fields render as bullets.

use crate::tui::layout::centered_rect;
use crate::tui::theme::Theme;
use crate::views::forms::Form;
use ratatui::{
    layout::Rect,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

const FORM_WIDTH: u16 = 56;

pub fn render(
    f: &mut Frame,
    area: Rect,
    title: &str,
    form: &Form,
    footer: &str,
    theme: &Theme,
    spinner: char,
) {
    let mut lines: Vec<Line> = Vec::new();

    if let Some(banner) = &form.banner {
        lines.push(Line::styled(format!("✗ {}", banner), theme.error_style()));
        lines.push(Line::raw(""));
    }

    for (i, field) in form.fields().iter().enumerate() {
        let focused = i == form.focus();
        let marker = if focused { "▶ " } else { "  " };
        let cursor = if focused { "▏" } else { "" };
        let label_style = if focused {
            theme.title_style()
        } else {
            theme.muted_style()
        };

        lines.push(Line::from(vec![
            Span::styled(marker, label_style),
            Span::styled(format!("{:<17}", field.label), label_style),
            Span::styled(format!("{}{}", field.display_value(), cursor), theme.base_style()),
        ]));
        match &field.error {
            Some(error) => lines.push(Line::styled(
                format!("{:19}{}", "", error),
                theme.error_style(),
            )),
            None => lines.push(Line::raw("")),
        }
    }

    let status = if form.submitting {
        Line::styled(format!("{} Submitting…", spinner), theme.muted_style())
    } else {
        Line::styled(footer.to_string(), theme.muted_style())
    };
    lines.push(status);

    let height = lines.len() as u16 + 2;
    let rect = centered_rect(FORM_WIDTH, height, area);

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .title(format!(" {} ", title)),
    );

    f.render_widget(Clear, rect);
    f.render_widget(paragraph, rect);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::views::LoginForm;
    use ratatui::{backend::TestBackend, Terminal};

    fn draw(form: &Form) -> String {
        let mut terminal = Terminal::new(TestBackend::new(80, 20)).unwrap();
        terminal
            .draw(|f| render(f, f.area(), "Login", form, "Enter to submit", &Theme::default(), '*'))
            .unwrap();
        let buffer = terminal.backend().buffer().clone();
        buffer.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn password_is_masked_and_errors_shown() {
        let mut login = LoginForm::new();
        login.form.focus_next();
        for c in "hunter2".chars() {
            login.form.input(c);
        }
        assert!(login.submit().is_none());

        let screen = draw(&login.form);
        assert!(!screen.contains("hunter2"));
        assert!(screen.contains("•••••••"));
        assert!(screen.contains("Please input your username!"));
    }
}
