//! Single bug panel
//!
//! Labeled fields in a fixed order, with status and priority drawn as
//! colored tags. Not-found is an empty state, not an error.

use super::render_placeholder;
use crate::api::Bug;
use crate::tui::theme::Theme;
use crate::views::bug_detail::detail_fields;
use crate::views::{BugDetailState, DetailContent};
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};

const LABEL_WIDTH: usize = 16;

pub fn render(f: &mut Frame, area: Rect, state: &BugDetailState, theme: &Theme, spinner: char) {
    let title = format!("Bug {}", state.bug_id());
    match state.content() {
        DetailContent::Loading => render_placeholder(
            f,
            area,
            &title,
            &format!("{} Loading bug…", spinner),
            theme.muted_style(),
            theme,
        ),
        DetailContent::NotFound => render_placeholder(
            f,
            area,
            &title,
            &format!("Bug {} was not found", state.bug_id()),
            theme.muted_style(),
            theme,
        ),
        DetailContent::Failed(message) => {
            render_placeholder(f, area, &title, message, theme.error_style(), theme)
        }
        DetailContent::Loaded(bug) => render_bug(f, area, bug, theme),
    }
}

fn render_bug(f: &mut Frame, area: Rect, bug: &Bug, theme: &Theme) {
    let label = |name: &str| {
        Span::styled(
            format!("{:<width$}", name, width = LABEL_WIDTH),
            theme.muted_style(),
        )
    };

    let mut lines: Vec<Line> = Vec::new();
    for (name, value) in detail_fields(bug) {
        match name {
            "Status" => lines.push(Line::from(vec![
                label(name),
                tag(&value, theme.status_tag_style(bug.status)),
            ])),
            "Priority" => lines.push(Line::from(vec![
                label(name),
                tag(&value, theme.priority_tag_style(bug.priority)),
            ])),
            "Description" => {
                lines.push(Line::raw(""));
                lines.push(Line::from(label(name)));
                if value.is_empty() {
                    lines.push(Line::styled("(no description)", theme.muted_style()));
                } else {
                    lines.extend(
                        value
                            .lines()
                            .map(|l| Line::styled(l.to_string(), theme.base_style())),
                    );
                }
            }
            _ => lines.push(Line::from(vec![
                label(name),
                Span::styled(value, theme.base_style()),
            ])),
        }
    }

    let paragraph = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(true))
            .title(format!(" Bug {} ", bug.bug_id)),
    );
    f.render_widget(paragraph, area);
}

fn tag(text: &str, style: Style) -> Span<'static> {
    Span::styled(format!(" {} ", text), style.add_modifier(Modifier::REVERSED))
}
