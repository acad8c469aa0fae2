//! Paginated bug table
//!
//! Columns: Bug ID, Subject, Status, Priority. Narrow terminals keep only
//! the first two. Filters and sort apply to the loaded page only.

use super::render_placeholder;
use crate::tui::layout::Breakpoint;
use crate::tui::theme::Theme;
use crate::util::{first_line, truncate_to_width};
use crate::views::{BugListState, SortOrder};
use ratatui::{
    layout::{Constraint, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame,
};

/// Panel title: page position plus active filters
pub fn title(state: &BugListState) -> String {
    let mut title = format!(
        " Bugs · page {}/{} · {} total",
        state.page(),
        state.total_pages(),
        state.total_count()
    );
    if let Some(status) = state.status_filter() {
        title.push_str(&format!(" · status={}", status));
    }
    if let Some(priority) = state.priority_filter() {
        title.push_str(&format!(" · priority={}", priority));
    }
    match state.sort() {
        Some(SortOrder::Ascending) => title.push_str(" · id ↑"),
        Some(SortOrder::Descending) => title.push_str(" · id ↓"),
        None => {}
    }
    title.push(' ');
    title
}

pub fn render(f: &mut Frame, area: Rect, state: &BugListState, theme: &Theme, spinner: char) {
    if state.is_loading() {
        render_placeholder(
            f,
            area,
            "Bugs",
            &format!("{} Loading bugs…", spinner),
            theme.muted_style(),
            theme,
        );
        return;
    }
    if let Some(error) = state.error() {
        render_placeholder(f, area, "Bugs", error, theme.error_style(), theme);
        return;
    }

    let rows = state.visible_rows();
    if rows.is_empty() {
        let message = if state.total_count() == 0 {
            "No bugs reported"
        } else {
            "No bugs on this page match the filters"
        };
        render_placeholder(f, area, "Bugs", message, theme.muted_style(), theme);
        return;
    }

    let [table_area, footer_area] =
        Layout::vertical([Constraint::Min(3), Constraint::Length(1)]).areas(area);

    let wide = Breakpoint::from_width(area.width).at_least(Breakpoint::Normal);
    let widths: Vec<Constraint> = if wide {
        vec![
            Constraint::Length(12),
            Constraint::Min(20),
            Constraint::Length(13),
            Constraint::Length(8),
        ]
    } else {
        vec![Constraint::Length(10), Constraint::Min(10)]
    };

    // Subject column width after borders, the other columns and spacing
    let fixed: u16 = if wide { 12 + 13 + 8 + 3 } else { 10 + 1 };
    let subject_cols = table_area.width.saturating_sub(fixed + 2) as usize;

    let body: Vec<Row> = rows
        .iter()
        .map(|bug| {
            let mut cells = vec![
                Cell::from(bug.bug_id.clone()),
                Cell::from(truncate_to_width(first_line(&bug.subject), subject_cols)),
            ];
            if wide {
                cells.push(Cell::from(Span::styled(
                    bug.status.tag(),
                    theme.status_tag_style(bug.status),
                )));
                cells.push(Cell::from(Span::styled(
                    bug.priority.tag(),
                    theme.priority_tag_style(bug.priority),
                )));
            }
            Row::new(cells).style(theme.base_style())
        })
        .collect();

    let header_cells: &[&str] = if wide {
        &["Bug ID", "Subject", "Status", "Priority"]
    } else {
        &["Bug ID", "Subject"]
    };
    let header = Row::new(header_cells.iter().copied()).style(theme.title_style());

    let table = Table::new(body, widths)
        .header(header)
        .row_highlight_style(theme.selected_style())
        .highlight_symbol("▶ ")
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(theme.border_style(true))
                .title(title(state)),
        );

    let mut table_state = TableState::default().with_selected(Some(state.selected_index()));
    f.render_stateful_widget(table, table_area, &mut table_state);

    let footer = Paragraph::new(Line::from(vec![
        Span::styled(" ◀ p ", theme.muted_style()),
        Span::styled(
            format!("{} / {}", state.page(), state.total_pages()),
            theme.base_style(),
        ),
        Span::styled(" n ▶ ", theme.muted_style()),
        Span::styled(
            format!("  {} per page (+/-)", state.page_size()),
            theme.muted_style(),
        ),
    ]));
    f.render_widget(footer, footer_area);
}
