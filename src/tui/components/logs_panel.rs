//! Logs panel component
//!
//! Shows the newest system log entries, color-coded by severity. The panel
//! always follows the tail; there is nothing to select or scroll.

use crate::logging::LogEntry;
use crate::tui::theme::Theme;
use ratatui::{
    layout::Rect,
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// One line per entry: `HH:MM:SS LEVEL message`
pub fn format_log_entry(entry: &LogEntry) -> String {
    format!(
        "{} {:5} {}",
        entry.timestamp.format("%H:%M:%S"),
        entry.level.as_str(),
        entry.message
    )
}

pub fn render(f: &mut Frame, area: Rect, entries: &[LogEntry], theme: &Theme) {
    let visible = area.height.saturating_sub(2) as usize;
    let skip = entries.len().saturating_sub(visible);

    let items: Vec<ListItem> = entries
        .iter()
        .skip(skip)
        .map(|entry| ListItem::new(format_log_entry(entry)).style(theme.log_style(entry.level)))
        .collect();

    let list = List::new(items).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.border_style(false))
            .title(" System Logs "),
    );

    f.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::LogLevel;
    use chrono::{TimeZone, Utc};

    #[test]
    fn entry_format_pads_level() {
        let entry = LogEntry {
            timestamp: Utc.with_ymd_and_hms(2025, 4, 1, 8, 5, 9).unwrap(),
            level: LogLevel::Warn,
            target: "bugdeck".to_string(),
            message: "slow".to_string(),
        };
        assert_eq!(format_log_entry(&entry), "08:05:09 WARN  slow");
    }
}
