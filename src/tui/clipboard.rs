//! Clipboard helper for copying bug details
//!
//! Uses `arboard` for cross-platform support. The clipboard is created
//! fresh each time to avoid holding resources.

use crate::api::Bug;
use crate::views::bug_detail::to_plain_text;
use anyhow::{Context, Result};
use arboard::Clipboard;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyFormat {
    /// `Label: value` lines
    Readable,
    /// Pretty-printed JSON as served by the API
    Json,
}

impl CopyFormat {
    pub fn label(&self) -> &'static str {
        match self {
            CopyFormat::Readable => "text",
            CopyFormat::Json => "JSON",
        }
    }
}

/// Render a bug the way it is put on the clipboard
pub fn render_bug(bug: &Bug, format: CopyFormat) -> Result<String> {
    match format {
        CopyFormat::Readable => Ok(to_plain_text(bug)),
        CopyFormat::Json => serde_json::to_string_pretty(bug).context("Failed to serialize bug"),
    }
}

/// Copy text to the system clipboard
///
/// Common failure cases: no display server (headless Linux), permission denied.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = Clipboard::new().context("Failed to access clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to set clipboard text")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{BugPriority, BugStatus};
    use crate::views::bug_list::tests::bug;

    #[test]
    fn json_copy_is_the_wire_format() {
        let bug = bug("BUG-7", BugStatus::InProgress, BugPriority::Low);
        let text = render_bug(&bug, CopyFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert_eq!(value["bug_id"], "BUG-7");
        assert_eq!(value["status"], "in_progress");
        assert_eq!(value["priority"], "low");
    }

    #[test]
    fn readable_copy_uses_tags() {
        let bug = bug("BUG-7", BugStatus::InProgress, BugPriority::Low);
        let text = render_bug(&bug, CopyFormat::Readable).unwrap();
        assert!(text.contains("Bug ID: BUG-7"));
        assert!(text.contains("IN PROGRESS"));
    }
}
