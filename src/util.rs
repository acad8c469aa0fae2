//! Shared utility functions

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Fit `s` into `max_cols` terminal columns, ending with `…` when cut.
///
/// Widths are display columns, not bytes: CJK characters take two and
/// combining marks take none, so the result never overflows a table cell.
pub fn truncate_to_width(s: &str, max_cols: usize) -> String {
    if s.width() <= max_cols {
        return s.to_string();
    }
    if max_cols == 0 {
        return String::new();
    }

    // Reserve one column for the ellipsis
    let budget = max_cols - 1;
    let mut used = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if used + w > budget {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

/// First line of a possibly multi-line text, for single-row cells
pub fn first_line(s: &str) -> &str {
    s.lines().next().unwrap_or("")
}
