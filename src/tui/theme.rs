// Theme system for the TUI
//
// Built-in color themes, switchable at runtime with `t`. Each theme colors
// the chrome (borders, title, status bar) and the bug tags.

use crate::api::{BugPriority, BugStatus};
use crate::logging::LogLevel;
use ratatui::style::{Color, Modifier, Style};

/// Available themes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    #[default]
    Dark,
    Light,
    Nord,
    Dracula,
}

impl ThemeKind {
    pub fn all() -> &'static [ThemeKind] {
        &[
            ThemeKind::Dark,
            ThemeKind::Light,
            ThemeKind::Nord,
            ThemeKind::Dracula,
        ]
    }

    /// Look up a theme by name (case-insensitive), defaulting to Dark
    pub fn from_name(name: &str) -> Self {
        Self::all()
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(name.trim()))
            .unwrap_or_default()
    }

    pub fn next(self) -> Self {
        let themes = Self::all();
        let current = themes.iter().position(|&t| t == self).unwrap_or(0);
        themes[(current + 1) % themes.len()]
    }

    pub fn name(&self) -> &'static str {
        match self {
            ThemeKind::Dark => "Dark",
            ThemeKind::Light => "Light",
            ThemeKind::Nord => "Nord",
            ThemeKind::Dracula => "Dracula",
        }
    }

    pub fn theme(&self) -> Theme {
        match self {
            ThemeKind::Dark => Theme::dark(),
            ThemeKind::Light => Theme::light(),
            ThemeKind::Nord => Theme::nord(),
            ThemeKind::Dracula => Theme::dracula(),
        }
    }
}

/// Complete theme definition with all UI colors
#[derive(Debug, Clone)]
pub struct Theme {
    // Base colors
    pub fg: Color,
    pub muted: Color,
    pub border: Color,
    pub border_focused: Color,

    // Title and status
    pub title: Color,
    pub status_bar: Color,

    // Selection
    pub selected_bg: Color,
    pub selected_fg: Color,

    pub error: Color,
    pub success: Color,

    // Bug status tags
    pub status_open: Color,
    pub status_in_progress: Color,
    pub status_resolved: Color,
    pub status_closed: Color,

    // Bug priority tags
    pub priority_low: Color,
    pub priority_medium: Color,
    pub priority_high: Color,

    // Log levels
    pub log_error: Color,
    pub log_warn: Color,
    pub log_info: Color,
    pub log_debug: Color,

    pub chart: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            fg: Color::White,
            muted: Color::Gray,
            border: Color::Gray,
            border_focused: Color::Cyan,

            title: Color::Cyan,
            status_bar: Color::Green,

            selected_bg: Color::DarkGray,
            selected_fg: Color::Yellow,

            error: Color::Red,
            success: Color::Green,

            status_open: Color::Blue,
            status_in_progress: Color::Yellow,
            status_resolved: Color::Green,
            status_closed: Color::DarkGray,

            priority_low: Color::Green,
            priority_medium: Color::Yellow,
            priority_high: Color::Red,

            log_error: Color::Red,
            log_warn: Color::Yellow,
            log_info: Color::Blue,
            log_debug: Color::Gray,

            chart: Color::Cyan,
        }
    }

    pub fn light() -> Self {
        let goldenrod = Color::Rgb(184, 134, 11);
        Self {
            fg: Color::Black,
            muted: Color::DarkGray,
            border: Color::DarkGray,
            border_focused: Color::Blue,

            title: Color::Blue,
            status_bar: Color::DarkGray,

            selected_bg: Color::LightBlue,
            selected_fg: Color::Black,

            error: Color::Red,
            success: Color::Green,

            status_open: Color::Blue,
            status_in_progress: goldenrod,
            status_resolved: Color::Green,
            status_closed: Color::Gray,

            priority_low: Color::Green,
            priority_medium: goldenrod,
            priority_high: Color::Red,

            log_error: Color::Red,
            log_warn: goldenrod,
            log_info: Color::Blue,
            log_debug: Color::DarkGray,

            chart: Color::Blue,
        }
    }

    pub fn nord() -> Self {
        let frost = Color::Rgb(136, 192, 208);
        let red = Color::Rgb(191, 97, 106);
        let yellow = Color::Rgb(235, 203, 139);
        let green = Color::Rgb(163, 190, 140);
        let grey = Color::Rgb(76, 86, 106);
        Self {
            fg: Color::Rgb(236, 239, 244),
            muted: Color::Rgb(216, 222, 233),
            border: grey,
            border_focused: frost,

            title: frost,
            status_bar: green,

            selected_bg: Color::Rgb(67, 76, 94),
            selected_fg: yellow,

            error: red,
            success: green,

            status_open: Color::Rgb(129, 161, 193),
            status_in_progress: yellow,
            status_resolved: green,
            status_closed: grey,

            priority_low: green,
            priority_medium: yellow,
            priority_high: red,

            log_error: red,
            log_warn: yellow,
            log_info: frost,
            log_debug: grey,

            chart: frost,
        }
    }

    pub fn dracula() -> Self {
        let purple = Color::Rgb(189, 147, 249);
        let pink = Color::Rgb(255, 121, 198);
        let green = Color::Rgb(80, 250, 123);
        let yellow = Color::Rgb(241, 250, 140);
        let red = Color::Rgb(255, 85, 85);
        let comment = Color::Rgb(98, 114, 164);
        Self {
            fg: Color::Rgb(248, 248, 242),
            muted: comment,
            border: comment,
            border_focused: purple,

            title: purple,
            status_bar: green,

            selected_bg: Color::Rgb(68, 71, 90),
            selected_fg: yellow,

            error: red,
            success: green,

            status_open: Color::Rgb(139, 233, 253),
            status_in_progress: yellow,
            status_resolved: green,
            status_closed: comment,

            priority_low: green,
            priority_medium: yellow,
            priority_high: red,

            log_error: red,
            log_warn: yellow,
            log_info: pink,
            log_debug: comment,

            chart: pink,
        }
    }

    // Style helpers

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg)
    }

    pub fn muted_style(&self) -> Style {
        Style::default().fg(self.muted)
    }

    pub fn border_style(&self, focused: bool) -> Style {
        Style::default().fg(if focused {
            self.border_focused
        } else {
            self.border
        })
    }

    pub fn title_style(&self) -> Style {
        Style::default().fg(self.title).add_modifier(Modifier::BOLD)
    }

    pub fn selected_style(&self) -> Style {
        Style::default()
            .bg(self.selected_bg)
            .fg(self.selected_fg)
            .add_modifier(Modifier::BOLD)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error).add_modifier(Modifier::BOLD)
    }

    pub fn status_tag_style(&self, status: BugStatus) -> Style {
        let color = match status {
            BugStatus::Open => self.status_open,
            BugStatus::InProgress => self.status_in_progress,
            BugStatus::Resolved => self.status_resolved,
            BugStatus::Closed => self.status_closed,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn priority_tag_style(&self, priority: BugPriority) -> Style {
        let color = match priority {
            BugPriority::Low => self.priority_low,
            BugPriority::Medium => self.priority_medium,
            BugPriority::High => self.priority_high,
        };
        Style::default().fg(color).add_modifier(Modifier::BOLD)
    }

    pub fn log_style(&self, level: LogLevel) -> Style {
        let color = match level {
            LogLevel::Error => self.log_error,
            LogLevel::Warn => self.log_warn,
            LogLevel::Info => self.log_info,
            LogLevel::Debug | LogLevel::Trace => self.log_debug,
        };
        Style::default().fg(color)
    }
}
