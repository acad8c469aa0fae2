// Modal system for TUI overlays
//
// Modals handle their own input and return actions. App just holds
// Option<Modal>; the input layer acts on the returned ModalAction.

use crossterm::event::KeyCode;

/// Actions returned by modal input handling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModalAction {
    /// Input consumed, no state change needed
    None,
    Close,
    /// Confirmed a logout prompt
    ConfirmLogout,
}

/// Available modal types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Modal {
    /// Key binding overview
    Help,
    /// "Log out?" prompt
    ConfirmLogout,
}

impl Modal {
    /// Handle keyboard input, return action for caller to execute
    pub fn handle_input(&self, key: KeyCode) -> ModalAction {
        match self {
            Modal::Help => match key {
                KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q') | KeyCode::Enter => {
                    ModalAction::Close
                }
                _ => ModalAction::None,
            },
            Modal::ConfirmLogout => match key {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    ModalAction::ConfirmLogout
                }
                KeyCode::Esc | KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Char('q') => {
                    ModalAction::Close
                }
                _ => ModalAction::None,
            },
        }
    }
}

/// Key bindings shown in the help modal, grouped by screen
pub const HELP_SECTIONS: &[(&str, &[(&str, &str)])] = &[
    (
        "Global",
        &[
            ("?", "Toggle this help"),
            ("1 / 2", "Bug list / Dashboard"),
            ("t", "Cycle theme"),
            ("L", "Toggle system logs"),
            ("X", "Log out"),
            ("q, Ctrl+C", "Quit"),
        ],
    ),
    (
        "Login / Register",
        &[
            ("Tab / Shift+Tab", "Next / previous field"),
            ("Enter", "Submit"),
            ("Ctrl+N", "Create an account (from login)"),
            ("Esc", "Back to login (from register)"),
        ],
    ),
    (
        "Bug list",
        &[
            ("j / k", "Move selection"),
            ("Enter", "Open bug"),
            ("n / p", "Next / previous page"),
            ("+ / -", "Page size"),
            ("s / f", "Filter by status / priority"),
            ("o", "Sort by bug ID"),
            ("c", "Clear filters"),
            ("r", "Reload page"),
        ],
    ),
    (
        "Bug detail",
        &[
            ("Esc", "Back to list"),
            ("] / [", "Next / previous bug on the page"),
            ("y / Y", "Copy as text / JSON"),
            ("r", "Reload"),
        ],
    ),
    (
        "Dashboard",
        &[("Tab, c", "Switch chart type"), ("r", "Reload series")],
    ),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn help_closes_on_escape_and_question_mark() {
        assert_eq!(Modal::Help.handle_input(KeyCode::Esc), ModalAction::Close);
        assert_eq!(Modal::Help.handle_input(KeyCode::Char('?')), ModalAction::Close);
        assert_eq!(Modal::Help.handle_input(KeyCode::Char('j')), ModalAction::None);
    }

    #[test]
    fn logout_prompt_needs_confirmation() {
        let modal = Modal::ConfirmLogout;
        assert_eq!(modal.handle_input(KeyCode::Char('y')), ModalAction::ConfirmLogout);
        assert_eq!(modal.handle_input(KeyCode::Char('n')), ModalAction::Close);
        assert_eq!(modal.handle_input(KeyCode::Char('x')), ModalAction::None);
    }
}
