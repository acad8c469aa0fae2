//! Route guard for protected screens
//!
//! Reads the session and decides, once per mount, whether a protected
//! screen may render or the user must be sent to the login screen. While
//! the session is still loading the guard stays undetermined.

use crate::session::SessionSnapshot;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardState {
    /// Session still loading; show a spinner, decide nothing yet
    Undetermined,
    Authenticated,
    /// Redirect to login
    Unauthenticated,
}

/// Guard for one mounted protected screen
#[derive(Debug, Clone, Copy)]
pub struct RouteGuard {
    state: GuardState,
}

impl Default for RouteGuard {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteGuard {
    pub fn new() -> Self {
        Self {
            state: GuardState::Undetermined,
        }
    }

    pub fn state(&self) -> GuardState {
        self.state
    }

    /// Feed the current session and get the guard decision
    ///
    /// Leaves `Undetermined` at most once; later session changes do not
    /// move a decided guard until [`remount`](Self::remount).
    pub fn evaluate(&mut self, session: &SessionSnapshot) -> GuardState {
        if self.state == GuardState::Undetermined {
            self.state = classify(session);
            if self.state != GuardState::Undetermined {
                tracing::debug!(state = ?self.state, "Route guard decided");
            }
        }
        self.state
    }

    /// Start over for a fresh mount of the protected screen
    pub fn remount(&mut self) {
        self.state = GuardState::Undetermined;
    }
}

/// Stateless classification of a session
pub fn classify(session: &SessionSnapshot) -> GuardState {
    if session.is_loading {
        GuardState::Undetermined
    } else if session.user.is_some() {
        GuardState::Authenticated
    } else {
        GuardState::Unauthenticated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::UserProfile;

    fn user() -> UserProfile {
        UserProfile {
            id: 1,
            username: "alice".into(),
            email: String::new(),
            first_name: String::new(),
            last_name: String::new(),
        }
    }

    fn loading() -> SessionSnapshot {
        SessionSnapshot {
            has_token: true,
            user: None,
            is_loading: true,
        }
    }

    fn signed_in() -> SessionSnapshot {
        SessionSnapshot {
            has_token: true,
            user: Some(user()),
            is_loading: false,
        }
    }

    #[test]
    fn missing_user_while_loading_is_undetermined() {
        let mut guard = RouteGuard::new();
        assert_eq!(guard.evaluate(&loading()), GuardState::Undetermined);
        assert_eq!(guard.evaluate(&loading()), GuardState::Undetermined);
    }

    #[test]
    fn settles_to_authenticated() {
        let mut guard = RouteGuard::new();
        guard.evaluate(&loading());
        assert_eq!(guard.evaluate(&signed_in()), GuardState::Authenticated);
    }

    #[test]
    fn settles_to_unauthenticated() {
        let mut guard = RouteGuard::new();
        guard.evaluate(&loading());
        assert_eq!(
            guard.evaluate(&SessionSnapshot::default()),
            GuardState::Unauthenticated
        );
    }

    #[test]
    fn decision_is_made_once_per_mount() {
        let mut guard = RouteGuard::new();
        assert_eq!(guard.evaluate(&signed_in()), GuardState::Authenticated);
        // A later reload does not flip the decided guard back
        assert_eq!(guard.evaluate(&loading()), GuardState::Authenticated);

        guard.remount();
        assert_eq!(guard.evaluate(&loading()), GuardState::Undetermined);
    }
}
