//! Session state machine
//!
//! `SessionStore` owns the token/user pair and the persisted token. It does
//! no I/O against the API: transitions that need the network return a
//! [`SessionCommand`] which the caller executes and feeds back through
//! [`SessionStore::settle_profile`].
//!
//! ```text
//!             set_token(t)                settle_profile(Ok)
//!   LoggedOut ────────────▶ Verifying(t) ───────────────────▶ Authenticated(t, user)
//!       ▲                        │                                   │
//!       └──── settle_profile(Err) / logout ◀──────────────────────────┘
//! ```
//!
//! Every token change bumps a generation counter. A profile result tagged
//! with an older generation is discarded, so a slow fetch for a previous
//! token can never resurrect a session.

use super::token_store::TokenStore;
use crate::api::{ApiError, TokenSource, UserProfile};
use std::sync::Mutex;

/// Work the session asks its driver to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Fetch the profile for `token`; report back with `generation`
    FetchProfile { token: String, generation: u64 },
}

/// What happened when a profile result was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProfileOutcome {
    Authenticated(UserProfile),
    /// The fetch failed and the session was cleared
    LoggedOut(ApiError),
    /// The result belonged to a superseded token and was ignored
    Stale,
}

/// Read-only copy of the session for rendering
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionSnapshot {
    pub has_token: bool,
    pub user: Option<UserProfile>,
    pub is_loading: bool,
}

pub struct SessionStore {
    token: Option<String>,
    user: Option<UserProfile>,
    is_loading: bool,
    /// A profile fetch for the current generation is outstanding
    profile_pending: bool,
    generation: u64,
    persisted: Box<dyn TokenStore>,
}

impl SessionStore {
    /// Build the store from persisted state
    ///
    /// With a persisted token the store starts loading and returns the
    /// profile fetch that will decide whether the token is still valid.
    pub fn new(persisted: Box<dyn TokenStore>) -> (Self, Option<SessionCommand>) {
        let token = match persisted.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Could not read persisted token: {}", e);
                None
            }
        };

        let mut store = Self {
            token: None,
            user: None,
            is_loading: false,
            profile_pending: false,
            generation: 0,
            persisted,
        };

        let command = token.map(|token| {
            tracing::info!("Restoring persisted session");
            store.enter_verifying(token)
        });
        (store, command)
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&UserProfile> {
        self.user.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            has_token: self.token.is_some(),
            user: self.user.clone(),
            is_loading: self.is_loading,
        }
    }

    /// Mark a login/register attempt as in flight
    pub fn begin_auth(&mut self) {
        self.is_loading = true;
    }

    /// A login/register attempt failed; token and user are left untouched
    ///
    /// Loading stays on only while a profile fetch is still outstanding.
    pub fn fail_auth(&mut self) {
        self.is_loading = self.profile_pending;
    }

    /// Adopt a freshly issued token and request its profile
    pub fn set_token(&mut self, token: impl Into<String>) -> SessionCommand {
        let token = token.into();
        if let Err(e) = self.persisted.save(&token) {
            tracing::warn!("Could not persist token: {}", e);
        }
        self.enter_verifying(token)
    }

    fn enter_verifying(&mut self, token: String) -> SessionCommand {
        self.generation += 1;
        self.token = Some(token.clone());
        self.user = None;
        self.is_loading = true;
        self.profile_pending = true;
        SessionCommand::FetchProfile {
            token,
            generation: self.generation,
        }
    }

    /// Apply the result of a profile fetch
    pub fn settle_profile(
        &mut self,
        generation: u64,
        result: Result<UserProfile, ApiError>,
    ) -> ProfileOutcome {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "Discarding stale profile result"
            );
            return ProfileOutcome::Stale;
        }
        self.profile_pending = false;

        match result {
            Ok(user) => {
                tracing::info!(user = %user.username, "Session authenticated");
                self.user = Some(user.clone());
                self.is_loading = false;
                ProfileOutcome::Authenticated(user)
            }
            Err(e) => {
                tracing::warn!("Profile fetch failed, logging out: {}", e);
                self.logout();
                ProfileOutcome::LoggedOut(e)
            }
        }
    }

    /// Clear token and user in memory and on disk; idempotent
    pub fn logout(&mut self) {
        if self.token.is_some() || self.user.is_some() {
            tracing::info!("Session cleared");
        }
        self.generation += 1;
        self.token = None;
        self.user = None;
        self.is_loading = false;
        self.profile_pending = false;
        if let Err(e) = self.persisted.clear() {
            tracing::warn!("Could not remove persisted token: {}", e);
        }
    }

    /// Handle a 401 seen by any API call
    ///
    /// Returns `true` only for the call that actually ended the session, so
    /// concurrent 401s produce a single redirect.
    pub fn expire(&mut self) -> bool {
        if self.token.is_none() && self.user.is_none() {
            return false;
        }
        self.logout();
        true
    }
}

impl TokenSource for Mutex<SessionStore> {
    fn current_token(&self) -> Option<String> {
        self.lock()
            .unwrap_or_else(|e| e.into_inner())
            .token()
            .map(str::to_string)
    }
}
