//! Authentication session: state, persistence and the async driver
//!
//! [`SessionStore`] is the only process-wide mutable state. It is shared as
//! [`SharedSession`] and mutated exclusively through [`Authenticator`],
//! which executes the store's commands against the API.

pub mod store;
pub mod token_store;

pub use store::{ProfileOutcome, SessionCommand, SessionSnapshot, SessionStore};
pub use token_store::{FileTokenStore, MemoryTokenStore, TokenStore};

use crate::api::{ApiClient, AuthError, Credentials, Registration, TokenAuthorizer};
use std::sync::{Arc, Mutex, MutexGuard};

/// Session shared between the UI loop, request tasks and the authorizer
pub type SharedSession = Arc<Mutex<SessionStore>>;

/// Drives login/register/logout/profile flows against the API
#[derive(Clone)]
pub struct Authenticator {
    api: ApiClient,
    session: SharedSession,
}

impl Authenticator {
    /// Wire the session into the client's pipeline
    ///
    /// Installs the token authorizer for URLs containing `api_marker`.
    /// Calling this again with the same client replaces the authorizer.
    pub fn new(api: ApiClient, session: SharedSession, api_marker: &str) -> Self {
        api.install(TokenAuthorizer::new(api_marker, session.clone()));
        Self { api, session }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    pub fn session(&self) -> &SharedSession {
        &self.session
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().snapshot()
    }

    fn lock(&self) -> MutexGuard<'_, SessionStore> {
        self.session.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Log in and verify the issued token
    ///
    /// `Err` means the server refused the credentials (session untouched).
    /// `Ok` carries how the follow-up profile fetch settled.
    pub async fn login(&self, username: &str, password: &str) -> Result<ProfileOutcome, AuthError> {
        let credentials = Credentials {
            username: username.to_string(),
            password: password.to_string(),
        };
        self.lock().begin_auth();
        match self.api.login(&credentials).await {
            Ok(response) => {
                tracing::info!(username, "Login accepted");
                let command = self.lock().set_token(response.token);
                Ok(self.run(command).await)
            }
            Err(e) => {
                self.lock().fail_auth();
                Err(e)
            }
        }
    }

    /// Create an account; on success behaves exactly like [`login`](Self::login)
    pub async fn register(&self, registration: &Registration) -> Result<ProfileOutcome, AuthError> {
        self.lock().begin_auth();
        match self.api.register(registration).await {
            Ok(response) => {
                tracing::info!(username = %registration.username, "Registration accepted");
                let command = self.lock().set_token(response.token);
                Ok(self.run(command).await)
            }
            Err(e) => {
                self.lock().fail_auth();
                Err(e)
            }
        }
    }

    pub fn logout(&self) {
        self.lock().logout();
    }

    /// Record a 401 from a resource call; `true` if this ended the session
    pub fn expire(&self) -> bool {
        self.lock().expire()
    }

    /// Execute a command returned by the store
    pub async fn run(&self, command: SessionCommand) -> ProfileOutcome {
        match command {
            SessionCommand::FetchProfile { token, generation } => {
                let result = self.api.profile(Some(&token)).await;
                self.lock().settle_profile(generation, result)
            }
        }
    }

    /// Settle the startup command, if the store produced one
    pub async fn restore(&self, command: Option<SessionCommand>) -> Option<ProfileOutcome> {
        match command {
            Some(command) => Some(self.run(command).await),
            None => None,
        }
    }
}
