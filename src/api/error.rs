//! API and authentication error types

use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error;

/// Message shown for transport failures on the auth screens
pub const NETWORK_ERROR_MESSAGE: &str = "Network error. Please try again later.";

/// Failure of a single API request
///
/// Every resource call resolves to exactly one of these; the caller decides
/// whether it becomes a redirect, an alert or an empty state.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// HTTP 401: the session token is missing, expired or revoked
    #[error("unauthorized")]
    Unauthorized,

    /// Any other non-2xx response
    #[error("request failed with status {status}: {message}")]
    Http { status: u16, message: String },

    /// Connection refused, DNS failure, reset, timeout
    #[error("network error: {0}")]
    Transport(String),

    /// The query succeeded but there is no matching record
    #[error("not found")]
    NotFound,

    /// 2xx response whose body did not match the expected shape
    #[error("unexpected response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn http(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Http {
            status: status.as_u16(),
            message: message.into(),
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized)
    }

    /// Short text for an inline alert
    pub fn user_message(&self) -> String {
        match self {
            ApiError::Unauthorized => "You need to log in again".to_string(),
            ApiError::Http { status, .. } => format!("Failed to load data (HTTP {status})"),
            ApiError::Transport(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ApiError::NotFound => "Not found".to_string(),
            ApiError::Decode(_) => "Server sent an unexpected response".to_string(),
        }
    }
}

/// Failure of a login or register attempt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The server refused the request; carries the message to show
    #[error("{0}")]
    Rejected(String),

    #[error("Network error. Please try again later.")]
    Network,

    #[error("unexpected error: {0}")]
    Unexpected(String),
}

/// Field names the register endpoint reports validation errors under,
/// in the order the form shows them
const FIELD_ERROR_KEYS: &[&str] = &["username", "email", "password", "password2"];

/// Pull a human readable message out of an auth error body
///
/// Login answers `{"error": "..."}`; register answers Django REST field
/// errors such as `{"username": ["A user with that username already exists."]}`.
pub fn extract_server_message(body: &Value) -> Option<String> {
    if let Some(msg) = body.get("error").and_then(Value::as_str) {
        return Some(msg.to_string());
    }
    if let Some(msg) = body.get("detail").and_then(Value::as_str) {
        return Some(msg.to_string());
    }
    FIELD_ERROR_KEYS.iter().find_map(|key| match body.get(*key)? {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) => items.iter().find_map(Value::as_str).map(str::to_string),
        _ => None,
    })
}
