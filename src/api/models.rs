//! Wire types for the bug tracker REST API
//!
//! These mirror the server's JSON exactly. The client never reshapes a
//! response beyond assembling a [`Page`] from the pagination envelope.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Default page size used when the caller does not pick one
pub const DEFAULT_PAGE_SIZE: u32 = 10;

// ─────────────────────────────────────────────────────────────────────────────
// Bugs
// ─────────────────────────────────────────────────────────────────────────────

/// Lifecycle status of a bug
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BugStatus {
    Open,
    InProgress,
    Resolved,
    Closed,
}

impl BugStatus {
    pub fn all() -> &'static [BugStatus] {
        &[
            BugStatus::Open,
            BugStatus::InProgress,
            BugStatus::Resolved,
            BugStatus::Closed,
        ]
    }

    /// Wire value ("in_progress")
    pub fn as_str(&self) -> &'static str {
        match self {
            BugStatus::Open => "open",
            BugStatus::InProgress => "in_progress",
            BugStatus::Resolved => "resolved",
            BugStatus::Closed => "closed",
        }
    }

    /// Tag text shown in the UI ("IN PROGRESS")
    pub fn tag(&self) -> String {
        self.as_str().replace('_', " ").to_uppercase()
    }
}

impl fmt::Display for BugStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Priority of a bug
///
/// The server has stored mixed-case values in the past ("Medium"), so
/// deserialization accepts any casing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BugPriority {
    Low,
    Medium,
    High,
}

impl BugPriority {
    pub fn all() -> &'static [BugPriority] {
        &[BugPriority::Low, BugPriority::Medium, BugPriority::High]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BugPriority::Low => "low",
            BugPriority::Medium => "medium",
            BugPriority::High => "high",
        }
    }

    pub fn tag(&self) -> String {
        self.as_str().to_uppercase()
    }
}

impl fmt::Display for BugPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for BugPriority {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.to_lowercase().as_str() {
            "low" => Ok(BugPriority::Low),
            "medium" => Ok(BugPriority::Medium),
            "high" => Ok(BugPriority::High),
            other => Err(serde::de::Error::unknown_variant(
                other,
                &["low", "medium", "high"],
            )),
        }
    }
}

/// A tracked defect, read-only from the client's perspective
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bug {
    pub bug_id: String,
    pub subject: String,
    #[serde(default)]
    pub description: String,
    pub status: BugStatus,
    pub priority: BugPriority,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub modified_count: u32,
}

// ─────────────────────────────────────────────────────────────────────────────
// Dashboard series
// ─────────────────────────────────────────────────────────────────────────────

/// One `(date, count)` sample of the modification time series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModificationPoint {
    pub date: NaiveDate,
    pub count: u64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Pagination
// ─────────────────────────────────────────────────────────────────────────────

/// Pagination parameters for list endpoints (both 1-based / non-zero)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    /// Build a request, clamping zero values up to 1
    pub fn new(page: u32, page_size: u32) -> Self {
        Self {
            page: page.max(1),
            page_size: page_size.max(1),
        }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(1, DEFAULT_PAGE_SIZE)
    }
}

/// A server-paginated window of results
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Page<T> {
    pub results: Vec<T>,
    pub count: u64,
    pub page: u32,
    pub page_size: u32,
}

impl<T> Page<T> {
    /// Number of pages needed for `count` items (at least 1)
    pub fn total_pages(&self) -> u32 {
        total_pages(self.count, self.page_size)
    }
}

/// Number of pages for `count` items at `page_size` per page, never below 1
pub fn total_pages(count: u64, page_size: u32) -> u32 {
    let size = u64::from(page_size.max(1));
    count.div_ceil(size).max(1) as u32
}

/// List response body as the server sends it
///
/// The paginated variant is the Django REST envelope; unpaginated
/// deployments answer with a bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListEnvelope<T> {
    Paginated {
        count: u64,
        #[allow(dead_code)]
        next: Option<String>,
        #[allow(dead_code)]
        previous: Option<String>,
        results: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> ListEnvelope<T> {
    pub(crate) fn into_page(self, request: PageRequest) -> Page<T> {
        match self {
            ListEnvelope::Paginated { count, results, .. } => Page {
                results,
                count,
                page: request.page,
                page_size: request.page_size,
            },
            // Unpaginated server: cut the requested window out of the full list
            ListEnvelope::Bare(all) => {
                let count = all.len() as u64;
                let skip = (request.page as usize - 1).saturating_mul(request.page_size as usize);
                let results = all
                    .into_iter()
                    .skip(skip)
                    .take(request.page_size as usize)
                    .collect();
                Page {
                    results,
                    count,
                    page: request.page,
                    page_size: request.page_size,
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Auth
// ─────────────────────────────────────────────────────────────────────────────

/// Profile of the authenticated user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl UserProfile {
    /// Full name when known, otherwise the username
    pub fn display_name(&self) -> String {
        let full = format!("{} {}", self.first_name, self.last_name);
        let full = full.trim();
        if full.is_empty() {
            self.username.clone()
        } else {
            full.to_string()
        }
    }
}

/// Login request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

/// Register request body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub password: String,
    pub password2: String,
}

/// Successful login/register response
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub token: String,
    #[serde(default)]
    pub user: Option<UserProfile>,
}
