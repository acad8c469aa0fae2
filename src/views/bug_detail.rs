//! Single bug view

use super::fetch::{Applied, FetchResult, FetchTicket, FetchTracker};
use crate::api::{ApiError, Bug};
use chrono::{DateTime, Local, Utc};

pub type BugTicket = FetchTicket<String>;
pub type BugResult = FetchResult<String, Bug>;

#[derive(Debug, Clone, PartialEq)]
pub enum DetailContent {
    Loading,
    Loaded(Bug),
    NotFound,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct BugDetailState {
    bug_id: String,
    content: DetailContent,
    tracker: FetchTracker<String>,
}

impl BugDetailState {
    /// Mount for `bug_id`, returning the initial fetch
    pub fn mount(bug_id: impl Into<String>) -> (Self, BugTicket) {
        let bug_id = bug_id.into();
        let mut state = Self {
            bug_id: bug_id.clone(),
            content: DetailContent::Loading,
            tracker: FetchTracker::default(),
        };
        let ticket = state.tracker.issue(bug_id);
        (state, ticket)
    }

    /// Switch to another bug; `None` if it is already shown
    pub fn set_bug_id(&mut self, bug_id: &str) -> Option<BugTicket> {
        if bug_id == self.bug_id {
            return None;
        }
        self.bug_id = bug_id.to_string();
        Some(self.reload())
    }

    pub fn reload(&mut self) -> BugTicket {
        self.content = DetailContent::Loading;
        self.tracker.issue(self.bug_id.clone())
    }

    pub fn apply(&mut self, settled: BugResult) -> Applied {
        if !self.tracker.accept(&settled.ticket) {
            return Applied::Stale;
        }

        self.content = match settled.result {
            Ok(bug) => DetailContent::Loaded(bug),
            Err(ApiError::NotFound) => DetailContent::NotFound,
            Err(ApiError::Unauthorized) => {
                self.content = DetailContent::Loading;
                return Applied::Unauthorized;
            }
            Err(e) => DetailContent::Failed(e.user_message()),
        };
        Applied::Committed
    }

    pub fn bug_id(&self) -> &str {
        &self.bug_id
    }

    pub fn content(&self) -> &DetailContent {
        &self.content
    }

    pub fn bug(&self) -> Option<&Bug> {
        match &self.content {
            DetailContent::Loaded(bug) => Some(bug),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.tracker.in_flight()
    }
}

/// Label/value rows for the detail panel, in display order
pub fn detail_fields(bug: &Bug) -> Vec<(&'static str, String)> {
    vec![
        ("Bug ID", bug.bug_id.clone()),
        ("Subject", bug.subject.clone()),
        ("Status", bug.status.tag()),
        ("Priority", bug.priority.tag()),
        ("Created At", local_time(&bug.created_at)),
        ("Updated At", local_time(&bug.updated_at)),
        ("Modified Count", bug.modified_count.to_string()),
        ("Description", bug.description.clone()),
    ]
}

/// Readable plain-text export used by the clipboard
pub fn to_plain_text(bug: &Bug) -> String {
    detail_fields(bug)
        .into_iter()
        .map(|(label, value)| format!("{label}: {value}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn local_time(at: &DateTime<Utc>) -> String {
    at.with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}
