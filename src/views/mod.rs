//! Screen state independent of the terminal
//!
//! Each view owns its loading flag, its data and a fetch tracker. Fetches
//! are issued as tickets; [`load_bug_page`], [`load_bug`] and
//! [`load_modifications`] resolve a ticket against the API so the caller
//! can run them on a task and hand the result back with `apply`.

pub mod bug_detail;
pub mod bug_list;
pub mod dashboard;
pub mod fetch;
pub mod forms;

pub use bug_detail::{BugDetailState, BugResult, BugTicket, DetailContent};
pub use bug_list::{BugListState, BugPageResult, BugPageTicket, SortOrder};
pub use dashboard::{ChartKind, DashboardState, SeriesContent, SeriesResult, SeriesTicket};
pub use fetch::{Applied, FetchResult};
pub use forms::{LoginForm, RegisterForm};

use crate::api::ApiClient;
use crate::session::Authenticator;

pub async fn load_bug_page(api: &ApiClient, ticket: BugPageTicket) -> BugPageResult {
    let result = api.list_bugs(ticket.params).await;
    FetchResult::new(ticket, result)
}

pub async fn load_bug(api: &ApiClient, ticket: BugTicket) -> BugResult {
    let result = api.get_bug(&ticket.params).await;
    FetchResult::new(ticket, result)
}

pub async fn load_modifications(api: &ApiClient, ticket: SeriesTicket) -> SeriesResult {
    let result = api.modifications().await;
    FetchResult::new(ticket, result)
}

/// React to how a view applied a response
///
/// Returns `true` when the caller must redirect to login. Only the first
/// 401 of a session ends it; later ones find it already cleared.
pub fn needs_login(auth: &Authenticator, applied: &Applied) -> bool {
    match applied {
        Applied::Unauthorized => auth.expire(),
        Applied::Committed | Applied::Stale => false,
    }
}
