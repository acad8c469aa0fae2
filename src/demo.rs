// Demo bug tracker
//
// An in-process mock of the bug tracker REST API, served on a random
// localhost port. `--demo` points the client at it so the TUI can be tried
// without a backend, and the session tests use it as a real HTTP peer.
//
// Accounts and tokens live in memory and vanish with the process.

use crate::api::{
    Bug, BugPriority, BugStatus, Credentials, ModificationPoint, Registration, UserProfile,
};
use anyhow::{Context, Result};
use axum::{
    extract::{Path, Query, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const DEMO_USERNAME: &str = "demo";
pub const DEMO_PASSWORD: &str = "demo";

/// Number of fixture bugs served by the demo
pub const FIXTURE_BUGS: usize = 23;

const SUBJECTS: &[&str] = &[
    "Login button unresponsive on slow networks",
    "Pagination skips the last page",
    "Dashboard chart renders upside down",
    "Session survives password change",
    "Typo in registration email",
    "Detail page shows stale priority",
    "CSV export drops unicode characters",
    "Timezone offset applied twice",
];

// ─────────────────────────────────────────────────────────────────────────────
// State
// ─────────────────────────────────────────────────────────────────────────────

struct Account {
    profile: UserProfile,
    password: String,
}

struct DemoState {
    bugs: Vec<Bug>,
    series: Vec<ModificationPoint>,
    accounts: Mutex<HashMap<String, Account>>,
    /// token -> username
    tokens: Mutex<HashMap<String, String>>,
    next_id: AtomicU64,
}

type SharedDemo = Arc<DemoState>;

impl DemoState {
    fn new(today: NaiveDate) -> Self {
        let mut accounts = HashMap::new();
        accounts.insert(
            DEMO_USERNAME.to_string(),
            Account {
                profile: UserProfile {
                    id: 1,
                    username: DEMO_USERNAME.to_string(),
                    email: "demo@example.com".to_string(),
                    first_name: "Demo".to_string(),
                    last_name: "User".to_string(),
                },
                password: DEMO_PASSWORD.to_string(),
            },
        );

        Self {
            bugs: fixture_bugs(),
            series: fixture_series(today),
            accounts: Mutex::new(accounts),
            tokens: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(2),
        }
    }

    fn accounts(&self) -> MutexGuard<'_, HashMap<String, Account>> {
        self.accounts.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn tokens(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.tokens.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn issue_token(&self, username: &str) -> String {
        let n = self.next_id.fetch_add(1, Ordering::Relaxed);
        let token = format!("demo-{:08x}{:08x}", n, Utc::now().timestamp_subsec_nanos());
        self.tokens().insert(token.clone(), username.to_string());
        token
    }

    /// Resolve the `Authorization: Token <t>` header to a profile
    fn authorize(&self, headers: &HeaderMap) -> Result<UserProfile, DemoError> {
        let value = headers
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(DemoError::Unauthenticated)?;
        let token = value
            .strip_prefix("Token ")
            .ok_or(DemoError::InvalidToken)?;

        let username = self
            .tokens()
            .get(token.trim())
            .cloned()
            .ok_or(DemoError::InvalidToken)?;

        self.accounts()
            .get(&username)
            .map(|a| a.profile.clone())
            .ok_or(DemoError::InvalidToken)
    }
}

fn fixture_bugs() -> Vec<Bug> {
    let base = Utc
        .with_ymd_and_hms(2025, 3, 1, 9, 0, 0)
        .single()
        .unwrap_or_else(Utc::now);
    let statuses = BugStatus::all();
    let priorities = BugPriority::all();

    (0..FIXTURE_BUGS)
        .map(|i| {
            let created_at = base + Duration::days(i as i64) + Duration::minutes(17 * i as i64);
            let modified_count = (i * 7 % 5) as u32;
            Bug {
                bug_id: format!("BUG-{}", 101 + i),
                subject: SUBJECTS[i % SUBJECTS.len()].to_string(),
                description: format!(
                    "Reported from the demo data set.\nSteps to reproduce: follow case {}.",
                    i + 1
                ),
                status: statuses[i % statuses.len()],
                priority: priorities[(i / 2) % priorities.len()],
                created_at,
                updated_at: created_at + Duration::hours(3 * modified_count as i64),
                modified_count,
            }
        })
        .collect()
}

/// A week of samples ending at `today`
fn fixture_series(today: NaiveDate) -> Vec<ModificationPoint> {
    const COUNTS: [u64; 7] = [3, 5, 2, 8, 4, 6, 7];
    COUNTS
        .iter()
        .enumerate()
        .map(|(i, &count)| ModificationPoint {
            date: today - Duration::days((COUNTS.len() - 1 - i) as i64),
            count,
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum DemoError {
    Unauthenticated,
    InvalidToken,
    NotFound,
    InvalidPage,
    InvalidCredentials,
    /// Field-level validation errors, serialized as `{field: [message]}`
    Validation(&'static str, String),
}

impl IntoResponse for DemoError {
    fn into_response(self) -> axum::response::Response {
        let (status, body) = match self {
            DemoError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                json!({"detail": "Authentication credentials were not provided."}),
            ),
            DemoError::InvalidToken => (
                StatusCode::UNAUTHORIZED,
                json!({"detail": "Invalid token."}),
            ),
            DemoError::NotFound => (StatusCode::NOT_FOUND, json!({"detail": "Not found."})),
            DemoError::InvalidPage => (StatusCode::NOT_FOUND, json!({"detail": "Invalid page."})),
            DemoError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                json!({"error": "Invalid Credentials"}),
            ),
            DemoError::Validation(field, message) => {
                (StatusCode::BAD_REQUEST, json!({ field: [message] }))
            }
        };

        tracing::debug!(%status, "Demo API error response");

        (status, Json(body)).into_response()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handlers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct ListParams {
    page: Option<u32>,
    page_size: Option<u32>,
}

async fn list_bugs(
    State(state): State<SharedDemo>,
    headers: HeaderMap,
    Query(params): Query<ListParams>,
) -> Result<Json<Value>, DemoError> {
    state.authorize(&headers)?;

    let page = params.page.unwrap_or(1).max(1) as usize;
    let page_size = params.page_size.unwrap_or(10).clamp(1, 100) as usize;
    let count = state.bugs.len();
    let start = (page - 1) * page_size;

    if start >= count && page > 1 {
        return Err(DemoError::InvalidPage);
    }

    let results: Vec<&Bug> = state.bugs.iter().skip(start).take(page_size).collect();
    let link = |p: usize| format!("/api/bugs/?page={p}&page_size={page_size}");
    let next = (start + page_size < count).then(|| link(page + 1));
    let previous = (page > 1).then(|| link(page - 1));

    Ok(Json(json!({
        "count": count,
        "next": next,
        "previous": previous,
        "results": results,
    })))
}

async fn get_bug(
    State(state): State<SharedDemo>,
    headers: HeaderMap,
    Path(bug_id): Path<String>,
) -> Result<Json<Bug>, DemoError> {
    state.authorize(&headers)?;
    state
        .bugs
        .iter()
        .find(|b| b.bug_id == bug_id)
        .cloned()
        .map(Json)
        .ok_or(DemoError::NotFound)
}

async fn modifications(
    State(state): State<SharedDemo>,
    headers: HeaderMap,
) -> Result<Json<Vec<ModificationPoint>>, DemoError> {
    state.authorize(&headers)?;
    Ok(Json(state.series.clone()))
}

async fn login(
    State(state): State<SharedDemo>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<Value>, DemoError> {
    let profile = {
        let accounts = state.accounts();
        match accounts.get(&credentials.username) {
            Some(account) if account.password == credentials.password => account.profile.clone(),
            _ => return Err(DemoError::InvalidCredentials),
        }
    };

    let token = state.issue_token(&profile.username);
    tracing::debug!(username = %profile.username, "Demo login");
    Ok(Json(json!({ "token": token, "user": profile })))
}

async fn register(
    State(state): State<SharedDemo>,
    Json(registration): Json<Registration>,
) -> Result<(StatusCode, Json<Value>), DemoError> {
    if registration.password != registration.password2 {
        return Err(DemoError::Validation(
            "password",
            "Password fields didn't match.".to_string(),
        ));
    }

    let profile = {
        let mut accounts = state.accounts();
        if accounts.contains_key(&registration.username) {
            return Err(DemoError::Validation(
                "username",
                "A user with that username already exists.".to_string(),
            ));
        }
        let profile = UserProfile {
            id: state.next_id.fetch_add(1, Ordering::Relaxed),
            username: registration.username.clone(),
            email: registration.email.clone(),
            first_name: String::new(),
            last_name: String::new(),
        };
        accounts.insert(
            registration.username.clone(),
            Account {
                profile: profile.clone(),
                password: registration.password.clone(),
            },
        );
        profile
    };

    let token = state.issue_token(&profile.username);
    tracing::debug!(username = %profile.username, "Demo registration");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "user": profile })),
    ))
}

async fn profile(
    State(state): State<SharedDemo>,
    headers: HeaderMap,
) -> Result<Json<UserProfile>, DemoError> {
    state.authorize(&headers).map(Json)
}

fn router(state: SharedDemo) -> Router {
    Router::new()
        .route("/api/bugs/", get(list_bugs))
        .route("/api/bugs/:bug_id/", get(get_bug))
        .route("/api/bug_modifications/", get(modifications))
        .route("/api/auth/login/", post(login))
        .route("/api/auth/register/", post(register))
        .route("/api/auth/profile/", get(profile))
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────────────────────────────────────

/// A running demo server; stops when dropped
pub struct DemoServer {
    api_url: String,
    handle: JoinHandle<()>,
}

impl DemoServer {
    /// Base URL to hand to the API client, e.g. `http://127.0.0.1:40123/api`
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

impl Drop for DemoServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Bind to an ephemeral localhost port and serve the demo API
pub async fn spawn() -> Result<DemoServer> {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .context("Failed to bind demo server")?;
    let addr = listener
        .local_addr()
        .context("Failed to read demo server address")?;

    let state = Arc::new(DemoState::new(Utc::now().date_naive()));
    let app = router(state);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            tracing::error!("Demo server stopped: {}", e);
        }
    });

    let api_url = format!("http://{}/api", addr);
    tracing::info!(url = %api_url, "Demo API listening");

    Ok(DemoServer { api_url, handle })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{ApiClient, ApiError, AuthError, PageRequest};
    use crate::session::{Authenticator, MemoryTokenStore, ProfileOutcome, SessionStore};

    async fn connect(server: &DemoServer) -> Authenticator {
        let api = ApiClient::new(server.api_url(), None).unwrap();
        let (store, _) = SessionStore::new(Box::new(MemoryTokenStore::new(None)));
        Authenticator::new(api, Arc::new(Mutex::new(store)), "/api/")
    }

    #[test]
    fn fixture_series_is_one_week_ending_today() {
        let today = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();
        let series = fixture_series(today);
        assert_eq!(series.len(), 7);
        assert_eq!(series[0].date, NaiveDate::from_ymd_opt(2025, 4, 1).unwrap());
        assert_eq!(series[6].date, today);
    }

    #[tokio::test]
    async fn resources_require_a_token() {
        let server = spawn().await.unwrap();
        let api = ApiClient::new(server.api_url(), None).unwrap();

        let err = api.list_bugs(PageRequest::default()).await.unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
        assert_eq!(api.modifications().await.unwrap_err(), ApiError::Unauthorized);
    }

    #[tokio::test]
    async fn demo_login_then_browse() {
        let server = spawn().await.unwrap();
        let auth = connect(&server).await;

        let outcome = auth.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
        assert!(matches!(outcome, ProfileOutcome::Authenticated(ref u) if u.username == "demo"));

        let api = auth.api();
        let last = api.list_bugs(PageRequest::new(3, 10)).await.unwrap();
        assert_eq!(last.count, FIXTURE_BUGS as u64);
        assert_eq!(last.results.len(), 3);
        assert_eq!(last.total_pages(), 3);

        let bug = api.get_bug("BUG-101").await.unwrap();
        assert_eq!(bug.status, BugStatus::Open);
        assert_eq!(api.get_bug("BUG-999").await.unwrap_err(), ApiError::NotFound);

        assert_eq!(api.modifications().await.unwrap().len(), 7);
    }

    #[tokio::test]
    async fn wrong_password_is_rejected_with_server_message() {
        let server = spawn().await.unwrap();
        let auth = connect(&server).await;

        let err = auth.login(DEMO_USERNAME, "nope").await.unwrap_err();
        assert_eq!(err, AuthError::Rejected("Invalid Credentials".to_string()));

        let session = auth.snapshot();
        assert!(!session.has_token);
        assert!(!session.is_loading);
    }

    #[tokio::test]
    async fn register_logs_the_new_user_in() {
        let server = spawn().await.unwrap();
        let auth = connect(&server).await;

        let registration = Registration {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "secret1".to_string(),
            password2: "secret1".to_string(),
        };
        let outcome = auth.register(&registration).await.unwrap();
        assert!(matches!(outcome, ProfileOutcome::Authenticated(ref u) if u.username == "alice"));

        // The same username cannot register twice
        let err = auth.register(&registration).await.unwrap_err();
        assert_eq!(
            err,
            AuthError::Rejected("A user with that username already exists.".to_string())
        );
    }

    #[tokio::test]
    async fn mismatched_passwords_are_a_field_error() {
        let server = spawn().await.unwrap();
        let auth = connect(&server).await;

        let err = auth
            .register(&Registration {
                username: "bob".to_string(),
                email: "bob@example.com".to_string(),
                password: "secret1".to_string(),
                password2: "secret2".to_string(),
            })
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Rejected("Password fields didn't match.".to_string()));
    }

    #[tokio::test]
    async fn logout_drops_authorization() {
        let server = spawn().await.unwrap();
        let auth = connect(&server).await;
        auth.login(DEMO_USERNAME, DEMO_PASSWORD).await.unwrap();
        auth.logout();

        let err = auth.api().get_bug("BUG-101").await.unwrap_err();
        assert_eq!(err, ApiError::Unauthorized);
    }
}
