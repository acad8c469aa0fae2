// TUI application state
//
// App owns the current screen, the per-screen view state and the overlays.
// Network work never runs on the UI loop: every fetch is spawned as a task
// that posts an AppMessage back, and the loop applies it on its next turn.

use super::clipboard::{self, CopyFormat};
use super::components::Toast;
use super::modal::Modal;
use super::theme::{Theme, ThemeKind};
use crate::api::AuthError;
use crate::config::Config;
use crate::guard::{GuardState, RouteGuard};
use crate::logging::LogBuffer;
use crate::session::{Authenticator, ProfileOutcome, SessionCommand, SessionSnapshot};
use crate::views::{
    self, Applied, BugDetailState, BugListState, BugPageResult, BugPageTicket, BugResult,
    BugTicket, DashboardState, LoginForm, RegisterForm, SeriesResult, SeriesTicket,
};
use std::time::Instant;
use tokio::sync::mpsc;

/// Spinner animation frames (braille dots)
const SPINNER_FRAMES: &[char] = &['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub const SESSION_EXPIRED: &str = "You need to log in again";

/// Routes of the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Login,
    Register,
    BugList,
    BugDetail(String),
    Dashboard,
}

impl Screen {
    /// Protected screens render only behind the route guard
    pub fn is_protected(&self) -> bool {
        !matches!(self, Screen::Login | Screen::Register)
    }

    pub fn is_form(&self) -> bool {
        !self.is_protected()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Screen::Login => "Login",
            Screen::Register => "Register",
            Screen::BugList => "Bugs",
            Screen::BugDetail(_) => "Bug",
            Screen::Dashboard => "Dashboard",
        }
    }
}

/// Results posted back to the UI loop by spawned tasks
#[derive(Debug)]
pub enum AppMessage {
    BugPage(BugPageResult),
    Bug(BugResult),
    Series(SeriesResult),
    /// Login or register settled
    Auth(Result<ProfileOutcome, AuthError>),
    /// Startup profile fetch for a persisted token settled
    Session(ProfileOutcome),
}

/// Main application state for the TUI
pub struct App {
    auth: Authenticator,
    tx: mpsc::Sender<AppMessage>,

    pub screen: Screen,
    guard: RouteGuard,
    /// Whether the current protected screen has issued its mount fetch
    mounted: bool,
    /// Protected screen to return to after logging in
    return_to: Screen,

    pub login: LoginForm,
    pub register: RegisterForm,
    pub bug_list: BugListState,
    pub detail: Option<BugDetailState>,
    pub dashboard: Option<DashboardState>,

    pub modal: Option<Modal>,
    pub toast: Option<Toast>,

    pub theme_kind: ThemeKind,
    pub theme: Theme,
    pub log_buffer: LogBuffer,
    pub show_logs: bool,

    pub should_quit: bool,
    pub start_time: Instant,
    spinner_frame: usize,
}

impl App {
    pub fn new(
        auth: Authenticator,
        tx: mpsc::Sender<AppMessage>,
        log_buffer: LogBuffer,
        config: &Config,
    ) -> Self {
        let theme_kind = ThemeKind::from_name(&config.theme);
        Self {
            auth,
            tx,
            screen: Screen::BugList,
            guard: RouteGuard::new(),
            mounted: false,
            return_to: Screen::BugList,
            login: LoginForm::new(),
            register: RegisterForm::new(),
            bug_list: BugListState::new(config.page_size),
            detail: None,
            dashboard: None,
            modal: None,
            toast: None,
            theme_kind,
            theme: theme_kind.theme(),
            log_buffer,
            show_logs: false,
            should_quit: false,
            start_time: Instant::now(),
            spinner_frame: 0,
        }
    }

    pub fn session(&self) -> SessionSnapshot {
        self.auth.snapshot()
    }

    pub fn guard_state(&self) -> GuardState {
        self.guard.state()
    }

    /// Settle a persisted token in the background
    pub fn restore_session(&self, command: SessionCommand) {
        let auth = self.auth.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let outcome = auth.run(command).await;
            let _ = tx.send(AppMessage::Session(outcome)).await;
        });
    }

    // ─────────────────────────────────────────────────────────────────────
    // Routing
    // ─────────────────────────────────────────────────────────────────────

    pub fn navigate(&mut self, screen: Screen) {
        tracing::debug!(screen = screen.name(), "Navigate");
        self.screen = screen;
        self.guard.remount();
        self.mounted = false;
        self.sync_guard();
    }

    /// Consult the route guard for the current screen
    ///
    /// Called after every input and message; mounts the screen the first
    /// time the guard lets it through and redirects when it does not.
    pub fn sync_guard(&mut self) {
        if !self.screen.is_protected() {
            return;
        }
        match self.guard.evaluate(&self.auth.snapshot()) {
            GuardState::Undetermined => {}
            GuardState::Unauthenticated => self.redirect_to_login(),
            GuardState::Authenticated => {
                if !self.mounted {
                    self.mounted = true;
                    self.mount_screen();
                }
            }
        }
    }

    fn redirect_to_login(&mut self) {
        if self.screen.is_protected() {
            self.return_to = self.screen.clone();
        }
        self.detail = None;
        self.dashboard = None;
        self.modal = None;
        self.navigate(Screen::Login);
    }

    fn mount_screen(&mut self) {
        match self.screen.clone() {
            Screen::BugList => {
                let ticket = self.bug_list.mount();
                self.spawn_bug_page(ticket);
            }
            Screen::BugDetail(bug_id) => {
                let (state, ticket) = BugDetailState::mount(bug_id);
                self.detail = Some(state);
                self.spawn_bug(ticket);
            }
            Screen::Dashboard => {
                let (state, ticket) = DashboardState::mount();
                self.dashboard = Some(state);
                self.spawn_series(ticket);
            }
            Screen::Login | Screen::Register => {}
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Background work
    // ─────────────────────────────────────────────────────────────────────

    fn spawn_bug_page(&self, ticket: BugPageTicket) {
        let api = self.auth.api().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let settled = views::load_bug_page(&api, ticket).await;
            let _ = tx.send(AppMessage::BugPage(settled)).await;
        });
    }

    fn spawn_bug(&self, ticket: BugTicket) {
        let api = self.auth.api().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let settled = views::load_bug(&api, ticket).await;
            let _ = tx.send(AppMessage::Bug(settled)).await;
        });
    }

    fn spawn_series(&self, ticket: SeriesTicket) {
        let api = self.auth.api().clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let settled = views::load_modifications(&api, ticket).await;
            let _ = tx.send(AppMessage::Series(settled)).await;
        });
    }

    /// Apply a message posted by a spawned task
    pub fn handle_message(&mut self, message: AppMessage) {
        match message {
            AppMessage::BugPage(settled) => {
                let applied = self.bug_list.apply(settled);
                self.after_apply(applied);
            }
            AppMessage::Bug(settled) => {
                if let Some(detail) = self.detail.as_mut() {
                    let applied = detail.apply(settled);
                    self.after_apply(applied);
                }
            }
            AppMessage::Series(settled) => {
                if let Some(dashboard) = self.dashboard.as_mut() {
                    let applied = dashboard.apply(settled);
                    self.after_apply(applied);
                }
            }
            AppMessage::Auth(result) => self.finish_auth(result),
            AppMessage::Session(outcome) => {
                if let ProfileOutcome::LoggedOut(e) = outcome {
                    tracing::info!("Stored session rejected: {}", e);
                }
            }
        }
        self.sync_guard();
    }

    fn after_apply(&mut self, applied: Applied) {
        if applied != Applied::Unauthorized {
            return;
        }
        if views::needs_login(&self.auth, &applied) {
            tracing::warn!("Session expired, redirecting to login");
            self.show_toast(SESSION_EXPIRED);
        }
        self.redirect_to_login();
    }

    // ─────────────────────────────────────────────────────────────────────
    // Auth screens
    // ─────────────────────────────────────────────────────────────────────

    pub fn submit_login(&mut self) {
        if self.login.form.submitting {
            return;
        }
        let Some(credentials) = self.login.submit() else {
            return;
        };
        self.login.form.submitting = true;

        let auth = self.auth.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = auth
                .login(&credentials.username, &credentials.password)
                .await;
            let _ = tx.send(AppMessage::Auth(result)).await;
        });
    }

    pub fn submit_register(&mut self) {
        if self.register.form.submitting {
            return;
        }
        let Some(registration) = self.register.submit() else {
            return;
        };
        self.register.form.submitting = true;

        let auth = self.auth.clone();
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let result = auth.register(&registration).await;
            let _ = tx.send(AppMessage::Auth(result)).await;
        });
    }

    fn finish_auth(&mut self, result: Result<ProfileOutcome, AuthError>) {
        let was_register = self.register.form.submitting;
        self.login.form.submitting = false;
        self.register.form.submitting = false;

        let form = if was_register {
            &mut self.register.form
        } else {
            &mut self.login.form
        };

        match result {
            Ok(ProfileOutcome::Authenticated(user)) => {
                form.clear_secrets();
                form.banner = None;
                let target = std::mem::replace(&mut self.return_to, Screen::BugList);
                self.show_toast(format!("Welcome, {}", user.display_name()));
                self.navigate(target);
            }
            Ok(ProfileOutcome::LoggedOut(e)) => {
                form.banner = Some(format!("Could not load your profile: {}", e.user_message()));
            }
            Ok(ProfileOutcome::Stale) => {}
            Err(e) => {
                form.banner = Some(e.to_string());
            }
        }
    }

    pub fn logout(&mut self) {
        self.auth.logout();
        self.bug_list = BugListState::new(self.bug_list.page_size());
        self.redirect_to_login();
        self.return_to = Screen::BugList;
        self.show_toast("Logged out");
    }

    // ─────────────────────────────────────────────────────────────────────
    // Bug list
    // ─────────────────────────────────────────────────────────────────────

    pub fn next_page(&mut self) {
        if let Some(ticket) = self.bug_list.next_page() {
            self.spawn_bug_page(ticket);
        }
    }

    pub fn prev_page(&mut self) {
        if let Some(ticket) = self.bug_list.prev_page() {
            self.spawn_bug_page(ticket);
        }
    }

    pub fn refresh_list(&mut self) {
        let ticket = self.bug_list.refresh();
        self.spawn_bug_page(ticket);
    }

    /// Step through the page size options
    pub fn change_page_size(&mut self, grow: bool) {
        const OPTIONS: [u32; 4] = [10, 20, 50, 100];
        let current = self.bug_list.page_size();
        let next = if grow {
            OPTIONS.iter().copied().find(|&n| n > current)
        } else {
            OPTIONS.iter().rev().copied().find(|&n| n < current)
        };
        if let Some(ticket) = next.and_then(|n| self.bug_list.set_page_size(n)) {
            self.spawn_bug_page(ticket);
        }
    }

    pub fn open_selected(&mut self) {
        if let Some(bug) = self.bug_list.selected_bug() {
            let bug_id = bug.bug_id.clone();
            self.navigate(Screen::BugDetail(bug_id));
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Bug detail
    // ─────────────────────────────────────────────────────────────────────

    /// Move the detail view to the neighbouring bug of the loaded page
    pub fn step_detail(&mut self, forward: bool) {
        let Some(current) = self.detail.as_ref().map(|d| d.bug_id().to_string()) else {
            return;
        };
        let rows = self.bug_list.visible_rows();
        let Some(pos) = rows.iter().position(|b| b.bug_id == current) else {
            return;
        };
        let target = if forward {
            rows.get(pos + 1)
        } else {
            pos.checked_sub(1).and_then(|i| rows.get(i))
        };
        let Some(bug_id) = target.map(|b| b.bug_id.clone()) else {
            return;
        };

        if forward {
            self.bug_list.select_next();
        } else {
            self.bug_list.select_prev();
        }
        let ticket = self.detail.as_mut().and_then(|d| d.set_bug_id(&bug_id));
        self.screen = Screen::BugDetail(bug_id);
        if let Some(ticket) = ticket {
            self.spawn_bug(ticket);
        }
    }

    pub fn reload_detail(&mut self) {
        if let Some(ticket) = self.detail.as_mut().map(|d| d.reload()) {
            self.spawn_bug(ticket);
        }
    }

    pub fn copy_detail(&mut self, format: CopyFormat) {
        let Some(bug) = self.detail.as_ref().and_then(|d| d.bug()) else {
            self.show_toast("Nothing to copy yet");
            return;
        };

        let copied = clipboard::render_bug(bug, format)
            .and_then(|text| clipboard::copy_to_clipboard(&text));
        let message = match copied {
            Ok(()) => format!("Copied {} as {}", bug.bug_id, format.label()),
            Err(e) => {
                tracing::warn!("Clipboard copy failed: {:#}", e);
                "Clipboard unavailable".to_string()
            }
        };
        self.show_toast(message);
    }

    // ─────────────────────────────────────────────────────────────────────
    // Dashboard
    // ─────────────────────────────────────────────────────────────────────

    pub fn reload_dashboard(&mut self) {
        if let Some(ticket) = self.dashboard.as_mut().map(|d| d.reload()) {
            self.spawn_series(ticket);
        }
    }

    // ─────────────────────────────────────────────────────────────────────
    // Chrome
    // ─────────────────────────────────────────────────────────────────────

    pub fn cycle_theme(&mut self) {
        self.theme_kind = self.theme_kind.next();
        self.theme = self.theme_kind.theme();
        self.show_toast(format!("Theme: {}", self.theme_kind.name()));
    }

    pub fn show_toast(&mut self, message: impl Into<String>) {
        self.toast = Some(Toast::new(message));
    }

    /// Advance animation and drop expired overlays
    pub fn tick(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % SPINNER_FRAMES.len();
        if self.toast.as_ref().is_some_and(|t| t.is_expired()) {
            self.toast = None;
        }
    }

    pub fn spinner_char(&self) -> char {
        SPINNER_FRAMES[self.spinner_frame]
    }

    /// Whether any request of the current screen is in flight
    pub fn is_busy(&self) -> bool {
        match &self.screen {
            Screen::Login => self.login.form.submitting,
            Screen::Register => self.register.form.submitting,
            Screen::BugList => self.bug_list.is_loading(),
            Screen::BugDetail(_) => self.detail.as_ref().is_some_and(|d| d.is_loading()),
            Screen::Dashboard => self.dashboard.as_ref().is_some_and(|d| d.is_loading()),
        }
    }

    pub fn uptime(&self) -> String {
        let secs = self.start_time.elapsed().as_secs();
        format!("{:02}:{:02}:{:02}", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiClient;
    use crate::session::{MemoryTokenStore, SessionStore};
    use crate::views::{DetailContent, SeriesContent};
    use httpmock::prelude::*;
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn bug_json(id: &str) -> serde_json::Value {
        json!({
            "bug_id": id,
            "subject": format!("Subject of {id}"),
            "description": "",
            "status": "open",
            "priority": "high",
            "created_at": "2025-04-01T10:00:00Z",
            "updated_at": "2025-04-01T10:00:00Z",
            "modified_count": 0
        })
    }

    fn profile_json() -> serde_json::Value {
        json!({"id": 1, "username": "alice", "email": "a@example.com"})
    }

    /// App wired to `server` with an optional persisted token
    fn app(
        server: &MockServer,
        token: Option<&str>,
    ) -> (App, mpsc::Receiver<AppMessage>, Option<SessionCommand>) {
        let api = ApiClient::new(&server.url("/api"), None).unwrap();
        let (store, command) = SessionStore::new(Box::new(MemoryTokenStore::new(token)));
        let auth = Authenticator::new(api, Arc::new(Mutex::new(store)), "/api/");
        let (tx, rx) = mpsc::channel(16);
        let app = App::new(auth, tx, LogBuffer::new(), &Config::default());
        (app, rx, command)
    }

    async fn pump(app: &mut App, rx: &mut mpsc::Receiver<AppMessage>) {
        let message = rx.recv().await.unwrap();
        app.handle_message(message);
    }

    #[tokio::test]
    async fn without_token_the_guard_redirects_to_login() {
        let server = MockServer::start_async().await;
        let (mut app, _rx, command) = app(&server, None);
        assert!(command.is_none());

        app.sync_guard();
        assert_eq!(app.screen, Screen::Login);
    }

    #[tokio::test]
    async fn stored_token_waits_for_profile_then_mounts_list() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/auth/profile/");
                then.status(200).json_body(profile_json());
            })
            .await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/api/bugs/")
                    .header("authorization", "Token saved");
                then.status(200).json_body(json!({
                    "count": 1, "next": null, "previous": null,
                    "results": [bug_json("BUG-1")]
                }));
            })
            .await;

        let (mut app, mut rx, command) = app(&server, Some("saved"));
        app.sync_guard();
        // Profile still loading: no decision, no fetch
        assert_eq!(app.guard_state(), GuardState::Undetermined);
        assert_eq!(app.screen, Screen::BugList);

        app.restore_session(command.unwrap());
        pump(&mut app, &mut rx).await;
        assert_eq!(app.guard_state(), GuardState::Authenticated);

        pump(&mut app, &mut rx).await;
        assert_eq!(app.bug_list.visible_rows().len(), 1);
        list.assert_async().await;
    }

    #[tokio::test]
    async fn unauthorized_detail_redirects_with_toast() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/login/");
                then.status(200).json_body(json!({"token": "abc"}));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/auth/profile/");
                then.status(200).json_body(profile_json());
            })
            .await;
        let detail = server
            .mock_async(|when, then| {
                when.method(GET).path("/api/bugs/BUG-9/");
                then.status(401);
            })
            .await;

        let (mut app, mut rx, _) = app(&server, None);
        app.navigate(Screen::BugDetail("BUG-9".to_string()));
        assert_eq!(app.screen, Screen::Login);

        for c in "alice".chars() {
            app.login.form.input(c);
        }
        app.login.form.focus_next();
        for c in "secret".chars() {
            app.login.form.input(c);
        }
        app.submit_login();
        pump(&mut app, &mut rx).await;

        // Login returns to the screen that asked for it
        assert_eq!(app.screen, Screen::BugDetail("BUG-9".to_string()));
        pump(&mut app, &mut rx).await;

        assert_eq!(app.screen, Screen::Login);
        assert_eq!(app.toast.as_ref().map(|t| t.message.as_str()), Some(SESSION_EXPIRED));
        assert!(!app.session().has_token);
        detail.assert_hits_async(1).await;
    }

    #[tokio::test]
    async fn failed_login_shows_server_message() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/api/auth/login/");
                then.status(400).json_body(json!({"error": "Invalid Credentials"}));
            })
            .await;

        let (mut app, mut rx, _) = app(&server, None);
        app.navigate(Screen::Login);
        app.login.form.input('a');
        app.login.form.focus_next();
        app.login.form.input('b');
        app.submit_login();
        assert!(app.is_busy());

        pump(&mut app, &mut rx).await;
        assert!(!app.is_busy());
        assert_eq!(app.screen, Screen::Login);
        assert_eq!(app.login.form.banner.as_deref(), Some("Invalid Credentials"));
    }

    #[tokio::test]
    async fn dashboard_and_detail_render_fetched_data() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/auth/profile/");
                then.status(200).json_body(profile_json());
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/bug_modifications/");
                then.status(200).json_body(json!([]));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/api/bugs/BUG-404/");
                then.status(404);
            })
            .await;

        let (mut app, mut rx, command) = app(&server, Some("saved"));
        // Navigating while the profile loads defers the mount
        app.navigate(Screen::Dashboard);
        assert!(app.dashboard.is_none());

        app.restore_session(command.unwrap());
        pump(&mut app, &mut rx).await;
        pump(&mut app, &mut rx).await;
        assert_eq!(
            app.dashboard.as_ref().map(|d| d.content().clone()),
            Some(SeriesContent::Empty)
        );

        app.navigate(Screen::BugDetail("BUG-404".to_string()));
        pump(&mut app, &mut rx).await;
        assert_eq!(
            app.detail.as_ref().map(|d| d.content().clone()),
            Some(DetailContent::NotFound)
        );
    }

    #[test]
    fn screen_protection() {
        assert!(!Screen::Login.is_protected());
        assert!(!Screen::Register.is_protected());
        assert!(Screen::BugList.is_protected());
        assert!(Screen::BugDetail("BUG-1".to_string()).is_protected());
        assert!(Screen::Dashboard.is_protected());
    }
}
