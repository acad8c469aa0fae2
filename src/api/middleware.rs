//! Request middleware pipeline for the API client
//!
//! Every outgoing request built by [`ApiClient`](super::ApiClient) passes
//! through a [`RequestPipeline`] before it is executed. Middleware are pure
//! `Request -> Request` steps; they never send anything themselves.
//!
//! # Architecture
//!
//! ```text
//! ApiClient builds Request → RequestPipeline → [Middleware₁, Middleware₂, ...] → reqwest execute
//! ```
//!
//! Middleware are identified by name. Registering a second middleware under
//! a name that is already present replaces the first one, so installing the
//! token authorizer twice never stacks two Authorization headers. Removing
//! a middleware restores the pipeline to its previous behavior.

use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::Request;
use std::sync::Arc;

// ============================================================================
// Middleware Trait
// ============================================================================

/// A single request rewriting step
pub trait RequestMiddleware: Send + Sync {
    /// Unique name, used for replacement/removal and logging
    fn name(&self) -> &'static str;

    /// Fast-path filter called before `apply`
    fn should_apply(&self, request: &Request) -> bool;

    /// Rewrite the request
    fn apply(&self, request: Request) -> Request;
}

// ============================================================================
// Pipeline
// ============================================================================

/// Ordered list of middleware applied to every request
#[derive(Default)]
pub struct RequestPipeline {
    middleware: Vec<Box<dyn RequestMiddleware>>,
}

impl RequestPipeline {
    /// Create an empty pipeline (passthrough)
    pub fn new() -> Self {
        Self::default()
    }

    /// Install a middleware
    ///
    /// Middleware run in registration order. A middleware with the same
    /// name as an installed one takes over its slot.
    pub fn register(&mut self, middleware: impl RequestMiddleware + 'static) {
        let name = middleware.name();
        if let Some(slot) = self.middleware.iter_mut().find(|m| m.name() == name) {
            tracing::debug!(middleware = name, "Replacing installed request middleware");
            *slot = Box::new(middleware);
        } else {
            tracing::debug!(middleware = name, "Registered request middleware");
            self.middleware.push(Box::new(middleware));
        }
    }

    /// Uninstall a middleware by name, returning whether it was present
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.middleware.len();
        self.middleware.retain(|m| m.name() != name);
        before != self.middleware.len()
    }

    /// Run a request through every applicable middleware
    pub fn process(&self, mut request: Request) -> Request {
        for middleware in &self.middleware {
            if middleware.should_apply(&request) {
                request = middleware.apply(request);
            }
        }
        request
    }

    pub fn is_empty(&self) -> bool {
        self.middleware.is_empty()
    }

    /// Names of installed middleware, in execution order
    pub fn names(&self) -> Vec<&'static str> {
        self.middleware.iter().map(|m| m.name()).collect()
    }
}

// ============================================================================
// Token Authorizer
// ============================================================================

/// Read access to the current session token
pub trait TokenSource: Send + Sync {
    fn current_token(&self) -> Option<String>;
}

/// Attaches `Authorization: Token <t>` to requests aimed at the API
///
/// Applies only when the URL contains the configured path marker and a
/// token is present. A request that already carries an Authorization
/// header keeps it.
pub struct TokenAuthorizer {
    marker: String,
    source: Arc<dyn TokenSource>,
}

impl TokenAuthorizer {
    pub const NAME: &'static str = "token-authorizer";

    pub fn new(marker: impl Into<String>, source: Arc<dyn TokenSource>) -> Self {
        Self {
            marker: marker.into(),
            source,
        }
    }
}

impl RequestMiddleware for TokenAuthorizer {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn should_apply(&self, request: &Request) -> bool {
        request.url().as_str().contains(&self.marker)
            && !request.headers().contains_key(AUTHORIZATION)
    }

    fn apply(&self, mut request: Request) -> Request {
        let Some(token) = self.source.current_token() else {
            return request;
        };

        match HeaderValue::from_str(&format!("Token {token}")) {
            Ok(mut value) => {
                value.set_sensitive(true);
                request.headers_mut().insert(AUTHORIZATION, value);
            }
            Err(e) => {
                tracing::warn!("Session token is not a valid header value: {}", e);
            }
        }
        request
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderName;
    use reqwest::{Method, Url};
    use std::sync::Mutex;

    struct FixedToken(Mutex<Option<String>>);

    impl FixedToken {
        fn new(token: Option<&str>) -> Arc<Self> {
            Arc::new(Self(Mutex::new(token.map(str::to_string))))
        }
    }

    impl TokenSource for FixedToken {
        fn current_token(&self) -> Option<String> {
            self.0.lock().unwrap().clone()
        }
    }

    struct Tag(&'static str, &'static str);

    impl RequestMiddleware for Tag {
        fn name(&self) -> &'static str {
            "tag"
        }
        fn should_apply(&self, _request: &Request) -> bool {
            true
        }
        fn apply(&self, mut request: Request) -> Request {
            request.headers_mut().insert(
                HeaderName::from_static(self.0),
                HeaderValue::from_static(self.1),
            );
            request
        }
    }

    fn get(url: &str) -> Request {
        Request::new(Method::GET, Url::parse(url).unwrap())
    }

    fn auth_header(request: &Request) -> Option<&str> {
        request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
    }

    #[test]
    fn attaches_token_to_api_requests() {
        let mut pipeline = RequestPipeline::new();
        pipeline.register(TokenAuthorizer::new("/api/", FixedToken::new(Some("abc"))));

        let request = pipeline.process(get("http://127.0.0.1:8000/api/bugs/"));
        assert_eq!(auth_header(&request), Some("Token abc"));
    }

    #[test]
    fn leaves_foreign_urls_alone() {
        let mut pipeline = RequestPipeline::new();
        pipeline.register(TokenAuthorizer::new("/api/", FixedToken::new(Some("abc"))));

        let request = pipeline.process(get("https://cdn.example.com/fonts/x.woff"));
        assert_eq!(auth_header(&request), None);
    }

    #[test]
    fn no_token_means_no_header() {
        let mut pipeline = RequestPipeline::new();
        pipeline.register(TokenAuthorizer::new("/api/", FixedToken::new(None)));

        let request = pipeline.process(get("http://127.0.0.1:8000/api/bugs/"));
        assert_eq!(auth_header(&request), None);
    }

    #[test]
    fn caller_authorization_is_preserved() {
        let mut pipeline = RequestPipeline::new();
        pipeline.register(TokenAuthorizer::new("/api/", FixedToken::new(Some("abc"))));

        let mut request = get("http://127.0.0.1:8000/api/auth/profile/");
        request
            .headers_mut()
            .insert(AUTHORIZATION, HeaderValue::from_static("Token explicit"));
        let request = pipeline.process(request);
        assert_eq!(auth_header(&request), Some("Token explicit"));
    }

    #[test]
    fn other_headers_survive_authorization() {
        let mut pipeline = RequestPipeline::new();
        pipeline.register(Tag("x-trace", "1"));
        pipeline.register(TokenAuthorizer::new("/api/", FixedToken::new(Some("abc"))));

        let request = pipeline.process(get("http://127.0.0.1:8000/api/bugs/"));
        assert_eq!(request.headers().get("x-trace").unwrap(), "1");
        assert_eq!(auth_header(&request), Some("Token abc"));
    }

    #[test]
    fn registering_twice_replaces_instead_of_stacking() {
        let mut pipeline = RequestPipeline::new();
        pipeline.register(TokenAuthorizer::new("/api/", FixedToken::new(Some("old"))));
        pipeline.register(TokenAuthorizer::new("/api/", FixedToken::new(Some("new"))));

        assert_eq!(pipeline.names(), vec![TokenAuthorizer::NAME]);
        let request = pipeline.process(get("http://127.0.0.1:8000/api/bugs/"));
        assert_eq!(auth_header(&request), Some("Token new"));
    }

    #[test]
    fn removing_restores_passthrough() {
        let mut pipeline = RequestPipeline::new();
        pipeline.register(TokenAuthorizer::new("/api/", FixedToken::new(Some("abc"))));
        assert!(pipeline.remove(TokenAuthorizer::NAME));
        assert!(!pipeline.remove(TokenAuthorizer::NAME));
        assert!(pipeline.is_empty());

        let request = pipeline.process(get("http://127.0.0.1:8000/api/bugs/"));
        assert_eq!(auth_header(&request), None);
    }

    #[test]
    fn token_is_read_at_request_time() {
        let source = FixedToken::new(None);
        let mut pipeline = RequestPipeline::new();
        pipeline.register(TokenAuthorizer::new("/api/", source.clone()));

        let before = pipeline.process(get("http://127.0.0.1:8000/api/bugs/"));
        assert_eq!(auth_header(&before), None);

        *source.0.lock().unwrap() = Some("late".to_string());
        let after = pipeline.process(get("http://127.0.0.1:8000/api/bugs/"));
        assert_eq!(auth_header(&after), Some("Token late"));
    }
}
