//! HTTP client for the bug tracker REST API
//!
//! One async method per resource. Each builds exactly one request, runs it
//! through the [`RequestPipeline`] and decodes exactly one JSON response.
//! Authorization is the pipeline's job; resource methods never add the
//! session token themselves.

use super::error::{extract_server_message, ApiError, AuthError};
use super::middleware::{RequestMiddleware, RequestPipeline};
use super::models::{
    AuthResponse, Bug, Credentials, ListEnvelope, ModificationPoint, Page, PageRequest,
    Registration, UserProfile,
};
use anyhow::{anyhow, Context, Result};
use reqwest::header::{HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::{Arc, RwLock};
use std::time::Duration;

const LOGIN_FAILED: &str = "Login failed. Please check your credentials.";
const REGISTER_FAILED: &str = "Registration failed.";

/// Cloneable handle to the API; clones share the connection pool and pipeline
#[derive(Clone)]
pub struct ApiClient {
    inner: Arc<Inner>,
}

struct Inner {
    http: reqwest::Client,
    base_url: Url,
    pipeline: RwLock<RequestPipeline>,
}

impl ApiClient {
    /// Create a client for `base_url` (e.g. `http://127.0.0.1:8000/api`)
    ///
    /// `timeout` of `None` leaves the transport default in place.
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self> {
        let base_url = Url::parse(base_url).with_context(|| format!("Invalid API url: {base_url}"))?;
        if base_url.cannot_be_a_base() {
            return Err(anyhow!("API url cannot be used as a base: {base_url}"));
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let http = builder.build().context("Failed to build HTTP client")?;

        Ok(Self {
            inner: Arc::new(Inner {
                http,
                base_url,
                pipeline: RwLock::new(RequestPipeline::new()),
            }),
        })
    }

    /// Install a middleware into the shared pipeline
    pub fn install(&self, middleware: impl RequestMiddleware + 'static) {
        self.inner
            .pipeline
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .register(middleware);
    }

    /// Remove a middleware from the shared pipeline
    pub fn uninstall(&self, name: &str) -> bool {
        self.inner
            .pipeline
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .remove(name)
    }

    pub fn middleware_names(&self) -> Vec<&'static str> {
        self.inner
            .pipeline
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .names()
    }

    // ─────────────────────────────────────────────────────────────────────
    // Resources
    // ─────────────────────────────────────────────────────────────────────

    /// `GET /bugs/?page=&page_size=`
    pub async fn list_bugs(&self, request: PageRequest) -> Result<Page<Bug>, ApiError> {
        let url = self.endpoint(&["bugs"])?;
        let builder = self
            .request(Method::GET, url)
            .query(&[("page", request.page), ("page_size", request.page_size)]);
        let response = self.send(builder).await?;
        let envelope: ListEnvelope<Bug> = decode(response).await?;
        Ok(envelope.into_page(request))
    }

    /// `GET /bugs/{bug_id}/`
    ///
    /// Both a 404 and a `null` body resolve to [`ApiError::NotFound`].
    pub async fn get_bug(&self, bug_id: &str) -> Result<Bug, ApiError> {
        let url = self.endpoint(&["bugs", bug_id])?;
        let response = self.send(self.request(Method::GET, url)).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound);
        }
        let bug: Option<Bug> = decode(response).await?;
        bug.ok_or(ApiError::NotFound)
    }

    /// `GET /bug_modifications/`
    pub async fn modifications(&self) -> Result<Vec<ModificationPoint>, ApiError> {
        let url = self.endpoint(&["bug_modifications"])?;
        let response = self.send(self.request(Method::GET, url)).await?;
        decode(response).await
    }

    /// `GET /auth/profile/`
    ///
    /// With `token` set, the request is pinned to that token instead of
    /// whatever the session holds when the pipeline runs.
    pub async fn profile(&self, token: Option<&str>) -> Result<UserProfile, ApiError> {
        let url = self.endpoint(&["auth", "profile"])?;
        let mut builder = self.request(Method::GET, url);
        if let Some(token) = token {
            let mut value = HeaderValue::from_str(&format!("Token {token}"))
                .map_err(|e| ApiError::Transport(format!("invalid token: {e}")))?;
            value.set_sensitive(true);
            builder = builder.header(AUTHORIZATION, value);
        }
        let response = self.send(builder).await?;
        decode(response).await
    }

    /// `POST /auth/login/`
    pub async fn login(&self, credentials: &Credentials) -> Result<AuthResponse, AuthError> {
        self.authenticate(&["auth", "login"], credentials, LOGIN_FAILED)
            .await
    }

    /// `POST /auth/register/`
    pub async fn register(&self, registration: &Registration) -> Result<AuthResponse, AuthError> {
        self.authenticate(&["auth", "register"], registration, REGISTER_FAILED)
            .await
    }

    // ─────────────────────────────────────────────────────────────────────
    // Plumbing
    // ─────────────────────────────────────────────────────────────────────

    async fn authenticate<B: Serialize>(
        &self,
        path: &[&str],
        body: &B,
        fallback: &str,
    ) -> Result<AuthResponse, AuthError> {
        let url = self
            .endpoint(path)
            .map_err(|e| AuthError::Unexpected(e.to_string()))?;
        let builder = self.request(Method::POST, url).json(body);
        let response = match self.send(builder).await {
            Ok(response) => response,
            Err(ApiError::Transport(e)) => {
                tracing::warn!("Auth request failed: {}", e);
                return Err(AuthError::Network);
            }
            Err(e) => return Err(AuthError::Unexpected(e.to_string())),
        };

        let status = response.status();
        if status.is_success() {
            return response
                .json::<AuthResponse>()
                .await
                .map_err(|e| AuthError::Unexpected(e.to_string()));
        }

        let body: serde_json::Value = response.json().await.unwrap_or_default();
        let message = extract_server_message(&body).unwrap_or_else(|| fallback.to_string());
        tracing::info!(status = status.as_u16(), "Authentication rejected: {}", message);
        Err(AuthError::Rejected(message))
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::Transport("API url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(segments)
            .push("");
        Ok(url)
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.inner
            .http
            .request(method, url)
            .header(ACCEPT, "application/json")
            .header(CONTENT_TYPE, "application/json")
    }

    async fn send(&self, builder: RequestBuilder) -> Result<Response, ApiError> {
        let request = builder
            .build()
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        let request = {
            let pipeline = self.inner.pipeline.read().unwrap_or_else(|e| e.into_inner());
            pipeline.process(request)
        };

        tracing::debug!(method = %request.method(), url = %request.url(), "API request");
        let response = self
            .inner
            .http
            .execute(request)
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        tracing::debug!(status = response.status().as_u16(), url = %response.url(), "API response");
        Ok(response)
    }
}

/// Map a response to `T` or to the matching [`ApiError`]
async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        tracing::warn!(url = %response.url(), "API request unauthorized");
        return Err(ApiError::Unauthorized);
    }
    if !status.is_success() {
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<serde_json::Value>(&text)
            .ok()
            .and_then(|body| extract_server_message(&body))
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("error").to_string());
        tracing::warn!(status = status.as_u16(), "API request failed: {}", message);
        return Err(ApiError::http(status, message));
    }
    response
        .json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}
