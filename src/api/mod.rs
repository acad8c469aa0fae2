//! Bug tracker REST API: wire types, errors, request pipeline and client

mod client;
pub mod error;
pub mod middleware;
pub mod models;

pub use client::ApiClient;
pub use error::{ApiError, AuthError};
pub use middleware::{RequestMiddleware, RequestPipeline, TokenAuthorizer, TokenSource};
pub use models::{
    AuthResponse, Bug, BugPriority, BugStatus, Credentials, ModificationPoint, Page, PageRequest,
    Registration, UserProfile,
};
