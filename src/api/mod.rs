//! Seam to the remote time-tracking API.
//!
//! Every page talks to the API through [`TrackerApi`]. Production uses the
//! reqwest-backed [`HttpApi`]; tests plug in an in-memory implementation.

pub mod client;
pub mod types;

use std::fmt;

use futures::future::BoxFuture;

use crate::features::FeatureFlags;
use crate::tasks::TaskFilter;
pub use client::HttpApi;
pub use types::*;

/// Futures returned by the API own everything they need, so they can be
/// shared between concurrent readers of the same query.
pub type ApiFuture<T> = BoxFuture<'static, Result<T, ApiError>>;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiError {
    Transport(String),
    Unauthorized,
    NotFound,
    Status { status: u16, detail: Option<String> },
    Decode(String),
}

impl ApiError {
    /// Server-provided explanation, when the API sent one.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Status { detail: Some(d), .. } => Some(d.as_str()),
            _ => None,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::Transport(e) => write!(f, "API unreachable: {e}"),
            ApiError::Unauthorized => write!(f, "API rejected credentials"),
            ApiError::NotFound => write!(f, "API resource not found"),
            ApiError::Status { status, detail: Some(d) } => write!(f, "API error {status}: {d}"),
            ApiError::Status { status, detail: None } => write!(f, "API error {status}"),
            ApiError::Decode(e) => write!(f, "Unexpected API payload: {e}"),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::Decode(e.to_string())
    }
}

/// Remote endpoints consumed by the front end. `token` is the bearer
/// token of the signed-in user.
pub trait TrackerApi: Send + Sync {
    // Authentication
    fn login(&self, request: &LoginRequest) -> ApiFuture<AuthSession>;
    fn request_password_reset(&self, email: &str) -> ApiFuture<()>;
    fn verify_reset_token(&self, reset_token: &str) -> ApiFuture<()>;
    fn reset_password(&self, request: &ResetPasswordRequest) -> ApiFuture<()>;

    // Dashboard
    fn feature_flags(&self, token: &str) -> ApiFuture<FeatureFlags>;
    fn dashboard_stats(&self, token: &str) -> ApiFuture<DashboardStats>;
    fn admin_dashboard_stats(&self, token: &str) -> ApiFuture<AdminDashboardStats>;
    fn weekly_summary(&self, token: &str) -> ApiFuture<WeeklySummary>;
    fn project_breakdown(&self, token: &str) -> ApiFuture<Vec<ProjectTime>>;
    fn activity_alerts(&self, token: &str) -> ApiFuture<Vec<ActivityAlert>>;
    fn weekly_digest(&self, token: &str) -> ApiFuture<WeeklyDigest>;
    fn insights(&self, token: &str) -> ApiFuture<Vec<Insight>>;

    // Tasks and projects
    fn list_projects(&self, token: &str) -> ApiFuture<Page<Project>>;
    fn list_tasks(&self, token: &str, filter: &TaskFilter) -> ApiFuture<Page<Task>>;
    fn create_task(&self, token: &str, input: &TaskInput) -> ApiFuture<Task>;
    fn update_task(&self, token: &str, id: i64, input: &TaskInput) -> ApiFuture<Task>;
    fn delete_task(&self, token: &str, id: i64) -> ApiFuture<()>;
    fn update_task_status(&self, token: &str, id: i64, status: TaskStatus) -> ApiFuture<Task>;
}
