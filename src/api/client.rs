use std::time::Duration;

use futures::FutureExt;
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use super::*;

/// [`TrackerApi`] over HTTP/JSON.
#[derive(Clone)]
pub struct HttpApi {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    detail: Option<String>,
}

#[derive(Serialize)]
struct EmailBody<'a> {
    email: &'a str,
}

impl HttpApi {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, format!("{}{}", self.base_url, path));
        match token {
            Some(t) => builder.bearer_auth(t),
            None => builder,
        }
    }

    fn fetch_json<T>(&self, builder: RequestBuilder) -> ApiFuture<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        async move {
            let response = check_status(builder.send().await?).await?;
            Ok(response.json::<T>().await?)
        }
        .boxed()
    }

    fn fetch_empty(&self, builder: RequestBuilder) -> ApiFuture<()> {
        async move {
            check_status(builder.send().await?).await?;
            Ok(())
        }
        .boxed()
    }

    fn get<T>(&self, path: &str, token: &str) -> ApiFuture<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        self.fetch_json(self.request(Method::GET, path, Some(token)))
    }
}

/// Map non-success statuses onto [`ApiError`], keeping the server's
/// `detail` message when the body carries one.
async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    match status {
        StatusCode::UNAUTHORIZED => Err(ApiError::Unauthorized),
        StatusCode::NOT_FOUND => Err(ApiError::NotFound),
        _ => {
            let detail = response
                .json::<ErrorBody>()
                .await
                .ok()
                .and_then(|body| body.detail)
                .filter(|d| !d.trim().is_empty());
            Err(ApiError::Status { status: status.as_u16(), detail })
        }
    }
}

impl TrackerApi for HttpApi {
    fn login(&self, request: &LoginRequest) -> ApiFuture<AuthSession> {
        self.fetch_json(self.request(Method::POST, "/auth/login", None).json(request))
    }

    fn request_password_reset(&self, email: &str) -> ApiFuture<()> {
        self.fetch_empty(
            self.request(Method::POST, "/auth/forgot-password", None)
                .json(&EmailBody { email }),
        )
    }

    fn verify_reset_token(&self, reset_token: &str) -> ApiFuture<()> {
        self.fetch_empty(
            self.request(Method::GET, "/auth/reset-password/verify", None)
                .query(&[("token", reset_token)]),
        )
    }

    fn reset_password(&self, request: &ResetPasswordRequest) -> ApiFuture<()> {
        self.fetch_empty(self.request(Method::POST, "/auth/reset-password", None).json(request))
    }

    fn feature_flags(&self, token: &str) -> ApiFuture<FeatureFlags> {
        self.get("/features", token)
    }

    fn dashboard_stats(&self, token: &str) -> ApiFuture<DashboardStats> {
        self.get("/dashboard/stats", token)
    }

    fn admin_dashboard_stats(&self, token: &str) -> ApiFuture<AdminDashboardStats> {
        self.get("/dashboard/admin-stats", token)
    }

    fn weekly_summary(&self, token: &str) -> ApiFuture<WeeklySummary> {
        self.get("/reports/weekly-summary", token)
    }

    fn project_breakdown(&self, token: &str) -> ApiFuture<Vec<ProjectTime>> {
        self.get("/reports/by-project", token)
    }

    fn activity_alerts(&self, token: &str) -> ApiFuture<Vec<ActivityAlert>> {
        self.get("/ai/activity-alerts", token)
    }

    fn weekly_digest(&self, token: &str) -> ApiFuture<WeeklyDigest> {
        self.get("/ai/weekly-summary", token)
    }

    fn insights(&self, token: &str) -> ApiFuture<Vec<Insight>> {
        self.get("/ai/insights", token)
    }

    fn list_projects(&self, token: &str) -> ApiFuture<Page<Project>> {
        self.get("/projects", token)
    }

    fn list_tasks(&self, token: &str, filter: &TaskFilter) -> ApiFuture<Page<Task>> {
        let mut query: Vec<(&str, String)> = Vec::new();
        if let Some(project_id) = filter.project_id {
            query.push(("project_id", project_id.to_string()));
        }
        if let Some(status) = filter.status {
            query.push(("status", status.as_str().to_string()));
        }
        self.fetch_json(self.request(Method::GET, "/tasks", Some(token)).query(&query))
    }

    fn create_task(&self, token: &str, input: &TaskInput) -> ApiFuture<Task> {
        self.fetch_json(self.request(Method::POST, "/tasks", Some(token)).json(input))
    }

    fn update_task(&self, token: &str, id: i64, input: &TaskInput) -> ApiFuture<Task> {
        self.fetch_json(
            self.request(Method::PUT, &format!("/tasks/{id}"), Some(token))
                .json(input),
        )
    }

    fn delete_task(&self, token: &str, id: i64) -> ApiFuture<()> {
        self.fetch_empty(self.request(Method::DELETE, &format!("/tasks/{id}"), Some(token)))
    }

    fn update_task_status(&self, token: &str, id: i64, status: TaskStatus) -> ApiFuture<Task> {
        self.fetch_json(
            self.request(Method::PATCH, &format!("/tasks/{id}/status"), Some(token))
                .json(&StatusUpdate { status }),
        )
    }
}
