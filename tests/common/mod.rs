//! Shared test infrastructure for integration tests.
//!
//! - `MockApi` - in-memory `TrackerApi` with a call log
//! - `test_app()` - the full page app wired to a mock
//! - `extract_csrf_token()` / `session_cookie()` - browser-side helpers

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use regex::Regex;

use timeboard::api::*;
use timeboard::auth::rate_limit::RateLimiter;
use timeboard::config::AppConfig;
use timeboard::features::FeatureFlags;
use timeboard::handlers;
use timeboard::state::AppState;
use timeboard::tasks::TaskFilter;

// ============================================================================
// TEST CONSTANTS
// ============================================================================

pub const TEST_EMAIL: &str = "ana@example.com";
pub const TEST_PASSWORD: &str = "Secret123";
pub const TEST_TOKEN: &str = "access-token-1";
pub const RESET_TOKEN: &str = "reset-token-1";
pub const SCOPE: &str = "tenant:1:user:7";

// ============================================================================
// MOCK API
// ============================================================================

/// Canned responses for every endpoint. Fields are public so tests can
/// adjust them before or between requests.
pub struct MockData {
    pub user: User,
    pub flags: FeatureFlags,
    pub stats: Result<DashboardStats, ApiError>,
    pub admin: Result<AdminDashboardStats, ApiError>,
    pub weekly: Result<WeeklySummary, ApiError>,
    pub breakdown: Result<Vec<ProjectTime>, ApiError>,
    pub alerts: Vec<ActivityAlert>,
    pub digest: WeeklyDigest,
    pub insights: Vec<Insight>,
    pub projects: Vec<Project>,
    pub tasks: Vec<Task>,
    pub next_task_id: i64,
    pub reset_result: Result<(), ApiError>,
    pub reset_requests: Vec<ResetPasswordRequest>,
    pub created: Vec<TaskInput>,
}

impl Default for MockData {
    fn default() -> Self {
        Self {
            user: User {
                id: 7,
                email: TEST_EMAIL.to_string(),
                name: "Ana".to_string(),
                role: Role::User,
                tenant_id: 1,
            },
            flags: FeatureFlags::default(),
            stats: Ok(DashboardStats {
                today_seconds: 3600,
                week_seconds: 18000,
                month_seconds: 72000,
                active_projects: 2,
            }),
            admin: Ok(AdminDashboardStats::default()),
            weekly: Ok(WeeklySummary {
                total_seconds: 12600,
                daily: vec![
                    DailyTotal { date: "2024-03-04".to_string(), total_seconds: 5400 },
                    DailyTotal { date: "2024-03-05".to_string(), total_seconds: 7200 },
                ],
            }),
            breakdown: Ok(vec![
                ProjectTime { project_name: "Apollo".to_string(), total_seconds: 9000 },
                ProjectTime { project_name: "Borealis".to_string(), total_seconds: 3600 },
            ]),
            alerts: vec![],
            digest: WeeklyDigest { summary: "A steady week.".to_string(), highlights: vec![] },
            insights: vec![],
            projects: vec![
                Project { id: 1, name: "Apollo".to_string() },
                Project { id: 2, name: "Borealis".to_string() },
            ],
            tasks: vec![
                task(1, "Write report", 1, TaskStatus::Todo),
                task(2, "Review budget", 2, TaskStatus::InProgress),
                task(3, "Ship release", 1, TaskStatus::Done),
            ],
            next_task_id: 100,
            reset_result: Ok(()),
            reset_requests: vec![],
            created: vec![],
        }
    }
}

pub fn task(id: i64, name: &str, project_id: i64, status: TaskStatus) -> Task {
    Task {
        id,
        name: name.to_string(),
        description: None,
        project_id,
        status,
    }
}

#[derive(Default)]
pub struct MockApi {
    pub data: Mutex<MockData>,
    calls: Mutex<HashMap<&'static str, usize>>,
}

fn ready<T: Send + 'static>(result: Result<T, ApiError>) -> ApiFuture<T> {
    Box::pin(futures::future::ready(result))
}

impl MockApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with(configure: impl FnOnce(&mut MockData)) -> Arc<Self> {
        let api = Self::default();
        configure(&mut *api.data.lock().unwrap());
        Arc::new(api)
    }

    pub fn update(&self, configure: impl FnOnce(&mut MockData)) {
        configure(&mut *self.data.lock().unwrap());
    }

    /// How many times an endpoint was called.
    pub fn calls(&self, endpoint: &str) -> usize {
        self.calls.lock().unwrap().get(endpoint).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }

    fn record(&self, endpoint: &'static str) {
        *self.calls.lock().unwrap().entry(endpoint).or_insert(0) += 1;
    }

    fn read<T: Send + 'static>(&self, endpoint: &'static str, f: impl FnOnce(&mut MockData) -> Result<T, ApiError>) -> ApiFuture<T> {
        self.record(endpoint);
        let result = f(&mut *self.data.lock().unwrap());
        ready(result)
    }

    fn authorized<T: Send + 'static>(
        &self,
        endpoint: &'static str,
        token: &str,
        f: impl FnOnce(&mut MockData) -> Result<T, ApiError>,
    ) -> ApiFuture<T> {
        if token != TEST_TOKEN {
            self.record(endpoint);
            return ready(Err(ApiError::Unauthorized));
        }
        self.read(endpoint, f)
    }
}

impl TrackerApi for MockApi {
    fn login(&self, request: &LoginRequest) -> ApiFuture<AuthSession> {
        let ok = request.email == TEST_EMAIL && request.password == TEST_PASSWORD;
        self.read("login", |d| {
            if ok {
                Ok(AuthSession { access_token: TEST_TOKEN.to_string(), user: d.user.clone() })
            } else {
                Err(ApiError::Unauthorized)
            }
        })
    }

    fn request_password_reset(&self, _email: &str) -> ApiFuture<()> {
        self.read("request_password_reset", |_| Ok(()))
    }

    fn verify_reset_token(&self, reset_token: &str) -> ApiFuture<()> {
        let valid = reset_token == RESET_TOKEN;
        self.read("verify_reset_token", |_| {
            if valid {
                Ok(())
            } else {
                Err(ApiError::Status { status: 400, detail: Some("Token expired".to_string()) })
            }
        })
    }

    fn reset_password(&self, request: &ResetPasswordRequest) -> ApiFuture<()> {
        let request = request.clone();
        self.read("reset_password", |d| {
            d.reset_requests.push(request);
            d.reset_result.clone()
        })
    }

    fn feature_flags(&self, token: &str) -> ApiFuture<FeatureFlags> {
        self.authorized("feature_flags", token, |d| Ok(d.flags))
    }

    fn dashboard_stats(&self, token: &str) -> ApiFuture<DashboardStats> {
        self.authorized("dashboard_stats", token, |d| d.stats.clone())
    }

    fn admin_dashboard_stats(&self, token: &str) -> ApiFuture<AdminDashboardStats> {
        self.authorized("admin_dashboard_stats", token, |d| d.admin.clone())
    }

    fn weekly_summary(&self, token: &str) -> ApiFuture<WeeklySummary> {
        self.authorized("weekly_summary", token, |d| d.weekly.clone())
    }

    fn project_breakdown(&self, token: &str) -> ApiFuture<Vec<ProjectTime>> {
        self.authorized("project_breakdown", token, |d| d.breakdown.clone())
    }

    fn activity_alerts(&self, token: &str) -> ApiFuture<Vec<ActivityAlert>> {
        self.authorized("activity_alerts", token, |d| Ok(d.alerts.clone()))
    }

    fn weekly_digest(&self, token: &str) -> ApiFuture<WeeklyDigest> {
        self.authorized("weekly_digest", token, |d| Ok(d.digest.clone()))
    }

    fn insights(&self, token: &str) -> ApiFuture<Vec<Insight>> {
        self.authorized("insights", token, |d| Ok(d.insights.clone()))
    }

    fn list_projects(&self, token: &str) -> ApiFuture<Page<Project>> {
        self.authorized("list_projects", token, |d| {
            Ok(Page { items: d.projects.clone(), total: d.projects.len() as i64 })
        })
    }

    fn list_tasks(&self, token: &str, filter: &TaskFilter) -> ApiFuture<Page<Task>> {
        let filter = *filter;
        self.authorized("list_tasks", token, move |d| {
            let items: Vec<Task> = d
                .tasks
                .iter()
                .filter(|t| filter.project_id.is_none_or(|id| t.project_id == id))
                .filter(|t| filter.status.is_none_or(|s| t.status == s))
                .cloned()
                .collect();
            let total = items.len() as i64;
            Ok(Page { items, total })
        })
    }

    fn create_task(&self, token: &str, input: &TaskInput) -> ApiFuture<Task> {
        let input = input.clone();
        self.authorized("create_task", token, move |d| {
            let task = Task {
                id: d.next_task_id,
                name: input.name.clone(),
                description: input.description.clone(),
                project_id: input.project_id,
                status: input.status,
            };
            d.next_task_id += 1;
            d.tasks.push(task.clone());
            d.created.push(input);
            Ok(task)
        })
    }

    fn update_task(&self, token: &str, id: i64, input: &TaskInput) -> ApiFuture<Task> {
        let input = input.clone();
        self.authorized("update_task", token, move |d| {
            let task = d.tasks.iter_mut().find(|t| t.id == id).ok_or(ApiError::NotFound)?;
            task.name = input.name;
            task.description = input.description;
            task.project_id = input.project_id;
            task.status = input.status;
            Ok(task.clone())
        })
    }

    fn delete_task(&self, token: &str, id: i64) -> ApiFuture<()> {
        self.authorized("delete_task", token, move |d| {
            let before = d.tasks.len();
            d.tasks.retain(|t| t.id != id);
            if d.tasks.len() == before { Err(ApiError::NotFound) } else { Ok(()) }
        })
    }

    fn update_task_status(&self, token: &str, id: i64, status: TaskStatus) -> ApiFuture<Task> {
        self.authorized("update_task_status", token, move |d| {
            let task = d.tasks.iter_mut().find(|t| t.id == id).ok_or(ApiError::NotFound)?;
            task.status = status;
            Ok(task.clone())
        })
    }
}

/// Upcast for code that takes the API seam.
pub fn as_api(mock: &Arc<MockApi>) -> Arc<dyn TrackerApi> {
    mock.clone()
}

// ============================================================================
// APP SETUP
// ============================================================================

pub fn test_config() -> AppConfig {
    AppConfig {
        query_stale_after: Duration::from_secs(60),
        reset_redirect_after: Duration::from_secs(3),
        ..AppConfig::default()
    }
}

/// The page app exactly as `main` wires it, minus static files. The app
/// holds its own handle to the mock, so it does not borrow `mock`.
pub fn test_app(
    mock: &Arc<MockApi>,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody + use<>>,
        Error = actix_web::Error,
        InitError = (),
    > + use<>,
> {
    let state = web::Data::new(AppState::new(as_api(mock), test_config()));
    let session_mw = SessionMiddleware::builder(CookieSessionStore::default(), Key::from(&[7u8; 64]))
        .cookie_secure(false)
        .build();

    App::new()
        .wrap(session_mw)
        .app_data(state)
        .app_data(web::Data::new(RateLimiter::default()))
        .configure(handlers::configure)
}

// ============================================================================
// BROWSER HELPERS
// ============================================================================

/// Find `<input type="hidden" name="csrf_token" value="...">` in a page.
pub fn extract_csrf_token(html: &str) -> String {
    let re = Regex::new(r#"name="csrf_token"\s+value="([^"]+)""#)
        .expect("Failed to compile regex");

    re.captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| "invalid_token".to_string())
}

/// The session cookie set by a response, if any.
pub fn session_cookie<B>(resp: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    resp.response()
        .cookies()
        .find(|c| c.name() == "id")
        .map(|c| c.into_owned())
}

pub fn location<B>(resp: &ServiceResponse<B>) -> Option<String> {
    resp.headers()
        .get("location")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// GET the login page, then sign in with the mock's credentials. Evaluates
/// to `(session_cookie, csrf_token)`.
#[macro_export]
macro_rules! sign_in {
    ($app:expr) => {{
        use actix_web::test::{TestRequest, call_service, read_body};

        let resp = call_service(&$app, TestRequest::get().uri("/login").to_request()).await;
        let cookie = common::session_cookie(&resp).expect("login page sets a session cookie");
        let html = String::from_utf8(read_body(resp).await.to_vec()).unwrap();
        let csrf = common::extract_csrf_token(&html);

        let resp = call_service(
            &$app,
            TestRequest::post()
                .uri("/login")
                .cookie(cookie)
                .set_form([
                    ("email", common::TEST_EMAIL),
                    ("password", common::TEST_PASSWORD),
                    ("csrf_token", csrf.as_str()),
                ])
                .to_request(),
        )
        .await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::SEE_OTHER);
        assert_eq!(common::location(&resp).as_deref(), Some("/dashboard"));
        let cookie = common::session_cookie(&resp).expect("login sets the session cookie");
        (cookie, csrf)
    }};
}
