use serde::{Deserialize, Serialize};

// ---------- Session ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Admins and super admins see tenant-wide data.
    pub fn is_admin_tier(self) -> bool {
        matches!(self, Role::Admin | Role::SuperAdmin)
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::User => "User",
            Role::Admin => "Admin",
            Role::SuperAdmin => "Super Admin",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub tenant_id: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful login response.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSession {
    pub access_token: String,
    pub user: User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResetPasswordRequest {
    pub token: String,
    pub new_password: String,
}

// ---------- Dashboard ----------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub today_seconds: i64,
    pub week_seconds: i64,
    pub month_seconds: i64,
    pub active_projects: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserTimeBreakdown {
    pub user_id: i64,
    pub user_name: String,
    pub total_seconds: i64,
    pub entry_count: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdminDashboardStats {
    pub total_today_seconds: i64,
    pub total_week_seconds: i64,
    pub total_month_seconds: i64,
    pub active_users_today: i64,
    #[serde(default)]
    pub user_breakdown: Vec<UserTimeBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyTotal {
    /// `YYYY-MM-DD`
    pub date: String,
    pub total_seconds: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklySummary {
    pub total_seconds: i64,
    #[serde(default)]
    pub daily: Vec<DailyTotal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectTime {
    pub project_name: String,
    pub total_seconds: i64,
}

// ---------- Feature-gated panels ----------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityAlert {
    pub id: i64,
    pub user_name: String,
    pub severity: String,
    pub message: String,
    pub detected_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WeeklyDigest {
    pub summary: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub title: String,
    pub body: String,
}

// ---------- Tasks ----------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    Todo,
    InProgress,
    Done,
    /// Any status this front end does not know about. Such tasks are
    /// fetched but belong to no kanban column.
    #[serde(other)]
    Unrecognized,
}

impl TaskStatus {
    /// The three board columns, in display order.
    pub const COLUMNS: [TaskStatus; 3] = [TaskStatus::Todo, TaskStatus::InProgress, TaskStatus::Done];

    pub fn as_str(self) -> &'static str {
        match self {
            TaskStatus::Todo => "TODO",
            TaskStatus::InProgress => "IN_PROGRESS",
            TaskStatus::Done => "DONE",
            TaskStatus::Unrecognized => "UNRECOGNIZED",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TaskStatus::Todo => "To Do",
            TaskStatus::InProgress => "In Progress",
            TaskStatus::Done => "Done",
            TaskStatus::Unrecognized => "Unknown",
        }
    }

    /// Parse a form/query value; only the three column statuses are accepted.
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "TODO" => Some(TaskStatus::Todo),
            "IN_PROGRESS" => Some(TaskStatus::InProgress),
            "DONE" => Some(TaskStatus::Done),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub project_id: i64,
    pub status: TaskStatus,
}

/// Body for both create and update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TaskInput {
    pub name: String,
    pub description: Option<String>,
    pub project_id: i64,
    pub status: TaskStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct StatusUpdate {
    pub status: TaskStatus,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
}

/// Paginated list envelope used by the list endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self { items: Vec::new(), total: 0 }
    }
}
