use std::fmt;

use crate::tasks::TaskFilter;

/// Composite cache key: the user scope followed by a logical path such as
/// `["tasks", "project:3", "status:all"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryKey {
    scope: String,
    path: Vec<String>,
}

impl QueryKey {
    pub fn root(scope: &str) -> Self {
        Self { scope: scope.to_string(), path: Vec::new() }
    }

    pub fn with(mut self, part: impl Into<String>) -> Self {
        self.path.push(part.into());
        self
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// True when `prefix` has the same scope and its path is a leading
    /// subsequence of this key's path.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.scope == prefix.scope && self.path.starts_with(&prefix.path)
    }
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.scope)?;
        for part in &self.path {
            write!(f, "/{part}")?;
        }
        Ok(())
    }
}

/// Cache scope for a signed-in user. Tenant is part of the scope so a user
/// id reused across tenants never shares entries.
pub fn user_scope(tenant_id: i64, user_id: i64) -> String {
    format!("tenant:{tenant_id}:user:{user_id}")
}

pub fn feature_flags(scope: &str) -> QueryKey {
    QueryKey::root(scope).with("feature-flags")
}

pub fn dashboard(scope: &str) -> QueryKey {
    QueryKey::root(scope).with("dashboard")
}

pub fn dashboard_stats(scope: &str) -> QueryKey {
    dashboard(scope).with("stats")
}

pub fn admin_dashboard_stats(scope: &str) -> QueryKey {
    dashboard(scope).with("admin-stats")
}

pub fn weekly_summary(scope: &str) -> QueryKey {
    dashboard(scope).with("weekly-summary")
}

pub fn project_breakdown(scope: &str) -> QueryKey {
    dashboard(scope).with("project-breakdown")
}

pub fn activity_alerts(scope: &str) -> QueryKey {
    QueryKey::root(scope).with("ai").with("activity-alerts")
}

pub fn weekly_digest(scope: &str) -> QueryKey {
    QueryKey::root(scope).with("ai").with("weekly-summary")
}

pub fn insights(scope: &str) -> QueryKey {
    QueryKey::root(scope).with("ai").with("insights")
}

pub fn projects(scope: &str) -> QueryKey {
    QueryKey::root(scope).with("projects")
}

/// Every task list for the scope, whatever the filter.
pub fn tasks_root(scope: &str) -> QueryKey {
    QueryKey::root(scope).with("tasks")
}

pub fn tasks(scope: &str, filter: &TaskFilter) -> QueryKey {
    let project = match filter.project_id {
        Some(id) => format!("project:{id}"),
        None => "project:all".to_string(),
    };
    let status = match filter.status {
        Some(s) => format!("status:{}", s.as_str()),
        None => "status:all".to_string(),
    };
    tasks_root(scope).with(project).with(status)
}
