//! Dashboard aggregation: gated parallel reads and the loading contract.

pub mod series;

use std::sync::Arc;

use crate::api::{
    ActivityAlert, AdminDashboardStats, ApiError, DashboardStats, Insight, ProjectTime, Role,
    TrackerApi, WeeklyDigest, WeeklySummary,
};
use crate::features::FeatureFlags;
use crate::query::{Query, QueryCache, keys};
use series::{DailyPoint, ProjectSlice};

/// Optional panels. `None` means the panel is off or its data is unavailable.
#[derive(Debug, Clone, Default)]
pub struct AiPanels {
    pub activity_alerts: Option<Vec<ActivityAlert>>,
    pub weekly_digest: Option<WeeklyDigest>,
    pub insights: Option<Vec<Insight>>,
}

/// Everything the dashboard renders once its required reads have settled.
#[derive(Debug, Clone)]
pub struct DashboardData {
    pub stats: DashboardStats,
    pub admin: Option<AdminDashboardStats>,
    pub weekly: WeeklySummary,
    pub daily_series: Vec<DailyPoint>,
    pub project_series: Vec<ProjectSlice>,
    pub has_team_activity: bool,
    pub panels: AiPanels,
}

#[derive(Debug, Clone)]
pub enum DashboardState {
    /// A required read has not produced data. The page keeps showing its
    /// loading placeholder; `failed` names the reads that errored.
    Loading { failed: Vec<&'static str> },
    Ready(Box<DashboardData>),
}

/// Reads for one dashboard view.
pub struct Dashboard<'a> {
    api: &'a Arc<dyn TrackerApi>,
    cache: &'a QueryCache,
    scope: &'a str,
    token: &'a str,
}

impl<'a> Dashboard<'a> {
    pub fn new(
        api: &'a Arc<dyn TrackerApi>,
        cache: &'a QueryCache,
        scope: &'a str,
        token: &'a str,
    ) -> Self {
        Self { api, cache, scope, token }
    }

    /// Issue every read concurrently. Admin stats are only requested for
    /// admin-tier roles and each optional panel only when its flag is on.
    ///
    /// Personal stats, the weekly summary and (for admins) admin stats gate
    /// the view. The project breakdown and the panels never block it.
    /// Returns `Err` only when the API rejects the session.
    pub async fn load(&self, role: Role, flags: FeatureFlags) -> Result<DashboardState, ApiError> {
        let (api, token, scope) = (self.api, self.token, self.scope);
        let admin_tier = role.is_admin_tier();

        let stats = self
            .cache
            .fetch(Query::new(keys::dashboard_stats(scope)), || api.dashboard_stats(token));
        let admin = self.cache.fetch(
            Query::new(keys::admin_dashboard_stats(scope)).enabled(admin_tier),
            || api.admin_dashboard_stats(token),
        );
        let weekly = self
            .cache
            .fetch(Query::new(keys::weekly_summary(scope)), || api.weekly_summary(token));
        let projects = self
            .cache
            .fetch(Query::new(keys::project_breakdown(scope)), || api.project_breakdown(token));
        let alerts = self.cache.fetch(
            Query::new(keys::activity_alerts(scope)).enabled(flags.anomaly_detection),
            || api.activity_alerts(token),
        );
        let digest = self.cache.fetch(
            Query::new(keys::weekly_digest(scope)).enabled(flags.weekly_summary),
            || api.weekly_digest(token),
        );
        let insights = self.cache.fetch(
            Query::new(keys::insights(scope)).enabled(flags.insights),
            || api.insights(token),
        );

        let (stats, admin, weekly, projects, alerts, digest, insights) =
            futures::join!(stats, admin, weekly, projects, alerts, digest, insights);

        let required: [(&'static str, Option<&ApiError>); 3] = [
            ("dashboard stats", stats.as_ref().err()),
            ("weekly summary", weekly.as_ref().err()),
            ("admin stats", admin.as_ref().err()),
        ];
        if required.iter().any(|(_, e)| matches!(e, Some(ApiError::Unauthorized))) {
            return Err(ApiError::Unauthorized);
        }
        let failed: Vec<&'static str> = required
            .iter()
            .filter_map(|(name, e)| {
                e.map(|e| {
                    log::error!("Dashboard {name} failed: {e}");
                    *name
                })
            })
            .collect();

        let (Ok(Some(stats)), Ok(admin), Ok(Some(weekly))) = (stats, admin, weekly) else {
            return Ok(DashboardState::Loading { failed });
        };
        if admin_tier && admin.is_none() {
            return Ok(DashboardState::Loading { failed });
        }

        let projects: Vec<ProjectTime> = optional("project breakdown", projects).unwrap_or_default();
        let panels = AiPanels {
            activity_alerts: optional("activity alerts", alerts),
            weekly_digest: optional("weekly digest", digest),
            insights: optional("insights", insights),
        };

        Ok(DashboardState::Ready(Box::new(DashboardData {
            daily_series: series::daily_series(&weekly.daily),
            project_series: series::project_series(&projects),
            has_team_activity: series::has_team_activity(admin.as_ref()),
            stats,
            admin,
            weekly,
            panels,
        })))
    }
}

/// Non-blocking read: failures degrade to `None`.
fn optional<T>(name: &str, result: Result<Option<T>, ApiError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            log::warn!("Dashboard {name} unavailable: {e}");
            None
        }
    }
}
