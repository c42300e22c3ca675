use askama::Template;

use crate::api::{ActivityAlert, AdminDashboardStats, Insight, WeeklyDigest};
use crate::dashboard::series::{self, format_duration};
use crate::dashboard::{DashboardData, DashboardState};
use super::PageContext;

pub struct StatCard {
    pub label: &'static str,
    pub value: String,
}

pub struct DailyBar {
    pub label: String,
    pub hours: String,
    /// Bar height relative to the busiest day, 0-100.
    pub height: u32,
}

pub struct ProjectRow {
    pub name: String,
    pub time: String,
    pub percentage: u32,
}

pub struct TeamMemberRow {
    pub name: String,
    pub time: String,
    pub entries: i64,
}

pub struct TeamPanel {
    pub has_activity: bool,
    pub cards: Vec<StatCard>,
    pub members: Vec<TeamMemberRow>,
}

impl TeamPanel {
    fn new(admin: &AdminDashboardStats, has_activity: bool) -> Self {
        Self {
            has_activity,
            cards: vec![
                StatCard { label: "Team today", value: format_duration(admin.total_today_seconds) },
                StatCard { label: "Team this week", value: format_duration(admin.total_week_seconds) },
                StatCard { label: "Team this month", value: format_duration(admin.total_month_seconds) },
                StatCard { label: "Active users today", value: admin.active_users_today.to_string() },
            ],
            members: admin
                .user_breakdown
                .iter()
                .map(|u| TeamMemberRow {
                    name: u.user_name.clone(),
                    time: format_duration(u.total_seconds),
                    entries: u.entry_count,
                })
                .collect(),
        }
    }
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub ctx: PageContext,
    pub greeting: String,
    pub loading: bool,
    pub failed: Vec<String>,
    pub cards: Vec<StatCard>,
    pub weekly_total: String,
    pub daily_bars: Vec<DailyBar>,
    pub projects: Vec<ProjectRow>,
    /// Chart series as JSON for client-side chart rendering.
    pub chart_json: String,
    pub team: Option<TeamPanel>,
    pub alerts: Option<Vec<ActivityAlert>>,
    pub digest: Option<WeeklyDigest>,
    pub insights: Option<Vec<Insight>>,
}

impl DashboardTemplate {
    pub fn new(ctx: PageContext, greeting: String, state: DashboardState) -> Self {
        match state {
            DashboardState::Loading { failed } => Self {
                ctx,
                greeting,
                loading: true,
                failed: failed.into_iter().map(String::from).collect(),
                cards: vec![],
                weekly_total: String::new(),
                daily_bars: vec![],
                projects: vec![],
                chart_json: "{}".to_string(),
                team: None,
                alerts: None,
                digest: None,
                insights: None,
            },
            DashboardState::Ready(data) => Self::ready(ctx, greeting, *data),
        }
    }

    fn ready(ctx: PageContext, greeting: String, data: DashboardData) -> Self {
        let peak = data
            .daily_series
            .iter()
            .map(|p| p.hours)
            .fold(0.0_f64, f64::max);
        let daily_bars = data
            .daily_series
            .iter()
            .map(|p| DailyBar {
                label: p.label.clone(),
                hours: format!("{:.1}h", p.hours),
                height: if peak > 0.0 { (p.hours / peak * 100.0).round() as u32 } else { 0 },
            })
            .collect();
        let projects = data
            .project_series
            .iter()
            .map(|s| ProjectRow {
                name: s.name.clone(),
                time: format_duration(s.seconds),
                percentage: s.percentage,
            })
            .collect();
        let chart_json = serde_json::json!({
            "daily": data.daily_series,
            "projects": data.project_series,
        })
        .to_string()
        .replace("</", "<\\/");

        Self {
            ctx,
            greeting,
            loading: false,
            failed: vec![],
            cards: vec![
                StatCard { label: "Today", value: format_duration(data.stats.today_seconds) },
                StatCard { label: "This week", value: format_duration(data.stats.week_seconds) },
                StatCard { label: "This month", value: format_duration(data.stats.month_seconds) },
                StatCard { label: "Active projects", value: data.stats.active_projects.to_string() },
            ],
            weekly_total: format!("{:.1}h", series::hours(data.weekly.total_seconds)),
            daily_bars,
            projects,
            chart_json,
            team: data
                .admin
                .as_ref()
                .map(|admin| TeamPanel::new(admin, data.has_team_activity)),
            alerts: data.panels.activity_alerts,
            digest: data.panels.weekly_digest,
            insights: data.panels.insights,
        }
    }
}
