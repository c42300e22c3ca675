use chrono::NaiveDate;
use serde::Serialize;

use crate::api::{AdminDashboardStats, DailyTotal, ProjectTime};

/// One bar of the daily hours chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub label: String,
    pub hours: f64,
}

/// One slice of the per-project pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSlice {
    pub name: String,
    pub seconds: i64,
    pub percentage: u32,
}

/// Seconds to hours, rounded to one decimal.
pub fn hours(seconds: i64) -> f64 {
    (seconds as f64 / 3600.0 * 10.0).round() / 10.0
}

/// Abbreviated weekday ("Mon") for a `YYYY-MM-DD` date; the raw string if it
/// does not parse.
pub fn weekday_label(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map(|d| d.format("%a").to_string())
        .unwrap_or_else(|_| date.to_string())
}

pub fn daily_series(entries: &[DailyTotal]) -> Vec<DailyPoint> {
    entries
        .iter()
        .map(|e| DailyPoint { label: weekday_label(&e.date), hours: hours(e.total_seconds) })
        .collect()
}

/// Share of `seconds` in `total` as a whole percentage; 0 when total is 0.
pub fn percentage(seconds: i64, total: i64) -> u32 {
    if total <= 0 {
        return 0;
    }
    (100.0 * seconds as f64 / total as f64).round().max(0.0) as u32
}

pub fn project_series(entries: &[ProjectTime]) -> Vec<ProjectSlice> {
    let total: i64 = entries.iter().map(|e| e.total_seconds).sum();
    entries
        .iter()
        .map(|e| ProjectSlice {
            name: e.project_name.clone(),
            seconds: e.total_seconds,
            percentage: percentage(e.total_seconds, total),
        })
        .collect()
}

/// Whether the team panel shows metrics or its empty state.
pub fn has_team_activity(admin: Option<&AdminDashboardStats>) -> bool {
    admin.is_some_and(|a| a.total_today_seconds > 0 || !a.user_breakdown.is_empty())
}

/// `3725` -> `"1h 2m"`; under an hour -> `"2m"`.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let h = seconds / 3600;
    let m = (seconds % 3600) / 60;
    if h > 0 { format!("{h}h {m}m") } else { format!("{m}m") }
}
