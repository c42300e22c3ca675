use actix_session::Session;
use actix_web::{HttpResponse, web};
use chrono::{Local, Timelike};

use crate::auth::session::require_user;
use crate::dashboard::Dashboard;
use crate::errors::{AppError, render};
use crate::features::FeatureFlags;
use crate::state::AppState;
use crate::templates_structs::{DashboardTemplate, PageContext};
use super::guard_session;

fn time_greeting(name: &str, hour: u32) -> String {
    let period = match hour {
        5..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    };
    format!("{period}, {name}")
}

pub async fn index(
    state: web::Data<AppState>,
    session: Session,
) -> Result<HttpResponse, AppError> {
    let user = require_user(&session)?;
    let scope = user.scope();
    let token = user.access_token.as_str();

    let flags = FeatureFlags::load(&state.api, &state.cache, &scope, token).await;
    let loaded = Dashboard::new(&state.api, &state.cache, &scope, token)
        .load(user.role, flags)
        .await;
    let dashboard_state = guard_session(&session, loaded)?;

    let ctx = PageContext::build(&session, &state.config, &user, "/dashboard");
    let greeting = time_greeting(&ctx.user_name, Local::now().hour());
    render(DashboardTemplate::new(ctx, greeting, dashboard_state))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_follows_time_of_day() {
        assert_eq!(time_greeting("Ana", 8), "Good morning, Ana");
        assert_eq!(time_greeting("Ana", 13), "Good afternoon, Ana");
        assert_eq!(time_greeting("Ana", 23), "Good evening, Ana");
        assert_eq!(time_greeting("Ana", 3), "Good evening, Ana");
    }
}
