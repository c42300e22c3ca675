// Template context structures for Askama templates, organized by page.
// All types are re-exported: `use timeboard::templates_structs::*`

use actix_session::Session;

use crate::auth::csrf;
use crate::auth::session::{SessionUser, take_flash};
use crate::config::AppConfig;

/// Common context shared by all authenticated pages.
/// Templates access these as `ctx.user_name`, `ctx.csrf_token`, etc.
pub struct PageContext {
    pub user_name: String,
    pub avatar_initial: String,
    pub role_label: String,
    pub flash: Option<String>,
    pub app_name: String,
    pub csrf_token: String,
    pub current_path: String,
}

impl PageContext {
    pub fn build(session: &Session, config: &AppConfig, user: &SessionUser, current_path: &str) -> Self {
        let user_name = user.display_name().to_string();
        let avatar_initial = user_name.chars().next().unwrap_or('?').to_uppercase().to_string();
        Self {
            user_name,
            avatar_initial,
            role_label: user.role.label().to_string(),
            flash: take_flash(session),
            app_name: config.app_name.clone(),
            csrf_token: csrf::get_or_create_token(session),
            current_path: current_path.to_string(),
        }
    }

    /// Navigation highlight helper for the layout.
    pub fn is_active(&self, path: &str) -> bool {
        self.current_path == path
    }
}

mod common;
mod dashboard;
mod tasks;

pub use common::*;
pub use dashboard::*;
pub use tasks::*;
