use actix_session::Session;
use serde::{Deserialize, Serialize};

use crate::api::{AuthSession, Role};
use crate::errors::AppError;
use crate::query::keys;

const USER_KEY: &str = "auth_user";
const FLASH_KEY: &str = "flash";

/// The signed-in user as kept in the cookie session. Created at login,
/// read by every protected page, purged at logout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionUser {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub role: Role,
    pub tenant_id: i64,
    pub access_token: String,
}

impl SessionUser {
    /// Cache scope for this user's queries.
    pub fn scope(&self) -> String {
        keys::user_scope(self.tenant_id, self.id)
    }

    pub fn display_name(&self) -> &str {
        if self.name.trim().is_empty() { &self.email } else { &self.name }
    }
}

impl From<AuthSession> for SessionUser {
    fn from(auth: AuthSession) -> Self {
        Self {
            id: auth.user.id,
            email: auth.user.email,
            name: auth.user.name,
            role: auth.user.role,
            tenant_id: auth.user.tenant_id,
            access_token: auth.access_token,
        }
    }
}

pub fn get_user(session: &Session) -> Option<SessionUser> {
    session.get::<SessionUser>(USER_KEY).unwrap_or(None)
}

/// Signed-in user, or a session error (which sends the browser to /login).
pub fn require_user(session: &Session) -> Result<SessionUser, AppError> {
    get_user(session).ok_or_else(|| AppError::Session("Not logged in".to_string()))
}

pub fn set_user(session: &Session, user: &SessionUser) -> Result<(), AppError> {
    session.renew();
    session
        .insert(USER_KEY, user)
        .map_err(|e| AppError::Session(format!("Failed to store session: {e}")))
}

pub fn set_flash(session: &Session, message: &str) {
    let _ = session.insert(FLASH_KEY, message);
}

pub fn take_flash(session: &Session) -> Option<String> {
    let flash = session.get::<String>(FLASH_KEY).unwrap_or(None);
    if flash.is_some() {
        session.remove(FLASH_KEY);
    }
    flash
}
