pub mod auth_handlers;
pub mod dashboard;
pub mod task_handlers;

use actix_session::Session;
use actix_web::web;

use crate::api::ApiError;
use crate::auth::middleware::require_auth;
use crate::errors::{AppError, see_other};

/// Register every page route. Session middleware and shared state are
/// supplied by the caller.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        // Public routes
        .route("/login", web::get().to(auth_handlers::login_page))
        .route("/login", web::post().to(auth_handlers::login_submit))
        .route("/forgot-password", web::get().to(auth_handlers::forgot_page))
        .route("/forgot-password", web::post().to(auth_handlers::forgot_submit))
        .route("/reset-password", web::get().to(auth_handlers::reset_page))
        .route("/reset-password", web::post().to(auth_handlers::reset_submit))
        .route("/", web::get().to(|| async { see_other("/dashboard") }))
        // Protected routes
        .service(
            web::scope("")
                .wrap(actix_web::middleware::from_fn(require_auth))
                .route("/logout", web::post().to(auth_handlers::logout))
                .route("/dashboard", web::get().to(dashboard::index))
                .route("/tasks", web::get().to(task_handlers::board))
                .route("/tasks", web::post().to(task_handlers::create))
                .route("/tasks/{id}", web::post().to(task_handlers::update))
                .route("/tasks/{id}/delete", web::post().to(task_handlers::delete))
                .route("/tasks/{id}/status", web::post().to(task_handlers::change_status)),
        );
}

/// Purge the session when the API no longer accepts its token, so the
/// login redirect does not bounce straight back.
pub(crate) fn guard_session<T>(session: &Session, result: Result<T, ApiError>) -> Result<T, AppError> {
    match result {
        Err(ApiError::Unauthorized) => {
            session.purge();
            Err(AppError::Session("API session expired".to_string()))
        }
        other => other.map_err(AppError::from),
    }
}
