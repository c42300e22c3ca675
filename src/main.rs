use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::{App, HttpServer, cookie::Key, middleware, web};

use timeboard::api::{HttpApi, TrackerApi};
use timeboard::auth::rate_limit::RateLimiter;
use timeboard::config::AppConfig;
use timeboard::handlers;
use timeboard::state::AppState;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init();

    let config = AppConfig::from_env();

    let api: Arc<dyn TrackerApi> = match HttpApi::new(&config.api_base_url, config.api_timeout) {
        Ok(api) => Arc::new(api),
        Err(e) => {
            log::error!("Failed to build API client: {e}");
            return Err(std::io::Error::other(e.to_string()));
        }
    };
    log::info!("Using time-tracking API at {}", config.api_base_url);

    // Session encryption key from SESSION_KEY so sessions survive restarts
    let secret_key = match config.session_key.as_deref() {
        Some(val) if val.len() >= 64 => {
            log::info!("Using SESSION_KEY from environment");
            Key::from(val.as_bytes())
        }
        Some(val) => {
            log::warn!("SESSION_KEY too short ({} bytes, need 64+), generating random key", val.len());
            Key::generate()
        }
        None => {
            log::warn!("No SESSION_KEY set, generating random key (sessions lost on restart)");
            Key::generate()
        }
    };

    let bind_addr = config.bind_addr.clone();
    let cookie_secure = config.cookie_secure;
    let state = web::Data::new(AppState::new(api, config));
    let limiter = web::Data::new(RateLimiter::default());

    log::info!("Starting server at http://{bind_addr}");

    HttpServer::new(move || {
        let session_mw = SessionMiddleware::builder(
            CookieSessionStore::default(),
            secret_key.clone(),
        )
        .cookie_secure(cookie_secure)
        .cookie_http_only(true)
        .build();

        App::new()
            .wrap(session_mw)
            .wrap(middleware::Logger::default())
            .app_data(state.clone())
            .app_data(limiter.clone())
            // Static files
            .service(actix_files::Files::new("/static", "./static"))
            .configure(handlers::configure)
            // Default 404 handler (must be registered last)
            .default_service(web::to(|| async {
                let html = include_str!("../templates/errors/404.html");
                actix_web::HttpResponse::NotFound()
                    .content_type("text/html; charset=utf-8")
                    .body(html)
            }))
    })
    .bind(bind_addr)?
    .run()
    .await
}
