use std::time::Duration;

/// Runtime configuration, read once at start-up from the environment
/// (a `.env` file is honoured when present).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app_name: String,
    pub bind_addr: String,
    pub api_base_url: String,
    pub api_timeout: Duration,
    pub session_key: Option<String>,
    pub cookie_secure: bool,
    pub query_stale_after: Duration,
    pub reset_redirect_after: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            app_name: "Timeboard".to_string(),
            bind_addr: "127.0.0.1:8080".to_string(),
            api_base_url: "http://127.0.0.1:8000/api/v1".to_string(),
            api_timeout: Duration::from_secs(15),
            session_key: None,
            cookie_secure: false,
            query_stale_after: Duration::from_secs(30),
            reset_redirect_after: Duration::from_secs(3),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv();
        let defaults = Self::default();

        Self {
            app_name: env_string("APP_NAME").unwrap_or(defaults.app_name),
            bind_addr: env_string("BIND_ADDR").unwrap_or(defaults.bind_addr),
            api_base_url: env_string("API_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base_url),
            api_timeout: env_secs("API_TIMEOUT_SECS").unwrap_or(defaults.api_timeout),
            session_key: env_string("SESSION_KEY"),
            cookie_secure: env_bool("COOKIE_SECURE").unwrap_or(defaults.cookie_secure),
            query_stale_after: env_secs("QUERY_STALE_SECS").unwrap_or(defaults.query_stale_after),
            reset_redirect_after: env_secs("RESET_REDIRECT_SECS")
                .unwrap_or(defaults.reset_redirect_after),
        }
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_secs(key: &str) -> Option<Duration> {
    let raw = env_string(key)?;
    match raw.parse::<u64>() {
        Ok(secs) => Some(Duration::from_secs(secs)),
        Err(_) => {
            log::warn!("Ignoring {key}={raw}: not a whole number of seconds");
            None
        }
    }
}

fn env_bool(key: &str) -> Option<bool> {
    env_string(key).map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on"))
}
