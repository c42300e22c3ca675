use std::sync::Arc;

use crate::api::TrackerApi;
use crate::config::AppConfig;
use crate::query::QueryCache;

/// Shared by every handler through `web::Data`.
pub struct AppState {
    pub api: Arc<dyn TrackerApi>,
    pub cache: QueryCache,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(api: Arc<dyn TrackerApi>, config: AppConfig) -> Self {
        Self {
            api,
            cache: QueryCache::new(config.query_stale_after),
            config,
        }
    }
}
