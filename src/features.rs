use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::api::{ApiError, TrackerApi};
use crate::query::{Query, QueryCache, keys};

/// Optional dashboard panels, switched on per tenant by the API.
/// Unknown or missing flags are treated as off.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureFlags {
    pub anomaly_detection: bool,
    pub weekly_summary: bool,
    pub insights: bool,
}

impl FeatureFlags {
    /// Load the flags for the signed-in user. Flags are configuration: they
    /// are fetched once per cache scope and never invalidated by mutations.
    /// A failed lookup leaves every panel off.
    pub async fn load(
        api: &Arc<dyn TrackerApi>,
        cache: &QueryCache,
        scope: &str,
        token: &str,
    ) -> FeatureFlags {
        let flags: Result<Option<FeatureFlags>, ApiError> = cache
            .fetch(Query::config(keys::feature_flags(scope)), || api.feature_flags(token))
            .await;
        match flags {
            Ok(flags) => flags.unwrap_or_default(),
            Err(e) => {
                log::warn!("Feature flags unavailable, optional panels disabled: {e}");
                FeatureFlags::default()
            }
        }
    }
}
