//! Process-wide read cache for API queries.
//!
//! Reads are keyed by a composite [`QueryKey`] (user scope + logical path).
//! Concurrent reads of the same key share one in-flight request, successful
//! results are kept until they go stale or a mutation invalidates them, and
//! a result that lands after its key was invalidated is handed to the caller
//! that asked for it but never stored.

pub mod keys;

use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::ApiError;
pub use keys::QueryKey;

type SharedFetch = Shared<BoxFuture<'static, Result<Arc<Value>, ApiError>>>;

enum Slot {
    Ready { value: Arc<Value>, fetched_at: Instant, freshness: Freshness },
    Pending { fetch: SharedFetch, generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Freshness {
    Stale,
    Forever,
}

/// A read request against the cache.
#[derive(Debug, Clone)]
pub struct Query {
    key: QueryKey,
    enabled: bool,
    freshness: Freshness,
}

impl Query {
    pub fn new(key: QueryKey) -> Self {
        Self { key, enabled: true, freshness: Freshness::Stale }
    }

    /// A read that behaves like configuration: once fetched it stays until
    /// explicitly invalidated.
    pub fn config(key: QueryKey) -> Self {
        Self { key, enabled: true, freshness: Freshness::Forever }
    }

    /// Gate the read on a capability. A disabled query never reaches the
    /// fetcher; it resolves to `None`.
    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

pub struct QueryCache {
    slots: Mutex<HashMap<QueryKey, Slot>>,
    generation: AtomicU64,
    stale_after: Duration,
}

impl QueryCache {
    pub fn new(stale_after: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
            stale_after,
        }
    }

    /// Resolve `query`, calling `fetcher` only when there is neither a fresh
    /// cached value nor a request already in flight for the same key.
    pub async fn fetch<T, F, Fut>(&self, query: Query, fetcher: F) -> Result<Option<T>, ApiError>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ApiError>> + Send + 'static,
    {
        if !query.enabled {
            log::debug!("Query {} disabled, skipping fetch", query.key);
            return Ok(None);
        }
        let key = query.key;
        let freshness = query.freshness;

        let (fetch, generation) = {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            match slots.get(&key) {
                Some(Slot::Ready { value, fetched_at, .. })
                    if query.freshness == Freshness::Forever
                        || fetched_at.elapsed() < self.stale_after =>
                {
                    return decode(value).map(Some);
                }
                Some(Slot::Pending { fetch, generation }) => {
                    log::debug!("Query {key} joined in-flight request");
                    (fetch.clone(), *generation)
                }
                _ => {
                    let generation = self.generation.fetch_add(1, Ordering::Relaxed) + 1;
                    let request = fetcher();
                    let fetch = async move {
                        let value = request.await?;
                        Ok(Arc::new(serde_json::to_value(value)?))
                    }
                    .boxed()
                    .shared();
                    slots.insert(key.clone(), Slot::Pending { fetch: fetch.clone(), generation });
                    (fetch, generation)
                }
            }
        };

        let result = fetch.await;

        {
            let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
            let still_current = matches!(
                slots.get(&key),
                Some(Slot::Pending { generation: g, .. }) if *g == generation
            );
            if still_current {
                match &result {
                    Ok(value) => {
                        self.sweep_stale(&mut slots);
                        slots.insert(
                            key.clone(),
                            Slot::Ready { value: Arc::clone(value), fetched_at: Instant::now(), freshness },
                        );
                    }
                    Err(_) => {
                        slots.remove(&key);
                    }
                }
            }
        }

        decode(result?.as_ref()).map(Some)
    }

    /// Drop `Ready` entries past the staleness window. Config entries and
    /// requests in flight are kept.
    fn sweep_stale(&self, slots: &mut HashMap<QueryKey, Slot>) {
        let before = slots.len();
        slots.retain(|_, slot| match slot {
            Slot::Ready { fetched_at, freshness: Freshness::Stale, .. } => {
                fetched_at.elapsed() < self.stale_after
            }
            _ => true,
        });
        let swept = before - slots.len();
        if swept > 0 {
            log::debug!("Swept {swept} stale cached queries");
        }
    }

    /// Number of entries held, in flight or ready.
    pub fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry whose key starts with `prefix`, including requests
    /// still in flight. Returns the number of entries removed.
    pub fn invalidate(&self, prefix: &QueryKey) -> usize {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        let before = slots.len();
        slots.retain(|key, _| !key.starts_with(prefix));
        let removed = before - slots.len();
        log::debug!("Invalidated {removed} cached queries under {prefix}");
        removed
    }

    /// Drop everything cached for one user scope (used on logout).
    pub fn clear_scope(&self, scope: &str) -> usize {
        self.invalidate(&QueryKey::root(scope))
    }

    pub fn contains(&self, key: &QueryKey) -> bool {
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        matches!(slots.get(key), Some(Slot::Ready { .. }))
    }
}

fn decode<T: DeserializeOwned>(value: &Value) -> Result<T, ApiError> {
    Ok(T::deserialize(value)?)
}
