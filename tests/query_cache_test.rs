//! Query cache tests: in-flight deduplication, invalidation races and
//! per-user scoping.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use timeboard::api::ApiError;
use timeboard::query::{Query, QueryCache, keys};
use timeboard::tasks::TaskFilter;

fn counted(calls: &Arc<AtomicUsize>, value: i64, delay: Duration) -> impl Future<Output = Result<i64, ApiError>> + Send + 'static {
    calls.fetch_add(1, Ordering::SeqCst);
    async move {
        tokio::time::sleep(delay).await;
        Ok(value)
    }
}

#[tokio::test]
async fn test_concurrent_reads_share_one_request() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let calls = Arc::new(AtomicUsize::new(0));
    let key = keys::dashboard_stats("tenant:1:user:1");

    let reads = (0..5).map(|_| {
        cache.fetch(Query::new(key.clone()), || counted(&calls, 42, Duration::from_millis(20)))
    });
    let results = futures::future::join_all(reads).await;

    assert_eq!(calls.load(Ordering::SeqCst), 1);
    for result in results {
        assert_eq!(result, Ok(Some(42)));
    }
    assert!(cache.contains(&key));
}

#[tokio::test]
async fn test_result_landing_after_invalidation_is_not_stored() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let calls = Arc::new(AtomicUsize::new(0));
    let scope = "tenant:1:user:1";
    let key = keys::tasks(scope, &TaskFilter::default());

    let slow = cache.fetch(Query::new(key.clone()), || counted(&calls, 1, Duration::from_millis(50)));
    let invalidate = async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        cache.invalidate(&keys::tasks_root(scope))
    };
    let (result, removed) = futures::join!(slow, invalidate);

    // The caller still gets its answer, but the cache does not keep it
    assert_eq!(result, Ok(Some(1)));
    assert_eq!(removed, 1);
    assert!(!cache.contains(&key));

    let fresh: Option<i64> = cache
        .fetch(Query::new(key.clone()), || counted(&calls, 2, Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(fresh, Some(2));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_scopes_are_isolated() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let calls = Arc::new(AtomicUsize::new(0));
    let alice = keys::user_scope(1, 1);
    let bob = keys::user_scope(1, 2);

    let a: Option<i64> = cache
        .fetch(Query::new(keys::dashboard_stats(&alice)), || counted(&calls, 1, Duration::ZERO))
        .await
        .unwrap();
    let b: Option<i64> = cache
        .fetch(Query::new(keys::dashboard_stats(&bob)), || counted(&calls, 2, Duration::ZERO))
        .await
        .unwrap();
    assert_eq!((a, b), (Some(1), Some(2)));

    assert_eq!(cache.clear_scope(&alice), 1);
    assert!(!cache.contains(&keys::dashboard_stats(&alice)));
    assert!(cache.contains(&keys::dashboard_stats(&bob)));
}

#[tokio::test]
async fn test_invalidating_tasks_keeps_config_and_dashboard() {
    let cache = QueryCache::new(Duration::from_secs(60));
    let calls = Arc::new(AtomicUsize::new(0));
    let scope = "tenant:3:user:9";

    let filters = [
        TaskFilter::default(),
        TaskFilter { project_id: Some(1), status: None },
    ];
    for filter in &filters {
        let _: Option<i64> = cache
            .fetch(Query::new(keys::tasks(scope, filter)), || counted(&calls, 0, Duration::ZERO))
            .await
            .unwrap();
    }
    let _: Option<i64> = cache
        .fetch(Query::config(keys::feature_flags(scope)), || counted(&calls, 0, Duration::ZERO))
        .await
        .unwrap();

    assert_eq!(cache.invalidate(&keys::tasks_root(scope)), 2);
    assert!(cache.contains(&keys::feature_flags(scope)));
}

#[tokio::test]
async fn test_expired_entries_do_not_accumulate_across_users() {
    let cache = QueryCache::new(Duration::from_millis(5));
    let calls = Arc::new(AtomicUsize::new(0));

    for user in 0..200 {
        let scope = keys::user_scope(1, user);
        let filter = TaskFilter { project_id: Some(user % 7), status: None };
        let _: Option<i64> = cache
            .fetch(Query::new(keys::tasks(&scope, &filter)), || counted(&calls, 0, Duration::ZERO))
            .await
            .unwrap();
    }
    tokio::time::sleep(Duration::from_millis(20)).await;

    // The next stored result sweeps everything past the window
    let latest = keys::dashboard_stats(&keys::user_scope(2, 1));
    let _: Option<i64> = cache
        .fetch(Query::new(latest.clone()), || counted(&calls, 1, Duration::ZERO))
        .await
        .unwrap();
    assert_eq!(cache.len(), 1);
    assert!(cache.contains(&latest));
}
