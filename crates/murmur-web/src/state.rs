//! Web-layer state: the shared application state plus the rendered-page
//! cache.

use std::time::Duration;

use moka::future::Cache;
use murmur_api::AppState;

/// Rendered-HTML cache keyed by page identity (e.g. `home:1`, `post:42`).
pub type PageCache = Cache<String, String>;

/// Cache capacity in entries; pages are a few KB each.
const PAGE_CACHE_CAPACITY: u64 = 10_000;

/// Pages go stale after this TTL; writes do not invalidate eagerly.
const PAGE_CACHE_TTL: Duration = Duration::from_secs(60);

#[derive(Clone)]
pub struct WebState {
    pub app: AppState,
    pub cache: PageCache,
}

impl WebState {
    pub fn new(app: AppState) -> Self {
        let cache = Cache::builder()
            .max_capacity(PAGE_CACHE_CAPACITY)
            .time_to_live(PAGE_CACHE_TTL)
            .build();
        Self { app, cache }
    }
}
