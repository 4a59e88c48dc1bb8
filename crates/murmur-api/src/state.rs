//! Application state shared across all request handlers.

use std::sync::Arc;
use std::time::Duration;

use murmur_db::Database;
use murmur_share::ShareHub;

use crate::config::Config;
use crate::ratelimit::RateLimiter;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub config: Arc<Config>,
    pub share: ShareHub,
    pub limiter: RateLimiter,
}

impl AppStateInner {
    pub fn new(db: Database, config: Config, share: ShareHub) -> AppState {
        let limiter = RateLimiter::new(config.rate_limit_per_minute, Duration::from_secs(60));
        Arc::new(Self {
            db,
            config: Arc::new(config),
            share,
            limiter,
        })
    }
}
