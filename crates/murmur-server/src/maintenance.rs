use std::time::Duration;
use tracing::{info, warn};

use murmur_api::AppState;

/// Background task that prunes expired sessions.
///
/// Runs on an interval; session validity is enforced by `expires_at` at
/// read time, so this only keeps the table from growing unbounded.
pub async fn run_session_prune_loop(state: AppState, interval_secs: u64) {
    let mut interval = tokio::time::interval(Duration::from_secs(interval_secs));

    loop {
        interval.tick().await;

        let result = {
            let state = state.clone();
            tokio::task::spawn_blocking(move || state.db.prune_expired_sessions()).await
        };

        match result {
            Ok(Ok(count)) => {
                if count > 0 {
                    info!("Pruned {} expired sessions", count);
                }
            }
            Ok(Err(e)) => warn!("Session prune error: {}", e),
            Err(e) => warn!("Session prune task error: {}", e),
        }
    }
}
