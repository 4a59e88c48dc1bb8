//! HTML route definitions.
//!
//! ## Routes
//!
//! - `GET /` - Timeline (paginated)
//! - `GET /t/{topic}` - Topic timeline
//! - `GET /p/{id}` - Single post with comments and reactions
//! - `GET /search` - Content search
//! - `GET /compose` - Admin compose UI (session-gated)
//! - `GET /sitemap.xml`, `GET /rss` - Feeds

mod compose;
mod feeds;
mod home;
mod post;
mod search;

use axum::routing::get;
use axum::{Router, middleware as axum_middleware};

use murmur_api::AppState;

use crate::state::WebState;

/// Build the HTML router on top of the shared application state.
pub fn router(app: AppState) -> Router {
    let state = WebState::new(app.clone());

    let public = Router::new()
        .route("/", get(home::timeline))
        .route("/t/{topic}", get(home::topic))
        .route("/p/{id}", get(post::post_page))
        .route("/search", get(search::search))
        .route("/sitemap.xml", get(feeds::sitemap))
        .route("/rss", get(feeds::rss))
        .with_state(state.clone());

    let admin = Router::new()
        .route("/compose", get(compose::compose))
        .layer(axum_middleware::from_fn_with_state(
            app,
            murmur_api::middleware::require_session,
        ))
        .with_state(state);

    public.merge(admin)
}
