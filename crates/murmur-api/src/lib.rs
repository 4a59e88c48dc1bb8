//! JSON API for the microblog: session auth, publishing, drafts, comments,
//! reactions, newsletter subscription, topics, views, and translation.

pub mod auth;
pub mod comments;
pub mod config;
pub mod drafts;
pub mod error;
pub mod middleware;
pub mod publish;
pub mod ratelimit;
pub mod reactions;
pub mod state;
pub mod subscriptions;
pub mod topics;
pub mod translate;
pub mod views;

use axum::routing::{get, patch, post, put};
use axum::{Router, middleware as axum_middleware};

pub use config::Config;
pub use state::{AppState, AppStateInner};

/// Build the `/api` router: public routes plus session-gated admin routes,
/// all behind the per-IP rate limit.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/health", get(health))
        .route(
            "/api/auth",
            get(auth::check_session)
                .post(auth::login)
                .delete(auth::revoke_all),
        )
        .route("/api/comments", get(comments::list).post(comments::create))
        .route(
            "/api/reactions/{post_id}",
            get(reactions::get_reactions).post(reactions::toggle),
        )
        .route("/api/subscribe", post(subscriptions::subscribe))
        .route("/api/confirmSubscription", get(subscriptions::confirm))
        .route("/api/unsubscribe", get(subscriptions::unsubscribe))
        .route("/api/views/{post_id}", get(views::get_views).post(views::record_view))
        .route("/api/topics", get(topics::list))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/api/publish", post(publish::publish))
        .route("/api/drafts", get(drafts::list).post(drafts::create))
        .route(
            "/api/drafts/{id}",
            put(drafts::update).delete(drafts::remove),
        )
        .route(
            "/api/comments/{id}",
            patch(comments::set_pinned).delete(comments::remove),
        )
        .route("/api/topics", post(topics::create))
        .route("/api/translate", post(translate::translate))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::require_session,
        ))
        .with_state(state.clone());

    Router::new()
        .merge(public)
        .merge(protected)
        .layer(axum_middleware::from_fn_with_state(
            state,
            middleware::rate_limit,
        ))
}

async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({ "status": "ok" }))
}
