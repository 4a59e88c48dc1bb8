//! Page view counter.

use axum::Json;
use axum::extract::{Path, State};

use crate::error::ApiError;
use crate::state::AppState;
use murmur_types::api::ViewsResponse;

pub async fn get_views(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<ViewsResponse>, ApiError> {
    let views = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.db.get_views(post_id)).await??
    };
    Ok(Json(ViewsResponse { post_id, views }))
}

/// POST increments and returns the new count. 404 for unknown posts so
/// bots cannot inflate counters for ids that never existed.
pub async fn record_view(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<Json<ViewsResponse>, ApiError> {
    let views = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            if state.db.get_post(post_id)?.is_none() {
                return Ok(None);
            }
            Ok::<_, anyhow::Error>(Some(state.db.increment_views(post_id)?))
        })
        .await??
    }
    .ok_or(ApiError::NotFound)?;

    Ok(Json(ViewsResponse { post_id, views }))
}
