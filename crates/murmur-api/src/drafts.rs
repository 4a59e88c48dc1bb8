//! Draft CRUD. All routes are session-gated.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::error::ApiError;
use crate::state::AppState;
use murmur_types::api::DraftPayload;
use murmur_types::models::Draft;

fn validate(payload: &DraftPayload) -> Result<(), ApiError> {
    if payload.content.trim().is_empty() {
        return Err(ApiError::bad_request("content must not be empty"));
    }
    Ok(())
}

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Draft>>, ApiError> {
    let drafts = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.db.list_drafts()).await??
    };
    Ok(Json(drafts.into_iter().map(|row| row.into_draft()).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    Json(payload): Json<DraftPayload>,
) -> Result<impl IntoResponse, ApiError> {
    validate(&payload)?;

    let draft = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            let id = state.db.insert_draft(
                payload.content.trim(),
                payload.topic_id,
                payload.share_telegram,
                payload.share_bluesky,
                payload.share_email,
            )?;
            let row = state
                .db
                .get_draft(id)?
                .ok_or_else(|| anyhow::anyhow!("draft {id} vanished after insert"))?;
            Ok::<_, anyhow::Error>(row.into_draft())
        })
        .await??
    };

    Ok((StatusCode::CREATED, Json(draft)))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<DraftPayload>,
) -> Result<Json<Draft>, ApiError> {
    validate(&payload)?;

    let draft = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            let found = state.db.update_draft(
                id,
                payload.content.trim(),
                payload.topic_id,
                payload.share_telegram,
                payload.share_bluesky,
                payload.share_email,
            )?;
            if !found {
                return Ok(None);
            }
            Ok::<_, anyhow::Error>(state.db.get_draft(id)?)
        })
        .await??
    }
    .ok_or(ApiError::NotFound)?;

    Ok(Json(draft.into_draft()))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let found = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.db.delete_draft(id)).await??
    };
    if !found {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
