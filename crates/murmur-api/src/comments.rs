//! Comment CRUD: reading and writing are public, moderation (pin/delete)
//! is session-gated.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::AppState;
use murmur_types::api::{CommentListResponse, CommentRequest};

const AUTHOR_MAX_CHARS: usize = 80;
const CONTENT_MAX_CHARS: usize = 2_000;

#[derive(Debug, Deserialize)]
pub struct CommentQuery {
    pub post_id: i64,
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<CommentQuery>,
) -> Result<Json<CommentListResponse>, ApiError> {
    let comments = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.db.list_comments(query.post_id)).await??
    };
    Ok(Json(CommentListResponse {
        comments: comments.into_iter().map(|row| row.into_comment()).collect(),
    }))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let author = req.author.trim().to_string();
    let content = req.content.trim().to_string();

    if author.is_empty() || author.chars().count() > AUTHOR_MAX_CHARS {
        return Err(ApiError::bad_request("author must be 1-80 characters"));
    }
    if content.is_empty() || content.chars().count() > CONTENT_MAX_CHARS {
        return Err(ApiError::bad_request("content must be 1-2000 characters"));
    }
    if let Some(email) = &req.email {
        if !email.contains('@') {
            return Err(ApiError::bad_request("invalid email"));
        }
    }

    let comment = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            if state.db.get_post(req.post_id)?.is_none() {
                return Ok(None);
            }
            let id =
                state
                    .db
                    .insert_comment(req.post_id, &author, req.email.as_deref(), &content)?;
            let rows = state.db.list_comments(req.post_id)?;
            Ok::<_, anyhow::Error>(rows.into_iter().find(|c| c.id == id))
        })
        .await??
    }
    .ok_or(ApiError::NotFound)?;

    Ok((StatusCode::CREATED, Json(comment.into_comment())))
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PinRequest {
    pub pinned: bool,
}

pub async fn set_pinned(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(req): Json<PinRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let found = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.db.set_comment_pinned(id, req.pinned)).await??
    };
    if !found {
        return Err(ApiError::NotFound);
    }
    Ok(Json(serde_json::json!({ "pinned": req.pinned })))
}

pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let found = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.db.delete_comment(id)).await??
    };
    if !found {
        return Err(ApiError::NotFound);
    }
    Ok(StatusCode::NO_CONTENT)
}
