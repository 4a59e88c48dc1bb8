//! Topic listing (public) and creation (session-gated).

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;

use crate::error::ApiError;
use crate::state::AppState;
use murmur_share::slug::slugify;
use murmur_types::api::CreateTopicRequest;
use murmur_types::models::Topic;

pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Topic>>, ApiError> {
    let topics = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.db.list_topics()).await??
    };
    Ok(Json(topics.into_iter().map(|row| row.into_topic()).collect()))
}

pub async fn create(
    State(state): State<AppState>,
    Json(req): Json<CreateTopicRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let name = req.name.trim().to_string();
    if name.is_empty() || name.chars().count() > 60 {
        return Err(ApiError::bad_request("name must be 1-60 characters"));
    }
    let slug = slugify(&name);
    if slug.is_empty() {
        return Err(ApiError::bad_request("name must contain letters or digits"));
    }

    let topic = {
        let state = state.clone();
        let slug_check = slug.clone();
        tokio::task::spawn_blocking(move || {
            if state.db.get_topic_by_slug(&slug_check)?.is_some() {
                return Ok(None);
            }
            let id = state.db.create_topic(&name, &slug_check)?;
            Ok::<_, anyhow::Error>(state.db.get_topic(id)?)
        })
        .await??
    }
    .ok_or_else(|| ApiError::Conflict(format!("topic '{slug}' already exists")))?;

    Ok((StatusCode::CREATED, Json(topic.into_topic())))
}
