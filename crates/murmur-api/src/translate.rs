//! Translation proxy for the compose UI. Session-gated because every call
//! spends API quota.

use axum::Json;
use axum::extract::State;

use crate::error::ApiError;
use crate::state::AppState;
use murmur_types::api::{TranslateRequest, TranslateResponse};

const TEXT_MAX_CHARS: usize = 5_000;

pub async fn translate(
    State(state): State<AppState>,
    Json(req): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let text = req.text.trim();
    if text.is_empty() {
        return Err(ApiError::bad_request("text is required"));
    }
    if text.chars().count() > TEXT_MAX_CHARS {
        return Err(ApiError::bad_request("text is too long"));
    }

    let translator = state
        .share
        .translator
        .as_ref()
        .ok_or(ApiError::Unavailable("translator"))?;

    let to = req.to.as_deref().unwrap_or("en");
    let translated = translator
        .translate(text, to)
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("translation failed: {e}")))?;

    Ok(Json(TranslateResponse { translated }))
}
