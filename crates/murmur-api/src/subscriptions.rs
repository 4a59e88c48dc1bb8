//! Newsletter subscription with double opt-in.

use axum::Json;
use axum::extract::{Query, State};
use axum::response::IntoResponse;
use rand::RngCore;
use tracing::warn;

use crate::error::ApiError;
use crate::state::AppState;
use murmur_db::queries::SubscribeOutcome;
use murmur_share::email::render_confirmation_email;
use murmur_types::api::{SubscribeRequest, TokenQuery};
use murmur_types::models::DigestPreference;

fn generate_token() -> String {
    let mut bytes = [0u8; 24];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Syntactic email sanity check: one `@` with something on both sides and
/// a dot in the domain. Deliverability is the confirmation email's job.
fn email_looks_valid(email: &str) -> bool {
    if email.len() > 254 || email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty() && domain.contains('.') && !domain.starts_with('.') && !domain.ends_with('.')
}

pub async fn subscribe(
    State(state): State<AppState>,
    Json(req): Json<SubscribeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = req.email.trim().to_lowercase();
    if !email_looks_valid(&email) {
        return Err(ApiError::bad_request("invalid email address"));
    }
    let preference = req.preference.unwrap_or(DigestPreference::Instant);

    let confirmation_token = generate_token();
    let unsubscribe_token = generate_token();

    let outcome = {
        let state = state.clone();
        let email = email.clone();
        let confirmation = confirmation_token.clone();
        let unsubscribe = unsubscribe_token.clone();
        tokio::task::spawn_blocking(move || {
            state
                .db
                .subscribe(&email, preference.as_str(), &confirmation, &unsubscribe)
        })
        .await??
    };

    let token = match outcome {
        SubscribeOutcome::AlreadyConfirmed => {
            return Err(ApiError::Conflict("already subscribed".to_string()));
        }
        SubscribeOutcome::Created { confirmation_token }
        | SubscribeOutcome::Reissued { confirmation_token } => confirmation_token,
    };

    // Confirmation email is best-effort; the token also works from logs
    // during local development.
    if let Some(mailer) = &state.share.mailer {
        let (subject, html) =
            render_confirmation_email(&state.config.base_url, &state.config.site_name, &token);
        let message = mailer.message(&email, subject, html);
        if let Err(e) = mailer.send(&message).await {
            warn!("Confirmation email to {} failed: {}", email, e);
        }
    } else {
        warn!("No mailer configured; confirmation for {} not sent", email);
    }

    Ok(Json(serde_json::json!({ "status": "confirmation_sent" })))
}

pub async fn confirm(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let confirmed = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.db.confirm_subscription(&query.token)).await??
    };
    if !confirmed {
        return Err(ApiError::NotFound);
    }
    Ok(Json(serde_json::json!({ "status": "confirmed" })))
}

pub async fn unsubscribe(
    State(state): State<AppState>,
    Query(query): Query<TokenQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let removed = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.db.unsubscribe(&query.token)).await??
    };
    if !removed {
        return Err(ApiError::NotFound);
    }
    Ok(Json(serde_json::json!({ "status": "unsubscribed" })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_validation_accepts_normal_addresses() {
        assert!(email_looks_valid("user@example.com"));
        assert!(email_looks_valid("first.last+tag@sub.domain.org"));
    }

    #[test]
    fn email_validation_rejects_junk() {
        assert!(!email_looks_valid(""));
        assert!(!email_looks_valid("no-at-sign"));
        assert!(!email_looks_valid("@example.com"));
        assert!(!email_looks_valid("user@nodot"));
        assert!(!email_looks_valid("user@.leading"));
        assert!(!email_looks_valid("spa ce@example.com"));
    }

    #[test]
    fn tokens_are_unique_48_hex() {
        let a = generate_token();
        assert_eq!(a.len(), 48);
        assert_ne!(a, generate_token());
    }
}
