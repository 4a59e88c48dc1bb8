//! Session authentication.
//!
//! A single shared admin password mints server-side session rows; the
//! `auth_token` cookie carries the session id. Revocation is global: all
//! sessions are deleted at once.

use argon2::{Argon2, PasswordHash, PasswordVerifier};
use axum::Json;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::RngCore;
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::info;

use crate::config::Config;
use crate::error::ApiError;
use crate::middleware::AUTH_COOKIE;
use crate::state::AppState;
use murmur_db::models::parse_ts;
use murmur_types::api::{AuthRequest, AuthResponse, RevokeResponse};

/// Verify the supplied password against the configured credential.
/// Plaintext comparison goes through SHA-256 digests so equality checking
/// is constant-time regardless of input length.
pub fn verify_password(config: &Config, candidate: &str) -> Result<bool, ApiError> {
    if let Some(phc) = &config.admin_password_hash {
        let parsed = PasswordHash::new(phc)
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("invalid admin password hash: {e}")))?;
        return Ok(Argon2::default()
            .verify_password(candidate.as_bytes(), &parsed)
            .is_ok());
    }

    if let Some(expected) = &config.admin_password {
        let a = Sha256::digest(candidate.as_bytes());
        let b = Sha256::digest(expected.as_bytes());
        return Ok(a == b);
    }

    Err(ApiError::Internal(anyhow::anyhow!(
        "no admin credential configured"
    )))
}

fn generate_session_id() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn session_cookie(session_id: String) -> Cookie<'static> {
    Cookie::build((AUTH_COOKIE, session_id))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .build()
}

/// POST /api/auth: password login; creates a 7-day session row and sets
/// the HttpOnly cookie.
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    headers: HeaderMap,
    Json(req): Json<AuthRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !verify_password(&state.config, &req.password)? {
        return Err(ApiError::Unauthorized);
    }

    let session_id = generate_session_id();
    let device_info = req.device_info.clone().or_else(|| {
        headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string())
    });

    let expires_at = {
        let state = state.clone();
        let id = session_id.clone();
        tokio::task::spawn_blocking(move || {
            let expires = state.db.create_session(&id, device_info.as_deref())?;
            state.db.log_activity("login", device_info.as_deref())?;
            Ok::<_, anyhow::Error>(expires)
        })
        .await??
    };

    info!("Admin session created");
    Ok((
        jar.add(session_cookie(session_id)),
        Json(AuthResponse {
            valid: true,
            expires_at: Some(parse_ts(&expires_at)),
        }),
    ))
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    /// Legacy clients passed the session id as a query parameter instead
    /// of the cookie.
    pub session: Option<String>,
}

/// GET /api/auth: report whether the caller holds a valid session. A
/// valid id arriving only via the legacy query parameter gets migrated
/// onto the cookie.
pub async fn check_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<SessionQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let from_cookie = jar.get(AUTH_COOKIE).map(|c| c.value().to_string());
    let from_query = query.session;

    let (session_id, cookie_missing) = match (&from_cookie, &from_query) {
        (Some(id), _) => (Some(id.clone()), false),
        (None, Some(id)) => (Some(id.clone()), true),
        (None, None) => (None, false),
    };

    let Some(session_id) = session_id else {
        return Ok((jar, Json(AuthResponse { valid: false, expires_at: None })));
    };

    let valid = {
        let state = state.clone();
        let id = session_id.clone();
        tokio::task::spawn_blocking(move || state.db.session_valid(&id)).await??
    };

    // Migration path: re-set the cookie when the id arrived only by query.
    let jar = if valid && cookie_missing {
        jar.add(session_cookie(session_id))
    } else {
        jar
    };

    Ok((jar, Json(AuthResponse { valid, expires_at: None })))
}

/// DELETE /api/auth: password-gated global revoke of every session.
pub async fn revoke_all(
    State(state): State<AppState>,
    Json(req): Json<AuthRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !verify_password(&state.config, &req.password)? {
        return Err(ApiError::Unauthorized);
    }

    let revoked = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            let n = state.db.delete_all_sessions()?;
            state.db.log_activity("revoke", Some(&format!("{n} sessions")))?;
            Ok::<_, anyhow::Error>(n)
        })
        .await??
    };

    info!("Revoked {} sessions", revoked);
    Ok(Json(RevokeResponse { revoked }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with_password(pw: &str) -> Config {
        Config {
            host: "127.0.0.1".into(),
            port: 0,
            db_path: ":memory:".into(),
            base_url: "http://localhost".into(),
            site_name: "Test".into(),
            admin_password: Some(pw.to_string()),
            admin_password_hash: None,
            dev_bypass: false,
            rate_limit_per_minute: 1000,
        }
    }

    #[test]
    fn plaintext_password_verification() {
        let config = config_with_password("correct horse battery staple");
        assert!(verify_password(&config, "correct horse battery staple").unwrap());
        assert!(!verify_password(&config, "wrong").unwrap());
        assert!(!verify_password(&config, "").unwrap());
    }

    #[test]
    fn missing_credential_is_internal_error() {
        let mut config = config_with_password("x");
        config.admin_password = None;
        assert!(verify_password(&config, "x").is_err());
    }

    #[test]
    fn hash_takes_precedence() {
        use argon2::password_hash::{PasswordHasher, SaltString, rand_core::OsRng};

        let salt = SaltString::generate(&mut OsRng);
        let phc = Argon2::default()
            .hash_password(b"hunter2222", &salt)
            .unwrap()
            .to_string();

        let mut config = config_with_password("ignored-plaintext");
        config.admin_password_hash = Some(phc);
        assert!(verify_password(&config, "hunter2222").unwrap());
        assert!(!verify_password(&config, "ignored-plaintext").unwrap());
    }

    #[test]
    fn session_ids_are_unique_64_hex() {
        let a = generate_session_id();
        let b = generate_session_id();
        assert_eq!(a.len(), 64);
        assert_ne!(a, b);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn cookie_is_http_only() {
        let cookie = session_cookie("abc".into());
        assert_eq!(cookie.name(), AUTH_COOKIE);
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.path(), Some("/"));
    }
}
