//! Request middleware: session guard and per-IP rate limiting.

use axum::extract::{ConnectInfo, Request, State};
use axum::middleware::Next;
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;
use std::net::SocketAddr;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

/// Cookie holding the admin session id.
pub const AUTH_COOKIE: &str = "auth_token";

/// Validated admin identity, inserted as a request extension by
/// [`require_session`].
#[derive(Debug, Clone)]
pub struct AdminSession {
    pub session_id: String,
}

/// Reject requests without a live session row. `MURMUR_DEV_BYPASS=1`
/// short-circuits the check for local testing.
pub async fn require_session(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.config.dev_bypass {
        debug!("dev bypass active, skipping session check");
        req.extensions_mut().insert(AdminSession {
            session_id: "dev-bypass".to_string(),
        });
        return Ok(next.run(req).await);
    }

    let jar = CookieJar::from_headers(req.headers());
    let session_id = jar
        .get(AUTH_COOKIE)
        .map(|c| c.value().to_string())
        .ok_or(ApiError::Unauthorized)?;

    let valid = {
        let state = state.clone();
        let id = session_id.clone();
        tokio::task::spawn_blocking(move || state.db.session_valid(&id)).await??
    };
    if !valid {
        return Err(ApiError::Unauthorized);
    }

    req.extensions_mut().insert(AdminSession { session_id });
    Ok(next.run(req).await)
}

/// Sliding-window rate limit keyed by client IP. Trusts the first
/// X-Forwarded-For hop when present (reverse-proxy deployments), falling
/// back to the socket peer address.
pub async fn rate_limit(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let key = client_ip(&req);
    if !state.limiter.check(&key) {
        debug!(ip = %key, "rate limit exceeded");
        return Err(ApiError::RateLimited);
    }
    Ok(next.run(req).await)
}

fn client_ip(req: &Request) -> String {
    if let Some(forwarded) = req
        .headers()
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
    {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request as HttpRequest;

    #[test]
    fn forwarded_header_wins() {
        let req = HttpRequest::builder()
            .header("x-forwarded-for", "203.0.113.9, 10.0.0.1")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_ip(&req), "203.0.113.9");
    }

    #[test]
    fn falls_back_to_connect_info() {
        let mut req = HttpRequest::builder().body(Body::empty()).unwrap();
        req.extensions_mut()
            .insert(ConnectInfo::<SocketAddr>("198.51.100.4:9999".parse().unwrap()));
        assert_eq!(client_ip(&req), "198.51.100.4");
    }

    #[test]
    fn unknown_without_any_source() {
        let req = HttpRequest::builder().body(Body::empty()).unwrap();
        assert_eq!(client_ip(&req), "unknown");
    }
}
