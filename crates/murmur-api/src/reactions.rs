//! Anonymous reactions with toggle semantics.
//!
//! Identity is a `reaction_id` cookie minted on first use. One row per
//! (post, cookie): repeating a reaction removes it, a different reaction
//! replaces it.

use axum::Json;
use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use rand::RngCore;

use crate::error::ApiError;
use crate::state::AppState;
use murmur_types::api::{
    ReactionCount, ReactionsResponse, ToggleReactionRequest, ToggleReactionResponse,
};
use murmur_types::reactions;

/// Cookie carrying the anonymous reaction identity.
pub const REACTION_COOKIE: &str = "reaction_id";

fn reaction_cookie(value: String) -> Cookie<'static> {
    Cookie::build((REACTION_COOKIE, value))
        .path("/")
        .same_site(SameSite::Lax)
        .build()
}

fn mint_cookie_id() -> String {
    let mut bytes = [0u8; 16];
    rand::rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

/// Expand sparse per-name counts into the full vocabulary, zeroes included.
fn full_counts(sparse: Vec<(String, i64)>) -> Vec<ReactionCount> {
    reactions::VOCABULARY
        .iter()
        .map(|&name| ReactionCount {
            reaction: name.to_string(),
            count: sparse
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, c)| *c)
                .unwrap_or(0),
        })
        .collect()
}

pub async fn get_reactions(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    jar: CookieJar,
) -> Result<Json<ReactionsResponse>, ApiError> {
    let cookie_id = jar.get(REACTION_COOKIE).map(|c| c.value().to_string());

    let (sparse, yours) = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            if state.db.get_post(post_id)?.is_none() {
                return Ok(None);
            }
            let counts = state.db.reaction_counts(post_id)?;
            let yours = match cookie_id {
                Some(id) => state.db.your_reaction(post_id, &id)?,
                None => None,
            };
            Ok::<_, anyhow::Error>(Some((counts, yours)))
        })
        .await??
    }
    .ok_or(ApiError::NotFound)?;

    Ok(Json(ReactionsResponse {
        counts: full_counts(sparse),
        yours,
    }))
}

pub async fn toggle(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    jar: CookieJar,
    Json(req): Json<ToggleReactionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !reactions::is_valid(&req.reaction) {
        return Err(ApiError::bad_request("unknown reaction"));
    }

    let (cookie_id, minted) = match jar.get(REACTION_COOKIE) {
        Some(cookie) => (cookie.value().to_string(), false),
        None => (mint_cookie_id(), true),
    };

    let result = {
        let state = state.clone();
        let cookie_id = cookie_id.clone();
        let reaction = req.reaction.clone();
        tokio::task::spawn_blocking(move || {
            if state.db.get_post(post_id)?.is_none() {
                return Ok(None);
            }
            let resulting = state.db.toggle_reaction(post_id, &cookie_id, &reaction)?;
            let counts = state.db.reaction_counts(post_id)?;
            Ok::<_, anyhow::Error>(Some((resulting, counts)))
        })
        .await??
    };

    let Some((resulting, sparse)) = result else {
        return Err(ApiError::NotFound);
    };

    let jar = if minted {
        jar.add(reaction_cookie(cookie_id))
    } else {
        jar
    };

    Ok((
        jar,
        Json(ToggleReactionResponse {
            reaction: resulting,
            counts: full_counts(sparse),
        }),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_counts_cover_vocabulary() {
        let counts = full_counts(vec![("fire".to_string(), 3)]);
        assert_eq!(counts.len(), reactions::VOCABULARY.len());
        let fire = counts.iter().find(|c| c.reaction == "fire").unwrap();
        assert_eq!(fire.count, 3);
        let like = counts.iter().find(|c| c.reaction == "like").unwrap();
        assert_eq!(like.count, 0);
    }

    #[test]
    fn minted_ids_are_32_hex() {
        let id = mint_cookie_id();
        assert_eq!(id.len(), 32);
        assert_ne!(id, mint_cookie_id());
    }
}
