//! Publish pipeline: validate, derive preview + slug, insert the post,
//! then fan out to the outbound channels.

use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use regex::Regex;
use std::sync::OnceLock;

use crate::error::ApiError;
use crate::state::AppState;
use murmur_share::{ShareFlags, slug::derive_slug};
use murmur_types::api::{PublishRequest, PublishResponse};
use murmur_types::text::preview_text;

/// Upper bound on post content length, in characters.
const CONTENT_MAX_CHARS: usize = 10_000;

fn hashtag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#(\w+)").expect("static regex"))
}

/// Hashtags in content, lowercased and deduplicated, in order of first
/// appearance.
pub fn extract_hashtags(content: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for cap in hashtag_regex().captures_iter(content) {
        let tag = cap[1].to_lowercase();
        if !seen.contains(&tag) {
            seen.push(tag);
        }
    }
    seen
}

pub async fn publish(
    State(state): State<AppState>,
    Json(req): Json<PublishRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Raw content, or a draft promoted with its stored share flags.
    let (content, topic_id, flags, draft_id) = match req.draft_id {
        Some(draft_id) => {
            let draft = {
                let state = state.clone();
                tokio::task::spawn_blocking(move || state.db.get_draft(draft_id)).await??
            }
            .ok_or(ApiError::NotFound)?;
            let flags = ShareFlags {
                telegram: draft.share_telegram,
                bluesky: draft.share_bluesky,
                email: draft.share_email,
            };
            (draft.content, draft.topic_id.or(req.topic_id), flags, Some(draft_id))
        }
        None => {
            let content = req
                .content
                .ok_or_else(|| ApiError::bad_request("content is required"))?;
            let flags = ShareFlags {
                telegram: req.share_telegram,
                bluesky: req.share_bluesky,
                email: req.share_email,
            };
            (content, req.topic_id, flags, None)
        }
    };

    let content = content.trim().to_string();
    if content.is_empty() {
        return Err(ApiError::bad_request("content must not be empty"));
    }
    if content.chars().count() > CONTENT_MAX_CHARS {
        return Err(ApiError::bad_request("content is too long"));
    }

    if let Some(topic_id) = topic_id {
        let exists = {
            let state = state.clone();
            tokio::task::spawn_blocking(move || state.db.get_topic(topic_id)).await??
        };
        if exists.is_none() {
            return Err(ApiError::bad_request("unknown topic"));
        }
    }

    let preview = preview_text(&content);
    let slug_base = derive_slug(state.share.translator.as_ref(), &content).await;
    let tags = extract_hashtags(&content);

    let post = {
        let state = state.clone();
        let content = content.clone();
        tokio::task::spawn_blocking(move || {
            // Collisions get a numeric suffix.
            let mut slug = slug_base.clone();
            let mut n = 2;
            while state.db.slug_exists(&slug)? {
                slug = format!("{slug_base}-{n}");
                n += 1;
            }

            let post_id = state.db.create_post(
                &content,
                &preview,
                &slug,
                "public",
                topic_id,
                "{}",
                &tags,
            )?;
            if let Some(draft_id) = draft_id {
                state.db.delete_draft(draft_id)?;
            }
            let row = state
                .db
                .get_post(post_id)?
                .ok_or_else(|| anyhow::anyhow!("post {post_id} vanished after insert"))?;
            Ok::<_, anyhow::Error>(row.into_post())
        })
        .await??
    };

    // Outbound fan-out is best-effort: failures land in the outcome, never
    // in the response status.
    let shared = state
        .share
        .share_post(
            &state.db,
            &post,
            flags,
            &state.config.base_url,
            &state.config.site_name,
        )
        .await;

    Ok((StatusCode::CREATED, Json(PublishResponse { post, shared })))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hashtags_extracted_in_order() {
        assert_eq!(
            extract_hashtags("Shipping #Rust things #today #rust"),
            vec!["rust".to_string(), "today".to_string()]
        );
    }

    #[test]
    fn no_hashtags_empty() {
        assert!(extract_hashtags("nothing to see here").is_empty());
    }

    #[test]
    fn cyrillic_hashtags_supported() {
        assert_eq!(extract_hashtags("пост про #заметки"), vec!["заметки".to_string()]);
    }
}
