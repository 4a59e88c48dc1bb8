//! Single post page.

use axum::extract::{Path, State};
use axum::response::Response;
use axum_extra::extract::cookie::CookieJar;

use crate::error::PageError;
use crate::render::components::{cache_control, html_response};
use crate::render::post::{self, PostPage};
use crate::state::WebState;
use murmur_api::reactions::REACTION_COOKIE;
use murmur_types::models::PostStatus;

pub async fn post_page(
    State(state): State<WebState>,
    Path(id): Path<i64>,
    jar: CookieJar,
) -> Result<Response, PageError> {
    let cookie_id = jar.get(REACTION_COOKIE).map(|c| c.value().to_string());

    let data = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            let Some(row) = state.app.db.get_post(id)? else {
                return Ok(None);
            };
            let (prev, next) = state.app.db.post_neighbors(&row)?;
            let comments = state.app.db.list_comments(id)?;
            let counts = state.app.db.reaction_counts(id)?;
            let yours = match &cookie_id {
                Some(cid) => state.app.db.your_reaction(id, cid)?,
                None => None,
            };
            let views = state.app.db.get_views(id)?;
            Ok::<_, anyhow::Error>(Some((row, prev, next, comments, counts, yours, views)))
        })
        .await??
    };

    let Some((row, prev, next, comments, counts, yours, views)) = data else {
        return Err(PageError::NotFound(format!("post {id}")));
    };

    let post = row.into_post();
    if post.status != PostStatus::Public {
        return Err(PageError::NotFound(format!("post {id}")));
    }

    let prev = prev.map(|r| r.into_post());
    let next = next.map(|r| r.into_post());
    let comments: Vec<_> = comments.into_iter().map(|row| row.into_comment()).collect();

    let html = post::render(&PostPage {
        post: &post,
        prev: prev.as_ref(),
        next: next.as_ref(),
        comments: &comments,
        reaction_counts: &counts,
        your_reaction: yours.as_deref(),
        views,
        base_url: &state.app.config.base_url,
        site_name: &state.app.config.site_name,
    })
    .into_string();

    // Reactions and comments are per-viewer; skip the shared page cache and
    // let the CDN tier (s-maxage) do the heavy lifting.
    Ok(html_response(html, cache_control::POST))
}
