//! Timeline and topic pages.

use axum::extract::{Path, Query, State};
use axum::response::Response;
use serde::Deserialize;
use tracing::debug;

use crate::error::PageError;
use crate::render::components::{cache_control, html_response};
use crate::render::timeline::{self, TimelinePage};
use crate::state::WebState;
use murmur_types::models::Topic;

/// Posts per timeline page.
pub const PAGE_SIZE: u32 = 20;

#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u32>,
}

pub async fn timeline(
    State(state): State<WebState>,
    Query(query): Query<PageQuery>,
) -> Result<Response, PageError> {
    let page = query.page.unwrap_or(1).max(1);
    render_listing(state, None, page).await
}

pub async fn topic(
    State(state): State<WebState>,
    Path(slug): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<Response, PageError> {
    let page = query.page.unwrap_or(1).max(1);

    let topic = {
        let state = state.clone();
        let slug = slug.clone();
        tokio::task::spawn_blocking(move || state.app.db.get_topic_by_slug(&slug)).await??
    }
    .ok_or_else(|| PageError::NotFound(format!("topic '{slug}'")))?
    .into_topic();

    render_listing(state, Some(topic), page).await
}

async fn render_listing(
    state: WebState,
    topic: Option<Topic>,
    page: u32,
) -> Result<Response, PageError> {
    let cache_key = match &topic {
        Some(t) => format!("topic:{}:{page}", t.slug),
        None => format!("home:{page}"),
    };

    if let Some(html) = state.cache.get(&cache_key).await {
        debug!(key = %cache_key, "page cache hit");
        return Ok(html_response(html, cache_control::LISTING));
    }

    let offset = (page - 1) * PAGE_SIZE;
    let topic_id = topic.as_ref().map(|t| t.id);

    // Fetch one extra row to know whether an older page exists.
    let mut posts = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || match topic_id {
            Some(id) => state.app.db.list_posts_by_topic(id, PAGE_SIZE + 1, offset),
            None => state.app.db.list_public_posts(PAGE_SIZE + 1, offset),
        })
        .await??
    };

    let has_next = posts.len() as u32 > PAGE_SIZE;
    posts.truncate(PAGE_SIZE as usize);
    let posts: Vec<_> = posts.into_iter().map(|row| row.into_post()).collect();

    let html = timeline::render(&TimelinePage {
        posts: &posts,
        page,
        has_next,
        topic: topic.as_ref(),
        base_url: &state.app.config.base_url,
        site_name: &state.app.config.site_name,
    })
    .into_string();

    state.cache.insert(cache_key, html.clone()).await;
    Ok(html_response(html, cache_control::LISTING))
}
