//! Content search page.

use axum::extract::{Query, State};
use axum::response::Response;
use serde::Deserialize;

use crate::error::PageError;
use crate::render::components::{cache_control, html_response};
use crate::render::timeline::render_search;
use crate::state::WebState;

/// Cap on rendered search results.
const SEARCH_LIMIT: u32 = 50;

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

pub async fn search(
    State(state): State<WebState>,
    Query(query): Query<SearchQuery>,
) -> Result<Response, PageError> {
    let q = query.q.unwrap_or_default().trim().to_string();

    let posts = if q.is_empty() {
        Vec::new()
    } else {
        let state = state.clone();
        let q = q.clone();
        tokio::task::spawn_blocking(move || state.app.db.search_posts(&q, SEARCH_LIMIT))
            .await??
            .into_iter()
            .map(|row| row.into_post())
            .collect()
    };

    let html = render_search(
        &q,
        &posts,
        &state.app.config.base_url,
        &state.app.config.site_name,
    )
    .into_string();

    Ok(html_response(html, cache_control::SHORT))
}
