//! Admin compose page. The session guard runs as route middleware; by the
//! time this handler executes the caller is authenticated.

use axum::extract::State;
use axum::response::Response;

use crate::error::PageError;
use crate::render::components::{cache_control, html_response};
use crate::render::compose::{self, ComposePage};
use crate::state::WebState;

pub async fn compose(State(state): State<WebState>) -> Result<Response, PageError> {
    let (drafts, topics) = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            let drafts = state.app.db.list_drafts()?;
            let topics = state.app.db.list_topics()?;
            Ok::<_, anyhow::Error>((drafts, topics))
        })
        .await??
    };

    let drafts: Vec<_> = drafts.into_iter().map(|row| row.into_draft()).collect();
    let topics: Vec<_> = topics.into_iter().map(|row| row.into_topic()).collect();

    let html = compose::render(&ComposePage {
        drafts: &drafts,
        topics: &topics,
        site_name: &state.app.config.site_name,
        base_url: &state.app.config.base_url,
    })
    .into_string();

    Ok(html_response(html, cache_control::NO_STORE))
}
