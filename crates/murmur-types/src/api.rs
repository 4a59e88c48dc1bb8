use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Comment, DigestPreference, Post};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AuthRequest {
    pub password: String,
    #[serde(default)]
    pub device_info: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct RevokeResponse {
    pub revoked: usize,
}

// -- Publish / drafts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PublishRequest {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub topic_id: Option<i64>,
    /// Promote an existing draft instead of publishing raw content.
    #[serde(default)]
    pub draft_id: Option<i64>,
    #[serde(default = "default_true")]
    pub share_telegram: bool,
    #[serde(default = "default_true")]
    pub share_bluesky: bool,
    #[serde(default = "default_true")]
    pub share_email: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub post: Post,
    /// Per-channel share outcome; failures are reported here, never as
    /// request failures.
    pub shared: ShareOutcome,
}

#[derive(Debug, Default, Serialize)]
pub struct ShareOutcome {
    pub telegram: ChannelOutcome,
    pub bluesky: ChannelOutcome,
    pub email: ChannelOutcome,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelOutcome {
    #[default]
    Skipped,
    Sent,
    Failed,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DraftPayload {
    pub content: String,
    #[serde(default)]
    pub topic_id: Option<i64>,
    #[serde(default = "default_true")]
    pub share_telegram: bool,
    #[serde(default = "default_true")]
    pub share_bluesky: bool,
    #[serde(default = "default_true")]
    pub share_email: bool,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CommentRequest {
    pub post_id: i64,
    pub author: String,
    #[serde(default)]
    pub email: Option<String>,
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct CommentListResponse {
    pub comments: Vec<Comment>,
}

// -- Reactions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ToggleReactionRequest {
    pub reaction: String,
}

#[derive(Debug, Serialize)]
pub struct ReactionsResponse {
    /// Count per reaction name, vocabulary order, zero counts included.
    pub counts: Vec<ReactionCount>,
    /// The caller's current reaction, if any.
    pub yours: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReactionCount {
    pub reaction: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct ToggleReactionResponse {
    /// None when the toggle removed the reaction.
    pub reaction: Option<String>,
    pub counts: Vec<ReactionCount>,
}

// -- Subscriptions --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SubscribeRequest {
    pub email: String,
    #[serde(default)]
    pub preference: Option<DigestPreference>,
}

#[derive(Debug, Deserialize)]
pub struct TokenQuery {
    pub token: String,
}

// -- Topics --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTopicRequest {
    pub name: String,
}

// -- Views --

#[derive(Debug, Serialize)]
pub struct ViewsResponse {
    pub post_id: i64,
    pub views: i64,
}

// -- Translate --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslateRequest {
    pub text: String,
    #[serde(default)]
    pub to: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TranslateResponse {
    pub translated: String,
}
