//! Database row types — these map directly to SQLite rows.
//! Distinct from murmur-types API models to keep the DB layer independent.

use chrono::{DateTime, Utc};
use murmur_types::models::{Comment, Draft, Post, PostStatus, Topic};

pub struct PostRow {
    pub id: i64,
    pub content: String,
    pub preview_text: String,
    pub slug: String,
    pub status: String,
    pub topic_id: Option<i64>,
    pub topic_slug: Option<String>,
    pub metadata: String,
    pub digest_sent_at: Option<String>,
    pub created_at: String,
}

pub struct TopicRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub post_count: i64,
    pub created_at: String,
}

pub struct DraftRow {
    pub id: i64,
    pub content: String,
    pub topic_id: Option<i64>,
    pub share_telegram: bool,
    pub share_bluesky: bool,
    pub share_email: bool,
    pub updated_at: String,
}

pub struct CommentRow {
    pub id: i64,
    pub post_id: i64,
    pub author: String,
    pub email: Option<String>,
    pub content: String,
    pub pinned: bool,
    pub created_at: String,
}

pub struct SubscriberRow {
    pub id: i64,
    pub email: String,
    pub confirmed: bool,
    pub confirmation_token: String,
    pub unsubscribe_token: String,
    pub preference: String,
    pub last_sent_at: Option<String>,
    pub created_at: String,
}

pub struct SessionRow {
    pub id: String,
    pub device_info: Option<String>,
    pub expires_at: String,
    pub created_at: String,
}

/// Parse a SQLite timestamp. SQLite's `datetime('now')` stores
/// "YYYY-MM-DD HH:MM:SS" without a timezone; RFC 3339 is accepted too.
pub fn parse_ts(raw: &str) -> DateTime<Utc> {
    raw.parse::<DateTime<Utc>>()
        .or_else(|_| {
            chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
                .map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::warn!("Corrupt timestamp '{}': {}", raw, e);
            DateTime::default()
        })
}

impl PostRow {
    pub fn into_post(self) -> Post {
        Post {
            id: self.id,
            status: PostStatus::parse(&self.status).unwrap_or(PostStatus::Public),
            metadata: serde_json::from_str(&self.metadata).unwrap_or_else(|e| {
                tracing::warn!("Corrupt metadata on post {}: {}", self.id, e);
                serde_json::json!({})
            }),
            digest_sent_at: self.digest_sent_at.as_deref().map(parse_ts),
            created_at: parse_ts(&self.created_at),
            content: self.content,
            preview_text: self.preview_text,
            slug: self.slug,
            topic_id: self.topic_id,
            topic_slug: self.topic_slug,
        }
    }
}

impl TopicRow {
    pub fn into_topic(self) -> Topic {
        Topic {
            id: self.id,
            name: self.name,
            slug: self.slug,
            post_count: self.post_count,
            created_at: parse_ts(&self.created_at),
        }
    }
}

impl DraftRow {
    pub fn into_draft(self) -> Draft {
        Draft {
            id: self.id,
            content: self.content,
            topic_id: self.topic_id,
            share_telegram: self.share_telegram,
            share_bluesky: self.share_bluesky,
            share_email: self.share_email,
            updated_at: parse_ts(&self.updated_at),
        }
    }
}

impl CommentRow {
    pub fn into_comment(self) -> Comment {
        Comment {
            id: self.id,
            post_id: self.post_id,
            author: self.author,
            content: self.content,
            pinned: self.pinned,
            created_at: parse_ts(&self.created_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_ts_sqlite_format() {
        let ts = parse_ts("2025-01-01 12:30:00");
        assert_eq!(ts.format("%Y-%m-%dT%H:%M:%SZ").to_string(), "2025-01-01T12:30:00Z");
    }

    #[test]
    fn parse_ts_rfc3339() {
        let ts = parse_ts("2025-06-15T08:00:00Z");
        assert_eq!(ts.format("%H").to_string(), "08");
    }

    #[test]
    fn parse_ts_garbage_yields_default() {
        assert_eq!(parse_ts("not a date"), DateTime::<Utc>::default());
    }
}
