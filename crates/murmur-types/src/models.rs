use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Publication state of a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    Draft,
    Public,
}

impl PostStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Draft => "draft",
            PostStatus::Public => "public",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "draft" => Some(PostStatus::Draft),
            "public" => Some(PostStatus::Public),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub content: String,
    pub preview_text: String,
    pub slug: String,
    pub status: PostStatus,
    pub topic_id: Option<i64>,
    pub topic_slug: Option<String>,
    pub metadata: serde_json::Value,
    pub digest_sent_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Topic {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub post_count: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Draft {
    pub id: i64,
    pub content: String,
    pub topic_id: Option<i64>,
    pub share_telegram: bool,
    pub share_bluesky: bool,
    pub share_email: bool,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post_id: i64,
    pub author: String,
    pub content: String,
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
}

/// Email cadence a subscriber opted into: every post as it lands, or a
/// daily/weekly digest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DigestPreference {
    Instant,
    Daily,
    Weekly,
}

impl DigestPreference {
    pub fn as_str(self) -> &'static str {
        match self {
            DigestPreference::Instant => "instant",
            DigestPreference::Daily => "daily",
            DigestPreference::Weekly => "weekly",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "instant" => Some(DigestPreference::Instant),
            "daily" => Some(DigestPreference::Daily),
            "weekly" => Some(DigestPreference::Weekly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hashtag {
    pub tag: String,
    pub post_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn post_status_round_trip() {
        assert_eq!(PostStatus::parse("draft"), Some(PostStatus::Draft));
        assert_eq!(PostStatus::parse("public"), Some(PostStatus::Public));
        assert_eq!(PostStatus::parse("published"), None);
        assert_eq!(PostStatus::Public.as_str(), "public");
    }

    #[test]
    fn digest_preference_round_trip() {
        assert_eq!(DigestPreference::parse("instant"), Some(DigestPreference::Instant));
        assert_eq!(DigestPreference::parse("daily"), Some(DigestPreference::Daily));
        assert_eq!(DigestPreference::parse("weekly"), Some(DigestPreference::Weekly));
        assert_eq!(DigestPreference::parse("hourly"), None);
    }

    #[test]
    fn post_status_serde_lowercase() {
        let json = serde_json::to_string(&PostStatus::Public).unwrap();
        assert_eq!(json, "\"public\"");
    }
}
