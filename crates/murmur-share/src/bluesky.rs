//! Bluesky cross-posting over the AT Protocol XRPC endpoints.
//!
//! Each share performs a fresh `createSession` login, builds link facets
//! over the post text, scrapes og: metadata from the first linked page for
//! a link-card embed (image upload best-effort), and writes an
//! `app.bsky.feed.post` record.

use regex::Regex;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::OnceLock;
use tracing::warn;

use crate::error::ShareError;

/// Bluesky post records cap text at 300 graphemes; keep headroom for the
/// permalink line.
const RECORD_TEXT_LIMIT: usize = 280;

/// Upper bound on fetched page bytes when scraping og: metadata.
const SCRAPE_BYTE_LIMIT: usize = 512 * 1024;

pub struct BlueskyClient {
    http: reqwest::Client,
    pds_url: String,
    identifier: String,
    password: String,
}

#[derive(Debug, Deserialize)]
struct SessionResponse {
    did: String,
    #[serde(rename = "accessJwt")]
    access_jwt: String,
}

#[derive(Debug, Default, PartialEq)]
pub(crate) struct OgMeta {
    pub title: Option<String>,
    pub description: Option<String>,
    pub image: Option<String>,
}

impl BlueskyClient {
    pub fn new(pds_url: String, identifier: String, password: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            pds_url: pds_url.trim_end_matches('/').to_string(),
            identifier,
            password,
        }
    }

    /// Construct from `BLUESKY_IDENTIFIER` / `BLUESKY_PASSWORD`, with
    /// `BLUESKY_PDS_URL` defaulting to the main PDS.
    pub fn from_env() -> Option<Self> {
        let identifier = std::env::var("BLUESKY_IDENTIFIER").ok()?;
        let password = std::env::var("BLUESKY_PASSWORD").ok()?;
        let pds_url = std::env::var("BLUESKY_PDS_URL")
            .unwrap_or_else(|_| "https://bsky.social".to_string());
        Some(Self::new(pds_url, identifier, password))
    }

    /// Post to the account's feed. Returns the record URI.
    pub async fn send_post(&self, content: &str, permalink: &str) -> Result<String, ShareError> {
        let session = self.create_session().await?;

        let text = compose_text(content, permalink);
        let facets = link_facets(&text);

        // Card embed: unfurl the first URL in the content, or fall back to
        // the post's own permalink. Failures only lose the card.
        let card_url = first_url(content).unwrap_or(permalink);
        let embed = match self.build_link_embed(&session, card_url).await {
            Ok(embed) => Some(embed),
            Err(e) => {
                warn!("Bluesky link card for {} failed: {}", card_url, e);
                None
            }
        };

        let mut record = json!({
            "$type": "app.bsky.feed.post",
            "text": text,
            "createdAt": chrono::Utc::now().to_rfc3339(),
        });
        if !facets.is_empty() {
            record["facets"] = Value::Array(facets);
        }
        if let Some(embed) = embed {
            record["embed"] = embed;
        }

        let resp = self
            .http
            .post(format!("{}/xrpc/com.atproto.repo.createRecord", self.pds_url))
            .bearer_auth(&session.access_jwt)
            .json(&json!({
                "repo": session.did,
                "collection": "app.bsky.feed.post",
                "record": record,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ShareError::from_response("bluesky", resp).await);
        }

        #[derive(Deserialize)]
        struct CreateRecordResponse {
            uri: String,
        }
        let created: CreateRecordResponse = resp.json().await?;
        Ok(created.uri)
    }

    async fn create_session(&self) -> Result<SessionResponse, ShareError> {
        let resp = self
            .http
            .post(format!(
                "{}/xrpc/com.atproto.server.createSession",
                self.pds_url
            ))
            .json(&json!({
                "identifier": self.identifier,
                "password": self.password,
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ShareError::from_response("bluesky", resp).await);
        }
        Ok(resp.json().await?)
    }

    /// Build an `app.bsky.embed.external` card for a URL: scrape og: tags,
    /// upload the og:image as a blob when one exists.
    async fn build_link_embed(
        &self,
        session: &SessionResponse,
        url: &str,
    ) -> Result<Value, ShareError> {
        let page = self.http.get(url).send().await?.text().await?;
        let mut limit = page.len().min(SCRAPE_BYTE_LIMIT);
        while !page.is_char_boundary(limit) {
            limit -= 1;
        }
        let meta = extract_og(&page[..limit]);

        let thumb = match meta.image.as_deref() {
            Some(image_url) => match self.upload_image(session, image_url).await {
                Ok(blob) => Some(blob),
                Err(e) => {
                    warn!("Bluesky og:image upload failed for {}: {}", image_url, e);
                    None
                }
            },
            None => None,
        };

        let mut external = json!({
            "uri": url,
            "title": meta.title.unwrap_or_else(|| url.to_string()),
            "description": meta.description.unwrap_or_default(),
        });
        if let Some(thumb) = thumb {
            external["thumb"] = thumb;
        }

        Ok(json!({
            "$type": "app.bsky.embed.external",
            "external": external,
        }))
    }

    async fn upload_image(
        &self,
        session: &SessionResponse,
        image_url: &str,
    ) -> Result<Value, ShareError> {
        let image = self.http.get(image_url).send().await?;
        let content_type = image
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("image/jpeg")
            .to_string();
        let bytes = image.bytes().await?;

        let resp = self
            .http
            .post(format!("{}/xrpc/com.atproto.repo.uploadBlob", self.pds_url))
            .bearer_auth(&session.access_jwt)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ShareError::from_response("bluesky", resp).await);
        }

        #[derive(Deserialize)]
        struct UploadBlobResponse {
            blob: Value,
        }
        let uploaded: UploadBlobResponse = resp.json().await?;
        Ok(uploaded.blob)
    }
}

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"https?://[^\s<>\)]+").expect("static regex"))
}

fn meta_tag_regex(property: &str) -> Regex {
    // Matches <meta property="og:x" content="..."> in either attribute order.
    Regex::new(&format!(
        r#"(?is)<meta\s+[^>]*?(?:property|name)\s*=\s*["']{property}["'][^>]*?content\s*=\s*["']([^"']*)["']|<meta\s+[^>]*?content\s*=\s*["']([^"']*)["'][^>]*?(?:property|name)\s*=\s*["']{property}["']"#
    ))
    .expect("static regex")
}

pub(crate) fn first_url(text: &str) -> Option<&str> {
    url_regex().find(text).map(|m| m.as_str())
}

/// Rich-text link facets with UTF-8 byte offsets, as the record format
/// requires.
pub(crate) fn link_facets(text: &str) -> Vec<Value> {
    url_regex()
        .find_iter(text)
        .map(|m| {
            json!({
                "index": { "byteStart": m.start(), "byteEnd": m.end() },
                "features": [{
                    "$type": "app.bsky.richtext.facet#link",
                    "uri": m.as_str(),
                }],
            })
        })
        .collect()
}

/// Pull og:title / og:description / og:image out of a scraped page,
/// falling back to the document <title> for the title.
pub(crate) fn extract_og(html: &str) -> OgMeta {
    let grab = |property: &str| -> Option<String> {
        meta_tag_regex(property).captures(html).and_then(|c| {
            c.get(1)
                .or_else(|| c.get(2))
                .map(|m| m.as_str().trim().to_string())
                .filter(|s| !s.is_empty())
        })
    };

    let title = grab("og:title").or_else(|| {
        static TITLE_RE: OnceLock<Regex> = OnceLock::new();
        TITLE_RE
            .get_or_init(|| Regex::new(r"(?is)<title[^>]*>(.*?)</title>").expect("static regex"))
            .captures(html)
            .map(|c| c[1].trim().to_string())
            .filter(|s| !s.is_empty())
    });

    OgMeta {
        title,
        description: grab("og:description"),
        image: grab("og:image"),
    }
}

fn compose_text(content: &str, permalink: &str) -> String {
    let content = content.trim();
    if content.chars().count() <= RECORD_TEXT_LIMIT {
        return format!("{content}\n\n{permalink}");
    }
    let cut: String = content.chars().take(RECORD_TEXT_LIMIT - 2).collect();
    format!("{}..\n\n{permalink}", cut.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facets_use_byte_offsets() {
        // Cyrillic prefix shifts byte offsets past char offsets.
        let text = "привет https://example.com world";
        let facets = link_facets(text);
        assert_eq!(facets.len(), 1);

        let start = facets[0]["index"]["byteStart"].as_u64().unwrap() as usize;
        let end = facets[0]["index"]["byteEnd"].as_u64().unwrap() as usize;
        assert_eq!(&text.as_bytes()[start..end], b"https://example.com");
        assert_eq!(
            facets[0]["features"][0]["uri"].as_str().unwrap(),
            "https://example.com"
        );
    }

    #[test]
    fn no_links_no_facets() {
        assert!(link_facets("plain text only").is_empty());
    }

    #[test]
    fn first_url_found() {
        assert_eq!(
            first_url("see https://a.example and https://b.example"),
            Some("https://a.example")
        );
        assert_eq!(first_url("nothing"), None);
    }

    #[test]
    fn og_extraction_both_attribute_orders() {
        let html = r#"<head>
            <meta property="og:title" content="A Title">
            <meta content="A description." property="og:description">
            <meta property="og:image" content="https://img.example/x.png">
        </head>"#;
        let meta = extract_og(html);
        assert_eq!(meta.title.as_deref(), Some("A Title"));
        assert_eq!(meta.description.as_deref(), Some("A description."));
        assert_eq!(meta.image.as_deref(), Some("https://img.example/x.png"));
    }

    #[test]
    fn og_falls_back_to_title_tag() {
        let html = "<html><head><title>Fallback</title></head></html>";
        let meta = extract_og(html);
        assert_eq!(meta.title.as_deref(), Some("Fallback"));
        assert_eq!(meta.description, None);
    }

    #[test]
    fn compose_text_appends_permalink() {
        let text = compose_text("short note", "https://example.com/p/1");
        assert_eq!(text, "short note\n\nhttps://example.com/p/1");
    }

    #[test]
    fn compose_text_truncates_long_content() {
        let long = "word ".repeat(200);
        let text = compose_text(&long, "https://example.com/p/1");
        assert!(text.contains(".."));
        assert!(text.ends_with("https://example.com/p/1"));
        let body = text.split("\n\n").next().unwrap();
        assert!(body.chars().count() <= RECORD_TEXT_LIMIT);
    }
}
