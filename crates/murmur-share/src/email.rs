//! Transactional and batch email via the Resend HTTP API.

use maud::{Markup, html};
use serde::Serialize;
use tracing::debug;

use crate::error::ShareError;
use murmur_types::models::Post;

const RESEND_API: &str = "https://api.resend.com";

/// Resend's batch endpoint accepts at most 100 messages per call.
const BATCH_CHUNK: usize = 100;

pub struct Mailer {
    http: reqwest::Client,
    api_key: String,
    from: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EmailMessage {
    pub from: String,
    pub to: Vec<String>,
    pub subject: String,
    pub html: String,
}

impl Mailer {
    pub fn new(api_key: String, from: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            from,
        }
    }

    /// Construct from `RESEND_API_KEY` / `MURMUR_EMAIL_FROM`; None when the
    /// key is missing.
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("RESEND_API_KEY").ok()?;
        let from = std::env::var("MURMUR_EMAIL_FROM")
            .unwrap_or_else(|_| "Murmur <noreply@localhost>".to_string());
        Some(Self::new(api_key, from))
    }

    pub fn message(&self, to: &str, subject: String, html: String) -> EmailMessage {
        EmailMessage {
            from: self.from.clone(),
            to: vec![to.to_string()],
            subject,
            html,
        }
    }

    pub async fn send(&self, message: &EmailMessage) -> Result<(), ShareError> {
        let resp = self
            .http
            .post(format!("{RESEND_API}/emails"))
            .bearer_auth(&self.api_key)
            .json(message)
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ShareError::from_response("resend", resp).await);
        }
        Ok(())
    }

    /// Send a batch of personalized messages, chunked to the API limit.
    pub async fn send_batch(&self, messages: &[EmailMessage]) -> Result<(), ShareError> {
        for chunk in messages.chunks(BATCH_CHUNK) {
            let resp = self
                .http
                .post(format!("{RESEND_API}/emails/batch"))
                .bearer_auth(&self.api_key)
                .json(chunk)
                .send()
                .await?;

            if !resp.status().is_success() {
                return Err(ShareError::from_response("resend", resp).await);
            }
            debug!("Resend batch of {} accepted", chunk.len());
        }
        Ok(())
    }
}

// ── Email bodies ────────────────────────────────────────────────────────

fn email_shell(site_name: &str, body: Markup, unsubscribe_url: &str) -> String {
    html! {
        div style="max-width:600px;margin:0 auto;font-family:sans-serif;line-height:1.6;color:#222" {
            (body)
            hr style="border:none;border-top:1px solid #ddd;margin:24px 0";
            p style="font-size:12px;color:#888" {
                "You are receiving this because you subscribed to " (site_name) ". "
                a href=(unsubscribe_url) { "Unsubscribe" }
            }
        }
    }
    .into_string()
}

/// Single-post notification. The preview doubles as the subject line.
pub fn render_post_email(
    post: &Post,
    base_url: &str,
    site_name: &str,
    unsubscribe_token: &str,
) -> (String, String) {
    let permalink = format!("{base_url}/p/{}", post.id);
    let unsubscribe_url = format!("{base_url}/api/unsubscribe?token={unsubscribe_token}");

    let body = html! {
        p style="white-space:pre-wrap" { (post.content) }
        p { a href=(permalink) { "View on " (site_name) } }
    };

    (post.preview_text.clone(), email_shell(site_name, body, &unsubscribe_url))
}

/// Digest covering several posts.
pub fn render_digest_email(
    posts: &[Post],
    period_label: &str,
    base_url: &str,
    site_name: &str,
    unsubscribe_token: &str,
) -> (String, String) {
    let unsubscribe_url = format!("{base_url}/api/unsubscribe?token={unsubscribe_token}");
    let subject = format!(
        "{site_name} {period_label} digest — {} new {}",
        posts.len(),
        if posts.len() == 1 { "post" } else { "posts" }
    );

    let body = html! {
        h2 style="font-size:18px" { (site_name) " — " (period_label) " digest" }
        @for post in posts {
            div style="margin:16px 0;padding:12px;border:1px solid #eee;border-radius:6px" {
                p style="white-space:pre-wrap;margin:0 0 8px" { (post.content) }
                a href=(format!("{base_url}/p/{}", post.id)) { "Read \u{2192}" }
            }
        }
    };

    (subject, email_shell(site_name, body, &unsubscribe_url))
}

/// Double-opt-in confirmation mail.
pub fn render_confirmation_email(
    base_url: &str,
    site_name: &str,
    confirmation_token: &str,
) -> (String, String) {
    let confirm_url = format!("{base_url}/api/confirmSubscription?token={confirmation_token}");

    let body = html! {
        p { "Confirm your subscription to " (site_name) ":" }
        p { a href=(confirm_url) { "Confirm subscription" } }
        p style="color:#888" { "If you did not request this, ignore this email." }
    };

    // No unsubscribe row exists to point at yet; the confirm link is the
    // only action.
    let html_body = html! {
        div style="max-width:600px;margin:0 auto;font-family:sans-serif;line-height:1.6;color:#222" {
            (body)
        }
    }
    .into_string();

    (format!("Confirm your {site_name} subscription"), html_body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use murmur_types::models::{Post, PostStatus};

    fn post(content: &str, preview: &str) -> Post {
        Post {
            id: 7,
            content: content.to_string(),
            preview_text: preview.to_string(),
            slug: "s".into(),
            status: PostStatus::Public,
            topic_id: None,
            topic_slug: None,
            metadata: serde_json::json!({}),
            digest_sent_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn post_email_subject_is_preview() {
        let p = post("a longer body of text", "a longer body..");
        let (subject, html) = render_post_email(&p, "https://b.example", "Murmur", "tok");
        assert_eq!(subject, "a longer body..");
        assert!(html.contains("https://b.example/p/7"));
        assert!(html.contains("unsubscribe?token=tok"));
    }

    #[test]
    fn post_email_escapes_content() {
        let p = post("<script>alert(1)</script>", "x");
        let (_, html) = render_post_email(&p, "https://b.example", "Murmur", "tok");
        assert!(!html.contains("<script>alert"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn digest_subject_counts_posts() {
        let posts = vec![post("one", "one"), post("two", "two")];
        let (subject, html) =
            render_digest_email(&posts, "daily", "https://b.example", "Murmur", "tok");
        assert_eq!(subject, "Murmur daily digest — 2 new posts");
        assert!(html.contains("one"));
        assert!(html.contains("two"));
    }

    #[test]
    fn confirmation_email_links_token() {
        let (subject, html) = render_confirmation_email("https://b.example", "Murmur", "ctok");
        assert!(subject.contains("Confirm"));
        assert!(html.contains("confirmSubscription?token=ctok"));
    }
}
