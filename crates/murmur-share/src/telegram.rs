//! Telegram channel cross-posting via the Bot API.

use crate::error::ShareError;
use murmur_types::text::truncate;

/// Telegram caps message text at 4096 chars; stay under it with room for
/// the permalink suffix.
const MESSAGE_LIMIT: usize = 3900;

pub struct TelegramClient {
    http: reqwest::Client,
    token: String,
    channel_id: String,
}

impl TelegramClient {
    pub fn new(token: String, channel_id: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            token,
            channel_id,
        }
    }

    /// Construct from `TELEGRAM_BOT_TOKEN` / `TELEGRAM_CHANNEL_ID`;
    /// None when either is missing.
    pub fn from_env() -> Option<Self> {
        let token = std::env::var("TELEGRAM_BOT_TOKEN").ok()?;
        let channel_id = std::env::var("TELEGRAM_CHANNEL_ID").ok()?;
        Some(Self::new(token, channel_id))
    }

    pub async fn send_post(&self, content: &str, permalink: &str) -> Result<(), ShareError> {
        let url = format!("https://api.telegram.org/bot{}/sendMessage", self.token);
        let resp = self
            .http
            .post(&url)
            .json(&serde_json::json!({
                "chat_id": self.channel_id,
                "text": format_message(content, permalink),
                "parse_mode": "HTML",
            }))
            .send()
            .await?;

        if !resp.status().is_success() {
            return Err(ShareError::from_response("telegram", resp).await);
        }
        Ok(())
    }
}

/// Telegram HTML mode accepts a small tag subset; everything user-written
/// must be entity-escaped.
fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn format_message(content: &str, permalink: &str) -> String {
    let body = escape_html(&truncate(content, MESSAGE_LIMIT));
    format!("{body}\n\n<a href=\"{permalink}\">\u{2192} read on the site</a>")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_escapes_html() {
        let msg = format_message("1 < 2 && 3 > 2", "https://example.com/p/1");
        assert!(msg.contains("1 &lt; 2 &amp;&amp; 3 &gt; 2"));
        assert!(msg.contains("<a href=\"https://example.com/p/1\">"));
    }

    #[test]
    fn long_content_truncated() {
        let long = "x".repeat(5000);
        let msg = format_message(&long, "https://example.com/p/1");
        assert!(msg.len() < 4096);
        assert!(msg.contains("..."));
    }
}
