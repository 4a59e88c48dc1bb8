//! Outbound sharing: Telegram, Bluesky, and email cross-posting, plus the
//! slug/translation helpers the publish pipeline uses.
//!
//! Every channel is best-effort. Failures are logged and reported in the
//! [`ShareOutcome`], never propagated to the publishing request.

pub mod bluesky;
pub mod digest;
pub mod email;
pub mod error;
pub mod slug;
pub mod telegram;
pub mod translate;

use tracing::{info, warn};

use crate::bluesky::BlueskyClient;
use crate::email::{Mailer, render_post_email};
use crate::error::ShareError;
use crate::telegram::TelegramClient;
use crate::translate::Translator;
use murmur_db::Database;
use murmur_types::api::{ChannelOutcome, ShareOutcome};
use murmur_types::models::Post;

/// Which channels a publish requested.
#[derive(Debug, Clone, Copy)]
pub struct ShareFlags {
    pub telegram: bool,
    pub bluesky: bool,
    pub email: bool,
}

/// All configured outbound clients. Unconfigured channels stay `None` and
/// report [`ChannelOutcome::Skipped`].
pub struct ShareHub {
    pub telegram: Option<TelegramClient>,
    pub bluesky: Option<BlueskyClient>,
    pub mailer: Option<Mailer>,
    pub translator: Option<Translator>,
}

impl ShareHub {
    pub fn from_env() -> Self {
        let hub = Self {
            telegram: TelegramClient::from_env(),
            bluesky: BlueskyClient::from_env(),
            mailer: Mailer::from_env(),
            translator: Translator::from_env(),
        };
        info!(
            telegram = hub.telegram.is_some(),
            bluesky = hub.bluesky.is_some(),
            email = hub.mailer.is_some(),
            translator = hub.translator.is_some(),
            "outbound channels configured"
        );
        hub
    }

    /// Disabled hub for tests and offline use.
    pub fn disabled() -> Self {
        Self {
            telegram: None,
            bluesky: None,
            mailer: None,
            translator: None,
        }
    }

    /// Cross-post a freshly published post to every requested channel.
    /// Channels run sequentially; each failure is contained and logged.
    pub async fn share_post(
        &self,
        db: &Database,
        post: &Post,
        flags: ShareFlags,
        base_url: &str,
        site_name: &str,
    ) -> ShareOutcome {
        let mut outcome = ShareOutcome::default();
        let permalink = format!("{base_url}/p/{}", post.id);

        if flags.telegram {
            if let Some(telegram) = &self.telegram {
                outcome.telegram = match telegram.send_post(&post.content, &permalink).await {
                    Ok(()) => ChannelOutcome::Sent,
                    Err(e) => {
                        warn!("Telegram share for post {} failed: {}", post.id, e);
                        ChannelOutcome::Failed
                    }
                };
            }
        }

        if flags.bluesky {
            if let Some(bluesky) = &self.bluesky {
                outcome.bluesky = match bluesky.send_post(&post.content, &permalink).await {
                    Ok(uri) => {
                        info!("Post {} shared to Bluesky as {}", post.id, uri);
                        ChannelOutcome::Sent
                    }
                    Err(e) => {
                        warn!("Bluesky share for post {} failed: {}", post.id, e);
                        ChannelOutcome::Failed
                    }
                };
            }
        }

        if flags.email {
            if let Some(mailer) = &self.mailer {
                outcome.email =
                    match send_post_email(db, mailer, post, base_url, site_name).await {
                        Ok(true) => ChannelOutcome::Sent,
                        Ok(false) => ChannelOutcome::Skipped,
                        Err(e) => {
                            warn!("Email share for post {} failed: {}", post.id, e);
                            ChannelOutcome::Failed
                        }
                    };
            }
        }

        outcome
    }
}

/// Email a post to instant-preference subscribers, guarded by the
/// `post#<id>` delivery id. Returns false when nothing was sent (no
/// subscribers, or the id was already claimed).
async fn send_post_email(
    db: &Database,
    mailer: &Mailer,
    post: &Post,
    base_url: &str,
    site_name: &str,
) -> Result<bool, ShareError> {
    let delivery_id = format!("post#{}", post.id);

    let subscribers = db.list_confirmed_subscribers("instant", 10_000)?;
    if subscribers.is_empty() {
        return Ok(false);
    }

    let claimed = db.claim_delivery(&delivery_id, subscribers.len() as i64)?;
    if !claimed {
        info!("Delivery {} already sent, skipping", delivery_id);
        return Ok(false);
    }

    let messages: Vec<_> = subscribers
        .iter()
        .map(|sub| {
            let (subject, html) =
                render_post_email(post, base_url, site_name, &sub.unsubscribe_token);
            mailer.message(&sub.email, subject, html)
        })
        .collect();

    if let Err(e) = mailer.send_batch(&messages).await {
        let _ = db.release_delivery(&delivery_id);
        return Err(e);
    }

    let ids: Vec<i64> = subscribers.iter().map(|s| s.id).collect();
    if let Err(e) = db.mark_subscribers_sent(&ids) {
        warn!("Failed to record last_sent_at: {}", e);
    }
    Ok(true)
}
