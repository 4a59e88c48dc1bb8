//! Daily/weekly digest batch senders, invoked by external cron through the
//! `murmur-digest` binary.

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Duration, Utc};
use tracing::info;

use crate::email::{Mailer, render_digest_email};
use murmur_db::Database;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Daily,
    Weekly,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::Daily => "daily",
            Period::Weekly => "weekly",
        }
    }
}

/// Outcome of one digest run, also used for `--dry-run` reporting.
#[derive(Debug)]
pub struct DigestReport {
    pub delivery_id: String,
    pub posts: usize,
    pub recipients: usize,
    pub sent: bool,
    pub skipped: Option<&'static str>,
}

/// Deterministic idempotency key for a digest: one per UTC day or ISO week.
pub fn delivery_id(period: Period, now: DateTime<Utc>) -> String {
    match period {
        Period::Daily => format!("daily#{}", now.format("%Y%m%d")),
        Period::Weekly => {
            let week = now.iso_week();
            format!("weekly#{}{:02}", week.year(), week.week())
        }
    }
}

fn period_start(period: Period, now: DateTime<Utc>) -> DateTime<Utc> {
    match period {
        Period::Daily => now - Duration::days(1),
        Period::Weekly => now - Duration::days(7),
    }
}

/// Run one digest send. Claims the delivery id before sending so a doubled
/// cron fire results in exactly one batch; the claim is released again when
/// the batch send fails so a later run can retry.
pub async fn run_digest(
    db: &Database,
    mailer: Option<&Mailer>,
    period: Period,
    base_url: &str,
    site_name: &str,
    max_recipients: u32,
    dry_run: bool,
) -> Result<DigestReport> {
    let now = Utc::now();
    let id = delivery_id(period, now);
    let since = period_start(period, now)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string();

    let mut report = DigestReport {
        delivery_id: id.clone(),
        posts: 0,
        recipients: 0,
        sent: false,
        skipped: None,
    };

    let posts: Vec<_> = db
        .list_digest_candidates(&since)?
        .into_iter()
        .map(|row| row.into_post())
        .collect();
    report.posts = posts.len();
    if posts.is_empty() {
        report.skipped = Some("no new posts");
        return Ok(report);
    }

    let subscribers = db.list_confirmed_subscribers(period.as_str(), max_recipients)?;
    report.recipients = subscribers.len();
    if subscribers.is_empty() {
        report.skipped = Some("no confirmed subscribers");
        return Ok(report);
    }

    if dry_run {
        report.skipped = Some("dry run");
        return Ok(report);
    }

    let mailer = mailer.context("RESEND_API_KEY is not configured")?;

    if !db.claim_delivery(&id, subscribers.len() as i64)? {
        report.skipped = Some("already delivered");
        return Ok(report);
    }

    let messages: Vec<_> = subscribers
        .iter()
        .map(|sub| {
            let (subject, html) = render_digest_email(
                &posts,
                period.as_str(),
                base_url,
                site_name,
                &sub.unsubscribe_token,
            );
            mailer.message(&sub.email, subject, html)
        })
        .collect();

    if let Err(e) = mailer.send_batch(&messages).await {
        db.release_delivery(&id)?;
        return Err(e).context("digest batch send failed");
    }

    db.mark_digest_sent(&posts.iter().map(|p| p.id).collect::<Vec<_>>())?;
    db.mark_subscribers_sent(&subscribers.iter().map(|s| s.id).collect::<Vec<_>>())?;
    db.log_activity("digest", Some(&id))?;

    info!(
        "Digest {} sent: {} posts to {} subscribers",
        id,
        posts.len(),
        subscribers.len()
    );
    report.sent = true;
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn daily_delivery_id_is_utc_date() {
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(delivery_id(Period::Daily, now), "daily#20250101");
    }

    #[test]
    fn weekly_delivery_id_uses_iso_week() {
        // 2025-01-01 falls in ISO week 1 of 2025
        let now = Utc.with_ymd_and_hms(2025, 1, 1, 12, 0, 0).unwrap();
        assert_eq!(delivery_id(Period::Weekly, now), "weekly#202501");
        // 2024-12-30 is already ISO week 1 of 2025
        let spill = Utc.with_ymd_and_hms(2024, 12, 30, 0, 0, 0).unwrap();
        assert_eq!(delivery_id(Period::Weekly, spill), "weekly#202501");
    }

    #[test]
    fn period_start_spans() {
        let now = Utc.with_ymd_and_hms(2025, 6, 8, 0, 0, 0).unwrap();
        assert_eq!(
            period_start(Period::Daily, now),
            Utc.with_ymd_and_hms(2025, 6, 7, 0, 0, 0).unwrap()
        );
        assert_eq!(
            period_start(Period::Weekly, now),
            Utc.with_ymd_and_hms(2025, 6, 1, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn digest_skips_without_posts() {
        let db = murmur_db::Database::open_in_memory().unwrap();
        let report = run_digest(&db, None, Period::Daily, "https://b.example", "Murmur", 100, false)
            .await
            .unwrap();
        assert!(!report.sent);
        assert_eq!(report.skipped, Some("no new posts"));
        assert!(!db.has_delivery(&report.delivery_id).unwrap());
    }

    #[tokio::test]
    async fn digest_skips_without_subscribers() {
        let db = murmur_db::Database::open_in_memory().unwrap();
        db.create_post("hi", "hi", "hi", "public", None, "{}", &[]).unwrap();
        let report = run_digest(&db, None, Period::Daily, "https://b.example", "Murmur", 100, false)
            .await
            .unwrap();
        assert_eq!(report.posts, 1);
        assert_eq!(report.skipped, Some("no confirmed subscribers"));
    }

    #[tokio::test]
    async fn dry_run_claims_nothing() {
        let db = murmur_db::Database::open_in_memory().unwrap();
        db.create_post("hi", "hi", "hi", "public", None, "{}", &[]).unwrap();
        db.subscribe("a@example.com", "daily", "t", "u").unwrap();
        db.confirm_subscription("t").unwrap();

        let report = run_digest(&db, None, Period::Daily, "https://b.example", "Murmur", 100, true)
            .await
            .unwrap();
        assert_eq!(report.recipients, 1);
        assert_eq!(report.skipped, Some("dry run"));
        assert!(!db.has_delivery(&report.delivery_id).unwrap());
        // Post remains a candidate for the real run.
        assert_eq!(db.list_digest_candidates("2000-01-01 00:00:00").unwrap().len(), 1);
    }
}
