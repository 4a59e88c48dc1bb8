//! Digest sender CLI, invoked by external cron:
//!
//! ```text
//! murmur-digest --period daily --max 500
//! murmur-digest --period weekly --dry-run
//! ```
//!
//! Idempotent per period: the delivery-id claim guarantees a doubled cron
//! fire sends at most one batch.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use tracing::info;

use murmur_share::digest::{Period, run_digest};
use murmur_share::email::Mailer;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PeriodArg {
    Daily,
    Weekly,
}

impl From<PeriodArg> for Period {
    fn from(arg: PeriodArg) -> Self {
        match arg {
            PeriodArg::Daily => Period::Daily,
            PeriodArg::Weekly => Period::Weekly,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "murmur-digest", about = "Send the daily or weekly email digest")]
struct Args {
    /// Digest period to send.
    #[arg(long, value_enum, default_value = "daily")]
    period: PeriodArg,

    /// Maximum number of recipients.
    #[arg(long, default_value_t = 1000)]
    max: u32,

    /// Report what would be sent without claiming or sending anything.
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "murmur=info".into()),
        )
        .init();

    let args = Args::parse();

    let db_path = std::env::var("MURMUR_DB_PATH").unwrap_or_else(|_| "murmur.db".into());
    let base_url = std::env::var("MURMUR_BASE_URL")
        .unwrap_or_else(|_| "http://localhost:3000".into())
        .trim_end_matches('/')
        .to_string();
    let site_name = std::env::var("MURMUR_SITE_NAME").unwrap_or_else(|_| "Murmur".into());

    let db = murmur_db::Database::open(&PathBuf::from(&db_path))?;
    let mailer = Mailer::from_env();

    let report = run_digest(
        &db,
        mailer.as_ref(),
        args.period.into(),
        &base_url,
        &site_name,
        args.max,
        args.dry_run,
    )
    .await?;

    match report.skipped {
        Some(reason) => info!(
            "Digest {} skipped ({reason}): {} posts, {} recipients",
            report.delivery_id, report.posts, report.recipients
        ),
        None => info!(
            "Digest {} sent: {} posts to {} recipients",
            report.delivery_id, report.posts, report.recipients
        ),
    }

    Ok(())
}
