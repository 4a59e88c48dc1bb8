use anyhow::Result;

use crate::models::SubscriberRow;
use crate::{Database, OptionalExt};

/// Result of a subscribe attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum SubscribeOutcome {
    /// New unconfirmed row created.
    Created { confirmation_token: String },
    /// Email already present but unconfirmed: token reissued on the
    /// existing row, no duplicate created.
    Reissued { confirmation_token: String },
    /// Email already confirmed.
    AlreadyConfirmed,
}

fn map_subscriber(row: &rusqlite::Row<'_>) -> rusqlite::Result<SubscriberRow> {
    Ok(SubscriberRow {
        id: row.get(0)?,
        email: row.get(1)?,
        confirmed: row.get::<_, i64>(2)? != 0,
        confirmation_token: row.get(3)?,
        unsubscribe_token: row.get(4)?,
        preference: row.get(5)?,
        last_sent_at: row.get(6)?,
        created_at: row.get(7)?,
    })
}

const SUBSCRIBER_COLUMNS: &str = "id, email, confirmed, confirmation_token, \
     unsubscribe_token, preference, last_sent_at, created_at";

impl Database {
    /// Double-opt-in subscribe: create an unconfirmed row, or reissue the
    /// confirmation token when the email already exists unconfirmed.
    pub fn subscribe(
        &self,
        email: &str,
        preference: &str,
        confirmation_token: &str,
        unsubscribe_token: &str,
    ) -> Result<SubscribeOutcome> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing: Option<(i64, bool)> = tx
                .query_row(
                    "SELECT id, confirmed FROM subscribers WHERE email = ?1",
                    [email],
                    |row| Ok((row.get(0)?, row.get::<_, i64>(1)? != 0)),
                )
                .optional()?;

            let outcome = match existing {
                Some((_, true)) => SubscribeOutcome::AlreadyConfirmed,
                Some((id, false)) => {
                    tx.execute(
                        "UPDATE subscribers
                         SET confirmation_token = ?1, preference = ?2
                         WHERE id = ?3",
                        rusqlite::params![confirmation_token, preference, id],
                    )?;
                    SubscribeOutcome::Reissued {
                        confirmation_token: confirmation_token.to_string(),
                    }
                }
                None => {
                    tx.execute(
                        "INSERT INTO subscribers
                         (email, confirmation_token, unsubscribe_token, preference)
                         VALUES (?1, ?2, ?3, ?4)",
                        rusqlite::params![email, confirmation_token, unsubscribe_token, preference],
                    )?;
                    SubscribeOutcome::Created {
                        confirmation_token: confirmation_token.to_string(),
                    }
                }
            };

            tx.commit()?;
            Ok(outcome)
        })
    }

    pub fn confirm_subscription(&self, token: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE subscribers SET confirmed = 1
                 WHERE confirmation_token = ?1 AND confirmed = 0",
                [token],
            )?;
            Ok(n > 0)
        })
    }

    pub fn unsubscribe(&self, token: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "DELETE FROM subscribers WHERE unsubscribe_token = ?1",
                [token],
            )?;
            Ok(n > 0)
        })
    }

    pub fn get_subscriber(&self, email: &str) -> Result<Option<SubscriberRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {SUBSCRIBER_COLUMNS} FROM subscribers WHERE email = ?1");
            conn.prepare(&sql)?.query_row([email], map_subscriber).optional()
        })
    }

    /// Confirmed subscribers with the given preference, oldest first.
    pub fn list_confirmed_subscribers(
        &self,
        preference: &str,
        limit: u32,
    ) -> Result<Vec<SubscriberRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {SUBSCRIBER_COLUMNS} FROM subscribers
                 WHERE confirmed = 1 AND preference = ?1
                 ORDER BY created_at ASC
                 LIMIT ?2"
            );
            let rows = conn
                .prepare(&sql)?
                .query_map(rusqlite::params![preference, limit], map_subscriber)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn mark_subscribers_sent(&self, ids: &[i64]) -> Result<()> {
        if ids.is_empty() {
            return Ok(());
        }
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for id in ids {
                tx.execute(
                    "UPDATE subscribers SET last_sent_at = datetime('now') WHERE id = ?1",
                    [id],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }
}
