use anyhow::Result;

use crate::models::SessionRow;
use crate::{Database, OptionalExt};

/// Session lifetime in days.
pub const SESSION_TTL_DAYS: i64 = 7;

impl Database {
    /// Insert a session row expiring [`SESSION_TTL_DAYS`] from now.
    /// Returns the stored expires_at timestamp.
    pub fn create_session(&self, id: &str, device_info: Option<&str>) -> Result<String> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, device_info, expires_at)
                 VALUES (?1, ?2, datetime('now', '+' || ?3 || ' days'))",
                rusqlite::params![id, device_info, SESSION_TTL_DAYS],
            )?;
            let expires_at: String = conn.query_row(
                "SELECT expires_at FROM sessions WHERE id = ?1",
                [id],
                |row| row.get(0),
            )?;
            Ok(expires_at)
        })
    }

    pub fn get_session(&self, id: &str) -> Result<Option<SessionRow>> {
        self.with_conn(|conn| {
            conn.prepare(
                "SELECT id, device_info, expires_at, created_at FROM sessions WHERE id = ?1",
            )?
            .query_row([id], |row| {
                Ok(SessionRow {
                    id: row.get(0)?,
                    device_info: row.get(1)?,
                    expires_at: row.get(2)?,
                    created_at: row.get(3)?,
                })
            })
            .optional()
        })
    }

    /// A session is valid iff its row exists and expires_at is in the future.
    pub fn session_valid(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM sessions
                 WHERE id = ?1 AND expires_at > datetime('now')",
                [id],
                |row| row.get(0),
            )?;
            Ok(n > 0)
        })
    }

    /// Global revoke: delete every session. Returns the count removed.
    pub fn delete_all_sessions(&self) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM sessions", [])?;
            Ok(n)
        })
    }

    pub fn prune_expired_sessions(&self) -> Result<usize> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "DELETE FROM sessions WHERE expires_at <= datetime('now')",
                [],
            )?;
            Ok(n)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn created_session_is_valid() {
        let db = Database::open_in_memory().unwrap();
        let expires = db.create_session("abc123", Some("test agent")).unwrap();
        assert!(!expires.is_empty());
        assert!(db.session_valid("abc123").unwrap());
        assert!(!db.session_valid("missing").unwrap());
    }

    #[test]
    fn expired_session_is_invalid() {
        let db = Database::open_in_memory().unwrap();
        db.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO sessions (id, expires_at)
                 VALUES ('old', datetime('now', '-1 day'))",
                [],
            )?;
            Ok(())
        })
        .unwrap();
        assert!(!db.session_valid("old").unwrap());
        assert_eq!(db.prune_expired_sessions().unwrap(), 1);
        assert!(db.get_session("old").unwrap().is_none());
    }

    #[test]
    fn revoke_all_deletes_everything() {
        let db = Database::open_in_memory().unwrap();
        db.create_session("one", None).unwrap();
        db.create_session("two", None).unwrap();
        assert_eq!(db.delete_all_sessions().unwrap(), 2);
        assert!(!db.session_valid("one").unwrap());
    }

    #[test]
    fn expiry_is_roughly_seven_days_out() {
        let db = Database::open_in_memory().unwrap();
        let expires = db.create_session("s", None).unwrap();
        let expires_ts = crate::models::parse_ts(&expires);
        let delta = expires_ts - chrono::Utc::now();
        assert!(delta.num_days() >= 6 && delta.num_days() <= 7);
    }
}
