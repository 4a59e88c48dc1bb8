use anyhow::Result;

use crate::Database;

impl Database {
    /// Idempotency guard for outbound email. `INSERT OR IGNORE` either
    /// claims the delivery id (true) or finds it already claimed (false);
    /// a claimed id must never be sent again.
    pub fn claim_delivery(&self, delivery_id: &str, recipient_count: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO email_deliveries (delivery_id, recipient_count)
                 VALUES (?1, ?2)",
                rusqlite::params![delivery_id, recipient_count],
            )?;
            Ok(inserted > 0)
        })
    }

    pub fn has_delivery(&self, delivery_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM email_deliveries WHERE delivery_id = ?1",
                [delivery_id],
                |row| row.get(0),
            )?;
            Ok(n > 0)
        })
    }

    /// Release a claim after a failed send so a later run can retry.
    pub fn release_delivery(&self, delivery_id: &str) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "DELETE FROM email_deliveries WHERE delivery_id = ?1",
                [delivery_id],
            )?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn delivery_claimed_exactly_once() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.claim_delivery("post#123", 5).unwrap());
        assert!(!db.claim_delivery("post#123", 5).unwrap());
        assert!(db.has_delivery("post#123").unwrap());

        // A different id is independent
        assert!(db.claim_delivery("daily#20250101", 10).unwrap());
    }

    #[test]
    fn released_claim_can_be_retaken() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.claim_delivery("weekly#202501", 3).unwrap());
        db.release_delivery("weekly#202501").unwrap();
        assert!(db.claim_delivery("weekly#202501", 3).unwrap());
    }
}
