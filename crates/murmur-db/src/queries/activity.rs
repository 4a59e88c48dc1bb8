use anyhow::Result;

use crate::Database;

impl Database {
    pub fn log_activity(&self, action: &str, detail: Option<&str>) -> Result<()> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO activity_log (action, detail) VALUES (?1, ?2)",
                rusqlite::params![action, detail],
            )?;
            Ok(())
        })
    }

    pub fn recent_activity(&self, limit: u32) -> Result<Vec<(String, Option<String>, String)>> {
        self.with_conn(|conn| {
            let rows = conn
                .prepare(
                    "SELECT action, detail, created_at FROM activity_log
                     ORDER BY id DESC LIMIT ?1",
                )?
                .query_map([limit], |row| {
                    Ok((row.get(0)?, row.get(1)?, row.get(2)?))
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
