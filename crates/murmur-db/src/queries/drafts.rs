use anyhow::Result;

use crate::models::DraftRow;
use crate::{Database, OptionalExt};

fn map_draft(row: &rusqlite::Row<'_>) -> rusqlite::Result<DraftRow> {
    Ok(DraftRow {
        id: row.get(0)?,
        content: row.get(1)?,
        topic_id: row.get(2)?,
        share_telegram: row.get::<_, i64>(3)? != 0,
        share_bluesky: row.get::<_, i64>(4)? != 0,
        share_email: row.get::<_, i64>(5)? != 0,
        updated_at: row.get(6)?,
    })
}

const DRAFT_COLUMNS: &str =
    "id, content, topic_id, share_telegram, share_bluesky, share_email, updated_at";

impl Database {
    pub fn insert_draft(
        &self,
        content: &str,
        topic_id: Option<i64>,
        share_telegram: bool,
        share_bluesky: bool,
        share_email: bool,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO drafts (content, topic_id, share_telegram, share_bluesky, share_email)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![
                    content,
                    topic_id,
                    share_telegram as i64,
                    share_bluesky as i64,
                    share_email as i64
                ],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_draft(&self, id: i64) -> Result<Option<DraftRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {DRAFT_COLUMNS} FROM drafts WHERE id = ?1");
            conn.prepare(&sql)?.query_row([id], map_draft).optional()
        })
    }

    /// Drafts newest-touched first.
    pub fn list_drafts(&self) -> Result<Vec<DraftRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {DRAFT_COLUMNS} FROM drafts ORDER BY updated_at DESC, id DESC"
            );
            let rows = conn
                .prepare(&sql)?
                .query_map([], map_draft)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_draft(
        &self,
        id: i64,
        content: &str,
        topic_id: Option<i64>,
        share_telegram: bool,
        share_bluesky: bool,
        share_email: bool,
    ) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE drafts
                 SET content = ?1, topic_id = ?2, share_telegram = ?3,
                     share_bluesky = ?4, share_email = ?5,
                     updated_at = datetime('now')
                 WHERE id = ?6",
                rusqlite::params![
                    content,
                    topic_id,
                    share_telegram as i64,
                    share_bluesky as i64,
                    share_email as i64,
                    id
                ],
            )?;
            Ok(n > 0)
        })
    }

    pub fn delete_draft(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM drafts WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn draft_crud_round_trip() {
        let db = Database::open_in_memory().unwrap();
        let id = db.insert_draft("wip", None, true, false, true).unwrap();

        let row = db.get_draft(id).unwrap().unwrap();
        assert_eq!(row.content, "wip");
        assert!(row.share_telegram);
        assert!(!row.share_bluesky);

        assert!(db.update_draft(id, "edited", None, false, false, false).unwrap());
        let row = db.get_draft(id).unwrap().unwrap();
        assert_eq!(row.content, "edited");
        assert!(!row.share_telegram);

        assert!(db.delete_draft(id).unwrap());
        assert!(db.get_draft(id).unwrap().is_none());
        assert!(!db.update_draft(id, "gone", None, true, true, true).unwrap());
    }

    #[test]
    fn drafts_listed_newest_first() {
        let db = Database::open_in_memory().unwrap();
        db.insert_draft("one", None, true, true, true).unwrap();
        let b = db.insert_draft("two", None, true, true, true).unwrap();
        let rows = db.list_drafts().unwrap();
        assert_eq!(rows.len(), 2);
        // Equal updated_at inside one second; id breaks the tie.
        assert_eq!(rows[0].id, b);
    }
}
