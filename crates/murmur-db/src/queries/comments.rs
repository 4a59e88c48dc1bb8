use anyhow::Result;

use crate::Database;
use crate::models::CommentRow;

fn map_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        post_id: row.get(1)?,
        author: row.get(2)?,
        email: row.get(3)?,
        content: row.get(4)?,
        pinned: row.get::<_, i64>(5)? != 0,
        created_at: row.get(6)?,
    })
}

impl Database {
    pub fn insert_comment(
        &self,
        post_id: i64,
        author: &str,
        email: Option<&str>,
        content: &str,
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO comments (post_id, author, email, content)
                 VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![post_id, author, email, content],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    /// Comments for a post, pinned first, then oldest first.
    pub fn list_comments(&self, post_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let rows = conn
                .prepare(
                    "SELECT id, post_id, author, email, content, pinned, created_at
                     FROM comments
                     WHERE post_id = ?1
                     ORDER BY pinned DESC, created_at ASC, id ASC",
                )?
                .query_map([post_id], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn set_comment_pinned(&self, id: i64, pinned: bool) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute(
                "UPDATE comments SET pinned = ?1 WHERE id = ?2",
                rusqlite::params![pinned as i64, id],
            )?;
            Ok(n > 0)
        })
    }

    pub fn delete_comment(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let n = conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            Ok(n > 0)
        })
    }

    pub fn count_comments(&self, post_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM comments WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )?)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn db_with_post() -> (Database, i64) {
        let db = Database::open_in_memory().unwrap();
        let id = db
            .create_post("hi", "hi", "hi", "public", None, "{}", &[])
            .unwrap();
        (db, id)
    }

    #[test]
    fn pinned_comments_listed_first() {
        let (db, post) = db_with_post();
        db.insert_comment(post, "alice", None, "first").unwrap();
        let second = db.insert_comment(post, "bob", Some("b@example.com"), "second").unwrap();
        db.set_comment_pinned(second, true).unwrap();

        let rows = db.list_comments(post).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].author, "bob");
        assert!(rows[0].pinned);
        assert_eq!(db.count_comments(post).unwrap(), 2);
    }

    #[test]
    fn delete_missing_comment_is_false() {
        let (db, post) = db_with_post();
        let id = db.insert_comment(post, "alice", None, "hello").unwrap();
        assert!(db.delete_comment(id).unwrap());
        assert!(!db.delete_comment(id).unwrap());
    }

    #[test]
    fn comments_cascade_with_post() {
        let (db, post) = db_with_post();
        db.insert_comment(post, "alice", None, "hello").unwrap();
        db.delete_post(post).unwrap();
        assert_eq!(db.count_comments(post).unwrap(), 0);
    }
}
