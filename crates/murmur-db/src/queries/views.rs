use anyhow::Result;

use crate::{Database, OptionalExt};

impl Database {
    /// Increment a post's view counter, returning the new total.
    pub fn increment_views(&self, post_id: i64) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO post_views (post_id, count) VALUES (?1, 1)
                 ON CONFLICT(post_id) DO UPDATE SET count = count + 1",
                [post_id],
            )?;
            let count: i64 = conn.query_row(
                "SELECT count FROM post_views WHERE post_id = ?1",
                [post_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    pub fn get_views(&self, post_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            let count: Option<i64> = conn
                .query_row(
                    "SELECT count FROM post_views WHERE post_id = ?1",
                    [post_id],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(count.unwrap_or(0))
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn views_count_from_zero() {
        let db = Database::open_in_memory().unwrap();
        let post = db.create_post("x", "x", "x", "public", None, "{}", &[]).unwrap();
        assert_eq!(db.get_views(post).unwrap(), 0);
        assert_eq!(db.increment_views(post).unwrap(), 1);
        assert_eq!(db.increment_views(post).unwrap(), 2);
        assert_eq!(db.get_views(post).unwrap(), 2);
    }
}
