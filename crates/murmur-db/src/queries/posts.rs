use anyhow::Result;
use rusqlite::Connection;

use crate::models::PostRow;
use crate::{Database, OptionalExt};

const POST_COLUMNS: &str = "p.id, p.content, p.preview_text, p.slug, p.status, p.topic_id, \
     t.slug, p.metadata, p.digest_sent_at, p.created_at";

fn map_post_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<PostRow> {
    Ok(PostRow {
        id: row.get(0)?,
        content: row.get(1)?,
        preview_text: row.get(2)?,
        slug: row.get(3)?,
        status: row.get(4)?,
        topic_id: row.get(5)?,
        topic_slug: row.get(6)?,
        metadata: row.get(7)?,
        digest_sent_at: row.get(8)?,
        created_at: row.get(9)?,
    })
}

/// Escape LIKE wildcards so user input matches literally.
fn escape_like(q: &str) -> String {
    q.replace('\\', "\\\\").replace('%', "\\%").replace('_', "\\_")
}

impl Database {
    /// Insert a post and link its hashtags in one transaction, maintaining
    /// the denormalized hashtags.post_count.
    pub fn create_post(
        &self,
        content: &str,
        preview_text: &str,
        slug: &str,
        status: &str,
        topic_id: Option<i64>,
        metadata: &str,
        tags: &[String],
    ) -> Result<i64> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO posts (content, preview_text, slug, status, topic_id, metadata)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                rusqlite::params![content, preview_text, slug, status, topic_id, metadata],
            )?;
            let post_id = tx.last_insert_rowid();
            link_hashtags(&tx, post_id, tags)?;
            tx.execute(
                "INSERT INTO activity_log (action, detail) VALUES ('publish', ?1)",
                [&slug],
            )?;
            tx.commit()?;
            Ok(post_id)
        })
    }

    pub fn slug_exists(&self, slug: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let n: i64 = conn.query_row(
                "SELECT COUNT(*) FROM posts WHERE slug = ?1",
                [slug],
                |row| row.get(0),
            )?;
            Ok(n > 0)
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM posts p
                 LEFT JOIN topics t ON p.topic_id = t.id
                 WHERE p.id = ?1"
            );
            conn.prepare(&sql)?.query_row([id], map_post_row).optional()
        })
    }

    pub fn list_public_posts(&self, limit: u32, offset: u32) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM posts p
                 LEFT JOIN topics t ON p.topic_id = t.id
                 WHERE p.status = 'public'
                 ORDER BY p.created_at DESC, p.id DESC
                 LIMIT ?1 OFFSET ?2"
            );
            let rows = conn
                .prepare(&sql)?
                .query_map(rusqlite::params![limit, offset], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn count_public_posts(&self) -> Result<i64> {
        self.with_conn(|conn| {
            Ok(conn.query_row(
                "SELECT COUNT(*) FROM posts WHERE status = 'public'",
                [],
                |row| row.get(0),
            )?)
        })
    }

    pub fn list_posts_by_topic(&self, topic_id: i64, limit: u32, offset: u32) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM posts p
                 LEFT JOIN topics t ON p.topic_id = t.id
                 WHERE p.status = 'public' AND p.topic_id = ?1
                 ORDER BY p.created_at DESC, p.id DESC
                 LIMIT ?2 OFFSET ?3"
            );
            let rows = conn
                .prepare(&sql)?
                .query_map(rusqlite::params![topic_id, limit, offset], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn search_posts(&self, query: &str, limit: u32) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let pattern = format!("%{}%", escape_like(query));
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM posts p
                 LEFT JOIN topics t ON p.topic_id = t.id
                 WHERE p.status = 'public' AND p.content LIKE ?1 ESCAPE '\\'
                 ORDER BY p.created_at DESC, p.id DESC
                 LIMIT ?2"
            );
            let rows = conn
                .prepare(&sql)?
                .query_map(rusqlite::params![pattern, limit], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Chronological neighbors of a post: (previous = older, next = newer).
    pub fn post_neighbors(&self, post: &PostRow) -> Result<(Option<PostRow>, Option<PostRow>)> {
        self.with_conn(|conn| {
            let prev_sql = format!(
                "SELECT {POST_COLUMNS} FROM posts p
                 LEFT JOIN topics t ON p.topic_id = t.id
                 WHERE p.status = 'public'
                   AND (p.created_at < ?1 OR (p.created_at = ?1 AND p.id < ?2))
                 ORDER BY p.created_at DESC, p.id DESC
                 LIMIT 1"
            );
            let next_sql = format!(
                "SELECT {POST_COLUMNS} FROM posts p
                 LEFT JOIN topics t ON p.topic_id = t.id
                 WHERE p.status = 'public'
                   AND (p.created_at > ?1 OR (p.created_at = ?1 AND p.id > ?2))
                 ORDER BY p.created_at ASC, p.id ASC
                 LIMIT 1"
            );
            let params = rusqlite::params![post.created_at, post.id];
            let prev = conn.prepare(&prev_sql)?.query_row(params, map_post_row).optional()?;
            let next = conn.prepare(&next_sql)?.query_row(params, map_post_row).optional()?;
            Ok((prev, next))
        })
    }

    /// Public posts not yet included in any digest, created at or after `since`.
    pub fn list_digest_candidates(&self, since: &str) -> Result<Vec<PostRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {POST_COLUMNS} FROM posts p
                 LEFT JOIN topics t ON p.topic_id = t.id
                 WHERE p.status = 'public'
                   AND p.digest_sent_at IS NULL
                   AND p.created_at >= ?1
                 ORDER BY p.created_at ASC, p.id ASC"
            );
            let rows = conn
                .prepare(&sql)?
                .query_map([since], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn mark_digest_sent(&self, post_ids: &[i64]) -> Result<()> {
        if post_ids.is_empty() {
            return Ok(());
        }
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            for id in post_ids {
                tx.execute(
                    "UPDATE posts SET digest_sent_at = datetime('now') WHERE id = ?1",
                    [id],
                )?;
            }
            tx.commit()?;
            Ok(())
        })
    }

    /// Update a post's metadata JSON together with an audit entry.
    pub fn set_post_metadata(&self, id: i64, metadata: &str) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let changed = tx.execute(
                "UPDATE posts SET metadata = ?1 WHERE id = ?2",
                rusqlite::params![metadata, id],
            )?;
            if changed > 0 {
                tx.execute(
                    "INSERT INTO activity_log (action, detail) VALUES ('metadata', ?1)",
                    [id.to_string()],
                )?;
            }
            tx.commit()?;
            Ok(changed > 0)
        })
    }

    pub fn delete_post(&self, id: i64) -> Result<bool> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            unlink_hashtags(&tx, id)?;
            let changed = tx.execute("DELETE FROM posts WHERE id = ?1", [id])?;
            tx.commit()?;
            Ok(changed > 0)
        })
    }
}

/// Link a post to its hashtags inside an open transaction, incrementing
/// post_count only for newly created links.
pub(crate) fn link_hashtags(conn: &Connection, post_id: i64, tags: &[String]) -> Result<()> {
    for tag in tags {
        conn.execute("INSERT OR IGNORE INTO hashtags (tag) VALUES (?1)", [tag])?;
        let hashtag_id: i64 = conn.query_row(
            "SELECT id FROM hashtags WHERE tag = ?1",
            [tag],
            |row| row.get(0),
        )?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO post_hashtags (post_id, hashtag_id) VALUES (?1, ?2)",
            rusqlite::params![post_id, hashtag_id],
        )?;
        if inserted > 0 {
            conn.execute(
                "UPDATE hashtags SET post_count = post_count + 1 WHERE id = ?1",
                [hashtag_id],
            )?;
        }
    }
    Ok(())
}

/// Remove a post's hashtag links, decrementing post_count.
pub(crate) fn unlink_hashtags(conn: &Connection, post_id: i64) -> Result<()> {
    conn.execute(
        "UPDATE hashtags SET post_count = post_count - 1
         WHERE id IN (SELECT hashtag_id FROM post_hashtags WHERE post_id = ?1)",
        [post_id],
    )?;
    conn.execute("DELETE FROM post_hashtags WHERE post_id = ?1", [post_id])?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::Database;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    fn publish(db: &Database, content: &str, slug: &str) -> i64 {
        db.create_post(content, content, slug, "public", None, "{}", &[])
            .unwrap()
    }

    #[test]
    fn create_and_fetch_post() {
        let db = db();
        let id = publish(&db, "hello world", "hello-world");
        let row = db.get_post(id).unwrap().unwrap();
        assert_eq!(row.content, "hello world");
        assert_eq!(row.slug, "hello-world");
        assert_eq!(row.status, "public");
        assert!(row.topic_slug.is_none());
    }

    #[test]
    fn slug_exists_after_insert() {
        let db = db();
        assert!(!db.slug_exists("hello").unwrap());
        publish(&db, "hello", "hello");
        assert!(db.slug_exists("hello").unwrap());
    }

    #[test]
    fn listing_skips_drafts() {
        let db = db();
        publish(&db, "visible", "visible");
        db.create_post("hidden", "hidden", "hidden", "draft", None, "{}", &[])
            .unwrap();
        let rows = db.list_public_posts(10, 0).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].slug, "visible");
        assert_eq!(db.count_public_posts().unwrap(), 1);
    }

    #[test]
    fn search_matches_content_literally() {
        let db = db();
        publish(&db, "rust is 100% fun", "a");
        publish(&db, "nothing here", "b");
        let hits = db.search_posts("100%", 10).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].slug, "a");
    }

    #[test]
    fn neighbors_by_insertion_order() {
        let db = db();
        let first = publish(&db, "one", "one");
        let second = publish(&db, "two", "two");
        let third = publish(&db, "three", "three");

        let mid = db.get_post(second).unwrap().unwrap();
        let (prev, next) = db.post_neighbors(&mid).unwrap();
        assert_eq!(prev.unwrap().id, first);
        assert_eq!(next.unwrap().id, third);
    }

    #[test]
    fn digest_candidates_exclude_already_sent() {
        let db = db();
        let a = publish(&db, "one", "one");
        let b = publish(&db, "two", "two");
        db.mark_digest_sent(&[a]).unwrap();

        let pending = db.list_digest_candidates("2000-01-01 00:00:00").unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].id, b);
    }

    #[test]
    fn hashtag_counts_maintained() {
        let db = db();
        let tags = vec!["rust".to_string(), "blog".to_string()];
        let id = db
            .create_post("post #rust #blog", "p", "p", "public", None, "{}", &tags)
            .unwrap();
        db.create_post("more #rust", "q", "q", "public", None, "{}", &["rust".to_string()])
            .unwrap();

        let hashtags = db.list_hashtags(10).unwrap();
        let rust = hashtags.iter().find(|h| h.tag == "rust").unwrap();
        assert_eq!(rust.post_count, 2);

        db.delete_post(id).unwrap();
        let hashtags = db.list_hashtags(10).unwrap();
        let rust = hashtags.iter().find(|h| h.tag == "rust").unwrap();
        assert_eq!(rust.post_count, 1);
        let blog = hashtags.iter().find(|h| h.tag == "blog").unwrap();
        assert_eq!(blog.post_count, 0);
    }

    #[test]
    fn metadata_update_logs_activity() {
        let db = db();
        let id = publish(&db, "x", "x");
        assert!(db.set_post_metadata(id, "{\"lang\":\"en\"}").unwrap());
        assert!(!db.set_post_metadata(9999, "{}").unwrap());
        let row = db.get_post(id).unwrap().unwrap();
        assert_eq!(row.metadata, "{\"lang\":\"en\"}");
    }
}
