use anyhow::Result;

use crate::models::TopicRow;
use crate::{Database, OptionalExt};

fn map_topic(row: &rusqlite::Row<'_>) -> rusqlite::Result<TopicRow> {
    Ok(TopicRow {
        id: row.get(0)?,
        name: row.get(1)?,
        slug: row.get(2)?,
        post_count: row.get(3)?,
        created_at: row.get(4)?,
    })
}

const TOPIC_SELECT: &str = "SELECT t.id, t.name, t.slug,
        (SELECT COUNT(*) FROM posts p
          WHERE p.topic_id = t.id AND p.status = 'public'),
        t.created_at
     FROM topics t";

impl Database {
    pub fn create_topic(&self, name: &str, slug: &str) -> Result<i64> {
        self.with_conn_mut(|conn| {
            conn.execute(
                "INSERT INTO topics (name, slug) VALUES (?1, ?2)",
                rusqlite::params![name, slug],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_topics(&self) -> Result<Vec<TopicRow>> {
        self.with_conn(|conn| {
            let sql = format!("{TOPIC_SELECT} ORDER BY t.name ASC");
            let rows = conn
                .prepare(&sql)?
                .query_map([], map_topic)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn get_topic_by_slug(&self, slug: &str) -> Result<Option<TopicRow>> {
        self.with_conn(|conn| {
            let sql = format!("{TOPIC_SELECT} WHERE t.slug = ?1");
            conn.prepare(&sql)?.query_row([slug], map_topic).optional()
        })
    }

    pub fn get_topic(&self, id: i64) -> Result<Option<TopicRow>> {
        self.with_conn(|conn| {
            let sql = format!("{TOPIC_SELECT} WHERE t.id = ?1");
            conn.prepare(&sql)?.query_row([id], map_topic).optional()
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn topic_post_counts_only_public() {
        let db = Database::open_in_memory().unwrap();
        let topic = db.create_topic("Rust Notes", "rust-notes").unwrap();
        db.create_post("a", "a", "a", "public", Some(topic), "{}", &[]).unwrap();
        db.create_post("b", "b", "b", "draft", Some(topic), "{}", &[]).unwrap();

        let row = db.get_topic_by_slug("rust-notes").unwrap().unwrap();
        assert_eq!(row.post_count, 1);
        assert_eq!(row.name, "Rust Notes");

        let all = db.list_topics().unwrap();
        assert_eq!(all.len(), 1);
    }

    #[test]
    fn duplicate_topic_slug_rejected() {
        let db = Database::open_in_memory().unwrap();
        db.create_topic("One", "one").unwrap();
        assert!(db.create_topic("Other One", "one").is_err());
    }
}
