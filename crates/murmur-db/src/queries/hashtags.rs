use anyhow::Result;

use crate::Database;
use murmur_types::models::Hashtag;

impl Database {
    /// Hashtags by descending post count. Tags that dropped to zero stay
    /// in the table and the listing.
    pub fn list_hashtags(&self, limit: u32) -> Result<Vec<Hashtag>> {
        self.with_conn(|conn| {
            let rows = conn
                .prepare(
                    "SELECT tag, post_count FROM hashtags
                     ORDER BY post_count DESC, tag ASC
                     LIMIT ?1",
                )?
                .query_map([limit], |row| {
                    Ok(Hashtag {
                        tag: row.get(0)?,
                        post_count: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn posts_for_hashtag(&self, tag: &str, limit: u32) -> Result<Vec<i64>> {
        self.with_conn(|conn| {
            let rows = conn
                .prepare(
                    "SELECT ph.post_id FROM post_hashtags ph
                     JOIN hashtags h ON ph.hashtag_id = h.id
                     JOIN posts p ON ph.post_id = p.id
                     WHERE h.tag = ?1 AND p.status = 'public'
                     ORDER BY p.created_at DESC, p.id DESC
                     LIMIT ?2",
                )?
                .query_map(rusqlite::params![tag, limit], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::Database;

    #[test]
    fn posts_resolvable_by_hashtag() {
        let db = Database::open_in_memory().unwrap();
        let tags = vec!["til".to_string()];
        let a = db.create_post("#til one", "p", "a", "public", None, "{}", &tags).unwrap();
        let b = db.create_post("#til two", "p", "b", "public", None, "{}", &tags).unwrap();

        let ids = db.posts_for_hashtag("til", 10).unwrap();
        assert_eq!(ids, vec![b, a]);
        assert!(db.posts_for_hashtag("nope", 10).unwrap().is_empty());
    }
}
