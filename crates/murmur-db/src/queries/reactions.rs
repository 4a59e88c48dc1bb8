use anyhow::Result;

use crate::{Database, OptionalExt};

impl Database {
    /// Toggle a reaction for a (post, cookie) pair.
    ///
    /// Same reaction again removes the row; a different reaction replaces
    /// the existing row; no row inserts one. Returns the reaction in effect
    /// afterwards (None when removed).
    pub fn toggle_reaction(
        &self,
        post_id: i64,
        cookie_id: &str,
        reaction: &str,
    ) -> Result<Option<String>> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;

            let existing: Option<String> = tx
                .query_row(
                    "SELECT reaction FROM reactions WHERE post_id = ?1 AND cookie_id = ?2",
                    rusqlite::params![post_id, cookie_id],
                    |row| row.get(0),
                )
                .optional()?;

            let result = match existing.as_deref() {
                Some(current) if current == reaction => {
                    tx.execute(
                        "DELETE FROM reactions WHERE post_id = ?1 AND cookie_id = ?2",
                        rusqlite::params![post_id, cookie_id],
                    )?;
                    None
                }
                Some(_) => {
                    tx.execute(
                        "UPDATE reactions SET reaction = ?1, created_at = datetime('now')
                         WHERE post_id = ?2 AND cookie_id = ?3",
                        rusqlite::params![reaction, post_id, cookie_id],
                    )?;
                    Some(reaction.to_string())
                }
                None => {
                    tx.execute(
                        "INSERT INTO reactions (post_id, reaction, cookie_id)
                         VALUES (?1, ?2, ?3)",
                        rusqlite::params![post_id, reaction, cookie_id],
                    )?;
                    Some(reaction.to_string())
                }
            };

            tx.commit()?;
            Ok(result)
        })
    }

    /// Count rows per reaction name for a post.
    pub fn reaction_counts(&self, post_id: i64) -> Result<Vec<(String, i64)>> {
        self.with_conn(|conn| {
            let rows = conn
                .prepare(
                    "SELECT reaction, COUNT(*) FROM reactions
                     WHERE post_id = ?1 GROUP BY reaction",
                )?
                .query_map([post_id], |row| Ok((row.get(0)?, row.get(1)?)))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn your_reaction(&self, post_id: i64, cookie_id: &str) -> Result<Option<String>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT reaction FROM reactions WHERE post_id = ?1 AND cookie_id = ?2",
                rusqlite::params![post_id, cookie_id],
                |row| row.get(0),
            )
            .optional()
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
    fn toggle_twice_nets_to_nothing() {
        let (db, post) = db_with_post();
        assert_eq!(db.toggle_reaction(post, "c1", "like").unwrap(), Some("like".into()));
        assert_eq!(db.toggle_reaction(post, "c1", "like").unwrap(), None);
        assert!(db.reaction_counts(post).unwrap().is_empty());
    }

    #[test]
    fn different_reaction_replaces_not_adds() {
        let (db, post) = db_with_post();
        db.toggle_reaction(post, "c1", "like").unwrap();
        assert_eq!(db.toggle_reaction(post, "c1", "fire").unwrap(), Some("fire".into()));

        let counts = db.reaction_counts(post).unwrap();
        assert_eq!(counts, vec![("fire".to_string(), 1)]);
        assert_eq!(db.your_reaction(post, "c1").unwrap(), Some("fire".into()));
    }

    #[test]
    fn counts_are_per_cookie() {
        let (db, post) = db_with_post();
        db.toggle_reaction(post, "c1", "like").unwrap();
        db.toggle_reaction(post, "c2", "like").unwrap();
        db.toggle_reaction(post, "c3", "heart").unwrap();

        let mut counts = db.reaction_counts(post).unwrap();
        counts.sort();
        assert_eq!(
            counts,
            vec![("heart".to_string(), 1), ("like".to_string(), 2)]
        );
    }
}
