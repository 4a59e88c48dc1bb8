use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS topics (
            id          INTEGER PRIMARY KEY,
            name        TEXT NOT NULL,
            slug        TEXT NOT NULL UNIQUE,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS posts (
            id              INTEGER PRIMARY KEY,
            content         TEXT NOT NULL,
            preview_text    TEXT NOT NULL,
            slug            TEXT NOT NULL UNIQUE,
            status          TEXT NOT NULL DEFAULT 'public'
                            CHECK (status IN ('draft', 'public')),
            topic_id        INTEGER REFERENCES topics(id),
            metadata        TEXT NOT NULL DEFAULT '{}',
            digest_sent_at  TEXT,
            created_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_posts_status_created
            ON posts(status, created_at);
        CREATE INDEX IF NOT EXISTS idx_posts_topic
            ON posts(topic_id);

        CREATE TABLE IF NOT EXISTS drafts (
            id              INTEGER PRIMARY KEY,
            content         TEXT NOT NULL,
            topic_id        INTEGER REFERENCES topics(id),
            share_telegram  INTEGER NOT NULL DEFAULT 1,
            share_bluesky   INTEGER NOT NULL DEFAULT 1,
            share_email     INTEGER NOT NULL DEFAULT 1,
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS sessions (
            id          TEXT PRIMARY KEY,
            device_info TEXT,
            expires_at  TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS subscribers (
            id                  INTEGER PRIMARY KEY,
            email               TEXT NOT NULL UNIQUE,
            confirmed           INTEGER NOT NULL DEFAULT 0,
            confirmation_token  TEXT NOT NULL,
            unsubscribe_token   TEXT NOT NULL,
            preference          TEXT NOT NULL DEFAULT 'instant'
                                CHECK (preference IN ('instant', 'daily', 'weekly')),
            last_sent_at        TEXT,
            created_at          TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_subscribers_confirmation
            ON subscribers(confirmation_token);
        CREATE INDEX IF NOT EXISTS idx_subscribers_unsubscribe
            ON subscribers(unsubscribe_token);

        CREATE TABLE IF NOT EXISTS comments (
            id          INTEGER PRIMARY KEY,
            post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            author      TEXT NOT NULL,
            email       TEXT,
            content     TEXT NOT NULL,
            pinned      INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_post
            ON comments(post_id, pinned, created_at);

        CREATE TABLE IF NOT EXISTS reactions (
            id          INTEGER PRIMARY KEY,
            post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            reaction    TEXT NOT NULL,
            cookie_id   TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(post_id, cookie_id)
        );

        CREATE INDEX IF NOT EXISTS idx_reactions_post
            ON reactions(post_id);

        CREATE TABLE IF NOT EXISTS hashtags (
            id          INTEGER PRIMARY KEY,
            tag         TEXT NOT NULL UNIQUE,
            post_count  INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS post_hashtags (
            post_id     INTEGER NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            hashtag_id  INTEGER NOT NULL REFERENCES hashtags(id),
            PRIMARY KEY (post_id, hashtag_id)
        );

        CREATE TABLE IF NOT EXISTS email_deliveries (
            delivery_id     TEXT PRIMARY KEY,
            recipient_count INTEGER NOT NULL DEFAULT 0,
            sent_at         TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS post_views (
            post_id INTEGER PRIMARY KEY REFERENCES posts(id) ON DELETE CASCADE,
            count   INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS activity_log (
            id          INTEGER PRIMARY KEY,
            action      TEXT NOT NULL,
            detail      TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
