//! Server-rendered HTML pages: timeline, posts, topics, search, the admin
//! compose UI, and the sitemap/RSS feeds.
//!
//! Rendering uses maud (all dynamic content is escaped by construction);
//! responses carry ETag and tiered Cache-Control headers, fronted by an
//! in-process page cache.

pub mod error;
pub mod render;
pub mod routes;
pub mod state;

pub use routes::router;
pub use state::WebState;
