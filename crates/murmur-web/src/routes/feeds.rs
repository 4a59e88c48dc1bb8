//! RSS 2.0 feed and XML sitemap, assembled as plain XML strings.

use axum::extract::State;
use axum::http::{HeaderValue, header};
use axum::response::{IntoResponse, Response};

use crate::error::PageError;
use crate::state::WebState;
use murmur_types::models::Post;

/// Posts included in the RSS feed.
const FEED_SIZE: u32 = 20;

/// Posts included in the sitemap.
const SITEMAP_SIZE: u32 = 5_000;

pub(crate) fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

fn xml_response(body: String, content_type: &'static str) -> Response {
    let mut response = body.into_response();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static(content_type),
    );
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("public, max-age=300"),
    );
    response
}

pub(crate) fn render_rss(posts: &[Post], base_url: &str, site_name: &str) -> String {
    let mut xml = String::with_capacity(4096);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<rss version=\"2.0\"><channel>\n");
    xml.push_str(&format!("<title>{}</title>\n", xml_escape(site_name)));
    xml.push_str(&format!("<link>{}</link>\n", xml_escape(base_url)));
    xml.push_str(&format!(
        "<description>{} \u{2014} a personal microblog</description>\n",
        xml_escape(site_name)
    ));

    for post in posts {
        let link = format!("{base_url}/p/{}", post.id);
        xml.push_str("<item>\n");
        xml.push_str(&format!("<title>{}</title>\n", xml_escape(&post.preview_text)));
        xml.push_str(&format!("<link>{}</link>\n", xml_escape(&link)));
        xml.push_str(&format!("<guid isPermaLink=\"true\">{}</guid>\n", xml_escape(&link)));
        xml.push_str(&format!(
            "<pubDate>{}</pubDate>\n",
            post.created_at.to_rfc2822()
        ));
        xml.push_str(&format!(
            "<description>{}</description>\n",
            xml_escape(&post.content)
        ));
        xml.push_str("</item>\n");
    }

    xml.push_str("</channel></rss>\n");
    xml
}

pub async fn rss(State(state): State<WebState>) -> Result<Response, PageError> {
    let posts: Vec<_> = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || state.app.db.list_public_posts(FEED_SIZE, 0)).await??
    }
    .into_iter()
    .map(|row| row.into_post())
    .collect();

    let xml = render_rss(&posts, &state.app.config.base_url, &state.app.config.site_name);
    Ok(xml_response(xml, "application/rss+xml; charset=utf-8"))
}

pub async fn sitemap(State(state): State<WebState>) -> Result<Response, PageError> {
    let (posts, topics) = {
        let state = state.clone();
        tokio::task::spawn_blocking(move || {
            let posts = state.app.db.list_public_posts(SITEMAP_SIZE, 0)?;
            let topics = state.app.db.list_topics()?;
            Ok::<_, anyhow::Error>((posts, topics))
        })
        .await??
    };

    let base = &state.app.config.base_url;
    let mut xml = String::with_capacity(2048);
    xml.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    xml.push_str("<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n");
    xml.push_str(&format!("<url><loc>{}</loc></url>\n", xml_escape(base)));
    for topic in &topics {
        xml.push_str(&format!(
            "<url><loc>{base}/t/{}</loc></url>\n",
            xml_escape(&topic.slug)
        ));
    }
    for post in &posts {
        xml.push_str(&format!("<url><loc>{base}/p/{}</loc></url>\n", post.id));
    }
    xml.push_str("</urlset>\n");

    Ok(xml_response(xml, "application/xml; charset=utf-8"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use murmur_types::models::PostStatus;

    fn post(id: i64, content: &str) -> Post {
        Post {
            id,
            content: content.to_string(),
            preview_text: content.to_string(),
            slug: format!("p{id}"),
            status: PostStatus::Public,
            topic_id: None,
            topic_slug: None,
            metadata: serde_json::json!({}),
            digest_sent_at: None,
            created_at: Utc.with_ymd_and_hms(2025, 2, 3, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn xml_escape_covers_specials() {
        assert_eq!(xml_escape(r#"<a & "b">"#), "&lt;a &amp; &quot;b&quot;&gt;");
    }

    #[test]
    fn rss_contains_items_and_escapes() {
        let posts = vec![post(1, "tools & toys")];
        let xml = render_rss(&posts, "https://b.example", "Murmur");
        assert!(xml.contains("<rss version=\"2.0\">"));
        assert!(xml.contains("tools &amp; toys"));
        assert!(xml.contains("https://b.example/p/1"));
        assert!(xml.contains("<pubDate>"));
    }
}
