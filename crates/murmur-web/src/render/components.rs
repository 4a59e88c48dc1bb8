//! Shared HTML components used across all pages.

use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use maud::{Markup, PreEscaped, html};

use murmur_types::models::Post;
use murmur_types::reactions;

use super::content::render_content;

/// Inline CSS for all pages. Flat design, system fonts, dark-mode aware.
pub const PAGE_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
:root{--bg:#fcfcfa;--fg:#1a1a1a;--fg2:#555;--fg3:#999;--accent:#0b7285;--accent-hover:#095c6b;--border:#e3e3de;--surface:#fff;--mono:ui-monospace,SFMono-Regular,Menlo,monospace}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;line-height:1.65;color:var(--fg);background:var(--bg);min-height:100vh;display:flex;flex-direction:column;align-items:center;padding:1.5rem 1rem}
main{max-width:640px;width:100%;flex:1}
a{color:var(--accent);text-decoration:none}
a:hover{text-decoration:underline}
header.site{width:100%;max-width:640px;display:flex;align-items:baseline;justify-content:space-between;margin-bottom:1.5rem}
header.site h1{font-size:1.3rem;letter-spacing:-.01em}
header.site nav{display:flex;gap:1rem;font-size:.9rem}
.post-card{padding:1.1rem 0;border-bottom:1px solid var(--border)}
.post-content{white-space:pre-wrap;word-break:break-word;font-size:1.02rem}
.post-meta{display:flex;gap:.9rem;align-items:center;margin-top:.6rem;font-size:.8rem;color:var(--fg3)}
.post-meta a{color:var(--fg3)}
.post-meta a:hover{color:var(--accent)}
.topic-chip{background:var(--surface);border:1px solid var(--border);border-radius:100px;padding:.05rem .6rem}
.hashtag{color:var(--accent)}
.reactions{display:flex;gap:.5rem;margin-top:.8rem;flex-wrap:wrap}
.reaction-btn{border:1px solid var(--border);background:var(--surface);border-radius:100px;padding:.15rem .7rem;font-size:.9rem;cursor:pointer;color:var(--fg2)}
.reaction-btn:hover{border-color:var(--accent)}
.reaction-btn.active{border-color:var(--accent);color:var(--accent)}
.pagination{display:flex;justify-content:space-between;margin:1.5rem 0;font-size:.9rem}
.post-nav{display:flex;justify-content:space-between;gap:1rem;margin:1.5rem 0;font-size:.9rem}
.comments{margin-top:2rem}
.comments h2{font-size:1rem;margin-bottom:.8rem}
.comment{padding:.7rem 0;border-top:1px solid var(--border);font-size:.95rem}
.comment-author{font-weight:600;font-size:.85rem}
.comment-author .pin{color:var(--fg3);font-weight:400;font-size:.75rem;margin-left:.4rem}
.comment-time{color:var(--fg3);font-size:.75rem;margin-left:.5rem}
.comment-body{white-space:pre-wrap;word-break:break-word;margin-top:.2rem}
form.stack{display:flex;flex-direction:column;gap:.6rem;margin-top:1rem}
input,textarea,select{font:inherit;padding:.5rem .6rem;border:1px solid var(--border);border-radius:6px;background:var(--surface);color:var(--fg)}
textarea{min-height:7rem;resize:vertical}
button{font:inherit;padding:.45rem 1rem;border:none;border-radius:6px;background:var(--accent);color:#fff;cursor:pointer}
button:hover{background:var(--accent-hover)}
.subscribe{margin:2rem 0;padding:1rem;border:1px solid var(--border);border-radius:8px}
.subscribe p{font-size:.9rem;color:var(--fg2)}
.subscribe form{display:flex;gap:.5rem;margin-top:.6rem}
.subscribe input{flex:1}
.notice{font-size:.85rem;color:var(--fg3);margin:.8rem 0}
.search-form{display:flex;gap:.5rem;margin-bottom:1.5rem}
.search-form input{flex:1}
.drafts{margin-top:2rem}
.drafts h2{font-size:1rem;margin-bottom:.5rem}
.draft-row{display:flex;justify-content:space-between;gap:.8rem;padding:.5rem 0;border-top:1px solid var(--border);font-size:.9rem}
.share-flags{display:flex;gap:1rem;font-size:.85rem;color:var(--fg2)}
.footer{text-align:center;margin-top:2rem;padding-top:.75rem;font-size:.8rem;color:var(--fg3)}
@media(prefers-color-scheme:dark){
:root{--bg:#101014;--fg:#e7e7e2;--fg2:#a5a5a0;--fg3:#6b6b66;--accent:#4dabbd;--accent-hover:#63bccd;--border:#26262c;--surface:#17171c}
}
"#;

/// Inline CSS for error pages.
pub const ERROR_CSS: &str = r#"
*{margin:0;padding:0;box-sizing:border-box}
body{font-family:-apple-system,BlinkMacSystemFont,"Segoe UI",Roboto,sans-serif;display:flex;justify-content:center;align-items:center;min-height:100vh;background:#fcfcfa;color:#1a1a1a;padding:1rem}
.error-page{text-align:center;max-width:400px}
.error-page h1{font-size:1.5rem;margin-bottom:.75rem}
.error-page p{color:#666;margin-bottom:1rem;line-height:1.5}
.error-page a{color:#0b7285}
@media(prefers-color-scheme:dark){
body{background:#101014;color:#e7e7e2}
.error-page p{color:#aaa}
.error-page a{color:#4dabbd}
}
"#;

/// Content-Security-Policy for all pages. Inline styles and the small
/// inline scripts (reactions, comment form) are allowed; nothing external
/// executes.
pub const CSP_HEADER: &str = "default-src 'none'; style-src 'unsafe-inline'; script-src 'unsafe-inline'; img-src https: data:; connect-src 'self'; form-action 'self'; frame-ancestors 'none'";

/// Open Graph metadata for a page.
pub struct OpenGraphData<'a> {
    pub title: &'a str,
    pub description: &'a str,
    pub og_type: &'a str,
}

/// Render the full HTML page shell with head, OG tags, header nav, and
/// body content.
pub fn page_shell(
    title: &str,
    og: OpenGraphData<'_>,
    canonical_url: &str,
    site_name: &str,
    body_content: Markup,
) -> Markup {
    html! {
        (maud::DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (title) }
                meta name="description" content=(og.description);
                link rel="canonical" href=(canonical_url);
                link rel="alternate" type="application/rss+xml" title=(site_name) href="/rss";

                meta property="og:title" content=(og.title);
                meta property="og:description" content=(og.description);
                meta property="og:url" content=(canonical_url);
                meta property="og:site_name" content=(site_name);
                meta property="og:type" content=(og.og_type);

                meta name="twitter:card" content="summary";
                meta name="twitter:title" content=(og.title);
                meta name="twitter:description" content=(og.description);

                style { (PreEscaped(PAGE_CSS)) }
            }
            body {
                header class="site" {
                    h1 { a href="/" { (site_name) } }
                    nav {
                        a href="/search" { "search" }
                        a href="/rss" { "rss" }
                    }
                }
                main { (body_content) }
                footer class="footer" {
                    a href="/" { (site_name) }
                    " \u{00b7} "
                    a href="/sitemap.xml" { "sitemap" }
                }
            }
        }
    }
}

/// One post in a list or on its own page.
pub fn post_card(post: &Post, standalone: bool) -> Markup {
    html! {
        article class="post-card" {
            div class="post-content" { (render_content(&post.content)) }
            div class="post-meta" {
                @if standalone {
                    (timestamp(post.created_at))
                } @else {
                    a href=(format!("/p/{}", post.id)) { (timestamp(post.created_at)) }
                }
                @if let Some(topic_slug) = &post.topic_slug {
                    a class="topic-chip" href=(format!("/t/{topic_slug}")) { (topic_slug) }
                }
            }
        }
    }
}

/// Static reaction bar: counts per vocabulary entry plus a click handler
/// that posts the toggle and reloads.
pub fn reaction_bar(post_id: i64, counts: &[(String, i64)], yours: Option<&str>) -> Markup {
    html! {
        div class="reactions" {
            @for &name in reactions::VOCABULARY {
                @let count = counts.iter().find(|(n, _)| n == name).map(|(_, c)| *c).unwrap_or(0);
                @let cls = if yours == Some(name) { "reaction-btn active" } else { "reaction-btn" };
                button
                    class=(cls)
                    onclick=(format!(
                        "fetch('/api/reactions/{post_id}',{{method:'POST',headers:{{'Content-Type':'application/json'}},body:JSON.stringify({{reaction:'{name}'}})}}).then(()=>location.reload())"
                    ))
                {
                    (reactions::emoji(name)) " " (count)
                }
            }
        }
    }
}

/// Timestamp element: "Mon DD, YYYY HH:MM".
pub fn timestamp(ts: chrono::DateTime<chrono::Utc>) -> Markup {
    let display = ts.format("%b %d, %Y %H:%M").to_string();
    let iso = ts.format("%Y-%m-%dT%H:%M:%SZ").to_string();
    html! {
        time datetime=(iso) { (display) }
    }
}

/// Newsletter signup box shown under the timeline.
pub fn subscribe_box() -> Markup {
    html! {
        div class="subscribe" {
            p { "Get new posts by email \u{2014} instantly, or as a daily or weekly digest." }
            form onsubmit="subscribeSubmit(event)" {
                input type="email" id="sub-email" placeholder="you@example.com" required;
                select id="sub-pref" {
                    option value="instant" { "every post" }
                    option value="daily" { "daily" }
                    option value="weekly" { "weekly" }
                }
                button type="submit" { "Subscribe" }
            }
            p class="notice" id="sub-status" {}
        }
        script { (PreEscaped(r#"
function subscribeSubmit(e){e.preventDefault();
 fetch('/api/subscribe',{method:'POST',headers:{'Content-Type':'application/json'},
  body:JSON.stringify({email:document.getElementById('sub-email').value,
   preference:document.getElementById('sub-pref').value})})
 .then(r=>r.json()).then(d=>{
  document.getElementById('sub-status').textContent =
   d.error ? d.error : 'Check your inbox to confirm.';});}
"#)) }
    }
}

/// Build the final HTML response with security, ETag, and cache headers.
pub fn html_response(html: String, cache_control: &str) -> Response {
    let mut headers = HeaderMap::new();

    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    headers.insert(
        header::CONTENT_SECURITY_POLICY,
        HeaderValue::from_static(CSP_HEADER),
    );
    headers.insert(
        header::X_CONTENT_TYPE_OPTIONS,
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));

    // ETag (xxHash of content)
    let hash = xxhash_rust::xxh3::xxh3_64(html.as_bytes());
    let etag = format!("\"{}\"", hex_fmt::HexFmt(&hash.to_be_bytes()));
    if let Ok(val) = HeaderValue::from_str(&etag) {
        headers.insert(header::ETAG, val);
    }

    if let Ok(val) = HeaderValue::from_str(cache_control) {
        headers.insert(header::CACHE_CONTROL, val);
    }

    (StatusCode::OK, headers, html).into_response()
}

/// Cache-Control tiers per page kind.
pub mod cache_control {
    /// Timeline and topic listings: fresh-ish, CDN-cacheable.
    pub const LISTING: &str = "public, max-age=60, s-maxage=300, stale-while-revalidate=120";
    /// Single posts change rarely once published.
    pub const POST: &str = "public, max-age=60, s-maxage=3600, stale-while-revalidate=600";
    /// Search results and feeds.
    pub const SHORT: &str = "public, max-age=60";
    /// Admin pages are never cached.
    pub const NO_STORE: &str = "no-store";
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use murmur_types::models::PostStatus;

    fn post() -> Post {
        Post {
            id: 3,
            content: "hello #world".to_string(),
            preview_text: "hello #world".to_string(),
            slug: "hello-world".to_string(),
            status: PostStatus::Public,
            topic_id: Some(1),
            topic_slug: Some("notes".to_string()),
            metadata: serde_json::json!({}),
            digest_sent_at: None,
            created_at: Utc.with_ymd_and_hms(2025, 3, 1, 9, 30, 0).unwrap(),
        }
    }

    #[test]
    fn post_card_links_permalink_and_topic() {
        let html = post_card(&post(), false).into_string();
        assert!(html.contains("href=\"/p/3\""));
        assert!(html.contains("href=\"/t/notes\""));
        assert!(html.contains("Mar 01, 2025"));
    }

    #[test]
    fn standalone_card_has_no_self_link() {
        let html = post_card(&post(), true).into_string();
        assert!(!html.contains("href=\"/p/3\""));
    }

    #[test]
    fn reaction_bar_shows_counts_and_active() {
        let counts = vec![("like".to_string(), 4)];
        let html = reaction_bar(3, &counts, Some("like")).into_string();
        assert!(html.contains("4"));
        assert!(html.contains("reaction-btn active"));
        assert!(html.contains("/api/reactions/3"));
    }

    #[test]
    fn page_shell_includes_og_tags() {
        let og = OpenGraphData {
            title: "A Post",
            description: "preview here",
            og_type: "article",
        };
        let html = page_shell("A Post", og, "https://b.example/p/3", "Murmur", html! {}).into_string();
        assert!(html.contains("og:title"));
        assert!(html.contains("preview here"));
        assert!(html.contains("https://b.example/p/3"));
    }

    #[test]
    fn html_response_sets_etag_and_csp() {
        let resp = html_response("<html></html>".to_string(), cache_control::LISTING);
        let headers = resp.headers();
        assert!(headers.contains_key("etag"));
        assert!(headers.contains_key("content-security-policy"));
        assert_eq!(
            headers.get("cache-control").unwrap().to_str().unwrap(),
            cache_control::LISTING
        );
    }
}
