//! Timeline, topic, and search result pages.

use maud::{Markup, html};

use murmur_types::models::{Post, Topic};

use super::components::{OpenGraphData, page_shell, post_card, subscribe_box};

pub struct TimelinePage<'a> {
    pub posts: &'a [Post],
    pub page: u32,
    pub has_next: bool,
    pub topic: Option<&'a Topic>,
    pub base_url: &'a str,
    pub site_name: &'a str,
}

pub fn render(p: &TimelinePage<'_>) -> Markup {
    let (title, canonical, description) = match p.topic {
        Some(topic) => (
            format!("{} \u{2014} {}", topic.name, p.site_name),
            format!("{}/t/{}", p.base_url, topic.slug),
            format!("Posts on {}", topic.name),
        ),
        None => (
            p.site_name.to_string(),
            p.base_url.to_string(),
            format!("{} \u{2014} a personal microblog", p.site_name),
        ),
    };

    let path = match p.topic {
        Some(topic) => format!("/t/{}", topic.slug),
        None => "/".to_string(),
    };

    let body = html! {
        @if let Some(topic) = p.topic {
            p class="notice" { "Topic: " (topic.name) " \u{00b7} " (topic.post_count) " posts" }
        }

        @if p.posts.is_empty() {
            p class="notice" { "Nothing here yet." }
        }
        @for post in p.posts {
            (post_card(post, false))
        }

        nav class="pagination" {
            @if p.page > 1 {
                a href=(format!("{path}?page={}", p.page - 1)) { "\u{2190} newer" }
            } @else {
                span {}
            }
            @if p.has_next {
                a href=(format!("{path}?page={}", p.page + 1)) { "older \u{2192}" }
            } @else {
                span {}
            }
        }

        @if p.topic.is_none() {
            (subscribe_box())
        }
    };

    let og = OpenGraphData {
        title: &title,
        description: &description,
        og_type: "website",
    };
    page_shell(&title, og, &canonical, p.site_name, body)
}

pub fn render_search(
    query: &str,
    posts: &[Post],
    base_url: &str,
    site_name: &str,
) -> Markup {
    let title = if query.is_empty() {
        format!("Search \u{2014} {site_name}")
    } else {
        format!("Search: {query} \u{2014} {site_name}")
    };
    let canonical = format!("{base_url}/search");

    let body = html! {
        form class="search-form" method="get" action="/search" {
            input type="search" name="q" value=(query) placeholder="search posts\u{2026}";
            button type="submit" { "Search" }
        }

        @if !query.is_empty() {
            @if posts.is_empty() {
                p class="notice" { "No posts matching \u{201c}" (query) "\u{201d}." }
            } @else {
                p class="notice" { (posts.len()) " result" @if posts.len() != 1 { "s" } }
            }
        }
        @for post in posts {
            (post_card(post, false))
        }
    };

    let og = OpenGraphData {
        title: &title,
        description: "Search posts",
        og_type: "website",
    };
    page_shell(&title, og, &canonical, site_name, body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
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
            created_at: Utc::now(),
        }
    }

    #[test]
    fn timeline_paginates() {
        let posts = vec![post(1, "one"), post(2, "two")];
        let page = TimelinePage {
            posts: &posts,
            page: 2,
            has_next: true,
            topic: None,
            base_url: "https://b.example",
            site_name: "Murmur",
        };
        let html = render(&page).into_string();
        assert!(html.contains("/?page=1"));
        assert!(html.contains("/?page=3"));
        assert!(html.contains("one"));
    }

    #[test]
    fn first_page_has_no_newer_link() {
        let posts = vec![post(1, "one")];
        let page = TimelinePage {
            posts: &posts,
            page: 1,
            has_next: false,
            topic: None,
            base_url: "https://b.example",
            site_name: "Murmur",
        };
        let html = render(&page).into_string();
        assert!(!html.contains("newer"));
        assert!(!html.contains("older"));
    }

    #[test]
    fn search_escapes_query() {
        let html = render_search("<script>", &[], "https://b.example", "Murmur").into_string();
        assert!(!html.contains("<script>"));
        assert!(html.contains("&lt;script&gt;"));
    }
}
