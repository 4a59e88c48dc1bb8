//! Single post page: content, reactions, prev/next navigation, comments.

use maud::{Markup, PreEscaped, html};

use murmur_types::models::{Comment, Post};
use murmur_types::text::truncate;

use super::components::{
    OpenGraphData, page_shell, post_card, reaction_bar, timestamp,
};

pub struct PostPage<'a> {
    pub post: &'a Post,
    pub prev: Option<&'a Post>,
    pub next: Option<&'a Post>,
    pub comments: &'a [Comment],
    pub reaction_counts: &'a [(String, i64)],
    pub your_reaction: Option<&'a str>,
    pub views: i64,
    pub base_url: &'a str,
    pub site_name: &'a str,
}

pub fn render(p: &PostPage<'_>) -> Markup {
    let title = format!("{} \u{2014} {}", p.post.preview_text, p.site_name);
    let canonical = format!("{}/p/{}", p.base_url, p.post.id);

    let body = html! {
        (post_card(p.post, true))

        div class="post-meta" {
            span { (p.views) " views" }
        }

        (reaction_bar(p.post.id, p.reaction_counts, p.your_reaction))

        nav class="post-nav" {
            @if let Some(next) = p.next {
                a href=(format!("/p/{}", next.id)) {
                    "\u{2190} " (truncate(&next.preview_text, 30))
                }
            } @else { span {} }
            @if let Some(prev) = p.prev {
                a href=(format!("/p/{}", prev.id)) {
                    (truncate(&prev.preview_text, 30)) " \u{2192}"
                }
            } @else { span {} }
        }

        section class="comments" {
            h2 { (p.comments.len()) " comment" @if p.comments.len() != 1 { "s" } }

            @for comment in p.comments {
                div class="comment" {
                    span class="comment-author" {
                        (comment.author)
                        @if comment.pinned { span class="pin" { "\u{1F4CC} pinned" } }
                    }
                    span class="comment-time" { (timestamp(comment.created_at)) }
                    div class="comment-body" { (comment.content) }
                }
            }

            form class="stack" onsubmit=(comment_submit_js(p.post.id)) {
                input type="text" id="c-author" placeholder="name" required maxlength="80";
                textarea id="c-content" placeholder="say something\u{2026}" required {}
                button type="submit" { "Comment" }
                p class="notice" id="c-status" {}
            }
        }

        // View counter ping; fire-and-forget.
        script { (PreEscaped(format!(
            "fetch('/api/views/{}',{{method:'POST'}}).catch(()=>{{}});",
            p.post.id
        ))) }
    };

    let og = OpenGraphData {
        title: &p.post.preview_text,
        description: &truncate(&p.post.content, 200),
        og_type: "article",
    };
    page_shell(&title, og, &canonical, p.site_name, body)
}

fn comment_submit_js(post_id: i64) -> String {
    format!(
        "event.preventDefault();\
         fetch('/api/comments',{{method:'POST',headers:{{'Content-Type':'application/json'}},\
         body:JSON.stringify({{post_id:{post_id},author:document.getElementById('c-author').value,\
         content:document.getElementById('c-content').value}})}})\
         .then(r=>r.ok?location.reload():r.json().then(d=>{{\
         document.getElementById('c-status').textContent=d.error;}}));"
    )
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

    fn comment(author: &str, pinned: bool) -> Comment {
        Comment {
            id: 1,
            post_id: 1,
            author: author.to_string(),
            content: "nice".to_string(),
            pinned,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn post_page_renders_navigation_and_comments() {
        let current = post(2, "current post");
        let older = post(1, "older post");
        let newer = post(3, "newer post");
        let comments = vec![comment("alice", true)];
        let counts = vec![("like".to_string(), 1)];

        let page = PostPage {
            post: &current,
            prev: Some(&older),
            next: Some(&newer),
            comments: &comments,
            reaction_counts: &counts,
            your_reaction: None,
            views: 12,
            base_url: "https://b.example",
            site_name: "Murmur",
        };
        let html = render(&page).into_string();

        assert!(html.contains("/p/1"));
        assert!(html.contains("/p/3"));
        assert!(html.contains("1 comment"));
        assert!(html.contains("alice"));
        assert!(html.contains("pinned"));
        assert!(html.contains("12 views"));
        assert!(html.contains("/api/views/2"));
    }

    #[test]
    fn comment_author_is_escaped() {
        let current = post(1, "x");
        let comments = vec![comment("<img onerror=x>", false)];
        let page = PostPage {
            post: &current,
            prev: None,
            next: None,
            comments: &comments,
            reaction_counts: &[],
            your_reaction: None,
            views: 0,
            base_url: "https://b.example",
            site_name: "Murmur",
        };
        let html = render(&page).into_string();
        assert!(!html.contains("<img onerror"));
        assert!(html.contains("&lt;img"));
    }
}
