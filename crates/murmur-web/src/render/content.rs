//! Post body rendering: escape, then linkify URLs and hashtags.

use maud::{Markup, PreEscaped};
use regex::Regex;
use std::sync::OnceLock;

fn url_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r#"https?://[^\s<>"']+"#).expect("static regex"))
}

fn hashtag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"#(\w+)").expect("static regex"))
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn hashtagify(segment: &str) -> String {
    hashtag_regex()
        .replace_all(segment, |caps: &regex::Captures<'_>| {
            let tag = &caps[1];
            format!("<a class=\"hashtag\" href=\"/search?q=%23{tag}\">#{tag}</a>")
        })
        .into_owned()
}

/// Escape a post body and turn URLs and #hashtags into links. URL spans
/// are excluded from hashtag processing so fragment anchors survive.
pub fn render_content(content: &str) -> Markup {
    let escaped = escape_html(content);
    let mut out = String::with_capacity(escaped.len() + 64);
    let mut last = 0;

    for m in url_regex().find_iter(&escaped) {
        out.push_str(&hashtagify(&escaped[last..m.start()]));
        let url = m.as_str();
        out.push_str(&format!("<a href=\"{url}\" rel=\"noopener\">{url}</a>"));
        last = m.end();
    }
    out.push_str(&hashtagify(&escaped[last..]));

    PreEscaped(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup() {
        let html = render_content("<b>bold</b> & stuff").into_string();
        assert!(html.contains("&lt;b&gt;bold&lt;/b&gt; &amp; stuff"));
        assert!(!html.contains("<b>"));
    }

    #[test]
    fn links_urls() {
        let html = render_content("see https://example.com/page for more").into_string();
        assert!(html.contains("<a href=\"https://example.com/page\" rel=\"noopener\">"));
    }

    #[test]
    fn links_hashtags() {
        let html = render_content("shipping #rust today").into_string();
        assert!(html.contains("href=\"/search?q=%23rust\""));
        assert!(html.contains(">#rust</a>"));
    }

    #[test]
    fn url_fragments_are_not_hashtags() {
        let html = render_content("docs at https://example.com/page#section here").into_string();
        // The #section anchor stays inside the URL link untouched.
        assert!(html.contains("https://example.com/page#section"));
        assert!(!html.contains("q=%23section"));
    }

    #[test]
    fn plain_text_unchanged() {
        let html = render_content("just words").into_string();
        assert_eq!(html, "just words");
    }
}
