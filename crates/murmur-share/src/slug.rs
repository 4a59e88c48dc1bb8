//! URL slug derivation for posts.

use tracing::warn;

use crate::translate::{Translator, transliterate};
use murmur_types::text::preview_text;

/// Longest slug we will generate.
pub const SLUG_MAX_LEN: usize = 60;

/// Lowercase, ASCII-alphanumeric, hyphen-separated. Idempotent on input
/// that is already in that form.
pub fn slugify(input: &str) -> String {
    let mut slug = String::with_capacity(input.len());
    let mut last_hyphen = true; // suppress leading hyphen
    for ch in input.chars() {
        let lower = ch.to_ascii_lowercase();
        if lower.is_ascii_alphanumeric() {
            slug.push(lower);
            last_hyphen = false;
        } else if !last_hyphen {
            slug.push('-');
            last_hyphen = true;
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }

    if slug.len() > SLUG_MAX_LEN {
        // Cut on a hyphen when one is near the limit.
        let cut = slug[..SLUG_MAX_LEN]
            .rfind('-')
            .filter(|&idx| idx > SLUG_MAX_LEN / 2)
            .unwrap_or(SLUG_MAX_LEN);
        slug.truncate(cut);
    }
    slug
}

/// Derive a slug from post content. Non-ASCII (Cyrillic) content goes
/// through the translation API when available, otherwise through the
/// built-in transliteration table; the result is slugified.
pub async fn derive_slug(translator: Option<&Translator>, content: &str) -> String {
    let source = preview_text(content);
    let source = source.trim_end_matches('.').to_string();

    let latin = if source.is_ascii() {
        source
    } else {
        match translator {
            Some(t) => match t.translate(&source, "en").await {
                Ok(translated) => translated,
                Err(e) => {
                    warn!("Slug translation failed, transliterating: {}", e);
                    transliterate(&source)
                }
            },
            None => transliterate(&source),
        }
    };

    let slug = slugify(&latin);
    if slug.is_empty() { "post".to_string() } else { slug }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slugify_basic() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
    }

    #[test]
    fn slugify_idempotent_on_clean_input() {
        let clean = "already-clean-slug";
        assert_eq!(slugify(clean), clean);
        assert_eq!(slugify(&slugify(clean)), clean);
    }

    #[test]
    fn slugify_collapses_separator_runs() {
        assert_eq!(slugify("a  --  b"), "a-b");
        assert_eq!(slugify("...leading and trailing..."), "leading-and-trailing");
    }

    #[test]
    fn slugify_bounded_length() {
        let long = "word ".repeat(40);
        let slug = slugify(&long);
        assert!(slug.len() <= SLUG_MAX_LEN);
        assert!(!slug.ends_with('-'));
    }

    #[test]
    fn slugify_drops_non_ascii() {
        assert_eq!(slugify("caf\u{e9} life"), "caf-life");
    }

    #[tokio::test]
    async fn derive_slug_ascii_without_translator() {
        assert_eq!(derive_slug(None, "Hello World").await, "hello-world");
    }

    #[tokio::test]
    async fn derive_slug_transliterates_cyrillic() {
        assert_eq!(derive_slug(None, "привет мир").await, "privet-mir");
    }

    #[tokio::test]
    async fn derive_slug_never_empty() {
        assert_eq!(derive_slug(None, "!!!").await, "post");
    }
}
