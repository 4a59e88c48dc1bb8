//! Static reaction vocabulary.
//!
//! Reactions are a fixed set baked into the binary. Anything outside the
//! vocabulary is rejected at the API boundary.

/// Allowed reaction names, in display order.
pub const VOCABULARY: &[&str] = &["like", "heart", "fire", "laugh", "think"];

/// Check whether a reaction name is part of the vocabulary.
pub fn is_valid(name: &str) -> bool {
    VOCABULARY.contains(&name)
}

/// Emoji shown next to a reaction name in rendered pages.
pub fn emoji(name: &str) -> &'static str {
    match name {
        "like" => "\u{1F44D}",
        "heart" => "\u{2764}\u{FE0F}",
        "fire" => "\u{1F525}",
        "laugh" => "\u{1F602}",
        "think" => "\u{1F914}",
        _ => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vocabulary_is_valid() {
        for name in VOCABULARY {
            assert!(is_valid(name));
            assert!(!emoji(name).is_empty());
        }
    }

    #[test]
    fn unknown_reaction_rejected() {
        assert!(!is_valid("clap"));
        assert!(!is_valid(""));
        assert!(!is_valid("LIKE"));
    }
}
