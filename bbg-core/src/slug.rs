//! Slug generation and normalization.

use unicode_normalization::{char::is_combining_mark, UnicodeNormalization};

/// Convert a string to a URL-safe slug
///
/// Rules:
/// - Fold accented characters to their ASCII base ("café" becomes "cafe")
/// - Lowercase
/// - Split on every run of characters outside `[0-9A-Za-z-]`
/// - Trim hyphens from each piece and drop the empty ones
/// - Join the remaining pieces with `-`
///
/// Returns `None` when nothing URL-safe is left.
///
/// # Examples
///
/// ```
/// use bbg_core::slugify;
///
/// assert_eq!(slugify("Hello World").as_deref(), Some("hello-world"));
/// assert_eq!(slugify("Café au lait").as_deref(), Some("cafe-au-lait"));
/// assert_eq!(slugify("!@#$%^&*()"), None);
/// ```
pub fn slugify(input: &str) -> Option<String> {
    // Compatibility forms such as `ℌ` only become ASCII after decomposition,
    // so case folding has to come last.
    let folded: String = input
        .nfkd()
        .filter(|c| !is_combining_mark(*c))
        .collect();

    let segments: Vec<String> = folded
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '-'))
        .map(|segment| segment.trim_matches('-'))
        .filter(|segment| !segment.is_empty())
        .map(|segment| segment.to_ascii_lowercase())
        .collect();

    if segments.is_empty() {
        None
    } else {
        Some(segments.join("-"))
    }
}

/// Normalize a slug supplied by an author (ensure it's properly formatted)
pub fn normalize_slug(slug: &str) -> Option<String> {
    slugify(slug)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_basic_slugify() {
        assert_eq!(slugify("Hello World").as_deref(), Some("hello-world"));
        assert_eq!(slugify("Hello, World!").as_deref(), Some("hello-world"));
    }

    #[test]
    fn test_accents_are_folded() {
        assert_eq!(slugify("Café au lait").as_deref(), Some("cafe-au-lait"));
        assert_eq!(slugify("naïve Über").as_deref(), Some("naive-uber"));
    }

    #[test]
    fn test_compatibility_letters_are_lowercased() {
        assert_eq!(slugify("ℌello").as_deref(), Some("hello"));
        assert_eq!(slugify("ℍ𝐀𝐁 Ｆｕｌｌ").as_deref(), Some("hab-full"));
        assert_eq!(slugify("İstanbul").as_deref(), Some("istanbul"));

        let once = slugify("ℌello").unwrap();
        assert_eq!(slugify(&once), Some(once.clone()));
    }

    #[test]
    fn test_spaces_and_dashes() {
        assert_eq!(slugify("Hello  -  World").as_deref(), Some("hello-world"));
        assert_eq!(slugify("-Leading Hyphen").as_deref(), Some("leading-hyphen"));
        assert_eq!(slugify("Trailing Hyphen-").as_deref(), Some("trailing-hyphen"));
        assert_eq!(slugify("already-good").as_deref(), Some("already-good"));
    }

    #[test]
    fn test_underscores_split() {
        assert_eq!(slugify("hello_world").as_deref(), Some("hello-world"));
    }

    #[test]
    fn test_non_latin_is_dropped() {
        assert_eq!(slugify("Rust 日本語 notes").as_deref(), Some("rust-notes"));
        assert_eq!(slugify("日本語"), None);
    }

    #[test]
    fn test_empty_and_special_only() {
        assert_eq!(slugify(""), None);
        assert_eq!(slugify("!@#$%^&*()"), None);
        assert_eq!(slugify("   "), None);
        assert_eq!(slugify("---"), None);
    }

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("Needs_Fixing").as_deref(), Some("needs-fixing"));
        assert_eq!(normalize_slug("custom-slug").as_deref(), Some("custom-slug"));
    }

    proptest! {
        #[test]
        fn slugify_is_idempotent(input in "\\PC*") {
            if let Some(slug) = slugify(&input) {
                prop_assert_eq!(slugify(&slug), Some(slug.clone()));
            }
        }

        #[test]
        fn slugify_is_idempotent_on_letterlike_symbols(input in "[\u{2100}-\u{214F}\u{1D400}-\u{1D7FF}\u{FF21}-\u{FF5A} a-zA-Z]{0,24}") {
            if let Some(slug) = slugify(&input) {
                prop_assert_eq!(slugify(&slug), Some(slug.clone()));
                prop_assert!(!slug.chars().any(|c| c.is_ascii_uppercase()));
            }
        }

        #[test]
        fn slug_is_url_safe(input in "\\PC*") {
            if let Some(slug) = slugify(&input) {
                prop_assert!(!slug.is_empty());
                prop_assert!(slug.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-'));
                prop_assert!(!slug.starts_with('-') && !slug.ends_with('-'));
            }
        }
    }
}
