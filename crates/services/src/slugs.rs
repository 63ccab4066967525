//! # Slug Allocator
//!
//! Derives unique, URL-safe slugs from titles. Collisions are resolved by
//! prepending a short random disambiguator to the original text and retrying,
//! up to a fixed number of attempts. The storage-layer unique constraint
//! remains the final backstop for the inherent check-then-insert race.

use domains::{DomainError, Result, SlugIndex};
use uuid::Uuid;

/// How many normalize-and-check cycles to run before giving up.
pub const SLUG_ATTEMPTS: usize = 20;

/// Length of the random hex disambiguator.
const DISAMBIGUATOR_LEN: usize = 3;

/// Normalize free text into a slug: ASCII alphanumerics lowercased, every
/// other run of characters collapsed into a single hyphen, truncated to
/// `max_length` without leaving a trailing hyphen.
pub fn slugify(text: &str, max_length: Option<usize>) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_hyphen = false;
    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_hyphen && !slug.is_empty() {
                slug.push('-');
            }
            pending_hyphen = false;
            slug.push(ch.to_ascii_lowercase());
        } else {
            pending_hyphen = true;
        }
    }
    if let Some(max) = max_length {
        if slug.len() > max {
            slug.truncate(max);
        }
    }
    while slug.ends_with('-') {
        slug.pop();
    }
    slug
}

/// Allocate a slug for `text` that no row in `index` currently uses.
///
/// The disambiguator is prepended, not appended, so a `max_length`
/// truncation can never cut off the part that makes the slug unique.
pub async fn unique_slugify(
    index: &dyn SlugIndex,
    text: &str,
    max_length: Option<usize>,
) -> Result<String> {
    let mut candidate = text.to_owned();
    for attempt in 0..SLUG_ATTEMPTS {
        let slug = slugify(&candidate, max_length);
        if !index.slug_exists(&slug).await? {
            if attempt > 0 {
                tracing::debug!(%slug, attempt, "slug collision resolved");
            }
            return Ok(slug);
        }
        candidate = format!("{}-{}", disambiguator(), text);
    }
    tracing::warn!(text, "slug attempts exhausted");
    Err(DomainError::SlugExhausted)
}

fn disambiguator() -> String {
    Uuid::new_v4().simple().to_string()[..DISAMBIGUATOR_LEN].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use domains::MockSlugIndex;

    #[test]
    fn slugify_lowercases_and_hyphenates() {
        assert_eq!(slugify("My First Post", None), "my-first-post");
        assert_eq!(slugify("  Hello,   World!  ", None), "hello-world");
        assert_eq!(slugify("C'est du café", None), "c-est-du-caf");
        assert_eq!(slugify("!!!", None), "");
    }

    #[test]
    fn slugify_truncates_without_trailing_hyphen() {
        assert_eq!(slugify("one two three", Some(7)), "one-two");
        assert_eq!(slugify("one two three", Some(8)), "one-two");
        assert_eq!(slugify("short", Some(200)), "short");
    }

    #[tokio::test]
    async fn first_candidate_wins_without_collision() {
        let mut index = MockSlugIndex::new();
        index.expect_slug_exists().returning(|_| Ok(false));
        let slug = unique_slugify(&index, "blog", None).await.unwrap();
        assert_eq!(slug, "blog");
    }

    #[tokio::test]
    async fn collision_prepends_three_hex_characters() {
        let mut index = MockSlugIndex::new();
        index
            .expect_slug_exists()
            .returning(|slug| Ok(slug == "blog"));
        let slug = unique_slugify(&index, "blog", None).await.unwrap();
        assert_eq!(slug.len(), "xxx-blog".len());
        assert!(slug.ends_with("-blog"));
        let tag = &slug[..3];
        assert!(tag.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[tokio::test]
    async fn disambiguator_survives_max_length_truncation() {
        let mut index = MockSlugIndex::new();
        index
            .expect_slug_exists()
            .returning(|slug| Ok(slug == "my-very"));
        let slug = unique_slugify(&index, "My Very Long Title", Some(7))
            .await
            .unwrap();
        // Truncation keeps the leading tag, dropping the tail instead.
        assert!(slug.len() <= 7);
        assert_ne!(slug, "my-very");
        assert!(slug.starts_with(|c: char| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn exhaustion_after_bounded_attempts() {
        let mut index = MockSlugIndex::new();
        index
            .expect_slug_exists()
            .times(SLUG_ATTEMPTS)
            .returning(|_| Ok(true));
        let result = unique_slugify(&index, "blog", None).await;
        assert!(matches!(result, Err(DomainError::SlugExhausted)));
    }
}
