//! # Domain Models
//!
//! These structs represent the core entities of Quillpress. Identifiers are
//! monotonically assigned `i64` row ids; the comment hierarchy depends on
//! that (see [`child_path`]).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Width of one zero-padded comment path segment.
pub const PATH_SEGMENT_DIGITS: usize = 6;

/// Separator between comment path segments.
pub const PATH_SEPARATOR: char = '.';

/// A registered account.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: i64,
    /// Unique login name. Compared case-insensitively.
    pub username: String,
    /// Public display name. Falls back to the username when left blank.
    pub display: String,
    /// Unique email address. Compared case-insensitively.
    pub email: String,
    /// Argon2 password hash. Never serialized out of the domain layer.
    #[serde(skip_serializing)]
    pub password: String,
    pub about: Option<String>,
    pub admin: bool,
    pub confirmed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    pub seen_at: Option<DateTime<Utc>>,
}

/// A blog post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Blog {
    pub id: i64,
    pub title: String,
    /// Globally unique URL slug. Immutable once assigned, except through a
    /// forced regeneration.
    pub slug: String,
    pub description: Option<String>,
    pub body: String,
    pub published: bool,
    /// Whether new comment threads may be opened on this blog.
    pub comment: bool,
    /// `None` when the author account was deleted without cascading.
    pub author_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl Blog {
    pub fn is_published(&self) -> bool {
        self.published
    }
}

/// An editorial category. Admin-managed; blogs carry zero or more.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// A comment attached to a blog, possibly nested under a parent comment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub body: String,
    /// Materialized ancestry: one zero-padded segment per ancestor plus the
    /// comment itself, joined by [`PATH_SEPARATOR`]. Lexicographic order over
    /// paths is a pre-order depth-first traversal of the thread.
    pub path: String,
    /// `None` when the author account was deleted.
    pub author_id: Option<i64>,
    pub blog_id: i64,
    pub parent_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
    /// Timestamp anchoring this comment to its root thread. Every comment in
    /// one conversation tree shares the root's value.
    pub thread_at: DateTime<Utc>,
}

impl Comment {
    /// Nesting depth derived from the path. A root comment is level 0.
    pub fn level(&self) -> usize {
        self.path.matches(PATH_SEPARATOR).count()
    }

    /// Whether `self` sits somewhere below `other` in the same thread.
    pub fn is_descendant_of(&self, other: &Comment) -> bool {
        self.path.starts_with(&format!("{}{}", other.path, PATH_SEPARATOR))
    }
}

/// One zero-padded path segment for a comment id.
pub fn path_segment(id: i64) -> String {
    format!("{:0width$}", id, width = PATH_SEGMENT_DIGITS)
}

/// Full path for a comment given its parent's path (if any) and its own id.
/// Callable only after the comment holds a persistent id, which is why path
/// assignment is a two-phase write at the storage layer.
pub fn child_path(parent_path: Option<&str>, id: i64) -> String {
    match parent_path {
        Some(parent) => format!("{parent}{PATH_SEPARATOR}{}", path_segment(id)),
        None => path_segment(id),
    }
}

/// The identity on whose behalf an action is evaluated.
#[derive(Debug, Clone)]
pub enum Actor {
    Anonymous,
    Account(Account),
}

impl Actor {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::Account(_))
    }

    pub fn account(&self) -> Option<&Account> {
        match self {
            Actor::Account(account) => Some(account),
            Actor::Anonymous => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comment(id: i64, path: &str) -> Comment {
        Comment {
            id,
            body: "hello".to_string(),
            path: path.to_string(),
            author_id: Some(1),
            blog_id: 1,
            parent_id: None,
            created_at: Utc::now(),
            updated_at: None,
            thread_at: Utc::now(),
        }
    }

    #[test]
    fn path_segments_are_zero_padded() {
        assert_eq!(path_segment(1), "000001");
        assert_eq!(path_segment(123456), "123456");
        // Ids wider than the pad keep their full width.
        assert_eq!(path_segment(1234567), "1234567");
    }

    #[test]
    fn child_path_chains_ancestry() {
        assert_eq!(child_path(None, 3), "000003");
        assert_eq!(child_path(Some("000003"), 9), "000003.000009");
        assert_eq!(child_path(Some("000003.000009"), 12), "000003.000009.000012");
    }

    #[test]
    fn level_counts_ancestors() {
        assert_eq!(comment(1, "000001").level(), 0);
        assert_eq!(comment(2, "000001.000002").level(), 1);
        assert_eq!(comment(3, "000001.000002.000003").level(), 2);
    }

    #[test]
    fn descendants_match_on_path_prefix() {
        let root = comment(1, "000001");
        let reply = comment(2, "000001.000002");
        let sibling = comment(10, "000010");
        assert!(reply.is_descendant_of(&root));
        assert!(!root.is_descendant_of(&reply));
        assert!(!sibling.is_descendant_of(&root));
        // A shared numeric prefix is not ancestry.
        let lookalike = comment(11, "000011");
        assert!(!lookalike.is_descendant_of(&comment(1, "000001")));
    }
}
