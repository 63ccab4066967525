//! # services
//!
//! The business-rule layer for Quillpress: the authorization policy engine,
//! the comment tree manager, the slug allocator, and the operation layer for
//! accounts, blogs and categories. Everything here is stateless decision and
//! transform logic; mutation happens only through the repository ports.

pub mod accounts;
pub mod blogs;
pub mod categories;
pub mod comments;
pub mod comms;
pub mod policy;
pub mod slugs;

pub use accounts::AccountService;
pub use blogs::BlogService;
pub use categories::CategoryService;
pub use comments::CommentService;
pub use comms::LogMailer;
pub use policy::{Action, Decision, PolicyEngine, PolicyOptions, Resource, ResourceKind, Scope};
pub use slugs::{slugify, unique_slugify};

#[cfg(test)]
pub(crate) mod testutil {
    use chrono::Utc;
    use domains::{Account, Blog, Category, Comment};

    pub fn account(id: i64, admin: bool, confirmed: bool) -> Account {
        Account {
            id,
            username: format!("user{id}"),
            display: format!("User {id}"),
            email: format!("user{id}@example.org"),
            password: "$argon2id$stub".to_string(),
            about: None,
            admin,
            confirmed,
            created_at: Utc::now(),
            updated_at: None,
            seen_at: None,
        }
    }

    pub fn blog(id: i64, author_id: Option<i64>, published: bool, comment: bool) -> Blog {
        Blog {
            id,
            title: format!("Blog {id}"),
            slug: format!("blog-{id}"),
            description: None,
            body: "body".to_string(),
            published,
            comment,
            author_id,
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn category(id: i64) -> Category {
        Category {
            id,
            title: format!("Category {id}"),
            slug: format!("category-{id}"),
            description: "about".to_string(),
            created_at: Utc::now(),
            updated_at: None,
        }
    }

    pub fn comment(id: i64, author_id: Option<i64>, blog_id: i64, path: &str) -> Comment {
        Comment {
            id,
            body: "hello".to_string(),
            path: path.to_string(),
            author_id,
            blog_id,
            parent_id: None,
            created_at: Utc::now(),
            updated_at: None,
            thread_at: Utc::now(),
        }
    }
}
