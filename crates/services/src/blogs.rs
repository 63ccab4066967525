//! # Blog operations
//!
//! Creation (with slug allocation), updates (the slug is immutable), forced
//! slug regeneration, deletion, lookups and the year/month archive grouping.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Datelike;
use domains::{
    Account, Blog, BlogFilter, BlogPatch, BlogRecord, BlogRepo, BlogUpdate, Category, DomainError,
    NewBlog, Result, SlugIndex,
};

use crate::slugs::unique_slugify;

/// Storage width of the blog slug column.
pub const BLOG_SLUG_MAX_LENGTH: usize = 200;

/// Blogs grouped by year, then month, oldest first.
pub type BlogArchive = BTreeMap<i32, BTreeMap<u32, Vec<Blog>>>;

#[derive(Clone)]
pub struct BlogService {
    blogs: Arc<dyn BlogRepo>,
    slugs: Arc<dyn SlugIndex>,
}

impl BlogService {
    /// `slugs` must index the same table `blogs` writes to; the two handles
    /// are typically one adapter instance.
    pub fn new(blogs: Arc<dyn BlogRepo>, slugs: Arc<dyn SlugIndex>) -> Self {
        Self { blogs, slugs }
    }

    pub async fn create(&self, author: &Account, request: NewBlog) -> Result<Blog> {
        let slug = unique_slugify(self.slugs.as_ref(), &request.title, Some(BLOG_SLUG_MAX_LENGTH))
            .await
            .map_err(|error| match error {
                DomainError::SlugExhausted => DomainError::UnableToCreate("blog"),
                other => other,
            })?;
        let record = BlogRecord {
            title: request.title,
            slug,
            description: request.description,
            body: request.body,
            published: request.published,
            comment: request.comment,
            author_id: Some(author.id),
            category_ids: request.category_ids,
        };
        let blog = self.blogs.insert(record).await.map_err(|error| {
            tracing::error!(%error, "blog insert failed");
            DomainError::UnableToCreate("blog")
        })?;
        tracing::info!(blog = blog.id, slug = %blog.slug, author = author.id, "blog created");
        Ok(blog)
    }

    /// Apply an update. The slug never changes here, whatever happens to the
    /// title; see [`BlogService::regenerate_slug`].
    pub async fn update(&self, blog: &Blog, update: BlogUpdate) -> Result<Blog> {
        let patch = BlogPatch {
            title: update.title,
            description: update.description,
            body: update.body,
            published: update.published,
            comment: update.comment,
            category_ids: update.category_ids,
            ..Default::default()
        };
        self.blogs.update(blog.id, patch).await.map_err(|error| {
            tracing::error!(%error, blog = blog.id, "blog update failed");
            DomainError::UnableToUpdate("blog")
        })
    }

    /// Force a fresh slug from the current title. The one sanctioned way a
    /// slug changes after assignment.
    pub async fn regenerate_slug(&self, blog: &Blog) -> Result<Blog> {
        let slug = unique_slugify(self.slugs.as_ref(), &blog.title, Some(BLOG_SLUG_MAX_LENGTH))
            .await
            .map_err(|error| match error {
                DomainError::SlugExhausted => DomainError::UnableToUpdate("blog"),
                other => other,
            })?;
        self.blogs
            .update(
                blog.id,
                BlogPatch {
                    slug: Some(slug),
                    ..Default::default()
                },
            )
            .await
            .map_err(|error| {
                tracing::error!(%error, blog = blog.id, "slug regeneration failed");
                DomainError::UnableToUpdate("blog")
            })
    }

    pub async fn delete(&self, blog: &Blog) -> Result<()> {
        self.blogs.delete(blog.id).await.map_err(|error| {
            tracing::error!(%error, blog = blog.id, "blog delete failed");
            DomainError::UnableToDelete("blog")
        })
    }

    pub async fn get(&self, id: i64) -> Result<Blog> {
        self.blogs.get(id).await?.ok_or(DomainError::NotFound("blog"))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Blog> {
        self.blogs
            .get_by_slug(slug)
            .await?
            .ok_or(DomainError::NotFound("blog"))
    }

    pub async fn list(&self, filter: BlogFilter) -> Result<Vec<Blog>> {
        self.blogs.list(filter).await
    }

    pub async fn categories_of(&self, blog: &Blog) -> Result<Vec<Category>> {
        self.blogs.categories_of(blog.id).await
    }

    /// Group blogs by creation year and month, oldest first, optionally
    /// restricted to (un)published ones.
    pub async fn archive(&self, published: Option<bool>) -> Result<BlogArchive> {
        let blogs = self
            .list(BlogFilter {
                published,
                ..Default::default()
            })
            .await?;
        let mut archive = BlogArchive::new();
        for blog in blogs {
            let date = blog.created_at.date_naive();
            archive
                .entry(date.year())
                .or_default()
                .entry(date.month())
                .or_default()
                .push(blog);
        }
        Ok(archive)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{account, blog};
    use chrono::{TimeZone, Utc};
    use domains::{MockBlogRepo, MockSlugIndex};

    #[tokio::test]
    async fn create_allocates_slug_from_title() {
        let mut slugs = MockSlugIndex::new();
        slugs.expect_slug_exists().returning(|_| Ok(false));
        let mut blogs = MockBlogRepo::new();
        blogs
            .expect_insert()
            .withf(|record| record.slug == "my-first-post" && record.author_id == Some(1))
            .returning(|record| {
                let mut created = blog(1, record.author_id, record.published, record.comment);
                created.title = record.title;
                created.slug = record.slug;
                Ok(created)
            });
        let service = BlogService::new(Arc::new(blogs), Arc::new(slugs));
        let created = service
            .create(
                &account(1, false, true),
                NewBlog {
                    title: "My First Post".to_string(),
                    description: None,
                    body: "hello".to_string(),
                    category_ids: vec![],
                    published: false,
                    comment: true,
                },
            )
            .await
            .unwrap();
        assert_eq!(created.slug, "my-first-post");
    }

    #[tokio::test]
    async fn exhausted_slug_surfaces_as_unable_to_create() {
        let mut slugs = MockSlugIndex::new();
        slugs.expect_slug_exists().returning(|_| Ok(true));
        let service = BlogService::new(Arc::new(MockBlogRepo::new()), Arc::new(slugs));
        let result = service
            .create(
                &account(1, false, true),
                NewBlog {
                    title: "taken".to_string(),
                    description: None,
                    body: "hello".to_string(),
                    category_ids: vec![],
                    published: false,
                    comment: false,
                },
            )
            .await;
        assert!(matches!(result, Err(DomainError::UnableToCreate("blog"))));
    }

    #[tokio::test]
    async fn update_never_touches_the_slug() {
        let mut blogs = MockBlogRepo::new();
        blogs
            .expect_update()
            .withf(|_, patch| patch.slug.is_none() && patch.title.as_deref() == Some("Renamed"))
            .returning(|id, _| Ok(blog(id, Some(1), true, true)));
        let service = BlogService::new(Arc::new(blogs), Arc::new(MockSlugIndex::new()));
        let existing = blog(1, Some(1), true, true);
        service
            .update(
                &existing,
                BlogUpdate {
                    title: Some("Renamed".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn archive_groups_by_year_then_month() {
        let mut blogs = MockBlogRepo::new();
        blogs.expect_list().returning(|_| {
            let mut a = blog(1, Some(1), true, true);
            a.created_at = Utc.with_ymd_and_hms(2019, 3, 1, 0, 0, 0).unwrap();
            let mut b = blog(2, Some(1), true, true);
            b.created_at = Utc.with_ymd_and_hms(2019, 11, 2, 0, 0, 0).unwrap();
            let mut c = blog(3, Some(1), true, true);
            c.created_at = Utc.with_ymd_and_hms(2020, 1, 3, 0, 0, 0).unwrap();
            Ok(vec![a, b, c])
        });
        let service = BlogService::new(Arc::new(blogs), Arc::new(MockSlugIndex::new()));
        let archive = service.archive(Some(true)).await.unwrap();
        assert_eq!(archive.len(), 2);
        assert_eq!(archive[&2019].len(), 2);
        assert_eq!(archive[&2019][&3].len(), 1);
        assert_eq!(archive[&2020][&1][0].id, 3);
    }
}
