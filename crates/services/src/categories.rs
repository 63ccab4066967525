//! Category operations. Categories are admin-managed and have no ownership;
//! the calling surface gates writes through the policy engine.

use std::sync::Arc;

use domains::{
    Category, CategoryRecord, CategoryRepo, CategoryUpdate, DomainError, NewCategory, Result,
    SlugIndex,
};

use crate::slugs::unique_slugify;

/// Storage width of the category slug column.
pub const CATEGORY_SLUG_MAX_LENGTH: usize = 200;

#[derive(Clone)]
pub struct CategoryService {
    categories: Arc<dyn CategoryRepo>,
    slugs: Arc<dyn SlugIndex>,
}

impl CategoryService {
    pub fn new(categories: Arc<dyn CategoryRepo>, slugs: Arc<dyn SlugIndex>) -> Self {
        Self { categories, slugs }
    }

    pub async fn create(&self, request: NewCategory) -> Result<Category> {
        let slug = unique_slugify(
            self.slugs.as_ref(),
            &request.title,
            Some(CATEGORY_SLUG_MAX_LENGTH),
        )
        .await
        .map_err(|error| match error {
            DomainError::SlugExhausted => DomainError::UnableToCreate("category"),
            other => other,
        })?;
        let record = CategoryRecord {
            title: request.title,
            slug,
            description: request.description,
        };
        let category = self.categories.insert(record).await.map_err(|error| {
            tracing::error!(%error, "category insert failed");
            DomainError::UnableToCreate("category")
        })?;
        tracing::info!(category = category.id, slug = %category.slug, "category created");
        Ok(category)
    }

    /// Title and description only; the slug never changes.
    pub async fn update(&self, category: &Category, update: CategoryUpdate) -> Result<Category> {
        self.categories
            .update(category.id, update)
            .await
            .map_err(|error| {
                tracing::error!(%error, category = category.id, "category update failed");
                DomainError::UnableToUpdate("category")
            })
    }

    pub async fn delete(&self, category: &Category) -> Result<()> {
        self.categories.delete(category.id).await.map_err(|error| {
            tracing::error!(%error, category = category.id, "category delete failed");
            DomainError::UnableToDelete("category")
        })
    }

    pub async fn get(&self, id: i64) -> Result<Category> {
        self.categories
            .get(id)
            .await?
            .ok_or(DomainError::NotFound("category"))
    }

    pub async fn get_by_slug(&self, slug: &str) -> Result<Category> {
        self.categories
            .get_by_slug(slug)
            .await?
            .ok_or(DomainError::NotFound("category"))
    }

    /// All categories, title-descending.
    pub async fn list(&self) -> Result<Vec<Category>> {
        self.categories.list().await
    }
}
