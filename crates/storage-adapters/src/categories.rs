//! SQLite mapping between the `categories` table and the `Category` model.

use async_trait::async_trait;
use chrono::Utc;
use domains::{
    Category, CategoryRecord, CategoryRepo, CategoryUpdate, DomainError, Result, SlugIndex,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::storage_err;

const COLUMNS: &str = "id, title, slug, description, created_at, updated_at";

pub struct SqliteCategoryRepo {
    pool: SqlitePool,
}

impl SqliteCategoryRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_category(row: &SqliteRow) -> Category {
    Category {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

#[async_trait]
impl CategoryRepo for SqliteCategoryRepo {
    async fn insert(&self, record: CategoryRecord) -> Result<Category> {
        let result = sqlx::query(
            "INSERT INTO categories (title, slug, description, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(&record.title)
        .bind(&record.slug)
        .bind(&record.description)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| DomainError::Storage("inserted category not readable".to_string()))
    }

    async fn get(&self, id: i64) -> Result<Option<Category>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM categories WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.as_ref().map(row_to_category))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Category>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM categories WHERE slug = ?"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.as_ref().map(row_to_category))
    }

    async fn list(&self) -> Result<Vec<Category>> {
        let rows =
            sqlx::query(&format!("SELECT {COLUMNS} FROM categories ORDER BY title DESC"))
                .fetch_all(&self.pool)
                .await
                .map_err(storage_err)?;
        Ok(rows.iter().map(row_to_category).collect())
    }

    async fn update(&self, id: i64, update: CategoryUpdate) -> Result<Category> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE categories SET updated_at = ");
        builder.push_bind(Utc::now());
        if let Some(title) = &update.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(description) = &update.description {
            builder.push(", description = ").push_bind(description);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        self.get(id).await?.ok_or(DomainError::NotFound("category"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM categories WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("category"));
        }
        Ok(())
    }
}

#[async_trait]
impl SlugIndex for SqliteCategoryRepo {
    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM categories WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.is_some())
    }
}
