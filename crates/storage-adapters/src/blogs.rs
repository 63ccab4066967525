//! SQLite mapping between the `blogs` table (plus the category join table)
//! and the `Blog` model.

use async_trait::async_trait;
use chrono::Utc;
use domains::{
    AuthorSelector, Blog, BlogFilter, BlogPatch, BlogRecord, BlogRepo, Category, DomainError,
    Result, SlugIndex,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::storage_err;

const COLUMNS: &str =
    "id, title, slug, description, body, published, comment, author_id, created_at, updated_at";

pub struct SqliteBlogRepo {
    pool: SqlitePool,
}

impl SqliteBlogRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_blog(row: &SqliteRow) -> Blog {
    Blog {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        description: row.get("description"),
        body: row.get("body"),
        published: row.get("published"),
        comment: row.get("comment"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
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
impl BlogRepo for SqliteBlogRepo {
    async fn insert(&self, record: BlogRecord) -> Result<Blog> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;
        let result = sqlx::query(
            "INSERT INTO blogs (title, slug, description, body, published, comment, author_id, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.title)
        .bind(&record.slug)
        .bind(&record.description)
        .bind(&record.body)
        .bind(record.published)
        .bind(record.comment)
        .bind(record.author_id)
        .bind(Utc::now())
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;
        let id = result.last_insert_rowid();

        for category_id in &record.category_ids {
            sqlx::query("INSERT INTO blog_categories (blog_id, category_id) VALUES (?, ?)")
                .bind(id)
                .bind(category_id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
        }
        tx.commit().await.map_err(storage_err)?;

        self.get(id)
            .await?
            .ok_or_else(|| DomainError::Storage("inserted blog not readable".to_string()))
    }

    async fn get(&self, id: i64) -> Result<Option<Blog>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM blogs WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.as_ref().map(row_to_blog))
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Blog>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM blogs WHERE slug = ?"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.as_ref().map(row_to_blog))
    }

    async fn list(&self, filter: BlogFilter) -> Result<Vec<Blog>> {
        let mut builder =
            sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!("SELECT {COLUMNS} FROM blogs WHERE 1 = 1"));
        match filter.author {
            Some(AuthorSelector::Account(author_id)) => {
                builder.push(" AND author_id = ").push_bind(author_id);
            }
            Some(AuthorSelector::Unattributed) => {
                builder.push(" AND author_id IS NULL");
            }
            None => {}
        }
        if let Some(category_id) = filter.category_id {
            builder
                .push(" AND EXISTS (SELECT 1 FROM blog_categories WHERE blog_id = blogs.id AND category_id = ")
                .push_bind(category_id)
                .push(")");
        }
        if let Some(published) = filter.published {
            builder.push(" AND published = ").push_bind(published);
        }
        builder.push(" ORDER BY created_at DESC");
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(rows.iter().map(row_to_blog).collect())
    }

    async fn update(&self, id: i64, patch: BlogPatch) -> Result<Blog> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE blogs SET updated_at = ");
        builder.push_bind(Utc::now());
        if let Some(title) = &patch.title {
            builder.push(", title = ").push_bind(title);
        }
        if let Some(slug) = &patch.slug {
            builder.push(", slug = ").push_bind(slug);
        }
        if let Some(description) = &patch.description {
            builder.push(", description = ").push_bind(description);
        }
        if let Some(body) = &patch.body {
            builder.push(", body = ").push_bind(body);
        }
        if let Some(published) = patch.published {
            builder.push(", published = ").push_bind(published);
        }
        if let Some(comment) = patch.comment {
            builder.push(", comment = ").push_bind(comment);
        }
        if let Some(author_id) = patch.author_id {
            builder.push(", author_id = ").push_bind(author_id);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder
            .build()
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        if let Some(category_ids) = &patch.category_ids {
            sqlx::query("DELETE FROM blog_categories WHERE blog_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(storage_err)?;
            for category_id in category_ids {
                sqlx::query("INSERT INTO blog_categories (blog_id, category_id) VALUES (?, ?)")
                    .bind(id)
                    .bind(category_id)
                    .execute(&mut *tx)
                    .await
                    .map_err(storage_err)?;
            }
        }
        tx.commit().await.map_err(storage_err)?;

        self.get(id).await?.ok_or(DomainError::NotFound("blog"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM blogs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("blog"));
        }
        Ok(())
    }

    async fn categories_of(&self, blog_id: i64) -> Result<Vec<Category>> {
        let rows = sqlx::query(
            "SELECT c.id, c.title, c.slug, c.description, c.created_at, c.updated_at
             FROM categories c
             JOIN blog_categories bc ON bc.category_id = c.id
             WHERE bc.blog_id = ?
             ORDER BY c.title ASC",
        )
        .bind(blog_id)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;
        Ok(rows.iter().map(row_to_category).collect())
    }
}

#[async_trait]
impl SlugIndex for SqliteBlogRepo {
    async fn slug_exists(&self, slug: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM blogs WHERE slug = ?")
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.is_some())
    }
}
