//! SQLite mapping between the `comments` table and the `Comment` model.
//!
//! The insert is two-phase: the materialized path needs the freshly assigned
//! row id, so the row is inserted first and its path written second. Both
//! statements run inside one transaction so a comment can never persist with
//! an empty path.

use async_trait::async_trait;
use chrono::Utc;
use domains::{
    child_path, AuthorSelector, Comment, CommentFilter, CommentRecord, CommentRepo, DomainError,
    Result,
};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::storage_err;

const COLUMNS: &str =
    "id, body, path, author_id, blog_id, parent_id, created_at, updated_at, thread_at";

pub struct SqliteCommentRepo {
    pool: SqlitePool,
}

impl SqliteCommentRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_comment(row: &SqliteRow) -> Comment {
    Comment {
        id: row.get("id"),
        body: row.get("body"),
        path: row.get("path"),
        author_id: row.get("author_id"),
        blog_id: row.get("blog_id"),
        parent_id: row.get("parent_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        thread_at: row.get("thread_at"),
    }
}

#[async_trait]
impl CommentRepo for SqliteCommentRepo {
    async fn insert(&self, record: CommentRecord) -> Result<Comment> {
        let mut tx = self.pool.begin().await.map_err(storage_err)?;

        let result = sqlx::query(
            "INSERT INTO comments (body, author_id, blog_id, parent_id, created_at, thread_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.body)
        .bind(record.author_id)
        .bind(record.blog_id)
        .bind(record.parent_id)
        .bind(Utc::now())
        .bind(record.thread_at)
        .execute(&mut *tx)
        .await
        .map_err(storage_err)?;
        let id = result.last_insert_rowid();

        let path = child_path(record.parent_path.as_deref(), id);
        sqlx::query("UPDATE comments SET path = ? WHERE id = ?")
            .bind(&path)
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(storage_err)?;

        tx.commit().await.map_err(storage_err)?;

        self.get(id)
            .await?
            .ok_or_else(|| DomainError::Storage("inserted comment not readable".to_string()))
    }

    async fn get(&self, id: i64) -> Result<Option<Comment>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM comments WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.as_ref().map(row_to_comment))
    }

    async fn list(&self, filter: CommentFilter) -> Result<Vec<Comment>> {
        let mut builder =
            sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!("SELECT {COLUMNS} FROM comments WHERE 1 = 1"));
        match filter.author {
            Some(AuthorSelector::Account(author_id)) => {
                builder.push(" AND author_id = ").push_bind(author_id);
            }
            Some(AuthorSelector::Unattributed) => {
                builder.push(" AND author_id IS NULL");
            }
            None => {}
        }
        if let Some(blog_id) = filter.blog_id {
            builder.push(" AND blog_id = ").push_bind(blog_id);
        }
        if let Some(parent_id) = filter.parent_id {
            builder.push(" AND parent_id = ").push_bind(parent_id);
        }
        // Newest threads first; pre-order traversal inside each thread.
        builder.push(" ORDER BY thread_at DESC, path ASC");
        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(rows.iter().map(row_to_comment).collect())
    }

    async fn update_body(&self, id: i64, body: &str) -> Result<Comment> {
        sqlx::query("UPDATE comments SET body = ?, updated_at = ? WHERE id = ?")
            .bind(body)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        self.get(id).await?.ok_or(DomainError::NotFound("comment"))
    }

    async fn delete_subtree(&self, path: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM comments WHERE path = ? OR path LIKE ? || '.%'")
            .bind(path)
            .bind(path)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{connect_in_memory, SqliteAccountRepo, SqliteBlogRepo};
    use domains::{AccountRecord, AccountRepo, BlogRecord, BlogRepo};

    async fn seeded_repo() -> (SqliteCommentRepo, i64) {
        let pool = connect_in_memory().await.unwrap();
        let accounts = SqliteAccountRepo::new(pool.clone());
        let author = accounts
            .insert(AccountRecord {
                username: "ada".to_string(),
                display: "Ada".to_string(),
                email: "ada@example.org".to_string(),
                password: "$argon2id$stub".to_string(),
                admin: false,
                confirmed: true,
            })
            .await
            .unwrap();
        let blogs = SqliteBlogRepo::new(pool.clone());
        let blog = blogs
            .insert(BlogRecord {
                title: "Hello".to_string(),
                slug: "hello".to_string(),
                description: None,
                body: "world".to_string(),
                published: true,
                comment: true,
                author_id: Some(author.id),
                category_ids: vec![],
            })
            .await
            .unwrap();
        (SqliteCommentRepo::new(pool), blog.id)
    }

    fn record(blog_id: i64, parent: Option<&Comment>) -> CommentRecord {
        CommentRecord {
            body: "hi".to_string(),
            author_id: None,
            blog_id,
            parent_id: parent.map(|p| p.id),
            parent_path: parent.map(|p| p.path.clone()),
            thread_at: parent.map(|p| p.thread_at).unwrap_or_else(Utc::now),
        }
    }

    #[tokio::test]
    async fn insert_assigns_path_from_rowid() {
        let (repo, blog_id) = seeded_repo().await;
        let root = repo.insert(record(blog_id, None)).await.unwrap();
        assert_eq!(root.path, format!("{:06}", root.id));
        let reply = repo.insert(record(blog_id, Some(&root))).await.unwrap();
        assert_eq!(reply.path, format!("{}.{:06}", root.path, reply.id));
        assert_eq!(reply.level(), 1);
        assert_eq!(reply.thread_at, root.thread_at);
    }

    #[tokio::test]
    async fn delete_subtree_spares_unrelated_rows() {
        let (repo, blog_id) = seeded_repo().await;
        let root = repo.insert(record(blog_id, None)).await.unwrap();
        let reply = repo.insert(record(blog_id, Some(&root))).await.unwrap();
        let _nested = repo.insert(record(blog_id, Some(&reply))).await.unwrap();
        let other = repo.insert(record(blog_id, None)).await.unwrap();

        let removed = repo.delete_subtree(&root.path).await.unwrap();
        assert_eq!(removed, 3);
        assert!(repo.get(root.id).await.unwrap().is_none());
        assert!(repo.get(other.id).await.unwrap().is_some());
    }
}
