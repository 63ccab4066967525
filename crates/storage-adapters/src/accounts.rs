//! SQLite mapping between the `accounts` table and the `Account` model.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domains::{Account, AccountPatch, AccountRecord, AccountRepo, DomainError, Result};
use sqlx::{sqlite::SqliteRow, Row, SqlitePool};

use crate::storage_err;

const COLUMNS: &str =
    "id, username, display, email, password, about, admin, confirmed, created_at, updated_at, seen_at";

pub struct SqliteAccountRepo {
    pool: SqlitePool,
}

impl SqliteAccountRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn row_to_account(row: &SqliteRow) -> Account {
    Account {
        id: row.get("id"),
        username: row.get("username"),
        display: row.get("display"),
        email: row.get("email"),
        password: row.get("password"),
        about: row.get("about"),
        admin: row.get("admin"),
        confirmed: row.get("confirmed"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
        seen_at: row.get("seen_at"),
    }
}

#[async_trait]
impl AccountRepo for SqliteAccountRepo {
    async fn insert(&self, record: AccountRecord) -> Result<Account> {
        let result = sqlx::query(
            "INSERT INTO accounts (username, display, email, password, admin, confirmed, created_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&record.username)
        .bind(&record.display)
        .bind(&record.email)
        .bind(&record.password)
        .bind(record.admin)
        .bind(record.confirmed)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        self.get(result.last_insert_rowid())
            .await?
            .ok_or_else(|| DomainError::Storage("inserted account not readable".to_string()))
    }

    async fn get(&self, id: i64) -> Result<Option<Account>> {
        let row = sqlx::query(&format!("SELECT {COLUMNS} FROM accounts WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.as_ref().map(row_to_account))
    }

    async fn find<'a>(&self, username: Option<&'a str>, email: Option<&'a str>) -> Result<Option<Account>> {
        // Equality is case-insensitive through the columns' NOCASE collation.
        let mut builder =
            sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!("SELECT {COLUMNS} FROM accounts WHERE 1 = 1"));
        if let Some(username) = username {
            builder.push(" AND username = ").push_bind(username);
        }
        if let Some(email) = email {
            builder.push(" AND email = ").push_bind(email);
        }
        let row = builder
            .build()
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(row.as_ref().map(row_to_account))
    }

    async fn list(&self) -> Result<Vec<Account>> {
        let rows = sqlx::query(&format!("SELECT {COLUMNS} FROM accounts ORDER BY username ASC"))
            .fetch_all(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(rows.iter().map(row_to_account).collect())
    }

    async fn update(&self, id: i64, patch: AccountPatch) -> Result<Account> {
        let mut builder = sqlx::QueryBuilder::<sqlx::Sqlite>::new("UPDATE accounts SET updated_at = ");
        builder.push_bind(Utc::now());
        if let Some(username) = &patch.username {
            builder.push(", username = ").push_bind(username);
        }
        if let Some(display) = &patch.display {
            builder.push(", display = ").push_bind(display);
        }
        if let Some(email) = &patch.email {
            builder.push(", email = ").push_bind(email);
        }
        if let Some(password) = &patch.password {
            builder.push(", password = ").push_bind(password);
        }
        if let Some(about) = &patch.about {
            builder.push(", about = ").push_bind(about);
        }
        if let Some(admin) = patch.admin {
            builder.push(", admin = ").push_bind(admin);
        }
        if let Some(confirmed) = patch.confirmed {
            builder.push(", confirmed = ").push_bind(confirmed);
        }
        if let Some(seen_at) = patch.seen_at {
            builder.push(", seen_at = ").push_bind(seen_at);
        }
        builder.push(" WHERE id = ").push_bind(id);
        builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        self.get(id).await?.ok_or(DomainError::NotFound("account"))
    }

    async fn delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        if result.rows_affected() == 0 {
            return Err(DomainError::NotFound("account"));
        }
        Ok(())
    }

    async fn touch_seen(&self, id: i64, at: DateTime<Utc>) -> Result<()> {
        sqlx::query("UPDATE accounts SET seen_at = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(storage_err)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connect_in_memory;

    fn record(username: &str, email: &str) -> AccountRecord {
        AccountRecord {
            username: username.to_string(),
            display: username.to_string(),
            email: email.to_string(),
            password: "$argon2id$stub".to_string(),
            admin: false,
            confirmed: false,
        }
    }

    #[tokio::test]
    async fn username_uniqueness_is_case_insensitive() {
        let pool = connect_in_memory().await.unwrap();
        let repo = SqliteAccountRepo::new(pool);
        repo.insert(record("Ada", "ada@example.org")).await.unwrap();
        let duplicate = repo.insert(record("ada", "other@example.org")).await;
        assert!(matches!(duplicate, Err(DomainError::Storage(_))));
    }

    #[tokio::test]
    async fn find_matches_email_case_insensitively() {
        let pool = connect_in_memory().await.unwrap();
        let repo = SqliteAccountRepo::new(pool);
        let created = repo.insert(record("ada", "Ada@Example.org")).await.unwrap();
        let found = repo
            .find(None, Some("ada@example.org"))
            .await
            .unwrap()
            .expect("account should match");
        assert_eq!(found.id, created.id);
    }
}
