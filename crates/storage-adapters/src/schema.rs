//! Idempotent schema setup, run once when the pool is opened.
//!
//! The unique indexes on account names/emails and on slugs are the final
//! backstop for the best-effort uniqueness checks in the service layer.
//! Text columns compared case-insensitively carry COLLATE NOCASE so plain
//! equality matches the lookup semantics.

use sqlx::SqlitePool;

use crate::storage_err;
use domains::Result;

const STATEMENTS: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS accounts (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        username   TEXT COLLATE NOCASE NOT NULL UNIQUE,
        display    TEXT NOT NULL,
        email      TEXT COLLATE NOCASE NOT NULL UNIQUE,
        password   TEXT NOT NULL,
        about      TEXT,
        admin      INTEGER NOT NULL DEFAULT 0,
        confirmed  INTEGER NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT,
        seen_at    TEXT
    )",
    "CREATE TABLE IF NOT EXISTS blogs (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT NOT NULL,
        slug        TEXT COLLATE NOCASE NOT NULL UNIQUE,
        description TEXT,
        body        TEXT NOT NULL,
        published   INTEGER NOT NULL DEFAULT 0,
        comment     INTEGER NOT NULL DEFAULT 0,
        author_id   INTEGER REFERENCES accounts(id) ON DELETE SET NULL,
        created_at  TEXT NOT NULL,
        updated_at  TEXT
    )",
    "CREATE INDEX IF NOT EXISTS idx_blogs_title ON blogs(title)",
    "CREATE TABLE IF NOT EXISTS categories (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        title       TEXT COLLATE NOCASE NOT NULL UNIQUE,
        slug        TEXT COLLATE NOCASE NOT NULL UNIQUE,
        description TEXT NOT NULL,
        created_at  TEXT NOT NULL,
        updated_at  TEXT
    )",
    "CREATE TABLE IF NOT EXISTS blog_categories (
        blog_id     INTEGER NOT NULL REFERENCES blogs(id) ON DELETE CASCADE,
        category_id INTEGER NOT NULL REFERENCES categories(id) ON DELETE CASCADE,
        PRIMARY KEY (blog_id, category_id)
    )",
    "CREATE TABLE IF NOT EXISTS comments (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        body       TEXT NOT NULL,
        path       TEXT NOT NULL DEFAULT '',
        author_id  INTEGER REFERENCES accounts(id) ON DELETE SET NULL,
        blog_id    INTEGER NOT NULL REFERENCES blogs(id) ON DELETE CASCADE,
        parent_id  INTEGER REFERENCES comments(id) ON DELETE CASCADE,
        created_at TEXT NOT NULL,
        updated_at TEXT,
        thread_at  TEXT NOT NULL
    )",
    "CREATE INDEX IF NOT EXISTS idx_comments_path ON comments(path)",
    "CREATE INDEX IF NOT EXISTS idx_comments_blog ON comments(blog_id)",
];

pub async fn setup(pool: &SqlitePool) -> Result<()> {
    for statement in STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(storage_err)?;
    }
    Ok(())
}
