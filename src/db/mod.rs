// SPDX-License-Identifier: MIT

//! Typed store gateway over SQLite.
//!
//! Provides per-entity CRUD for:
//! - Users (accounts and reset epochs)
//! - Posts
//! - Comments
//! - Edges (follow/like relationships)
//! - Media (opaque blobs)
//!
//! "No row" is reported as `None`, never as an error; callers decide which
//! domain error a missing row becomes.

use crate::error::AppError;
use crate::models::{Comment, Edge, EdgeKind, Media, Post, User};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

const SCHEMA: &[&str] = &[
    "CREATE TABLE IF NOT EXISTS users (
        id TEXT PRIMARY KEY,
        username TEXT NOT NULL UNIQUE,
        display_name TEXT NOT NULL,
        password TEXT NOT NULL,
        email TEXT NOT NULL,
        profile_background TEXT,
        profile_picture TEXT,
        last_token_reset INTEGER NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS posts (
        id TEXT PRIMARY KEY,
        author TEXT NOT NULL REFERENCES users(id),
        media TEXT NOT NULL,
        created INTEGER NOT NULL,
        expires INTEGER,
        description TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS comments (
        id TEXT PRIMARY KEY,
        text TEXT NOT NULL,
        author TEXT NOT NULL REFERENCES users(id),
        parent TEXT NOT NULL REFERENCES posts(id)
    )",
    // No uniqueness constraint on (source, target, kind): duplicate edges
    // are accepted.
    "CREATE TABLE IF NOT EXISTS edges (
        id TEXT PRIMARY KEY,
        source TEXT NOT NULL REFERENCES users(id),
        target TEXT NOT NULL REFERENCES users(id),
        kind TEXT NOT NULL
    )",
    "CREATE TABLE IF NOT EXISTS media (
        id TEXT PRIMARY KEY,
        data BLOB NOT NULL,
        mime_type TEXT NOT NULL
    )",
];

/// SQLite database client.
#[derive(Clone)]
pub struct Db {
    pool: SqlitePool,
}

impl Db {
    /// Open a connection pool and create the schema if needed.
    ///
    /// For `sqlite::memory:` the pool is pinned to a single connection so
    /// every caller sees the same database.
    pub async fn connect(url: &str) -> Result<Self, AppError> {
        let options = SqliteConnectOptions::from_str(url)
            .map_err(|e| AppError::Database(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        let mut pool_options = SqlitePoolOptions::new();
        if url.contains(":memory:") {
            pool_options = pool_options
                .max_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| AppError::Database(format!("Failed to open database: {}", e)))?;

        for statement in SCHEMA {
            sqlx::query(statement).execute(&pool).await?;
        }

        tracing::info!(url, "Connected to database");

        Ok(Self { pool })
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Insert a new user row.
    pub async fn create_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO users (id, username, display_name, password, email, \
             profile_background, profile_picture, last_token_reset) \
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.display_name)
        .bind(&user.password)
        .bind(&user.email)
        .bind(&user.profile_background)
        .bind(&user.profile_picture)
        .bind(user.last_token_reset)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_user_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    pub async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ?")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Look up a user by credential pair.
    ///
    /// Cleartext comparison, matching how the credential is stored.
    pub async fn find_user_by_credentials(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, AppError> {
        let user =
            sqlx::query_as::<_, User>("SELECT * FROM users WHERE username = ? AND password = ?")
                .bind(username)
                .bind(password)
                .fetch_optional(&self.pool)
                .await?;
        Ok(user)
    }

    /// Bump the user's reset epoch, revoking all previously issued tokens.
    pub async fn set_last_token_reset(&self, id: &str, at: i64) -> Result<(), AppError> {
        sqlx::query("UPDATE users SET last_token_reset = ? WHERE id = ?")
            .bind(at)
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Patch profile fields; `None` leaves the stored value unchanged.
    pub async fn update_user_profile(
        &self,
        id: &str,
        display_name: Option<&str>,
        email: Option<&str>,
        profile_background: Option<&str>,
        profile_picture: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            "UPDATE users SET \
             display_name = COALESCE(?, display_name), \
             email = COALESCE(?, email), \
             profile_background = COALESCE(?, profile_background), \
             profile_picture = COALESCE(?, profile_picture) \
             WHERE id = ?",
        )
        .bind(display_name)
        .bind(email)
        .bind(profile_background)
        .bind(profile_picture)
        .bind(id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn count_users(&self) -> Result<i64, AppError> {
        let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.0)
    }

    // ─── Post Operations ─────────────────────────────────────────

    pub async fn create_post(&self, post: &Post) -> Result<(), AppError> {
        sqlx::query(
            "INSERT INTO posts (id, author, media, created, expires, description) \
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(&post.id)
        .bind(&post.author)
        .bind(&post.media)
        .bind(post.created)
        .bind(post.expires)
        .bind(&post.description)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn find_post_by_id(&self, id: &str) -> Result<Option<Post>, AppError> {
        let post = sqlx::query_as::<_, Post>("SELECT * FROM posts WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(post)
    }

    /// Fetch posts by any of the given authors, in insertion order.
    ///
    /// Ordering for presentation is the feed assembler's job; insertion order
    /// here keeps its tie-breaking reproducible.
    pub async fn find_posts_by_authors(&self, authors: &[String]) -> Result<Vec<Post>, AppError> {
        if authors.is_empty() {
            return Ok(Vec::new());
        }

        let placeholders = vec!["?"; authors.len()].join(", ");
        let sql = format!(
            "SELECT * FROM posts WHERE author IN ({}) ORDER BY rowid",
            placeholders
        );

        let mut query = sqlx::query_as::<_, Post>(&sql);
        for author in authors {
            query = query.bind(author);
        }

        let posts = query.fetch_all(&self.pool).await?;
        Ok(posts)
    }

    // ─── Comment Operations ──────────────────────────────────────

    pub async fn create_comment(&self, comment: &Comment) -> Result<(), AppError> {
        sqlx::query("INSERT INTO comments (id, text, author, parent) VALUES (?, ?, ?, ?)")
            .bind(&comment.id)
            .bind(&comment.text)
            .bind(&comment.author)
            .bind(&comment.parent)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_comments_by_parent(&self, parent: &str) -> Result<Vec<Comment>, AppError> {
        let comments =
            sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE parent = ? ORDER BY rowid")
                .bind(parent)
                .fetch_all(&self.pool)
                .await?;
        Ok(comments)
    }

    // ─── Edge Operations ─────────────────────────────────────────

    pub async fn create_edge(&self, edge: &Edge) -> Result<(), AppError> {
        sqlx::query("INSERT INTO edges (id, source, target, kind) VALUES (?, ?, ?, ?)")
            .bind(&edge.id)
            .bind(&edge.source)
            .bind(&edge.target)
            .bind(edge.kind)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_edges_by_source(
        &self,
        source: &str,
        kind: EdgeKind,
    ) -> Result<Vec<Edge>, AppError> {
        let edges = sqlx::query_as::<_, Edge>(
            "SELECT * FROM edges WHERE source = ? AND kind = ? ORDER BY rowid",
        )
        .bind(source)
        .bind(kind)
        .fetch_all(&self.pool)
        .await?;
        Ok(edges)
    }

    // ─── Media Operations ────────────────────────────────────────

    pub async fn create_media(&self, media: &Media) -> Result<(), AppError> {
        sqlx::query("INSERT INTO media (id, data, mime_type) VALUES (?, ?, ?)")
            .bind(&media.id)
            .bind(&media.data)
            .bind(&media.mime_type)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn find_media_by_id(&self, id: &str) -> Result<Option<Media>, AppError> {
        let media = sqlx::query_as::<_, Media>("SELECT * FROM media WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(media)
    }
}
