//! SQLite database operations
//!
//! All database access goes through this module.

use chrono::{DateTime, Utc};
use sqlx::{Pool, QueryBuilder, Row, Sqlite, SqlitePool};
use std::collections::HashMap;
use std::path::Path;

use super::models::*;
use crate::error::AppError;

/// Database connection pool wrapper.
pub struct Database {
    pool: Pool<Sqlite>,
}

impl Database {
    // =========================================================================
    // Connection
    // =========================================================================

    /// Connect to SQLite database
    ///
    /// Creates the database file if it doesn't exist.
    /// Runs pending migrations automatically.
    ///
    /// # Arguments
    /// * `path` - Path to SQLite database file
    ///
    /// # Errors
    /// Returns error if connection or migration fails
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| AppError::Database(sqlx::Error::Io(e)))?;
        }

        // Create connection string
        let connection_string = format!("sqlite:{}?mode=rwc", path.display());

        // Create connection pool
        let pool = SqlitePool::connect(&connection_string).await?;

        // Run migrations
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Migration failed: {}", e);
                AppError::Internal(anyhow::anyhow!("Migration failed: {}", e))
            })?;

        tracing::info!("Database connected and migrated successfully");

        Ok(Self { pool })
    }

    // =========================================================================
    // Users
    // =========================================================================

    /// Insert a new user
    ///
    /// The UNIQUE constraints on username and email are the store-level
    /// backstop behind the service-level duplicate probe; a violation
    /// surfaces as a duplicate-user error, not a generic database error.
    pub async fn insert_user(&self, user: &User) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO users (id, username, email, password_hash, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.id)
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                AppError::Duplicate("User already exists.".to_string())
            }
            _ => AppError::Database(e),
        })?;

        Ok(())
    }

    /// Get user by id (hash included; callers must not serialize it)
    pub async fn get_user(&self, id: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find a user by login identifier
    ///
    /// Matches the email column against the lowercased identifier, or the
    /// username column against the identifier as given.
    pub async fn find_user_by_identifier(&self, identifier: &str) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? OR username = ?")
            .bind(identifier.trim().to_lowercase())
            .bind(identifier.trim())
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Find an existing user colliding with a registration attempt
    ///
    /// Returns the full row so the caller can report which field collided.
    pub async fn find_conflicting_user(
        &self,
        email: &str,
        username: &str,
    ) -> Result<Option<User>, AppError> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ? OR username = ?")
            .bind(email)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    /// Batch-resolve usernames for a set of user ids
    pub async fn get_usernames(&self, ids: &[String]) -> Result<HashMap<String, String>, AppError> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }

        let mut builder = QueryBuilder::new("SELECT id, username FROM users WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(")");

        let rows = builder.build().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("id"), row.get("username")))
            .collect())
    }

    pub async fn count_users(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Ideas
    // =========================================================================

    pub async fn insert_idea(&self, idea: &Idea) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO ideas (id, author_id, text, image_url, video_url, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&idea.id)
        .bind(&idea.author_id)
        .bind(&idea.text)
        .bind(&idea.image_url)
        .bind(&idea.video_url)
        .bind(idea.created_at)
        .bind(idea.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn get_idea(&self, id: &str) -> Result<Option<Idea>, AppError> {
        let idea = sqlx::query_as::<_, Idea>("SELECT * FROM ideas WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(idea)
    }

    /// All ideas, newest first (ULID ids break creation-time ties)
    pub async fn list_ideas(&self) -> Result<Vec<Idea>, AppError> {
        let ideas =
            sqlx::query_as::<_, Idea>("SELECT * FROM ideas ORDER BY created_at DESC, id DESC")
                .fetch_all(&self.pool)
                .await?;

        Ok(ideas)
    }

    /// Replace an idea's text and refresh its updated_at
    pub async fn update_idea_text(
        &self,
        id: &str,
        text: &str,
        updated_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        sqlx::query("UPDATE ideas SET text = ?, updated_at = ? WHERE id = ?")
            .bind(text)
            .bind(updated_at)
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Delete an idea and its owned likes and comments in one transaction
    pub async fn delete_idea(&self, id: &str) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM idea_comments WHERE idea_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM idea_likes WHERE idea_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("DELETE FROM ideas WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    pub async fn count_ideas(&self) -> Result<i64, AppError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM ideas")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    // =========================================================================
    // Likes
    // =========================================================================

    pub async fn is_liked(&self, idea_id: &str, user_id: &str) -> Result<bool, AppError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM idea_likes WHERE idea_id = ? AND user_id = ?",
        )
        .bind(idea_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count > 0)
    }

    /// Add a like and bump the idea's updated_at
    ///
    /// The (idea_id, user_id) primary key keeps the like set duplicate-free
    /// even under concurrent toggles.
    pub async fn insert_like(
        &self,
        idea_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "INSERT OR IGNORE INTO idea_likes (idea_id, user_id, created_at) VALUES (?, ?, ?)",
        )
        .bind(idea_id)
        .bind(user_id)
        .bind(now)
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE ideas SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(idea_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Remove a like and bump the idea's updated_at
    pub async fn delete_like(
        &self,
        idea_id: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM idea_likes WHERE idea_id = ? AND user_id = ?")
            .bind(idea_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE ideas SET updated_at = ? WHERE id = ?")
            .bind(now)
            .bind(idea_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// User ids that liked an idea, in like order
    pub async fn get_likes(&self, idea_id: &str) -> Result<Vec<String>, AppError> {
        let rows = sqlx::query_scalar::<_, String>(
            "SELECT user_id FROM idea_likes WHERE idea_id = ? ORDER BY created_at ASC",
        )
        .bind(idea_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// (idea_id, user_id) pairs for a batch of ideas
    pub async fn get_likes_for_ideas(
        &self,
        idea_ids: &[String],
    ) -> Result<Vec<(String, String)>, AppError> {
        if idea_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder =
            QueryBuilder::new("SELECT idea_id, user_id FROM idea_likes WHERE idea_id IN (");
        let mut separated = builder.separated(", ");
        for id in idea_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY created_at ASC");

        let rows = builder.build().fetch_all(&self.pool).await?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("idea_id"), row.get("user_id")))
            .collect())
    }

    // =========================================================================
    // Comments
    // =========================================================================

    /// Append a comment and bump the idea's updated_at
    pub async fn insert_comment(&self, comment: &Comment) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO idea_comments (id, idea_id, author_id, text, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&comment.id)
        .bind(&comment.idea_id)
        .bind(&comment.author_id)
        .bind(&comment.text)
        .bind(comment.created_at)
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE ideas SET updated_at = ? WHERE id = ?")
            .bind(comment.created_at)
            .bind(&comment.idea_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        Ok(())
    }

    /// Comments for an idea in append order
    pub async fn get_comments(&self, idea_id: &str) -> Result<Vec<Comment>, AppError> {
        let comments = sqlx::query_as::<_, Comment>(
            "SELECT * FROM idea_comments WHERE idea_id = ? ORDER BY created_at ASC, id ASC",
        )
        .bind(idea_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(comments)
    }

    /// Comments for a batch of ideas in append order
    pub async fn get_comments_for_ideas(
        &self,
        idea_ids: &[String],
    ) -> Result<Vec<Comment>, AppError> {
        if idea_ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = QueryBuilder::new("SELECT * FROM idea_comments WHERE idea_id IN (");
        let mut separated = builder.separated(", ");
        for id in idea_ids {
            separated.push_bind(id);
        }
        separated.push_unseparated(") ORDER BY created_at ASC, id ASC");

        let comments = builder
            .build_query_as::<Comment>()
            .fetch_all(&self.pool)
            .await?;

        Ok(comments)
    }
}
