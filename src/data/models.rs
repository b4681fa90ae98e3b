//! Data models
//!
//! Rust structs representing database entities.
//! All models use ULID for IDs and chrono for timestamps.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// ID Types
// =============================================================================

/// Entity ID wrapper (ULID format, 26 characters)
///
/// Example: "01ARZ3NDEKTSV4RRFFQ69G5FAV"
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub String);

impl EntityId {
    /// Generate a new ULID
    pub fn new() -> Self {
        Self(ulid::Ulid::new().to_string())
    }

    /// Create from existing string
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user, including the password hash
///
/// This is the internal row representation. The hash never leaves the
/// service layer; API responses are built from [`UserSummary`].
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct User {
    pub id: String,
    pub username: String,
    /// Lowercased, trimmed
    pub email: String,
    /// Argon2 PHC string
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// User representation safe for API responses (no password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserSummary {
    /// Strip the password hash so it cannot end up in a response.
    fn from(user: User) -> Self {
        UserSummary {
            id: user.id,
            username: user.username,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

// =============================================================================
// Idea
// =============================================================================

/// A user-authored idea post
///
/// Likes and comments live in their own tables and are attached by the
/// service layer when building populated views.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Idea {
    pub id: String,
    /// Owner; immutable after creation
    pub author_id: String,
    pub text: String,
    pub image_url: Option<String>,
    pub video_url: Option<String>,
    pub created_at: DateTime<Utc>,
    /// Refreshed on any mutation (text edit, like toggle, comment append)
    pub updated_at: DateTime<Utc>,
}

/// A comment embedded in an idea
///
/// Owned by its idea: created and deleted only through the parent.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Comment {
    pub id: String,
    pub idea_id: String,
    pub author_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
}
