//! API response DTOs
//!
//! Data Transfer Objects for the JSON wire format. Field names are
//! camelCase to match the original API consumed by the frontend.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Register/login response: user summary plus a fresh bearer token
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub token: String,
    pub message: String,
}

/// Profile response (never carries the password hash)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// Resolved author reference embedded in idea and comment responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthorResponse {
    pub id: String,
    pub username: String,
}

/// Comment response, embedded in idea responses
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub author: AuthorResponse,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Fully populated idea response
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdeaResponse {
    pub id: String,
    pub author: AuthorResponse,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
    /// Ids of users who liked the idea
    pub likes: Vec<String>,
    /// In append order
    pub comments: Vec<CommentResponse>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Plain message body for operations with no entity payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}
