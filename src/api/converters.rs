//! Model-to-DTO conversions
//!
//! Build wire-format responses from service-layer aggregates.

use crate::data::UserSummary;
use crate::service::{PopulatedComment, PopulatedIdea};

use super::dto::{AuthResponse, AuthorResponse, CommentResponse, IdeaResponse, UserResponse};

/// Build an auth response from a user summary and a fresh token
pub fn to_auth_response(user: UserSummary, token: String, message: &str) -> AuthResponse {
    AuthResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        token,
        message: message.to_string(),
    }
}

pub fn to_user_response(user: UserSummary) -> UserResponse {
    UserResponse {
        id: user.id,
        username: user.username,
        email: user.email,
        created_at: user.created_at,
    }
}

fn to_comment_response(populated: PopulatedComment) -> CommentResponse {
    CommentResponse {
        id: populated.comment.id,
        author: AuthorResponse {
            id: populated.comment.author_id,
            username: populated.author_username,
        },
        text: populated.comment.text,
        created_at: populated.comment.created_at,
    }
}

/// Build an idea response with author, likes, and comments attached
pub fn to_idea_response(populated: PopulatedIdea) -> IdeaResponse {
    IdeaResponse {
        id: populated.idea.id,
        author: AuthorResponse {
            id: populated.idea.author_id,
            username: populated.author_username,
        },
        text: populated.idea.text,
        image_url: populated.idea.image_url,
        video_url: populated.idea.video_url,
        likes: populated.likes,
        comments: populated
            .comments
            .into_iter()
            .map(to_comment_response)
            .collect(),
        created_at: populated.idea.created_at,
        updated_at: populated.idea.updated_at,
    }
}
