//! Idea service
//!
//! Handles the idea aggregate: CRUD, like toggling, and comment
//! appends, with author/comment-author population for responses.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;

use crate::data::{Comment, Database, EntityId, Idea};
use crate::error::AppError;
use crate::metrics::IDEAS_TOTAL;

/// An idea with its related data resolved for presentation
#[derive(Debug, Clone)]
pub struct PopulatedIdea {
    pub idea: Idea,
    pub author_username: String,
    /// User ids in like order
    pub likes: Vec<String>,
    /// In append order
    pub comments: Vec<PopulatedComment>,
}

/// A comment with its author's username resolved
#[derive(Debug, Clone)]
pub struct PopulatedComment {
    pub comment: Comment,
    pub author_username: String,
}

fn idea_not_found() -> AppError {
    AppError::NotFound("Idea not found".to_string())
}

/// Idea service
pub struct IdeaService {
    db: Arc<Database>,
}

impl IdeaService {
    /// Create new idea service
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// All ideas, newest first, fully populated
    pub async fn list(&self) -> Result<Vec<PopulatedIdea>, AppError> {
        let ideas = self.db.list_ideas().await?;
        self.populate(ideas).await
    }

    /// Get a single idea by id, fully populated
    ///
    /// A malformed id matches no row and reports the same NotFound as a
    /// missing one.
    pub async fn get(&self, id: &str) -> Result<PopulatedIdea, AppError> {
        let idea = self.db.get_idea(id).await?.ok_or_else(idea_not_found)?;
        let mut populated = self.populate(vec![idea]).await?;
        Ok(populated.remove(0))
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Create a new idea
    ///
    /// Media URLs are stored verbatim and are immutable afterwards.
    pub async fn create(
        &self,
        author_id: &str,
        text: &str,
        image_url: Option<String>,
        video_url: Option<String>,
    ) -> Result<PopulatedIdea, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("Idea text is required".to_string()));
        }

        let now = Utc::now();
        let idea = Idea {
            id: EntityId::new().0,
            author_id: author_id.to_string(),
            text: text.to_string(),
            image_url,
            video_url,
            created_at: now,
            updated_at: now,
        };
        self.db.insert_idea(&idea).await?;
        IDEAS_TOTAL.inc();

        tracing::info!(idea_id = %idea.id, author_id = %idea.author_id, "Idea created");

        self.get(&idea.id).await
    }

    /// Replace an idea's text
    ///
    /// Only the owner may update. Text is replaced only when a non-empty
    /// value is provided; media URLs cannot be changed here.
    pub async fn update(
        &self,
        idea_id: &str,
        requester_id: &str,
        new_text: Option<String>,
    ) -> Result<PopulatedIdea, AppError> {
        let idea = self.db.get_idea(idea_id).await?.ok_or_else(idea_not_found)?;

        if idea.author_id != requester_id {
            return Err(AppError::Forbidden(
                "User not authorized to update this idea".to_string(),
            ));
        }

        if let Some(text) = new_text.filter(|t| !t.trim().is_empty()) {
            self.db.update_idea_text(idea_id, &text, Utc::now()).await?;
        }

        self.get(idea_id).await
    }

    /// Delete an idea, cascading to its likes and comments
    pub async fn delete(&self, idea_id: &str, requester_id: &str) -> Result<(), AppError> {
        let idea = self.db.get_idea(idea_id).await?.ok_or_else(idea_not_found)?;

        if idea.author_id != requester_id {
            return Err(AppError::Forbidden(
                "User not authorized to delete this idea".to_string(),
            ));
        }

        self.db.delete_idea(idea_id).await?;
        IDEAS_TOTAL.dec();

        tracing::info!(idea_id = %idea_id, "Idea deleted");

        Ok(())
    }

    /// Toggle the requester's like on an idea
    ///
    /// A single combined operation: removes the like when present,
    /// inserts it otherwise. Toggling twice restores the original set.
    pub async fn toggle_like(
        &self,
        idea_id: &str,
        requester_id: &str,
    ) -> Result<PopulatedIdea, AppError> {
        if self.db.get_idea(idea_id).await?.is_none() {
            return Err(idea_not_found());
        }

        let now = Utc::now();
        if self.db.is_liked(idea_id, requester_id).await? {
            self.db.delete_like(idea_id, requester_id, now).await?;
        } else {
            self.db.insert_like(idea_id, requester_id, now).await?;
        }

        self.get(idea_id).await
    }

    /// Append a comment to an idea
    pub async fn add_comment(
        &self,
        idea_id: &str,
        author_id: &str,
        text: &str,
    ) -> Result<PopulatedIdea, AppError> {
        if text.trim().is_empty() {
            return Err(AppError::Validation("Comment text is required".to_string()));
        }

        if self.db.get_idea(idea_id).await?.is_none() {
            return Err(idea_not_found());
        }

        let comment = Comment {
            id: EntityId::new().0,
            idea_id: idea_id.to_string(),
            author_id: author_id.to_string(),
            text: text.to_string(),
            created_at: Utc::now(),
        };
        self.db.insert_comment(&comment).await?;

        self.get(idea_id).await
    }

    // =========================================================================
    // Population
    // =========================================================================

    /// Attach likes, comments, and author usernames to a batch of ideas
    ///
    /// Child rows and usernames are fetched with batch queries, then
    /// grouped in memory, preserving the input idea order.
    async fn populate(&self, ideas: Vec<Idea>) -> Result<Vec<PopulatedIdea>, AppError> {
        let idea_ids: Vec<String> = ideas.iter().map(|idea| idea.id.clone()).collect();

        let likes = self.db.get_likes_for_ideas(&idea_ids).await?;
        let comments = self.db.get_comments_for_ideas(&idea_ids).await?;

        let mut author_ids: Vec<String> = ideas
            .iter()
            .map(|idea| idea.author_id.clone())
            .chain(comments.iter().map(|comment| comment.author_id.clone()))
            .collect();
        author_ids.sort();
        author_ids.dedup();
        let usernames = self.db.get_usernames(&author_ids).await?;

        let mut likes_by_idea: HashMap<String, Vec<String>> = HashMap::new();
        for (idea_id, user_id) in likes {
            likes_by_idea.entry(idea_id).or_default().push(user_id);
        }

        let mut comments_by_idea: HashMap<String, Vec<Comment>> = HashMap::new();
        for comment in comments {
            comments_by_idea
                .entry(comment.idea_id.clone())
                .or_default()
                .push(comment);
        }

        let resolve = |id: &str| usernames.get(id).cloned().unwrap_or_default();

        Ok(ideas
            .into_iter()
            .map(|idea| {
                let author_username = resolve(&idea.author_id);
                let likes = likes_by_idea.remove(&idea.id).unwrap_or_default();
                let comments = comments_by_idea
                    .remove(&idea.id)
                    .unwrap_or_default()
                    .into_iter()
                    .map(|comment| {
                        let author_username = resolve(&comment.author_id);
                        PopulatedComment {
                            comment,
                            author_username,
                        }
                    })
                    .collect();

                PopulatedIdea {
                    idea,
                    author_username,
                    likes,
                    comments,
                }
            })
            .collect())
    }
}
