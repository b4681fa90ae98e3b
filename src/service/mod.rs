//! Service layer
//!
//! Contains business logic separated from HTTP handlers.
//! Services orchestrate credential-store and idea-store operations.

mod auth;
mod idea;

pub use auth::{AuthService, FieldError, validate_registration};
pub use idea::{IdeaService, PopulatedComment, PopulatedIdea};
