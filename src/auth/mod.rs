//! Bearer token authentication
//!
//! Handles:
//! - Token issuing and verification
//! - Authentication middleware

mod middleware;
pub mod token;

pub use middleware::{AuthUser, CurrentUser, require_auth};
pub use token::{AccessToken, issue_access_token, verify_access_token};
