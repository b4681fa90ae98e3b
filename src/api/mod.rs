//! API layer
//!
//! HTTP handlers for:
//! - Auth endpoints (register, login, profile)
//! - Idea endpoints (CRUD, likes, comments)
//! - Metrics (Prometheus)

mod auth;
mod converters;
mod dto;
mod ideas;
pub mod metrics;

pub use converters::*;
pub use dto::*;

pub use auth::auth_router;
pub use ideas::ideas_router;
pub use metrics::metrics_router;
