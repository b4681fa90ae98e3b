//! Authentication middleware
//!
//! Protects routes that require authentication.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, State},
    http::{HeaderMap, Request, request::Parts},
    middleware::Next,
    response::Response,
};

use super::token::verify_access_token;
use crate::AppState;
use crate::error::AppError;

/// The authenticated user attached to a request
///
/// Resolved from the bearer token at the start of every protected
/// request, so a token for a vanished user never reaches a handler.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: String,
    pub username: String,
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(ToOwned::to_owned)
}

async fn authenticate_token(token: &str, state: &AppState) -> Result<AuthUser, AppError> {
    let decoded = verify_access_token(token, &state.config.auth.token_secret)?;

    // The token may outlive the user record it references.
    let user = state
        .db
        .get_user(&decoded.user_id)
        .await?
        .ok_or(AppError::Unauthorized)?;

    Ok(AuthUser {
        id: user.id,
        username: user.username,
    })
}

/// Middleware to require authentication
///
/// Extracts and verifies the bearer token from the Authorization header.
/// Adds AuthUser to request extensions if valid.
///
/// # Usage
/// ```ignore
/// let protected_routes = Router::new()
///     .route("/ideas", ...)
///     .layer(middleware::from_fn_with_state(state, require_auth));
/// ```
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request<axum::body::Body>,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(request.headers()).ok_or(AppError::Unauthorized)?;

    // Verify token and resolve the user
    let user = authenticate_token(&token, &state).await?;

    // Add user to request extensions
    request.extensions_mut().insert(user);

    // Continue to next handler
    Ok(next.run(request).await)
}

/// Extractor for the current authenticated user
///
/// Use in handlers to get the requesting user.
///
/// # Usage
/// ```ignore
/// async fn handler(
///     CurrentUser(user): CurrentUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {}", user.username)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub AuthUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    /// Extract current user from request
    ///
    /// Falls back to verifying the bearer token directly when the route
    /// is not behind the `require_auth` layer.
    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        if let Some(user) = parts.extensions.get::<AuthUser>().cloned() {
            return Ok(CurrentUser(user));
        }

        let state = AppState::from_ref(state);
        let token = extract_bearer_token(&parts.headers).ok_or(AppError::Unauthorized)?;
        let user = authenticate_token(&token, &state).await?;
        parts.extensions.insert(user.clone());

        Ok(CurrentUser(user))
    }
}
