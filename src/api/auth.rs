//! Auth endpoints

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::metrics::{HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};
use crate::service::AuthService;

use super::converters::{to_auth_response, to_user_response};
use super::dto::{AuthResponse, UserResponse};

/// Registration request
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

/// Login request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    #[serde(default)]
    pub email_or_username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

fn build_auth_service(state: &AppState) -> AuthService {
    AuthService::new(
        state.db.clone(),
        state.config.auth.token_secret.clone(),
        state.config.auth.token_max_age,
    )
}

/// POST /auth/register
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/auth/register"])
        .start_timer();

    let auth_service = build_auth_service(&state);
    let (user, token) = auth_service
        .register(
            req.username.as_deref().unwrap_or(""),
            req.email.as_deref().unwrap_or(""),
            req.password.as_deref().unwrap_or(""),
        )
        .await?;

    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/auth/register", "201"])
        .inc();

    Ok((
        StatusCode::CREATED,
        Json(to_auth_response(user, token, "User registered successfully")),
    ))
}

/// POST /auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, AppError> {
    let auth_service = build_auth_service(&state);
    let (user, token) = auth_service
        .login(
            req.email_or_username.as_deref().unwrap_or(""),
            req.password.as_deref().unwrap_or(""),
        )
        .await?;

    Ok(Json(to_auth_response(user, token, "Login successful")))
}

/// GET /auth/me
///
/// Re-fetches the user so the response reflects fresh data even though
/// the extractor already resolved the row.
pub async fn me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<UserResponse>, AppError> {
    let auth_service = build_auth_service(&state);
    let profile = auth_service.get_profile(&user.id).await?;

    Ok(Json(to_user_response(profile)))
}

/// Create auth router
///
/// Registration and login are public; the profile endpoint enforces
/// authentication through the CurrentUser extractor.
pub fn auth_router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/me", get(me))
}
