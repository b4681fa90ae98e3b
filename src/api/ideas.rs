//! Idea endpoints

use axum::{
    Router,
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post, put},
};
use serde::Deserialize;

use crate::AppState;
use crate::auth::CurrentUser;
use crate::error::AppError;
use crate::metrics::{DB_QUERIES_TOTAL, HTTP_REQUEST_DURATION_SECONDS, HTTP_REQUESTS_TOTAL};
use crate::service::IdeaService;

use super::converters::to_idea_response;
use super::dto::{IdeaResponse, MessageResponse};

/// Idea creation request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateIdeaRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
}

/// Idea update request; only the text is editable
#[derive(Debug, Deserialize)]
pub struct UpdateIdeaRequest {
    #[serde(default)]
    pub text: Option<String>,
}

/// Comment creation request
#[derive(Debug, Deserialize)]
pub struct AddCommentRequest {
    #[serde(default)]
    pub text: Option<String>,
}

fn build_idea_service(state: &AppState) -> IdeaService {
    IdeaService::new(state.db.clone())
}

/// GET /ideas
pub async fn list_ideas(State(state): State<AppState>) -> Result<Json<Vec<IdeaResponse>>, AppError> {
    let idea_service = build_idea_service(&state);
    let ideas = idea_service.list().await?;
    DB_QUERIES_TOTAL
        .with_label_values(&["SELECT", "ideas"])
        .inc();

    Ok(Json(ideas.into_iter().map(to_idea_response).collect()))
}

/// GET /ideas/:id
pub async fn get_idea(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<IdeaResponse>, AppError> {
    let idea_service = build_idea_service(&state);
    let idea = idea_service.get(&id).await?;

    Ok(Json(to_idea_response(idea)))
}

/// POST /ideas
pub async fn create_idea(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateIdeaRequest>,
) -> Result<(StatusCode, Json<IdeaResponse>), AppError> {
    let _timer = HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&["POST", "/ideas"])
        .start_timer();

    let idea_service = build_idea_service(&state);
    let idea = idea_service
        .create(
            &user.id,
            req.text.as_deref().unwrap_or(""),
            req.image_url,
            req.video_url,
        )
        .await?;

    DB_QUERIES_TOTAL
        .with_label_values(&["INSERT", "ideas"])
        .inc();
    HTTP_REQUESTS_TOTAL
        .with_label_values(&["POST", "/ideas", "201"])
        .inc();

    Ok((StatusCode::CREATED, Json(to_idea_response(idea))))
}

/// PUT /ideas/:id
pub async fn update_idea(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateIdeaRequest>,
) -> Result<Json<IdeaResponse>, AppError> {
    let idea_service = build_idea_service(&state);
    let idea = idea_service.update(&id, &user.id, req.text).await?;

    Ok(Json(to_idea_response(idea)))
}

/// DELETE /ideas/:id
pub async fn delete_idea(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, AppError> {
    let idea_service = build_idea_service(&state);
    idea_service.delete(&id, &user.id).await?;

    Ok(Json(MessageResponse {
        message: "Idea removed successfully".to_string(),
    }))
}

/// PUT /ideas/:id/like
pub async fn toggle_like(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<IdeaResponse>, AppError> {
    let idea_service = build_idea_service(&state);
    let idea = idea_service.toggle_like(&id, &user.id).await?;

    Ok(Json(to_idea_response(idea)))
}

/// POST /ideas/:id/comments
pub async fn add_comment(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<AddCommentRequest>,
) -> Result<(StatusCode, Json<IdeaResponse>), AppError> {
    let idea_service = build_idea_service(&state);
    let idea = idea_service
        .add_comment(&id, &user.id, req.text.as_deref().unwrap_or(""))
        .await?;

    Ok((StatusCode::CREATED, Json(to_idea_response(idea))))
}

/// Create ideas router
///
/// Routes are split into public and authenticated endpoints.
pub fn ideas_router() -> Router<AppState> {
    // Public endpoints (no authentication required)
    let public_routes = Router::new()
        .route("/", get(list_ideas))
        .route("/:id", get(get_idea));

    // Authenticated endpoints (require valid token)
    let authenticated_routes = Router::new()
        .route("/", post(create_idea))
        .route("/:id", put(update_idea))
        .route("/:id", delete(delete_idea))
        .route("/:id/like", put(toggle_like))
        .route("/:id/comments", post(add_comment));

    // Merge public and authenticated routes
    // Note: Authentication is enforced by using the CurrentUser extractor in handlers
    public_routes.merge(authenticated_routes)
}
