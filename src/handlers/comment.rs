use crate::config::database::with_timeout;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::post::AuthorSummary;
use crate::middleware::AuthUser;
use crate::models::{CommentModel, UserModel};
use crate::response::ApiResponse;
use crate::services::comment::CommentService;
use axum::{http::StatusCode, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateCommentRequest {
    /// Comment body (1-10000 characters)
    #[validate(length(min = 1, max = 10000))]
    pub body: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateCommentRequest {
    /// Comment body (1-10000 characters)
    #[validate(length(min = 1, max = 10000))]
    pub body: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CommentResponse {
    pub id: i32,
    pub post_id: i32,
    pub user_id: i32,
    pub body: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSummary>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<CommentModel> for CommentResponse {
    fn from(c: CommentModel) -> Self {
        Self {
            id: c.id,
            post_id: c.post_id,
            user_id: c.user_id,
            body: c.body,
            author: None,
            created_at: c.created_at.to_string(),
            updated_at: c.updated_at.to_string(),
        }
    }
}

impl CommentResponse {
    fn with_author(c: CommentModel, author: Option<UserModel>) -> Self {
        Self {
            author: author.map(AuthorSummary::from),
            ..Self::from(c)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}/comments",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Comments on the post, newest first", body = Vec<CommentResponse>),
    ),
    tag = "comments"
)]
pub async fn list_comments(
    Extension(db): Extension<DatabaseConnection>,
    AppPath(post_id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    let service = CommentService::new(db);
    let comments = with_timeout(service.list_by_post(post_id)).await?;

    let items: Vec<CommentResponse> = comments
        .into_iter()
        .map(|(comment, author)| CommentResponse::with_author(comment, author))
        .collect();

    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/comments",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = CreateCommentRequest,
    responses(
        (status = 201, description = "Comment created", body = CommentResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn create_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(post_id): AppPath<i32>,
    AppJson(payload): AppJson<CreateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = CommentService::new(db);
    let comment =
        with_timeout(service.create(post_id, auth_user.user_id, &payload.body)).await?;

    Ok((
        StatusCode::CREATED,
        ApiResponse::ok(CommentResponse::from(comment)),
    ))
}

#[utoipa::path(
    put,
    path = "/api/comments/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    request_body = UpdateCommentRequest,
    responses(
        (status = 200, description = "Comment updated", body = CommentResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn update_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateCommentRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = CommentService::new(db);
    let comment = with_timeout(service.update(id, auth_user.user_id, &payload.body)).await?;

    Ok(ApiResponse::ok(CommentResponse::from(comment)))
}

#[utoipa::path(
    delete,
    path = "/api/comments/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Comment ID")),
    responses(
        (status = 200, description = "Comment deleted", body = String),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Comment not found", body = AppError),
    ),
    tag = "comments"
)]
pub async fn delete_comment(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    let service = CommentService::new(db);
    with_timeout(service.delete(id, auth_user.user_id)).await?;

    Ok(ApiResponse::ok("Comment deleted"))
}
