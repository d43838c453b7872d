use crate::config::database::with_timeout;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::middleware::AuthUser;
use crate::models::{PostModel, UserModel};
use crate::response::ApiResponse;
use crate::services::post::{PostChanges, PostService};
use axum::{http::StatusCode, response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreatePostRequest {
    /// Post title (1-200 characters)
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    /// Post body, empty when omitted
    #[serde(default)]
    pub body: String,
    /// Optional image URL
    #[validate(url)]
    pub image: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdatePostRequest {
    /// Post title (1-200 characters)
    #[validate(length(min = 1, max = 200))]
    pub title: Option<String>,
    /// Post body
    pub body: Option<String>,
    /// Image URL
    #[validate(url)]
    pub image: Option<String>,
}

/// Public view of a post or comment author.
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthorSummary {
    pub id: i32,
    pub username: String,
}

impl From<UserModel> for AuthorSummary {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PostResponse {
    /// Post ID
    pub id: i32,
    /// Author user ID
    pub user_id: i32,
    /// Post title
    pub title: String,
    /// Post body
    pub body: String,
    /// Image URL
    pub image: Option<String>,
    /// Upvote count
    pub upvotes: i32,
    /// Downvote count
    pub downvotes: i32,
    /// Upvotes minus downvotes
    pub score: i32,
    /// Author, when included
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<AuthorSummary>,
    /// Creation timestamp
    pub created_at: String,
    /// Last update timestamp
    pub updated_at: String,
}

impl From<PostModel> for PostResponse {
    fn from(p: PostModel) -> Self {
        Self {
            id: p.id,
            user_id: p.user_id,
            score: p.score(),
            title: p.title,
            body: p.body,
            image: p.image,
            upvotes: p.upvotes,
            downvotes: p.downvotes,
            author: None,
            created_at: p.created_at.to_string(),
            updated_at: p.updated_at.to_string(),
        }
    }
}

impl PostResponse {
    pub fn with_author(p: PostModel, author: Option<UserModel>) -> Self {
        Self {
            author: author.map(AuthorSummary::from),
            ..Self::from(p)
        }
    }
}

#[utoipa::path(
    get,
    path = "/api/posts",
    responses(
        (status = 200, description = "All posts, newest first", body = Vec<PostResponse>),
    ),
    tag = "posts"
)]
pub async fn list_posts(
    Extension(db): Extension<DatabaseConnection>,
) -> AppResult<impl IntoResponse> {
    let service = PostService::new(db);
    let posts = with_timeout(service.list_with_authors()).await?;

    let items: Vec<PostResponse> = posts
        .into_iter()
        .map(|(post, author)| PostResponse::with_author(post, author))
        .collect();

    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post details", body = PostResponse),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn get_post(
    Extension(db): Extension<DatabaseConnection>,
    AppPath(id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    let service = PostService::new(db);
    let (post, author) = with_timeout(service.get_with_author(id)).await?;

    Ok(ApiResponse::ok(PostResponse::with_author(post, author)))
}

#[utoipa::path(
    post,
    path = "/api/posts",
    security(("jwt_token" = [])),
    request_body = CreatePostRequest,
    responses(
        (status = 201, description = "Post created", body = PostResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
    ),
    tag = "posts"
)]
pub async fn create_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppJson(payload): AppJson<CreatePostRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = PostService::new(db);
    let post = with_timeout(service.create(
        auth_user.user_id,
        &payload.title,
        &payload.body,
        payload.image,
    ))
    .await?;

    Ok((StatusCode::CREATED, ApiResponse::ok(PostResponse::from(post))))
}

#[utoipa::path(
    put,
    path = "/api/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Post updated", body = PostResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn update_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdatePostRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let changes = PostChanges {
        title: payload.title,
        body: payload.body,
        image: payload.image,
    };

    let service = PostService::new(db);
    let post = with_timeout(service.update(id, auth_user.user_id, changes)).await?;

    Ok(ApiResponse::ok(PostResponse::from(post)))
}

#[utoipa::path(
    delete,
    path = "/api/posts/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Post deleted", body = String),
        (status = 401, description = "Unauthorized", body = AppError),
        (status = 403, description = "Not the author", body = AppError),
        (status = 404, description = "Post not found", body = AppError),
    ),
    tag = "posts"
)]
pub async fn delete_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    let service = PostService::new(db);
    with_timeout(service.delete(id, auth_user.user_id)).await?;

    Ok(ApiResponse::ok("Post deleted"))
}
