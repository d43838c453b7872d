use crate::config::database::with_timeout;
use crate::error::{AppError, AppResult};
use crate::extract::{AppJson, AppPath};
use crate::handlers::auth::UserResponse;
use crate::handlers::post::PostResponse;
use crate::middleware::AuthUser;
use crate::models::UserModel;
use crate::response::ApiResponse;
use crate::services::{follow::FollowService, post::PostService, user::UserService};
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

/// User fields visible to anyone; email stays private.
#[derive(Debug, Serialize, ToSchema)]
pub struct PublicUserResponse {
    pub id: i32,
    pub username: String,
    pub created_at: String,
}

impl From<UserModel> for PublicUserResponse {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            username: user.username,
            created_at: user.created_at.to_string(),
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserProfileResponse {
    pub user: PublicUserResponse,
    /// Posts by this user, newest first
    pub posts: Vec<PostResponse>,
    pub follower_count: u64,
    pub following_count: u64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct UpdateUserRequest {
    /// New username (3-50 characters)
    #[validate(length(min = 3, max = 50))]
    pub username: String,
}

#[utoipa::path(
    get,
    path = "/api/users/{id}",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "User profile", body = UserProfileResponse),
        (status = 404, description = "User not found", body = AppError),
    ),
    tag = "users"
)]
pub async fn get_user_profile(
    Extension(db): Extension<DatabaseConnection>,
    AppPath(id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    let user_service = UserService::new(db.clone());
    let post_service = PostService::new(db.clone());
    let follow_service = FollowService::new(db);

    let profile = with_timeout(async {
        let user = user_service.get_by_id(id).await?;
        let posts = post_service.list_by_user(id).await?;
        let follower_count = follow_service.count_followers(id).await?;
        let following_count = follow_service.count_following(id).await?;

        Ok::<_, AppError>(UserProfileResponse {
            user: PublicUserResponse::from(user),
            posts: posts.into_iter().map(PostResponse::from).collect(),
            follower_count,
            following_count,
        })
    })
    .await?;

    Ok(ApiResponse::ok(profile))
}

#[utoipa::path(
    put,
    path = "/api/users/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserResponse),
        (status = 400, description = "Validation error", body = AppError),
        (status = 403, description = "Not your account", body = AppError),
        (status = 404, description = "User not found", body = AppError),
        (status = 409, description = "Username already taken", body = AppError),
    ),
    tag = "users"
)]
pub async fn update_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<UpdateUserRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = UserService::new(db);
    let user = with_timeout(service.update_username(id, auth_user.user_id, &payload.username))
        .await?;

    Ok(ApiResponse::ok(UserResponse::from(user)))
}
