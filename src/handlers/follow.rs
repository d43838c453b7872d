use crate::config::database::with_timeout;
use crate::error::AppResult;
use crate::extract::AppPath;
use crate::handlers::user::PublicUserResponse;
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::follow::FollowService;
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct FollowResponse {
    pub following: bool,
}

#[utoipa::path(
    post,
    path = "/api/users/{id}/follow",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "User ID to follow")),
    responses(
        (status = 200, description = "Now following", body = FollowResponse),
        (status = 400, description = "Self-follow or already following", body = crate::error::AppError),
        (status = 404, description = "User not found", body = crate::error::AppError),
    ),
    tag = "follows"
)]
pub async fn follow_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(user_id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    let service = FollowService::new(db);
    with_timeout(service.follow(auth_user.user_id, user_id)).await?;
    Ok(ApiResponse::ok(FollowResponse { following: true }))
}

#[utoipa::path(
    delete,
    path = "/api/users/{id}/follow",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "User ID to unfollow")),
    responses(
        (status = 200, description = "No longer following", body = FollowResponse),
    ),
    tag = "follows"
)]
pub async fn unfollow_user(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(user_id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    let service = FollowService::new(db);
    let removed = with_timeout(service.unfollow(auth_user.user_id, user_id)).await?;
    let message = if removed {
        "Unfollowed"
    } else {
        "Was not following"
    };
    Ok(ApiResponse::with_message(
        FollowResponse { following: false },
        message,
    ))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/followers",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Followers, most recent first", body = Vec<PublicUserResponse>),
    ),
    tag = "follows"
)]
pub async fn list_followers(
    Extension(db): Extension<DatabaseConnection>,
    AppPath(user_id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    let service = FollowService::new(db);
    let users = with_timeout(service.list_followers(user_id)).await?;
    let items: Vec<PublicUserResponse> =
        users.into_iter().map(PublicUserResponse::from).collect();
    Ok(ApiResponse::ok(items))
}

#[utoipa::path(
    get,
    path = "/api/users/{id}/following",
    params(("id" = i32, Path, description = "User ID")),
    responses(
        (status = 200, description = "Followed users, most recent first", body = Vec<PublicUserResponse>),
    ),
    tag = "follows"
)]
pub async fn list_following(
    Extension(db): Extension<DatabaseConnection>,
    AppPath(user_id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    let service = FollowService::new(db);
    let users = with_timeout(service.list_following(user_id)).await?;
    let items: Vec<PublicUserResponse> =
        users.into_iter().map(PublicUserResponse::from).collect();
    Ok(ApiResponse::ok(items))
}
