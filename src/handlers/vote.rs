use crate::config::database::with_timeout;
use crate::error::AppResult;
use crate::extract::{AppJson, AppPath};
use crate::middleware::AuthUser;
use crate::response::ApiResponse;
use crate::services::vote::{VoteChange, VoteDirection, VoteOutcome, VoteService};
use axum::{response::IntoResponse, Extension};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Deserialize, ToSchema)]
pub struct VoteRequest {
    /// 1 for upvote, -1 for downvote; repeating a vote removes it
    #[serde(alias = "vote_type")]
    pub direction: i16,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VoteResponse {
    pub post_id: i32,
    pub outcome: VoteOutcome,
    /// Caller's vote after this request: -1, 0 or 1
    pub direction: i16,
    /// Caller's vote before this request
    pub previous: i16,
    pub upvotes: i32,
    pub downvotes: i32,
    pub score: i32,
}

impl From<VoteChange> for VoteResponse {
    fn from(change: VoteChange) -> Self {
        Self {
            post_id: change.post_id,
            outcome: change.outcome,
            direction: change.new_value,
            previous: change.old_value,
            upvotes: change.upvotes,
            downvotes: change.downvotes,
            score: change.upvotes - change.downvotes,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct VoteStateResponse {
    pub post_id: i32,
    /// -1, 0 or 1
    pub direction: i16,
}

#[utoipa::path(
    post,
    path = "/api/posts/{id}/vote",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    request_body = VoteRequest,
    responses(
        (status = 200, description = "Vote recorded, updated or removed", body = VoteResponse),
        (status = 400, description = "Direction must be 1 or -1", body = crate::error::AppError),
        (status = 401, description = "Unauthorized", body = crate::error::AppError),
        (status = 404, description = "Post not found", body = crate::error::AppError),
    ),
    tag = "votes"
)]
pub async fn vote_post(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
    AppJson(payload): AppJson<VoteRequest>,
) -> AppResult<impl IntoResponse> {
    let direction = VoteDirection::try_from(payload.direction)?;

    let service = VoteService::new(db);
    let change = with_timeout(service.apply_vote(auth_user.user_id, id, direction)).await?;

    Ok(ApiResponse::ok(VoteResponse::from(change)))
}

#[utoipa::path(
    get,
    path = "/api/posts/{id}/vote",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Caller's current vote", body = VoteStateResponse),
        (status = 404, description = "Post not found", body = crate::error::AppError),
    ),
    tag = "votes"
)]
pub async fn get_vote(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    AppPath(id): AppPath<i32>,
) -> AppResult<impl IntoResponse> {
    let service = VoteService::new(db);
    let direction = with_timeout(service.current_vote(auth_user.user_id, id)).await?;

    Ok(ApiResponse::ok(VoteStateResponse {
        post_id: id,
        direction,
    }))
}
