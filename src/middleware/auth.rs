use crate::{
    config::database::with_timeout,
    error::AppError,
    models::User,
    utils::jwt::{decode_jwt, is_access_token},
};
use axum::{
    extract::{FromRequestParts, Request},
    http::HeaderMap,
    middleware::Next,
    response::Response,
    Extension,
};
use sea_orm::{DatabaseConnection, EntityTrait};

/// Verified caller identity, inserted by [`auth_middleware`].
#[derive(Debug, Clone, Copy)]
pub struct AuthUser {
    pub user_id: i32,
}

/// JWT authentication middleware
///
/// Verifies the bearer token from the Authorization header, checks the
/// user still exists, and adds the caller to request extensions.
pub async fn auth_middleware(
    Extension(db): Extension<DatabaseConnection>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(&headers).ok_or(AppError::Unauthorized)?;

    let claims = decode_jwt(&token).map_err(|_| AppError::Unauthorized)?;
    if !is_access_token(&claims) {
        return Err(AppError::Unauthorized);
    }

    let user_id = claims.user_id().ok_or(AppError::Unauthorized)?;

    ensure_user_exists(&db, user_id).await?;

    request.extensions_mut().insert(AuthUser { user_id });

    Ok(next.run(request).await)
}

/// A token outlives its user when the account is deleted.
async fn ensure_user_exists(db: &DatabaseConnection, user_id: i32) -> Result<(), AppError> {
    with_timeout(async {
        User::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or(AppError::Unauthorized)?;
        Ok::<_, AppError>(())
    })
    .await
}

fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let auth_header = headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;

    let token = auth_header.strip_prefix("Bearer ")?.trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}
