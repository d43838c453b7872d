use crate::{
    error::{AppError, AppResult},
    models::{user, User, UserModel},
    services::ownership::ensure_owned,
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

pub struct UserService {
    db: DatabaseConnection,
}

impl UserService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<UserModel> {
        User::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Rename a user; only the account holder may do so.
    pub async fn update_username(
        &self,
        id: i32,
        caller_id: i32,
        username: &str,
    ) -> AppResult<UserModel> {
        let existing = self.get_by_id(id).await?;
        ensure_owned(&existing, caller_id)?;

        if existing.username == username {
            return Ok(existing);
        }

        let taken = User::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await?
            .is_some();
        if taken {
            return Err(username_taken());
        }

        let now = chrono::Utc::now().naive_utc();

        let mut active: user::ActiveModel = existing.into();
        active.username = sea_orm::ActiveValue::Set(username.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);

        active.update(&self.db).await.map_err(|e| {
            let err = AppError::from(e);
            if err.is_unique_violation() {
                username_taken()
            } else {
                err
            }
        })
    }
}

fn username_taken() -> AppError {
    AppError::Conflict("Username already taken".to_string())
}
