use crate::{
    error::{AppError, AppResult},
    models::{follow, user, Follow, User, UserModel},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder,
};
use std::collections::HashMap;

pub struct FollowService {
    db: DatabaseConnection,
}

impl FollowService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn follow(&self, follower_id: i32, following_id: i32) -> AppResult<()> {
        if follower_id == following_id {
            return Err(AppError::Validation("Cannot follow yourself".to_string()));
        }

        // Verify target user exists
        User::find_by_id(following_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let existing = Follow::find()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(already_following());
        }

        let now = chrono::Utc::now().naive_utc();
        let model = follow::ActiveModel {
            follower_id: sea_orm::ActiveValue::Set(follower_id),
            following_id: sea_orm::ActiveValue::Set(following_id),
            created_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };
        model.insert(&self.db).await.map_err(|e| {
            let err = AppError::from(e);
            if err.is_unique_violation() {
                already_following()
            } else {
                err
            }
        })?;

        Ok(())
    }

    /// Returns true if an edge was removed.
    pub async fn unfollow(&self, follower_id: i32, following_id: i32) -> AppResult<bool> {
        let result = Follow::delete_many()
            .filter(follow::Column::FollowerId.eq(follower_id))
            .filter(follow::Column::FollowingId.eq(following_id))
            .exec(&self.db)
            .await?;
        Ok(result.rows_affected > 0)
    }

    /// Users who follow `user_id`, most recent first.
    pub async fn list_followers(&self, user_id: i32) -> AppResult<Vec<UserModel>> {
        let follows = Follow::find()
            .filter(follow::Column::FollowingId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .order_by_desc(follow::Column::Id)
            .all(&self.db)
            .await?;

        let user_ids = follows.iter().map(|f| f.follower_id).collect();
        self.load_ordered(user_ids).await
    }

    /// Users `user_id` follows, most recent first.
    pub async fn list_following(&self, user_id: i32) -> AppResult<Vec<UserModel>> {
        let follows = Follow::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .order_by_desc(follow::Column::CreatedAt)
            .order_by_desc(follow::Column::Id)
            .all(&self.db)
            .await?;

        let user_ids = follows.iter().map(|f| f.following_id).collect();
        self.load_ordered(user_ids).await
    }

    pub async fn count_followers(&self, user_id: i32) -> AppResult<u64> {
        let count = Follow::find()
            .filter(follow::Column::FollowingId.eq(user_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    pub async fn count_following(&self, user_id: i32) -> AppResult<u64> {
        let count = Follow::find()
            .filter(follow::Column::FollowerId.eq(user_id))
            .count(&self.db)
            .await?;
        Ok(count)
    }

    async fn load_ordered(&self, user_ids: Vec<i32>) -> AppResult<Vec<UserModel>> {
        if user_ids.is_empty() {
            return Ok(vec![]);
        }

        let users = User::find()
            .filter(user::Column::Id.is_in(user_ids.clone()))
            .all(&self.db)
            .await?;

        // Reorder to match follow order
        let user_map: HashMap<i32, UserModel> = users.into_iter().map(|u| (u.id, u)).collect();
        Ok(user_ids
            .into_iter()
            .filter_map(|id| user_map.get(&id).cloned())
            .collect())
    }
}

fn already_following() -> AppError {
    AppError::Validation("Already following this user".to_string())
}
