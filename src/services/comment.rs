use crate::{
    error::{AppError, AppResult},
    models::{comment, Comment, CommentModel, Post, User, UserModel},
    services::ownership::ensure_owned,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

pub struct CommentService {
    db: DatabaseConnection,
}

impl CommentService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    pub async fn list_by_post(
        &self,
        post_id: i32,
    ) -> AppResult<Vec<(CommentModel, Option<UserModel>)>> {
        let comments = Comment::find()
            .filter(comment::Column::PostId.eq(post_id))
            .find_also_related(User)
            .order_by_desc(comment::Column::CreatedAt)
            .order_by_desc(comment::Column::Id)
            .all(&self.db)
            .await?;
        Ok(comments)
    }

    pub async fn create(&self, post_id: i32, user_id: i32, body: &str) -> AppResult<CommentModel> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();

        let new_comment = comment::ActiveModel {
            post_id: sea_orm::ActiveValue::Set(post_id),
            user_id: sea_orm::ActiveValue::Set(user_id),
            body: sea_orm::ActiveValue::Set(body.to_string()),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let comment = new_comment.insert(&self.db).await?;
        Ok(comment)
    }

    pub async fn update(&self, id: i32, user_id: i32, body: &str) -> AppResult<CommentModel> {
        let existing = self.get_by_id(id).await?;
        ensure_owned(&existing, user_id)?;

        let now = chrono::Utc::now().naive_utc();

        let mut active: comment::ActiveModel = existing.into();
        active.body = sea_orm::ActiveValue::Set(body.to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    pub async fn delete(&self, id: i32, user_id: i32) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        ensure_owned(&existing, user_id)?;

        Comment::delete_by_id(id).exec(&self.db).await?;
        Ok(())
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<CommentModel> {
        Comment::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}
