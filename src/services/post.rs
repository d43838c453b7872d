use crate::{
    error::{AppError, AppResult},
    models::{post, Post, PostModel, User, UserModel},
    services::ownership::ensure_owned,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

pub struct PostService {
    db: DatabaseConnection,
}

/// Fields of a partial post update; `None` leaves the column untouched.
#[derive(Debug, Default)]
pub struct PostChanges {
    pub title: Option<String>,
    pub body: Option<String>,
    pub image: Option<String>,
}

impl PostService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// All posts, newest first, each with its author when still present.
    pub async fn list_with_authors(&self) -> AppResult<Vec<(PostModel, Option<UserModel>)>> {
        let posts = Post::find()
            .find_also_related(User)
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await?;
        Ok(posts)
    }

    pub async fn list_by_user(&self, user_id: i32) -> AppResult<Vec<PostModel>> {
        let posts = Post::find()
            .filter(post::Column::UserId.eq(user_id))
            .order_by_desc(post::Column::CreatedAt)
            .order_by_desc(post::Column::Id)
            .all(&self.db)
            .await?;
        Ok(posts)
    }

    pub async fn get_by_id(&self, id: i32) -> AppResult<PostModel> {
        Post::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn get_with_author(&self, id: i32) -> AppResult<(PostModel, Option<UserModel>)> {
        Post::find_by_id(id)
            .find_also_related(User)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }

    pub async fn create(
        &self,
        user_id: i32,
        title: &str,
        body: &str,
        image: Option<String>,
    ) -> AppResult<PostModel> {
        User::find_by_id(user_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let now = chrono::Utc::now().naive_utc();

        let new_post = post::ActiveModel {
            user_id: sea_orm::ActiveValue::Set(user_id),
            title: sea_orm::ActiveValue::Set(title.to_string()),
            body: sea_orm::ActiveValue::Set(body.to_string()),
            image: sea_orm::ActiveValue::Set(image),
            upvotes: sea_orm::ActiveValue::Set(0),
            downvotes: sea_orm::ActiveValue::Set(0),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let post = new_post.insert(&self.db).await?;
        tracing::debug!(post_id = post.id, user_id, "Post created");
        Ok(post)
    }

    pub async fn update(
        &self,
        id: i32,
        user_id: i32,
        changes: PostChanges,
    ) -> AppResult<PostModel> {
        let existing = self.get_by_id(id).await?;
        ensure_owned(&existing, user_id)?;

        let mut active: post::ActiveModel = existing.into();
        if let Some(title) = changes.title {
            active.title = sea_orm::ActiveValue::Set(title);
        }
        if let Some(body) = changes.body {
            active.body = sea_orm::ActiveValue::Set(body);
        }
        if let Some(image) = changes.image {
            active.image = sea_orm::ActiveValue::Set(Some(image));
        }
        active.updated_at = sea_orm::ActiveValue::Set(chrono::Utc::now().naive_utc());

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Comments and votes go with the post through cascading foreign keys.
    pub async fn delete(&self, id: i32, user_id: i32) -> AppResult<()> {
        let existing = self.get_by_id(id).await?;
        ensure_owned(&existing, user_id)?;

        Post::delete_by_id(id).exec(&self.db).await?;
        tracing::debug!(post_id = id, user_id, "Post deleted");
        Ok(())
    }
}
