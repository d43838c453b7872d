use crate::{
    error::{AppError, AppResult},
    models::{CommentModel, PostModel, UserModel},
};

/// A row that belongs to exactly one user.
pub trait Owned {
    fn owner_id(&self) -> i32;
}

impl Owned for PostModel {
    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

impl Owned for CommentModel {
    fn owner_id(&self) -> i32 {
        self.user_id
    }
}

impl Owned for UserModel {
    fn owner_id(&self) -> i32 {
        self.id
    }
}

pub fn assert_owner(resource_author_id: i32, caller_id: i32) -> AppResult<()> {
    if resource_author_id != caller_id {
        return Err(AppError::Forbidden);
    }
    Ok(())
}

/// Capability check run before any mutation of an owned row.
pub fn ensure_owned<T: Owned>(resource: &T, caller_id: i32) -> AppResult<()> {
    assert_owner(resource.owner_id(), caller_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn post_by(user_id: i32) -> PostModel {
        let now = NaiveDateTime::default();
        PostModel {
            id: 1,
            user_id,
            title: "Hello".to_string(),
            body: String::new(),
            image: None,
            upvotes: 0,
            downvotes: 0,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn owner_passes() {
        assert!(assert_owner(7, 7).is_ok());
        assert!(ensure_owned(&post_by(7), 7).is_ok());
    }

    #[test]
    fn stranger_is_forbidden() {
        assert!(matches!(assert_owner(7, 8), Err(AppError::Forbidden)));
        assert!(matches!(
            ensure_owned(&post_by(7), 8),
            Err(AppError::Forbidden)
        ));
    }

    #[test]
    fn comment_owner_is_its_author() {
        let now = NaiveDateTime::default();
        let comment = CommentModel {
            id: 3,
            post_id: 1,
            user_id: 9,
            body: "hi".to_string(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(comment.owner_id(), 9);
        assert!(ensure_owned(&comment, 1).is_err());
    }
}
