use crate::{
    error::{AppError, AppResult},
    models::{post, vote, Post, Vote},
};
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, QueryFilter, QuerySelect, TransactionTrait,
};
use serde::Serialize;
use std::future::Future;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoteDirection {
    Up,
    Down,
}

impl VoteDirection {
    pub fn value(self) -> i16 {
        match self {
            VoteDirection::Up => 1,
            VoteDirection::Down => -1,
        }
    }

    fn from_stored(value: i16) -> Self {
        if value < 0 {
            VoteDirection::Down
        } else {
            VoteDirection::Up
        }
    }
}

impl TryFrom<i16> for VoteDirection {
    type Error = AppError;

    fn try_from(value: i16) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(VoteDirection::Up),
            -1 => Ok(VoteDirection::Down),
            _ => Err(AppError::Validation(
                "Vote direction must be 1 or -1".to_string(),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum VoteOutcome {
    Recorded,
    Updated,
    Removed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub outcome: VoteOutcome,
    /// Direction stored after the transition; `None` means no row.
    pub next: Option<VoteDirection>,
}

/// Vote state machine: absent -> recorded, same -> removed, opposite -> updated.
pub fn decide(existing: Option<VoteDirection>, requested: VoteDirection) -> Transition {
    match existing {
        None => Transition {
            outcome: VoteOutcome::Recorded,
            next: Some(requested),
        },
        Some(current) if current == requested => Transition {
            outcome: VoteOutcome::Removed,
            next: None,
        },
        Some(_) => Transition {
            outcome: VoteOutcome::Updated,
            next: Some(requested),
        },
    }
}

/// (upvotes delta, downvotes delta) moving a user's vote from `old` to `new`.
fn counter_delta(old_value: i16, new_value: i16) -> (i32, i32) {
    let old_up = (old_value == 1) as i32;
    let old_down = (old_value == -1) as i32;
    let new_up = (new_value == 1) as i32;
    let new_down = (new_value == -1) as i32;
    (new_up - old_up, new_down - old_down)
}

#[derive(Debug, Clone, Copy)]
pub struct VoteChange {
    pub post_id: i32,
    pub outcome: VoteOutcome,
    pub old_value: i16,
    pub new_value: i16,
    pub upvotes: i32,
    pub downvotes: i32,
}

/// Result of one read-decide-write pass.
#[derive(Debug)]
enum Attempt {
    Applied(VoteChange),
    /// The vote row read at the start was changed or removed before the write.
    Stale,
}

/// Run `attempt`, and run it once more if it lost a race with a concurrent
/// vote by the same user on the same post.
async fn retry_once<F, Fut>(mut attempt: F) -> AppResult<VoteChange>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = AppResult<Attempt>>,
{
    match attempt().await {
        Ok(Attempt::Applied(change)) => return Ok(change),
        Ok(Attempt::Stale) => tracing::info!("Vote row changed concurrently, retrying"),
        Err(e) if e.is_unique_violation() => {
            tracing::info!("Concurrent first vote detected, retrying")
        }
        Err(e) => return Err(e),
    }

    match attempt().await? {
        Attempt::Applied(change) => Ok(change),
        Attempt::Stale => Err(AppError::Internal(anyhow::anyhow!(
            "Vote row changed concurrently twice"
        ))),
    }
}

pub struct VoteService {
    db: DatabaseConnection,
}

impl VoteService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Apply a vote and keep the post's counters in step with the vote rows.
    ///
    /// The post row is locked for the transaction, so votes on one post are
    /// applied one at a time where the store supports row locks. Otherwise a
    /// lost race shows up as a unique violation on the first insert or as a
    /// stale row on update/delete; either way the transaction rolls back and
    /// the whole read-decide-write sequence runs once more.
    pub async fn apply_vote(
        &self,
        user_id: i32,
        post_id: i32,
        direction: VoteDirection,
    ) -> AppResult<VoteChange> {
        retry_once(move || self.try_apply(user_id, post_id, direction)).await
    }

    /// Caller's current vote value on a post: -1, 0 or 1.
    pub async fn current_vote(&self, user_id: i32, post_id: i32) -> AppResult<i16> {
        Post::find_by_id(post_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let value = Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::PostId.eq(post_id))
            .one(&self.db)
            .await?
            .map(|v| v.value)
            .unwrap_or(0);

        Ok(value)
    }

    async fn try_apply(
        &self,
        user_id: i32,
        post_id: i32,
        direction: VoteDirection,
    ) -> AppResult<Attempt> {
        let txn = self.db.begin().await?;

        match Self::write_vote(&txn, user_id, post_id, direction).await {
            Ok(Attempt::Applied(change)) => {
                txn.commit().await?;
                Ok(Attempt::Applied(change))
            }
            Ok(Attempt::Stale) => {
                txn.rollback().await?;
                Ok(Attempt::Stale)
            }
            Err(e) => {
                if let Err(rollback_err) = txn.rollback().await {
                    tracing::warn!("Vote rollback failed: {rollback_err}");
                }
                Err(e)
            }
        }
    }

    async fn write_vote(
        txn: &DatabaseTransaction,
        user_id: i32,
        post_id: i32,
        direction: VoteDirection,
    ) -> AppResult<Attempt> {
        // FOR UPDATE on Postgres; SQLite serializes writers on its own.
        Post::find_by_id(post_id)
            .lock_exclusive()
            .one(txn)
            .await?
            .ok_or(AppError::NotFound)?;

        let existing = Vote::find()
            .filter(vote::Column::UserId.eq(user_id))
            .filter(vote::Column::PostId.eq(post_id))
            .one(txn)
            .await?;

        Self::persist(txn, user_id, post_id, existing, direction).await
    }

    /// Write the transition from `existing` and apply the matching counter delta.
    /// Update and delete only match the row as it was read.
    async fn persist(
        txn: &DatabaseTransaction,
        user_id: i32,
        post_id: i32,
        existing: Option<vote::Model>,
        direction: VoteDirection,
    ) -> AppResult<Attempt> {
        let old_value = existing.as_ref().map(|v| v.value).unwrap_or(0);
        let transition = decide(
            existing.as_ref().map(|v| VoteDirection::from_stored(v.value)),
            direction,
        );
        let new_value = transition.next.map_or(0, VoteDirection::value);
        let now = chrono::Utc::now().naive_utc();

        match existing {
            None => {
                vote::ActiveModel {
                    user_id: sea_orm::ActiveValue::Set(user_id),
                    post_id: sea_orm::ActiveValue::Set(post_id),
                    value: sea_orm::ActiveValue::Set(new_value),
                    created_at: sea_orm::ActiveValue::Set(now),
                    updated_at: sea_orm::ActiveValue::Set(now),
                    ..Default::default()
                }
                .insert(txn)
                .await?;
            }
            Some(row) if new_value == 0 => {
                let result = Vote::delete_many()
                    .filter(vote::Column::Id.eq(row.id))
                    .filter(vote::Column::Value.eq(row.value))
                    .exec(txn)
                    .await?;
                if result.rows_affected == 0 {
                    return Ok(Attempt::Stale);
                }
            }
            Some(row) => {
                let result = Vote::update_many()
                    .col_expr(vote::Column::Value, Expr::value(new_value))
                    .col_expr(vote::Column::UpdatedAt, Expr::value(now))
                    .filter(vote::Column::Id.eq(row.id))
                    .filter(vote::Column::Value.eq(row.value))
                    .exec(txn)
                    .await?;
                if result.rows_affected == 0 {
                    return Ok(Attempt::Stale);
                }
            }
        }

        let (delta_up, delta_down) = counter_delta(old_value, new_value);
        if delta_up != 0 || delta_down != 0 {
            Post::update_many()
                .col_expr(
                    post::Column::Upvotes,
                    Expr::col(post::Column::Upvotes).add(delta_up),
                )
                .col_expr(
                    post::Column::Downvotes,
                    Expr::col(post::Column::Downvotes).add(delta_down),
                )
                .filter(post::Column::Id.eq(post_id))
                .exec(txn)
                .await?;
        }

        let post = Post::find_by_id(post_id)
            .one(txn)
            .await?
            .ok_or(AppError::NotFound)?;

        Ok(Attempt::Applied(VoteChange {
            post_id,
            outcome: transition.outcome,
            old_value,
            new_value,
            upvotes: post.upvotes,
            downvotes: post.downvotes,
        }))
    }
}
