//! Repository for the `likes` table.

use blueprints_core::types::DbId;
use sqlx::PgPool;

use crate::models::like::{Like, LikeState};

/// Column list for `likes` queries.
const COLUMNS: &str = "id, user_id, blueprint_id, created_at, updated_at";

/// Provides like toggling and lookups.
pub struct LikeRepo;

impl LikeRepo {
    /// Flip the like of `user_id` on `blueprint_id`.
    ///
    /// Runs in one transaction: the existing row is deleted if there is one,
    /// otherwise a row is inserted. The insert uses `ON CONFLICT DO NOTHING`
    /// against `uq_likes_user_blueprint`, so two concurrent toggles from the
    /// same user can never leave duplicate rows or fail with a duplicate-key
    /// error.
    pub async fn toggle(
        pool: &PgPool,
        user_id: DbId,
        blueprint_id: DbId,
    ) -> Result<LikeState, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let removed = sqlx::query("DELETE FROM likes WHERE user_id = $1 AND blueprint_id = $2")
            .bind(user_id)
            .bind(blueprint_id)
            .execute(&mut *tx)
            .await?
            .rows_affected()
            > 0;

        if !removed {
            sqlx::query(
                "INSERT INTO likes (user_id, blueprint_id) VALUES ($1, $2)
                 ON CONFLICT (user_id, blueprint_id) DO NOTHING",
            )
            .bind(user_id)
            .bind(blueprint_id)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(LikeState { liked: !removed })
    }

    /// Find the like of `user_id` on `blueprint_id`, if any.
    pub async fn find(
        pool: &PgPool,
        user_id: DbId,
        blueprint_id: DbId,
    ) -> Result<Option<Like>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM likes WHERE user_id = $1 AND blueprint_id = $2");
        sqlx::query_as::<_, Like>(&query)
            .bind(user_id)
            .bind(blueprint_id)
            .fetch_optional(pool)
            .await
    }

    /// Ids of every blueprint liked by `user_id`.
    pub async fn liked_blueprint_ids(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Vec<DbId>, sqlx::Error> {
        sqlx::query_scalar::<_, DbId>(
            "SELECT blueprint_id FROM likes WHERE user_id = $1 ORDER BY blueprint_id",
        )
        .bind(user_id)
        .fetch_all(pool)
        .await
    }
}
