//! Repository for the `commentaries` table.

use blueprints_core::types::DbId;
use sqlx::PgPool;

use crate::models::commentary::{Commentary, CommentaryView, CreateCommentary};

/// Column list for plain `commentaries` queries.
const COLUMNS: &str = "id, user_id, blueprint_id, content, created_at, updated_at";

/// Provides CRUD operations for comments.
pub struct CommentaryRepo;

impl CommentaryRepo {
    /// Insert a comment, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCommentary,
    ) -> Result<Commentary, sqlx::Error> {
        let query = format!(
            "INSERT INTO commentaries (user_id, blueprint_id, content)
             VALUES ($1, $2, $3)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Commentary>(&query)
            .bind(input.user_id)
            .bind(input.blueprint_id)
            .bind(&input.content)
            .fetch_one(pool)
            .await
    }

    /// Find a comment by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Commentary>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM commentaries WHERE id = $1");
        sqlx::query_as::<_, Commentary>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Comments on a blueprint with their authors, newest first.
    pub async fn list_for_blueprint(
        pool: &PgPool,
        blueprint_id: DbId,
    ) -> Result<Vec<CommentaryView>, sqlx::Error> {
        sqlx::query_as::<_, CommentaryView>(
            "SELECT c.id, c.user_id, u.username, c.blueprint_id, c.content, c.created_at
             FROM commentaries c
             JOIN users u ON u.id = c.user_id
             WHERE c.blueprint_id = $1
             ORDER BY c.created_at DESC, c.id DESC",
        )
        .bind(blueprint_id)
        .fetch_all(pool)
        .await
    }

    /// Replace a comment's content.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update_content(
        pool: &PgPool,
        id: DbId,
        content: &str,
    ) -> Result<Option<Commentary>, sqlx::Error> {
        let query = format!(
            "UPDATE commentaries SET content = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Commentary>(&query)
            .bind(id)
            .bind(content)
            .fetch_optional(pool)
            .await
    }

    /// Delete a comment. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM commentaries WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
