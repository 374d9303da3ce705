//! Repository for the `blueprints` table.
//!
//! Listing queries return [`BlueprintView`] rows: the blueprint joined with
//! its owner's username, tag names and like/comment counts. Tag names and
//! counts come from correlated subqueries so a blueprint is never repeated,
//! whatever the filter matches on.

use blueprints_core::listing::{contains_pattern, ListingFilter};
use blueprints_core::types::DbId;
use sqlx::PgPool;

use crate::models::blueprint::{
    Blueprint, BlueprintView, CreateBlueprint, TagSelection, UpdateBlueprint,
};
use crate::repositories::TagRepo;

/// Column list for plain `blueprints` queries.
const COLUMNS: &str = "id, owner_id, title, description, blueprint_string, image_path, \
                       created_at, updated_at";

/// `SELECT ... FROM` part shared by every [`BlueprintView`] query.
const VIEW_SELECT: &str = "\
    SELECT b.id, b.owner_id, u.username AS owner_username, \
           b.title, b.description, b.blueprint_string, b.image_path, \
           ARRAY(SELECT t.name FROM blueprint_tags bt \
                 JOIN tags t ON t.id = bt.tag_id \
                 WHERE bt.blueprint_id = b.id ORDER BY t.name) AS tags, \
           (SELECT COUNT(*) FROM likes l WHERE l.blueprint_id = b.id) AS like_count, \
           (SELECT COUNT(*) FROM commentaries c WHERE c.blueprint_id = b.id) AS comment_count, \
           b.created_at \
    FROM blueprints b \
    JOIN users u ON u.id = b.owner_id";

/// Default listing order: newest first.
const ORDER_BY: &str = "ORDER BY b.created_at DESC, b.id DESC";

/// Provides CRUD and filtered listing for blueprints.
pub struct BlueprintRepo;

impl BlueprintRepo {
    /// Insert a blueprint and attach its tags in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreateBlueprint,
        tags: &TagSelection,
    ) -> Result<Blueprint, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO blueprints (owner_id, title, description, blueprint_string, image_path)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let blueprint = sqlx::query_as::<_, Blueprint>(&query)
            .bind(input.owner_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.blueprint_string)
            .bind(&input.image_path)
            .fetch_one(&mut *tx)
            .await?;

        TagRepo::replace_for_blueprint(&mut *tx, blueprint.id, tags).await?;

        tx.commit().await?;
        Ok(blueprint)
    }

    /// Find a blueprint row by ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Blueprint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM blueprints WHERE id = $1");
        sqlx::query_as::<_, Blueprint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a blueprint with its owner name, tags and counts.
    pub async fn find_view(pool: &PgPool, id: DbId) -> Result<Option<BlueprintView>, sqlx::Error> {
        let query = format!("{VIEW_SELECT} WHERE b.id = $1");
        sqlx::query_as::<_, BlueprintView>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// One page of blueprints matching `filter`, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &ListingFilter,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<BlueprintView>, sqlx::Error> {
        let (where_clause, next_idx) = where_clause(filter);
        let query = format!(
            "{VIEW_SELECT} {where_clause} {ORDER_BY} LIMIT ${next_idx} OFFSET ${}",
            next_idx + 1
        );

        let mut q = sqlx::query_as::<_, BlueprintView>(&query);
        q = match filter {
            ListingFilter::All => q,
            ListingFilter::Tag(name) | ListingFilter::Author(name) => q.bind(name),
            ListingFilter::LikedBy(user_id) => q.bind(*user_id),
            ListingFilter::Search(text) => q.bind(contains_pattern(text)),
        };
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Number of blueprints matching `filter`.
    pub async fn count(pool: &PgPool, filter: &ListingFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, _) = where_clause(filter);
        let query = format!(
            "SELECT COUNT(*) FROM blueprints b JOIN users u ON u.id = b.owner_id {where_clause}"
        );

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        q = match filter {
            ListingFilter::All => q,
            ListingFilter::Tag(name) | ListingFilter::Author(name) => q.bind(name),
            ListingFilter::LikedBy(user_id) => q.bind(*user_id),
            ListingFilter::Search(text) => q.bind(contains_pattern(text)),
        };
        q.fetch_one(pool).await
    }

    /// All blueprints of one owner, newest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        owner_id: DbId,
    ) -> Result<Vec<BlueprintView>, sqlx::Error> {
        let query = format!("{VIEW_SELECT} WHERE b.owner_id = $1 {ORDER_BY}");
        sqlx::query_as::<_, BlueprintView>(&query)
            .bind(owner_id)
            .fetch_all(pool)
            .await
    }

    /// Update a blueprint and replace its tag set in one transaction.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateBlueprint,
        tags: &TagSelection,
    ) -> Result<Option<Blueprint>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE blueprints SET
                title = $2,
                description = $3,
                blueprint_string = $4,
                image_path = COALESCE($5, image_path)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let blueprint = sqlx::query_as::<_, Blueprint>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.blueprint_string)
            .bind(input.image_path.as_deref())
            .fetch_optional(&mut *tx)
            .await?;

        let Some(blueprint) = blueprint else {
            return Ok(None);
        };

        TagRepo::replace_for_blueprint(&mut *tx, blueprint.id, tags).await?;

        tx.commit().await?;
        Ok(Some(blueprint))
    }

    /// Delete a blueprint. Comments, likes and tag links cascade.
    ///
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM blueprints WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// SQL `WHERE` clause for `filter` and the next free bind index.
///
/// Every filter binds at most one parameter, always `$1`.
fn where_clause(filter: &ListingFilter) -> (&'static str, u32) {
    match filter {
        ListingFilter::All => ("", 1),
        ListingFilter::Tag(_) => (
            "WHERE EXISTS (SELECT 1 FROM blueprint_tags bt \
                           JOIN tags t ON t.id = bt.tag_id \
                           WHERE bt.blueprint_id = b.id AND t.name = $1)",
            2,
        ),
        ListingFilter::LikedBy(_) => (
            "WHERE EXISTS (SELECT 1 FROM likes l \
                           WHERE l.blueprint_id = b.id AND l.user_id = $1)",
            2,
        ),
        ListingFilter::Author(_) => ("WHERE u.username = $1", 2),
        ListingFilter::Search(_) => (
            "WHERE (u.username ILIKE $1 \
                    OR b.title ILIKE $1 \
                    OR EXISTS (SELECT 1 FROM blueprint_tags bt \
                               JOIN tags t ON t.id = bt.tag_id \
                               WHERE bt.blueprint_id = b.id AND t.name ILIKE $1))",
            2,
        ),
    }
}
