//! Repository for the `tags` and `blueprint_tags` tables.

use blueprints_core::types::DbId;
use sqlx::{PgConnection, PgPool};

use crate::models::blueprint::TagSelection;
use crate::models::tag::Tag;

/// Column list for `tags` queries.
const COLUMNS: &str = "id, name, created_at, updated_at";

/// Provides tag lookup, upsert and blueprint-tag association.
pub struct TagRepo;

impl TagRepo {
    /// Return the tag called `name`, creating it first if it does not exist.
    ///
    /// Names are matched exactly. Two callers creating the same name get the
    /// same row back and neither sees a duplicate-key error.
    pub async fn upsert(pool: &PgPool, name: &str) -> Result<Tag, sqlx::Error> {
        let mut conn = pool.acquire().await?;
        Self::get_or_create(&mut conn, name).await
    }

    /// Insert-or-fetch on the caller's connection.
    ///
    /// `DO NOTHING` leaves an existing row unlocked, so links to it from other
    /// transactions (which take `FOR KEY SHARE`) never wait on this one. The
    /// follow-up `SELECT` is a new statement and sees a row committed by a
    /// concurrent inserter we waited for.
    async fn get_or_create(conn: &mut PgConnection, name: &str) -> Result<Tag, sqlx::Error> {
        let insert = format!(
            "INSERT INTO tags (name) VALUES ($1) \
             ON CONFLICT (name) DO NOTHING \
             RETURNING {COLUMNS}"
        );
        let inserted = sqlx::query_as::<_, Tag>(&insert)
            .bind(name)
            .fetch_optional(&mut *conn)
            .await?;
        if let Some(tag) = inserted {
            return Ok(tag);
        }

        let select = format!("SELECT {COLUMNS} FROM tags WHERE name = $1");
        sqlx::query_as::<_, Tag>(&select)
            .bind(name)
            .fetch_one(&mut *conn)
            .await
    }

    /// All tags, alphabetical.
    pub async fn list_all(pool: &PgPool) -> Result<Vec<Tag>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM tags ORDER BY name");
        sqlx::query_as::<_, Tag>(&query).fetch_all(pool).await
    }

    /// Those of `ids` that do not name an existing tag.
    pub async fn missing_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<DbId>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        sqlx::query_scalar::<_, DbId>(
            "SELECT requested.id FROM UNNEST($1::BIGINT[]) AS requested(id) \
             WHERE NOT EXISTS (SELECT 1 FROM tags t WHERE t.id = requested.id) \
             ORDER BY requested.id",
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    /// Tags attached to a blueprint, alphabetical.
    pub async fn list_for_blueprint(
        pool: &PgPool,
        blueprint_id: DbId,
    ) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as::<_, Tag>(
            "SELECT t.id, t.name, t.created_at, t.updated_at \
             FROM tags t \
             JOIN blueprint_tags bt ON bt.tag_id = t.id \
             WHERE bt.blueprint_id = $1 \
             ORDER BY t.name",
        )
        .bind(blueprint_id)
        .fetch_all(pool)
        .await
    }

    /// Make `selection` the complete tag set of a blueprint.
    ///
    /// New names are upserted; unknown existing ids are ignored. Runs on the
    /// caller's connection so it can share the blueprint's transaction.
    pub(crate) async fn replace_for_blueprint(
        conn: &mut PgConnection,
        blueprint_id: DbId,
        selection: &TagSelection,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM blueprint_tags WHERE blueprint_id = $1")
            .bind(blueprint_id)
            .execute(&mut *conn)
            .await?;

        // A fixed creation order keeps concurrent writers from waiting on
        // each other's new names in a cycle.
        let mut names: Vec<&str> = selection.new_names.iter().map(String::as_str).collect();
        names.sort_unstable();
        names.dedup();

        let mut tag_ids = selection.existing_ids.clone();
        for name in names {
            let tag = Self::get_or_create(&mut *conn, name).await?;
            tag_ids.push(tag.id);
        }

        if tag_ids.is_empty() {
            return Ok(());
        }

        sqlx::query(
            "INSERT INTO blueprint_tags (blueprint_id, tag_id) \
             SELECT $1, t.id FROM tags t WHERE t.id = ANY($2) \
             ON CONFLICT (blueprint_id, tag_id) DO NOTHING",
        )
        .bind(blueprint_id)
        .bind(&tag_ids)
        .execute(&mut *conn)
        .await?;

        Ok(())
    }
}
