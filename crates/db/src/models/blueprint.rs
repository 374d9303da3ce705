//! Blueprint model, read views and DTOs.

use blueprints_core::ownership::Owned;
use blueprints_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `blueprints` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Blueprint {
    pub id: DbId,
    pub owner_id: DbId,
    pub title: String,
    pub description: String,
    pub blueprint_string: String,
    /// Image path relative to the media root (`user_{owner_id}/{file}`).
    pub image_path: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Blueprint {
    pub fn url(&self) -> String {
        blueprint_url(self.id)
    }
}

impl Owned for Blueprint {
    const ENTITY: &'static str = "Blueprint";

    fn id(&self) -> DbId {
        self.id
    }

    fn owner_id(&self) -> DbId {
        self.owner_id
    }
}

/// `/blueprints/{id}`
pub fn blueprint_url(id: DbId) -> String {
    format!("/blueprints/{id}")
}

/// A blueprint joined with owner name, tag names and interaction counts.
///
/// Used by both the index listing and the detail page.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct BlueprintView {
    pub id: DbId,
    pub owner_id: DbId,
    pub owner_username: String,
    pub title: String,
    pub description: String,
    pub blueprint_string: String,
    pub image_path: String,
    /// Tag names, alphabetical.
    pub tags: Vec<String>,
    pub like_count: i64,
    pub comment_count: i64,
    pub created_at: Timestamp,
}

/// DTO for inserting a blueprint row.
#[derive(Debug)]
pub struct CreateBlueprint {
    pub owner_id: DbId,
    pub title: String,
    pub description: String,
    pub blueprint_string: String,
    pub image_path: String,
}

/// DTO for updating a blueprint. `image_path: None` keeps the current image.
#[derive(Debug)]
pub struct UpdateBlueprint {
    pub title: String,
    pub description: String,
    pub blueprint_string: String,
    pub image_path: Option<String>,
}

/// Tags to attach to a blueprint: existing tags by id plus names to upsert.
#[derive(Debug, Default)]
pub struct TagSelection {
    pub existing_ids: Vec<DbId>,
    pub new_names: Vec<String>,
}
