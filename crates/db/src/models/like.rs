//! Like model.

use blueprints_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `likes` table; unique per `(user_id, blueprint_id)`.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Like {
    pub id: DbId,
    pub user_id: DbId,
    pub blueprint_id: DbId,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Outcome of toggling a like.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LikeState {
    /// Whether the user likes the blueprint after the toggle.
    pub liked: bool,
}
