//! Commentary model, view and DTOs.

use blueprints_core::ownership::Owned;
use blueprints_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `commentaries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Commentary {
    pub id: DbId,
    pub user_id: DbId,
    pub blueprint_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Commentary {
    /// Location of this comment on its blueprint's page.
    pub fn anchor_url(&self) -> String {
        comment_anchor_url(self.blueprint_id, self.id)
    }
}

impl Owned for Commentary {
    const ENTITY: &'static str = "Commentary";

    fn id(&self) -> DbId {
        self.id
    }

    fn owner_id(&self) -> DbId {
        self.user_id
    }
}

/// `/blueprints/{blueprint_id}#comment-{comment_id}`
pub fn comment_anchor_url(blueprint_id: DbId, comment_id: DbId) -> String {
    format!("/blueprints/{blueprint_id}#comment-{comment_id}")
}

/// A comment joined with its author's username, as shown under a blueprint.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CommentaryView {
    pub id: DbId,
    pub user_id: DbId,
    pub username: String,
    pub blueprint_id: DbId,
    pub content: String,
    pub created_at: Timestamp,
}

/// DTO for creating a comment.
#[derive(Debug)]
pub struct CreateCommentary {
    pub user_id: DbId,
    pub blueprint_id: DbId,
    pub content: String,
}
