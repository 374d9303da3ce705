//! Handlers for comments under a blueprint.
//!
//! Every successful mutation redirects to the comment's anchor on its
//! blueprint page (`/blueprints/{id}#comment-{cid}`).

use axum::extract::{Path, State};
use axum::{Form, Json};
use blueprints_core::error::CoreError;
use blueprints_core::ownership::ensure_owner;
use blueprints_core::types::DbId;
use blueprints_db::models::commentary::{comment_anchor_url, Commentary, CreateCommentary};
use blueprints_db::repositories::{BlueprintRepo, CommentaryRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, Found};
use crate::state::AppState;

/// Body of the comment create and update forms.
#[derive(Debug, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub content: String,
}

impl CommentForm {
    /// Trimmed content, or field errors if nothing is left.
    fn clean(mut self) -> AppResult<String> {
        self.content = self.content.trim().to_string();
        self.validate()?;
        Ok(self.content)
    }
}

/// Context of the comment edit form.
#[derive(Debug, Serialize)]
pub struct CommentFormContext {
    pub comment: Commentary,
}

async fn find_owned(pool: &PgPool, id: DbId, user_id: DbId) -> AppResult<Commentary> {
    let comment = CommentaryRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Commentary",
            id,
        }))?;
    ensure_owner(&comment, user_id).inspect_err(|_| {
        tracing::warn!(comment_id = id, user_id, "Comment change refused: not the author");
    })?;
    Ok(comment)
}

/// POST /blueprints/{id}/comments
///
/// The blueprint comes from the path; the author is the caller.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(blueprint_id): Path<DbId>,
    Form(input): Form<CommentForm>,
) -> AppResult<Found> {
    if BlueprintRepo::find_by_id(&state.pool, blueprint_id)
        .await?
        .is_none()
    {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Blueprint",
            id: blueprint_id,
        }));
    }

    let content = input.clean()?;
    let comment = CommentaryRepo::create(
        &state.pool,
        &CreateCommentary {
            user_id: auth.user_id,
            blueprint_id,
            content,
        },
    )
    .await?;

    tracing::info!(
        comment_id = comment.id,
        blueprint_id,
        user_id = auth.user_id,
        "Comment created",
    );

    Ok(Found::to(comment.anchor_url()))
}

/// GET /comments/{id}/update
pub async fn update_form(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<CommentFormContext>>> {
    let comment = find_owned(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: CommentFormContext { comment },
    }))
}

/// POST /comments/{id}/update
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<CommentForm>,
) -> AppResult<Found> {
    find_owned(&state.pool, id, auth.user_id).await?;

    let content = input.clean()?;
    let comment = CommentaryRepo::update_content(&state.pool, id, &content)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Commentary",
            id,
        }))?;

    tracing::info!(comment_id = id, user_id = auth.user_id, "Comment updated");

    Ok(Found::to(comment.anchor_url()))
}

/// POST /comments/{id}/delete
///
/// Redirects to where the comment was on its blueprint page.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Found> {
    let comment = find_owned(&state.pool, id, auth.user_id).await?;

    if !CommentaryRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Commentary",
            id,
        }));
    }

    tracing::info!(
        comment_id = id,
        blueprint_id = comment.blueprint_id,
        user_id = auth.user_id,
        "Comment deleted",
    );

    Ok(Found::to(comment_anchor_url(comment.blueprint_id, comment.id)))
}
