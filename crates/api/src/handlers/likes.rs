use axum::extract::{Path, State};
use blueprints_core::error::CoreError;
use blueprints_core::types::DbId;
use blueprints_db::repositories::{BlueprintRepo, LikeRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::Found;
use crate::state::AppState;

/// POST /blueprints/{id}/like
///
/// Like the blueprint if the caller does not like it yet, otherwise remove
/// the like. Redirects to the index.
pub async fn toggle(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(blueprint_id): Path<DbId>,
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

    let state_after = LikeRepo::toggle(&state.pool, auth.user_id, blueprint_id).await?;

    tracing::info!(
        blueprint_id,
        user_id = auth.user_id,
        liked = state_after.liked,
        "Like toggled",
    );

    Ok(Found::to("/"))
}
