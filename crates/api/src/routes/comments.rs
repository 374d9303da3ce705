//! Route definitions for the `/comments` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::comments;
use crate::state::AppState;

/// Routes mounted at `/comments`.
///
/// ```text
/// GET  /{id}/update   -> update_form
/// POST /{id}/update   -> update
/// POST /{id}/delete   -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{id}/update",
            get(comments::update_form).post(comments::update),
        )
        .route("/{id}/delete", post(comments::delete))
}
