//! Route definitions for the `/blueprints` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{blueprints, comments, likes};
use crate::state::AppState;

/// Routes mounted at `/blueprints`.
///
/// ```text
/// GET  /create          -> create_form
/// POST /create          -> create
/// GET  /{id}            -> detail
/// GET  /{id}/update     -> update_form
/// POST /{id}/update     -> update
/// GET  /{id}/delete     -> delete_form
/// POST /{id}/delete     -> delete
/// POST /{id}/like       -> likes::toggle
/// POST /{id}/comments   -> comments::create
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/create",
            get(blueprints::create_form).post(blueprints::create),
        )
        .route("/{id}", get(blueprints::detail))
        .route(
            "/{id}/update",
            get(blueprints::update_form).post(blueprints::update),
        )
        .route(
            "/{id}/delete",
            get(blueprints::delete_form).post(blueprints::delete),
        )
        .route("/{id}/like", post(likes::toggle))
        .route("/{id}/comments", post(comments::create))
}
