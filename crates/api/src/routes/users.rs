//! Route definitions for the `/users` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted at `/users`.
///
/// ```text
/// GET  /                -> list
/// POST /register        -> register
/// GET  /{id}            -> detail
/// GET  /{id}/update     -> update_form
/// POST /{id}/update     -> update
/// GET  /{id}/delete     -> delete_form
/// POST /{id}/delete     -> delete
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(users::list))
        .route("/register", post(users::register))
        .route("/{id}", get(users::detail))
        .route("/{id}/update", get(users::update_form).post(users::update))
        .route("/{id}/delete", get(users::delete_form).post(users::delete))
}
