pub mod auth;
pub mod blueprints;
pub mod comments;
pub mod health;
pub mod users;

use axum::routing::get;
use axum::Router;

use crate::handlers;
use crate::state::AppState;

/// Build the application route tree.
///
/// Route hierarchy:
///
/// ```text
/// /                                    blueprint index (?query|tag|username|liked|page)
///
/// /auth/login                          login (public)
///
/// /blueprints/create                   create form, create
/// /blueprints/{id}                     detail
/// /blueprints/{id}/update              update form, update (owner only)
/// /blueprints/{id}/delete              delete confirmation, delete (owner only)
/// /blueprints/{id}/like                toggle like
/// /blueprints/{id}/comments            add comment
///
/// /comments/{id}/update                edit form, update (author only)
/// /comments/{id}/delete                delete (author only)
///
/// /users                               user list
/// /users/register                      register (public)
/// /users/{id}                          profile
/// /users/{id}/update                   profile form, update (self only)
/// /users/{id}/delete                   confirmation, delete account (self only)
/// ```
pub fn app_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::blueprints::index))
        .nest("/auth", auth::router())
        .nest("/blueprints", blueprints::router())
        .nest("/comments", comments::router())
        .nest("/users", users::router())
}
