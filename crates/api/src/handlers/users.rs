//! Handlers for user accounts: registration, the user list and profiles,
//! and the owner-only profile update and account deletion forms.

use axum::extract::{Path, Query, State};
use axum::{Form, Json};
use blueprints_core::error::{CoreError, FieldErrors};
use blueprints_core::ownership::ensure_owner;
use blueprints_core::pagination::{deserialize_page, Page, PageRequest};
use blueprints_core::types::DbId;
use blueprints_core::validation::{validate_email_or_blank, validate_password, validate_username};
use blueprints_db::models::blueprint::BlueprintView;
use blueprints_db::models::user::{CreateUser, UpdateUser, User, UserResponse};
use blueprints_db::repositories::{BlueprintRepo, UserRepo};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use validator::Validate;

use crate::auth::password::{hash_password, verify_password};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, Found};
use crate::state::AppState;

/// Users shown per page of the user list.
pub const USERS_PER_PAGE: i64 = 10;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

#[derive(Debug, Default, Deserialize)]
pub struct UserListParams {
    #[serde(default, deserialize_with = "deserialize_page")]
    pub page: Option<i64>,
}

/// Body of `POST /users/register`.
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterForm {
    #[serde(default)]
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "validate_email_or_blank"))]
    pub email: String,
    #[serde(default)]
    #[validate(custom(function = "validate_password"))]
    pub password1: String,
    #[serde(default)]
    pub password2: String,
}

/// Body of `POST /users/{id}/update`.
#[derive(Debug, Deserialize, Validate)]
pub struct ProfileForm {
    #[serde(default)]
    #[validate(custom(function = "validate_username"))]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "validate_email_or_blank"))]
    pub email: String,
}

/// Body of `POST /users/{id}/delete`.
#[derive(Debug, Deserialize)]
pub struct DeleteAccountForm {
    #[serde(default)]
    pub password: String,
}

/// Context of a profile page.
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub user: UserResponse,
    /// The user's blueprints, newest first.
    pub blueprints: Vec<BlueprintView>,
}

/// Context of the owner-only account forms.
#[derive(Debug, Serialize)]
pub struct AccountContext {
    pub user: UserResponse,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_user(pool: &PgPool, id: DbId) -> AppResult<User> {
    UserRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))
}

/// Load a user and refuse unless the caller is that user.
async fn find_self(pool: &PgPool, id: DbId, user_id: DbId) -> AppResult<User> {
    let user = find_user(pool, id).await?;
    ensure_owner(&user, user_id).inspect_err(|_| {
        tracing::warn!(target_user_id = id, user_id, "Account change refused: not the owner");
    })?;
    Ok(user)
}

fn collect_errors(form: &impl Validate) -> FieldErrors {
    match form.validate() {
        Ok(()) => FieldErrors::new(),
        Err(e) => e.into(),
    }
}

const USERNAME_TAKEN: &str = "A user with that username already exists.";

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /users/register
///
/// Create an account and redirect to the login endpoint.
pub async fn register(
    State(state): State<AppState>,
    Form(mut input): Form<RegisterForm>,
) -> AppResult<Found> {
    input.username = input.username.trim().to_string();
    input.email = input.email.trim().to_string();

    let mut errors = collect_errors(&input);
    if input.password1 != input.password2 {
        errors.add("password2", "The two password fields didn't match.");
    }
    if errors.get("username").is_none()
        && UserRepo::username_taken(&state.pool, &input.username, None).await?
    {
        errors.add("username", USERNAME_TAKEN);
    }
    errors.into_result()?;

    let password_hash = hash_password(&input.password1)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let user = UserRepo::create(
        &state.pool,
        &CreateUser {
            username: input.username,
            email: input.email,
            password_hash,
        },
    )
    .await?;

    tracing::info!(user_id = user.id, username = %user.username, "User registered");

    Ok(Found::to("/auth/login"))
}

/// GET /users
pub async fn list(
    State(state): State<AppState>,
    Query(params): Query<UserListParams>,
) -> AppResult<Json<DataResponse<Page<UserResponse>>>> {
    let request = PageRequest::new(params.page, USERS_PER_PAGE)?;
    let total = UserRepo::count(&state.pool).await?;
    request.ensure_in_range(total)?;

    let users = UserRepo::list(&state.pool, request.limit(), request.offset()).await?;
    let items = users.iter().map(UserResponse::from).collect();

    Ok(Json(DataResponse {
        data: Page::new(items, request, total),
    }))
}

/// GET /users/{id}
pub async fn detail(
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserProfile>>> {
    let user = find_user(&state.pool, id).await?;
    let blueprints = BlueprintRepo::list_by_owner(&state.pool, id).await?;

    Ok(Json(DataResponse {
        data: UserProfile {
            user: UserResponse::from(&user),
            blueprints,
        },
    }))
}

/// GET /users/{id}/update
pub async fn update_form(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AccountContext>>> {
    let user = find_self(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: AccountContext {
            user: UserResponse::from(&user),
        },
    }))
}

/// POST /users/{id}/update
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(mut input): Form<ProfileForm>,
) -> AppResult<Found> {
    find_self(&state.pool, id, auth.user_id).await?;

    input.username = input.username.trim().to_string();
    input.email = input.email.trim().to_string();

    let mut errors = collect_errors(&input);
    if errors.get("username").is_none()
        && UserRepo::username_taken(&state.pool, &input.username, Some(id)).await?
    {
        errors.add("username", USERNAME_TAKEN);
    }
    errors.into_result()?;

    let user = UserRepo::update(
        &state.pool,
        id,
        &UpdateUser {
            username: input.username,
            email: input.email,
        },
    )
    .await?
    .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    tracing::info!(user_id = id, username = %user.username, "User updated");

    Ok(Found::to(format!("/users/{id}")))
}

/// GET /users/{id}/delete
pub async fn delete_form(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AccountContext>>> {
    let user = find_self(&state.pool, id, auth.user_id).await?;
    Ok(Json(DataResponse {
        data: AccountContext {
            user: UserResponse::from(&user),
        },
    }))
}

/// POST /users/{id}/delete
///
/// Requires the account password. Deleting the user removes everything they
/// own; their uploaded images are removed afterwards.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    Form(input): Form<DeleteAccountForm>,
) -> AppResult<Found> {
    let user = find_self(&state.pool, id, auth.user_id).await?;

    let password_ok = verify_password(&input.password, &user.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_ok {
        tracing::warn!(user_id = id, "Account deletion refused: incorrect password");
        return Err(CoreError::FieldErrors(FieldErrors::single("password", "Incorrect password")).into());
    }

    UserRepo::delete(&state.pool, id).await?;

    if let Err(e) = state.media.remove_owner_dir(id).await {
        tracing::warn!(user_id = id, error = %e, "Failed to remove user media directory");
    }

    tracing::info!(user_id = id, "User deleted");

    Ok(Found::to("/"))
}
