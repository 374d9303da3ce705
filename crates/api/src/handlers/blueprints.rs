//! Handlers for blueprints: the index listing, detail page and owner-only
//! create/update/delete forms.
//!
//! Create and update accept `multipart/form-data` with the fields `title`,
//! `description`, `blueprint_string`, `blueprint_image`, `existing_tags`
//! (repeated, one tag id per part) and `new_tags` (comma-separated names).

use axum::extract::{Multipart, Path, Query, State};
use axum::Json;
use blueprints_core::error::{CoreError, FieldErrors};
use blueprints_core::listing::{resolve_filter, ListingParams, BLUEPRINTS_PER_PAGE};
use blueprints_core::media::{inspect_image, sanitize_filename, ImageInfo};
use blueprints_core::ownership::ensure_owner;
use blueprints_core::pagination::{Page, PageRequest};
use blueprints_core::tags::parse_tag_names;
use blueprints_core::types::DbId;
use blueprints_db::models::blueprint::{
    Blueprint, BlueprintView, CreateBlueprint, TagSelection, UpdateBlueprint,
};
use blueprints_db::models::commentary::CommentaryView;
use blueprints_db::models::tag::Tag;
use blueprints_db::repositories::{BlueprintRepo, CommentaryRepo, LikeRepo, TagRepo};
use serde::Serialize;
use sqlx::PgPool;
use validator::Validate;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::{viewer_id, AuthUser};
use crate::response::{DataResponse, Found};
use crate::state::AppState;

const REQUIRED: &str = "This field is required.";

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Context of the index page.
#[derive(Debug, Serialize)]
pub struct IndexPage {
    pub blueprints: Page<BlueprintView>,
    /// Ids of every blueprint the viewer likes; empty for anonymous viewers.
    pub liked_blueprints: Vec<DbId>,
}

/// Context of the detail page.
#[derive(Debug, Serialize)]
pub struct BlueprintDetail {
    pub blueprint: BlueprintView,
    /// Newest first.
    pub comments: Vec<CommentaryView>,
    pub liked: bool,
    pub is_owner: bool,
}

/// Context of the create and update forms.
#[derive(Debug, Serialize)]
pub struct BlueprintFormContext {
    /// The blueprint being edited; `None` on the create form.
    pub blueprint: Option<BlueprintView>,
    /// Every tag that can be selected in `existing_tags`.
    pub tags: Vec<Tag>,
    /// Ids of the tags currently attached; pre-selected on the update form.
    pub selected_tags: Vec<DbId>,
}

/// Context of the delete confirmation page.
#[derive(Debug, Serialize)]
pub struct DeleteContext {
    pub blueprint: BlueprintView,
}

// ---------------------------------------------------------------------------
// Form parsing
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct UploadedImage {
    filename: String,
    bytes: Vec<u8>,
}

/// Raw blueprint form as read from the multipart body.
#[derive(Debug, Default, Validate)]
struct BlueprintForm {
    #[validate(length(
        min = 1,
        max = 255,
        message = "Title must be between 1 and 255 characters."
    ))]
    title: String,
    #[validate(length(min = 1, message = "This field is required."))]
    description: String,
    #[validate(length(min = 1, message = "This field is required."))]
    blueprint_string: String,
    existing_tags: Vec<DbId>,
    new_tags: String,
    image: Option<UploadedImage>,
    /// Problems found while reading the body (e.g. a non-numeric tag id).
    parse_errors: FieldErrors,
}

/// A blueprint form that passed validation.
#[derive(Debug)]
struct CleanForm {
    title: String,
    description: String,
    blueprint_string: String,
    tags: TagSelection,
    /// Sanitized file name and content of a verified image.
    image: Option<(String, Vec<u8>)>,
}

impl BlueprintForm {
    async fn read(mut multipart: Multipart) -> AppResult<Self> {
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let Some(name) = field.name().map(str::to_string) else {
                continue;
            };

            match name.as_str() {
                "title" => form.title = field.text().await?.trim().to_string(),
                "description" => form.description = field.text().await?.trim().to_string(),
                "blueprint_string" => {
                    form.blueprint_string = field.text().await?.trim().to_string()
                }
                "new_tags" => form.new_tags = field.text().await?,
                "existing_tags" => {
                    let raw = field.text().await?;
                    let raw = raw.trim();
                    if raw.is_empty() {
                        continue;
                    }
                    match raw.parse::<DbId>() {
                        Ok(id) => form.existing_tags.push(id),
                        Err(_) => form.parse_errors.add(
                            "existing_tags",
                            format!("Select a valid choice. {raw} is not one of the available choices."),
                        ),
                    }
                }
                "blueprint_image" => {
                    let filename = field.file_name().unwrap_or_default().to_string();
                    let bytes = field.bytes().await?;
                    // Browsers send an empty part when no file was chosen.
                    if !bytes.is_empty() {
                        form.image = Some(UploadedImage {
                            filename,
                            bytes: bytes.to_vec(),
                        });
                    }
                }
                _ => {}
            }
        }

        Ok(form)
    }

    /// Check every field and collect all problems into one field-error map.
    async fn clean(self, pool: &PgPool, image_required: bool) -> AppResult<CleanForm> {
        let mut errors = FieldErrors::new();
        if let Err(e) = self.validate() {
            errors.merge(e.into());
        }

        let Self {
            title,
            description,
            blueprint_string,
            existing_tags,
            new_tags,
            image,
            parse_errors,
        } = self;
        errors.merge(parse_errors);

        let new_names = match parse_tag_names(&new_tags) {
            Ok(names) => names,
            Err(CoreError::Validation(msg)) => {
                errors.add("new_tags", msg);
                Vec::new()
            }
            Err(e) => return Err(e.into()),
        };

        for id in TagRepo::missing_ids(pool, &existing_tags).await? {
            errors.add(
                "existing_tags",
                format!("Select a valid choice. {id} is not one of the available choices."),
            );
        }

        let image = match image {
            Some(upload) => match inspect_image(&upload.bytes) {
                Ok(info) => Some((stored_file_name(&upload.filename, &info), upload.bytes)),
                Err(CoreError::Validation(msg)) => {
                    errors.add("blueprint_image", msg);
                    None
                }
                Err(e) => return Err(e.into()),
            },
            None => {
                if image_required {
                    errors.add("blueprint_image", REQUIRED);
                }
                None
            }
        };

        errors.into_result()?;

        Ok(CleanForm {
            title,
            description,
            blueprint_string,
            tags: TagSelection {
                existing_ids: existing_tags,
                new_names,
            },
            image,
        })
    }
}

/// File name to store an upload under; falls back to `blueprint.<ext>`
/// when the client name has nothing usable.
fn stored_file_name(client_name: &str, info: &ImageInfo) -> String {
    sanitize_filename(client_name).unwrap_or_else(|| {
        let ext = info.format.extensions_str().first().copied().unwrap_or("img");
        format!("blueprint.{ext}")
    })
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn find_blueprint(pool: &PgPool, id: DbId) -> AppResult<Blueprint> {
    BlueprintRepo::find_by_id(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Blueprint",
            id,
        }))
}

async fn find_view(pool: &PgPool, id: DbId) -> AppResult<BlueprintView> {
    BlueprintRepo::find_view(pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Blueprint",
            id,
        }))
}

/// Load a blueprint and refuse unless `user_id` owns it.
async fn find_owned(pool: &PgPool, id: DbId, user_id: DbId) -> AppResult<Blueprint> {
    let blueprint = find_blueprint(pool, id).await?;
    ensure_owner(&blueprint, user_id).inspect_err(|_| {
        tracing::warn!(blueprint_id = id, user_id, "Blueprint change refused: not the owner");
    })?;
    Ok(blueprint)
}

async fn store_image(
    state: &AppState,
    owner_id: DbId,
    filename: &str,
    bytes: &[u8],
) -> AppResult<String> {
    state
        .media
        .save_image(owner_id, filename, bytes)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store image: {e}")))
}

async fn discard_image(state: &AppState, path: &str) {
    if let Err(e) = state.media.remove_file(path).await {
        tracing::warn!(path, error = %e, "Failed to remove image");
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /
///
/// Paginated listing with at most one filter applied; see
/// [`blueprints_core::listing`] for the precedence rules.
pub async fn index(
    user: Option<AuthUser>,
    State(state): State<AppState>,
    Query(params): Query<ListingParams>,
) -> AppResult<Json<DataResponse<IndexPage>>> {
    let viewer = viewer_id(&user);
    let filter = resolve_filter(&params, viewer);
    let request = PageRequest::new(params.page, BLUEPRINTS_PER_PAGE)?;

    let total = BlueprintRepo::count(&state.pool, &filter).await?;
    request.ensure_in_range(total)?;

    let items =
        BlueprintRepo::list(&state.pool, &filter, request.limit(), request.offset()).await?;

    let liked_blueprints = match viewer {
        Some(user_id) => LikeRepo::liked_blueprint_ids(&state.pool, user_id).await?,
        None => Vec::new(),
    };

    tracing::debug!(?filter, total, page = request.page, "Listed blueprints");

    Ok(Json(DataResponse {
        data: IndexPage {
            blueprints: Page::new(items, request, total),
            liked_blueprints,
        },
    }))
}

/// GET /blueprints/{id}
pub async fn detail(
    user: Option<AuthUser>,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BlueprintDetail>>> {
    let blueprint = find_view(&state.pool, id).await?;
    let comments = CommentaryRepo::list_for_blueprint(&state.pool, id).await?;

    let viewer = viewer_id(&user);
    let liked = match viewer {
        Some(user_id) => LikeRepo::find(&state.pool, user_id, id).await?.is_some(),
        None => false,
    };

    Ok(Json(DataResponse {
        data: BlueprintDetail {
            is_owner: viewer == Some(blueprint.owner_id),
            blueprint,
            comments,
            liked,
        },
    }))
}

/// GET /blueprints/create
pub async fn create_form(
    _auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<DataResponse<BlueprintFormContext>>> {
    let tags = TagRepo::list_all(&state.pool).await?;
    Ok(Json(DataResponse {
        data: BlueprintFormContext {
            blueprint: None,
            tags,
            selected_tags: Vec::new(),
        },
    }))
}

/// POST /blueprints/create
///
/// Store the image, insert the blueprint with its tags, and redirect to it.
pub async fn create(
    auth: AuthUser,
    State(state): State<AppState>,
    multipart: Multipart,
) -> AppResult<Found> {
    let form = BlueprintForm::read(multipart)
        .await?
        .clean(&state.pool, true)
        .await?;
    let (filename, bytes) = form
        .image
        .ok_or_else(|| CoreError::FieldErrors(FieldErrors::single("blueprint_image", REQUIRED)))?;

    let image_path = store_image(&state, auth.user_id, &filename, &bytes).await?;

    let input = CreateBlueprint {
        owner_id: auth.user_id,
        title: form.title,
        description: form.description,
        blueprint_string: form.blueprint_string,
        image_path: image_path.clone(),
    };
    let blueprint = match BlueprintRepo::create(&state.pool, &input, &form.tags).await {
        Ok(blueprint) => blueprint,
        Err(e) => {
            discard_image(&state, &image_path).await;
            return Err(e.into());
        }
    };

    tracing::info!(
        blueprint_id = blueprint.id,
        user_id = auth.user_id,
        image_path = %blueprint.image_path,
        "Blueprint created",
    );

    Ok(Found::to(blueprint.url()))
}

/// GET /blueprints/{id}/update
pub async fn update_form(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<BlueprintFormContext>>> {
    find_owned(&state.pool, id, auth.user_id).await?;

    let blueprint = find_view(&state.pool, id).await?;
    let tags = TagRepo::list_all(&state.pool).await?;
    let selected_tags = TagRepo::list_for_blueprint(&state.pool, id)
        .await?
        .into_iter()
        .map(|t| t.id)
        .collect();

    Ok(Json(DataResponse {
        data: BlueprintFormContext {
            blueprint: Some(blueprint),
            tags,
            selected_tags,
        },
    }))
}

/// POST /blueprints/{id}/update
///
/// Same fields as create, but the image is optional: without one the current
/// image is kept. The tag set is replaced by the submitted one.
pub async fn update(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
    multipart: Multipart,
) -> AppResult<Found> {
    let current = find_owned(&state.pool, id, auth.user_id).await?;

    let form = BlueprintForm::read(multipart)
        .await?
        .clean(&state.pool, false)
        .await?;

    let new_image = match &form.image {
        Some((filename, bytes)) => {
            Some(store_image(&state, current.owner_id, filename, bytes).await?)
        }
        None => None,
    };

    let input = UpdateBlueprint {
        title: form.title,
        description: form.description,
        blueprint_string: form.blueprint_string,
        image_path: new_image.clone(),
    };
    let updated = match BlueprintRepo::update(&state.pool, id, &input, &form.tags).await {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(path) = &new_image {
                discard_image(&state, path).await;
            }
            return Err(e.into());
        }
    };
    let blueprint = updated.ok_or(AppError::Core(CoreError::NotFound {
        entity: "Blueprint",
        id,
    }))?;

    if new_image.is_some() && current.image_path != blueprint.image_path {
        discard_image(&state, &current.image_path).await;
    }

    tracing::info!(blueprint_id = id, user_id = auth.user_id, "Blueprint updated");

    Ok(Found::to(blueprint.url()))
}

/// GET /blueprints/{id}/delete
pub async fn delete_form(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<DeleteContext>>> {
    find_owned(&state.pool, id, auth.user_id).await?;
    let blueprint = find_view(&state.pool, id).await?;
    Ok(Json(DataResponse {
        data: DeleteContext { blueprint },
    }))
}

/// POST /blueprints/{id}/delete
///
/// Comments, likes and tag links go with the blueprint.
pub async fn delete(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<DbId>,
) -> AppResult<Found> {
    let blueprint = find_owned(&state.pool, id, auth.user_id).await?;

    if !BlueprintRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Blueprint",
            id,
        }));
    }
    discard_image(&state, &blueprint.image_path).await;

    tracing::info!(blueprint_id = id, user_id = auth.user_id, "Blueprint deleted");

    Ok(Found::to("/"))
}
