use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;
use vivah_common::api::Image;
use vivah_common::cdn::DestroyOutcome;

use crate::entity::uploaded_image;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::extractors::json::AppJson;
use crate::models::image::*;
use crate::models::shared::{parse_id, resolve_page, validate_optional_size};
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 20;

fn required(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Images",
    operation_id = "createImage",
    summary = "Record an uploaded image",
    description = "Saves metadata for an image the client already uploaded to the CDN. The owner is always the caller.",
    request_body = CreateImageRequest,
    responses(
        (status = 201, description = "Image recorded", body = ImageResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 409, description = "public_id already recorded (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(user_id = %auth_user.user_id))]
pub async fn create_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateImageRequest>,
) -> Result<impl IntoResponse, AppError> {
    let image_url = required(payload.image_url);
    let public_id = required(payload.public_id);
    let original_name = required(payload.original_name);
    let (Some(image_url), Some(public_id), Some(original_name)) =
        (image_url, public_id, original_name)
    else {
        return Err(AppError::Validation(
            "Missing required fields: image_url, original_name and public_id are required".into(),
        ));
    };
    validate_optional_size(payload.original_size, "original_size")?;
    validate_optional_size(payload.optimized_size, "optimized_size")?;

    let conflict = format!("Image '{public_id}' is already recorded");
    let new_image = uploaded_image::ActiveModel {
        id: Set(Uuid::now_v7()),
        image_url: Set(image_url),
        public_id: Set(public_id),
        original_name: Set(original_name),
        original_size: Set(payload.original_size),
        optimized_size: Set(payload.optimized_size),
        width: Set(payload.width),
        height: Set(payload.height),
        format: Set(payload.format),
        user_id: Set(Some(auth_user.user_id)),
        uploaded_at: Set(chrono::Utc::now()),
        is_deleted: Set(false),
    };

    let model = new_image.insert(&state.db).await.map_err(|e| match e.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => AppError::Conflict(conflict),
        _ => AppError::from(e),
    })?;
    tracing::info!(image_id = %model.id, public_id = %model.public_id, "Image recorded");

    Ok((
        StatusCode::CREATED,
        Json(ImageResponse {
            success: true,
            image: model.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Images",
    operation_id = "listImages",
    summary = "List gallery images",
    description = "Returns non-deleted images, newest first. With `user_only=true` only the caller's uploads are returned; otherwise every guest's images are listed.",
    params(ImageListQuery),
    responses(
        (status = 200, description = "Images", body = ImageListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = %auth_user.user_id))]
pub async fn list_images(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<ImageListQuery>,
) -> Result<Json<ImageListResponse>, AppError> {
    let (limit, offset) = resolve_page(query.limit, query.offset, DEFAULT_PAGE_SIZE)?;

    let mut select = uploaded_image::Entity::find().filter(uploaded_image::Column::IsDeleted.eq(false));
    if query.user_only.unwrap_or(false) {
        select = select.filter(uploaded_image::Column::UserId.eq(auth_user.user_id.as_str()));
    }

    let images: Vec<Image> = select
        .order_by_desc(uploaded_image::Column::UploadedAt)
        .order_by_desc(uploaded_image::Column::Id)
        .offset(Some(offset))
        .limit(Some(limit))
        .all(&state.db)
        .await?
        .into_iter()
        .map(Image::from)
        .collect();

    Ok(Json(ImageListResponse {
        success: true,
        count: images.len(),
        images,
    }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Images",
    operation_id = "deleteImage",
    summary = "Delete an image",
    description = "Soft-deletes one of the caller's images, then asks the CDN to remove the asset. A CDN failure is logged and does not fail the request. Images owned by someone else are reported as not found.",
    params(("id" = Uuid, Path, description = "Image ID")),
    responses(
        (status = 204, description = "Image deleted"),
        (status = 400, description = "Invalid ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 404, description = "Image not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id, user_id = %auth_user.user_id))]
pub async fn delete_image(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "image")?;

    let model = uploaded_image::Entity::find_by_id(id)
        .filter(uploaded_image::Column::UserId.eq(auth_user.user_id.as_str()))
        .filter(uploaded_image::Column::IsDeleted.eq(false))
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Image not found".into()))?;

    let public_id = model.public_id.clone();
    let mut active: uploaded_image::ActiveModel = model.into();
    active.is_deleted = Set(true);
    active.update(&state.db).await?;

    match state.cdn.destroy(&public_id).await {
        Ok(DestroyOutcome::Deleted) => {
            tracing::info!(%public_id, "Removed asset from CDN");
        }
        Ok(DestroyOutcome::NotFound) => {
            tracing::warn!(%public_id, "CDN asset was already gone");
        }
        Err(e) => {
            tracing::warn!(%public_id, error = %e, "CDN destroy failed, asset left in place");
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
