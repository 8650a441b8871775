use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use sea_orm::*;
use tracing::instrument;
use uuid::Uuid;
use vivah_common::api::Wish;

use crate::entity::best_wish;
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::{AuthUser, MaybeAuthUser};
use crate::extractors::json::AppJson;
use crate::models::shared::{PageQuery, parse_id, required_text, validate_optional_size};
use crate::models::wish::*;
use crate::state::AppState;

const DEFAULT_PAGE_SIZE: u64 = 50;

#[utoipa::path(
    get,
    path = "/",
    tag = "Wishes",
    operation_id = "listWishes",
    summary = "List approved wishes",
    description = "Returns approved, non-deleted wishes, newest first. Public.",
    params(PageQuery),
    responses(
        (status = 200, description = "Wishes wall", body = WishListResponse),
    ),
)]
#[instrument(skip(state, query))]
pub async fn list_wishes(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<WishListResponse>, AppError> {
    let (limit, offset) = query.resolve(DEFAULT_PAGE_SIZE)?;

    let wishes = best_wish::Entity::find()
        .filter(best_wish::Column::IsApproved.eq(true))
        .filter(best_wish::Column::IsDeleted.eq(false))
        .order_by_desc(best_wish::Column::CreatedAt)
        .order_by_desc(best_wish::Column::Id)
        .offset(Some(offset))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    Ok(Json(WishListResponse {
        wishes: wishes.into_iter().map(Wish::from).collect(),
    }))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Wishes",
    operation_id = "createWish",
    summary = "Post a wish",
    description = "Adds a wish to the guestbook. Anonymous posting is allowed; a valid bearer token links the wish to the caller so they can edit it later.",
    request_body = CreateWishRequest,
    responses(
        (status = 201, description = "Wish created", body = WishResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Invalid token (TOKEN_INVALID)", body = ErrorBody),
    ),
    security((), ("jwt" = [])),
)]
#[instrument(skip(state, caller, payload))]
pub async fn create_wish(
    caller: MaybeAuthUser,
    State(state): State<AppState>,
    AppJson(payload): AppJson<CreateWishRequest>,
) -> Result<impl IntoResponse, AppError> {
    let text = required_text(payload.text.as_deref(), MAX_TEXT_CHARS);
    let author = required_text(payload.author.as_deref(), MAX_AUTHOR_CHARS);
    let (Some(text), Some(author)) = (text, author) else {
        return Err(AppError::Validation(format!(
            "Missing required fields: text (max {MAX_TEXT_CHARS} chars) and author (max {MAX_AUTHOR_CHARS} chars) are required"
        )));
    };
    validate_optional_size(payload.image_size, "image_size")?;

    let now = chrono::Utc::now();
    let new_wish = best_wish::ActiveModel {
        id: Set(Uuid::now_v7()),
        text: Set(text),
        author: Set(author),
        user_id: Set(caller.0.map(|user| user.user_id)),
        image_url: Set(payload.image_url),
        image_filename: Set(payload.image_filename),
        image_size: Set(payload.image_size),
        is_approved: Set(state.config.wishes.auto_approve),
        is_deleted: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
    };

    let model = new_wish.insert(&state.db).await?;
    tracing::info!(wish_id = %model.id, anonymous = model.user_id.is_none(), "Wish created");

    Ok((
        StatusCode::CREATED,
        Json(WishResponse {
            wish: model.into(),
        }),
    ))
}

#[utoipa::path(
    get,
    path = "/mine",
    tag = "Wishes",
    operation_id = "listMyWishes",
    summary = "List the caller's wishes",
    description = "Returns the caller's non-deleted wishes, approved or not, newest first.",
    params(PageQuery),
    responses(
        (status = 200, description = "Caller's wishes", body = WishListResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = %auth_user.user_id))]
pub async fn list_my_wishes(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<Json<WishListResponse>, AppError> {
    let (limit, offset) = query.resolve(DEFAULT_PAGE_SIZE)?;

    let wishes = best_wish::Entity::find()
        .filter(best_wish::Column::UserId.eq(auth_user.user_id.as_str()))
        .filter(best_wish::Column::IsDeleted.eq(false))
        .order_by_desc(best_wish::Column::CreatedAt)
        .order_by_desc(best_wish::Column::Id)
        .offset(Some(offset))
        .limit(Some(limit))
        .all(&state.db)
        .await?;

    Ok(Json(WishListResponse {
        wishes: wishes.into_iter().map(Wish::from).collect(),
    }))
}

#[utoipa::path(
    patch,
    path = "/{id}",
    tag = "Wishes",
    operation_id = "updateWish",
    summary = "Edit a wish",
    description = "Partially updates a wish. Only the author or a moderator may edit. Image fields accept `null` to remove the attachment.",
    params(("id" = Uuid, Path, description = "Wish ID")),
    request_body = UpdateWishRequest,
    responses(
        (status = 200, description = "Wish updated", body = WishResponse),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Wish not found (NOT_FOUND)", body = ErrorBody),
        (status = 409, description = "Wish was deleted (CONFLICT)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id, user_id = %auth_user.user_id))]
pub async fn update_wish(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<UpdateWishRequest>,
) -> Result<Json<WishResponse>, AppError> {
    let id = parse_id(&id, "wish")?;
    let model = find_wish(&state.db, id).await?;

    if !auth_user.can_modify(model.user_id.as_deref()) {
        return Err(AppError::PermissionDenied);
    }
    if model.is_deleted {
        return Err(AppError::Conflict("Cannot update a deleted wish".into()));
    }

    let mut active: best_wish::ActiveModel = model.into();
    if let Some(text) = payload.text.as_deref() {
        let text = required_text(Some(text), MAX_TEXT_CHARS).ok_or_else(|| {
            AppError::Validation(format!("text must be 1-{MAX_TEXT_CHARS} characters"))
        })?;
        active.text = Set(text);
    }
    if let Some(author) = payload.author.as_deref() {
        let author = required_text(Some(author), MAX_AUTHOR_CHARS).ok_or_else(|| {
            AppError::Validation(format!("author must be 1-{MAX_AUTHOR_CHARS} characters"))
        })?;
        active.author = Set(author);
    }
    if let Some(image_url) = payload.image_url {
        active.image_url = Set(image_url);
    }
    if let Some(image_filename) = payload.image_filename {
        active.image_filename = Set(image_filename);
    }
    if let Some(image_size) = payload.image_size {
        validate_optional_size(image_size, "image_size")?;
        active.image_size = Set(image_size);
    }
    active.updated_at = Set(chrono::Utc::now());

    let updated = active.update(&state.db).await?;
    Ok(Json(WishResponse {
        wish: updated.into(),
    }))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Wishes",
    operation_id = "deleteWish",
    summary = "Delete a wish",
    description = "Soft-deletes a wish. Only the author or a moderator may delete.",
    params(("id" = Uuid, Path, description = "Wish ID")),
    responses(
        (status = 204, description = "Wish deleted"),
        (status = 400, description = "Invalid ID (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Not the author (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Wish not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user), fields(id = %id, user_id = %auth_user.user_id))]
pub async fn delete_wish(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    let id = parse_id(&id, "wish")?;
    let model = find_wish(&state.db, id).await?;
    if model.is_deleted {
        return Err(not_found());
    }
    if !auth_user.can_modify(model.user_id.as_deref()) {
        return Err(AppError::PermissionDenied);
    }

    let mut active: best_wish::ActiveModel = model.into();
    active.is_deleted = Set(true);
    active.updated_at = Set(chrono::Utc::now());
    active.update(&state.db).await?;

    tracing::info!(wish_id = %id, "Wish deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[utoipa::path(
    put,
    path = "/{id}/approval",
    tag = "Wishes",
    operation_id = "setWishApproval",
    summary = "Approve or hide a wish",
    description = "Sets the moderation flag. Requires the moderator or admin role.",
    params(("id" = Uuid, Path, description = "Wish ID")),
    request_body = WishApprovalRequest,
    responses(
        (status = 200, description = "Moderation flag updated", body = WishResponse),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Wish not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("jwt" = [])),
)]
#[instrument(skip(state, auth_user, payload), fields(id = %id, approved = payload.is_approved))]
pub async fn set_wish_approval(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<String>,
    AppJson(payload): AppJson<WishApprovalRequest>,
) -> Result<Json<WishResponse>, AppError> {
    auth_user.require_moderator()?;
    let id = parse_id(&id, "wish")?;
    let model = find_wish(&state.db, id).await?;
    if model.is_deleted {
        return Err(not_found());
    }

    let mut active: best_wish::ActiveModel = model.into();
    active.is_approved = Set(payload.is_approved);
    active.updated_at = Set(chrono::Utc::now());
    let updated = active.update(&state.db).await?;

    Ok(Json(WishResponse {
        wish: updated.into(),
    }))
}

fn not_found() -> AppError {
    AppError::NotFound("Wish not found".into())
}

async fn find_wish<C: ConnectionTrait>(db: &C, id: Uuid) -> Result<best_wish::Model, AppError> {
    best_wish::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(not_found)
}
