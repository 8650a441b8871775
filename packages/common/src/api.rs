//! JSON bodies exchanged between the API server and its clients.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Structured error response returned by all endpoints on failure.
#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Machine-readable error code. One of: `VALIDATION_ERROR`, `TOKEN_MISSING`,
    /// `TOKEN_INVALID`, `PERMISSION_DENIED`, `NOT_FOUND`, `CONFLICT`,
    /// `INTERNAL_ERROR`.
    #[schema(example = "VALIDATION_ERROR")]
    pub code: String,
    /// Human-readable error description.
    #[schema(example = "Missing required fields: text and author are required")]
    pub message: String,
}

/// Serde helper for PATCH semantics on nullable fields.
///
/// * JSON field absent  => `None`          (don't update)
/// * JSON field = null  => `Some(None)`    (set to NULL)
/// * JSON field = value => `Some(Some(v))` (set to value)
pub fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Some(Option::deserialize(deserializer)?))
}

// ---------------------------------------------------------------------------
// Wishes
// ---------------------------------------------------------------------------

/// A guestbook entry as shown on the wishes wall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Wish {
    pub id: Uuid,
    #[schema(example = "Wishing you a lifetime of laughter!")]
    pub text: String,
    #[schema(example = "Auntie Meera")]
    pub author: String,
    /// Identity-provider subject of the poster, if they were signed in.
    pub user_id: Option<String>,
    pub image_url: Option<String>,
    pub image_filename: Option<String>,
    /// Attached image size in bytes.
    pub image_size: Option<i64>,
    pub is_approved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateWishRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_size: Option<i64>,
}

/// Partial update of a wish. Only the owner or a moderator may apply it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct UpdateWishRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub image_url: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<String>)]
    pub image_filename: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "double_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[schema(value_type = Option<i64>)]
    pub image_size: Option<Option<i64>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WishApprovalRequest {
    pub is_approved: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WishResponse {
    pub wish: Wish,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct WishListResponse {
    pub wishes: Vec<Wish>,
}

// ---------------------------------------------------------------------------
// Images
// ---------------------------------------------------------------------------

/// Metadata for a photo stored on the media CDN.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct Image {
    pub id: Uuid,
    #[schema(example = "https://res.cloudinary.com/demo/image/upload/v1/gallery/abc.jpg")]
    pub image_url: String,
    /// Delivery URL for a 400x400 gallery thumbnail.
    pub thumbnail_url: String,
    #[schema(example = "gallery/abc")]
    pub public_id: String,
    pub original_name: String,
    pub original_size: Option<i64>,
    pub optimized_size: Option<i64>,
    pub width: Option<i32>,
    pub height: Option<i32>,
    pub format: Option<String>,
    pub user_id: Option<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CreateImageRequest {
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub public_id: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub optimized_size: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ImageResponse {
    pub success: bool,
    pub image: Image,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ImageListResponse {
    pub success: bool,
    pub images: Vec<Image>,
    pub count: usize,
}
