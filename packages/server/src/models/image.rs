use vivah_common::api::Image;
use vivah_common::cdn::transform;

use crate::entity::uploaded_image;

pub use vivah_common::api::{CreateImageRequest, ImageListResponse, ImageResponse};

impl From<uploaded_image::Model> for Image {
    fn from(m: uploaded_image::Model) -> Self {
        Self {
            id: m.id,
            thumbnail_url: transform::thumbnail_url(&m.image_url),
            image_url: m.image_url,
            public_id: m.public_id,
            original_name: m.original_name,
            original_size: m.original_size,
            optimized_size: m.optimized_size,
            width: m.width,
            height: m.height,
            format: m.format,
            user_id: m.user_id,
            uploaded_at: m.uploaded_at,
        }
    }
}

/// Query parameters for `GET /images`.
#[derive(Debug, serde::Deserialize, utoipa::IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ImageListQuery {
    /// Maximum number of images to return (1-100). Default: 20.
    pub limit: Option<u64>,
    /// Number of images to skip. Default: 0.
    pub offset: Option<u64>,
    /// Only return images uploaded by the caller. Default: false.
    pub user_only: Option<bool>,
}
