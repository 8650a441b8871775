use vivah_common::api::Wish;

use crate::entity::best_wish;

pub use vivah_common::api::{
    CreateWishRequest, UpdateWishRequest, WishApprovalRequest, WishListResponse, WishResponse,
};

pub const MAX_TEXT_CHARS: usize = 2000;
pub const MAX_AUTHOR_CHARS: usize = 100;

impl From<best_wish::Model> for Wish {
    fn from(m: best_wish::Model) -> Self {
        Self {
            id: m.id,
            text: m.text,
            author: m.author,
            user_id: m.user_id,
            image_url: m.image_url,
            image_filename: m.image_filename,
            image_size: m.image_size,
            is_approved: m.is_approved,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
