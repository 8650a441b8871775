mod error;
mod traits;

pub mod cloudinary;
pub mod transform;

pub use cloudinary::CloudinaryClient;
pub use error::CdnError;
pub use traits::{DestroyOutcome, MediaCdn, UploadRequest, UploadedAsset};
