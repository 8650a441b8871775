use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::error::CdnError;

/// A file ready to be pushed to the CDN.
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub content_type: String,
    /// Optional folder the asset is filed under (e.g. "best-wishes").
    pub folder: Option<String>,
}

/// What the CDN reports back after a successful upload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UploadedAsset {
    pub secure_url: String,
    pub public_id: String,
    #[serde(default)]
    pub bytes: Option<u64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub format: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestroyOutcome {
    Deleted,
    /// The asset was already gone.
    NotFound,
}

/// Image storage and delivery provider.
#[async_trait]
pub trait MediaCdn: Send + Sync {
    /// Unsigned upload governed by the configured upload preset.
    async fn upload(&self, request: UploadRequest) -> Result<UploadedAsset, CdnError>;

    /// Signed, permanent removal of an asset by its public identifier.
    async fn destroy(&self, public_id: &str) -> Result<DestroyOutcome, CdnError>;
}
