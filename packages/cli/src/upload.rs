//! Image upload workflow: validate, compress, push to the CDN, then record
//! the metadata on the server.

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde::Serialize;
use tracing::{info, instrument, warn};
use vivah_common::api::{CreateImageRequest, Image};
use vivah_common::cdn::{MediaCdn, UploadRequest, UploadedAsset};

use crate::compress::{CompressionOptions, SourceFile, compress_image, validate_file};
use crate::error::ClientError;

/// Per-item progress of a batch upload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadStatus {
    Pending,
    Uploading,
    Success,
    Error,
}

/// Persists image metadata after a successful CDN upload.
#[async_trait]
pub trait MetadataSink: Send + Sync {
    async fn save_image(&self, request: &CreateImageRequest) -> Result<Image, ClientError>;
}

#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub asset: UploadedAsset,
    pub original_name: String,
    pub original_size: usize,
    pub optimized_size: usize,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: Option<u8>,
    /// Server record; `None` when no sink is configured or saving failed.
    pub record: Option<Image>,
}

#[derive(Debug)]
pub struct UploadItem {
    pub file_name: String,
    pub status: UploadStatus,
    pub result: Result<UploadOutcome, ClientError>,
}

#[derive(Debug, Default)]
pub struct BatchReport {
    pub items: Vec<UploadItem>,
    /// Names of files skipped because an identical one was already queued.
    pub duplicates: Vec<String>,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.items
            .iter()
            .filter(|i| i.status == UploadStatus::Success)
            .count()
    }

    pub fn failed(&self) -> usize {
        self.items.len() - self.succeeded()
    }
}

pub struct Uploader {
    cdn: Arc<dyn MediaCdn>,
    metadata: Option<Arc<dyn MetadataSink>>,
    options: CompressionOptions,
}

impl Uploader {
    pub fn new(cdn: Arc<dyn MediaCdn>, options: CompressionOptions) -> Self {
        Self {
            cdn,
            metadata: None,
            options,
        }
    }

    pub fn with_metadata(mut self, sink: Arc<dyn MetadataSink>) -> Self {
        self.metadata = Some(sink);
        self
    }

    /// Upload one file. A failed metadata save is logged and does not fail
    /// the upload.
    #[instrument(skip(self, source), fields(file = %source.name))]
    pub async fn upload(
        &self,
        source: SourceFile,
        folder: Option<&str>,
    ) -> Result<UploadOutcome, ClientError> {
        validate_file(&source)?;
        let original_name = source.name.clone();

        let compressed = compress_image(source, self.options.clone()).await?;
        let original_size = compressed.original_size;
        let optimized_size = compressed.optimized_size();
        let (width, height, quality) = (compressed.width, compressed.height, compressed.quality);
        let format = compressed.format();

        let asset = self
            .cdn
            .upload(UploadRequest {
                bytes: compressed.bytes,
                file_name: compressed.file_name,
                content_type: compressed.content_type,
                folder: folder.map(str::to_string),
            })
            .await?;
        info!(public_id = %asset.public_id, optimized_size, "Uploaded to CDN");

        let record = match &self.metadata {
            Some(sink) => {
                let request = CreateImageRequest {
                    image_url: Some(asset.secure_url.clone()),
                    public_id: Some(asset.public_id.clone()),
                    original_name: Some(original_name.clone()),
                    original_size: Some(original_size as i64),
                    optimized_size: Some(optimized_size as i64),
                    width: width.or(asset.width).map(|w| w as i32),
                    height: height.or(asset.height).map(|h| h as i32),
                    format: asset.format.clone().or(format),
                };
                match sink.save_image(&request).await {
                    Ok(image) => Some(image),
                    Err(e) => {
                        warn!(public_id = %asset.public_id, error = %e, "Image uploaded but saving metadata failed");
                        None
                    }
                }
            }
            None => None,
        };

        Ok(UploadOutcome {
            asset,
            original_name,
            original_size,
            optimized_size,
            width,
            height,
            quality,
            record,
        })
    }

    pub async fn upload_batch(&self, sources: Vec<SourceFile>, folder: Option<&str>) -> BatchReport {
        self.upload_batch_with_progress(sources, folder, &|_, _| {})
            .await
    }

    /// Upload every file concurrently and wait for all of them. Each file
    /// succeeds or fails on its own; `progress` sees every status change.
    pub async fn upload_batch_with_progress(
        &self,
        sources: Vec<SourceFile>,
        folder: Option<&str>,
        progress: &(dyn Fn(&str, UploadStatus) + Sync),
    ) -> BatchReport {
        let mut seen = HashSet::new();
        let mut duplicates = Vec::new();
        let mut queued = Vec::new();
        for source in sources {
            if seen.insert((source.name.clone(), source.size())) {
                progress(&source.name, UploadStatus::Pending);
                queued.push(source);
            } else {
                warn!(file = %source.name, "Skipping duplicate file");
                duplicates.push(source.name);
            }
        }

        let uploads = queued.into_iter().map(|source| async move {
            let file_name = source.name.clone();
            progress(&file_name, UploadStatus::Uploading);
            let result = self.upload(source, folder).await;
            let status = match &result {
                Ok(_) => UploadStatus::Success,
                Err(e) => {
                    warn!(file = %file_name, error = %e, "Upload failed");
                    UploadStatus::Error
                }
            };
            progress(&file_name, status);
            UploadItem {
                file_name,
                status,
                result,
            }
        });

        BatchReport {
            items: join_all(uploads).await,
            duplicates,
        }
    }
}
