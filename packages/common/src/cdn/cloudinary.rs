use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use sha1::{Digest, Sha1};
use tracing::{debug, instrument};

use super::error::CdnError;
use super::traits::{DestroyOutcome, MediaCdn, UploadRequest, UploadedAsset};
use crate::config::CdnConfig;

/// Parameters the CDN never includes in a request signature.
const UNSIGNED_PARAMS: &[&str] = &["api_key", "cloud_name", "file", "resource_type", "signature"];

/// Build the canonical string that gets signed: signable parameters sorted by
/// name, rendered as `key=value` and joined with `&`. Empty values are dropped.
pub fn canonical_params(params: &BTreeMap<&str, String>) -> String {
    params
        .iter()
        .filter(|(key, value)| !UNSIGNED_PARAMS.contains(*key) && !value.is_empty())
        .map(|(key, value)| format!("{key}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Lowercase hex SHA-1 of the canonical parameter string followed by the API secret.
pub fn sign(params: &BTreeMap<&str, String>, api_secret: &str) -> String {
    let mut hasher = Sha1::new();
    hasher.update(canonical_params(params).as_bytes());
    hasher.update(api_secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[derive(Deserialize)]
struct DestroyResponse {
    result: String,
}

/// HTTP client for a Cloudinary-compatible upload API.
#[derive(Clone)]
pub struct CloudinaryClient {
    http: reqwest::Client,
    config: CdnConfig,
}

impl CloudinaryClient {
    pub fn new(config: CdnConfig, http: &reqwest::Client) -> Self {
        Self {
            http: http.clone(),
            config,
        }
    }

    fn endpoint(&self, action: &str) -> Result<String, CdnError> {
        if self.config.cloud_name.is_empty() {
            return Err(CdnError::MissingConfig("cdn.cloud_name"));
        }
        Ok(format!(
            "{}/v1_1/{}/image/{}",
            self.config.api_base_url.trim_end_matches('/'),
            self.config.cloud_name,
            action
        ))
    }

    fn credentials(&self) -> Result<(&str, &str), CdnError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|k| !k.is_empty())
            .ok_or(CdnError::MissingConfig("cdn.api_key"))?;
        let api_secret = self
            .config
            .api_secret
            .as_deref()
            .filter(|s| !s.is_empty())
            .ok_or(CdnError::MissingConfig("cdn.api_secret"))?;
        Ok((api_key, api_secret))
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CdnError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(CdnError::Rejected {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl MediaCdn for CloudinaryClient {
    #[instrument(skip(self, request), fields(file_name = %request.file_name, size = request.bytes.len()))]
    async fn upload(&self, request: UploadRequest) -> Result<UploadedAsset, CdnError> {
        let url = self.endpoint("upload")?;
        if self.config.upload_preset.is_empty() {
            return Err(CdnError::MissingConfig("cdn.upload_preset"));
        }

        let file = Part::bytes(request.bytes)
            .file_name(request.file_name)
            .mime_str(&request.content_type)?;
        let mut form = Form::new()
            .part("file", file)
            .text("upload_preset", self.config.upload_preset.clone());
        if let Some(folder) = request.folder {
            form = form.text("folder", folder);
        }

        let response = self.http.post(url).multipart(form).send().await?;
        let asset: UploadedAsset = check_status(response).await?.json().await?;

        debug!(public_id = %asset.public_id, "Uploaded asset");
        Ok(asset)
    }

    #[instrument(skip(self))]
    async fn destroy(&self, public_id: &str) -> Result<DestroyOutcome, CdnError> {
        let url = self.endpoint("destroy")?;
        let (api_key, api_secret) = self.credentials()?;

        let mut params = BTreeMap::new();
        params.insert("public_id", public_id.to_string());
        params.insert("timestamp", Utc::now().timestamp().to_string());
        let signature = sign(&params, api_secret);
        params.insert("api_key", api_key.to_string());
        params.insert("signature", signature);

        let response = self.http.post(url).form(&params).send().await?;
        let body: DestroyResponse = check_status(response).await?.json().await?;

        match body.result.as_str() {
            "ok" => Ok(DestroyOutcome::Deleted),
            "not found" => Ok(DestroyOutcome::NotFound),
            other => Err(CdnError::UnexpectedResponse(format!(
                "destroy returned result '{other}'"
            ))),
        }
    }
}
