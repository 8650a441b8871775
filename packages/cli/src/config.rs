use std::path::Path;

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use vivah_common::CdnConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Server root, without the `/api/v1` suffix.
    pub base_url: String,
    /// Bearer token from the identity provider. Anonymous when unset.
    #[serde(default)]
    pub token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CacheConfig {
    /// How long a wishes page is served without refetching. Default: 900.
    pub wishes_ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// CDN folder for gallery uploads.
    #[serde(default)]
    pub folder: Option<String>,
    /// Folder for images attached to wishes.
    pub wishes_folder: String,
    /// Requested JPEG quality in (0, 1]. Default: 0.92.
    pub quality: f32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClientConfig {
    pub api: ApiConfig,
    #[serde(default)]
    pub cdn: CdnConfig,
    pub cache: CacheConfig,
    pub upload: UploadConfig,
}

impl ClientConfig {
    /// Layer defaults, `vivah.toml` (or the given file) and `VIVAH__*` variables.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name("vivah").required(false),
        };

        Config::builder()
            .set_default("api.base_url", "http://127.0.0.1:3000")?
            .set_default("cache.wishes_ttl_secs", 900)?
            .set_default("upload.wishes_folder", "best-wishes")?
            .set_default("upload.quality", 0.92)?
            .add_source(file)
            // e.g. VIVAH__API__TOKEN, VIVAH__CDN__CLOUD_NAME
            .add_source(Environment::with_prefix("VIVAH").separator("__"))
            .build()?
            .try_deserialize()
    }
}
