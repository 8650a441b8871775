use serde::Deserialize;

/// Media CDN configuration shared by the server (signed destroy) and the
/// guest client (unsigned upload).
#[derive(Debug, Deserialize, Clone)]
pub struct CdnConfig {
    /// Cloud name that namespaces every asset. Default: "" (unset).
    #[serde(default)]
    pub cloud_name: String,
    /// Upload preset used for unsigned uploads. Default: "unsigned".
    #[serde(default = "default_upload_preset")]
    pub upload_preset: String,
    /// API key for signed requests. Only the server needs it.
    #[serde(default)]
    pub api_key: Option<String>,
    /// API secret for signed requests. Only the server needs it.
    #[serde(default)]
    pub api_secret: Option<String>,
    /// Upload/admin API root. Default: "https://api.cloudinary.com".
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
    /// Delivery root for public asset URLs. Default: "https://res.cloudinary.com".
    #[serde(default = "default_delivery_base_url")]
    pub delivery_base_url: String,
}

fn default_upload_preset() -> String {
    "unsigned".into()
}
fn default_api_base_url() -> String {
    "https://api.cloudinary.com".into()
}
fn default_delivery_base_url() -> String {
    "https://res.cloudinary.com".into()
}

impl Default for CdnConfig {
    fn default() -> Self {
        Self {
            cloud_name: String::new(),
            upload_preset: default_upload_preset(),
            api_key: None,
            api_secret: None,
            api_base_url: default_api_base_url(),
            delivery_base_url: default_delivery_base_url(),
        }
    }
}
