//! Delivery-time transformations applied by rewriting CDN URLs.
//!
//! The upload preset already handles base optimization; these only shape what
//! gets delivered (thumbnails, automatic format/quality, device pixel ratio).

use std::fmt;

use crate::config::CdnConfig;

const UPLOAD_SEGMENT: &str = "/upload/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Crop {
    #[default]
    Fill,
    Fit,
    Limit,
    Scale,
}

impl Crop {
    fn as_str(self) -> &'static str {
        match self {
            Crop::Fill => "fill",
            Crop::Fit => "fit",
            Crop::Limit => "limit",
            Crop::Scale => "scale",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gravity {
    #[default]
    Auto,
    Center,
    Face,
}

impl Gravity {
    fn as_str(self) -> &'static str {
        match self {
            Gravity::Auto => "auto",
            Gravity::Center => "center",
            Gravity::Face => "face",
        }
    }
}

/// A comma-separated transformation segment such as `c_fill,g_auto,w_400`.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformation {
    pub crop: Crop,
    pub gravity: Gravity,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub quality: String,
    pub format: String,
    pub dpr: String,
}

impl Default for Transformation {
    fn default() -> Self {
        Self {
            crop: Crop::Fill,
            gravity: Gravity::Auto,
            width: None,
            height: None,
            quality: "auto".into(),
            format: "auto".into(),
            dpr: "auto".into(),
        }
    }
}

impl Transformation {
    /// Square gallery thumbnail with slightly more aggressive quality.
    pub fn thumbnail() -> Self {
        Self {
            width: Some(400),
            height: Some(400),
            quality: "auto:low".into(),
            ..Default::default()
        }
    }
}

impl fmt::Display for Transformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c_{},g_{}", self.crop.as_str(), self.gravity.as_str())?;
        if let Some(width) = self.width {
            write!(f, ",w_{width}")?;
        }
        if let Some(height) = self.height {
            write!(f, ",h_{height}")?;
        }
        write!(f, ",q_{},f_{},dpr_{}", self.quality, self.format, self.dpr)
    }
}

/// Insert a transformation right after `/upload/`. URLs that are not CDN
/// delivery URLs are returned unchanged.
pub fn apply(url: &str, transformation: &str) -> String {
    if !url.contains(UPLOAD_SEGMENT) {
        return url.to_string();
    }
    url.replacen(UPLOAD_SEGMENT, &format!("{UPLOAD_SEGMENT}{transformation}/"), 1)
}

pub fn thumbnail_url(url: &str) -> String {
    apply(url, &Transformation::thumbnail().to_string())
}

/// Full-size display image with mild delivery optimization.
pub fn full_image_url(url: &str) -> String {
    apply(url, "q_auto,f_auto,dpr_auto")
}

/// Delivery URL for a public id, fitted inside `width` x `height`.
pub fn optimized_url(config: &CdnConfig, public_id: &str, width: u32, height: u32) -> String {
    format!(
        "{}/{}/image/upload/w_{width},h_{height},c_fit,q_auto,f_auto/{public_id}",
        config.delivery_base_url.trim_end_matches('/'),
        config.cloud_name,
    )
}
