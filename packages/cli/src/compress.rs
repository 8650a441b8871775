//! Pre-upload validation and adaptive JPEG compression.
//!
//! Small files are passed through untouched. Larger ones are scaled to fit the
//! display bounds and re-encoded at decreasing quality until they fit the byte
//! budget or reach the quality floor.

use std::io::Cursor;
use std::path::Path;

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::io::Reader as ImageReader;
use image::{ColorType, GenericImageView};
use tracing::{debug, info, instrument};

use crate::error::ClientError;

const MIB: usize = 1024 * 1024;

/// Largest file accepted for upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * MIB;

const ALLOWED_SUBTYPES: &[&str] = &["jpeg", "jpg", "png", "webp", "gif"];

/// Quality percentages used for the resolution-based starting point.
const HIGH_QUALITY: u8 = 95;
const STANDARD_QUALITY: u8 = 92;

/// A file picked for upload.
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl SourceFile {
    pub async fn from_path(path: &Path) -> Result<Self, ClientError> {
        let bytes = tokio::fs::read(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload".to_string());
        let content_type = mime_guess::from_path(path)
            .first_or_octet_stream()
            .essence_str()
            .to_string();
        Ok(Self {
            name,
            content_type,
            bytes,
        })
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

#[derive(Debug, Clone)]
pub struct CompressionOptions {
    pub max_width: u32,
    pub max_height: u32,
    /// Requested quality as a percentage (1-100).
    pub quality: u8,
    /// Files smaller than this are uploaded as-is.
    pub skip_below: usize,
    /// Stop re-encoding once the output is at most this many bytes.
    pub target_bytes: usize,
    pub min_quality: u8,
    pub quality_step: u8,
    pub max_attempts: u32,
}

impl Default for CompressionOptions {
    fn default() -> Self {
        Self {
            max_width: 2560,
            max_height: 1440,
            quality: STANDARD_QUALITY,
            skip_below: 2 * MIB,
            target_bytes: 2 * MIB,
            min_quality: 75,
            quality_step: 10,
            max_attempts: 4,
        }
    }
}

impl CompressionOptions {
    /// Options with the requested quality given as a fraction, e.g. `0.92`.
    pub fn with_quality_fraction(fraction: f32) -> Self {
        let percent = (fraction.clamp(0.0, 1.0) * 100.0).round() as u8;
        Self {
            quality: percent.max(1),
            ..Default::default()
        }
    }
}

/// Result of [`compress`]. `bytes` is what gets uploaded.
#[derive(Debug, Clone)]
pub struct CompressedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
    pub original_size: usize,
    pub width: Option<u32>,
    pub height: Option<u32>,
    /// Final encoder quality; `None` when the file was passed through.
    pub quality: Option<u8>,
    pub attempts: u32,
}

impl CompressedImage {
    pub fn optimized_size(&self) -> usize {
        self.bytes.len()
    }

    pub fn was_compressed(&self) -> bool {
        self.quality.is_some()
    }

    /// Format label stored with the image metadata.
    pub fn format(&self) -> Option<String> {
        self.content_type
            .strip_prefix("image/")
            .map(str::to_string)
    }
}

/// Reject files that are not supported images or are too large to upload.
pub fn validate_file(file: &SourceFile) -> Result<(), ClientError> {
    let Some(subtype) = file.content_type.strip_prefix("image/") else {
        return Err(ClientError::Validation(format!(
            "{} is not an image ({})",
            file.name, file.content_type
        )));
    };
    if !ALLOWED_SUBTYPES.contains(&subtype) {
        return Err(ClientError::Validation(format!(
            "{}: unsupported image type {}; use JPEG, PNG, WebP or GIF",
            file.name, file.content_type
        )));
    }
    if file.size() > MAX_UPLOAD_BYTES {
        return Err(ClientError::Validation(format!(
            "{} is {:.1} MB; the limit is 10 MB",
            file.name,
            file.size() as f64 / MIB as f64
        )));
    }
    Ok(())
}

/// Scale `(width, height)` to fit inside the bounds, keeping the aspect ratio.
/// The width is clamped first, then the height.
pub fn fit_within(width: u32, height: u32, max_width: u32, max_height: u32) -> (u32, u32) {
    let (mut w, mut h) = (width as f64, height as f64);
    if w > max_width as f64 {
        h = h * max_width as f64 / w;
        w = max_width as f64;
    }
    if h > max_height as f64 {
        w = w * max_height as f64 / h;
        h = max_height as f64;
    }
    ((w.round() as u32).max(1), (h.round() as u32).max(1))
}

/// Starting quality for a `width` x `height` output. High-resolution images
/// tolerate slightly lower quality; small ones keep the maximum.
pub fn starting_quality(width: u32, height: u32, requested: u8) -> u8 {
    let megapixels = (width as f64 * height as f64) / 1_000_000.0;
    let quality = if megapixels > 8.0 {
        STANDARD_QUALITY.max(requested)
    } else if megapixels > 2.0 {
        HIGH_QUALITY.max(requested)
    } else {
        HIGH_QUALITY
    };
    quality.min(100)
}

fn jpeg_name(name: &str) -> String {
    let stem = Path::new(name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "image".to_string());
    format!("{stem}.jpg")
}

fn encode_jpeg(pixels: &[u8], width: u32, height: u32, quality: u8) -> Result<Vec<u8>, ClientError> {
    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality).encode(pixels, width, height, ColorType::Rgb8)?;
    Ok(out)
}

fn read_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    let reader = ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?;
    match reader.into_dimensions() {
        Ok(dims) => Some(dims),
        Err(e) => {
            tracing::warn!(error = %e, "Could not read image dimensions");
            None
        }
    }
}

/// Compress `source` according to `options`. CPU-bound; see [`compress_image`].
#[instrument(skip_all, fields(file = %source.name, size = source.size()))]
pub fn compress(source: &SourceFile, options: &CompressionOptions) -> Result<CompressedImage, ClientError> {
    let original_size = source.size();

    if original_size < options.skip_below {
        debug!("Below compression threshold, uploading original");
        let dims = read_dimensions(&source.bytes);
        return Ok(CompressedImage {
            file_name: source.name.clone(),
            content_type: source.content_type.clone(),
            bytes: source.bytes.clone(),
            original_size,
            width: dims.map(|d| d.0),
            height: dims.map(|d| d.1),
            quality: None,
            attempts: 0,
        });
    }

    let decoded = image::load_from_memory(&source.bytes)?;
    let (src_w, src_h) = decoded.dimensions();
    let (width, height) = fit_within(src_w, src_h, options.max_width, options.max_height);
    let scaled = if (width, height) == (src_w, src_h) {
        decoded
    } else {
        decoded.resize_exact(width, height, FilterType::Triangle)
    };
    let pixels = scaled.to_rgb8();

    let floor = options.min_quality.clamp(1, 100);
    let mut quality = starting_quality(width, height, options.quality).max(floor);
    let mut attempts = 0;
    let bytes = loop {
        attempts += 1;
        let encoded = encode_jpeg(pixels.as_raw(), width, height, quality)?;
        debug!(quality, attempts, size = encoded.len(), "Encoded attempt");

        if encoded.len() <= options.target_bytes
            || quality <= floor
            || attempts >= options.max_attempts
        {
            break encoded;
        }
        quality = quality.saturating_sub(options.quality_step).max(floor);
    };

    info!(
        original = original_size,
        optimized = bytes.len(),
        width,
        height,
        quality,
        attempts,
        "Compressed image"
    );

    Ok(CompressedImage {
        file_name: jpeg_name(&source.name),
        content_type: "image/jpeg".to_string(),
        bytes,
        original_size,
        width: Some(width),
        height: Some(height),
        quality: Some(quality),
        attempts,
    })
}

/// Run [`compress`] on the blocking pool.
pub async fn compress_image(
    source: SourceFile,
    options: CompressionOptions,
) -> Result<CompressedImage, ClientError> {
    tokio::task::spawn_blocking(move || compress(&source, &options)).await?
}
