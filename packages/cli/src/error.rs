use thiserror::Error;
use vivah_common::cdn::CdnError;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("{0}")]
    Validation(String),

    #[error("API returned {status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CDN error: {0}")]
    Cdn(#[from] CdnError),

    #[error("Image processing failed: {0}")]
    Image(#[from] image::ImageError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}
