use thiserror::Error;

/// Errors that can occur while talking to the media CDN.
#[derive(Debug, Error)]
pub enum CdnError {
    /// A required configuration value is empty or missing.
    #[error("missing CDN configuration: {0}")]
    MissingConfig(&'static str),

    #[error("CDN request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The CDN answered with a non-success status.
    #[error("CDN rejected request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("unexpected CDN response: {0}")]
    UnexpectedResponse(String),
}
