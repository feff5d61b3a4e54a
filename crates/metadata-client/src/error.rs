use thiserror::Error;

/// Errors that can occur when talking to the metadata provider
#[derive(Error, Debug)]
pub enum MetadataError {
    /// Transport failure (connection refused, timeout, TLS, ...)
    #[error("Metadata request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider answered with a non-2xx status
    #[error("Metadata API returned status {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body was not the expected JSON shape
    #[error("Invalid response from metadata API: {0}")]
    Decode(String),
}

impl MetadataError {
    /// Whether the provider reported the title as unknown
    pub fn is_not_found(&self) -> bool {
        matches!(self, MetadataError::Status { status: 404, .. })
    }
}

pub type Result<T> = std::result::Result<T, MetadataError>;
