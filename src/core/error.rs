//! Error types for the core module.

use std::time::Duration;

/// Failure talking to the image provider.
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    /// Provider credential not present in the environment.
    #[error("{env} is not configured")]
    CredentialMissing { env: String },

    /// HTTP request failed.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error response.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// Prediction finished without succeeding.
    #[error("prediction {status}: {message}")]
    Prediction { status: String, message: String },

    /// Prediction still running when the poll deadline passed.
    #[error("prediction timed out after {0:?}")]
    Timeout(Duration),

    /// Prediction succeeded but carried no image.
    #[error("No prediction result received from provider")]
    EmptyOutput,

    /// Failed to parse provider response.
    #[error("failed to parse response: {0}")]
    Parse(String),
}

/// Failure of a single prediction call made on behalf of the UI.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// Transport-level error reaching the relay.
    #[error("API request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Relay answered with a non-success status.
    #[error("API request failed with status: {status}")]
    Status { status: u16 },

    /// In-process provider call failed.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Relay answered 2xx without an `output` array.
    #[error("No output received from the API")]
    MissingOutput,

    /// Relay answered 2xx with a body that is not the expected envelope.
    #[error("malformed response: {0}")]
    Malformed(String),
}

impl RelayError {
    /// Whether the relay answered but the answer could not be understood.
    ///
    /// A malformed answer aborts the whole batch; any other failure only
    /// drops the one call.
    #[must_use]
    pub const fn is_malformed(&self) -> bool {
        matches!(self, Self::MissingOutput | Self::Malformed(_))
    }
}

/// Outcome of a generation batch that produced nothing usable.
#[derive(Debug, thiserror::Error)]
pub enum BatchError {
    /// Every call in the batch failed.
    #[error("Failed to generate any designs. Please try again.")]
    NoDesigns,

    /// A call returned something unreadable, discarding the batch.
    #[error("{0}")]
    Aborted(RelayError),
}

/// Failure saving a design to disk.
#[derive(Debug, thiserror::Error)]
pub enum DownloadError {
    /// HTTP request failed.
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Image host answered with a non-success status.
    #[error("image host returned status {0}")]
    Status(u16),

    /// Writing the file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
