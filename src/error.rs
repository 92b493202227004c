use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OcrError {
    #[error("Invalid REST OCR configuration: {0}")]
    Config(String),

    #[error("Failed to read document {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("REST OCR API at {endpoint} rejected the request with HTTP {status}{}", excerpt(.body))]
    ClientError {
        status: u16,
        endpoint: String,
        body: String,
    },

    #[error("REST OCR API at {endpoint} returned unexpected HTTP status {status}")]
    UnexpectedStatus { status: u16, endpoint: String },

    #[error("REST OCR request to {endpoint} failed: {last_error}. All {attempts} attempts failed.")]
    RetryExhausted {
        endpoint: String,
        attempts: u32,
        last_error: String,
    },

    #[error("REST OCR response from {endpoint} exceeds the {max} byte limit")]
    ResponseTooLarge { endpoint: String, max: u64 },

    #[error("Could not extract text from REST OCR response. Response keys: {keys:?}")]
    UnrecognizedResponseFormat { keys: Vec<String> },

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl OcrError {
    /// Stable machine-readable code for this failure kind
    pub fn code(&self) -> &'static str {
        match self {
            OcrError::Config(_) => "CONFIG_ERROR",
            OcrError::Io { .. } => "IO_ERROR",
            OcrError::ClientError { .. } => "CLIENT_ERROR",
            OcrError::UnexpectedStatus { .. } => "UNEXPECTED_STATUS",
            OcrError::RetryExhausted { .. } => "RETRY_EXHAUSTED",
            OcrError::ResponseTooLarge { .. } => "RESPONSE_TOO_LARGE",
            OcrError::UnrecognizedResponseFormat { .. } => "UNRECOGNIZED_RESPONSE_FORMAT",
            OcrError::InvalidRequest(_) => "INVALID_REQUEST",
        }
    }

    /// HTTP status carried by the failure, if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            OcrError::ClientError { status, .. } | OcrError::UnexpectedStatus { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }
}

/// Serialized form of an [`OcrError`] for JSON output
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

impl From<&OcrError> for ErrorResponse {
    fn from(err: &OcrError) -> Self {
        Self {
            error: err.to_string(),
            code: err.code().to_string(),
            status: err.status(),
        }
    }
}

/// Error bodies can be whole HTML pages; keep the first 200 characters.
fn excerpt(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    let short: String = trimmed.chars().take(200).collect();
    format!(" - {}", short)
}
