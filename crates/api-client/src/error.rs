use reqwest::StatusCode;
use rpm_upload_core::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// An identifier failed validation; no request was sent.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The service answered with a non-2xx status.
    #[error("{operation} failed ({status}): {body}")]
    Transport {
        operation: &'static str,
        status: StatusCode,
        body: String,
    },
    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("{operation} request failed: {source}")]
    Http {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },
    /// A 2xx response whose body did not have the expected shape.
    #[error("{operation} returned an unexpected response: {message}")]
    Decode {
        operation: &'static str,
        message: String,
    },
}

impl ApiError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}
