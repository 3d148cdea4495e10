use std::path::PathBuf;

use rpm_upload_api_client::ApiError;
use rpm_upload_core::{ChunkError, ValidationError};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error(transparent)]
    Chunk(#[from] ChunkError),
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The server-side task reported `failed`; `error` is its payload.
    #[error("task {task} failed: {error}")]
    TaskFailed { task: String, error: String },
    /// The task completed but created nothing, which should not happen.
    #[error("task {task} completed without creating any resource")]
    InconsistentState { task: String },
    #[error("task {task} still pending after {attempts} status checks")]
    PollLimitExceeded { task: String, attempts: u32 },
    /// Wraps a failure with the file being processed.
    #[error("{}: {source}", path.display())]
    InFile {
        path: PathBuf,
        #[source]
        source: Box<UploadError>,
    },
}

impl UploadError {
    pub(crate) fn in_file(self, path: PathBuf) -> Self {
        Self::InFile {
            path,
            source: Box::new(self),
        }
    }

    /// The underlying error, without file context.
    pub fn root(&self) -> &UploadError {
        match self {
            Self::InFile { source, .. } => source.root(),
            other => other,
        }
    }
}
