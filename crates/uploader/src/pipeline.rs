use std::path::PathBuf;

use rpm_upload_api_client::UploadService;
use rpm_upload_core::{
    ChunkSet, DEFAULT_CHUNK_SIZE, SourceArtifact, ValidationError, split_file_in,
};
use tracing::{debug, info, warn};

use crate::UploadError;
use crate::finalize::{ArtifactHandle, FinalizeController, PollPolicy};

/// Per-run upload settings.
#[derive(Debug, Clone)]
pub struct UploadOptions {
    pub chunk_size: u64,
    /// Commit each upload and attach artifacts rather than raw uploads.
    pub finalize: bool,
    pub poll: PollPolicy,
    /// Parent of the per-file scratch directories; system temp dir if unset.
    pub scratch_root: Option<PathBuf>,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_CHUNK_SIZE,
            finalize: false,
            poll: PollPolicy::default(),
            scratch_root: None,
        }
    }
}

/// What a file's upload left behind for the attachment call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadReference {
    /// Uncommitted upload session (`upload_uuid` or `pulp_href`).
    Session(String),
    /// Committed artifact.
    Artifact(ArtifactHandle),
}

impl UploadReference {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Session(id) => id,
            Self::Artifact(handle) => &handle.href,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileUpload {
    pub path: PathBuf,
    pub sha256: String,
    pub size: u64,
    pub chunks: usize,
    pub reference: UploadReference,
}

/// Upload one file: chunk and digest in one read, create a session, send
/// every chunk in offset order, then commit and poll when finalizing.
///
/// The size declared to the server is the number of bytes chunked; a file
/// whose size moved since [`SourceArtifact::open`] is rejected.
///
/// Chunk files are removed before this returns, on success or failure.
pub async fn upload_file<S: UploadService>(
    service: &S,
    artifact: &SourceArtifact,
    options: &UploadOptions,
) -> Result<FileUpload, UploadError> {
    let scratch_root = options
        .scratch_root
        .clone()
        .unwrap_or_else(std::env::temp_dir);
    let chunks = split_file_in(artifact.path(), options.chunk_size, &scratch_root)?;
    if chunks.total_size() != artifact.size() {
        return Err(ValidationError::SizeChanged {
            path: artifact.path().to_path_buf(),
            expected: artifact.size(),
            actual: chunks.total_size(),
        }
        .into());
    }

    let sha256 = chunks.sha256().to_string();
    let total_size = chunks.total_size();
    info!(
        file = %artifact.path().display(),
        size = total_size,
        chunks = chunks.chunks().len(),
        sha256 = %sha256,
        "uploading"
    );

    let session = service
        .create_upload(total_size, options.chunk_size, &sha256)
        .await?;
    info!(session = %session.id, "upload session created");
    if let Some(existing) = &session.existing_artifact {
        debug!(artifact = %existing, "server already holds an artifact with this digest");
    }

    let sent = send_chunks(service, &session.id, &chunks).await;
    let chunk_count = chunks.chunks().len();
    let scratch = chunks.dir().to_path_buf();
    if let Err(e) = chunks.close() {
        warn!(dir = %scratch.display(), error = %e, "failed to remove chunk directory");
    }
    sent?;

    let reference = if options.finalize {
        let mut controller = FinalizeController::new(service, &options.poll);
        let handle = controller.finalize(&session.id, &sha256).await?;
        info!(artifact = %handle.href, polls = controller.polls(), "artifact created");
        UploadReference::Artifact(handle)
    } else {
        UploadReference::Session(session.id)
    };

    Ok(FileUpload {
        path: artifact.path().to_path_buf(),
        sha256,
        size: total_size,
        chunks: chunk_count,
        reference,
    })
}

/// Send chunks strictly in order; each start offset is the sum of the
/// lengths already sent.
async fn send_chunks<S: UploadService>(
    service: &S,
    session_id: &str,
    chunks: &ChunkSet,
) -> Result<(), UploadError> {
    let total_size = chunks.total_size();
    let mut offset = 0u64;
    for chunk in chunks.chunks() {
        debug_assert_eq!(chunk.start(), offset);
        let bytes = chunk.read().map_err(|source| UploadError::Io {
            path: chunk.path.clone(),
            source,
        })?;
        let length = chunk.length();
        if bytes.len() as u64 != length {
            return Err(UploadError::Io {
                path: chunk.path.clone(),
                source: std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    "chunk file does not match its planned length",
                ),
            });
        }
        let range = service
            .upload_chunk(session_id, bytes, &chunk.sha256, offset, total_size)
            .await?;
        debug!(
            index = chunk.index,
            range = %range.content_range(),
            sha256 = %chunk.sha256,
            "chunk uploaded"
        );
        offset += length;
    }
    Ok(())
}
