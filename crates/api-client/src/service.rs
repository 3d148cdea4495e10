use rpm_upload_api::TaskResponse;
use rpm_upload_core::ByteRange;

use crate::ApiError;

/// A freshly created upload session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadSession {
    /// `upload_uuid` or `pulp_href`, depending on the addressing mode.
    pub id: String,
    /// Artifact the server already holds for this digest, if it said so.
    pub existing_artifact: Option<String>,
}

/// One `(digest, reference)` pair of a repository attachment batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub sha256: String,
    pub reference: String,
}

/// The remote upload service as seen by the upload pipeline.
///
/// [`crate::ApiClient`] is the HTTP implementation; tests substitute
/// scripted fakes.
#[allow(async_fn_in_trait)]
pub trait UploadService {
    async fn create_upload(
        &self,
        size: u64,
        chunk_size: u64,
        sha256: &str,
    ) -> Result<UploadSession, ApiError>;

    /// Send one chunk starting at `start`; returns the range that was
    /// declared in `Content-Range`.
    async fn upload_chunk(
        &self,
        session_id: &str,
        bytes: Vec<u8>,
        sha256: &str,
        start: u64,
        total_size: u64,
    ) -> Result<ByteRange, ApiError>;

    /// Ask the service to assemble the session; returns the task handle.
    async fn commit_upload(&self, session_id: &str, sha256: &str) -> Result<String, ApiError>;

    async fn get_task(&self, task: &str) -> Result<TaskResponse, ApiError>;

    async fn attach_uploads(&self, repo_id: &str, uploads: &[Attachment]) -> Result<(), ApiError>;

    async fn attach_artifacts(
        &self,
        repo_id: &str,
        artifacts: &[Attachment],
    ) -> Result<(), ApiError>;
}
