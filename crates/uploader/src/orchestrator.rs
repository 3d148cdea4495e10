use std::path::PathBuf;

use rpm_upload_api_client::{Attachment, UploadService};
use rpm_upload_core::validate::validate_repository_id;
use rpm_upload_core::{SourceArtifact, ValidationError};
use tracing::info;

use crate::UploadError;
use crate::pipeline::{FileUpload, UploadOptions, upload_file};

/// Outcome of a batch that was uploaded and attached in full.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    pub repository: String,
    pub finalized: bool,
    pub files: Vec<FileUpload>,
}

/// Upload every file, then attach all of them to `repo_id` in one call.
///
/// All inputs are validated before the first request. The first failure
/// aborts the run and nothing is attached.
pub async fn upload_batch<S: UploadService>(
    service: &S,
    repo_id: &str,
    paths: &[PathBuf],
    options: &UploadOptions,
) -> Result<BatchReport, UploadError> {
    validate_repository_id(repo_id)?;
    if options.chunk_size == 0 {
        return Err(ValidationError::ZeroChunkSize.into());
    }
    if paths.is_empty() {
        return Err(ValidationError::NoFiles.into());
    }
    let artifacts = paths
        .iter()
        .map(|path| SourceArtifact::open(path))
        .collect::<Result<Vec<_>, _>>()?;

    let mut files = Vec::with_capacity(artifacts.len());
    for artifact in &artifacts {
        let uploaded = upload_file(service, artifact, options)
            .await
            .map_err(|e| e.in_file(artifact.path().to_path_buf()))?;
        files.push(uploaded);
    }

    let attachments: Vec<Attachment> = files
        .iter()
        .map(|f| Attachment {
            sha256: f.sha256.clone(),
            reference: f.reference.as_str().to_string(),
        })
        .collect();
    if options.finalize {
        service.attach_artifacts(repo_id, &attachments).await?;
    } else {
        service.attach_uploads(repo_id, &attachments).await?;
    }
    info!(
        repository = repo_id,
        files = files.len(),
        finalized = options.finalize,
        "attached uploads to repository"
    );

    Ok(BatchReport {
        repository: repo_id.to_string(),
        finalized: options.finalize,
        files,
    })
}
