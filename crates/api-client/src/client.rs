use std::time::Duration;

use reqwest::header::CONTENT_RANGE;
use reqwest::multipart::{Form, Part};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use rpm_upload_api::*;
use rpm_upload_core::validate::{IdentifierKind, validate_identifier};
use rpm_upload_core::{AddressingMode, ByteRange, clamped_range};

use crate::service::{Attachment, UploadService, UploadSession};
use crate::ApiError;

/// Opaque authentication header attached to every request.
#[derive(Clone)]
pub struct Credential {
    pub header: String,
    pub value: String,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("header", &self.header)
            .field("value", &"<redacted>")
            .finish()
    }
}

/// Typed HTTP client for the content-sources upload API.
///
/// The addressing mode is fixed at construction; every route and request
/// shape is derived from it.
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    routes: Routes,
    credential: Option<Credential>,
}

impl ApiClient {
    /// Create a new client with the given API root, addressing mode and timeout.
    pub fn new(base_url: &str, mode: AddressingMode, timeout: Duration) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|source| ApiError::Http {
                operation: "build client",
                source,
            })?;
        Ok(Self::with_client(client, base_url, mode))
    }

    /// Create from an existing `reqwest::Client` (e.g. shared in tests).
    pub fn with_client(client: reqwest::Client, base_url: &str, mode: AddressingMode) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            routes: Routes::new(mode),
            credential: None,
        }
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
    }

    pub fn mode(&self) -> AddressingMode {
        self.routes.mode()
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.credential {
            Some(c) => req.header(c.header.as_str(), c.value.as_str()),
            None => req,
        }
    }

    async fn post_json<B: Serialize>(
        &self,
        operation: &'static str,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, ApiError> {
        debug!(operation, path, "POST");
        let req = self.authorize(self.client.post(self.url(path)).json(body));
        send(operation, req).await
    }

    // ── Upload sessions ──────────────────────────────────────────────────

    pub async fn create_upload(
        &self,
        size: u64,
        chunk_size: u64,
        sha256: &str,
    ) -> Result<UploadSession, ApiError> {
        const OP: &str = "create upload";
        let body = CreateUploadRequest {
            size,
            chunk_size: Some(chunk_size),
            sha256: Some(sha256.to_string()),
        };
        let resp = self.post_json(OP, self.routes.create_upload(), &body).await?;
        let created: CreateUploadResponse = parse_response(OP, resp).await?;

        let id = created
            .session_id(self.mode())
            .ok_or_else(|| ApiError::Decode {
                operation: OP,
                message: format!("response has no {} identifier", self.mode()),
            })?;
        validate_identifier(IdentifierKind::Session, id)?;

        Ok(UploadSession {
            id: id.to_string(),
            existing_artifact: created.artifact_href.clone(),
        })
    }

    pub async fn upload_chunk(
        &self,
        session_id: &str,
        bytes: Vec<u8>,
        sha256: &str,
        start: u64,
        total_size: u64,
    ) -> Result<ByteRange, ApiError> {
        const OP: &str = "upload chunk";
        let path = self.routes.upload_chunk(session_id)?;
        let range = clamped_range(start, bytes.len() as u64, total_size);

        let form = Form::new()
            .part(CHUNK_FILE_FIELD, Part::bytes(bytes).file_name("chunk"))
            .text(CHUNK_SHA256_FIELD, sha256.to_string());
        let req = match self.routes.chunk_method() {
            ChunkMethod::Post => self.client.post(self.url(&path)),
            ChunkMethod::Put => self.client.put(self.url(&path)),
        };
        let req = self
            .authorize(req)
            .header(CONTENT_RANGE, range.content_range())
            .multipart(form);

        debug!(path = %path, range = %range.content_range(), "uploading chunk");
        let resp = send(OP, req).await?;
        ensure_success(OP, resp).await?;
        Ok(range)
    }

    // ── Commit & tasks ───────────────────────────────────────────────────

    pub async fn commit_upload(&self, session_id: &str, sha256: &str) -> Result<String, ApiError> {
        const OP: &str = "commit upload";
        let path = self.routes.commit_upload(session_id)?;
        let body = CommitUploadRequest {
            sha256: sha256.to_string(),
        };
        let resp = self.post_json(OP, &path, &body).await?;
        let committed: CommitUploadResponse = parse_response(OP, resp).await?;
        validate_identifier(IdentifierKind::Task, &committed.task)?;
        Ok(committed.task)
    }

    pub async fn get_task(&self, task: &str) -> Result<TaskResponse, ApiError> {
        const OP: &str = "get task";
        let path = self.routes.task(task)?;
        debug!(path = %path, "GET");
        let req = self.authorize(self.client.get(self.url(&path)));
        let resp = send(OP, req).await?;
        parse_response(OP, resp).await
    }

    // ── Repository attachment ────────────────────────────────────────────

    pub async fn add_uploads(&self, repo_id: &str, body: &AddUploadsRequest) -> Result<(), ApiError> {
        const OP: &str = "add uploads";
        let path = self.routes.add_uploads(repo_id)?;
        let resp = self.post_json(OP, &path, body).await?;
        ensure_success(OP, resp).await
    }

    pub async fn attach_uploads(&self, repo_id: &str, uploads: &[Attachment]) -> Result<(), ApiError> {
        let mode = self.mode();
        let body = AddUploadsRequest {
            uploads: uploads
                .iter()
                .map(|u| UploadRef::new(mode, &u.reference, &u.sha256))
                .collect(),
            artifacts: Vec::new(),
        };
        self.add_uploads(repo_id, &body).await
    }

    pub async fn attach_artifacts(
        &self,
        repo_id: &str,
        artifacts: &[Attachment],
    ) -> Result<(), ApiError> {
        let body = AddUploadsRequest {
            uploads: Vec::new(),
            artifacts: artifacts
                .iter()
                .map(|a| ArtifactRef {
                    href: a.reference.clone(),
                    sha256: a.sha256.clone(),
                })
                .collect(),
        };
        self.add_uploads(repo_id, &body).await
    }
}

impl UploadService for ApiClient {
    async fn create_upload(
        &self,
        size: u64,
        chunk_size: u64,
        sha256: &str,
    ) -> Result<UploadSession, ApiError> {
        ApiClient::create_upload(self, size, chunk_size, sha256).await
    }

    async fn upload_chunk(
        &self,
        session_id: &str,
        bytes: Vec<u8>,
        sha256: &str,
        start: u64,
        total_size: u64,
    ) -> Result<ByteRange, ApiError> {
        ApiClient::upload_chunk(self, session_id, bytes, sha256, start, total_size).await
    }

    async fn commit_upload(&self, session_id: &str, sha256: &str) -> Result<String, ApiError> {
        ApiClient::commit_upload(self, session_id, sha256).await
    }

    async fn get_task(&self, task: &str) -> Result<TaskResponse, ApiError> {
        ApiClient::get_task(self, task).await
    }

    async fn attach_uploads(&self, repo_id: &str, uploads: &[Attachment]) -> Result<(), ApiError> {
        ApiClient::attach_uploads(self, repo_id, uploads).await
    }

    async fn attach_artifacts(
        &self,
        repo_id: &str,
        artifacts: &[Attachment],
    ) -> Result<(), ApiError> {
        ApiClient::attach_artifacts(self, repo_id, artifacts).await
    }
}

async fn send(
    operation: &'static str,
    req: reqwest::RequestBuilder,
) -> Result<reqwest::Response, ApiError> {
    req.send()
        .await
        .map_err(|source| ApiError::Http { operation, source })
}

/// Fail with [`ApiError::Transport`] on a non-2xx response, carrying the
/// status and body text.
async fn ensure_success(operation: &'static str, resp: reqwest::Response) -> Result<(), ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Transport {
            operation,
            status,
            body,
        });
    }
    Ok(())
}

/// Parse an HTTP response: return the deserialized body on 2xx,
/// or an error containing the status and body text.
async fn parse_response<T: DeserializeOwned>(
    operation: &'static str,
    resp: reqwest::Response,
) -> Result<T, ApiError> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Transport {
            operation,
            status,
            body,
        });
    }
    let text = resp
        .text()
        .await
        .map_err(|source| ApiError::Http { operation, source })?;
    serde_json::from_str(&text).map_err(|e| ApiError::Decode {
        operation,
        message: e.to_string(),
    })
}
