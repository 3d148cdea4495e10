#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

use reqwest::StatusCode;
use rpm_upload_api_client::rpm_upload_api::TaskResponse;
use rpm_upload_api_client::{ApiError, Attachment, UploadService, UploadSession};
use rpm_upload_core::{ByteRange, clamped_range};
use serde_json::json;

/// Every call the pipeline makes, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Create { size: u64, chunk_size: u64, sha256: String },
    Chunk { session: String, range: String, sha256: String, len: usize },
    Commit { session: String, sha256: String },
    Task { task: String },
    AttachUploads { repo: String, entries: Vec<(String, String)> },
    AttachArtifacts { repo: String, entries: Vec<(String, String)> },
}

/// Scripted in-memory upload service.
pub struct FakeService {
    pub session_id: String,
    pub task_handle: String,
    pub calls: RefCell<Vec<Call>>,
    pub task_script: RefCell<VecDeque<TaskResponse>>,
    /// Fail the chunk upload with this zero-based index.
    pub fail_chunk: Cell<Option<usize>>,
    chunks_seen: Cell<usize>,
}

impl FakeService {
    pub fn new(session_id: &str) -> Self {
        Self {
            session_id: session_id.to_string(),
            task_handle: "T1".to_string(),
            calls: RefCell::new(Vec::new()),
            task_script: RefCell::new(VecDeque::new()),
            fail_chunk: Cell::new(None),
            chunks_seen: Cell::new(0),
        }
    }

    pub fn script_tasks(&self, responses: impl IntoIterator<Item = TaskResponse>) {
        self.task_script.borrow_mut().extend(responses);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.borrow().clone()
    }

    pub fn task_polls(&self) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|c| matches!(c, Call::Task { .. }))
            .count()
    }
}

pub fn task(state: &str, created: &[&str]) -> TaskResponse {
    TaskResponse {
        state: state.to_string(),
        created_resources: created.iter().map(|s| s.to_string()).collect(),
        error: None,
    }
}

pub fn failed_task(description: &str) -> TaskResponse {
    TaskResponse {
        state: "failed".to_string(),
        created_resources: Vec::new(),
        error: Some(json!({"description": description})),
    }
}

fn entries(list: &[Attachment]) -> Vec<(String, String)> {
    list.iter()
        .map(|a| (a.sha256.clone(), a.reference.clone()))
        .collect()
}

impl UploadService for FakeService {
    async fn create_upload(
        &self,
        size: u64,
        chunk_size: u64,
        sha256: &str,
    ) -> Result<UploadSession, ApiError> {
        self.calls.borrow_mut().push(Call::Create {
            size,
            chunk_size,
            sha256: sha256.to_string(),
        });
        Ok(UploadSession {
            id: self.session_id.clone(),
            existing_artifact: None,
        })
    }

    async fn upload_chunk(
        &self,
        session_id: &str,
        bytes: Vec<u8>,
        sha256: &str,
        start: u64,
        total_size: u64,
    ) -> Result<ByteRange, ApiError> {
        let range = clamped_range(start, bytes.len() as u64, total_size);
        self.calls.borrow_mut().push(Call::Chunk {
            session: session_id.to_string(),
            range: range.content_range(),
            sha256: sha256.to_string(),
            len: bytes.len(),
        });
        let index = self.chunks_seen.get();
        self.chunks_seen.set(index + 1);
        if self.fail_chunk.get() == Some(index) {
            return Err(ApiError::Transport {
                operation: "upload chunk",
                status: StatusCode::BAD_GATEWAY,
                body: "chunk rejected".to_string(),
            });
        }
        Ok(range)
    }

    async fn commit_upload(&self, session_id: &str, sha256: &str) -> Result<String, ApiError> {
        self.calls.borrow_mut().push(Call::Commit {
            session: session_id.to_string(),
            sha256: sha256.to_string(),
        });
        Ok(self.task_handle.clone())
    }

    async fn get_task(&self, task: &str) -> Result<TaskResponse, ApiError> {
        self.calls.borrow_mut().push(Call::Task {
            task: task.to_string(),
        });
        let next = self.task_script.borrow_mut().pop_front();
        Ok(next.unwrap_or_else(|| self::task("running", &[])))
    }

    async fn attach_uploads(&self, repo_id: &str, uploads: &[Attachment]) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(Call::AttachUploads {
            repo: repo_id.to_string(),
            entries: entries(uploads),
        });
        Ok(())
    }

    async fn attach_artifacts(
        &self,
        repo_id: &str,
        artifacts: &[Attachment],
    ) -> Result<(), ApiError> {
        self.calls.borrow_mut().push(Call::AttachArtifacts {
            repo: repo_id.to_string(),
            entries: entries(artifacts),
        });
        Ok(())
    }
}
