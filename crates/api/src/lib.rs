//! Wire types for the content-sources upload API.
//!
//! The remote service is a black box; this crate only captures the request
//! and response shapes the client exchanges with it, plus the route table
//! for each [`AddressingMode`].

use serde::{Deserialize, Serialize};

pub mod routes;

pub use routes::{ChunkMethod, Routes};
pub use rpm_upload_core::AddressingMode;

// ─── Upload sessions ─────────────────────────────────────────────────────────

/// Body of the session-create call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CreateUploadRequest {
    pub size: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub chunk_size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sha256: Option<String>,
}

/// Session-create response. The public API fills `upload_uuid`, the
/// internal API fills `pulp_href`.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CreateUploadResponse {
    #[serde(default)]
    pub upload_uuid: Option<String>,
    #[serde(default)]
    pub pulp_href: Option<String>,
    /// Set when the server already holds an artifact with this digest.
    #[serde(default)]
    pub artifact_href: Option<String>,
    #[serde(default)]
    pub completed_checksums: Option<Vec<String>>,
    #[serde(default)]
    pub size: Option<u64>,
}

impl CreateUploadResponse {
    /// Session identifier for the given addressing mode.
    pub fn session_id(&self, mode: AddressingMode) -> Option<&str> {
        match mode {
            AddressingMode::SessionId => self.upload_uuid.as_deref(),
            AddressingMode::ResourceLocator => self.pulp_href.as_deref(),
        }
    }
}

/// Text part sent alongside each chunk's `file` part.
pub const CHUNK_FILE_FIELD: &str = "file";
pub const CHUNK_SHA256_FIELD: &str = "sha256";

// ─── Commit & tasks ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitUploadRequest {
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommitUploadResponse {
    pub task: String,
}

/// Lifecycle of a server-side task, as far as the client cares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    /// Any non-terminal state (`waiting`, `running`, ...).
    Pending,
    Completed,
    /// `failed`, or `canceled` which is just as final.
    Failed,
}

impl TaskState {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "completed" => Self::Completed,
            "failed" | "canceled" => Self::Failed,
            _ => Self::Pending,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskResponse {
    pub state: String,
    #[serde(default)]
    pub created_resources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<serde_json::Value>,
}

impl TaskResponse {
    pub fn task_state(&self) -> TaskState {
        TaskState::parse(&self.state)
    }

    /// Human-readable form of the error payload.
    pub fn error_message(&self) -> String {
        match &self.error {
            None | Some(serde_json::Value::Null) => format!("task {}", self.state),
            Some(serde_json::Value::String(s)) => s.clone(),
            Some(serde_json::Value::Object(map)) => match map.get("description") {
                Some(serde_json::Value::String(desc)) => desc.clone(),
                _ => serde_json::Value::Object(map.clone()).to_string(),
            },
            Some(other) => other.to_string(),
        }
    }
}

// ─── Repository attachment ───────────────────────────────────────────────────

/// An uncommitted upload to attach. Exactly one of `uuid`/`href` is set,
/// matching the addressing mode the upload was created with.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uuid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    pub sha256: String,
}

impl UploadRef {
    pub fn new(mode: AddressingMode, session_id: &str, sha256: &str) -> Self {
        let (uuid, href) = match mode {
            AddressingMode::SessionId => (Some(session_id.to_string()), None),
            AddressingMode::ResourceLocator => (None, Some(session_id.to_string())),
        };
        Self {
            uuid,
            href,
            sha256: sha256.to_string(),
        }
    }
}

/// A committed artifact to attach.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ArtifactRef {
    pub href: String,
    pub sha256: String,
}

/// Body of `add_uploads`: either uploads or artifacts, never both.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct AddUploadsRequest {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uploads: Vec<UploadRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<ArtifactRef>,
}
