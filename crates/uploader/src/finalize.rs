//! Commit an upload session and wait for the resulting server-side task.
//!
//! States: `Created -> Committing -> {Completed, Failed}`. The task is
//! polled at a fixed interval; there is no backoff.

use std::time::Duration;

use rpm_upload_api_client::UploadService;
use rpm_upload_api_client::rpm_upload_api::{TaskResponse, TaskState};
use rpm_upload_core::validate::{IdentifierKind, validate_identifier};
use tracing::{debug, info, warn};

use crate::UploadError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitState {
    Created,
    Committing,
    Completed,
    Failed,
}

/// How task status is polled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    /// `None` polls until the task reaches a terminal state.
    pub max_attempts: Option<u32>,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            max_attempts: None,
        }
    }
}

/// Durable artifact produced by a completed commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactHandle {
    pub href: String,
    pub sha256: String,
}

/// Drives one session through commit and task polling.
pub struct FinalizeController<'a, S> {
    service: &'a S,
    policy: &'a PollPolicy,
    state: CommitState,
    polls: u32,
}

impl<'a, S: UploadService> FinalizeController<'a, S> {
    pub fn new(service: &'a S, policy: &'a PollPolicy) -> Self {
        Self {
            service,
            policy,
            state: CommitState::Created,
            polls: 0,
        }
    }

    pub fn state(&self) -> CommitState {
        self.state
    }

    /// Number of task status requests issued so far.
    pub fn polls(&self) -> u32 {
        self.polls
    }

    /// Commit, poll, and resolve the artifact in one go.
    pub async fn finalize(
        &mut self,
        session_id: &str,
        sha256: &str,
    ) -> Result<ArtifactHandle, UploadError> {
        let task = self.commit(session_id, sha256).await?;
        let status = self.poll_task(&task).await?;
        let resolved = resolve_artifact(&task, &status, sha256);
        self.state = match resolved {
            Ok(_) => CommitState::Completed,
            Err(_) => CommitState::Failed,
        };
        resolved
    }

    /// Send the commit request; returns the task handle.
    pub async fn commit(&mut self, session_id: &str, sha256: &str) -> Result<String, UploadError> {
        match self.service.commit_upload(session_id, sha256).await {
            Ok(task) => {
                info!(session = session_id, task = %task, "upload committed");
                self.state = CommitState::Committing;
                Ok(task)
            }
            Err(e) => {
                self.state = CommitState::Failed;
                Err(e.into())
            }
        }
    }

    /// Poll `task` until it is `completed` or `failed`.
    pub async fn poll_task(&mut self, task: &str) -> Result<TaskResponse, UploadError> {
        loop {
            if let Some(max) = self.policy.max_attempts {
                if self.polls >= max {
                    self.state = CommitState::Failed;
                    return Err(UploadError::PollLimitExceeded {
                        task: task.to_string(),
                        attempts: self.polls,
                    });
                }
            }

            let status = match self.service.get_task(task).await {
                Ok(status) => status,
                Err(e) => {
                    self.state = CommitState::Failed;
                    return Err(e.into());
                }
            };
            self.polls += 1;

            if status.task_state().is_terminal() {
                return Ok(status);
            }
            debug!(task, state = %status.state, polls = self.polls, "task pending");
            tokio::time::sleep(self.policy.interval).await;
        }
    }
}

/// Map a terminal task status to the artifact it created.
pub fn resolve_artifact(
    task: &str,
    status: &TaskResponse,
    sha256: &str,
) -> Result<ArtifactHandle, UploadError> {
    match status.task_state() {
        TaskState::Failed => Err(UploadError::TaskFailed {
            task: task.to_string(),
            error: status.error_message(),
        }),
        TaskState::Pending => Err(UploadError::InconsistentState {
            task: task.to_string(),
        }),
        TaskState::Completed => {
            let Some(first) = status.created_resources.first() else {
                return Err(UploadError::InconsistentState {
                    task: task.to_string(),
                });
            };
            if status.created_resources.len() > 1 {
                warn!(
                    task,
                    ignored = status.created_resources.len() - 1,
                    "task created extra resources"
                );
            }
            let href = validate_identifier(IdentifierKind::Artifact, first)?;
            Ok(ArtifactHandle {
                href: href.to_string(),
                sha256: sha256.to_string(),
            })
        }
    }
}
