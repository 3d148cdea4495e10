//! Upload pipeline for local RPMs.
//!
//! [`upload_batch`] validates every input, pushes each file through
//! [`upload_file`] (chunk, digest, create session, send chunks, optionally
//! commit and poll), and finishes with a single repository attachment call.
//! Any failure aborts the batch before anything is attached.

pub mod error;
pub mod finalize;
pub mod orchestrator;
pub mod pipeline;

pub use error::UploadError;
pub use finalize::{ArtifactHandle, CommitState, FinalizeController, PollPolicy};
pub use orchestrator::{BatchReport, upload_batch};
pub use pipeline::{FileUpload, UploadOptions, UploadReference, upload_file};
