pub mod client;
pub mod error;
pub mod service;

pub use client::{ApiClient, Credential};
pub use error::ApiError;
pub use rpm_upload_api;
pub use service::{Attachment, UploadService, UploadSession};
