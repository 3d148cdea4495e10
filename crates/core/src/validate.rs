use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::sync::LazyLock;
use thiserror::Error;

/// Which externally supplied identifier failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentifierKind {
    Session,
    Task,
    Repository,
    Artifact,
}

impl IdentifierKind {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Session => "upload",
            Self::Task => "task",
            Self::Repository => "repository",
            Self::Artifact => "artifact",
        }
    }
}

impl fmt::Display for IdentifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ValidationError {
    #[error("invalid {kind} identifier: {value:?}")]
    InvalidIdentifier { kind: IdentifierKind, value: String },
    #[error("{value} is not a valid UUID")]
    NotUuid { value: String },
    #[error("file does not exist: {}", path.display())]
    MissingFile { path: PathBuf },
    #[error("file is not an rpm: {}", path.display())]
    NotRpm { path: PathBuf },
    #[error("file is empty: {}", path.display())]
    EmptyFile { path: PathBuf },
    #[error("{} changed size after validation ({expected} -> {actual} bytes)", path.display())]
    SizeChanged {
        path: PathBuf,
        expected: u64,
        actual: u64,
    },
    #[error("chunk size must be greater than zero")]
    ZeroChunkSize,
    #[error("no files to upload")]
    NoFiles,
}

static SAFE_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9/._-]+$").unwrap());

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}$")
        .unwrap()
});

/// True for the canonical 8-4-4-4-12 hex form.
pub fn is_canonical_uuid(value: &str) -> bool {
    UUID_RE.is_match(value)
}

/// True for tokens that are safe to splice into a request path: only
/// `[A-Za-z0-9/._-]`, and no `.` or `..` path segment.
pub fn is_safe_token(value: &str) -> bool {
    SAFE_TOKEN_RE.is_match(value)
        && value
            .split('/')
            .all(|segment| segment != "." && segment != "..")
}

/// Check an identifier echoed back by the server (or supplied by the user)
/// before it is interpolated into a request target.
pub fn validate_identifier(kind: IdentifierKind, value: &str) -> Result<&str, ValidationError> {
    if is_canonical_uuid(value) || is_safe_token(value) {
        Ok(value)
    } else {
        Err(ValidationError::InvalidIdentifier {
            kind,
            value: value.to_string(),
        })
    }
}

/// Repository identifiers are always UUIDs.
pub fn validate_repository_id(value: &str) -> Result<&str, ValidationError> {
    if is_canonical_uuid(value) {
        Ok(value)
    } else {
        Err(ValidationError::NotUuid {
            value: value.to_string(),
        })
    }
}
