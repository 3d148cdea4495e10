use std::path::{Path, PathBuf};

use crate::validate::ValidationError;

pub const RPM_EXTENSION: &str = "rpm";

/// A local RPM selected for upload, with the size seen at validation time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceArtifact {
    path: PathBuf,
    size: u64,
}

impl SourceArtifact {
    /// Validate that `path` is an existing, non-empty `.rpm` file.
    pub fn open(path: &Path) -> Result<Self, ValidationError> {
        let metadata = match std::fs::metadata(path) {
            Ok(m) if m.is_file() => m,
            _ => {
                return Err(ValidationError::MissingFile {
                    path: path.to_path_buf(),
                });
            }
        };
        let is_rpm = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext == RPM_EXTENSION);
        if !is_rpm {
            return Err(ValidationError::NotRpm {
                path: path.to_path_buf(),
            });
        }
        if metadata.len() == 0 {
            return Err(ValidationError::EmptyFile {
                path: path.to_path_buf(),
            });
        }
        Ok(Self {
            path: path.to_path_buf(),
            size: metadata.len(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn size(&self) -> u64 {
        self.size
    }
}
