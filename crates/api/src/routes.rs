use rpm_upload_core::AddressingMode;
use rpm_upload_core::validate::{
    IdentifierKind, ValidationError, validate_identifier, validate_repository_id,
};

/// HTTP method used to send a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkMethod {
    Post,
    Put,
}

/// Request targets for one addressing mode, relative to the API root.
///
/// Every identifier is validated before it is spliced into a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Routes {
    mode: AddressingMode,
}

impl Routes {
    pub fn new(mode: AddressingMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> AddressingMode {
        self.mode
    }

    pub fn create_upload(&self) -> &'static str {
        match self.mode {
            AddressingMode::SessionId => "/repositories/uploads/",
            AddressingMode::ResourceLocator => "/pulp/uploads/",
        }
    }

    pub fn upload_chunk(&self, session_id: &str) -> Result<String, ValidationError> {
        let id = validate_identifier(IdentifierKind::Session, session_id)?;
        Ok(match self.mode {
            AddressingMode::SessionId => format!("/repositories/uploads/{id}/upload_chunk/"),
            AddressingMode::ResourceLocator => format!("/pulp/uploads/{}", relative(id)),
        })
    }

    pub fn chunk_method(&self) -> ChunkMethod {
        match self.mode {
            AddressingMode::SessionId => ChunkMethod::Post,
            AddressingMode::ResourceLocator => ChunkMethod::Put,
        }
    }

    pub fn commit_upload(&self, session_id: &str) -> Result<String, ValidationError> {
        let id = validate_identifier(IdentifierKind::Session, session_id)?;
        Ok(format!("/pulp/uploads/{}", relative(id)))
    }

    pub fn task(&self, task: &str) -> Result<String, ValidationError> {
        let task = validate_identifier(IdentifierKind::Task, task)?;
        Ok(format!("/pulp/tasks/{}", relative(task)))
    }

    pub fn add_uploads(&self, repo_id: &str) -> Result<String, ValidationError> {
        let repo = validate_repository_id(repo_id)?;
        Ok(format!("/repositories/{repo}/add_uploads/"))
    }
}

fn relative(id: &str) -> &str {
    id.trim_start_matches('/')
}
