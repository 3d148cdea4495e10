pub mod checksum;
pub mod chunk;
pub mod mode;
pub mod source;
pub mod validate;

pub use checksum::sha256_hex;
pub use chunk::{
    ByteRange, ChunkDescriptor, ChunkError, ChunkSet, DEFAULT_CHUNK_SIZE, clamped_range,
    plan_chunks, split_file_in,
};
pub use mode::AddressingMode;
pub use source::SourceArtifact;
pub use validate::{IdentifierKind, ValidationError};

#[cfg(any(test, feature = "testing"))]
pub mod testing;
