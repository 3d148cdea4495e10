//! Fixed-size chunking of a source file into scratch chunk files.
//!
//! [`plan_chunks`] is the pure partition of `[0, total_size)`; [`split_file_in`]
//! materializes that partition as one file per chunk inside a scratch
//! directory that is removed when the returned [`ChunkSet`] is dropped. The
//! whole-file digest is taken from the same read, so it always describes the
//! bytes that were chunked.

use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use thiserror::Error;

use crate::checksum::{READ_BLOCK_SIZE, finalize_hex};
use crate::validate::ValidationError;

/// Default chunk size (5 MiB).
pub const DEFAULT_CHUNK_SIZE: u64 = 5 * 1024 * 1024;

const SCRATCH_PREFIX: &str = "rpm-upload-";

/// Inclusive byte range `[start, end]` of a source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    pub start: u64,
    pub end: u64,
}

impl ByteRange {
    /// Number of bytes in the range (never zero).
    pub fn length(&self) -> u64 {
        self.end - self.start + 1
    }

    /// Value for the `Content-Range` header of a chunk upload.
    pub fn content_range(&self) -> String {
        format!("bytes {}-{}/*", self.start, self.end)
    }
}

/// Range actually transmitted for a chunk: the end offset is clamped to the
/// last byte of the file so a short final chunk never overshoots.
pub fn clamped_range(start: u64, length: u64, total_size: u64) -> ByteRange {
    let end = (start + length)
        .saturating_sub(1)
        .min(total_size.saturating_sub(1));
    ByteRange { start, end }
}

/// Partition `[0, total_size)` into `ceil(total_size / chunk_size)`
/// contiguous ranges in ascending order.
pub fn plan_chunks(total_size: u64, chunk_size: u64) -> Result<Vec<ByteRange>, ValidationError> {
    if chunk_size == 0 {
        return Err(ValidationError::ZeroChunkSize);
    }
    let mut ranges = Vec::with_capacity(total_size.div_ceil(chunk_size) as usize);
    let mut start = 0u64;
    while start < total_size {
        let length = chunk_size.min(total_size - start);
        ranges.push(clamped_range(start, length, total_size));
        start += length;
    }
    Ok(ranges)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkDescriptor {
    /// Position in upload order.
    pub index: usize,
    pub range: ByteRange,
    /// Lowercase hex SHA-256 of the chunk's bytes.
    pub sha256: String,
    pub path: PathBuf,
}

impl ChunkDescriptor {
    pub fn start(&self) -> u64 {
        self.range.start
    }

    pub fn length(&self) -> u64 {
        self.range.length()
    }

    pub fn read(&self) -> io::Result<Vec<u8>> {
        std::fs::read(&self.path)
    }
}

#[derive(Debug, Error)]
pub enum ChunkError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("failed to create scratch directory: {0}")]
    Scratch(#[source] io::Error),
    #[error("failed to read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write chunk {index}: {source}")]
    Write {
        index: usize,
        #[source]
        source: io::Error,
    },
}

/// Chunk files of one source file. The scratch directory holding them is
/// deleted on drop, or explicitly through [`ChunkSet::close`].
#[derive(Debug)]
pub struct ChunkSet {
    dir: TempDir,
    total_size: u64,
    sha256: String,
    chunks: Vec<ChunkDescriptor>,
}

impl ChunkSet {
    pub fn chunks(&self) -> &[ChunkDescriptor] {
        &self.chunks
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    /// Lowercase hex SHA-256 of the whole file as it was chunked.
    pub fn sha256(&self) -> &str {
        &self.sha256
    }

    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    /// Remove the scratch directory, reporting any failure.
    pub fn close(self) -> io::Result<()> {
        self.dir.close()
    }
}

/// Split `path` into chunk files under a fresh directory inside `scratch_root`.
pub fn split_file_in(
    path: &Path,
    chunk_size: u64,
    scratch_root: &Path,
) -> Result<ChunkSet, ChunkError> {
    let read_err = |source| ChunkError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut source = File::open(path).map_err(read_err)?;
    let total_size = source.metadata().map_err(read_err)?.len();
    let ranges = plan_chunks(total_size, chunk_size)?;

    let dir = tempfile::Builder::new()
        .prefix(SCRATCH_PREFIX)
        .tempdir_in(scratch_root)
        .map_err(ChunkError::Scratch)?;

    let mut buf = vec![0u8; READ_BLOCK_SIZE];
    let mut whole = Sha256::new();
    let mut chunks = Vec::with_capacity(ranges.len());
    for (index, range) in ranges.into_iter().enumerate() {
        let chunk_path = dir.path().join(format!("chunk-{index:05}"));
        let sha256 = copy_range(&mut source, &chunk_path, range.length(), &mut buf, &mut whole)
            .map_err(|e| match e {
                CopyError::Read(source) => read_err(source),
                CopyError::Write(source) => ChunkError::Write { index, source },
            })?;
        chunks.push(ChunkDescriptor {
            index,
            range,
            sha256,
            path: chunk_path,
        });
    }

    if has_trailing_bytes(&mut source, &mut buf).map_err(read_err)? {
        return Err(read_err(io::Error::new(
            io::ErrorKind::InvalidData,
            "source file grew while chunking",
        )));
    }

    Ok(ChunkSet {
        dir,
        total_size,
        sha256: finalize_hex(whole),
        chunks,
    })
}

fn has_trailing_bytes(source: &mut File, buf: &mut [u8]) -> io::Result<bool> {
    loop {
        match source.read(&mut buf[..1]) {
            Ok(n) => return Ok(n > 0),
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
}

enum CopyError {
    Read(io::Error),
    Write(io::Error),
}

fn copy_range(
    source: &mut File,
    dest: &Path,
    length: u64,
    buf: &mut [u8],
    whole: &mut Sha256,
) -> Result<String, CopyError> {
    let file = File::create(dest).map_err(CopyError::Write)?;
    let mut out = BufWriter::new(file);
    let mut hasher = Sha256::new();
    let mut remaining = length;
    while remaining > 0 {
        let want = remaining.min(buf.len() as u64) as usize;
        let n = match source.read(&mut buf[..want]) {
            Ok(0) => {
                return Err(CopyError::Read(io::Error::new(
                    io::ErrorKind::UnexpectedEof,
                    "source file shrank while chunking",
                )));
            }
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };
        out.write_all(&buf[..n]).map_err(CopyError::Write)?;
        hasher.update(&buf[..n]);
        whole.update(&buf[..n]);
        remaining -= n as u64;
    }
    out.flush().map_err(CopyError::Write)?;
    Ok(finalize_hex(hasher))
}
