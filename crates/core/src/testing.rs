use std::path::{Path, PathBuf};

/// Repository id used across tests.
pub const REPO_UUID: &str = "0f0e2c8b-6b1e-4c5e-9a57-1d2c3b4a5f60";

/// Deterministic, non-repeating-looking payload of `len` bytes.
pub fn payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Write `bytes` to `dir/name` and return the path.
pub fn write_rpm(dir: &Path, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, bytes).expect("write test rpm");
    path
}
