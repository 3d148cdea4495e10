use sha2::{Digest, Sha256};

/// Block size used when streaming a file through the hasher.
pub const READ_BLOCK_SIZE: usize = 64 * 1024;

/// Lowercase hex SHA-256 of an in-memory buffer.
pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    finalize_hex(hasher)
}

pub(crate) fn finalize_hex(hasher: Sha256) -> String {
    let digest = hasher.finalize();
    let mut out = String::with_capacity(digest.len() * 2);
    for byte in digest {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const ABC_SHA256: &str = "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

    #[test]
    fn sha256_matches_known_vector() {
        assert_eq!(sha256_hex(b"abc"), ABC_SHA256);
    }

    #[test]
    fn digest_is_stable_and_sensitive_to_single_byte_changes() {
        let mut data = b"thirteen-byte".to_vec();
        let first = sha256_hex(&data);
        assert_eq!(first, sha256_hex(&data));
        assert_eq!(first.len(), 64);
        assert!(first.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));

        data[6] ^= 0x01;
        assert_ne!(sha256_hex(&data), first);
    }

    #[test]
    fn incremental_updates_match_one_shot_digest() {
        let data: Vec<u8> = (0..(READ_BLOCK_SIZE * 2 + 17))
            .map(|i| (i % 251) as u8)
            .collect();
        let mut hasher = Sha256::new();
        for block in data.chunks(READ_BLOCK_SIZE - 3) {
            hasher.update(block);
        }
        assert_eq!(finalize_hex(hasher), sha256_hex(&data));
    }
}
