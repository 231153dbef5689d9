//! xxHash ring hashers

use super::KeyHasher;
use xxhash_rust::{xxh32::xxh32, xxh64::xxh64};

/// XXH64 with seed 0
#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh64KeyHasher;

impl KeyHasher for Xxh64KeyHasher {
    fn hash(&self, key: &[u8]) -> u64 {
        xxh64(key, 0)
    }

    fn name(&self) -> &'static str {
        "xxh64"
    }
}

/// XXH32 with seed 0
///
/// Positions stay within `0..2^32`, the narrower keyspace.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xxh32KeyHasher;

impl KeyHasher for Xxh32KeyHasher {
    fn hash(&self, key: &[u8]) -> u64 {
        u64::from(xxh32(key, 0))
    }

    fn name(&self) -> &'static str {
        "xxh32"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_xxh32_stays_in_32_bit_keyspace() {
        let hasher = Xxh32KeyHasher;
        for i in 0..500 {
            let key = format!("node-{}#{}", i % 7, i);
            assert!(hasher.hash(key.as_bytes()) <= u64::from(u32::MAX));
        }
    }

    #[test]
    fn test_xxh64_matches_reference() {
        // Known XXH64 digest of the empty input
        assert_eq!(Xxh64KeyHasher.hash(b""), 0xEF46_DB37_51D8_E999);
    }
}
