//! SipHash-1-3 ring hasher

use super::KeyHasher;
use siphasher::sip::SipHasher13;
use std::hash::Hasher;

/// Hashes keys with SipHash-1-3 using zero keys
///
/// Fast with good distribution; the fixed keys keep positions stable
/// between runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SipKeyHasher;

impl KeyHasher for SipKeyHasher {
    fn hash(&self, key: &[u8]) -> u64 {
        let mut hasher = SipHasher13::new();
        hasher.write(key);
        hasher.finish()
    }

    fn name(&self) -> &'static str {
        "siphash13"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let hasher = SipKeyHasher;
        assert_eq!(hasher.hash(b"test_key"), hasher.hash(b"test_key"));
        assert_ne!(hasher.hash(b"test_key"), hasher.hash(b"test_kez"));
    }

    #[test]
    fn test_hash_distribution() {
        let hasher = SipKeyHasher;
        let mut buckets = vec![0; 4];

        // Top two bits split the keyspace into quarters
        for i in 0..1000 {
            let key = format!("key_{}", i);
            let bucket = (hasher.hash(key.as_bytes()) >> 62) as usize;
            buckets[bucket] += 1;
        }

        for count in buckets {
            assert!(count > 200 && count < 300, "Uneven distribution: {}", count);
        }
    }
}
