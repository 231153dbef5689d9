//! Ring hashing
//!
//! Maps arbitrary bytes onto the circular keyspace. Every hasher here is
//! seeded with fixed keys so a key lands on the same position across
//! process runs.

mod sip;
mod xxh;

pub use sip::SipKeyHasher;
pub use xxh::{Xxh32KeyHasher, Xxh64KeyHasher};

use serde::{Deserialize, Serialize};

/// Hash function used to place keys and virtual nodes on the ring
pub trait KeyHasher: Send + Sync {
    /// Hash `key` to a ring position
    fn hash(&self, key: &[u8]) -> u64;

    /// Short name reported in ring stats
    fn name(&self) -> &'static str;
}

/// Built-in hash algorithms, selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HashAlgorithm {
    /// SipHash-1-3 with zero keys, 64-bit keyspace
    #[default]
    Sip13,
    /// XXH64 with seed 0, 64-bit keyspace
    Xxh64,
    /// XXH32 with seed 0, 32-bit keyspace
    Xxh32,
}

impl HashAlgorithm {
    /// Instantiate the hasher for this algorithm
    pub fn build(self) -> Box<dyn KeyHasher> {
        match self {
            HashAlgorithm::Sip13 => Box::new(SipKeyHasher),
            HashAlgorithm::Xxh64 => Box::new(Xxh64KeyHasher),
            HashAlgorithm::Xxh32 => Box::new(Xxh32KeyHasher),
        }
    }
}
