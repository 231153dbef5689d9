//! Ring configuration

use crate::hash::HashAlgorithm;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Default number of virtual nodes per physical node
pub const DEFAULT_REPLICAS: usize = 150;

/// Default bounded-load factor
pub const DEFAULT_LOAD_FACTOR: f64 = 1.25;

/// Ring configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RingConfig {
    /// Virtual nodes per physical node, fixed for the lifetime of the ring
    pub replicas: usize,

    /// Multiplier on the mean load giving each node's capacity (>= 1.0)
    pub load_factor: f64,

    /// Hash algorithm placing keys and virtual nodes
    pub hash: HashAlgorithm,
}

impl Default for RingConfig {
    fn default() -> Self {
        RingConfig {
            replicas: DEFAULT_REPLICAS,
            load_factor: DEFAULT_LOAD_FACTOR,
            hash: HashAlgorithm::default(),
        }
    }
}

impl RingConfig {
    /// Create a configuration with the default hash algorithm
    pub fn new(replicas: usize, load_factor: f64) -> Self {
        RingConfig {
            replicas,
            load_factor,
            hash: HashAlgorithm::default(),
        }
    }

    /// Select the hash algorithm
    pub fn with_hash(mut self, hash: HashAlgorithm) -> Self {
        self.hash = hash;
        self
    }

    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }

    /// Replace out-of-range values with usable ones
    ///
    /// Construction never fails: zero replicas fall back to the default,
    /// and the load factor goes through [`sanitize_load_factor`].
    pub fn sanitized(mut self) -> Self {
        if self.replicas == 0 {
            warn!("replicas must be > 0, using {}", DEFAULT_REPLICAS);
            self.replicas = DEFAULT_REPLICAS;
        }
        self.load_factor = sanitize_load_factor(self.load_factor);
        self
    }
}

/// Clamp a load factor into `[1.0, inf)`
///
/// Non-finite or non-positive values fall back to the default; values in
/// `(0, 1)` are raised to 1.0.
pub fn sanitize_load_factor(load_factor: f64) -> f64 {
    if !load_factor.is_finite() || load_factor <= 0.0 {
        warn!("invalid load factor {}, using {}", load_factor, DEFAULT_LOAD_FACTOR);
        DEFAULT_LOAD_FACTOR
    } else if load_factor < 1.0 {
        warn!("load factor {} is below 1.0, clamping to 1.0", load_factor);
        1.0
    } else {
        load_factor
    }
}
