//! Boundring - consistent hashing with bounded loads
//!
//! Maps string keys onto a dynamic set of named nodes:
//! - the same key keeps landing on the same node while membership is stable
//! - adding or removing a node only moves a small fraction of keys
//! - with bounded loads, no node takes more than `load_factor` times the
//!   mean number of keys
//!
//! ```
//! use boundring::{Node, Ring, RingConfig};
//!
//! let ring = Ring::new(RingConfig::new(150, 1.25));
//! ring.add_node(Node::new("cache-1", "10.0.0.1:11211")).unwrap();
//! ring.add_node(Node::new("cache-2", "10.0.0.2:11211")).unwrap();
//!
//! let owner = ring.get_node("user:42").unwrap();
//! let assignment = ring.assign_key("session:42").unwrap();
//! assert!(assignment.load <= assignment.max_load);
//! # let _ = owner;
//! ```

pub mod config;
pub mod error;
pub mod hash;
pub mod node;
pub mod ring;

/// Re-export commonly used types
pub use config::RingConfig;
pub use error::{ErrorKind, RingError, RingResult};
pub use hash::{HashAlgorithm, KeyHasher};
pub use node::Node;
pub use ring::{Assignment, NodeStats, RebalanceSummary, Ring, RingStats};
