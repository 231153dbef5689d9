//! Physical node on the ring

use serde::Serialize;
use std::collections::BTreeMap;

/// A physical endpoint that keys are assigned to
///
/// Callers build a node and hand it to [`Ring::add_node`](crate::Ring::add_node).
/// From then on the ring owns it: the load fields are only written by the
/// ring, and every node handed back to callers is a snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    /// Unique identifier
    id: String,

    /// Opaque address, never interpreted by the ring
    address: String,

    /// Additional opaque metadata
    metadata: BTreeMap<String, String>,

    /// Number of keys currently assigned
    load: usize,

    /// Capacity computed by the ring (0 = unbounded)
    max_load: usize,
}

impl Node {
    /// Create a new node with no load
    pub fn new(id: impl Into<String>, address: impl Into<String>) -> Self {
        Node {
            id: id.into(),
            address: address.into(),
            metadata: BTreeMap::new(),
            load: 0,
            max_load: 0,
        }
    }

    /// Attach a metadata entry
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn metadata(&self) -> &BTreeMap<String, String> {
        &self.metadata
    }

    pub fn load(&self) -> usize {
        self.load
    }

    pub fn max_load(&self) -> usize {
        self.max_load
    }

    /// Whether the node may take one more key under the bounded-load policy
    pub fn can_accept(&self) -> bool {
        self.max_load == 0 || self.load < self.max_load
    }

    /// Whether the load has gone past the cap (only after a fallback)
    pub fn is_overloaded(&self) -> bool {
        self.max_load != 0 && self.load > self.max_load
    }

    pub(crate) fn increment_load(&mut self) {
        self.load += 1;
    }

    pub(crate) fn decrement_load(&mut self) {
        self.load = self.load.saturating_sub(1);
    }

    pub(crate) fn reset_load(&mut self) {
        self.load = 0;
    }

    pub(crate) fn set_max_load(&mut self, max_load: usize) {
        self.max_load = max_load;
    }

    /// Drop caller-supplied load state before the ring takes ownership
    pub(crate) fn detached(mut self) -> Self {
        self.load = 0;
        self.max_load = 0;
        self
    }
}
