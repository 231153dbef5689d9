//! Consistent hash ring with bounded loads
//!
//! The ring offers two modes over the same topology:
//!
//! - [`Ring::get_node`]: plain consistent hashing. Stateless, the key goes to
//!   the first virtual node clockwise from its hash.
//! - [`Ring::assign_key`]: bounded loads. The ring records which node owns
//!   each key and skips nodes that are at capacity, walking clockwise until
//!   one accepts.
//!
//! Topology, load counters and the assignment table live behind a single
//! reader/writer lock so they are always observed consistently.

mod load;
mod stats;
mod topology;


pub use stats::{NodeStats, RingStats};

use crate::config::{sanitize_load_factor, RingConfig};
use crate::error::{RingError, RingResult};
use crate::hash::KeyHasher;
use crate::node::Node;
use load::LoadTracker;
use parking_lot::RwLock;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use topology::Topology;
use tracing::{debug, info, warn};

/// Result of a bounded-load assignment
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Assignment {
    /// Node now owning the key
    pub node_id: String,

    /// Load of that node, this key included
    pub load: usize,

    /// Ring-wide cap at the time of the assignment (0 = unbounded)
    pub max_load: usize,
}

impl Assignment {
    fn of(node: &Node) -> Self {
        Assignment {
            node_id: node.id().to_string(),
            load: node.load(),
            max_load: node.max_load(),
        }
    }
}

/// Outcome of re-deriving every assignment after a membership change
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RebalanceSummary {
    /// Keys that were re-placed
    pub keys: usize,

    /// Keys whose owner changed
    pub moved: usize,

    /// Keys placed over the cap
    pub fallbacks: usize,

    /// Keys dropped because no node is left
    pub dropped: usize,
}

/// Everything guarded by the ring lock
struct RingState {
    topology: Topology,
    nodes: HashMap<String, Node>,
    /// Key -> owning node id, bounded-load mode only
    assignments: HashMap<String, String>,
    tracker: LoadTracker,
    last_rebalance: Option<RebalanceSummary>,
}

/// Consistent hash ring
///
/// Cheap to share between threads behind an `Arc`; every method takes
/// `&self`.
pub struct Ring {
    state: RwLock<RingState>,
    hasher: Box<dyn KeyHasher>,
    replicas: usize,
}

impl Ring {
    /// Create an empty ring using the configured hash algorithm
    pub fn new(config: RingConfig) -> Self {
        let hasher = config.hash.build();
        Self::with_hasher(config, hasher)
    }

    /// Create an empty ring with a caller-provided hasher
    ///
    /// `config.hash` is ignored.
    pub fn with_hasher(config: RingConfig, hasher: Box<dyn KeyHasher>) -> Self {
        let config = config.sanitized();
        debug!(
            replicas = config.replicas,
            load_factor = config.load_factor,
            hash = hasher.name(),
            "creating ring"
        );

        Ring {
            state: RwLock::new(RingState {
                topology: Topology::default(),
                nodes: HashMap::new(),
                assignments: HashMap::new(),
                tracker: LoadTracker::new(config.load_factor),
                last_rebalance: None,
            }),
            hasher,
            replicas: config.replicas,
        }
    }

    /// Add a physical node and its virtual nodes
    ///
    /// Any load carried by `node` is discarded. Existing assignments are
    /// rebalanced over the new membership.
    pub fn add_node(&self, node: Node) -> RingResult<()> {
        if node.id().is_empty() {
            return Err(RingError::InvalidNodeId);
        }

        let mut guard = self.state.write();
        let state = &mut *guard;
        if state.nodes.contains_key(node.id()) {
            return Err(RingError::AlreadyExists(node.id().to_string()));
        }

        let node = node.detached();
        let id = node.id().to_string();
        let collisions = state
            .topology
            .insert_node(self.hasher.as_ref(), &id, self.replicas);
        if collisions > 0 {
            warn!(node = %id, collisions, "virtual node positions taken over");
        }

        state.nodes.insert(id.clone(), node);
        state.tracker.recompute(&mut state.nodes);

        let summary = state.rebalance(self.hasher.as_ref());
        info!(
            node = %id,
            nodes = state.nodes.len(),
            ring_size = state.topology.len(),
            moved = summary.moved,
            "added node to ring"
        );
        Ok(())
    }

    /// Remove a physical node and re-place the keys it owned
    pub fn remove_node(&self, node_id: &str) -> RingResult<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let node = state
            .nodes
            .remove(node_id)
            .ok_or_else(|| RingError::NodeNotFound(node_id.to_string()))?;

        let removed = state.topology.remove_node(node_id);
        state.tracker.subtract(node.load());
        state.tracker.recompute(&mut state.nodes);

        let summary = state.rebalance(self.hasher.as_ref());
        info!(
            node = node_id,
            positions = removed,
            nodes = state.nodes.len(),
            moved = summary.moved,
            dropped = summary.dropped,
            "removed node from ring"
        );
        Ok(())
    }

    /// Node responsible for `key`, ignoring loads
    ///
    /// Pure: nothing is recorded.
    pub fn get_node(&self, key: &str) -> RingResult<String> {
        self.lookup(self.position_of(key))
    }

    /// Node owning the first virtual node at or after `position`
    pub fn lookup(&self, position: u64) -> RingResult<String> {
        let state = self.state.read();
        state
            .topology
            .lookup(position)
            .map(str::to_string)
            .ok_or(RingError::Empty)
    }

    /// Ring position of `key`
    pub fn position_of(&self, key: &str) -> u64 {
        self.hasher.hash(key.as_bytes())
    }

    /// Assign `key` to a node under the bounded-load policy
    ///
    /// A key already assigned to a live node keeps its node. Otherwise the
    /// ring walks clockwise from the key's position and takes the first node
    /// below capacity. If every node is full, the key goes to the node it
    /// hashes to anyway; this never fails, the overflow shows up in
    /// [`Ring::stats`].
    pub fn assign_key(&self, key: &str) -> RingResult<Assignment> {
        let position = self.position_of(key);
        let mut guard = self.state.write();
        let state = &mut *guard;

        if state.nodes.is_empty() {
            return Err(RingError::Empty);
        }

        let stale = match state.assignments.get(key) {
            Some(owner) => match state.nodes.get(owner) {
                Some(node) => return Ok(Assignment::of(node)),
                None => Some(owner.clone()),
            },
            None => None,
        };
        if let Some(owner) = stale {
            // Owner is gone, place the key again
            state.assignments.remove(key);
            state.tracker.record_release();
            debug!(key, node = %owner, "dropping stale assignment");
        }

        let (node_id, fallback) = state.place(position).ok_or(RingError::Empty)?;
        if fallback {
            warn!(key, node = %node_id, max_load = state.tracker.max_load(), "all nodes at capacity, exceeding cap");
            state.tracker.record_fallback();
        }

        state.charge(key.to_string(), node_id.clone());
        state.tracker.recompute(&mut state.nodes);

        let node = state.nodes.get(&node_id).ok_or(RingError::Empty)?;
        debug!(key, node = %node_id, load = node.load(), max_load = node.max_load(), "assigned key");
        Ok(Assignment::of(node))
    }

    /// Forget the assignment of `key` and give its unit of load back
    pub fn release_key(&self, key: &str) -> RingResult<()> {
        let mut guard = self.state.write();
        let state = &mut *guard;

        let owner = state
            .assignments
            .remove(key)
            .ok_or_else(|| RingError::KeyNotFound(key.to_string()))?;

        if let Some(node) = state.nodes.get_mut(&owner) {
            node.decrement_load();
        }
        state.tracker.record_release();
        state.tracker.recompute(&mut state.nodes);

        debug!(key, node = %owner, "released key");
        Ok(())
    }

    /// Node currently recorded for `key`, without assigning it
    pub fn assigned_node(&self, key: &str) -> Option<String> {
        self.state.read().assignments.get(key).cloned()
    }

    /// Change the load factor and recompute the cap
    ///
    /// Existing assignments stay where they are.
    pub fn set_load_factor(&self, load_factor: f64) {
        let load_factor = sanitize_load_factor(load_factor);
        let mut guard = self.state.write();
        let state = &mut *guard;
        state.tracker.set_load_factor(load_factor);
        state.tracker.recompute(&mut state.nodes);
        info!(load_factor, max_load = state.tracker.max_load(), "load factor updated");
    }

    /// Snapshot of a node
    pub fn node(&self, node_id: &str) -> Option<Node> {
        self.state.read().nodes.get(node_id).cloned()
    }

    /// Current load of a node
    pub fn node_load(&self, node_id: &str) -> RingResult<usize> {
        self.state
            .read()
            .nodes
            .get(node_id)
            .map(Node::load)
            .ok_or_else(|| RingError::NodeNotFound(node_id.to_string()))
    }

    pub fn contains_node(&self, node_id: &str) -> bool {
        self.state.read().nodes.contains_key(node_id)
    }

    /// Snapshots of every node, sorted by id
    pub fn nodes(&self) -> Vec<Node> {
        let mut nodes: Vec<Node> = self.state.read().nodes.values().cloned().collect();
        nodes.sort_by(|a, b| a.id().cmp(b.id()));
        nodes
    }

    /// Ids of every node, sorted
    pub fn node_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.state.read().nodes.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Number of physical nodes
    pub fn len(&self) -> usize {
        self.state.read().nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().nodes.is_empty()
    }

    /// Number of keys currently assigned in bounded-load mode
    pub fn assigned_keys(&self) -> usize {
        self.state.read().assignments.len()
    }

    /// Ring-wide cap, 0 while unbounded
    pub fn max_load(&self) -> usize {
        self.state.read().tracker.max_load()
    }

    pub fn load_factor(&self) -> f64 {
        self.state.read().tracker.load_factor()
    }

    pub fn replicas(&self) -> usize {
        self.replicas
    }

    /// Summary of the most recent rebalance, if any happened
    pub fn last_rebalance(&self) -> Option<RebalanceSummary> {
        self.state.read().last_rebalance
    }

    /// Statistics about the ring
    pub fn stats(&self) -> RingStats {
        let state = self.state.read();

        let mut nodes: Vec<NodeStats> = state
            .nodes
            .values()
            .map(|node| NodeStats {
                id: node.id().to_string(),
                address: node.address().to_string(),
                load: node.load(),
                max_load: node.max_load(),
            })
            .collect();
        nodes.sort_by(|a, b| a.id.cmp(&b.id));

        let total_keys = state.tracker.total_assigned();
        let average_load = total_keys as f64 / state.nodes.len().max(1) as f64;
        let loads: Vec<usize> = nodes.iter().map(|n| n.load).collect();

        RingStats {
            node_count: state.nodes.len(),
            total_keys,
            virtual_nodes: self.replicas,
            ring_size: state.topology.len(),
            load_factor: state.tracker.load_factor(),
            max_load: state.tracker.max_load(),
            average_load,
            balance_ratio: stats::balance_ratio(&loads, average_load),
            fallback_assignments: state.tracker.fallbacks(),
            hash: self.hasher.name(),
            nodes,
        }
    }
}

impl Default for Ring {
    fn default() -> Self {
        Self::new(RingConfig::default())
    }
}

impl fmt::Debug for Ring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Ring")
            .field("replicas", &self.replicas)
            .field("hash", &self.hasher.name())
            .field("nodes", &state.nodes.len())
            .field("ring_size", &state.topology.len())
            .field("assigned_keys", &state.assignments.len())
            .finish()
    }
}

impl RingState {
    /// Pick a node for a key hashed to `position`
    ///
    /// Walks clockwise once around the ring and returns the first node that
    /// can accept a key. When none can, returns the node the key hashes to
    /// with the fallback flag set. `None` when the ring has no positions.
    fn place(&self, position: u64) -> Option<(String, bool)> {
        let start = self.topology.search(position)?;

        for step in 0..self.topology.len() {
            let Some(id) = self.topology.owner_at(start + step) else {
                continue;
            };
            if self.nodes.get(id).map(Node::can_accept).unwrap_or(false) {
                return Some((id.to_string(), false));
            }
        }

        self.topology
            .owner_at(start)
            .map(|id| (id.to_string(), true))
    }

    /// Record `key` on `node_id` and charge one unit of load
    fn charge(&mut self, key: String, node_id: String) {
        if let Some(node) = self.nodes.get_mut(&node_id) {
            node.increment_load();
        }
        self.tracker.record_assignment();
        self.assignments.insert(key, node_id);
    }

    /// Re-derive every assignment from scratch
    ///
    /// Loads are reset and each key is placed again in key order, with the
    /// cap of the full key count enforced from the start. Keys are dropped
    /// when the ring has no node left.
    fn rebalance(&mut self, hasher: &dyn KeyHasher) -> RebalanceSummary {
        let previous = std::mem::take(&mut self.assignments);
        let mut keys: Vec<&String> = previous.keys().collect();
        keys.sort_unstable();

        for node in self.nodes.values_mut() {
            node.reset_load();
        }
        self.tracker.reset_total();
        self.tracker.recompute_for(keys.len(), &mut self.nodes);

        let mut summary = RebalanceSummary {
            keys: keys.len(),
            ..RebalanceSummary::default()
        };

        for key in keys {
            let Some((node_id, fallback)) = self.place(hasher.hash(key.as_bytes())) else {
                summary.dropped += 1;
                continue;
            };
            if fallback {
                summary.fallbacks += 1;
                self.tracker.record_fallback();
            }
            if previous.get(key) != Some(&node_id) {
                summary.moved += 1;
            }
            self.charge(key.clone(), node_id);
        }

        self.tracker.recompute(&mut self.nodes);

        if summary.keys > 0 {
            debug!(
                keys = summary.keys,
                moved = summary.moved,
                fallbacks = summary.fallbacks,
                dropped = summary.dropped,
                "rebalanced assignments"
            );
            if summary.fallbacks > 0 {
                warn!(fallbacks = summary.fallbacks, "rebalance exceeded node capacity");
            }
        }
        self.last_rebalance = Some(summary);
        summary
    }
}
