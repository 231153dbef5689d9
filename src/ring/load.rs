//! Bounded-load bookkeeping
//!
//! Tracks the running number of assigned keys and derives the ring-wide
//! capacity from it:
//!
//! ```text
//! mean     = total_assigned / max(1, live_nodes)
//! max_load = ceil(mean * load_factor)     (at least 1)
//! ```
//!
//! A `max_load` of 0 means no cap is enforced, which is the case while the
//! ring has no node or no key has been assigned yet.

use crate::node::Node;
use std::collections::HashMap;

/// Ring-wide load policy and counters
#[derive(Debug, Clone)]
pub(crate) struct LoadTracker {
    /// Multiplier on the mean load
    load_factor: f64,

    /// Current cap, 0 when unbounded
    max_load: usize,

    /// Keys currently assigned across all nodes
    total_assigned: usize,

    /// Assignments that had to exceed the cap, since creation
    fallbacks: u64,
}

/// Capacity for `total` keys spread over `nodes` nodes
pub(crate) fn compute_max_load(total: usize, nodes: usize, load_factor: f64) -> usize {
    if nodes == 0 || total == 0 {
        return 0;
    }
    let mean = total as f64 / nodes as f64;
    ((mean * load_factor).ceil() as usize).max(1)
}

impl LoadTracker {
    pub fn new(load_factor: f64) -> Self {
        LoadTracker {
            load_factor,
            max_load: 0,
            total_assigned: 0,
            fallbacks: 0,
        }
    }

    /// Recompute the cap and push it to every node
    pub fn recompute(&mut self, nodes: &mut HashMap<String, Node>) {
        self.recompute_for(self.total_assigned, nodes);
    }

    /// Recompute the cap for a target total without touching the counter
    ///
    /// Used by rebalancing, which rebuilds the counter key by key but must
    /// enforce the cap of the final total from the first key on.
    pub fn recompute_for(&mut self, total: usize, nodes: &mut HashMap<String, Node>) {
        self.max_load = compute_max_load(total, nodes.len(), self.load_factor);
        for node in nodes.values_mut() {
            node.set_max_load(self.max_load);
        }
    }

    pub fn record_assignment(&mut self) {
        self.total_assigned += 1;
    }

    pub fn record_release(&mut self) {
        self.total_assigned = self.total_assigned.saturating_sub(1);
    }

    pub fn record_fallback(&mut self) {
        self.fallbacks += 1;
    }

    /// Forget the load of a node leaving the ring
    pub fn subtract(&mut self, load: usize) {
        self.total_assigned = self.total_assigned.saturating_sub(load);
    }

    pub fn reset_total(&mut self) {
        self.total_assigned = 0;
    }

    pub fn set_load_factor(&mut self, load_factor: f64) {
        self.load_factor = load_factor;
    }

    pub fn load_factor(&self) -> f64 {
        self.load_factor
    }

    pub fn max_load(&self) -> usize {
        self.max_load
    }

    pub fn total_assigned(&self) -> usize {
        self.total_assigned
    }

    pub fn fallbacks(&self) -> u64 {
        self.fallbacks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compute_max_load() {
        assert_eq!(compute_max_load(300, 3, 1.25), 125);
        assert_eq!(compute_max_load(10, 3, 1.25), 5);
        assert_eq!(compute_max_load(90, 2, 1.0), 45);
        // Never below 1 once a key exists
        assert_eq!(compute_max_load(1, 100, 1.0), 1);
    }

    #[test]
    fn test_unbounded_sentinel() {
        assert_eq!(compute_max_load(0, 3, 1.25), 0);
        assert_eq!(compute_max_load(5, 0, 1.25), 0);
    }

    #[test]
    fn test_recompute_propagates_to_nodes() {
        let mut nodes = HashMap::new();
        nodes.insert("a".to_string(), Node::new("a", ""));
        nodes.insert("b".to_string(), Node::new("b", ""));

        let mut tracker = LoadTracker::new(1.5);
        for _ in 0..4 {
            tracker.record_assignment();
        }
        tracker.recompute(&mut nodes);

        assert_eq!(tracker.max_load(), 3);
        assert!(nodes.values().all(|n| n.max_load() == 3));

        tracker.subtract(10);
        assert_eq!(tracker.total_assigned(), 0);
        tracker.recompute(&mut nodes);
        assert!(nodes.values().all(|n| n.max_load() == 0));
    }
}
