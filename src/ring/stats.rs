//! Ring statistics

use serde::Serialize;

/// Snapshot of the whole ring
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RingStats {
    /// Physical nodes currently on the ring
    pub node_count: usize,

    /// Keys currently assigned in bounded-load mode
    pub total_keys: usize,

    /// Virtual nodes per physical node
    pub virtual_nodes: usize,

    /// Positions actually on the ring
    pub ring_size: usize,

    pub load_factor: f64,

    /// Ring-wide cap, 0 when unbounded
    pub max_load: usize,

    /// Mean load per node
    pub average_load: f64,

    /// Highest node load divided by the mean, 0 when nothing is assigned
    pub balance_ratio: f64,

    /// Assignments that went over the cap since the ring was created
    pub fallback_assignments: u64,

    /// Name of the hash function placing keys
    pub hash: &'static str,

    /// Per-node details, sorted by node id
    pub nodes: Vec<NodeStats>,
}

/// Load of a single node
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeStats {
    pub id: String,
    pub address: String,
    pub load: usize,
    pub max_load: usize,
}

impl RingStats {
    /// Nodes whose load went past the cap
    pub fn overloaded_nodes(&self) -> impl Iterator<Item = &NodeStats> {
        self.nodes
            .iter()
            .filter(|n| n.max_load != 0 && n.load > n.max_load)
    }

    /// Sum of all node loads
    pub fn total_load(&self) -> usize {
        self.nodes.iter().map(|n| n.load).sum()
    }
}

/// Highest load over the mean
pub(crate) fn balance_ratio(loads: &[usize], average: f64) -> f64 {
    if average == 0.0 {
        return 0.0;
    }
    let highest = loads.iter().copied().max().unwrap_or(0);
    highest as f64 / average
}
