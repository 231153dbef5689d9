//! Virtual node placement and clockwise lookup

use crate::hash::KeyHasher;
use std::collections::HashMap;
use tracing::debug;

/// Sorted ring positions and the node owning each of them
#[derive(Debug, Default)]
pub(crate) struct Topology {
    /// Distinct positions, always sorted ascending
    positions: Vec<u64>,

    /// Position -> node id
    owners: HashMap<u64, String>,
}

/// Ring position of virtual node `index` of `node_id`
pub(crate) fn vnode_position(hasher: &dyn KeyHasher, node_id: &str, index: usize) -> u64 {
    hasher.hash(format!("{}#{}", node_id, index).as_bytes())
}

impl Topology {
    /// Place `replicas` virtual nodes for `node_id`
    ///
    /// A position already owned is taken over by `node_id` (last write wins).
    /// Returns the number of such collisions.
    pub fn insert_node(&mut self, hasher: &dyn KeyHasher, node_id: &str, replicas: usize) -> usize {
        let mut collisions = 0;
        self.positions.reserve(replicas);

        for i in 0..replicas {
            let pos = vnode_position(hasher, node_id, i);
            match self.owners.insert(pos, node_id.to_string()) {
                None => self.positions.push(pos),
                Some(previous) => {
                    debug!(position = pos, %previous, node = node_id, "virtual node collision");
                    collisions += 1;
                }
            }
        }

        self.positions.sort_unstable();
        collisions
    }

    /// Drop every position owned by `node_id`, returning how many were removed
    pub fn remove_node(&mut self, node_id: &str) -> usize {
        let before = self.positions.len();
        let owners = &self.owners;
        self.positions
            .retain(|pos| owners.get(pos).map(|owner| owner != node_id).unwrap_or(true));
        self.owners.retain(|_, owner| owner != node_id);
        before - self.positions.len()
    }

    /// Index of the first position >= `position`, wrapping to 0 past the end
    ///
    /// `None` only when the ring has no positions.
    pub fn search(&self, position: u64) -> Option<usize> {
        if self.positions.is_empty() {
            return None;
        }
        let idx = self.positions.partition_point(|&p| p < position);
        Some(if idx == self.positions.len() { 0 } else { idx })
    }

    /// Node owning the position at `idx`, taken modulo the ring length
    pub fn owner_at(&self, idx: usize) -> Option<&str> {
        if self.positions.is_empty() {
            return None;
        }
        let pos = self.positions[idx % self.positions.len()];
        self.owners.get(&pos).map(String::as_str)
    }

    /// Node owning the first position clockwise from `position`
    pub fn lookup(&self, position: u64) -> Option<&str> {
        self.search(position).and_then(|idx| self.owner_at(idx))
    }

    /// Number of positions on the ring
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[cfg(test)]
    pub fn positions(&self) -> &[u64] {
        &self.positions
    }
}
