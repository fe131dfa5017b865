//! Breadth-first level assignment.
//!
//! A node's level is its BFS distance from the root, taken at the first
//! discovery. Levels are computed fresh per traversal and never stored on the
//! nodes. Grouping by level approximates "dependencies before dependents": it
//! is not a topological order, and siblings on one level may depend on each
//! other.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, VecDeque};

use crate::graph::store::DependencyGraph;
use crate::types::NodeId;

/// Nodes grouped by BFS distance from the root. `levels[0]` is the root.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LevelMap {
    levels: Vec<Vec<NodeId>>,
    level_of: HashMap<NodeId, usize>,
}

impl LevelMap {
    /// Run the BFS from `graph`'s root.
    pub fn compute(graph: &DependencyGraph) -> Self {
        let mut levels: Vec<Vec<NodeId>> = Vec::new();
        let mut level_of: HashMap<NodeId, usize> = HashMap::new();
        let mut queue: VecDeque<(NodeId, usize)> = VecDeque::new();

        queue.push_back((graph.root(), 0));
        level_of.insert(graph.root(), 0);

        while let Some((id, level)) = queue.pop_front() {
            if levels.len() <= level {
                levels.resize_with(level + 1, Vec::new);
            }
            levels[level].push(id);

            let Some(node) = graph.get(id) else { continue };
            for &child in node.children() {
                if let Entry::Vacant(slot) = level_of.entry(child) {
                    slot.insert(level + 1);
                    queue.push_back((child, level + 1));
                }
            }
        }

        Self { levels, level_of }
    }

    /// Index of the deepest level, `None` for an empty map.
    pub fn max_level(&self) -> Option<usize> {
        self.levels.len().checked_sub(1)
    }

    pub fn nodes_at(&self, level: usize) -> &[NodeId] {
        self.levels.get(level).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Level of `id`, if reachable.
    pub fn level_of(&self, id: NodeId) -> Option<usize> {
        self.level_of.get(&id).copied()
    }

    pub fn depth(&self) -> usize {
        self.levels.len()
    }

    pub fn node_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// `(level, nodes)` pairs from the deepest level up to the root.
    pub fn bottom_up(&self) -> impl Iterator<Item = (usize, &[NodeId])> {
        self.levels
            .iter()
            .enumerate()
            .rev()
            .map(|(level, nodes)| (level, nodes.as_slice()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
