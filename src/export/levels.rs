//! Bottom-up level listing, the order a traversal will process nodes in.

use std::fmt::Write;

use crate::graph::levels::LevelMap;
use crate::graph::store::DependencyGraph;

/// One line per level, deepest first: `level 2: c.ts`.
pub fn render_levels(graph: &DependencyGraph, levels: &LevelMap) -> String {
    let mut out = String::new();
    for (level, ids) in levels.bottom_up() {
        let names: Vec<&str> = ids
            .iter()
            .filter_map(|&id| graph.get(id))
            .map(|n| n.name())
            .collect();
        let _ = writeln!(out, "level {}: {}", level, names.join(", "));
    }
    out
}
