//! Mermaid flowchart export.
//!
//! Output is `graph TD`, then one `id["label"]` declaration per node, then
//! one `a --> b` line per recorded import. Nodes and edges follow depth-first
//! discovery from the root.

use std::collections::{HashMap, HashSet};
use std::fmt::Write;

use crate::graph::store::DependencyGraph;
use crate::types::NodeId;

/// Replace every character outside `[A-Za-z0-9]` with `_`.
pub fn sanitize_id(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}

fn escape_label(name: &str) -> String {
    name.replace('"', "#quot;")
}

/// Render the graph as Mermaid text.
pub fn render_mermaid(graph: &DependencyGraph) -> String {
    let order = discovery_order(graph);

    // Distinct nodes may share a basename; later ones get a numeric suffix.
    let mut ids: HashMap<NodeId, String> = HashMap::new();
    let mut taken: HashSet<String> = HashSet::new();
    for &id in &order {
        let base = sanitize_id(graph[id].name());
        let mut candidate = base.clone();
        let mut n = 2;
        while !taken.insert(candidate.clone()) {
            candidate = format!("{}_{}", base, n);
            n += 1;
        }
        ids.insert(id, candidate);
    }

    let mut out = String::from("graph TD\n");
    for &id in &order {
        let _ = writeln!(out, "{}[\"{}\"]", ids[&id], escape_label(graph[id].name()));
    }
    for &id in &order {
        for target in graph[id].imports() {
            let Some(target_id) = graph.lookup(target).and_then(|t| ids.get(&t)) else {
                continue;
            };
            let _ = writeln!(out, "{} --> {}", ids[&id], target_id);
        }
    }
    out
}

/// Preorder DFS from the root along recorded imports.
fn discovery_order(graph: &DependencyGraph) -> Vec<NodeId> {
    let mut order = Vec::new();
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut stack = vec![graph.root()];

    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        order.push(id);
        let Some(node) = graph.get(id) else { continue };
        for target in node.imports().iter().rev() {
            if let Some(next) = graph.lookup(target) {
                if !seen.contains(&next) {
                    stack.push(next);
                }
            }
        }
    }
    order
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
