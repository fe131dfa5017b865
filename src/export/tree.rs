//! Indented tree render of a rooted dependency graph.
//!
//! Each node prints its name, then one `↳ <basename>` line per resolved
//! import, then its children one indent deeper. A node is expanded only the
//! first time it is reached; later occurrences show up only as `↳` lines.

use std::collections::HashSet;
use std::fmt::Write;

use console::Style;

use crate::export::paint;
use crate::graph::store::DependencyGraph;
use crate::types::{file_name, NodeId};

const INDENT: &str = "  ";

/// Render the graph as an indented tree.
pub fn render_tree(graph: &DependencyGraph, color: bool) -> String {
    render(graph, color, false)
}

/// Like [`render_tree`], with generated nodes dimmed.
pub fn render_progress(graph: &DependencyGraph, color: bool) -> String {
    render(graph, color, true)
}

fn render(graph: &DependencyGraph, color: bool, progress: bool) -> String {
    let pending = Style::new().green();
    let done = Style::new().dim();
    let import = Style::new().cyan();

    let mut out = String::new();
    let mut seen: HashSet<NodeId> = HashSet::new();
    let mut stack: Vec<(NodeId, usize)> = vec![(graph.root(), 0)];

    while let Some((id, depth)) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        let Some(node) = graph.get(id) else { continue };
        let indent = INDENT.repeat(depth);

        let name_style = if progress && node.is_generated() {
            &done
        } else {
            &pending
        };
        let _ = writeln!(out, "{}{}", indent, paint(node.name(), name_style, color));

        for target in node.imports() {
            let base = file_name(target);
            let base = if progress {
                base
            } else {
                paint(&base, &import, color)
            };
            let _ = writeln!(out, "{}{}↳ {}", indent, INDENT, base);
        }

        for &child in node.children().iter().rev() {
            if !seen.contains(&child) {
                stack.push((child, depth + 1));
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
