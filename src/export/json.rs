//! JSON export for tooling that wants the raw graph.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::store::DependencyGraph;
use crate::types::slash_path;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphJson {
    pub root: usize,
    pub nodes: Vec<NodeJson>,
    pub edges: Vec<EdgeJson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeJson {
    pub id: usize,
    pub name: String,
    pub path: String,
    pub artifact_path: String,
    pub generated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeJson {
    pub source: usize,
    pub target: usize,
}

impl GraphJson {
    pub fn from_graph(graph: &DependencyGraph) -> Self {
        Self {
            root: graph.root().index(),
            nodes: graph
                .nodes()
                .map(|n| NodeJson {
                    id: n.id().index(),
                    name: n.name().to_string(),
                    path: slash_path(n.path()),
                    artifact_path: slash_path(n.artifact_path()),
                    generated: n.is_generated(),
                })
                .collect(),
            edges: graph
                .edges()
                .into_iter()
                .map(|(source, target)| EdgeJson {
                    source: source.index(),
                    target: target.index(),
                })
                .collect(),
        }
    }
}

/// Pretty-printed JSON for the whole graph.
pub fn render_json(graph: &DependencyGraph) -> Result<String> {
    Ok(serde_json::to_string_pretty(&GraphJson::from_graph(graph))?)
}
