//! Node registry and the dependency graph that owns it.
//!
//! Nodes are stored in an append-only arena; a path index guarantees at most
//! one node per canonical path. Children are [`NodeId`]s into the arena, so
//! cycles and shared children need no reference counting.

use std::collections::{BTreeMap, HashMap};
use std::ops::Index;
use std::path::{Path, PathBuf};

use crate::types::{artifact_path_for, DependencyNode, NodeId, DEFAULT_ARTIFACT_EXTENSION};

// ---------------------------------------------------------------------------
// ArtifactLayout
// ---------------------------------------------------------------------------

/// How source paths map to artifact paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    /// Source paths are made relative to this directory.
    pub source_root: PathBuf,
    /// Artifacts are written below this directory.
    pub out_dir: PathBuf,
    /// Extension that replaces the source extension.
    pub extension: String,
}

impl ArtifactLayout {
    pub fn new(source_root: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            out_dir: out_dir.into(),
            extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
        }
    }

    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into().trim_start_matches('.').to_string();
        self
    }

    pub fn artifact_for(&self, source: &Path) -> PathBuf {
        artifact_path_for(source, &self.source_root, &self.out_dir, &self.extension)
    }
}

// ---------------------------------------------------------------------------
// NodeRegistry
// ---------------------------------------------------------------------------

/// Canonical-path-keyed node store. Append-only.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: Vec<DependencyNode>,
    by_path: HashMap<PathBuf, NodeId>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the node for `path`, creating it if unseen. The flag is `true`
    /// when the node was created by this call.
    pub fn get_or_insert(&mut self, path: &Path, layout: &ArtifactLayout) -> (NodeId, bool) {
        if let Some(&id) = self.by_path.get(path) {
            return (id, false);
        }
        let id = NodeId(self.nodes.len());
        let artifact = layout.artifact_for(path);
        self.nodes
            .push(DependencyNode::new(id, path.to_path_buf(), artifact));
        self.by_path.insert(path.to_path_buf(), id);
        (id, true)
    }

    pub fn lookup(&self, path: &Path) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    pub fn get(&self, id: NodeId) -> Option<&DependencyNode> {
        self.nodes.get(id.0)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Option<&mut DependencyNode> {
        self.nodes.get_mut(id.0)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &DependencyNode> {
        self.nodes.iter()
    }
}

// ---------------------------------------------------------------------------
// DependencyGraph
// ---------------------------------------------------------------------------

/// A rooted import graph over source files.
///
/// Lives for one build + traversal session. Construction mutates it through
/// [`crate::graph::GraphBuilder`]; traversal only flips `generated` flags.
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    registry: NodeRegistry,
    root: NodeId,
    layout: ArtifactLayout,
}

impl DependencyGraph {
    /// Create a graph holding only the (unexpanded) root node.
    ///
    /// `root_path` should already be canonical (see [`crate::types::absolutize`]).
    pub fn new(root_path: &Path, layout: ArtifactLayout) -> Self {
        let mut registry = NodeRegistry::new();
        let (root, _) = registry.get_or_insert(root_path, &layout);
        Self {
            registry,
            root,
            layout,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &DependencyNode {
        &self[self.root]
    }

    pub fn layout(&self) -> &ArtifactLayout {
        &self.layout
    }

    pub fn registry(&self) -> &NodeRegistry {
        &self.registry
    }

    pub fn get(&self, id: NodeId) -> Option<&DependencyNode> {
        self.registry.get(id)
    }

    pub fn lookup(&self, path: &Path) -> Option<NodeId> {
        self.registry.lookup(path)
    }

    pub fn len(&self) -> usize {
        self.registry.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registry.is_empty()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &DependencyNode> {
        self.registry.iter()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &DependencyNode> {
        self.get(id)
            .into_iter()
            .flat_map(|n| n.children().iter())
            .filter_map(|c| self.get(*c))
    }

    /// Directed edges derived from each node's recorded imports, in arena
    /// order.
    pub fn edges(&self) -> Vec<(NodeId, NodeId)> {
        self.nodes()
            .flat_map(|n| {
                n.imports()
                    .iter()
                    .filter_map(|p| self.lookup(p))
                    .map(move |target| (n.id(), target))
            })
            .collect()
    }

    pub fn generated_count(&self) -> usize {
        self.nodes().filter(|n| n.is_generated()).count()
    }

    /// Artifact paths claimed by more than one source file, with those
    /// sources in arena order. `a.ts` and `a.js` side by side both map to
    /// `a.md`.
    pub fn artifact_collisions(&self) -> Vec<(&Path, Vec<&Path>)> {
        let mut by_artifact: BTreeMap<&Path, Vec<&Path>> = BTreeMap::new();
        for node in self.nodes() {
            by_artifact
                .entry(node.artifact_path())
                .or_default()
                .push(node.path());
        }
        by_artifact
            .into_iter()
            .filter(|(_, sources)| sources.len() > 1)
            .collect()
    }

    /// Mark every node whose artifact already exists on disk as generated.
    /// Returns how many nodes were newly marked.
    pub fn mark_existing_artifacts(&mut self) -> usize {
        let mut marked = 0;
        for id in (0..self.registry.len()).map(NodeId) {
            if let Some(node) = self.registry.get_mut(id) {
                if !node.is_generated() && node.artifact_path().is_file() {
                    node.set_generated(true);
                    marked += 1;
                }
            }
        }
        marked
    }

    pub(crate) fn get_or_insert(&mut self, path: &Path) -> (NodeId, bool) {
        self.registry.get_or_insert(path, &self.layout)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut DependencyNode> {
        self.registry.get_mut(id)
    }
}

impl Index<NodeId> for DependencyGraph {
    type Output = DependencyNode;

    /// Ids are only handed out by this graph's registry, so they are always
    /// in bounds for the graph that produced them.
    fn index(&self, id: NodeId) -> &Self::Output {
        &self.registry.nodes[id.0]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
