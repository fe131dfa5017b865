//! Graph construction from an entry file.
//!
//! Expansion is depth-first over an explicit stack of frames rather than
//! recursion, so long import chains cannot exhaust the call stack. Each frame
//! holds one file's resolved, non-ignored imports that still need recording.
//!
//! A node is marked `visited` when its frame is opened; a visited node is never
//! expanded again. The set of nodes with an open frame is the current
//! expansion path, which is what [`CyclePolicy`] consults for back-edges.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::store::{ArtifactLayout, DependencyGraph};
use crate::resolution::{IgnoreMatcher, ImportExtractor, ImportForms, PathResolver};
use crate::types::{absolutize, NodeId, DEFAULT_ARTIFACT_EXTENSION};

/// Default output root for artifacts.
pub const DEFAULT_OUT_DIR: &str = "docs";

// ---------------------------------------------------------------------------
// CyclePolicy
// ---------------------------------------------------------------------------

/// How imports that close a cycle are recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CyclePolicy {
    /// An import of a node still being expanded (an ancestor on the current
    /// path, or the file itself) is not recorded. `a → b → a` yields the
    /// single edge `a → b`.
    #[default]
    DropBackEdges,
    /// Record every resolved import, including back-edges.
    Preserve,
}

impl CyclePolicy {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('_', "-").as_str() {
            "drop-back-edges" | "drop" => Some(Self::DropBackEdges),
            "preserve" | "keep" => Some(Self::Preserve),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// GraphBuilder
// ---------------------------------------------------------------------------

/// Builds a [`DependencyGraph`] by following imports from an entry file.
#[derive(Debug, Clone)]
pub struct GraphBuilder {
    extractor: ImportExtractor,
    resolver: PathResolver,
    ignore: IgnoreMatcher,
    cycle_policy: CyclePolicy,
    out_dir: PathBuf,
    source_root: Option<PathBuf>,
    artifact_extension: String,
}

/// One file whose imports are being recorded.
struct Frame {
    node: NodeId,
    pending: VecDeque<PathBuf>,
}

impl GraphBuilder {
    pub fn new() -> Result<Self> {
        Ok(Self {
            extractor: ImportExtractor::new(ImportForms::All)?,
            resolver: PathResolver::new(),
            ignore: IgnoreMatcher::none(),
            cycle_policy: CyclePolicy::default(),
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            source_root: None,
            artifact_extension: DEFAULT_ARTIFACT_EXTENSION.to_string(),
        })
    }

    pub fn with_import_forms(mut self, forms: ImportForms) -> Result<Self> {
        self.extractor = ImportExtractor::new(forms)?;
        Ok(self)
    }

    pub fn with_resolver(mut self, resolver: PathResolver) -> Self {
        self.resolver = resolver;
        self
    }

    pub fn with_ignore(mut self, ignore: IgnoreMatcher) -> Self {
        self.ignore = ignore;
        self
    }

    pub fn with_cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    pub fn with_out_dir(mut self, out_dir: impl Into<PathBuf>) -> Self {
        self.out_dir = out_dir.into();
        self
    }

    /// Directory artifact paths are computed relative to. Defaults to the
    /// entry file's directory.
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = Some(root.into());
        self
    }

    pub fn with_artifact_extension(mut self, extension: impl Into<String>) -> Self {
        self.artifact_extension = extension.into();
        self
    }

    /// Build the graph reachable from `entry`.
    ///
    /// Only path canonicalization can fail here. Unreadable files and
    /// unresolvable imports are logged and leave the graph smaller.
    pub async fn build(&self, entry: &Path) -> Result<DependencyGraph> {
        let root_path = absolutize(entry)?;
        let source_root = match &self.source_root {
            Some(root) => absolutize(root)?,
            None => root_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("/")),
        };
        let layout = ArtifactLayout::new(source_root, &self.out_dir)
            .with_extension(self.artifact_extension.as_str());

        let mut graph = DependencyGraph::new(&root_path, layout);
        let root = graph.root();
        self.expand(&mut graph, root).await;

        for (artifact, sources) in graph.artifact_collisions() {
            let sources: Vec<String> = sources.iter().map(|p| p.display().to_string()).collect();
            tracing::warn!(
                "{} files share artifact {}: {}",
                sources.len(),
                artifact.display(),
                sources.join(", ")
            );
        }

        tracing::info!(
            "Generated dependency graph for {}: {} nodes, {} edges",
            root_path.display(),
            graph.len(),
            graph.edges().len()
        );
        Ok(graph)
    }

    /// Expand `start` and everything newly reachable from it, in place.
    /// Returns immediately if `start` was already visited.
    pub async fn expand(&self, graph: &mut DependencyGraph, start: NodeId) {
        if graph.get(start).map_or(true, |n| n.is_visited()) {
            return;
        }

        let mut in_progress: HashSet<NodeId> = HashSet::new();
        let mut stack = vec![self.open(graph, start).await];
        in_progress.insert(start);

        while let Some(frame) = stack.last_mut() {
            let current = frame.node;
            let Some(target) = frame.pending.pop_front() else {
                in_progress.remove(&current);
                stack.pop();
                continue;
            };

            let (child, created) = graph.get_or_insert(&target);
            if !created
                && self.cycle_policy == CyclePolicy::DropBackEdges
                && in_progress.contains(&child)
            {
                tracing::debug!(
                    "cycle: not recording back-edge {} -> {}",
                    graph[current].path().display(),
                    target.display()
                );
                continue;
            }

            if let Some(node) = graph.node_mut(current) {
                node.add_import(&target);
                node.add_child(child);
            }

            if !graph[child].is_visited() {
                let frame = self.open(graph, child).await;
                in_progress.insert(child);
                stack.push(frame);
            }
        }
    }

    /// Mark `id` visited, read its file, and collect the imports to record.
    async fn open(&self, graph: &mut DependencyGraph, id: NodeId) -> Frame {
        let mut frame = Frame {
            node: id,
            pending: VecDeque::new(),
        };
        let source_root = graph.layout().source_root.clone();
        let Some(node) = graph.node_mut(id) else {
            return frame;
        };
        node.mark_visited();
        let path = node.path().to_path_buf();

        let source = match tokio::fs::read_to_string(&path).await {
            Ok(s) => s,
            Err(e) => {
                tracing::warn!("Error reading file {}: {}", path.display(), e);
                return frame;
            }
        };

        for specifier in self.extractor.extract(&source) {
            node.add_specifier(&specifier);

            let Some(resolved) = self.resolver.resolve(&path, &specifier) else {
                continue;
            };
            if self.ignore.is_ignored_under(&resolved, &source_root) {
                tracing::debug!("ignoring path: {}", resolved.display());
                continue;
            }
            frame.pending.push_back(resolved);
        }

        frame
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_files(files: &[(&str, &str)]) -> TempDir {
        let dir = TempDir::new().unwrap();
        for (path, content) in files {
            let full = dir.path().join(path);
            std::fs::create_dir_all(full.parent().unwrap()).unwrap();
            std::fs::write(&full, content).unwrap();
        }
        dir
    }

    fn names(graph: &DependencyGraph, id: NodeId) -> Vec<String> {
        graph.children(id).map(|n| n.name().to_string()).collect()
    }

    #[tokio::test]
    async fn builds_linear_chain() {
        let dir = write_files(&[
            ("index.ts", "import { a } from './a';"),
            ("a.ts", "import b from './b';"),
            ("b.ts", "export const b = 1;"),
        ]);
        let graph = GraphBuilder::new()
            .unwrap()
            .build(&dir.path().join("index.ts"))
            .await
            .unwrap();

        assert_eq!(graph.len(), 3);
        assert_eq!(names(&graph, graph.root()), ["a.ts"]);
        assert!(graph.nodes().all(|n| n.is_visited()));
        assert!(graph.nodes().all(|n| !n.is_generated()));
    }

    #[tokio::test]
    async fn records_raw_specifiers_including_packages() {
        let dir = write_files(&[
            ("index.ts", "import React from 'react';\nimport { a } from './a';\nimport './missing';"),
            ("a.ts", ""),
        ]);
        let graph = GraphBuilder::new()
            .unwrap()
            .build(&dir.path().join("index.ts"))
            .await
            .unwrap();

        let root = graph.root_node();
        assert_eq!(root.specifiers(), ["react", "./a", "./missing"]);
        assert_eq!(root.imports(), [dir.path().join("a.ts")]);
        assert_eq!(graph.len(), 2);
    }

    #[tokio::test]
    async fn unreadable_entry_leaves_root_childless() {
        let dir = TempDir::new().unwrap();
        let graph = GraphBuilder::new()
            .unwrap()
            .build(&dir.path().join("nope.ts"))
            .await
            .unwrap();
        assert_eq!(graph.len(), 1);
        assert!(graph.root_node().is_visited());
        assert!(graph.root_node().children().is_empty());
    }

    #[tokio::test]
    async fn self_import_is_dropped_by_default_and_kept_when_preserving() {
        let dir = write_files(&[("index.ts", "import x from './index';")]);
        let entry = dir.path().join("index.ts");

        let dropped = GraphBuilder::new().unwrap().build(&entry).await.unwrap();
        assert!(dropped.root_node().children().is_empty());

        let kept = GraphBuilder::new()
            .unwrap()
            .with_cycle_policy(CyclePolicy::Preserve)
            .build(&entry)
            .await
            .unwrap();
        assert_eq!(kept.root_node().children(), [kept.root()]);
    }

    #[tokio::test]
    async fn preserve_policy_records_back_edges() {
        let dir = write_files(&[
            ("a.ts", "import b from './b';"),
            ("b.ts", "import a from './a';"),
        ]);
        let graph = GraphBuilder::new()
            .unwrap()
            .with_cycle_policy(CyclePolicy::Preserve)
            .build(&dir.path().join("a.ts"))
            .await
            .unwrap();
        assert_eq!(graph.len(), 2);
        assert_eq!(graph.edges().len(), 2);
    }

    #[tokio::test]
    async fn expand_on_visited_node_is_a_no_op() {
        let dir = write_files(&[("index.ts", "import a from './a';"), ("a.ts", "")]);
        let builder = GraphBuilder::new().unwrap();
        let mut graph = builder.build(&dir.path().join("index.ts")).await.unwrap();
        let before = graph.len();
        let root = graph.root();
        builder.expand(&mut graph, root).await;
        assert_eq!(graph.len(), before);
        assert_eq!(graph.root_node().children().len(), 1);
    }

    #[tokio::test]
    async fn static_forms_skip_require() {
        let dir = write_files(&[
            ("index.js", "const a = require('./a');\nimport b from './b';"),
            ("a.js", ""),
            ("b.js", ""),
        ]);
        let graph = GraphBuilder::new()
            .unwrap()
            .with_import_forms(ImportForms::Static)
            .unwrap()
            .build(&dir.path().join("index.js"))
            .await
            .unwrap();
        assert_eq!(names(&graph, graph.root()), ["b.js"]);
    }

    #[tokio::test]
    async fn artifact_paths_default_to_entry_directory() {
        let dir = write_files(&[
            ("src/index.ts", "import u from './lib/util';"),
            ("src/lib/util.ts", ""),
        ]);
        let graph = GraphBuilder::new()
            .unwrap()
            .with_out_dir("out")
            .build(&dir.path().join("src/index.ts"))
            .await
            .unwrap();
        let util = graph.lookup(&dir.path().join("src/lib/util.ts")).unwrap();
        assert_eq!(graph[util].artifact_path(), Path::new("out/lib/util.md"));
        assert_eq!(graph.root_node().artifact_path(), Path::new("out/index.md"));
    }

    #[test]
    fn cycle_policy_loose_parsing() {
        assert_eq!(
            CyclePolicy::from_str_loose("drop_back_edges"),
            Some(CyclePolicy::DropBackEdges)
        );
        assert_eq!(
            CyclePolicy::from_str_loose("Preserve"),
            Some(CyclePolicy::Preserve)
        );
        assert_eq!(CyclePolicy::from_str_loose("detect"), None);
    }
}
