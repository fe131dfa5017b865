//! Core domain types for docgraph.
//!
//! A [`DependencyNode`] is one source file in the import graph, keyed by its
//! canonical path. Nodes live in an arena owned by the graph and refer to each
//! other through [`NodeId`]s, so a file imported from several places is one
//! node with several parents.

use std::fmt;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default extension for generated artifacts.
pub const DEFAULT_ARTIFACT_EXTENSION: &str = "md";

// ---------------------------------------------------------------------------
// NodeId
// ---------------------------------------------------------------------------

/// Index of a node in the graph's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// DependencyNode
// ---------------------------------------------------------------------------

/// A file-level node in the dependency graph.
///
/// The canonical `path` is fixed at construction. `visited` belongs to graph
/// construction, `generated` to traversal; both start out `false`.
#[derive(Debug, Clone)]
pub struct DependencyNode {
    id: NodeId,
    path: PathBuf,
    name: String,
    specifiers: Vec<String>,
    imports: Vec<PathBuf>,
    children: Vec<NodeId>,
    visited: bool,
    generated: bool,
    artifact_path: PathBuf,
}

impl DependencyNode {
    pub(crate) fn new(id: NodeId, path: PathBuf, artifact_path: PathBuf) -> Self {
        let name = file_name(&path);
        Self {
            id,
            path,
            name,
            specifiers: Vec::new(),
            imports: Vec::new(),
            children: Vec::new(),
            visited: false,
            generated: false,
            artifact_path,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Canonical (absolute, normalized) path of the source file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Basename of the source file.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw specifiers in first-seen order, as written in the source.
    pub fn specifiers(&self) -> &[String] {
        &self.specifiers
    }

    /// Resolved import paths that were recorded as edges.
    pub fn imports(&self) -> &[PathBuf] {
        &self.imports
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn is_generated(&self) -> bool {
        self.generated
    }

    /// Where the generated artifact for this file belongs.
    pub fn artifact_path(&self) -> &Path {
        &self.artifact_path
    }

    pub(crate) fn mark_visited(&mut self) {
        self.visited = true;
    }

    pub(crate) fn set_generated(&mut self, generated: bool) {
        self.generated = generated;
    }

    pub(crate) fn add_specifier(&mut self, specifier: &str) {
        if !self.specifiers.iter().any(|s| s == specifier) {
            self.specifiers.push(specifier.to_string());
        }
    }

    pub(crate) fn add_import(&mut self, path: &Path) {
        if !self.imports.iter().any(|p| p == path) {
            self.imports.push(path.to_path_buf());
        }
    }

    pub(crate) fn add_child(&mut self, child: NodeId) {
        if !self.children.contains(&child) {
            self.children.push(child);
        }
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// Lexically normalize a path by resolving `.` and `..` components.
///
/// `/src/routes/../utils/./auth` → `/src/utils/auth`. Symlinks are not
/// consulted, and `..` never climbs above the root.
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(out.components().next_back(), Some(Component::Normal(_))) {
                    out.pop();
                } else if !out.has_root() {
                    out.push("..");
                }
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

/// Make `path` absolute against the current directory and normalize it.
pub fn absolutize(path: &Path) -> std::io::Result<PathBuf> {
    if path.is_absolute() {
        Ok(normalize_path(path))
    } else {
        Ok(normalize_path(&std::env::current_dir()?.join(path)))
    }
}

/// Basename of a path, falling back to the whole path for roots.
pub fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Derive the artifact location for a source file.
///
/// The file is made relative to `source_root`, its extension replaced by
/// `extension`, and the result placed under `out_dir`. Files outside the
/// source root keep their whole path (minus the root) below `out_dir`.
///
/// Only the last extension is replaced, so `a.ts` and `a.js` in one directory
/// map to the same artifact. The graph builder warns when that happens.
pub fn artifact_path_for(
    source: &Path,
    source_root: &Path,
    out_dir: &Path,
    extension: &str,
) -> PathBuf {
    let relative: PathBuf = match source.strip_prefix(source_root) {
        Ok(rel) => rel.to_path_buf(),
        Err(_) => source
            .components()
            .filter(|c| matches!(c, Component::Normal(_)))
            .collect(),
    };
    out_dir.join(relative.with_extension(extension))
}

/// Forward-slash string form of a path, used for pattern matching.
pub fn slash_path(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn node(path: &str) -> DependencyNode {
        DependencyNode::new(NodeId(0), PathBuf::from(path), PathBuf::from("docs/x.md"))
    }

    #[test]
    fn new_node_starts_unvisited_and_ungenerated() {
        let n = node("/p/src/main.ts");
        assert_eq!(n.name(), "main.ts");
        assert!(!n.is_visited());
        assert!(!n.is_generated());
        assert!(n.children().is_empty());
    }

    #[test]
    fn add_methods_suppress_duplicates() {
        let mut n = node("/p/a.ts");
        n.add_specifier("./b");
        n.add_specifier("./c");
        n.add_specifier("./b");
        n.add_import(Path::new("/p/b.ts"));
        n.add_import(Path::new("/p/b.ts"));
        n.add_child(NodeId(1));
        n.add_child(NodeId(1));
        assert_eq!(n.specifiers(), ["./b", "./c"]);
        assert_eq!(n.imports().len(), 1);
        assert_eq!(n.children(), [NodeId(1)]);
    }

    #[test]
    fn normalize_resolves_dotdot() {
        assert_eq!(
            normalize_path(Path::new("/src/routes/../utils/auth")),
            PathBuf::from("/src/utils/auth")
        );
    }

    #[test]
    fn normalize_resolves_dot() {
        assert_eq!(
            normalize_path(Path::new("/src/./utils/./auth")),
            PathBuf::from("/src/utils/auth")
        );
    }

    #[test]
    fn normalize_never_climbs_above_root() {
        assert_eq!(normalize_path(Path::new("/../../a")), PathBuf::from("/a"));
    }

    #[test]
    fn normalize_keeps_leading_dotdot_on_relative_paths() {
        assert_eq!(normalize_path(Path::new("../a/../b")), PathBuf::from("../b"));
    }

    #[test]
    fn artifact_path_rebases_under_out_dir() {
        let p = artifact_path_for(
            Path::new("/proj/src/utils/auth.ts"),
            Path::new("/proj/src"),
            Path::new("docs"),
            "md",
        );
        assert_eq!(p, PathBuf::from("docs/utils/auth.md"));
    }

    #[test]
    fn artifact_path_only_replaces_last_extension() {
        let p = artifact_path_for(
            Path::new("/proj/user.service.ts"),
            Path::new("/proj"),
            Path::new("out"),
            "md",
        );
        assert_eq!(p, PathBuf::from("out/user.service.md"));
    }

    #[test]
    fn artifact_path_outside_root_keeps_full_path() {
        let p = artifact_path_for(
            Path::new("/other/lib/x.js"),
            Path::new("/proj"),
            Path::new("docs"),
            "md",
        );
        assert_eq!(p, PathBuf::from("docs/other/lib/x.md"));
    }

    #[test]
    fn node_id_display() {
        assert_eq!(NodeId(7).to_string(), "#7");
        assert_eq!(NodeId(7).index(), 7);
    }
}
