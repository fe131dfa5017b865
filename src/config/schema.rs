//! Configuration data structures for docgraph.
//!
//! Defines the YAML config format: entry and output locations, ignore
//! patterns, resolution knobs, cycle policy and traversal tuning. Every field
//! has a default so a partial file (or none at all) is valid.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::graph::builder::{CyclePolicy, DEFAULT_OUT_DIR};
use crate::resolution::extractor::ImportForms;
use crate::resolution::resolver::{
    ExternalPolicy, DEFAULT_EXTENSIONS, DEFAULT_INDEX_FILE, DEFAULT_VENDOR_DIR,
};
use crate::types::DEFAULT_ARTIFACT_EXTENSION;

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Root configuration for docgraph.
///
/// Loaded from YAML, then environment variables, then CLI flags; later
/// sources win.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocGraphConfig {
    /// Entry file the graph is built from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<PathBuf>,

    /// Root directory for artifacts.
    #[serde(default = "default_out_dir")]
    pub out_dir: PathBuf,

    /// Directory artifact paths are made relative to. Defaults to the entry
    /// file's directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<PathBuf>,

    /// Extension of generated artifacts.
    #[serde(default = "default_artifact_extension")]
    pub artifact_extension: String,

    /// Glob (or `re:`-prefixed regex) patterns excluded from the graph.
    #[serde(default)]
    pub ignore: Vec<String>,

    #[serde(default)]
    pub resolution: ResolutionConfig,

    #[serde(default)]
    pub graph: GraphConfig,

    #[serde(default)]
    pub traversal: TraversalConfig,
}

impl Default for DocGraphConfig {
    fn default() -> Self {
        Self {
            entry: None,
            out_dir: default_out_dir(),
            source_root: None,
            artifact_extension: default_artifact_extension(),
            ignore: Vec::new(),
            resolution: ResolutionConfig::default(),
            graph: GraphConfig::default(),
            traversal: TraversalConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Sections
// ---------------------------------------------------------------------------

/// How import specifiers turn into files.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionConfig {
    /// Probed in order after the literal path.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,

    /// Basename probed inside directories.
    #[serde(default = "default_index_file")]
    pub index_file: String,

    /// What to do with bare (package) specifiers.
    #[serde(default)]
    pub external: ExternalPolicy,

    /// Package directory used when `external` is `vendor`.
    #[serde(default = "default_vendor_dir")]
    pub vendor_dir: PathBuf,

    /// Which import syntaxes are recognised.
    #[serde(default)]
    pub import_forms: ImportForms,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            index_file: default_index_file(),
            external: ExternalPolicy::default(),
            vendor_dir: default_vendor_dir(),
            import_forms: ImportForms::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GraphConfig {
    #[serde(default)]
    pub cycle_policy: CyclePolicy,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TraversalConfig {
    /// Callbacks in flight per level; unset means the whole level.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    #[serde(default)]
    pub show_progress: bool,

    /// Treat nodes with an existing artifact as already generated.
    #[serde(default)]
    pub skip_existing: bool,
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

fn default_out_dir() -> PathBuf {
    PathBuf::from(DEFAULT_OUT_DIR)
}

fn default_artifact_extension() -> String {
    DEFAULT_ARTIFACT_EXTENSION.to_string()
}

fn default_extensions() -> Vec<String> {
    DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
}

fn default_index_file() -> String {
    DEFAULT_INDEX_FILE.to_string()
}

fn default_vendor_dir() -> PathBuf {
    PathBuf::from(DEFAULT_VENDOR_DIR)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_config() {
        let cfg = DocGraphConfig::default();
        assert_eq!(cfg.out_dir, PathBuf::from("docs"));
        assert_eq!(cfg.artifact_extension, "md");
        assert!(cfg.ignore.is_empty());
        assert_eq!(cfg.graph.cycle_policy, CyclePolicy::DropBackEdges);
        assert_eq!(cfg.resolution.external, ExternalPolicy::Ignore);
        assert_eq!(cfg.resolution.index_file, "index");
        assert!(cfg.traversal.concurrency.is_none());
    }

    #[test]
    fn test_empty_yaml_is_default() {
        let cfg: DocGraphConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(cfg, DocGraphConfig::default());
    }

    #[test]
    fn test_full_yaml_config() {
        let yaml = r#"
entry: src/index.ts
out_dir: generated/docs
source_root: src
artifact_extension: txt
ignore:
  - "**/*.test.ts"
  - node_modules
resolution:
  extensions: [".ts", ".js"]
  index_file: main
  external: vendor
  vendor_dir: deps
  import_forms: static
graph:
  cycle_policy: preserve
traversal:
  concurrency: 4
  show_progress: true
  skip_existing: true
"#;
        let cfg: DocGraphConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(cfg.entry, Some(PathBuf::from("src/index.ts")));
        assert_eq!(cfg.out_dir, PathBuf::from("generated/docs"));
        assert_eq!(cfg.source_root, Some(PathBuf::from("src")));
        assert_eq!(cfg.artifact_extension, "txt");
        assert_eq!(cfg.ignore, ["**/*.test.ts", "node_modules"]);
        assert_eq!(cfg.resolution.extensions, [".ts", ".js"]);
        assert_eq!(cfg.resolution.index_file, "main");
        assert_eq!(cfg.resolution.external, ExternalPolicy::Vendor);
        assert_eq!(cfg.resolution.vendor_dir, PathBuf::from("deps"));
        assert_eq!(cfg.resolution.import_forms, ImportForms::Static);
        assert_eq!(cfg.graph.cycle_policy, CyclePolicy::Preserve);
        assert_eq!(cfg.traversal.concurrency, Some(4));
        assert!(cfg.traversal.show_progress);
        assert!(cfg.traversal.skip_existing);
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let cfg: DocGraphConfig = serde_yaml::from_str("resolution:\n  index_file: mod\n").unwrap();
        assert_eq!(cfg.resolution.index_file, "mod");
        assert_eq!(cfg.resolution.extensions, default_extensions());
    }

    #[test]
    fn test_serde_yaml_roundtrip() {
        let mut cfg = DocGraphConfig::default();
        cfg.entry = Some(PathBuf::from("index.ts"));
        cfg.traversal.concurrency = Some(2);
        let text = serde_yaml::to_string(&cfg).unwrap();
        let back: DocGraphConfig = serde_yaml::from_str(&text).unwrap();
        assert_eq!(back, cfg);
    }

    #[test]
    fn test_unknown_cycle_policy_is_error() {
        let result: Result<DocGraphConfig, _> =
            serde_yaml::from_str("graph:\n  cycle_policy: sometimes\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_yaml_returns_error() {
        let result: Result<DocGraphConfig, _> = serde_yaml::from_str("ignore: [unclosed");
        assert!(result.is_err());
    }
}
