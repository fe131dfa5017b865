//! Configuration loading.
//!
//! Sources, lowest priority first: built-in defaults, the YAML file
//! (`.docgraph.yaml` in the project directory, or an explicit path), then
//! `DOCGRAPH_*` environment variables. CLI flags are applied on top by the
//! caller. The merged result is validated before use.

pub mod schema;

pub use schema::{DocGraphConfig, GraphConfig, ResolutionConfig, TraversalConfig};

use std::path::{Path, PathBuf};

use crate::error::{DocGraphError, Result};
use crate::graph::builder::GraphBuilder;
use crate::graph::traversal::TraversalOptions;
use crate::resolution::resolver::ExternalPolicy;
use crate::resolution::{IgnoreMatcher, PathResolver};
use crate::types::absolutize;

/// Config file looked up in the project directory.
pub const CONFIG_FILE_NAME: &str = ".docgraph.yaml";

pub const ENV_ENTRY: &str = "DOCGRAPH_ENTRY";
pub const ENV_OUT_DIR: &str = "DOCGRAPH_OUT_DIR";
pub const ENV_IGNORE: &str = "DOCGRAPH_IGNORE";
pub const ENV_CONCURRENCY: &str = "DOCGRAPH_CONCURRENCY";

/// Load, merge and validate configuration for `project_dir`.
///
/// An explicit `config_path` must exist; the implicit project file is
/// optional.
pub fn load_config(config_path: Option<&Path>, project_dir: &Path) -> Result<DocGraphConfig> {
    let mut config = match config_path {
        Some(path) => load_file(path)?,
        None => {
            let implicit = project_dir.join(CONFIG_FILE_NAME);
            if implicit.is_file() {
                load_file(&implicit)?
            } else {
                DocGraphConfig::default()
            }
        }
    };
    apply_env_overrides(&mut config, |key| std::env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Parse one YAML config file.
pub fn load_file(path: &Path) -> Result<DocGraphConfig> {
    let text = std::fs::read_to_string(path)?;
    let config: DocGraphConfig = serde_yaml::from_str(&text)?;
    tracing::debug!("Loaded config from {}", path.display());
    Ok(config)
}

/// Apply `DOCGRAPH_*` overrides read through `lookup`. Ignore patterns are
/// appended, everything else replaces.
pub fn apply_env_overrides<F>(config: &mut DocGraphConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(entry) = lookup(ENV_ENTRY).filter(|v| !v.trim().is_empty()) {
        config.entry = Some(PathBuf::from(entry.trim()));
    }
    if let Some(out_dir) = lookup(ENV_OUT_DIR).filter(|v| !v.trim().is_empty()) {
        config.out_dir = PathBuf::from(out_dir.trim());
    }
    if let Some(ignore) = lookup(ENV_IGNORE) {
        config.ignore.extend(
            ignore
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(String::from),
        );
    }
    if let Some(raw) = lookup(ENV_CONCURRENCY).filter(|v| !v.trim().is_empty()) {
        let value = raw.trim().parse::<usize>().map_err(|_| {
            DocGraphError::Config(format!(
                "{} must be a positive integer, got {:?}",
                ENV_CONCURRENCY, raw
            ))
        })?;
        config.traversal.concurrency = Some(value);
    }
    Ok(())
}

impl DocGraphConfig {
    /// Reject values that would make resolution or traversal meaningless.
    pub fn validate(&self) -> Result<()> {
        if self.traversal.concurrency == Some(0) {
            return Err(DocGraphError::Config(
                "traversal.concurrency must be at least 1".into(),
            ));
        }
        if self.resolution.extensions.is_empty() {
            return Err(DocGraphError::Config(
                "resolution.extensions must list at least one extension".into(),
            ));
        }
        if self.resolution.index_file.trim().is_empty() {
            return Err(DocGraphError::Config(
                "resolution.index_file must not be empty".into(),
            ));
        }
        if self.artifact_extension.trim_start_matches('.').is_empty() {
            return Err(DocGraphError::Config(
                "artifact_extension must not be empty".into(),
            ));
        }
        Ok(())
    }

    pub fn ignore_matcher(&self) -> Result<IgnoreMatcher> {
        IgnoreMatcher::from_patterns(&self.ignore)
    }

    /// A graph builder wired from this config. Relative `source_root` and
    /// `vendor_dir` are taken relative to `project_dir`, and ignore globs
    /// are matched below it.
    pub fn graph_builder(&self, project_dir: &Path) -> Result<GraphBuilder> {
        let mut resolver = PathResolver::new()
            .with_extensions(&self.resolution.extensions)
            .with_index_file(self.resolution.index_file.as_str());
        if self.resolution.external == ExternalPolicy::Vendor {
            resolver = resolver.with_vendor_dir(project_dir.join(&self.resolution.vendor_dir));
        }

        let mut builder = GraphBuilder::new()?
            .with_import_forms(self.resolution.import_forms)?
            .with_resolver(resolver)
            .with_ignore(self.ignore_matcher()?.with_base(absolutize(project_dir)?))
            .with_cycle_policy(self.graph.cycle_policy)
            .with_out_dir(project_dir.join(&self.out_dir))
            .with_artifact_extension(self.artifact_extension.as_str());
        if let Some(root) = &self.source_root {
            builder = builder.with_source_root(project_dir.join(root));
        }
        Ok(builder)
    }

    pub fn traversal_options(&self) -> TraversalOptions {
        TraversalOptions {
            concurrency: self.traversal.concurrency,
            show_progress: self.traversal.show_progress,
            skip_existing: self.traversal.skip_existing,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;
    use test_case::test_case;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn missing_project_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        assert!(load_file(&dir.path().join(CONFIG_FILE_NAME)).is_err());

        let mut cfg = DocGraphConfig::default();
        apply_env_overrides(&mut cfg, env(&[])).unwrap();
        assert_eq!(cfg, DocGraphConfig::default());
    }

    #[test]
    fn project_file_is_picked_up() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join(CONFIG_FILE_NAME),
            "out_dir: site\nignore: [\"**/*.spec.ts\"]\n",
        )
        .unwrap();
        let cfg = load_file(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(cfg.out_dir, PathBuf::from("site"));
        assert_eq!(cfg.ignore, ["**/*.spec.ts"]);
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let result = load_config(Some(&dir.path().join("nope.yaml")), dir.path());
        assert!(matches!(result, Err(DocGraphError::Io(_))));
    }

    #[test]
    fn malformed_file_is_a_yaml_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "traversal: [").unwrap();
        assert!(matches!(load_file(&path), Err(DocGraphError::Yaml(_))));
    }

    #[test]
    fn env_overrides_replace_and_append() {
        let mut cfg = DocGraphConfig {
            ignore: vec!["dist".into()],
            ..Default::default()
        };
        apply_env_overrides(
            &mut cfg,
            env(&[
                (ENV_ENTRY, "src/main.ts"),
                (ENV_OUT_DIR, "out"),
                (ENV_IGNORE, "node_modules, **/*.test.ts,,"),
                (ENV_CONCURRENCY, "8"),
            ]),
        )
        .unwrap();
        assert_eq!(cfg.entry, Some(PathBuf::from("src/main.ts")));
        assert_eq!(cfg.out_dir, PathBuf::from("out"));
        assert_eq!(cfg.ignore, ["dist", "node_modules", "**/*.test.ts"]);
        assert_eq!(cfg.traversal.concurrency, Some(8));
    }

    #[test_case("abc" ; "not a number")]
    #[test_case("-1" ; "negative")]
    fn bad_env_concurrency_is_config_error(raw: &str) {
        let mut cfg = DocGraphConfig::default();
        let result = apply_env_overrides(&mut cfg, env(&[(ENV_CONCURRENCY, raw)]));
        assert!(matches!(result, Err(DocGraphError::Config(_))));
    }

    #[test]
    fn zero_concurrency_fails_validation() {
        let mut cfg = DocGraphConfig::default();
        cfg.traversal.concurrency = Some(0);
        assert!(matches!(cfg.validate(), Err(DocGraphError::Config(_))));
    }

    #[test]
    fn empty_extensions_fail_validation() {
        let mut cfg = DocGraphConfig::default();
        cfg.resolution.extensions.clear();
        assert!(matches!(cfg.validate(), Err(DocGraphError::Config(_))));
    }

    #[test]
    fn defaults_validate() {
        assert!(DocGraphConfig::default().validate().is_ok());
    }

    #[test]
    fn bad_ignore_regex_surfaces_as_pattern_error() {
        let cfg = DocGraphConfig {
            ignore: vec!["re:(unclosed".into()],
            ..Default::default()
        };
        assert!(matches!(
            cfg.graph_builder(Path::new("/proj")),
            Err(DocGraphError::Pattern(_))
        ));
    }

    #[test]
    fn traversal_options_mirror_config() {
        let mut cfg = DocGraphConfig::default();
        cfg.traversal.concurrency = Some(3);
        cfg.traversal.skip_existing = true;
        let opts = cfg.traversal_options();
        assert_eq!(opts.concurrency, Some(3));
        assert!(opts.skip_existing);
        assert!(!opts.show_progress);
    }
}
