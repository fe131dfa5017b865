//! Per-node generation steps plugged into the traversal.
//!
//! Producing the artifact is outside docgraph. A [`Generator`] is the seam:
//! it receives a [`NodeContext`] and reports success or failure. The
//! traversal decides what to do with the outcome.

use std::process::Stdio;

use futures::future::BoxFuture;
use futures::FutureExt;
use tokio::process::Command;

use crate::error::{DocGraphError, Result};
use crate::graph::traversal::NodeContext;

pub const ENV_SOURCE: &str = "DOCGRAPH_SOURCE";
pub const ENV_ARTIFACT: &str = "DOCGRAPH_ARTIFACT";
pub const ENV_NAME: &str = "DOCGRAPH_NAME";
pub const ENV_LEVEL: &str = "DOCGRAPH_LEVEL";
pub const ENV_CHILD_ARTIFACTS: &str = "DOCGRAPH_CHILD_ARTIFACTS";

/// One generation step per node.
pub trait Generator: Send + Sync {
    fn generate(&self, node: NodeContext) -> BoxFuture<'_, Result<()>>;
}

// ---------------------------------------------------------------------------
// DryRunGenerator
// ---------------------------------------------------------------------------

/// Logs what would be generated and always succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct DryRunGenerator;

impl Generator for DryRunGenerator {
    fn generate(&self, node: NodeContext) -> BoxFuture<'_, Result<()>> {
        async move {
            tracing::info!(
                "generating for {} path: {}",
                node.name,
                node.path.display()
            );
            Ok(())
        }
        .boxed()
    }
}

// ---------------------------------------------------------------------------
// CommandGenerator
// ---------------------------------------------------------------------------

/// Runs an external program once per node.
///
/// The node is described through `DOCGRAPH_*` environment variables; the
/// program is expected to write the artifact itself. A non-zero exit status
/// fails the node.
#[derive(Debug, Clone)]
pub struct CommandGenerator {
    program: String,
    args: Vec<String>,
}

impl CommandGenerator {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Build from a `PROGRAM ARGS…` list. Returns `None` when empty.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.as_str()).with_args(args.iter().cloned()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    async fn run(&self, node: NodeContext) -> Result<()> {
        if let Some(parent) = node.artifact_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let children = std::env::join_paths(&node.child_artifacts).map_err(|e| {
            DocGraphError::Generator(format!("invalid child artifact path: {e}"))
        })?;

        let output = Command::new(&self.program)
            .args(&self.args)
            .env(ENV_SOURCE, &node.path)
            .env(ENV_ARTIFACT, &node.artifact_path)
            .env(ENV_NAME, &node.name)
            .env(ENV_LEVEL, node.level.to_string())
            .env(ENV_CHILD_ARTIFACTS, children)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| {
                DocGraphError::Generator(format!("failed to spawn {}: {e}", self.program))
            })?;

        if output.status.success() {
            tracing::debug!("{} finished for {}", self.program, node.path.display());
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(DocGraphError::Generator(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )))
        }
    }
}

impl Generator for CommandGenerator {
    fn generate(&self, node: NodeContext) -> BoxFuture<'_, Result<()>> {
        self.run(node).boxed()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
