//! Bottom-up, level-synchronized traversal.
//!
//! Levels are processed from the deepest to the root. All pending nodes of a
//! level run through the callback concurrently, and the next level starts only
//! after every callback of the current one has settled.
//!
//! Per node the order is check-then-mark: `generated` is checked before
//! dispatch and set after the level's fan-in, only for callbacks that
//! succeeded. Each node sits on exactly one level, so no two callbacks ever
//! touch the same node and no locking is needed.
//!
//! Failures never propagate. A callback that returns an error or panics is
//! logged, recorded in the [`TraversalReport`], left ungenerated (so a later
//! traversal retries it), and does not stop its siblings or shallower levels.

use std::any::Any;
use std::fmt::Display;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;

use futures::stream::{self, StreamExt};
use futures::FutureExt;

use crate::export::tree::render_progress;
use crate::graph::levels::LevelMap;
use crate::graph::store::DependencyGraph;
use crate::types::NodeId;

// ---------------------------------------------------------------------------
// Callback input / options / report
// ---------------------------------------------------------------------------

/// Owned snapshot of a node handed to the per-node callback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeContext {
    pub id: NodeId,
    pub path: PathBuf,
    pub name: String,
    /// BFS level in this traversal run.
    pub level: usize,
    pub artifact_path: PathBuf,
    /// Source paths of the node's children.
    pub children: Vec<PathBuf>,
    /// Artifact paths of the node's children, already processed by the time
    /// this node runs unless a child failed or shares the level.
    pub child_artifacts: Vec<PathBuf>,
}

/// Traversal tuning knobs.
#[derive(Debug, Clone, Default)]
pub struct TraversalOptions {
    /// Maximum callbacks in flight within one level. `None` runs the whole
    /// level at once.
    pub concurrency: Option<usize>,
    /// Print the progress tree to stderr after each level settles.
    pub show_progress: bool,
    /// Treat nodes whose artifact already exists on disk as generated.
    pub skip_existing: bool,
}

/// A callback failure, kept for the caller's summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeFailure {
    pub path: PathBuf,
    pub level: usize,
    pub message: String,
}

/// Outcome of one traversal run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TraversalReport {
    /// Number of levels visited.
    pub levels: usize,
    /// Callbacks that succeeded.
    pub processed: usize,
    /// Nodes skipped because they were already generated.
    pub skipped: usize,
    pub failures: Vec<NodeFailure>,
}

impl TraversalReport {
    pub fn is_success(&self) -> bool {
        self.failures.is_empty()
    }

    /// Callbacks actually invoked in this run.
    pub fn attempted(&self) -> usize {
        self.processed + self.failures.len()
    }
}

// ---------------------------------------------------------------------------
// TraversalEngine
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TraversalEngine {
    options: TraversalOptions,
}

impl TraversalEngine {
    pub fn new(options: TraversalOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &TraversalOptions {
        &self.options
    }

    /// Run `callback` once for every not-yet-generated node, deepest level
    /// first.
    pub async fn traverse<F, Fut, E>(
        &self,
        graph: &mut DependencyGraph,
        callback: F,
    ) -> TraversalReport
    where
        F: Fn(NodeContext) -> Fut,
        Fut: Future<Output = Result<(), E>>,
        E: Display,
    {
        if self.options.skip_existing {
            let marked = graph.mark_existing_artifacts();
            tracing::debug!("{} nodes already have artifacts on disk", marked);
        }

        let levels = LevelMap::compute(graph);
        let mut report = TraversalReport {
            levels: levels.depth(),
            ..Default::default()
        };

        for (level, ids) in levels.bottom_up() {
            let mut batch = Vec::with_capacity(ids.len());
            for &id in ids {
                let node = &graph[id];
                if node.is_generated() {
                    tracing::debug!(
                        "Already generated: {} path: {}",
                        node.name(),
                        node.path().display()
                    );
                    report.skipped += 1;
                    continue;
                }
                batch.push(context_for(graph, id, level));
            }
            if batch.is_empty() {
                continue;
            }

            let limit = self.options.concurrency.unwrap_or(batch.len()).max(1);
            tracing::debug!("Processing level {} ({} nodes)", level, batch.len());

            let outcomes: Vec<(NodeId, PathBuf, Result<(), String>)> = stream::iter(batch)
                .map(|ctx| {
                    let id = ctx.id;
                    let path = ctx.path.clone();
                    let callback = &callback;
                    let run = AssertUnwindSafe(async move { callback(ctx).await }).catch_unwind();
                    async move {
                        let outcome = match run.await {
                            Ok(result) => result.map_err(|e| e.to_string()),
                            Err(payload) => Err(panic_message(payload.as_ref())),
                        };
                        (id, path, outcome)
                    }
                })
                .buffer_unordered(limit)
                .collect()
                .await;

            for (id, path, outcome) in outcomes {
                match outcome {
                    Ok(()) => {
                        if let Some(node) = graph.node_mut(id) {
                            node.set_generated(true);
                        }
                        report.processed += 1;
                    }
                    Err(message) => {
                        tracing::error!(
                            "Failed to process node {} at level {}: {}",
                            path.display(),
                            level,
                            message
                        );
                        report.failures.push(NodeFailure {
                            path,
                            level,
                            message,
                        });
                    }
                }
            }

            if self.options.show_progress {
                eprintln!(
                    "{}",
                    render_progress(graph, console::colors_enabled_stderr())
                );
            }
        }

        tracing::info!(
            "Traversal finished: {} processed, {} skipped, {} failed across {} levels",
            report.processed,
            report.skipped,
            report.failures.len(),
            report.levels
        );
        report
    }
}

/// Traverse with default options.
pub async fn traverse<F, Fut, E>(graph: &mut DependencyGraph, callback: F) -> TraversalReport
where
    F: Fn(NodeContext) -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    TraversalEngine::default().traverse(graph, callback).await
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown payload".to_string());
    format!("callback panicked: {detail}")
}

fn context_for(graph: &DependencyGraph, id: NodeId, level: usize) -> NodeContext {
    let node = &graph[id];
    let children: Vec<_> = graph.children(id).collect();
    NodeContext {
        id,
        path: node.path().to_path_buf(),
        name: node.name().to_string(),
        level,
        artifact_path: node.artifact_path().to_path_buf(),
        children: children.iter().map(|c| c.path().to_path_buf()).collect(),
        child_artifacts: children
            .iter()
            .map(|c| c.artifact_path().to_path_buf())
            .collect(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
