//! Graph layer: node registry, graph construction, level scheduling and the
//! bottom-up traversal engine.

pub mod builder;
pub mod levels;
pub mod store;
pub mod traversal;

pub use builder::{CyclePolicy, GraphBuilder, DEFAULT_OUT_DIR};
pub use levels::LevelMap;
pub use store::{ArtifactLayout, DependencyGraph, NodeRegistry};
pub use traversal::{
    traverse, NodeContext, NodeFailure, TraversalEngine, TraversalOptions, TraversalReport,
};
