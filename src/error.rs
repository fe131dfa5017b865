//! Error types for docgraph.
//!
//! Only setup-level failures surface as [`DocGraphError`]: bad configuration,
//! invalid ignore patterns, unwritable output. Per-file and per-node failures
//! during graph construction and traversal are logged and absorbed instead.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, DocGraphError>;

#[derive(Error, Debug)]
pub enum DocGraphError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Generator error: {0}")]
    Generator(String),

    #[error("{0}")]
    Other(String),
}
