//! docgraph: source import graphs processed bottom-up.
//!
//! Builds a deduplicated dependency graph by following static imports from an
//! entry file, then drives a level-synchronized traversal from the deepest
//! files up to the entry, invoking a generation step once per file.
//!
//! ```no_run
//! # async fn demo() -> docgraph::error::Result<()> {
//! use docgraph::graph::{traverse, GraphBuilder};
//!
//! let mut graph = GraphBuilder::new()?.build("src/index.ts".as_ref()).await?;
//! let report = traverse(&mut graph, |node| async move {
//!     println!("{} (level {})", node.name, node.level);
//!     Ok::<(), std::io::Error>(())
//! })
//! .await;
//! assert!(report.is_success());
//! # Ok(())
//! # }
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod export;
pub mod generate;
pub mod graph;
pub mod observability;
pub mod resolution;
pub mod types;
