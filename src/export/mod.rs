//! Read-only renders of a dependency graph (and of a plain directory) for
//! inspection: indented tree, Mermaid diagram, JSON, level listing.

pub mod directory;
pub mod json;
pub mod levels;
pub mod mermaid;
pub mod tree;

pub use directory::render_directory;
pub use json::{render_json, GraphJson};
pub use levels::render_levels;
pub use mermaid::{render_mermaid, sanitize_id};
pub use tree::{render_progress, render_tree};

use console::Style;

/// Output formats for the `graph` command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum ExportFormat {
    #[default]
    Tree,
    Mermaid,
    Json,
}

/// Apply `style` when `color` is set. Styling is forced so the caller, not
/// the terminal probe, decides.
pub(crate) fn paint(text: &str, style: &Style, color: bool) -> String {
    if color {
        style.clone().force_styling(true).apply_to(text).to_string()
    } else {
        text.to_string()
    }
}
