//! Resolution layer: import extraction, path resolution and ignore filtering.

pub mod extractor;
pub mod ignore;
pub mod resolver;

pub use extractor::{ImportExtractor, ImportForms};
pub use ignore::IgnoreMatcher;
pub use resolver::{ExternalPolicy, PathResolver};
