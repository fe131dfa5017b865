//! Import specifier → file path resolution.
//!
//! Resolves relative specifiers (e.g., `./utils`, `../helpers/auth`) against
//! the importing file's directory, then probes a fixed candidate list on disk.
//!
//! # Strategy
//!
//! 1. Local specifiers (starting with `.` or `/`) are joined onto the
//!    importing file's directory and normalized.
//! 2. Bare specifiers (`react`, `@scope/pkg`) follow the [`ExternalPolicy`]:
//!    dropped, or rebased into a vendor directory such as `node_modules`.
//! 3. Candidates are tried in order: the literal path, the path with each
//!    extension appended, then `<path>/index<ext>` for each extension. The
//!    first existing regular file wins.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::types::normalize_path;

/// Extensions probed for extension-less specifiers, most likely first.
pub const DEFAULT_EXTENSIONS: &[&str] = &[
    ".ts",  // TypeScript
    ".tsx", // TypeScript JSX
    ".js",  // JavaScript
    ".jsx", // JavaScript JSX
    ".mjs", // ES Module JS
    ".cjs", // CommonJS
];

/// File stem probed for directory-style specifiers (`./utils` → `./utils/index.ts`).
pub const DEFAULT_INDEX_FILE: &str = "index";

/// Directory bare specifiers are rebased into under [`ExternalPolicy::Vendor`].
pub const DEFAULT_VENDOR_DIR: &str = "node_modules";

// ---------------------------------------------------------------------------
// ExternalPolicy
// ---------------------------------------------------------------------------

/// What to do with bare package specifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExternalPolicy {
    /// Never create nodes for packages.
    #[default]
    Ignore,
    /// Look the package up inside a fixed vendor directory. This is a
    /// simplification: no manifest `main` fields, no nested lookup.
    Vendor,
}

impl ExternalPolicy {
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "ignore" => Some(Self::Ignore),
            "vendor" | "node_modules" => Some(Self::Vendor),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// PathResolver
// ---------------------------------------------------------------------------

/// Resolves specifiers to existing files by candidate probing.
#[derive(Debug, Clone)]
pub struct PathResolver {
    extensions: Vec<String>,
    index_file: String,
    external: ExternalPolicy,
    vendor_dir: Option<PathBuf>,
}

impl Default for PathResolver {
    fn default() -> Self {
        Self {
            extensions: DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
            index_file: DEFAULT_INDEX_FILE.to_string(),
            external: ExternalPolicy::Ignore,
            vendor_dir: None,
        }
    }
}

impl PathResolver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the probed extensions. A missing leading dot is added.
    pub fn with_extensions<I, S>(mut self, extensions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.extensions = extensions
            .into_iter()
            .map(|e| {
                let e = e.as_ref().trim();
                if e.starts_with('.') {
                    e.to_string()
                } else {
                    format!(".{e}")
                }
            })
            .collect();
        self
    }

    pub fn with_index_file(mut self, index_file: impl Into<String>) -> Self {
        self.index_file = index_file.into();
        self
    }

    /// Rebase bare specifiers into `vendor_dir`.
    pub fn with_vendor_dir(mut self, vendor_dir: impl Into<PathBuf>) -> Self {
        self.external = ExternalPolicy::Vendor;
        self.vendor_dir = Some(normalize_path(&vendor_dir.into()));
        self
    }

    pub fn external_policy(&self) -> ExternalPolicy {
        self.external
    }

    pub fn extensions(&self) -> &[String] {
        &self.extensions
    }

    /// Check if a specifier refers to a local file rather than a package.
    pub fn is_local(specifier: &str) -> bool {
        specifier.starts_with('.') || specifier.starts_with('/')
    }

    /// Resolve `specifier` as written in `importing_file` to an existing file.
    ///
    /// Returns `None` for dropped packages and for specifiers with no existing
    /// candidate. Failures are only logged.
    pub fn resolve(&self, importing_file: &Path, specifier: &str) -> Option<PathBuf> {
        let base = if Self::is_local(specifier) {
            let dir = importing_file.parent().unwrap_or_else(|| Path::new("/"));
            normalize_path(&dir.join(specifier))
        } else {
            match (self.external, &self.vendor_dir) {
                (ExternalPolicy::Vendor, Some(vendor)) => normalize_path(&vendor.join(specifier)),
                _ => {
                    tracing::trace!("skipping package import '{}'", specifier);
                    return None;
                }
            }
        };

        let found = self.candidates(&base).into_iter().find(|c| c.is_file());
        if found.is_none() {
            tracing::debug!(
                "unresolved import '{}' from {}",
                specifier,
                importing_file.display()
            );
        }
        found
    }

    /// Probe list for a joined, normalized base path.
    ///
    /// Given `/src/utils`: `/src/utils`, `/src/utils.ts`, `/src/utils.tsx`, …,
    /// `/src/utils/index.ts`, `/src/utils/index.tsx`, …
    pub fn candidates(&self, base: &Path) -> Vec<PathBuf> {
        let mut out = Vec::with_capacity(1 + self.extensions.len() * 2);
        out.push(base.to_path_buf());
        for ext in &self.extensions {
            let mut with_ext = OsString::from(base.as_os_str());
            with_ext.push(ext);
            out.push(PathBuf::from(with_ext));
        }
        for ext in &self.extensions {
            out.push(base.join(format!("{}{}", self.index_file, ext)));
        }
        out
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
