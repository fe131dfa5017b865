//! Textual import extraction.
//!
//! Finds module specifiers in raw source text with a single combined regular
//! expression. This is deliberately not syntax aware: an `import` inside a
//! comment or string literal is reported like any other.
//!
//! Recognized forms ([`ImportForms::All`]):
//!
//! - `import x from './a'`, `import { a, b } from './a'`, `import * as a from './a'`
//! - `import './a'` (side-effect import)
//! - `export { a } from './a'`, `export * from './a'`
//! - `require('./a')`
//! - `import('./a')`
//!
//! [`ImportForms::Static`] keeps only the `import … from` form.

use std::collections::HashSet;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::Result;

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// `import <clause> from '<spec>'`. The clause may span lines (named lists)
/// but never crosses a quote or a semicolon.
const STATIC_IMPORT: &str = r#"\bimport\s+[\w*{}\s,$]+?\s+from\s*['"]([^'"\n]+)['"]"#;

/// `export <clause> from '<spec>'`.
const RE_EXPORT: &str = r#"\bexport\s+[\w*{}\s,$]+?\s+from\s*['"]([^'"\n]+)['"]"#;

/// `import '<spec>'`.
const SIDE_EFFECT_IMPORT: &str = r#"\bimport\s*['"]([^'"\n]+)['"]"#;

/// `require('<spec>')`.
const REQUIRE_CALL: &str = r#"\brequire\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#;

/// `import('<spec>')`.
const DYNAMIC_IMPORT: &str = r#"\bimport\s*\(\s*['"]([^'"\n]+)['"]\s*\)"#;

// ---------------------------------------------------------------------------
// ImportForms
// ---------------------------------------------------------------------------

/// Which import statement forms the extractor recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ImportForms {
    /// Only `import … from '<spec>'`.
    Static,
    /// Static, side-effect, re-export, `require()` and dynamic `import()`.
    #[default]
    All,
}

impl ImportForms {
    /// Parse from a loose string (case-insensitive).
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "static" => Some(Self::Static),
            "all" => Some(Self::All),
            _ => None,
        }
    }

    fn patterns(self) -> &'static [&'static str] {
        match self {
            Self::Static => &[STATIC_IMPORT],
            Self::All => &[
                STATIC_IMPORT,
                RE_EXPORT,
                DYNAMIC_IMPORT,
                SIDE_EFFECT_IMPORT,
                REQUIRE_CALL,
            ],
        }
    }
}

// ---------------------------------------------------------------------------
// ImportExtractor
// ---------------------------------------------------------------------------

/// Compiled import matcher.
#[derive(Debug, Clone)]
pub struct ImportExtractor {
    regex: Regex,
}

impl ImportExtractor {
    pub fn new(forms: ImportForms) -> Result<Self> {
        let combined = forms
            .patterns()
            .iter()
            .map(|p| format!("(?:{p})"))
            .collect::<Vec<_>>()
            .join("|");
        Ok(Self {
            regex: Regex::new(&combined)?,
        })
    }

    /// Specifiers referenced by `source`, in first-seen order, without
    /// duplicates.
    pub fn extract(&self, source: &str) -> Vec<String> {
        let mut seen = HashSet::new();
        let mut specifiers = Vec::new();

        for caps in self.regex.captures_iter(source) {
            // Exactly one alternative matched; take whichever group it filled.
            let Some(spec) = caps.iter().skip(1).flatten().next() else {
                continue;
            };
            let spec = spec.as_str().trim();
            if spec.is_empty() {
                continue;
            }
            if seen.insert(spec.to_string()) {
                specifiers.push(spec.to_string());
            }
        }

        specifiers
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
