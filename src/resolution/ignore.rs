//! Ignore predicate for resolved import paths.
//!
//! A list of patterns is compiled into at most two regular expressions, one
//! per pattern style:
//!
//! - glob-like: `node_modules`, `*.test.ts`, `src/legacy/**`, `**/__mocks__/*`.
//!   A glob matches a run of whole path components anywhere in the path
//!   below the matcher's base directory. Directories above the base never
//!   take part, so a project living under `/tmp` is not ignored by `tmp`.
//! - raw regex, prefixed with `re:`: `re:\.generated\.(ts|js)$`. Raw
//!   patterns see the full path.
//!
//! Paths outside the base are matched in full. An empty list matches nothing.

use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::Result;
use crate::types::slash_path;

/// Compiled ignore predicate.
#[derive(Debug, Clone, Default)]
pub struct IgnoreMatcher {
    globs: Option<Regex>,
    raw: Option<Regex>,
    base: Option<PathBuf>,
    patterns: Vec<String>,
}

impl IgnoreMatcher {
    /// A matcher that ignores nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Compile `patterns` into a single predicate. Blank entries and `#`
    /// comments are skipped.
    pub fn from_patterns<I, S>(patterns: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns: Vec<String> = patterns
            .into_iter()
            .map(|p| p.as_ref().trim().to_string())
            .filter(|p| !p.is_empty() && !p.starts_with('#'))
            .collect();

        if patterns.is_empty() {
            return Ok(Self::none());
        }

        let mut globs = Vec::new();
        let mut raw = Vec::new();
        for p in &patterns {
            match p.strip_prefix("re:") {
                Some(r) => raw.push(format!("(?:{r})")),
                None => globs.push(format!("(?:{})", glob_to_regex(p))),
            }
        }

        Ok(Self {
            globs: compile(&globs)?,
            raw: compile(&raw)?,
            base: None,
            patterns,
        })
    }

    /// Match globs against paths relative to `base`.
    pub fn with_base(mut self, base: impl Into<PathBuf>) -> Self {
        self.base = Some(base.into());
        self
    }

    /// The patterns this matcher was built from.
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn is_empty(&self) -> bool {
        self.globs.is_none() && self.raw.is_none()
    }

    /// Match `path` relative to the matcher's own base, if any.
    pub fn is_ignored(&self, path: &Path) -> bool {
        self.matches(path, self.base.as_deref())
    }

    /// Like [`is_ignored`](Self::is_ignored), using `base` when the matcher
    /// was built without one.
    pub fn is_ignored_under(&self, path: &Path, base: &Path) -> bool {
        self.matches(path, Some(self.base.as_deref().unwrap_or(base)))
    }

    fn matches(&self, path: &Path, base: Option<&Path>) -> bool {
        if let Some(raw) = &self.raw {
            if raw.is_match(&slash_path(path)) {
                return true;
            }
        }
        let Some(globs) = &self.globs else {
            return false;
        };
        let relative = base
            .and_then(|b| path.strip_prefix(b).ok())
            .unwrap_or(path);
        globs.is_match(&slash_path(relative))
    }
}

fn compile(alternatives: &[String]) -> Result<Option<Regex>> {
    if alternatives.is_empty() {
        return Ok(None);
    }
    Ok(Some(Regex::new(&alternatives.join("|"))?))
}

/// Translate a glob-like pattern into a component-aligned regex.
///
/// `**/` → any leading directories, `/**` → anything below, `**` → anything,
/// `*` → within one component, `?` → one character within a component.
fn glob_to_regex(glob: &str) -> String {
    let glob = glob.trim_start_matches("./").trim_start_matches('/');
    let glob = glob.trim_end_matches('/');
    let chars: Vec<char> = glob.chars().collect();
    let mut body = String::new();
    let mut i = 0;

    while i < chars.len() {
        match chars[i] {
            '*' if chars.get(i + 1) == Some(&'*') => {
                if chars.get(i + 2) == Some(&'/') {
                    body.push_str("(?:.*/)?");
                    i += 3;
                } else {
                    body.push_str(".*");
                    i += 2;
                }
            }
            '*' => {
                body.push_str("[^/]*");
                i += 1;
            }
            '?' => {
                body.push_str("[^/]");
                i += 1;
            }
            '/' if chars.get(i + 1) == Some(&'*')
                && chars.get(i + 2) == Some(&'*')
                && i + 3 == chars.len() =>
            {
                body.push_str("(?:/.*)?");
                i += 3;
            }
            c => {
                body.push_str(&regex::escape(&c.to_string()));
                i += 1;
            }
        }
    }

    format!("(?:^|/){body}(?:/|$)")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn matcher(patterns: &[&str]) -> IgnoreMatcher {
        IgnoreMatcher::from_patterns(patterns).unwrap()
    }

    #[test_case("node_modules", "/p/node_modules/react/index.js", true ; "component anywhere")]
    #[test_case("node_modules", "/p/my_node_modules/x.js", false ; "partial component")]
    #[test_case("*.test.ts", "/p/src/a.test.ts", true ; "basename glob")]
    #[test_case("*.test.ts", "/p/src/a.ts", false ; "basename glob miss")]
    #[test_case("src/legacy", "/p/src/legacy/old.ts", true ; "directory prefix")]
    #[test_case("src/legacy/**", "/p/src/legacy/deep/old.ts", true ; "trailing double star")]
    #[test_case("**/__mocks__/*", "/p/a/b/__mocks__/fs.ts", true ; "leading double star")]
    #[test_case("util?.ts", "/p/util1.ts", true ; "question mark")]
    #[test_case("util?.ts", "/p/util10.ts", false ; "question mark one char")]
    #[test_case("re:\\.generated\\.(ts|js)$", "/p/api.generated.ts", true ; "raw regex")]
    #[test_case("re:\\.generated\\.(ts|js)$", "/p/api.ts", false ; "raw regex miss")]
    fn matches_paths(pattern: &str, path: &str, ignored: bool) {
        assert_eq!(matcher(&[pattern]).is_ignored(Path::new(path)), ignored);
    }

    #[test]
    fn empty_list_ignores_nothing() {
        let m = matcher(&[]);
        assert!(m.is_empty());
        assert!(!m.is_ignored(Path::new("/anything/at/all.ts")));
    }

    #[test]
    fn blank_lines_and_comments_are_skipped() {
        let m = matcher(&["", "   ", "# vendored code"]);
        assert!(m.is_empty());
    }

    #[test]
    fn any_pattern_in_the_list_matches() {
        let m = matcher(&["dist", "*.spec.ts"]);
        assert_eq!(m.patterns().len(), 2);
        assert!(m.is_ignored(Path::new("/p/dist/bundle.js")));
        assert!(m.is_ignored(Path::new("/p/src/x.spec.ts")));
        assert!(!m.is_ignored(Path::new("/p/src/x.ts")));
    }

    #[test]
    fn regex_metacharacters_in_globs_are_literal() {
        let m = matcher(&["a+b.ts"]);
        assert!(m.is_ignored(Path::new("/p/a+b.ts")));
        assert!(!m.is_ignored(Path::new("/p/aab.ts")));
    }

    #[test]
    fn globs_ignore_directories_above_the_base() {
        let m = matcher(&["tmp", "src"]).with_base("/tmp/proj");
        assert!(!m.is_ignored(Path::new("/tmp/proj/a.ts")));
        assert!(m.is_ignored(Path::new("/tmp/proj/src/a.ts")));
        assert!(m.is_ignored(Path::new("/tmp/proj/lib/tmp/a.ts")));
    }

    #[test]
    fn fallback_base_applies_only_without_own_base() {
        let m = matcher(&["build"]);
        let path = Path::new("/home/build/app/index.ts");
        assert!(m.is_ignored(path));
        assert!(!m.is_ignored_under(path, Path::new("/home/build/app")));

        let pinned = m.with_base("/home");
        assert!(pinned.is_ignored_under(path, Path::new("/home/build/app")));
    }

    #[test]
    fn paths_outside_the_base_match_in_full() {
        let m = matcher(&["shared"]).with_base("/work/app");
        assert!(m.is_ignored(Path::new("/work/shared/util.ts")));
    }

    #[test]
    fn raw_patterns_see_the_full_path() {
        let m = matcher(&["re:^/work/"]).with_base("/work/app");
        assert!(m.is_ignored(Path::new("/work/app/a.ts")));
    }

    #[test]
    fn invalid_raw_regex_is_an_error() {
        assert!(IgnoreMatcher::from_patterns(["re:("]).is_err());
    }
}
