//! `├──` / `└──` connector tree of a directory on disk.

use std::fmt::Write;
use std::path::Path;

use console::Style;
use walkdir::WalkDir;

use crate::error::Result;
use crate::export::paint;
use crate::resolution::IgnoreMatcher;
use crate::types::file_name;

struct Entry {
    depth: usize,
    name: String,
    is_dir: bool,
}

/// Render `root` and everything below it, siblings sorted by name. Entries
/// matching `ignore` are skipped together with their contents. Globs are
/// matched relative to `root` unless the matcher carries its own base.
pub fn render_directory(root: &Path, ignore: &IgnoreMatcher, color: bool) -> Result<String> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| !ignore.is_ignored_under(e.path(), root))
    {
        let entry = entry.map_err(std::io::Error::from)?;
        entries.push(Entry {
            depth: entry.depth(),
            name: entry.file_name().to_string_lossy().into_owned(),
            is_dir: entry.file_type().is_dir(),
        });
    }

    // Backward pass: an entry is last when no sibling follows it.
    let mut is_last = vec![false; entries.len()];
    let mut sibling_after: Vec<bool> = Vec::new();
    for (i, e) in entries.iter().enumerate().rev() {
        if sibling_after.len() <= e.depth {
            sibling_after.resize(e.depth + 1, false);
        }
        is_last[i] = !sibling_after[e.depth];
        sibling_after[e.depth] = true;
        sibling_after.truncate(e.depth + 1);
    }

    let dir_style = Style::new().blue().bold();
    let root_name = if root.file_name().is_some() {
        file_name(root)
    } else {
        root.display().to_string()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", paint(&root_name, &dir_style, color));

    // last_at[d] tells whether the open ancestor at depth d was the last of
    // its siblings, which decides between `│   ` and blank padding.
    let mut last_at: Vec<bool> = Vec::new();
    for (e, &last) in entries.iter().zip(&is_last) {
        let mut prefix = String::new();
        for d in 1..e.depth {
            prefix.push_str(if last_at.get(d).copied().unwrap_or(false) {
                "    "
            } else {
                "│   "
            });
        }
        let connector = if last { "└── " } else { "├── " };
        let name = if e.is_dir {
            paint(&e.name, &dir_style, color)
        } else {
            e.name.clone()
        };
        let _ = writeln!(out, "{}{}{}", prefix, connector, name);

        if last_at.len() <= e.depth {
            last_at.resize(e.depth + 1, false);
        }
        last_at[e.depth] = last;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn fixture() -> TempDir {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src/utils")).unwrap();
        std::fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
        std::fs::write(root.join("src/index.ts"), "").unwrap();
        std::fs::write(root.join("src/utils/strings.ts"), "").unwrap();
        std::fs::write(root.join("package.json"), "{}").unwrap();
        std::fs::write(root.join("node_modules/pkg/index.js"), "").unwrap();
        dir
    }

    #[test]
    fn renders_sorted_connector_tree() {
        let dir = fixture();
        let ignore = IgnoreMatcher::from_patterns(["node_modules"]).unwrap();
        let out = render_directory(dir.path(), &ignore, false).unwrap();

        let body: Vec<&str> = out.lines().skip(1).collect();
        assert_eq!(
            body,
            [
                "├── package.json",
                "└── src",
                "    ├── index.ts",
                "    └── utils",
                "        └── strings.ts",
            ]
        );
    }

    #[test]
    fn continuation_bars_for_non_last_directories() {
        let dir = fixture();
        let out = render_directory(dir.path(), &IgnoreMatcher::none(), false).unwrap();
        let body: Vec<&str> = out.lines().skip(1).collect();
        assert_eq!(
            body,
            [
                "├── node_modules",
                "│   └── pkg",
                "│       └── index.js",
                "├── package.json",
                "└── src",
                "    ├── index.ts",
                "    └── utils",
                "        └── strings.ts",
            ]
        );
    }

    #[test]
    fn root_under_an_ignored_name_is_still_listed() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("dist").join("site");
        std::fs::create_dir_all(root.join("dist")).unwrap();
        std::fs::write(root.join("index.html"), "").unwrap();
        std::fs::write(root.join("dist/bundle.js"), "").unwrap();

        let ignore = IgnoreMatcher::from_patterns(["dist"]).unwrap();
        let out = render_directory(&root, &ignore, false).unwrap();
        let body: Vec<&str> = out.lines().collect();
        assert_eq!(body, ["site", "└── index.html"]);
    }

    #[test]
    fn missing_directory_is_an_error() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope");
        assert!(render_directory(&missing, &IgnoreMatcher::none(), false).is_err());
    }
}
