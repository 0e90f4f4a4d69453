//! File categorization for the cleanup view.
//!
//! Pure mapping from a changed path to a category, using either the
//! built-in tables below or user-supplied per-category rules. Total over
//! arbitrary path strings; never fails.

use globset::Glob;
use serde::{Deserialize, Serialize};

use crate::config::schema::CategoryRule;

/// Category a changed file falls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Safe to commit without asking (source code, module manifests)
    Auto,
    /// Documentation; worth asking before committing
    Docs,
    /// Build output and binaries; belongs in the ignore file
    Ignore,
    /// Everything the tables do not recognize
    Other,
}

impl Category {
    /// Short label shown next to cleanup items.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Auto => "auto",
            Category::Docs => "docs",
            Category::Ignore => "ignore",
            Category::Other => "other",
        }
    }
}

/// Source and manifest extensions committed without asking.
const AUTO_EXTENSIONS: &[&str] = &[
    "go", "rs", "py", "js", "ts", "jsx", "tsx", "c", "h", "cc", "cpp", "hpp", "java", "rb", "sh",
    "swift", "kt", "zig", "mod", "sum",
];

/// Manifest filenames committed without asking.
const AUTO_FILENAMES: &[&str] = &["go.mod", "go.sum", "Cargo.toml", "package.json", "Makefile"];

/// Documentation extensions; surfaced but not auto-committed.
const DOCS_EXTENSIONS: &[&str] = &["md", "rst", "adoc"];

/// Known binary and image extensions that belong in the ignore file.
const IGNORE_EXTENSIONS: &[&str] = &[
    "png", "jpg", "jpeg", "gif", "ico", "bmp", "exe", "dll", "so", "dylib", "a", "o", "bin",
    "zip", "gz", "tgz", "tar", "class", "pyc",
];

/// Build output directories; any path inside one is ignorable.
const IGNORE_DIRS: &[&str] = &["target", "node_modules", "dist", "build", "out", "__pycache__"];

/// OS cruft files.
const IGNORE_FILENAMES: &[&str] = &[".DS_Store", "Thumbs.db"];

/// Lowercased extension of a path, if any.
fn extension(path: &str) -> Option<String> {
    let name = file_name(path);
    let (stem, ext) = name.rsplit_once('.')?;
    if stem.is_empty() {
        // Dotfiles like ".gitignore" have no extension.
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

/// Final path component.
fn file_name(path: &str) -> &str {
    path.rsplit(['/', '\\']).next().unwrap_or(path)
}

/// Whether any directory component of the path is a known build-output dir.
fn in_ignored_dir(path: &str) -> bool {
    path.split(['/', '\\'])
        .take_while(|c| !c.is_empty())
        .any(|component| IGNORE_DIRS.contains(&component))
}

/// Categorize a path with the built-in tables.
///
/// Precedence: explicit ignore list, then auto-commit extensions, then
/// docs extensions, with true unknowns falling to `Other`.
fn categorize_builtin(path: &str) -> Category {
    let name = file_name(path);
    let ext = extension(path);

    if IGNORE_FILENAMES.contains(&name) || in_ignored_dir(path) {
        return Category::Ignore;
    }
    if let Some(ref ext) = ext {
        if IGNORE_EXTENSIONS.contains(&ext.as_str()) {
            return Category::Ignore;
        }
    }

    if AUTO_FILENAMES.contains(&name) {
        return Category::Auto;
    }
    if let Some(ref ext) = ext {
        if AUTO_EXTENSIONS.contains(&ext.as_str()) {
            return Category::Auto;
        }
        if DOCS_EXTENSIONS.contains(&ext.as_str()) {
            return Category::Docs;
        }
    }

    Category::Other
}

/// Categorize a path with user-supplied rules.
///
/// Extension matches are tested across all rules before any glob pattern;
/// within each pass the first matching rule wins, in declaration order.
/// Invalid glob patterns are skipped so the function stays total.
fn categorize_custom(path: &str, rules: &[CategoryRule]) -> Category {
    let ext = extension(path);

    if let Some(ref ext) = ext {
        for rule in rules {
            if rule
                .extensions
                .iter()
                .any(|e| e.trim_start_matches('.').eq_ignore_ascii_case(ext))
            {
                return rule.category;
            }
        }
    }

    for rule in rules {
        for pattern in &rule.globs {
            if let Ok(glob) = Glob::new(pattern) {
                if glob.compile_matcher().is_match(path) {
                    return rule.category;
                }
            }
        }
    }

    Category::Other
}

/// Categorize a changed path.
///
/// Uses the custom rules when supplied, otherwise the built-in tables.
pub fn categorize(path: &str, rules: Option<&[CategoryRule]>) -> Category {
    match rules {
        Some(rules) => categorize_custom(path, rules),
        None => categorize_builtin(path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str, category: Category, extensions: &[&str], globs: &[&str]) -> CategoryRule {
        CategoryRule {
            name: name.to_string(),
            category,
            extensions: extensions.iter().map(|s| s.to_string()).collect(),
            globs: globs.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn test_builtin_source_is_auto() {
        assert_eq!(categorize("a.go", None), Category::Auto);
        assert_eq!(categorize("src/lib.rs", None), Category::Auto);
        assert_eq!(categorize("go.mod", None), Category::Auto);
        assert_eq!(categorize("Cargo.toml", None), Category::Auto);
    }

    #[test]
    fn test_builtin_docs() {
        assert_eq!(categorize("README.md", None), Category::Docs);
        assert_eq!(categorize("docs/guide.rst", None), Category::Docs);
    }

    #[test]
    fn test_builtin_ignorables() {
        assert_eq!(categorize("image.png", None), Category::Ignore);
        assert_eq!(categorize("bin/app.exe", None), Category::Ignore);
        assert_eq!(categorize("target/debug/app", None), Category::Ignore);
        assert_eq!(categorize("node_modules/x/index.js", None), Category::Ignore);
        assert_eq!(categorize(".DS_Store", None), Category::Ignore);
    }

    #[test]
    fn test_builtin_unknowns_are_other() {
        assert_eq!(categorize("notes.txt", None), Category::Other);
        assert_eq!(categorize("data.csv", None), Category::Other);
        assert_eq!(categorize("no_extension", None), Category::Other);
        assert_eq!(categorize(".gitignore", None), Category::Other);
    }

    #[test]
    fn test_ignore_dir_beats_auto_extension() {
        // Source file inside build output stays ignorable.
        assert_eq!(categorize("dist/bundle.js", None), Category::Ignore);
    }

    #[test]
    fn test_totality_on_weird_paths() {
        for path in ["", ".", "..", "///", "a/../../b", "\u{0}", "ends.with.dot."] {
            let c = categorize(path, None);
            assert!(matches!(
                c,
                Category::Auto | Category::Docs | Category::Ignore | Category::Other
            ));
        }
    }

    #[test]
    fn test_custom_extension_beats_glob() {
        // Extension says A, a glob in an earlier rule says B; extension wins.
        let rules = vec![
            rule("build", Category::Ignore, &[], &["gen/**"]),
            rule("code", Category::Auto, &["x"], &[]),
        ];
        assert_eq!(categorize("gen/thing.x", Some(&rules)), Category::Auto);
    }

    #[test]
    fn test_custom_glob_match() {
        let rules = vec![rule("build", Category::Ignore, &[], &["gen/**"])];
        assert_eq!(categorize("gen/out.dat", Some(&rules)), Category::Ignore);
    }

    #[test]
    fn test_custom_first_rule_wins_in_order() {
        let rules = vec![
            rule("first", Category::Docs, &["md"], &[]),
            rule("second", Category::Auto, &["md"], &[]),
        ];
        assert_eq!(categorize("README.md", Some(&rules)), Category::Docs);
    }

    #[test]
    fn test_custom_unmatched_is_other() {
        let rules = vec![rule("code", Category::Auto, &["go"], &[])];
        assert_eq!(categorize("README.md", Some(&rules)), Category::Other);
    }

    #[test]
    fn test_custom_invalid_glob_is_skipped() {
        let rules = vec![rule("broken", Category::Ignore, &[], &["[invalid"])];
        assert_eq!(categorize("whatever.xyz", Some(&rules)), Category::Other);
    }

    #[test]
    fn test_custom_extension_with_leading_dot() {
        let rules = vec![rule("code", Category::Auto, &[".go"], &[])];
        assert_eq!(categorize("a.go", Some(&rules)), Category::Auto);
    }
}
