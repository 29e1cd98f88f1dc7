//! Path utilities for treefix.
//!
//! This module consolidates all path-related logic for:
//! - Cross-platform path normalization
//! - Root containment checks before writing
//! - File discovery with directory pruning and optional gitignore support

use crate::constants::DEFAULT_EXCLUDE_FOLDERS;
use std::path::{Path, PathBuf};

/// Normalizes a path for CLI display.
///
/// - Converts backslashes to forward slashes (for cross-platform consistency)
/// - Strips leading "./" or ".\" prefix (for cleaner output)
///
/// # Examples
/// ```
/// use std::path::Path;
/// use treefix::utils::normalize_display_path;
///
/// assert_eq!(normalize_display_path(Path::new(".\\src\\App.js")), "src/App.js");
/// assert_eq!(normalize_display_path(Path::new("./src/index.js")), "src/index.js");
/// ```
#[must_use]
pub fn normalize_display_path(path: &Path) -> String {
    let s = path.to_string_lossy();
    // Strip Windows extended path prefix if present
    let clean = s.trim_start_matches(r"\\?\");
    let normalized = clean.replace('\\', "/");
    normalized
        .strip_prefix("./")
        .unwrap_or(&normalized)
        .to_owned()
}

/// Checks if a name matches any exclusion pattern.
/// Supports exact matching and wildcard patterns starting with `*.`.
#[must_use]
pub fn is_excluded(name: &str, excludes: &[String]) -> bool {
    for exclude in excludes {
        if exclude.starts_with("*.") {
            if name.ends_with(&exclude[1..]) {
                return true;
            }
        } else if name == exclude {
            return true;
        }
    }
    false
}

/// Checks if `path` has one of the allowed extensions.
///
/// Comparison ignores case and a leading dot in the allow-list (`js` and
/// `.js` are the same entry).
#[must_use]
pub fn has_allowed_extension(path: &Path, extensions: &[String]) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    extensions
        .iter()
        .any(|allowed| allowed.trim_start_matches('.').eq_ignore_ascii_case(ext))
}

/// Validates that a path is contained within an allowed root directory.
///
/// # Errors
///
/// Returns an error if the path or root cannot be canonicalized,
/// or if the path lies outside the root.
pub fn validate_path_within_root(path: &Path, root: &Path) -> anyhow::Result<PathBuf> {
    let canonical_path = path
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Failed to resolve path {}: {}", path.display(), e))?;
    let canonical_root = root
        .canonicalize()
        .map_err(|e| anyhow::anyhow!("Failed to resolve root {}: {}", root.display(), e))?;

    if canonical_path.starts_with(&canonical_root) {
        Ok(canonical_path)
    } else {
        anyhow::bail!(
            "Path traversal detected: {} is outside of {}",
            path.display(),
            root.display()
        )
    }
}

/// Traversal settings for [`collect_files`].
#[derive(Debug, Clone, Default)]
pub struct WalkOptions {
    /// Extension allow-list.
    pub extensions: Vec<String>,
    /// Directory names to prune, in addition to the defaults.
    pub exclude: Vec<String>,
    /// Directory names to keep even if excluded (by default or by `exclude`).
    pub include: Vec<String>,
    /// Honour `.gitignore`, `.ignore` and `.git/info/exclude`.
    pub respect_gitignore: bool,
}

impl WalkOptions {
    /// Effective deny-list: defaults plus user excludes, minus force-includes.
    #[must_use]
    pub fn effective_excludes(&self) -> Vec<String> {
        let mut defaults: Vec<String> = DEFAULT_EXCLUDE_FOLDERS()
            .iter()
            .map(|&s| s.to_owned())
            .collect();
        defaults.sort_unstable();

        let mut all: Vec<String> = self.exclude.iter().cloned().chain(defaults).collect();
        all.retain(|ex| !self.include.iter().any(|inc| ex == inc));
        all.dedup();
        all
    }
}

/// Files selected for a run.
#[derive(Debug, Clone, Default)]
pub struct FileSet {
    /// Matching files, sorted by path.
    pub files: Vec<PathBuf>,
    /// Number of directories visited below the root.
    pub directories: usize,
    /// Entries the walker could not read (e.g. permission denied).
    pub walk_errors: Vec<String>,
}

impl FileSet {
    /// Number of matching files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// True when no file matched
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Collects files under `root` whose extension is allowed.
///
/// Uses the `ignore` crate's walker. Excluded directories are pruned in
/// `filter_entry`, so nothing below them is ever opened. Symlinks are not
/// followed and only regular files are returned.
#[must_use]
pub fn collect_files(root: &Path, options: &WalkOptions) -> FileSet {
    use ignore::WalkBuilder;

    let excludes_for_filter = options.effective_excludes();
    let root_for_filter = root.to_path_buf();
    let respect = options.respect_gitignore;

    let walker = WalkBuilder::new(root)
        .hidden(false) // Hidden files are fair game; `.git` is pruned via the deny-list
        .ignore(respect)
        .git_ignore(respect)
        .git_global(respect)
        .git_exclude(respect)
        .parents(respect)
        .require_git(false)
        .follow_links(false)
        .sort_by_file_name(std::cmp::Ord::cmp)
        .filter_entry(move |entry| {
            // Always allow the root directory
            if entry.path() == root_for_filter {
                return true;
            }

            // Only filter directories - files are checked by extension below
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return true;
            }

            if let Some(name) = entry.file_name().to_str() {
                if is_excluded(name, &excludes_for_filter) {
                    return false;
                }
            }

            true
        })
        .build();

    let mut set = FileSet::default();

    for result in walker {
        match result {
            Ok(entry) => {
                let path = entry.path();
                let Some(file_type) = entry.file_type() else {
                    continue;
                };

                if file_type.is_dir() {
                    if path != root {
                        set.directories += 1;
                    }
                    continue;
                }

                if file_type.is_file() && has_allowed_extension(path, &options.extensions) {
                    set.files.push(path.to_path_buf());
                }
            }
            Err(e) => set.walk_errors.push(e.to_string()),
        }
    }

    set.files.sort();
    set
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn js_options() -> WalkOptions {
        WalkOptions {
            extensions: vec!["js".to_owned(), ".JSX".to_owned()],
            ..WalkOptions::default()
        }
    }

    #[test]
    fn test_validate_path_within_root() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        let inside = root.join("src/App.js");
        fs::create_dir_all(
            inside
                .parent()
                .ok_or_else(|| anyhow::anyhow!("No parent"))?,
        )?;
        fs::write(&inside, "// test")?;

        assert!(validate_path_within_root(&inside, root).is_ok());

        let outside = root.join("../outside.js");
        assert!(validate_path_within_root(&outside, root).is_err());

        let traversal = root.join("src/../../etc/passwd");
        assert!(validate_path_within_root(&traversal, root).is_err());

        Ok(())
    }

    #[test]
    fn test_has_allowed_extension() {
        let exts = vec!["js".to_owned(), ".tsx".to_owned()];
        assert!(has_allowed_extension(Path::new("a/b.js"), &exts));
        assert!(has_allowed_extension(Path::new("a/B.JS"), &exts));
        assert!(has_allowed_extension(Path::new("c.tsx"), &exts));
        assert!(!has_allowed_extension(Path::new("c.ts"), &exts));
        assert!(!has_allowed_extension(Path::new("Makefile"), &exts));
    }

    #[test]
    fn test_is_excluded_wildcard() {
        let excludes = vec!["*.egg-info".to_owned(), "build".to_owned()];
        assert!(is_excluded("pkg.egg-info", &excludes));
        assert!(is_excluded("build", &excludes));
        assert!(!is_excluded("builder", &excludes));
    }

    #[test]
    fn test_collect_files_exclusion() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        fs::write(root.join("index.js"), "// index")?;
        fs::write(root.join("App.jsx"), "// app")?;
        fs::write(root.join("README.md"), "# readme")?;

        fs::create_dir_all(root.join("node_modules/react"))?;
        fs::write(root.join("node_modules/react/index.js"), "// dep")?;

        fs::create_dir_all(root.join("build"))?;
        fs::write(root.join("build/bundle.js"), "// out")?;

        fs::create_dir_all(root.join(".git"))?;
        fs::write(root.join(".git/hook.js"), "// vcs")?;

        fs::create_dir_all(root.join("src/components"))?;
        fs::write(root.join("src/components/Login.js"), "// login")?;

        let set = collect_files(root, &js_options());

        let names: Vec<_> = set
            .files
            .iter()
            .filter_map(|p| p.file_name())
            .filter_map(|f| f.to_str())
            .collect();

        assert_eq!(set.len(), 3);
        assert!(names.contains(&"index.js"));
        assert!(names.contains(&"App.jsx"));
        assert!(names.contains(&"Login.js"));
        assert!(!names.contains(&"bundle.js"));
        assert!(!names.contains(&"hook.js"));
        assert_eq!(set.directories, 2);

        Ok(())
    }

    #[test]
    fn test_collect_files_user_exclude_and_force_include() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();

        fs::create_dir_all(root.join("legacy"))?;
        fs::write(root.join("legacy/old.js"), "")?;
        fs::create_dir_all(root.join("build"))?;
        fs::write(root.join("build/keep.js"), "")?;

        let options = WalkOptions {
            exclude: vec!["legacy".to_owned()],
            include: vec!["build".to_owned()],
            ..js_options()
        };
        let set = collect_files(root, &options);

        assert_eq!(set.len(), 1);
        assert!(set.files[0].ends_with("build/keep.js"));

        Ok(())
    }

    #[test]
    fn test_collect_files_sorted() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        for name in ["c.js", "a.js", "b.js"] {
            fs::write(root.join(name), "")?;
        }

        let set = collect_files(root, &js_options());
        let names: Vec<_> = set
            .files
            .iter()
            .filter_map(|p| p.file_name())
            .filter_map(|f| f.to_str())
            .collect();
        assert_eq!(names, vec!["a.js", "b.js", "c.js"]);

        Ok(())
    }

    #[test]
    fn test_collect_files_gitignore_opt_in() -> anyhow::Result<()> {
        let temp = tempdir()?;
        let root = temp.path();
        fs::write(root.join(".gitignore"), "generated.js\n")?;
        fs::write(root.join("generated.js"), "")?;
        fs::write(root.join("main.js"), "")?;

        assert_eq!(collect_files(root, &js_options()).len(), 2);

        let options = WalkOptions {
            respect_gitignore: true,
            ..js_options()
        };
        let set = collect_files(root, &options);
        assert_eq!(set.len(), 1);
        assert!(set.files[0].ends_with("main.js"));

        Ok(())
    }

    #[test]
    fn test_effective_excludes() {
        let options = WalkOptions {
            exclude: vec!["vendor".to_owned()],
            include: vec!["dist".to_owned()],
            ..WalkOptions::default()
        };
        let excludes = options.effective_excludes();
        assert!(excludes.contains(&"vendor".to_owned()));
        assert!(excludes.contains(&"node_modules".to_owned()));
        assert!(!excludes.contains(&"dist".to_owned()));
    }
}
