//! Utilities module for treefix.
//!
//! Path handling and file discovery live in [`paths`]; they are re-exported
//! here so callers can write `treefix::utils::collect_files`.

mod paths;

pub use paths::{
    collect_files, has_allowed_extension, is_excluded, normalize_display_path,
    validate_path_within_root, FileSet, WalkOptions,
};

/// Lower-cases extensions and strips a leading dot, dropping empty entries
/// and duplicates while keeping the first-seen order.
#[must_use]
pub fn normalize_extensions<S: AsRef<str>>(extensions: &[S]) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(extensions.len());
    for ext in extensions {
        let ext = ext.as_ref().trim().trim_start_matches('.').to_ascii_lowercase();
        if !ext.is_empty() && !out.contains(&ext) {
            out.push(ext);
        }
    }
    out
}
