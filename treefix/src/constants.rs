use rustc_hash::FxHashSet;
use std::sync::OnceLock;

/// Name of the project configuration file, discovered from the root upward.
pub const CONFIG_FILENAME: &str = ".treefix.toml";

/// Line-comment marker recognised by the comment stripper.
pub const LINE_COMMENT_MARKER: &str = "//";

/// Opening delimiter of a block comment.
pub const BLOCK_COMMENT_OPEN: &str = "/*";

/// Closing delimiter of a block comment.
pub const BLOCK_COMMENT_CLOSE: &str = "*/";

/// Name reported for the comment-stripping transform.
pub const STRIP_COMMENTS_NAME: &str = "strip-comments";

/// File extensions rewritten by default (without the leading dot).
pub fn get_default_extensions() -> &'static [&'static str] {
    &["js", "jsx", "ts", "tsx"]
}

/// URL schemes whose `scheme://` prefix is never mistaken for a line comment.
pub fn get_default_url_schemes() -> &'static [&'static str] {
    &["http", "https", "ws", "wss", "ftp", "file"]
}

/// Set of folders to exclude by default.
///
/// Dependency caches, build output and version-control metadata.
pub fn get_default_exclude_folders() -> &'static FxHashSet<&'static str> {
    static SET: OnceLock<FxHashSet<&'static str>> = OnceLock::new();
    SET.get_or_init(|| {
        let mut s = FxHashSet::default();
        s.insert("node_modules");
        s.insert("build");
        s.insert("dist");
        s.insert(".git");
        s
    })
}

/// Built-in rule presets, as `(name, find, replace)`.
///
/// Every preset must be a no-op on text it already repaired.
pub fn get_rule_presets() -> &'static [(&'static str, &'static str, &'static str)] {
    &[(
        "scheme-slashes",
        r#"(['"`])(https?|wss?|ftp):(?!//)"#,
        "${1}${2}://",
    )]
}

// Short aliases used across the crate
pub use get_default_exclude_folders as DEFAULT_EXCLUDE_FOLDERS;
pub use get_default_extensions as DEFAULT_EXTENSIONS;
pub use get_default_url_schemes as DEFAULT_URL_SCHEMES;
pub use get_rule_presets as RULE_PRESETS;
