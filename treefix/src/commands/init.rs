use crate::constants::CONFIG_FILENAME;
use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::Path;

/// Default configuration written by `treefix init`.
///
/// Inside `replace`, `$` starts a capture reference; write `$$` for a literal
/// dollar sign.
pub const DEFAULT_CONFIG: &str = r#"
[treefix]
# File selection
extensions = ["js", "jsx", "ts", "tsx"]
exclude_folders = []       # Added to node_modules, build, dist, .git
include_folders = []       # Force-include these even if excluded by default
respect_gitignore = false  # Honour .gitignore files

# Comment stripping
strip_comments = true
block_comments = true      # Also remove /* ... */ and {/* ... */}
url_schemes = ["http", "https", "ws", "wss", "ftp", "file"]

# Safety
verify_idempotence = true  # Warn when a second pass would change a file again

# Find-and-replace rules. Presets run first, then [[treefix.rules]] in order.
presets = ["scheme-slashes"]

# [[treefix.rules]]
# name = "api-suffix"
# files = ["*.js"]                       # File-name globs; omit for every file
# find = "'http://localhost:5000(?![\\d/])"
# replace = "'http://localhost:5000/api"
# skip_if_contains = "/api"              # Optional guard
"#;

/// Executes the init command in the current directory.
///
/// # Errors
///
/// Returns an error if the current directory is unavailable or the file
/// cannot be written.
pub fn run_init<W: Write>(writer: &mut W) -> Result<()> {
    let current_dir = std::env::current_dir().context("Failed to get current directory")?;
    run_init_in(&current_dir, writer)
}

/// Executes the init command in a specific directory.
///
/// This is primarily used for testing.
///
/// # Errors
///
/// Returns an error if the configuration file cannot be written.
pub fn run_init_in<W: Write>(root: &Path, writer: &mut W) -> Result<()> {
    writeln!(writer, "Initializing treefix configuration...")?;

    let config_path = root.join(CONFIG_FILENAME);
    if config_path.exists() {
        writeln!(writer, "  • {CONFIG_FILENAME} already exists - skipping.")?;
    } else {
        let mut file = fs::File::create(&config_path)
            .with_context(|| format!("Failed to create {}", config_path.display()))?;
        writeln!(file, "{}", DEFAULT_CONFIG.trim())?;
        writeln!(
            writer,
            "  • Created {CONFIG_FILENAME} with default configuration."
        )?;
    }

    writeln!(writer, "Initialization complete!")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tempfile::TempDir;

    #[test]
    fn test_default_config_parses() {
        let config: Config = toml::from_str(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.treefix.presets, vec!["scheme-slashes"]);
        assert_eq!(config.treefix.strip_comments, Some(true));
        assert!(config.treefix.rules.is_empty());
    }

    #[test]
    fn test_init_creates_then_skips() {
        let dir = TempDir::new().unwrap();
        let mut buffer = Vec::new();
        run_init_in(dir.path(), &mut buffer).unwrap();
        assert!(dir.path().join(CONFIG_FILENAME).exists());

        std::fs::write(dir.path().join(CONFIG_FILENAME), "[treefix]\n").unwrap();
        let mut buffer = Vec::new();
        run_init_in(dir.path(), &mut buffer).unwrap();
        let out = String::from_utf8(buffer).unwrap();
        assert!(out.contains("already exists"));
        assert_eq!(
            std::fs::read_to_string(dir.path().join(CONFIG_FILENAME)).unwrap(),
            "[treefix]\n"
        );
    }
}
