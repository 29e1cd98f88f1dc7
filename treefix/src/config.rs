use anyhow::Context;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::constants::CONFIG_FILENAME;
use crate::transform::RuleSpec;

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
/// Top-level configuration struct.
pub struct Config {
    #[serde(default)]
    /// The `[treefix]` table.
    pub treefix: TreefixConfig,
    /// The path to the configuration file this was loaded from.
    /// Set during `load_from_path`, `None` if using defaults or programmatic config.
    #[serde(skip)]
    pub config_file_path: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
/// Configuration options for treefix.
///
/// Unset options fall back to the built-in defaults; command-line flags
/// override whatever is set here.
pub struct TreefixConfig {
    /// Extension allow-list (with or without the leading dot).
    pub extensions: Option<Vec<String>>,
    /// List of folders to exclude.
    pub exclude_folders: Option<Vec<String>>,
    /// List of folders to include even if excluded by default.
    pub include_folders: Option<Vec<String>>,
    /// Whether to strip `//` comments.
    pub strip_comments: Option<bool>,
    /// Whether to strip `/* ... */` comments too.
    pub block_comments: Option<bool>,
    /// URL schemes whose `scheme://` is not a comment.
    pub url_schemes: Option<Vec<String>>,
    /// Whether to honour `.gitignore` files.
    pub respect_gitignore: Option<bool>,
    /// Whether to re-run the pipeline on its output and warn if it changes again.
    pub verify_idempotence: Option<bool>,
    /// Built-in rule presets to enable, by name.
    #[serde(default)]
    pub presets: Vec<String>,
    /// Find-and-replace rules, applied in order after the presets.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

/// A standalone rule table passed with `--rules`.
///
/// ```toml
/// presets = ["scheme-slashes"]
///
/// [[rules]]
/// name = "api-suffix"
/// find = "'http://localhost:5000(?![\\d/])"
/// replace = "'http://localhost:5000/api"
/// ```
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(deny_unknown_fields)]
pub struct RulesFile {
    /// Built-in presets to enable.
    #[serde(default)]
    pub presets: Vec<String>,
    /// Rules in application order.
    #[serde(default)]
    pub rules: Vec<RuleSpec>,
}

impl RulesFile {
    /// Reads a rule table from `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not a valid rule table.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read rules file {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid rules file {}", path.display()))
    }
}

impl Config {
    /// Loads configuration from the current directory upward.
    ///
    /// # Errors
    ///
    /// See [`Config::load_from_path`].
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from_path(Path::new("."))
    }

    /// Loads configuration starting from a specific path and traversing up.
    ///
    /// The first `.treefix.toml` found wins. No file means defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration file is found but cannot be read
    /// or parsed.
    pub fn load_from_path(path: &Path) -> anyhow::Result<Self> {
        let mut current = path.to_path_buf();
        if current.is_file() {
            current.pop();
        }
        // Relative roots like "." have no parents to walk without this
        if let Ok(absolute) = current.canonicalize() {
            current = absolute;
        }

        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.is_file() {
                return Self::load_file(&candidate);
            }

            if !current.pop() {
                break;
            }
        }

        Ok(Config::default())
    }

    /// Loads a specific configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_file(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Invalid config {}", path.display()))?;
        config.config_file_path = Some(path.to_path_buf());
        Ok(config)
    }
}
