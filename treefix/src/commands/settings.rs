//! Effective settings for a run: defaults, then config file, then flags.

use crate::config::{RulesFile, TreefixConfig};
use crate::constants::{DEFAULT_EXTENSIONS, DEFAULT_URL_SCHEMES};
use crate::transform::{CommentStripper, Pipeline, RuleSpec, RuleTable};
use crate::utils::{normalize_extensions, WalkOptions};
use anyhow::{Context, Result};

/// Fully resolved options shared by the `fix` and `rules` commands.
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct Settings {
    /// File selection.
    pub walk: WalkOptions,
    /// Run the comment stripper.
    pub strip_comments: bool,
    /// Let the stripper remove block comments too.
    pub block_comments: bool,
    /// Schemes whose `scheme://` is never a comment.
    pub url_schemes: Vec<String>,
    /// Warn about files a second pass would change.
    pub verify_idempotence: bool,
    /// Presets, by name, run before `rules`.
    pub presets: Vec<String>,
    /// Find-and-replace rules in order.
    pub rules: Vec<RuleSpec>,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&TreefixConfig::default())
    }
}

impl Settings {
    /// Built-in defaults overlaid with a `[treefix]` table.
    #[must_use]
    pub fn from_config(config: &TreefixConfig) -> Self {
        let extensions = config.extensions.clone().unwrap_or_else(|| {
            DEFAULT_EXTENSIONS()
                .iter()
                .map(|&s| s.to_owned())
                .collect()
        });
        let url_schemes = config.url_schemes.clone().unwrap_or_else(|| {
            DEFAULT_URL_SCHEMES()
                .iter()
                .map(|&s| s.to_owned())
                .collect()
        });

        Self {
            walk: WalkOptions {
                extensions: normalize_extensions(&extensions),
                exclude: config.exclude_folders.clone().unwrap_or_default(),
                include: config.include_folders.clone().unwrap_or_default(),
                respect_gitignore: config.respect_gitignore.unwrap_or(false),
            },
            strip_comments: config.strip_comments.unwrap_or(true),
            block_comments: config.block_comments.unwrap_or(true),
            url_schemes,
            verify_idempotence: config.verify_idempotence.unwrap_or(true),
            presets: config.presets.clone(),
            rules: config.rules.clone(),
        }
    }

    /// Append the presets and rules of a `--rules` file.
    #[must_use]
    pub fn with_rules_file(mut self, file: RulesFile) -> Self {
        for preset in file.presets {
            if !self.presets.contains(&preset) {
                self.presets.push(preset);
            }
        }
        self.rules.extend(file.rules);
        self
    }

    /// Replace the extension allow-list (ignored when `extensions` is empty).
    pub fn override_extensions(&mut self, extensions: &[String]) {
        if !extensions.is_empty() {
            self.walk.extensions = normalize_extensions(extensions);
        }
    }

    /// Add folders to the deny-list and to the force-include list.
    pub fn extend_folders(&mut self, exclude: &[String], include: &[String]) {
        self.walk.exclude.extend(exclude.iter().cloned());
        self.walk.include.extend(include.iter().cloned());
    }

    /// Compile presets and rules.
    ///
    /// # Errors
    ///
    /// Returns an error naming the first rule that does not compile.
    pub fn rule_table(&self) -> Result<RuleTable> {
        RuleTable::build(self.presets.as_slice(), self.rules.iter().cloned())
            .context("Invalid rule configuration")
    }

    /// The comment stripper, if stripping is enabled.
    ///
    /// # Errors
    ///
    /// Returns an error if the URL scheme list cannot be compiled.
    pub fn comment_stripper(&self) -> Result<Option<CommentStripper>> {
        if !self.strip_comments {
            return Ok(None);
        }
        CommentStripper::new(&self.url_schemes, self.block_comments)
            .map(Some)
            .context("Invalid url_schemes")
    }

    /// Rules (presets first) followed by the comment stripper.
    ///
    /// # Errors
    ///
    /// Returns an error if a rule or the scheme list is invalid.
    pub fn pipeline(&self) -> Result<Pipeline> {
        let mut pipeline = Pipeline::new();
        for rule in self.rule_table()? {
            pipeline.push(rule);
        }
        if let Some(stripper) = self.comment_stripper()? {
            pipeline.push(stripper);
        }
        Ok(pipeline)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.walk.extensions, vec!["js", "jsx", "ts", "tsx"]);
        assert!(settings.strip_comments);
        assert!(settings.block_comments);
        assert!(settings.verify_idempotence);
        assert!(!settings.walk.respect_gitignore);
        assert_eq!(settings.pipeline().unwrap().names(), vec!["strip-comments"]);
    }

    #[test]
    fn test_config_and_overrides() {
        let config = TreefixConfig {
            extensions: Some(vec![".JS".to_owned()]),
            exclude_folders: Some(vec!["coverage".to_owned()]),
            strip_comments: Some(false),
            presets: vec!["scheme-slashes".to_owned()],
            ..TreefixConfig::default()
        };
        let mut settings = Settings::from_config(&config);
        assert_eq!(settings.walk.extensions, vec!["js"]);

        settings.override_extensions(&["ts".to_owned()]);
        settings.extend_folders(&["tmp".to_owned()], &["build".to_owned()]);
        assert_eq!(settings.walk.extensions, vec!["ts"]);
        assert_eq!(settings.walk.exclude, vec!["coverage", "tmp"]);
        assert_eq!(settings.walk.include, vec!["build"]);

        let pipeline = settings.pipeline().unwrap();
        assert_eq!(pipeline.names(), vec!["scheme-slashes"]);
    }

    #[test]
    fn test_empty_override_keeps_extensions() {
        let mut settings = Settings::default();
        settings.override_extensions(&[]);
        assert_eq!(settings.walk.extensions.len(), 4);
    }

    #[test]
    fn test_rules_file_appends_after_config() {
        let config = TreefixConfig {
            presets: vec!["scheme-slashes".to_owned()],
            rules: vec![RuleSpec::new("first", "a", "b")],
            ..TreefixConfig::default()
        };
        let file = RulesFile {
            presets: vec!["scheme-slashes".to_owned()],
            rules: vec![RuleSpec::new("second", "c", "d")],
        };
        let settings = Settings::from_config(&config).with_rules_file(file);
        let names: Vec<String> = settings
            .pipeline()
            .unwrap()
            .names()
            .into_iter()
            .map(str::to_owned)
            .collect();
        assert_eq!(
            names,
            vec!["scheme-slashes", "first", "second", "strip-comments"]
        );
    }

    #[test]
    fn test_invalid_rule_is_error() {
        let settings = Settings {
            rules: vec![RuleSpec::new("broken", "(unclosed", "")],
            ..Settings::default()
        };
        let err = settings.pipeline().unwrap_err();
        assert!(format!("{err:#}").contains("broken"));
    }

    #[test]
    fn test_unknown_preset_is_error() {
        let settings = Settings {
            presets: vec!["nope".to_owned()],
            ..Settings::default()
        };
        assert!(settings.rule_table().is_err());
    }
}
