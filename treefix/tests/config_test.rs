//! Tests for configuration discovery and how it feeds the run settings.
#![allow(clippy::unwrap_used)]

use std::fs;
use tempfile::TempDir;
use treefix::commands::Settings;
use treefix::config::{Config, RulesFile};

#[test]
fn test_defaults_without_config() {
    let dir = TempDir::new().unwrap();
    let config = Config::load_from_path(dir.path()).unwrap();
    let settings = Settings::from_config(&config.treefix);

    assert_eq!(settings.walk.extensions, vec!["js", "jsx", "ts", "tsx"]);
    assert!(settings.walk.exclude.is_empty());
    assert_eq!(
        settings.url_schemes,
        vec!["http", "https", "ws", "wss", "ftp", "file"]
    );
    assert!(settings.presets.is_empty());
}

#[test]
fn test_config_values_reach_settings() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join(".treefix.toml"),
        r#"[treefix]
extensions = [".ts", "TSX"]
exclude_folders = ["coverage"]
include_folders = ["dist"]
strip_comments = true
block_comments = false
url_schemes = ["http", "https", "git"]
respect_gitignore = true
verify_idempotence = false
presets = ["scheme-slashes"]

[[treefix.rules]]
name = "api"
find = "'http://localhost:5000(?![\\d/])"
replace = "'http://localhost:5000/api"
"#,
    )
    .unwrap();

    let config = Config::load_from_path(dir.path()).unwrap();
    let settings = Settings::from_config(&config.treefix);

    assert_eq!(settings.walk.extensions, vec!["ts", "tsx"]);
    assert_eq!(settings.walk.exclude, vec!["coverage"]);
    assert!(!settings.walk.effective_excludes().contains(&"dist".to_owned()));
    assert!(!settings.block_comments);
    assert!(settings.walk.respect_gitignore);
    assert!(!settings.verify_idempotence);
    assert_eq!(
        settings.pipeline().unwrap().names(),
        vec!["scheme-slashes", "api", "strip-comments"]
    );
}

#[test]
fn test_config_found_from_subdirectory() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".treefix.toml"), "[treefix]\npresets = []\n").unwrap();
    let nested = dir.path().join("web/src");
    fs::create_dir_all(&nested).unwrap();

    let config = Config::load_from_path(&nested).unwrap();
    assert!(config
        .config_file_path
        .unwrap()
        .ends_with(".treefix.toml"));
}

#[test]
fn test_malformed_config_is_an_error() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join(".treefix.toml"), "[treefix]\nextensions = 5\n").unwrap();
    assert!(Config::load_from_path(dir.path()).is_err());
}

#[test]
fn test_rules_file_extends_config() {
    let dir = TempDir::new().unwrap();
    let rules_path = dir.path().join("url-rules.toml");
    fs::write(
        &rules_path,
        r#"
[[rules]]
name = "port"
find = "localhost:5000"
replace = "localhost:8080"
literal = true
"#,
    )
    .unwrap();

    let settings = Settings::default().with_rules_file(RulesFile::load(&rules_path).unwrap());
    assert_eq!(
        settings.pipeline().unwrap().names(),
        vec!["port", "strip-comments"]
    );
}

#[test]
fn test_rules_file_rejects_unknown_keys() {
    let dir = TempDir::new().unwrap();
    let rules_path = dir.path().join("rules.toml");
    fs::write(
        &rules_path,
        "[[rules]]\nname = \"x\"\nfind = \"a\"\nreplacement = \"b\"\n",
    )
    .unwrap();
    assert!(RulesFile::load(&rules_path).is_err());
}
