use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Help text for configuration file options, shown at the bottom of --help.
const CONFIG_HELP: &str = "\
CONFIGURATION FILE (.treefix.toml):
  Create this file in your project root (or run `treefix init`) to set defaults.
  It is looked up from the root directory upward. Command-line flags win.

  [treefix]
  extensions = [\"js\", \"jsx\", \"ts\", \"tsx\"]
  exclude_folders = [\"coverage\"]   # Added to node_modules, build, dist, .git
  include_folders = []               # Force-include these
  strip_comments = true
  block_comments = true
  url_schemes = [\"http\", \"https\", \"ws\", \"wss\", \"ftp\", \"file\"]
  respect_gitignore = false
  verify_idempotence = true
  presets = [\"scheme-slashes\"]     # Built-in rules, run first

  [[treefix.rules]]
  name = \"api-suffix\"
  files = [\"*.js\"]                 # File-name globs; omit for every file
  find = \"'http://localhost:5000(?![\\\\d/])\"
  replace = \"'http://localhost:5000/api\"
";

/// Shared path arguments (mutually exclusive path/root).
#[derive(Args, Debug, Default, Clone)]
pub struct PathArgs {
    /// Root directory to rewrite. Defaults to the current directory.
    /// Cannot be used with --root.
    #[arg(conflicts_with = "root")]
    pub path: Option<PathBuf>,

    /// Root directory to rewrite (alternative to the positional path).
    /// Files are never written outside this directory.
    #[arg(long, conflicts_with = "path")]
    pub root: Option<PathBuf>,
}

impl PathArgs {
    /// The chosen root, or `.` when none was given.
    #[must_use]
    pub fn resolve(&self) -> PathBuf {
        self.root
            .clone()
            .or_else(|| self.path.clone())
            .unwrap_or_else(|| PathBuf::from("."))
    }
}

/// Options selecting which files are visited.
#[derive(Args, Debug, Default, Clone)]
pub struct SelectOptions {
    /// File extension to rewrite (repeatable). Replaces the defaults js, jsx, ts, tsx.
    #[arg(short = 'e', long = "ext", value_name = "EXT")]
    pub extensions: Vec<String>,

    /// Folders to exclude, in addition to node_modules, build, dist and .git.
    #[arg(long, alias = "exclude-folder", value_name = "NAME")]
    pub exclude_folders: Vec<String>,

    /// Folders to force-include (overrides default exclusions).
    #[arg(long, alias = "include-folder", value_name = "NAME")]
    pub include_folders: Vec<String>,

    /// Honour .gitignore files.
    #[arg(long)]
    pub gitignore: bool,
}

/// Options choosing the transforms.
#[derive(Args, Debug, Default, Clone)]
pub struct TransformOptions {
    /// Extra TOML rule table (top-level `presets` and `[[rules]]`).
    #[arg(long, value_name = "FILE")]
    pub rules: Option<PathBuf>,

    /// Do not strip comments.
    #[arg(long)]
    pub no_strip_comments: bool,

    /// Strip `//` comments only, leave `/* */` comments.
    #[arg(long)]
    pub no_block_comments: bool,
}

/// Options for output formatting and verbosity.
#[derive(Args, Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)] // CLI flags are legitimately booleans
pub struct OutputOptions {
    /// Report what would change without writing.
    #[arg(long)]
    pub dry_run: bool,

    /// Output the run report as JSON.
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output for debugging (shows files being visited).
    #[arg(short, long)]
    pub verbose: bool,

    /// Quiet mode: show only the summary.
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,
}

/// Command line interface configuration using `clap`.
/// This struct defines the arguments and flags accepted by the program.
#[derive(Parser, Debug)]
#[command(
    name = "treefix",
    author,
    version,
    about = "treefix - Idempotent comment stripping and find-and-replace over a source tree",
    long_about = None,
    after_help = CONFIG_HELP
)]
pub struct Cli {
    #[command(subcommand)]
    /// The subcommand to execute (init, rules).
    pub command: Option<Commands>,

    /// Global path options (path vs root).
    #[command(flatten)]
    pub paths: PathArgs,

    /// File selection options.
    #[command(flatten)]
    pub select: SelectOptions,

    /// Transform options.
    #[command(flatten)]
    pub transforms: TransformOptions,

    /// Output formatting options.
    #[command(flatten)]
    pub output: OutputOptions,
}

#[derive(Subcommand, Debug)]
/// Available subcommands.
pub enum Commands {
    /// Write a default .treefix.toml into the current directory
    Init,
    /// Print the effective rule table for a root
    Rules {
        /// Path options (path vs root).
        #[command(flatten)]
        paths: PathArgs,

        /// Extra TOML rule table.
        #[arg(long, value_name = "FILE")]
        rules: Option<PathBuf>,

        /// Output JSON.
        #[arg(long)]
        json: bool,
    },
}
