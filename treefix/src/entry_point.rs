use crate::cli::{Cli, Commands};
use crate::commands::{FixOptions, Settings};
use crate::config::{Config, RulesFile};
use anyhow::Result;
use clap::Parser;
use std::path::Path;

/// Runs treefix with the given arguments, writing to stdout.
///
/// # Errors
///
/// Returns an error if writing output fails.
pub fn run_with_args(args: Vec<String>) -> Result<i32> {
    run_with_args_to(args, &mut std::io::stdout())
}

/// Run treefix with the given arguments, writing output to the specified writer.
///
/// This is the testable version of `run_with_args` that allows output capture.
/// Usage errors, a missing root and invalid configuration are reported on
/// stderr and yield exit code 1. Per-file failures do not change the code.
///
/// # Errors
///
/// Returns an error if writing output fails.
pub fn run_with_args_to<W: std::io::Write>(args: Vec<String>, writer: &mut W) -> Result<i32> {
    let mut program_args = vec!["treefix".to_owned()];
    program_args.extend(args);
    let cli_var = match Cli::try_parse_from(program_args) {
        Ok(c) => c,
        Err(e) => {
            match e.kind() {
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                    write!(writer, "{e}")?;
                    writer.flush()?;
                    return Ok(0);
                }
                _ => {
                    eprint!("{e}");
                    return Ok(1);
                }
            }
        }
    };

    let verbose = cli_var.output.verbose && !cli_var.output.json;

    match cli_var.command {
        Some(Commands::Init) => {
            crate::commands::run_init(writer)?;
            Ok(0)
        }
        Some(Commands::Rules { paths, rules, json }) => {
            let root = paths.resolve();
            if !check_root(&root) {
                return Ok(1);
            }
            let settings = match load_settings(&root, rules.as_deref(), verbose) {
                Ok(s) => s,
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    return Ok(1);
                }
            };
            if let Err(e) = crate::commands::run_rules(&settings, json, &mut *writer) {
                eprintln!("Error: {e:#}");
                return Ok(1);
            }
            Ok(0)
        }
        None => {
            let root = cli_var.paths.resolve();
            if !check_root(&root) {
                return Ok(1);
            }

            let mut settings =
                match load_settings(&root, cli_var.transforms.rules.as_deref(), verbose) {
                    Ok(s) => s,
                    Err(e) => {
                        eprintln!("Error: {e:#}");
                        return Ok(1);
                    }
                };
            apply_flags(&mut settings, &cli_var);

            // Reject bad rules before any file is touched
            let pipeline = match settings.pipeline() {
                Ok(p) => p,
                Err(e) => {
                    eprintln!("Error: {e:#}");
                    return Ok(1);
                }
            };

            if verbose {
                eprintln!("[VERBOSE] Root: {}", root.display());
                eprintln!("[VERBOSE] Extensions: {:?}", settings.walk.extensions);
                eprintln!(
                    "[VERBOSE] Excludes: {:?}",
                    settings.walk.effective_excludes()
                );
                eprintln!("[VERBOSE] Pipeline: {:?}", pipeline.names());
                eprintln!();
            }

            let options = FixOptions {
                dry_run: cli_var.output.dry_run,
                json: cli_var.output.json,
                verbose,
                quiet: cli_var.output.quiet,
            };
            crate::commands::run_fix(&root, &settings, pipeline, &options, &mut *writer)?;
            Ok(0)
        }
    }
}

/// Prints an error and returns false unless `root` is an existing directory.
fn check_root(root: &Path) -> bool {
    if !root.exists() {
        eprintln!("Error: The directory '{}' does not exist.", root.display());
        return false;
    }
    if !root.is_dir() {
        eprintln!("Error: '{}' is not a directory.", root.display());
        return false;
    }
    true
}

fn load_settings(root: &Path, rules_file: Option<&Path>, verbose: bool) -> Result<Settings> {
    let config = Config::load_from_path(root)?;

    if verbose {
        eprintln!("[VERBOSE] treefix v{}", env!("CARGO_PKG_VERSION"));
        match &config.config_file_path {
            Some(path) => eprintln!("[VERBOSE] Config: {}", path.display()),
            None => eprintln!(
                "[VERBOSE] Config: defaults (no {} found)",
                crate::constants::CONFIG_FILENAME
            ),
        }
    }

    let mut settings = Settings::from_config(&config.treefix);
    if let Some(path) = rules_file {
        if verbose {
            eprintln!("[VERBOSE] Rules file: {}", path.display());
        }
        settings = settings.with_rules_file(RulesFile::load(path)?);
    }
    Ok(settings)
}

/// Command-line flags override the configuration file.
fn apply_flags(settings: &mut Settings, cli: &Cli) {
    settings.override_extensions(&cli.select.extensions);
    settings.extend_folders(&cli.select.exclude_folders, &cli.select.include_folders);
    if cli.select.gitignore {
        settings.walk.respect_gitignore = true;
    }
    if cli.transforms.no_strip_comments {
        settings.strip_comments = false;
    }
    if cli.transforms.no_block_comments {
        settings.block_comments = false;
    }
}
