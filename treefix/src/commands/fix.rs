//! The default command: rewrite a tree in place.

use super::Settings;
use crate::fix::{FileEvent, RewriteOptions, RunReport, TreeRewriter};
use crate::output;
use crate::transform::Pipeline;
use crate::utils::normalize_display_path;

use anyhow::Result;
use std::io::Write;
use std::path::Path;

/// Presentation options for [`run_fix`].
#[derive(Debug, Default, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct FixOptions {
    /// Dry-run mode (show what would change)
    pub dry_run: bool,
    /// Print the report as JSON only
    pub json: bool,
    /// Trace visited files on stderr
    pub verbose: bool,
    /// Print only the summary
    pub quiet: bool,
}

/// Rewrite every selected file under `root` with `pipeline` and print the
/// outcome.
///
/// Per-file failures are printed with their reason (even with `quiet`) and
/// counted in the returned report; they do not make this function fail.
///
/// # Errors
///
/// Returns an error if the root does not exist or writing to `writer` fails.
pub fn run_fix<W: Write>(
    root: &Path,
    settings: &Settings,
    pipeline: Pipeline,
    options: &FixOptions,
    mut writer: W,
) -> Result<RunReport> {
    let rewriter = TreeRewriter::new(
        pipeline,
        RewriteOptions {
            walk: settings.walk.clone(),
            dry_run: options.dry_run,
            verify_idempotence: settings.verify_idempotence,
        },
    );

    let text = !options.json;
    let per_file = text && !options.quiet;

    if per_file {
        output::print_header(&mut writer, &normalize_display_path(root), options.dry_run)?;
    }
    if options.verbose && text {
        output::print_exclusion_list(&mut writer, &settings.walk.exclude, &settings.walk.include)?;
    }

    let report = rewriter.run(root, |event| {
        if options.verbose && text {
            if let FileEvent::Visited { path } = event {
                eprintln!("[VERBOSE] Processing {}", normalize_display_path(path));
            }
        }
        if per_file || (text && matches!(event, FileEvent::Failed { .. })) {
            output::print_event(&mut writer, event)?;
        }
        Ok(())
    })?;

    if options.json {
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(report);
    }

    output::print_summary(&mut writer, &report)?;
    if !options.quiet && report.changed > 0 {
        output::print_transform_hits(&mut writer, &report)?;
    }
    Ok(report)
}
