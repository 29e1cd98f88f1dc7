use crate::fix::{FileEvent, RunReport};
use crate::transform::RuleTable;
use crate::utils::normalize_display_path;
use colored::Colorize;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use std::io::Write;

/// Print the exclusion list in styled format.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_exclusion_list(
    writer: &mut impl Write,
    excludes: &[String],
    includes: &[String],
) -> std::io::Result<()> {
    if excludes.is_empty() {
        let defaults = crate::constants::DEFAULT_EXCLUDE_FOLDERS();
        let mut sorted_defaults: Vec<&str> = defaults.iter().copied().collect();
        sorted_defaults.sort_unstable();
        let list = sorted_defaults.join(", ");
        writeln!(
            writer,
            "{} {}",
            "[OK] Using default exclusions only:".green(),
            list.dimmed()
        )?;
    } else {
        writeln!(writer, "{} {}", "Excluding:".yellow().bold(), excludes.join(", "))?;
    }
    if !includes.is_empty() {
        writeln!(writer, "{} {}", "Including:".cyan().bold(), includes.join(", "))?;
    }
    Ok(())
}

/// Print the run header.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_header(writer: &mut impl Write, root: &str, dry_run: bool) -> std::io::Result<()> {
    if dry_run {
        writeln!(
            writer,
            "{} {}",
            "[DRY-RUN] Changes that would be made under".yellow(),
            root.bold()
        )?;
    } else {
        writeln!(writer, "{} {}", "Rewriting files under".cyan(), root.bold())?;
    }
    Ok(())
}

/// Print the line for a single progress event.
///
/// `Visited` events print nothing; verbose tracing is the caller's concern.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_event(writer: &mut impl Write, event: &FileEvent<'_>) -> std::io::Result<()> {
    match event {
        FileEvent::Visited { .. } => {}
        FileEvent::Changed {
            path,
            applied,
            dry_run,
        } => {
            let label = if *dry_run {
                "Would fix:".yellow()
            } else {
                "Fixed:".green()
            };
            writeln!(
                writer,
                "  {} {} ({})",
                label,
                normalize_display_path(path),
                applied.join(", ")
            )?;
        }
        FileEvent::Unstable { path } => {
            writeln!(
                writer,
                "  {} {}: a second pass would change it again",
                "Warning:".yellow().bold(),
                normalize_display_path(path)
            )?;
        }
        FileEvent::Failed { path, error } => {
            writeln!(
                writer,
                "  {} {}: {}",
                "Error:".red(),
                normalize_display_path(path),
                error
            )?;
        }
    }
    Ok(())
}

/// Print summary with colored "pills".
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_summary(writer: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    fn pill(label: &str, count: usize, bad: bool) -> String {
        if count == 0 || !bad {
            format!("{}: {}", label, count.to_string().green())
        } else {
            format!("{}: {}", label, count.to_string().red().bold())
        }
    }

    let changed_label = if report.dry_run { "Would change" } else { "Changed" };

    writeln!(writer)?;
    writeln!(
        writer,
        "{}  {}  {}  {}",
        pill("Scanned", report.scanned, false),
        pill(changed_label, report.changed, false),
        pill("Unchanged", report.unchanged, false),
        pill("Errors", report.errored, true),
    )?;

    if !report.non_idempotent.is_empty() {
        writeln!(
            writer,
            "{} {}",
            "Not idempotent:".yellow().bold(),
            report.non_idempotent.join(", ")
        )?;
    }
    for error in &report.walk_errors {
        writeln!(writer, "{} {}", "Walk error:".red(), error)?;
    }
    Ok(())
}

/// Helper to create a styled table
fn create_table(headers: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(headers);
    table
}

/// Print how many files each transform changed.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_transform_hits(writer: &mut impl Write, report: &RunReport) -> std::io::Result<()> {
    if report.transform_hits.is_empty() {
        return Ok(());
    }

    let mut table = create_table(vec!["Transform", "Files"]);
    for hit in &report.transform_hits {
        let files = if hit.files == 0 {
            Cell::new(hit.files).fg(Color::DarkGrey)
        } else {
            Cell::new(hit.files).fg(Color::Green)
        };
        table.add_row(vec![
            Cell::new(&hit.name).add_attribute(Attribute::Bold),
            files,
        ]);
    }
    writeln!(writer, "{table}")?;
    Ok(())
}

/// Print the effective rule table, followed by the comment stripper if on.
///
/// # Errors
///
/// Returns an error if writing to the output fails.
pub fn print_rule_table(
    writer: &mut impl Write,
    rules: &RuleTable,
    comment_stripping: Option<&str>,
) -> std::io::Result<()> {
    if rules.is_empty() && comment_stripping.is_none() {
        writeln!(writer, "{}", "No transforms configured.".yellow())?;
        return Ok(());
    }

    let mut table = create_table(vec!["#", "Name", "Files", "Find", "Replace"]);
    for (index, rule) in rules.iter().enumerate() {
        let spec = rule.spec();
        let files = if spec.files.is_empty() {
            "*".to_owned()
        } else {
            spec.files.join(", ")
        };
        let kind = if spec.literal { " (literal)" } else { "" };
        table.add_row(vec![
            Cell::new(index + 1),
            Cell::new(&spec.name).add_attribute(Attribute::Bold),
            Cell::new(files),
            Cell::new(format!("{}{kind}", spec.find)).fg(Color::Cyan),
            Cell::new(&spec.replace).fg(Color::Green),
        ]);
    }
    if let Some(description) = comment_stripping {
        table.add_row(vec![
            Cell::new(rules.len() + 1),
            Cell::new(crate::constants::STRIP_COMMENTS_NAME).add_attribute(Attribute::Bold),
            Cell::new("*"),
            Cell::new(description).fg(Color::Cyan),
            Cell::new(""),
        ]);
    }
    writeln!(writer, "{table}")?;
    Ok(())
}
