//! `treefix rules`: show the transforms a run would apply.

use super::Settings;
use crate::output;
use crate::transform::{CommentStripper, RegexRule, RuleSpec};
use anyhow::Result;
use serde::Serialize;
use std::io::Write;

#[derive(Serialize)]
struct RulesReport<'a> {
    rules: Vec<&'a RuleSpec>,
    strip_comments: bool,
    block_comments: bool,
    url_schemes: &'a [String],
}

/// Print the effective rule table.
///
/// Rules are compiled first, so an invalid rule is reported here too.
///
/// # Errors
///
/// Returns an error if a rule does not compile or writing fails.
pub fn run_rules<W: Write>(settings: &Settings, json: bool, mut writer: W) -> Result<()> {
    let table = settings.rule_table()?;
    let stripper = settings.comment_stripper()?;

    if json {
        let report = RulesReport {
            rules: table.iter().map(RegexRule::spec).collect(),
            strip_comments: stripper.is_some(),
            block_comments: stripper
                .as_ref()
                .is_some_and(CommentStripper::strips_block_comments),
            url_schemes: &settings.url_schemes,
        };
        writeln!(writer, "{}", serde_json::to_string_pretty(&report)?)?;
        return Ok(());
    }

    let description = stripper.as_ref().map(|s| {
        if s.strips_block_comments() {
            "// and /* */ comments"
        } else {
            "// comments"
        }
    });
    output::print_rule_table(&mut writer, &table, description)?;
    Ok(())
}
