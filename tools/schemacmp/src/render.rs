//! Plain-text report rendering.

use std::fmt::{Error, Result, Write as _};

use schemadiff::core::Report;

/// Render a report as sections; empty sections are left out.
pub fn render_report(report: &Report, show_common: bool) -> std::result::Result<String, Error> {
    let mut out = String::new();
    write_report(report, show_common, &mut out)?;
    Ok(out)
}

fn write_report(report: &Report, show_common: bool, out: &mut String) -> Result {
    let left = report.left_label();
    let right = report.right_label();
    writeln!(out, "--- {left}")?;
    writeln!(out, "+++ {right}")?;

    section(out, &format!("Only in {left}"), report.only_in_left(), |out, path| {
        writeln!(out, "  - {path}")
    })?;
    section(out, &format!("Only in {right}"), report.only_in_right(), |out, path| {
        writeln!(out, "  + {path}")
    })?;
    section(out, "Type mismatches", report.type_mismatches(), |out, m| {
        writeln!(out, "  ~ {}: {} -> {}", m.path, m.old_type, m.new_type)
    })?;
    section(out, "Presence issues", report.presence_issues(), |out, issue| {
        writeln!(
            out,
            "  ? {}: {} in {left}, {} in {right}",
            issue.path,
            presence_word(issue.old_nullable),
            presence_word(issue.new_nullable)
        )
    })?;
    section(out, "Path changes", report.path_changes(), |out, change| {
        writeln!(
            out,
            "  > {}: {} -> {}",
            change.name,
            change.old_paths.join(", "),
            change.new_paths.join(", ")
        )
    })?;
    if show_common {
        section(out, "Common fields", report.common_fields(), |out, path| {
            writeln!(out, "    {path}")
        })?;
    }

    let summary = report.summary();
    writeln!(out)?;
    writeln!(
        out,
        "{} only in {left}, {} only in {right}, {} type mismatches, {} presence issues, {} path changes, {} common fields",
        summary.only_in_left,
        summary.only_in_right,
        summary.type_mismatches,
        summary.presence_issues,
        summary.path_changes,
        summary.common_fields
    )?;
    if !report.has_differences() {
        writeln!(out, "schemas match")?;
    }
    Ok(())
}

fn section<T>(
    out: &mut String,
    title: &str,
    items: &[T],
    mut line: impl FnMut(&mut String, &T) -> Result,
) -> Result {
    if items.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{title}:")?;
    for item in items {
        line(out, item)?;
    }
    Ok(())
}

fn presence_word(nullable: bool) -> &'static str {
    if nullable { "optional" } else { "required" }
}
