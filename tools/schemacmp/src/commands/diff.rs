use std::{
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Args;
use schemadiff::{
    SourceFormat, SourceSpec, compare_sources,
    core::{CompareOptions, Report},
};
use tracing::info;

use crate::{
    output::emit,
    render::render_report,
    source::{LoadArgs, parse_format},
};

#[derive(Args)]
pub struct DiffArgs {
    /// Left (old) schema source
    left: PathBuf,

    /// Right (new) schema source
    right: PathBuf,

    /// Format of the left source (inferred from the file name if omitted)
    #[arg(long, value_parser = parse_format)]
    left_format: Option<SourceFormat>,

    /// Format of the right source (inferred from the file name if omitted)
    #[arg(long, value_parser = parse_format)]
    right_format: Option<SourceFormat>,

    /// Table, dbt model or protobuf message to read from the left source
    #[arg(long)]
    left_target: Option<String>,

    /// Table, dbt model or protobuf message to read from the right source
    #[arg(long)]
    right_target: Option<String>,

    /// Restrict the comparison to these dotted fields (comma separated)
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,

    /// Report nullability-only changes as type mismatches
    #[arg(long)]
    no_presence: bool,

    /// Do not pair fields that moved to another parent
    #[arg(long)]
    no_path_changes: bool,

    /// List the fields present on both sides
    #[arg(long)]
    show_common: bool,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Exit with status 1 when the schemas differ
    #[arg(long)]
    fail_on_diff: bool,

    #[command(flatten)]
    load: LoadArgs,
}

impl DiffArgs {
    pub fn run(self) -> Result<ExitCode> {
        let left = self.source(&self.left, self.left_format, self.left_target.as_deref());
        let right = self.source(&self.right, self.right_format, self.right_target.as_deref());

        let report = compare_sources(
            &left,
            &right,
            &self.load.load_options(),
            &self.compare_options(),
        )
        .with_context(|| {
            format!(
                "failed to compare {} with {}",
                self.left.display(),
                self.right.display()
            )
        })?;
        info!(summary = ?report.summary(), "comparison finished");

        emit(&self.render(&report)?, self.output.as_deref())?;

        if self.fail_on_diff && report.has_differences() {
            return Ok(ExitCode::FAILURE);
        }
        Ok(ExitCode::SUCCESS)
    }

    fn source(
        &self,
        path: &Path,
        format: Option<SourceFormat>,
        target: Option<&str>,
    ) -> SourceSpec {
        SourceSpec {
            path: path.to_path_buf(),
            format,
            target: target.map(str::to_string),
            label: None,
        }
    }

    fn compare_options(&self) -> CompareOptions {
        CompareOptions {
            fields: self.fields.clone(),
            include_presence: !self.no_presence,
            detect_path_changes: !self.no_path_changes,
            ..CompareOptions::default()
        }
    }

    fn render(&self, report: &Report) -> Result<String> {
        if self.json {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(render_report(report, self.show_common)?)
        }
    }
}
