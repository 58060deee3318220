use std::{
    fs,
    path::{Path, PathBuf},
    process::ExitCode,
};

use anyhow::{Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use schemadiff::{
    LoadOptions, SourceFormat, SourceSpec, compare_sources,
    core::{CompareOptions, Report},
};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::{output::emit, render::render_report, source::LoadArgs};

#[derive(Args)]
pub struct BatchArgs {
    /// JSON file listing the pairs:
    /// [{"left": "a.json", "right": "b.sql", "right_target": "orders"}, ...]
    pairs: PathBuf,

    /// Restrict every comparison to these dotted fields (comma separated)
    #[arg(long, value_delimiter = ',')]
    fields: Vec<String>,

    /// Report nullability-only changes as type mismatches
    #[arg(long)]
    no_presence: bool,

    /// Print the results as JSON
    #[arg(long)]
    json: bool,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also exit with status 1 when any pair differs
    #[arg(long)]
    fail_on_diff: bool,

    #[command(flatten)]
    load: LoadArgs,
}

/// One entry of the pairs file. Relative paths are resolved against the
/// directory holding the pairs file.
#[derive(Deserialize)]
struct PairEntry {
    left: PathBuf,
    right: PathBuf,
    #[serde(default)]
    left_format: Option<String>,
    #[serde(default)]
    right_format: Option<String>,
    #[serde(default)]
    left_target: Option<String>,
    #[serde(default)]
    right_target: Option<String>,
}

#[derive(Serialize)]
struct PairOutcome {
    left: String,
    right: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    report: Option<Report>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

impl BatchArgs {
    pub fn run(self) -> Result<ExitCode> {
        let text = fs::read_to_string(&self.pairs)
            .with_context(|| format!("failed to read {}", self.pairs.display()))?;
        let entries: Vec<PairEntry> = serde_json::from_str(&text)
            .with_context(|| format!("invalid pairs file {}", self.pairs.display()))?;
        let base = self.pairs.parent().unwrap_or(Path::new("."));

        let load_options = self.load.load_options();
        let compare_options = CompareOptions {
            fields: self.fields.clone(),
            include_presence: !self.no_presence,
            ..CompareOptions::default()
        };

        let pb = ProgressBar::new(entries.len() as u64);
        pb.set_style(
            ProgressStyle::with_template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} pairs",
            )?
            .progress_chars("=>-"),
        );

        // `collect` keeps the input order.
        let outcomes: Vec<PairOutcome> = entries
            .par_iter()
            .map(|entry| {
                let outcome = compare_pair(entry, base, &load_options, &compare_options);
                pb.inc(1);
                outcome
            })
            .collect();
        pb.finish_and_clear();

        let failed = outcomes.iter().filter(|o| o.error.is_some()).count();
        let differing = outcomes
            .iter()
            .filter(|o| o.report.as_ref().is_some_and(Report::has_differences))
            .count();
        if failed > 0 {
            warn!(failed, total = outcomes.len(), "some pairs could not be compared");
        }

        let text = if self.json {
            serde_json::to_string_pretty(&outcomes)?
        } else {
            render_outcomes(&outcomes)?
        };
        emit(&text, self.output.as_deref())?;

        if failed > 0 || (self.fail_on_diff && differing > 0) {
            return Ok(ExitCode::FAILURE);
        }
        Ok(ExitCode::SUCCESS)
    }
}

fn compare_pair(
    entry: &PairEntry,
    base: &Path,
    load_options: &LoadOptions,
    compare_options: &CompareOptions,
) -> PairOutcome {
    let left = base.join(&entry.left);
    let right = base.join(&entry.right);
    let result = pair_specs(entry, &left, &right).and_then(|(left, right)| {
        compare_sources(&left, &right, load_options, compare_options).map_err(anyhow::Error::from)
    });

    let (report, error) = match result {
        Ok(report) => (Some(report), None),
        Err(e) => (None, Some(format!("{e:#}"))),
    };
    PairOutcome {
        left: entry.left.display().to_string(),
        right: entry.right.display().to_string(),
        report,
        error,
    }
}

fn pair_specs(entry: &PairEntry, left: &Path, right: &Path) -> Result<(SourceSpec, SourceSpec)> {
    let spec = |path: &Path, format: &Option<String>, target: &Option<String>| {
        Ok::<_, anyhow::Error>(SourceSpec {
            path: path.to_path_buf(),
            format: format
                .as_deref()
                .map(str::parse::<SourceFormat>)
                .transpose()
                .map_err(anyhow::Error::msg)?,
            target: target.clone(),
            label: None,
        })
    };
    Ok((
        spec(left, &entry.left_format, &entry.left_target)?,
        spec(right, &entry.right_format, &entry.right_target)?,
    ))
}

fn render_outcomes(outcomes: &[PairOutcome]) -> Result<String> {
    let mut out = String::new();
    for (index, outcome) in outcomes.iter().enumerate() {
        if index > 0 {
            out.push('\n');
        }
        out.push_str(&format!(
            "=== [{}] {} vs {}\n",
            index + 1,
            outcome.left,
            outcome.right
        ));
        match (&outcome.report, &outcome.error) {
            (Some(report), _) => out.push_str(&render_report(report, false)?),
            (None, Some(error)) => out.push_str(&format!("error: {error}\n")),
            (None, None) => {}
        }
    }
    Ok(out)
}
