use std::{path::PathBuf, process::ExitCode};

use anyhow::{Context, Result};
use clap::Args;
use schemadiff::{SourceFormat, SourceSpec, core::format_schema_tree, load_source, write_snapshot};

use crate::{
    output::emit,
    source::{LoadArgs, parse_format},
};

#[derive(Args)]
pub struct SchemaArgs {
    /// Schema source
    input: PathBuf,

    /// Source format (inferred from the file name if omitted)
    #[arg(short, long, value_parser = parse_format)]
    format: Option<SourceFormat>,

    /// Table, dbt model or protobuf message to read
    #[arg(short, long)]
    target: Option<String>,

    /// Also write the canonical schema as a snapshot file
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Print the schema in JSON notation
    #[arg(long)]
    json: bool,

    /// Output file path (stdout if not specified)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[command(flatten)]
    load: LoadArgs,
}

impl SchemaArgs {
    pub fn run(self) -> Result<ExitCode> {
        let spec = SourceSpec {
            path: self.input.clone(),
            format: self.format,
            target: self.target.clone(),
            label: None,
        };
        let loaded = load_source(&spec, &self.load.load_options())
            .with_context(|| format!("failed to load {}", self.input.display()))?;

        if let Some(path) = &self.snapshot {
            write_snapshot(path, &loaded)?;
        }

        let text = if self.json {
            serde_json::to_string_pretty(&loaded.tree.to_json())?
        } else {
            format_schema_tree(&loaded.tree)?
        };
        emit(&text, self.output.as_deref())?;
        Ok(ExitCode::SUCCESS)
    }
}
