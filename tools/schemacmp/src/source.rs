//! Flags shared by every command that loads sources.

use clap::{Args, ValueEnum};
use schemadiff::{LoadOptions, SourceFormat, json::SampleOptions, protobuf::PresencePolicy};

#[derive(Args, Clone, Debug)]
pub struct LoadArgs {
    /// Read at most N JSON sample records
    #[arg(long, value_name = "N")]
    max_records: Option<usize>,

    /// Type RFC 3339 / YYYY-MM-DD strings in JSON samples as timestamp
    #[arg(long)]
    detect_timestamps: bool,

    /// Which protobuf fields count as always present
    #[arg(long, value_enum, default_value_t = Presence::PresenceAware)]
    protobuf_presence: Presence,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
#[value(rename_all = "kebab-case")]
pub enum Presence {
    PresenceAware,
    AlwaysDefault,
}

impl LoadArgs {
    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            json: SampleOptions {
                max_records: self.max_records,
                detect_timestamps: self.detect_timestamps,
            },
            presence_policy: match self.protobuf_presence {
                Presence::PresenceAware => PresencePolicy::PresenceAware,
                Presence::AlwaysDefault => PresencePolicy::AlwaysDefault,
            },
        }
    }
}

pub fn parse_format(raw: &str) -> Result<SourceFormat, String> {
    raw.parse()
}
