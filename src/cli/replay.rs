//! Replay command implementation

use crate::config::Config;
use crate::replay::{EventStream, ReplayEvent, Simulator};
use chrono::{DateTime, Utc};
use clap::{Args, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Args, Debug)]
pub struct ReplayArgs {
    /// JSON-lines file of bar, cycle and exit events
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

impl ReplayArgs {
    pub fn execute(&self, config: &Config) -> anyhow::Result<()> {
        tracing::info!("Replaying {:?}...", self.input);

        let events: Vec<ReplayEvent> =
            EventStream::open(&self.input)?.collect::<anyhow::Result<_>>()?;
        let start = events
            .iter()
            .find_map(ReplayEvent::time)
            .unwrap_or(DateTime::<Utc>::UNIX_EPOCH);

        let simulator = Simulator::new(config, start)?;
        let summary = simulator.run(events.into_iter().map(Ok))?;

        match self.format {
            OutputFormat::Table => println!("{}", summary.format_table()),
            OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        }
        Ok(())
    }
}
