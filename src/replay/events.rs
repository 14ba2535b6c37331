//! Event-driven replay from JSON-lines files

use crate::market::{InferenceReading, MarketSnapshot};
use anyhow::Context;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Replay event types
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ReplayEvent {
    /// New bar: advances the clock and marks the open position
    Bar { time: DateTime<Utc>, price: Decimal },
    /// Decision cycle; `price` is the fill price on approval
    Cycle {
        snapshot: MarketSnapshot,
        inference: InferenceReading,
        price: Decimal,
    },
    /// Close the open position at `price`
    Exit { price: Decimal },
}

impl ReplayEvent {
    pub fn time(&self) -> Option<DateTime<Utc>> {
        match self {
            ReplayEvent::Bar { time, .. } => Some(*time),
            _ => None,
        }
    }
}

/// Yields events line by line; blank lines and `#` comments are skipped
pub struct EventStream<R> {
    reader: R,
    line_no: usize,
    buf: String,
}

impl EventStream<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let file =
            File::open(path).with_context(|| format!("opening replay file {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

impl<R: BufRead> EventStream<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line_no: 0,
            buf: String::new(),
        }
    }

    fn next_event(&mut self) -> Option<anyhow::Result<ReplayEvent>> {
        loop {
            self.buf.clear();
            self.line_no += 1;
            match self.reader.read_line(&mut self.buf) {
                Ok(0) => return None,
                Ok(_) => {}
                Err(e) => return Some(Err(e.into())),
            }
            let line = self.buf.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let line_no = self.line_no;
            return Some(
                serde_json::from_str(line)
                    .with_context(|| format!("malformed replay event on line {line_no}")),
            );
        }
    }
}

impl<R: BufRead> Iterator for EventStream<R> {
    type Item = anyhow::Result<ReplayEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_event()
    }
}
