//! Recorded sensor sessions (CSV)
//!
//! The collector writes one row per heater cycle with the ten channels under
//! the headers `G320 … G100`, among other columns (timestamp, session id,
//! temperature, notes). Only the channel columns and an optional class label
//! column (`classe`, `class` or `label`) are read.

use std::fs::File;
use std::io;
use std::path::Path;

use enose_core::{CHANNEL_NAMES, NUM_CHANNELS, RawReading};

use crate::error::{MlError, Result};

const LABEL_COLUMNS: [&str; 3] = ["classe", "class", "label"];

/// One parsed CSV row
#[derive(Debug, Clone, PartialEq)]
pub struct Sample {
    /// 1-based line in the source file
    pub line: u64,
    pub reading: RawReading,
    pub label: Option<String>,
}

/// All readable rows of a session file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    pub samples: Vec<Sample>,
    /// Rows dropped because a channel was missing or not a number
    pub skipped: usize,
}

impl Session {
    /// Load a session from a CSV file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path)
            .map_err(|e| MlError::Io(format!("Failed to open {}: {}", path.display(), e)))?;

        let session = Self::from_reader(file)
            .map_err(|e| MlError::DatasetError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(
            path = %path.display(),
            samples = session.samples.len(),
            skipped = session.skipped,
            "session loaded"
        );
        Ok(session)
    }

    /// Parse CSV from any reader (header row required)
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = reader.headers()?.clone();
        let find = |name: &str| headers.iter().position(|h| h.eq_ignore_ascii_case(name));

        let mut columns = [0usize; NUM_CHANNELS];
        let mut missing = Vec::new();
        for (slot, name) in columns.iter_mut().zip(CHANNEL_NAMES) {
            match find(name) {
                Some(idx) => *slot = idx,
                None => missing.push(name),
            }
        }
        if !missing.is_empty() {
            return Err(MlError::DatasetError(format!(
                "missing channel columns: {}",
                missing.join(", ")
            )));
        }
        let label_column = LABEL_COLUMNS.iter().find_map(|&name| find(name));

        let mut session = Session::default();
        for record in reader.records() {
            let record = record?;
            let line = record.position().map_or(0, |p| p.line());

            match parse_channels(&record, &columns) {
                Some(channels) => {
                    let label = label_column
                        .and_then(|idx| record.get(idx))
                        .filter(|l| !l.is_empty())
                        .map(str::to_string);
                    session.samples.push(Sample {
                        line,
                        reading: RawReading::new(channels),
                        label,
                    });
                }
                None => {
                    tracing::warn!(line, "skipping row with missing or non-numeric channel");
                    session.skipped += 1;
                }
            }
        }

        Ok(session)
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn readings(&self) -> impl Iterator<Item = &RawReading> {
        self.samples.iter().map(|s| &s.reading)
    }
}

fn parse_channels(
    record: &csv::StringRecord,
    columns: &[usize; NUM_CHANNELS],
) -> Option<[f32; NUM_CHANNELS]> {
    let mut channels = [0.0f32; NUM_CHANNELS];
    for (value, &idx) in channels.iter_mut().zip(columns) {
        *value = record.get(idx)?.parse().ok()?;
    }
    Some(channels)
}
