//! Output formatting and persistence for weather reports.
//!
//! Supports pretty-printing, JSON serialization, and CSV append of day records.

use anyhow::Result;
use serde::Serialize;
use tracing::{debug, info};

use crate::regime::{DayRecord, WeatherReport};
use csv::WriterBuilder;
use std::fs::OpenOptions;
use std::path::Path;

/// Logs a report using Rust's debug pretty-print format.
pub fn print_pretty(report: &WeatherReport) {
    debug!("{:#?}", report);
}

/// Logs any serializable value as pretty-printed JSON.
pub fn print_json<T: Serialize>(value: &T) -> Result<()> {
    info!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Appends day records as rows to a CSV file.
///
/// Creates the file with headers if it does not already exist.
pub fn append_days(path: &str, days: &[DayRecord]) -> Result<()> {
    let file_exists = Path::new(path).exists();
    debug!(path, file_exists, rows = days.len(), "Appending CSV records");

    let file = OpenOptions::new().append(true).create(true).open(path)?;

    let mut writer = WriterBuilder::new()
        .has_headers(!file_exists)
        .from_writer(file);

    for day in days {
        writer.serialize(day)?;
    }
    writer.flush()?;

    Ok(())
}
