//! CSV output for SLA breach extracts
//!
//! Full and sampled extracts share one layout: every input column in the
//! order the incident file listed them, then the SLA target and the derived
//! metrics. Missing values are written as empty cells.

use crate::deriver::{DerivedIncident, DerivedTable};
use crate::incident::{ColumnLayout, InputColumn};
use chrono::NaiveDateTime;
use std::fs::File;
use std::io::Write;
use std::path::Path;

pub const SLA_COLUMN: &str = "SLA";
pub const RESOLUTION_DAYS_COLUMN: &str = "Time taken for resolution (days)";
pub const BREACH_DAYS_COLUMN: &str = "SLA Breached By (days)";
pub const CREATION_MONTH_COLUMN: &str = "Creation Month";
pub const RESOLUTION_MONTH_COLUMN: &str = "Resolution Month";
pub const BREACHED_COLUMN: &str = "SLA Breached(T/F)";

/// Derived columns appended after the incident columns
pub const DERIVED_COLUMNS: [&str; 6] = [
    SLA_COLUMN,
    RESOLUTION_DAYS_COLUMN,
    BREACH_DAYS_COLUMN,
    CREATION_MONTH_COLUMN,
    RESOLUTION_MONTH_COLUMN,
    BREACHED_COLUMN,
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Header row for a table read with `layout`
pub fn header(layout: &ColumnLayout) -> Vec<String> {
    layout
        .names()
        .chain(DERIVED_COLUMNS)
        .map(str::to_string)
        .collect()
}

fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

fn optional<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Format a derived incident as a CSV row, input columns in `layout` order
pub fn format_row(layout: &ColumnLayout, row: &DerivedIncident) -> Vec<String> {
    let record = &row.record;
    let mut extra = record.extra.iter();
    let mut fields: Vec<String> = layout
        .columns()
        .iter()
        .map(|column| match column {
            InputColumn::IncidentId => record.incident_id.clone(),
            InputColumn::Priority => record.priority.clone(),
            InputColumn::CreationDate => format_timestamp(&record.creation_date),
            InputColumn::ResolutionDate => {
                optional(record.resolution_date.as_ref().map(format_timestamp))
            }
            InputColumn::Application => record.application.clone(),
            InputColumn::Extra(_) => extra.next().cloned().unwrap_or_default(),
        })
        .collect();
    fields.extend([
        optional(row.sla_duration),
        optional(row.resolution_days),
        optional(row.breach_days),
        row.creation_month.to_string(),
        optional(row.resolution_month),
        if row.sla_breached { "True" } else { "False" }.to_string(),
    ]);
    fields
}

/// Write a table as CSV, header row first
pub fn write_extract<W: Write>(writer: W, table: &DerivedTable) -> csv::Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(header(table.layout()))?;
    for row in table {
        wtr.write_record(format_row(table.layout(), row))?;
    }
    wtr.flush()?;
    Ok(())
}

/// Generate CSV output as string
pub fn to_csv(table: &DerivedTable) -> csv::Result<String> {
    let mut buf = Vec::new();
    write_extract(&mut buf, table)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write a table as CSV to `path`, replacing any existing file
pub fn write_extract_file(path: &Path, table: &DerivedTable) -> csv::Result<()> {
    let file = File::create(path)?;
    write_extract(file, table)
}
