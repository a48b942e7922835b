//! Incident and SLA target ingestion from delimited text
//!
//! Both inputs are CSV files with a header row. Required columns are
//! matched by exact (trimmed) header name; any other incident column is
//! carried through to the extracts untouched.

use crate::incident::{ColumnLayout, IncidentRecord, IncidentTable, InputColumn, SlaTargets};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

pub const INCIDENT_ID: &str = "Incident ID";
pub const PRIORITY: &str = "Priority";
pub const CREATION_DATE: &str = "Creation Date";
pub const RESOLUTION_DATE: &str = "Resolution Date";
pub const APPLICATION: &str = "Application";
pub const SLA: &str = "SLA";

/// Required incident columns
pub const INCIDENT_COLUMNS: [&str; 5] = [
    INCIDENT_ID,
    PRIORITY,
    CREATION_DATE,
    RESOLUTION_DATE,
    APPLICATION,
];

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Errors for input ingestion
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{0}'")]
    MissingColumn(String),

    #[error("Row {row}: invalid timestamp '{value}' in column '{column}'")]
    InvalidTimestamp {
        row: usize,
        column: String,
        value: String,
    },

    #[error("Priority '{0}' appears more than once in the SLA table")]
    DuplicatePriority(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;

/// Parse a timestamp cell; empty cells are missing values
///
/// Accepts ISO-8601 date-times (space or `T` separator, optional seconds
/// and fractions), RFC 3339 with offset (kept as the stated wall-clock
/// time, so month buckets follow the written date), and bare dates
/// (midnight).
pub fn parse_timestamp(raw: &str) -> Option<Option<NaiveDateTime>> {
    let value = raw.trim();
    if value.is_empty() {
        return Some(None);
    }

    for format in DATETIME_FORMATS {
        if let Ok(ts) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Some(ts));
        }
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(Some(ts.naive_local()));
    }

    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(Some)
}

fn column_index(headers: &[String], name: &str) -> Result<usize> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| IngestError::MissingColumn(name.to_string()))
}

fn open(path: &Path) -> Result<File> {
    File::open(path).map_err(|source| IngestError::Open {
        path: path.display().to_string(),
        source,
    })
}

fn csv_reader<R: Read>(reader: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .flexible(false)
        .from_reader(reader)
}

/// Load the incident table from a CSV file
pub fn load_incidents(path: &Path) -> Result<IncidentTable> {
    let table = read_incidents(open(path)?)?;
    debug!(path = %path.display(), rows = table.len(), "loaded incidents");
    Ok(table)
}

/// Read the incident table from any CSV source
///
/// Rows without a creation timestamp are dropped with a warning.
pub fn read_incidents<R: Read>(reader: R) -> Result<IncidentTable> {
    let mut rdr = csv_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();

    let required = INCIDENT_COLUMNS
        .iter()
        .map(|name| column_index(&headers, name))
        .collect::<Result<Vec<usize>>>()?;
    let (id_idx, priority_idx, created_idx, resolved_idx, app_idx) =
        (required[0], required[1], required[2], required[3], required[4]);

    let extra_idx: Vec<usize> = (0..headers.len())
        .filter(|i| !required.contains(i))
        .collect();
    let layout = ColumnLayout::new(
        headers
            .iter()
            .enumerate()
            .map(|(i, name)| match i {
                _ if i == id_idx => InputColumn::IncidentId,
                _ if i == priority_idx => InputColumn::Priority,
                _ if i == created_idx => InputColumn::CreationDate,
                _ if i == resolved_idx => InputColumn::ResolutionDate,
                _ if i == app_idx => InputColumn::Application,
                _ => InputColumn::Extra(name.clone()),
            })
            .collect(),
    );

    let mut records = Vec::new();
    let mut skipped = 0usize;

    for (idx, result) in rdr.records().enumerate() {
        let record = result?;
        // Header is line 1
        let row = idx + 2;
        let cell = |i: usize| record.get(i).unwrap_or("");

        let timestamp = |i: usize, column: &str| {
            parse_timestamp(cell(i)).ok_or_else(|| IngestError::InvalidTimestamp {
                row,
                column: column.to_string(),
                value: cell(i).to_string(),
            })
        };

        let Some(creation_date) = timestamp(created_idx, CREATION_DATE)? else {
            warn!(row, incident = cell(id_idx), "dropping incident without creation date");
            skipped += 1;
            continue;
        };
        let resolution_date = timestamp(resolved_idx, RESOLUTION_DATE)?;

        records.push(
            IncidentRecord::new(
                cell(id_idx).trim(),
                cell(priority_idx).trim(),
                creation_date,
                resolution_date,
                cell(app_idx).trim(),
            )
            .with_extra(extra_idx.iter().map(|&i| cell(i).to_string()).collect()),
        );
    }

    if skipped > 0 {
        warn!(skipped, "incidents dropped for missing creation date");
    }

    Ok(IncidentTable::with_layout(layout, records))
}

/// Load SLA targets from a CSV file
pub fn load_sla_targets(path: &Path) -> Result<SlaTargets> {
    let targets = read_sla_targets(open(path)?)?;
    debug!(path = %path.display(), priorities = targets.len(), "loaded SLA targets");
    Ok(targets)
}

/// Read SLA targets from any CSV source
pub fn read_sla_targets<R: Read>(reader: R) -> Result<SlaTargets> {
    let mut rdr = csv_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let priority_idx = column_index(&headers, PRIORITY)?;
    let sla_idx = column_index(&headers, SLA)?;

    let mut targets = SlaTargets::new();
    for result in rdr.records() {
        let record = result?;
        let priority = record.get(priority_idx).unwrap_or("").trim().to_string();
        let sla = record.get(sla_idx).unwrap_or("").trim().to_string();

        if targets.insert(priority.clone(), sla).is_some() {
            return Err(IngestError::DuplicatePriority(priority));
        }
    }

    Ok(targets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::incident::YearMonth;

    const INCIDENTS: &str = "\
Incident ID,Priority,Category,Creation Date,Resolution Date,Application
INC001,P1,Network,2024-01-01 08:00:00,2024-01-10 09:30:00,billing
INC002,P2,\"Access, VPN\",2024-01-15,,crm
";

    #[test]
    fn test_parse_timestamp_formats() {
        let expected = NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 7, 0)
            .unwrap();
        for raw in [
            "2024-03-05 14:07:00",
            "2024-03-05T14:07:00",
            "2024-03-05 14:07",
            "2024-03-05T14:07:00Z",
            "2024-03-05T14:07:00+02:00",
            "2024-03-05T14:07:00-05:00",
            "2024-03-05 14:07:00.000",
        ] {
            assert_eq!(parse_timestamp(raw), Some(Some(expected)), "format {raw}");
        }
    }

    #[test]
    fn test_offset_timestamp_keeps_stated_month() {
        let csv = "Incident ID,Priority,Creation Date,Resolution Date,Application\n\
                   INC1,P1,2024-01-31T23:30:00-05:00,2024-02-29T22:00:00+09:00,crm\n";
        let table = read_incidents(csv.as_bytes()).unwrap();
        let record = &table.records[0];

        assert_eq!(YearMonth::of(&record.creation_date), YearMonth::new(2024, 1));
        assert_eq!(record.creation_date.to_string(), "2024-01-31 23:30:00");
        assert_eq!(
            YearMonth::of(&record.resolution_date.unwrap()),
            YearMonth::new(2024, 2)
        );
    }

    #[test]
    fn test_parse_timestamp_bare_date_is_midnight() {
        let ts = parse_timestamp("2024-01-10").unwrap().unwrap();
        assert_eq!(ts.to_string(), "2024-01-10 00:00:00");
    }

    #[test]
    fn test_parse_timestamp_empty_is_missing() {
        assert_eq!(parse_timestamp(""), Some(None));
        assert_eq!(parse_timestamp("   "), Some(None));
    }

    #[test]
    fn test_parse_timestamp_garbage() {
        assert_eq!(parse_timestamp("yesterday"), None);
        assert_eq!(parse_timestamp("2024-13-01"), None);
    }

    #[test]
    fn test_read_incidents() {
        let table = read_incidents(INCIDENTS.as_bytes()).unwrap();

        assert_eq!(table.layout.extra_columns().collect::<Vec<_>>(), vec!["Category"]);
        assert_eq!(table.layout.names().nth(2), Some("Category"));
        assert_eq!(table.len(), 2);

        let first = &table.records[0];
        assert_eq!(first.incident_id, "INC001");
        assert_eq!(first.priority, "P1");
        assert_eq!(first.application, "billing");
        assert_eq!(first.extra, vec!["Network".to_string()]);
        assert!(first.resolution_date.is_some());

        let second = &table.records[1];
        assert_eq!(second.extra, vec!["Access, VPN".to_string()]);
        assert!(second.resolution_date.is_none());
    }

    #[test]
    fn test_read_incidents_missing_column() {
        let csv = "Incident ID,Priority,Creation Date,Application\nINC1,P1,2024-01-01,crm\n";
        match read_incidents(csv.as_bytes()) {
            Err(IngestError::MissingColumn(col)) => assert_eq!(col, RESOLUTION_DATE),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn test_read_incidents_invalid_timestamp() {
        let csv = "Incident ID,Priority,Creation Date,Resolution Date,Application\n\
                   INC1,P1,2024-01-01,soon,crm\n";
        match read_incidents(csv.as_bytes()) {
            Err(IngestError::InvalidTimestamp { row, column, value }) => {
                assert_eq!(row, 2);
                assert_eq!(column, RESOLUTION_DATE);
                assert_eq!(value, "soon");
            }
            other => panic!("expected InvalidTimestamp, got {other:?}"),
        }
    }

    #[test]
    fn test_read_incidents_drops_missing_creation_date() {
        let csv = "Incident ID,Priority,Creation Date,Resolution Date,Application\n\
                   INC1,P1,,2024-01-02,crm\n\
                   INC2,P1,2024-01-01,2024-01-02,crm\n";
        let table = read_incidents(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.records[0].incident_id, "INC2");
    }

    #[test]
    fn test_read_incidents_trims_headers() {
        let csv = " Incident ID , Priority,Creation Date,Resolution Date,Application \n\
                   INC1,P1,2024-01-01,,crm\n";
        let table = read_incidents(csv.as_bytes()).unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.layout, ColumnLayout::default());
    }

    #[test]
    fn test_read_sla_targets() {
        let csv = "Priority,SLA\nP1,0:04:00:00\nP2, 1:00:00:00 \n";
        let targets = read_sla_targets(csv.as_bytes()).unwrap();
        assert_eq!(targets.len(), 2);
        assert_eq!(targets.get("P1"), Some("0:04:00:00"));
        assert_eq!(targets.get("P2"), Some("1:00:00:00"));
    }

    #[test]
    fn test_read_sla_targets_duplicate_priority() {
        let csv = "Priority,SLA\nP1,0:04:00:00\nP1,1:00:00:00\n";
        assert!(matches!(
            read_sla_targets(csv.as_bytes()),
            Err(IngestError::DuplicatePriority(p)) if p == "P1"
        ));
    }

    #[test]
    fn test_read_sla_targets_missing_column() {
        let csv = "Priority,Target\nP1,0:04:00:00\n";
        assert!(matches!(
            read_sla_targets(csv.as_bytes()),
            Err(IngestError::MissingColumn(c)) if c == SLA
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_incidents(Path::new("/nonexistent/incidents.csv")).unwrap_err();
        assert!(matches!(err, IngestError::Open { .. }));
    }
}
