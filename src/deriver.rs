//! Metric derivation: SLA join and breach classification
//!
//! Left-joins incidents with SLA targets on priority and derives, per row:
//!
//! | Field | Value |
//! |-------|-------|
//! | `resolution_days` | resolution - creation, whole days truncated toward zero |
//! | `sla_duration` | parsed SLA target for the priority |
//! | `breach_days` | `resolution_days - sla_duration.whole_days()` |
//! | `creation_month` / `resolution_month` | `YYYY-MM` buckets |
//! | `sla_breached` | `breach_days >= 1` |
//!
//! Missing inputs (no resolution date, unmatched priority) propagate as
//! `None` and classify as not breached.
//!
//! Precondition: every incident has a creation timestamp. Ingest drops rows
//! without one before they reach this module.

use crate::incident::{ColumnLayout, IncidentRecord, IncidentTable, SlaTargets, YearMonth};
use crate::sla::{SlaDuration, SlaParseError};
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, info};

/// Errors for metric derivation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DeriveError {
    #[error("SLA target for priority '{priority}' is malformed: {source}")]
    MalformedSla {
        priority: String,
        #[source]
        source: SlaParseError,
    },
}

pub type Result<T> = std::result::Result<T, DeriveError>;

/// An incident with its SLA metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedIncident {
    pub record: IncidentRecord,
    pub sla_duration: Option<SlaDuration>,
    pub resolution_days: Option<i64>,
    pub breach_days: Option<i64>,
    pub creation_month: YearMonth,
    pub resolution_month: Option<YearMonth>,
    pub sla_breached: bool,
}

impl DerivedIncident {
    /// Derive metrics for one record against its (optional) SLA target
    pub fn from_record(record: IncidentRecord, sla_duration: Option<SlaDuration>) -> Self {
        let resolution_days = record
            .resolution_date
            .map(|resolved| (resolved - record.creation_date).num_days());
        let breach_days = match (resolution_days, sla_duration) {
            (Some(days), Some(sla)) => Some(days - sla.whole_days()),
            _ => None,
        };
        let creation_month = YearMonth::of(&record.creation_date);
        let resolution_month = record.resolution_date.as_ref().map(YearMonth::of);

        Self {
            sla_breached: is_breach(breach_days),
            record,
            sla_duration,
            resolution_days,
            breach_days,
            creation_month,
            resolution_month,
        }
    }
}

/// `true` iff the breach amount is at least one whole day
pub fn is_breach(breach_days: Option<i64>) -> bool {
    matches!(breach_days, Some(days) if days >= 1)
}

/// Immutable output of [`derive`]: one row per input incident
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DerivedTable {
    layout: ColumnLayout,
    rows: Vec<DerivedIncident>,
}

impl DerivedTable {
    pub fn new(layout: ColumnLayout, rows: Vec<DerivedIncident>) -> Self {
        Self { layout, rows }
    }

    /// Input column layout the rows were read with
    pub fn layout(&self) -> &ColumnLayout {
        &self.layout
    }

    pub fn extra_columns(&self) -> impl Iterator<Item = &str> {
        self.layout.extra_columns()
    }

    pub fn rows(&self) -> &[DerivedIncident] {
        &self.rows
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DerivedIncident> {
        self.rows.iter()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Full breach extract: every breached row, in input order
    pub fn breaches(&self) -> DerivedTable {
        self.filtered(|row| row.sla_breached)
    }

    /// New table with the same columns and the rows matching `keep`
    pub fn filtered<F>(&self, keep: F) -> DerivedTable
    where
        F: Fn(&DerivedIncident) -> bool,
    {
        DerivedTable {
            layout: self.layout.clone(),
            rows: self.rows.iter().filter(|row| keep(row)).cloned().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a DerivedTable {
    type Item = &'a DerivedIncident;
    type IntoIter = std::slice::Iter<'a, DerivedIncident>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}

/// Parse every SLA target up front
///
/// A malformed entry fails the whole derivation, even if no incident
/// references its priority.
pub fn parse_targets(targets: &SlaTargets) -> Result<HashMap<&str, SlaDuration>> {
    targets
        .iter()
        .map(|(priority, raw)| {
            raw.parse::<SlaDuration>()
                .map(|sla| (priority.as_str(), sla))
                .map_err(|source| DeriveError::MalformedSla {
                    priority: priority.clone(),
                    source,
                })
        })
        .collect()
}

/// Join incidents with SLA targets and derive breach metrics
pub fn derive(incidents: &IncidentTable, sla_targets: &SlaTargets) -> Result<DerivedTable> {
    let parsed = parse_targets(sla_targets)?;

    let mut unmatched = 0usize;
    let rows: Vec<DerivedIncident> = incidents
        .records
        .iter()
        .map(|record| {
            let sla = parsed.get(record.priority.as_str()).copied();
            if sla.is_none() {
                unmatched += 1;
                debug!(
                    incident = %record.incident_id,
                    priority = %record.priority,
                    "no SLA target for priority"
                );
            }
            DerivedIncident::from_record(record.clone(), sla)
        })
        .collect();

    let breached = rows.iter().filter(|row| row.sla_breached).count();
    info!(
        incidents = rows.len(),
        breached,
        unmatched,
        "derived SLA metrics"
    );

    Ok(DerivedTable::new(incidents.layout.clone(), rows))
}
