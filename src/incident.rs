//! Typed incident and SLA target tables

use crate::ingest::{APPLICATION, CREATION_DATE, INCIDENT_ID, PRIORITY, RESOLUTION_DATE};
use chrono::{Datelike, NaiveDateTime};
use serde::{Serialize, Serializer};
use std::collections::btree_map;
use std::collections::BTreeMap;
use std::fmt;

/// Calendar month bucket (year + month), rendered `YYYY-MM`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl YearMonth {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    /// Month containing the given timestamp
    pub fn of(ts: &NaiveDateTime) -> Self {
        Self {
            year: ts.year(),
            month: ts.month(),
        }
    }
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl Serialize for YearMonth {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A single incident row
///
/// `extra` holds the values of every non-required input column, in the
/// order they appear in the table's [`ColumnLayout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentRecord {
    pub incident_id: String,
    pub priority: String,
    pub creation_date: NaiveDateTime,
    pub resolution_date: Option<NaiveDateTime>,
    pub application: String,
    pub extra: Vec<String>,
}

impl IncidentRecord {
    pub fn new(
        incident_id: impl Into<String>,
        priority: impl Into<String>,
        creation_date: NaiveDateTime,
        resolution_date: Option<NaiveDateTime>,
        application: impl Into<String>,
    ) -> Self {
        Self {
            incident_id: incident_id.into(),
            priority: priority.into(),
            creation_date,
            resolution_date,
            application: application.into(),
            extra: Vec::new(),
        }
    }

    pub fn with_extra(mut self, extra: Vec<String>) -> Self {
        self.extra = extra;
        self
    }
}

/// One input column, by header position
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputColumn {
    IncidentId,
    Priority,
    CreationDate,
    ResolutionDate,
    Application,
    /// Pass-through column, written to the extracts untouched
    Extra(String),
}

impl InputColumn {
    pub fn name(&self) -> &str {
        match self {
            Self::IncidentId => INCIDENT_ID,
            Self::Priority => PRIORITY,
            Self::CreationDate => CREATION_DATE,
            Self::ResolutionDate => RESOLUTION_DATE,
            Self::Application => APPLICATION,
            Self::Extra(name) => name.as_str(),
        }
    }
}

/// Input header layout, in file order
///
/// Extracts reproduce this order, so pass-through columns stay where the
/// source file put them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnLayout {
    columns: Vec<InputColumn>,
}

impl ColumnLayout {
    pub fn new(columns: Vec<InputColumn>) -> Self {
        Self { columns }
    }

    /// Required columns first, then `extras` in the given order
    pub fn with_extras<I, S>(extras: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut columns = vec![
            InputColumn::IncidentId,
            InputColumn::Priority,
            InputColumn::CreationDate,
            InputColumn::ResolutionDate,
            InputColumn::Application,
        ];
        columns.extend(extras.into_iter().map(|name| InputColumn::Extra(name.into())));
        Self { columns }
    }

    pub fn columns(&self) -> &[InputColumn] {
        &self.columns
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(InputColumn::name)
    }

    pub fn extra_columns(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().filter_map(|column| match column {
            InputColumn::Extra(name) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl Default for ColumnLayout {
    fn default() -> Self {
        Self::with_extras(std::iter::empty::<String>())
    }
}

/// Incident rows plus the input column layout
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IncidentTable {
    pub layout: ColumnLayout,
    pub records: Vec<IncidentRecord>,
}

impl IncidentTable {
    pub fn new(records: Vec<IncidentRecord>) -> Self {
        Self {
            layout: ColumnLayout::default(),
            records,
        }
    }

    pub fn with_layout(layout: ColumnLayout, records: Vec<IncidentRecord>) -> Self {
        Self { layout, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Priority -> raw SLA string
///
/// Strings are kept unparsed; the deriver parses them so a malformed
/// target surfaces as a derivation failure.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SlaTargets {
    targets: BTreeMap<String, String>,
}

impl SlaTargets {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a target, returning the previous SLA string for the priority
    pub fn insert(
        &mut self,
        priority: impl Into<String>,
        sla: impl Into<String>,
    ) -> Option<String> {
        self.targets.insert(priority.into(), sla.into())
    }

    pub fn get(&self, priority: &str) -> Option<&str> {
        self.targets.get(priority).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.targets.iter()
    }
}

impl<P: Into<String>, S: Into<String>> FromIterator<(P, S)> for SlaTargets {
    fn from_iter<I: IntoIterator<Item = (P, S)>>(iter: I) -> Self {
        let mut targets = Self::new();
        for (priority, sla) in iter {
            targets.insert(priority, sla);
        }
        targets
    }
}
