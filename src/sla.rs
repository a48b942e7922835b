//! SLA target durations
//!
//! SLA targets are written as `days:hours:minutes:seconds` strings
//! (e.g. `"0:12:00:00"`). Days may exceed normal calendar bounds.
//!
//! The breach comparison only looks at [`SlaDuration::whole_days`]; the
//! sub-day components are kept for display but do not move the threshold.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

const SECONDS_PER_DAY: u64 = 86_400;

/// Errors produced while parsing an SLA string
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SlaParseError {
    #[error("malformed SLA '{value}': expected 4 ':'-separated fields, got {found}")]
    FieldCount { value: String, found: usize },

    #[error("malformed SLA '{value}': field '{field}' is not a non-negative integer")]
    InvalidField { value: String, field: String },
}

/// Parsed SLA duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlaDuration {
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
    pub seconds: u32,
}

impl SlaDuration {
    pub fn new(days: u32, hours: u32, minutes: u32, seconds: u32) -> Self {
        Self {
            days,
            hours,
            minutes,
            seconds,
        }
    }

    /// Total length in seconds
    pub fn total_seconds(&self) -> u64 {
        u64::from(self.days) * SECONDS_PER_DAY
            + u64::from(self.hours) * 3_600
            + u64::from(self.minutes) * 60
            + u64::from(self.seconds)
    }

    /// Whole days in the duration, floored
    ///
    /// Hour overflow carries into days, so `0:36:00:00` is one whole day.
    pub fn whole_days(&self) -> i64 {
        (self.total_seconds() / SECONDS_PER_DAY) as i64
    }
}

impl FromStr for SlaDuration {
    type Err = SlaParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let fields: Vec<&str> = s.split(':').collect();
        if fields.len() != 4 {
            return Err(SlaParseError::FieldCount {
                value: s.to_string(),
                found: fields.len(),
            });
        }

        let parse = |field: &str| -> Result<u32, SlaParseError> {
            field
                .trim()
                .parse::<u32>()
                .map_err(|_| SlaParseError::InvalidField {
                    value: s.to_string(),
                    field: field.to_string(),
                })
        };

        Ok(Self {
            days: parse(fields[0])?,
            hours: parse(fields[1])?,
            minutes: parse(fields[2])?,
            seconds: parse(fields[3])?,
        })
    }
}

impl fmt::Display for SlaDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{:02}:{:02}:{:02}",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}
