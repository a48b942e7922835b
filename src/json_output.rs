//! JSON output format for analysis reports

use crate::summary::SummaryReport;
use serde::Serialize;

/// Where an extract was written and how many rows it holds
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonExtract {
    pub path: String,
    pub rows: usize,
}

/// Sampling parameters used for the sampled extract
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JsonSampling {
    pub sample_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub format: String,
    pub summary: SummaryReport,
    pub sampling: JsonSampling,
    pub full_extract: JsonExtract,
    pub sampled_extract: JsonExtract,
}

impl JsonOutput {
    pub fn new(
        summary: SummaryReport,
        sampling: JsonSampling,
        full_extract: JsonExtract,
        sampled_extract: JsonExtract,
    ) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            format: "slabreach-json-v1".to_string(),
            summary,
            sampling,
            full_extract,
            sampled_extract,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
