//! End-to-end analysis run
//!
//! load -> derive -> summarize -> full extract -> stratified sample ->
//! write both extracts. Any failure aborts the run before extracts are
//! written.

use crate::config::AnalyzerConfig;
use crate::csv_output::write_extract_file;
use crate::deriver::{derive, DerivedTable};
use crate::ingest::{load_incidents, load_sla_targets};
use crate::json_output::{JsonExtract, JsonOutput, JsonSampling};
use crate::sampler::StratifiedSampler;
use crate::summary::{summarize, SummaryReport};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// Everything produced by one analysis run
#[derive(Debug, Clone)]
pub struct AnalysisOutcome {
    pub derived: DerivedTable,
    pub full_breaches: DerivedTable,
    pub sampled_breaches: DerivedTable,
    pub summary: SummaryReport,
    pub full_extract_path: PathBuf,
    pub sampled_extract_path: PathBuf,
}

impl AnalysisOutcome {
    /// JSON report for this outcome
    pub fn to_json_output(&self, config: &AnalyzerConfig) -> JsonOutput {
        JsonOutput::new(
            self.summary.clone(),
            JsonSampling {
                sample_size: config.sample_size,
                seed: config.seed,
            },
            JsonExtract {
                path: self.full_extract_path.display().to_string(),
                rows: self.full_breaches.len(),
            },
            JsonExtract {
                path: self.sampled_extract_path.display().to_string(),
                rows: self.sampled_breaches.len(),
            },
        )
    }
}

fn required<'a>(path: &'a Option<PathBuf>, what: &str) -> Result<&'a Path> {
    path.as_deref()
        .with_context(|| format!("No {} file given (use --{} or the config file)", what, what))
}

/// Run the analysis described by `config`
pub fn run_analysis(config: &AnalyzerConfig) -> Result<AnalysisOutcome> {
    config.validate()?;
    let incidents_path = required(&config.incidents, "incidents")?;
    let sla_path = required(&config.sla, "sla")?;

    let incidents = load_incidents(incidents_path)
        .with_context(|| format!("Failed to load incidents from {}", incidents_path.display()))?;
    let targets = load_sla_targets(sla_path)
        .with_context(|| format!("Failed to load SLA targets from {}", sla_path.display()))?;

    let derived = derive(&incidents, &targets)?;
    let summary = summarize(&derived);
    let full_breaches = derived.breaches();

    let mut sampler = StratifiedSampler::new(config.sample_size)?;
    if let Some(seed) = config.seed {
        sampler = sampler.with_seed(seed);
    }
    let sampled_breaches = sampler.sample(&derived)?;

    std::fs::create_dir_all(&config.output_dir).with_context(|| {
        format!("Failed to create output directory {}", config.output_dir.display())
    })?;
    let full_extract_path = config.full_extract_path();
    let sampled_extract_path = config.sampled_extract_path();
    write_extract_file(&full_extract_path, &full_breaches)
        .with_context(|| format!("Failed to write {}", full_extract_path.display()))?;
    write_extract_file(&sampled_extract_path, &sampled_breaches)
        .with_context(|| format!("Failed to write {}", sampled_extract_path.display()))?;

    info!(
        incidents = derived.len(),
        breaches = full_breaches.len(),
        sampled = sampled_breaches.len(),
        "analysis complete"
    );

    Ok(AnalysisOutcome {
        derived,
        full_breaches,
        sampled_breaches,
        summary,
        full_extract_path,
        sampled_extract_path,
    })
}
