//! slabreach - Incident SLA compliance analysis
//!
//! This library joins incident records with per-priority SLA targets,
//! derives resolution and breach metrics, and draws stratified per-month
//! samples of SLA breaches for review.

pub mod cli;
pub mod config;
pub mod csv_output;
pub mod deriver;
pub mod incident;
pub mod ingest;
pub mod json_output;
pub mod pipeline;
pub mod sampler;
pub mod sla;
pub mod summary;
