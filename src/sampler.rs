//! Stratified sampling of SLA breaches by creation month
//!
//! Sampling runs in two explicit stages:
//!
//! 1. [`partition_by_creation_month`] keeps breached rows and groups them by
//!    `creation_month` (ascending).
//! 2. [`sample_bucket`] draws at most `sample_size` rows from each bucket,
//!    uniformly and without replacement.
//!
//! A bucket no larger than `sample_size` is returned whole and consumes no
//! randomness, so seeded runs stay reproducible when bucket sizes change
//! elsewhere.

use crate::deriver::{DerivedIncident, DerivedTable};
use crate::incident::YearMonth;
use rand::rngs::StdRng;
use rand::seq::index;
use rand::{Rng, SeedableRng};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::debug;

/// Default per-month sample size
pub const DEFAULT_SAMPLE_SIZE: usize = 1;

/// Errors for breach sampling
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SampleError {
    #[error("Invalid sample size: {0} (must be >= 1)")]
    InvalidSampleSize(usize),
}

pub type Result<T> = std::result::Result<T, SampleError>;

/// Reject a per-month sample size below 1
pub fn validate_sample_size(sample_size: usize) -> Result<()> {
    if sample_size == 0 {
        return Err(SampleError::InvalidSampleSize(sample_size));
    }
    Ok(())
}

/// Group breached rows by creation month
pub fn partition_by_creation_month(
    table: &DerivedTable,
) -> BTreeMap<YearMonth, Vec<&DerivedIncident>> {
    let mut buckets: BTreeMap<YearMonth, Vec<&DerivedIncident>> = BTreeMap::new();
    for row in table.iter().filter(|row| row.sla_breached) {
        buckets.entry(row.creation_month).or_default().push(row);
    }
    buckets
}

/// Draw `min(bucket.len(), sample_size)` rows without replacement
///
/// Selected rows keep their relative bucket order.
pub fn sample_bucket<'a, R: Rng + ?Sized>(
    bucket: &[&'a DerivedIncident],
    sample_size: usize,
    rng: &mut R,
) -> Vec<&'a DerivedIncident> {
    if bucket.len() <= sample_size {
        return bucket.to_vec();
    }

    let mut picked = index::sample(rng, bucket.len(), sample_size).into_vec();
    picked.sort_unstable();
    picked.into_iter().map(|i| bucket[i]).collect()
}

/// Sample breaches per creation month using the caller's generator
pub fn sample_breaches_with_rng<R: Rng + ?Sized>(
    table: &DerivedTable,
    sample_size: usize,
    rng: &mut R,
) -> Result<DerivedTable> {
    validate_sample_size(sample_size)?;

    let mut rows = Vec::new();
    for (month, bucket) in partition_by_creation_month(table) {
        let drawn = sample_bucket(&bucket, sample_size, rng);
        debug!(
            month = %month,
            breached = bucket.len(),
            sampled = drawn.len(),
            "sampled creation-month bucket"
        );
        rows.extend(drawn.into_iter().cloned());
    }

    Ok(DerivedTable::new(table.layout().clone(), rows))
}

/// Sample breaches per creation month with a fresh, unseeded generator
pub fn sample_breaches(table: &DerivedTable, sample_size: usize) -> Result<DerivedTable> {
    StratifiedSampler::new(sample_size)?.sample(table)
}

/// Per-month breach sampler
///
/// Each [`StratifiedSampler::sample`] call builds its own generator, so no
/// two calls share state. With a seed, every call reproduces the same draw.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StratifiedSampler {
    sample_size: usize,
    seed: Option<u64>,
}

impl StratifiedSampler {
    /// Create a sampler drawing at most `sample_size` rows per month
    pub fn new(sample_size: usize) -> Result<Self> {
        validate_sample_size(sample_size)?;
        Ok(Self {
            sample_size,
            seed: None,
        })
    }

    /// Seed the generator for reproducible samples
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn sample_size(&self) -> usize {
        self.sample_size
    }

    pub fn seed(&self) -> Option<u64> {
        self.seed
    }

    pub fn sample(&self, table: &DerivedTable) -> Result<DerivedTable> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        sample_breaches_with_rng(table, self.sample_size, &mut rng)
    }
}

impl Default for StratifiedSampler {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
        }
    }
}
