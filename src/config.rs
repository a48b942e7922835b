//! Analyzer configuration
//!
//! Settings can come from a TOML file; command-line flags override the
//! file. Every field has a default, so an empty file is valid.
//!
//! ```toml
//! sample_size = 3
//! seed = 42
//! output_dir = "reports"
//! ```

use crate::sampler::DEFAULT_SAMPLE_SIZE;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors for configuration loading and validation
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for one analysis run
///
/// # Example
/// ```
/// use slabreach::config::AnalyzerConfig;
///
/// let config = AnalyzerConfig::default();
/// assert_eq!(config.sample_size, 1);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Incident CSV file
    pub incidents: Option<PathBuf>,

    /// SLA target CSV file
    pub sla: Option<PathBuf>,

    /// Maximum breached incidents sampled per creation month
    pub sample_size: usize,

    /// Seed for reproducible sampling; entropy when absent
    pub seed: Option<u64>,

    /// Directory receiving both extracts
    pub output_dir: PathBuf,

    /// File name of the full breach extract
    pub full_extract_name: String,

    /// File name of the sampled breach extract
    pub sampled_extract_name: String,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            incidents: None,
            sla: None,
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: None,
            output_dir: PathBuf::from("."),
            full_extract_name: "full_sla_breaches.csv".to_string(),
            sampled_extract_name: "sampled_sla_breaches.csv".to_string(),
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn full_extract_path(&self) -> PathBuf {
        self.output_dir.join(&self.full_extract_name)
    }

    pub fn sampled_extract_path(&self) -> PathBuf {
        self.output_dir.join(&self.sampled_extract_name)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sample_size < 1 {
            return Err(ConfigError::Invalid(format!(
                "sample_size must be >= 1, got {}",
                self.sample_size
            )));
        }

        for (field, name) in [
            ("full_extract_name", &self.full_extract_name),
            ("sampled_extract_name", &self.sampled_extract_name),
        ] {
            if name.trim().is_empty() {
                return Err(ConfigError::Invalid(format!("{} must not be empty", field)));
            }
        }

        if self.full_extract_name == self.sampled_extract_name {
            return Err(ConfigError::Invalid(format!(
                "full and sampled extracts would both be written to '{}'",
                self.full_extract_name
            )));
        }

        Ok(())
    }
}
