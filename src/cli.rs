//! CLI argument parsing for slabreach

use crate::config::AnalyzerConfig;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Output format for the summary report
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text format (default)
    Text,
    /// JSON format for machine parsing
    Json,
}

#[derive(Parser, Debug)]
#[command(name = "slabreach")]
#[command(version)]
#[command(about = "Incident SLA breach analysis with per-month breach sampling", long_about = None)]
pub struct Cli {
    /// Incident dump CSV (Incident ID, Priority, Creation Date, Resolution Date, Application)
    #[arg(long = "incidents", value_name = "FILE")]
    pub incidents: Option<PathBuf>,

    /// SLA target CSV (Priority, SLA as D:H:M:S)
    #[arg(long = "sla", value_name = "FILE")]
    pub sla: Option<PathBuf>,

    /// Maximum breached incidents sampled per creation month (default: 1)
    #[arg(
        short = 'n',
        long = "sample-size",
        value_name = "N",
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub sample_size: Option<u64>,

    /// Seed for reproducible sampling
    #[arg(long = "seed", value_name = "SEED")]
    pub seed: Option<u64>,

    /// Directory for the full and sampled breach extracts
    #[arg(short = 'o', long = "output-dir", value_name = "DIR")]
    pub output_dir: Option<PathBuf>,

    /// Summary output format
    #[arg(long = "format", value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// TOML configuration file (flags override its values)
    #[arg(long = "config", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable debug logging to stderr
    #[arg(long = "debug")]
    pub debug: bool,
}

impl Cli {
    /// Overlay command-line flags onto a base configuration
    pub fn apply_to(&self, mut config: AnalyzerConfig) -> AnalyzerConfig {
        if let Some(path) = &self.incidents {
            config.incidents = Some(path.clone());
        }
        if let Some(path) = &self.sla {
            config.sla = Some(path.clone());
        }
        if let Some(size) = self.sample_size {
            config.sample_size = usize::try_from(size).unwrap_or(usize::MAX);
        }
        if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_inputs() {
        let cli = Cli::parse_from(["slabreach", "--incidents", "im.csv", "--sla", "sla.csv"]);
        assert_eq!(cli.incidents, Some(PathBuf::from("im.csv")));
        assert_eq!(cli.sla, Some(PathBuf::from("sla.csv")));
        assert_eq!(cli.format, OutputFormat::Text);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_sample_size_default_unset() {
        let cli = Cli::parse_from(["slabreach"]);
        assert!(cli.sample_size.is_none());
        let config = cli.apply_to(AnalyzerConfig::default());
        assert_eq!(config.sample_size, 1);
    }

    #[test]
    fn test_cli_sample_size_custom() {
        let cli = Cli::parse_from(["slabreach", "-n", "3"]);
        assert_eq!(cli.sample_size, Some(3));
    }

    #[test]
    fn test_cli_sample_size_zero_rejected() {
        assert!(Cli::try_parse_from(["slabreach", "--sample-size", "0"]).is_err());
    }

    #[test]
    fn test_cli_json_format() {
        let cli = Cli::parse_from(["slabreach", "--format", "json"]);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_flags_override_config() {
        let base = AnalyzerConfig {
            sample_size: 7,
            seed: Some(1),
            ..AnalyzerConfig::default()
        };
        let cli = Cli::parse_from(["slabreach", "--seed", "99", "-o", "reports"]);
        let config = cli.apply_to(base);

        assert_eq!(config.sample_size, 7);
        assert_eq!(config.seed, Some(99));
        assert_eq!(config.output_dir, PathBuf::from("reports"));
    }
}
