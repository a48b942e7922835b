use anyhow::Result;
use clap::Parser;
use slabreach::cli::{Cli, OutputFormat};
use slabreach::config::AnalyzerConfig;
use slabreach::pipeline;
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::DEBUG.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let base = match &args.config {
        Some(path) => AnalyzerConfig::from_file(path)?,
        None => AnalyzerConfig::default(),
    };
    let config = args.apply_to(base);

    if config.incidents.is_none() || config.sla.is_none() {
        anyhow::bail!(
            "Both input files are required. Usage: slabreach --incidents FILE --sla FILE [-n N]"
        );
    }

    let outcome = pipeline::run_analysis(&config)?;

    match args.format {
        OutputFormat::Text => {
            print!("{}", outcome.summary.render_text());
            println!();
            println!(
                "Full SLA breaches:    {} rows -> {}",
                outcome.full_breaches.len(),
                outcome.full_extract_path.display()
            );
            println!(
                "Sampled SLA breaches: {} rows -> {}",
                outcome.sampled_breaches.len(),
                outcome.sampled_extract_path.display()
            );
        }
        OutputFormat::Json => {
            println!("{}", outcome.to_json_output(&config).to_json()?);
        }
    }

    Ok(())
}
