//! Medallion CLI — run the bronze/silver/gold pipeline stage by stage.
//!
//! Commands:
//! - `ingest` — fetch configured tickers into the bronze layer
//! - `transform` — clean bronze files into the silver layer
//! - `metrics` — add daily return and volatility (gold layer)
//! - `load` — load gold files into SQLite
//! - `report` — chart the report symbol's recent closes
//! - `run` — all of the above in order (the default)
//! - `status` — list what each layer holds

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use medallion_core::data::{CircuitBreaker, DataProvider, SyntheticProvider, YahooProvider};
use medallion_report::{render_dashboard, ReportOptions};
use medallion_runner::{
    collect_status, run_ingest, run_load, run_metrics, run_pipeline, run_transform,
    PipelineConfig, StageSummary,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "medallion",
    version,
    about = "Medallion — bronze/silver/gold market data pipeline"
)]
struct Cli {
    /// Path to a TOML config file. Missing file means defaults.
    #[arg(long, global = true, default_value = "medallion.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch raw prices for the configured tickers (bronze).
    Ingest {
        /// Generate deterministic synthetic prices instead of calling Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Normalize headers and drop rows with missing values (silver).
    Transform,
    /// Compute daily return and 7-day volatility (gold).
    Metrics,
    /// Load gold files into the SQLite database.
    Load,
    /// Render the market summary chart.
    Report,
    /// Run every stage in order.
    Run {
        /// Generate deterministic synthetic prices instead of calling Yahoo Finance.
        #[arg(long, default_value_t = false)]
        synthetic: bool,
    },
    /// Show the files in each layer and the tables in the database.
    Status,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::from_file(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;

    match cli.command.unwrap_or(Commands::Run { synthetic: false }) {
        Commands::Ingest { synthetic } => {
            let provider = build_provider(synthetic)?;
            print_summary(&run_ingest(&config, provider.as_ref(), today())?);
        }
        Commands::Transform => print_summary(&run_transform(&config)?),
        Commands::Metrics => print_summary(&run_metrics(&config)?),
        Commands::Load => print_summary(&run_load(&config)?),
        Commands::Report => run_report(&config)?,
        Commands::Run { synthetic } => {
            let provider = build_provider(synthetic)?;
            for summary in run_pipeline(&config, provider.as_ref(), today())? {
                print_summary(&summary);
            }
            run_report(&config)?;
        }
        Commands::Status => {
            let status = collect_status(&config).context("collecting pipeline status")?;
            print!("{status}");
        }
    }

    Ok(())
}

fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

fn build_provider(synthetic: bool) -> Result<Box<dyn DataProvider>> {
    if synthetic {
        tracing::warn!("using synthetic prices");
        return Ok(Box::new(SyntheticProvider::new()));
    }
    let circuit_breaker = Arc::new(CircuitBreaker::default_provider());
    let provider = YahooProvider::new(circuit_breaker).context("building Yahoo provider")?;
    Ok(Box::new(provider))
}

fn run_report(config: &PipelineConfig) -> Result<()> {
    let options = ReportOptions {
        symbol: config.report.symbol.clone(),
        tail: config.report.tail,
        width: config.report.width,
        height: config.report.height,
    };
    let path = render_dashboard(&config.database, &config.reports_dir, &options)
        .with_context(|| format!("rendering report for {}", options.symbol))?;
    println!("Report saved to: {}", path.display());
    Ok(())
}

fn print_summary(summary: &StageSummary) {
    println!("{summary}");
    for name in &summary.skipped {
        println!("  skipped {name}");
    }
    for (input, error) in &summary.failures {
        println!("  failed  {input}: {error}");
    }
}
