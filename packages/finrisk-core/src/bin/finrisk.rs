//! FinRisk CLI - Command line interface for portfolio risk analysis.
//!
//! Every command prints a JSON `ApiResponse` envelope on stdout. Logs go to
//! stderr and are filtered with `RUST_LOG`.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use finrisk_core::{
    analyze,
    loader::{read_benchmark_csv, read_price_csv, select_columns},
    portfolio::validate_weights,
    report::write_report,
    ApiResponse, PriceTable, RiskConfig,
};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "finrisk")]
#[command(about = "FinRisk CLI - portfolio risk metrics and stress testing")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full risk analysis
    Analyze {
        /// Price CSV (Date column plus one column per asset)
        #[arg(short, long)]
        prices: PathBuf,
        /// Benchmark price CSV
        #[arg(short, long)]
        benchmark: PathBuf,
        /// Benchmark column name, if the file has more than one price column
        #[arg(long)]
        benchmark_column: Option<String>,
        /// Config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Also write the report to this JSON file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show the effective configuration
    Config {
        /// Config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Check configured weights against a price file
    Weights {
        /// Price CSV (Date column plus one column per asset)
        #[arg(short, long)]
        prices: PathBuf,
        /// Config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Analyze {
            prices,
            benchmark,
            benchmark_column,
            config,
            output,
        } => handle_analyze(
            &prices,
            &benchmark,
            benchmark_column.as_deref(),
            config.as_deref(),
            output.as_deref(),
        ),
        Commands::Config { config } => handle_config(config.as_deref()),
        Commands::Weights { prices, config } => handle_weights(&prices, config.as_deref()),
    };

    match result {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            println!("{}", render(&ApiResponse::<()>::err(format!("{:#}", e))));
            ExitCode::FAILURE
        }
    }
}

fn handle_analyze(
    prices: &Path,
    benchmark: &Path,
    benchmark_column: Option<&str>,
    config: Option<&Path>,
    output: Option<&Path>,
) -> Result<String> {
    let config = RiskConfig::load_or_default(config).context("failed to load configuration")?;
    let table = read_price_csv(prices)
        .with_context(|| format!("failed to read prices from {}", prices.display()))?;
    let benchmark_prices = read_benchmark_csv(benchmark, benchmark_column)
        .with_context(|| format!("failed to read benchmark from {}", benchmark.display()))?;

    let table = configured_universe(table, &config)?;

    let analysis = analyze(&table, &benchmark_prices, &config).context("risk analysis failed")?;
    if let Some(path) = output {
        write_report(path, &analysis.report)
            .with_context(|| format!("failed to write report to {}", path.display()))?;
    }

    Ok(render(&ApiResponse::ok(&analysis.report)))
}

fn handle_config(config: Option<&Path>) -> Result<String> {
    let path = config
        .map(Path::to_path_buf)
        .unwrap_or_else(RiskConfig::default_path);
    let loaded = RiskConfig::load_or_default(config).context("failed to load configuration")?;

    Ok(render(&ApiResponse::ok(json!({
        "path": path,
        "exists": path.exists(),
        "config": loaded,
    }))))
}

fn handle_weights(prices: &Path, config: Option<&Path>) -> Result<String> {
    let config = RiskConfig::load_or_default(config).context("failed to load configuration")?;
    let table = read_price_csv(prices)
        .with_context(|| format!("failed to read prices from {}", prices.display()))?;

    let table = configured_universe(table, &config)?;

    validate_weights(&config.weights, table.assets())?;

    Ok(render(&ApiResponse::ok(json!({
        "assets": table.assets(),
        "weights": config.weights,
        "sum": config.weights.sum(),
    }))))
}

/// Narrow a price file to the configured assets; extra columns are ignored.
fn configured_universe(table: PriceTable, config: &RiskConfig) -> Result<PriceTable> {
    if config.weights.is_empty() {
        return Ok(table);
    }
    let universe: Vec<&str> = config.weights.assets().collect();
    select_columns(&table, &universe).context("configured assets missing from price file")
}

fn render<T: Serialize>(response: &ApiResponse<T>) -> String {
    serde_json::to_string_pretty(response).unwrap_or_else(|e| {
        format!(r#"{{"ok":false,"error":"failed to serialize response: {}"}}"#, e)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use finrisk_core::loader::parse_price_csv;

    const PRICES: &str = "\
Date,AAA,BBB,CCC
2024-01-02,100.0,50.0,20.0
2024-01-03,101.0,49.5,20.4
";

    #[test]
    fn test_extra_price_columns_are_ignored() {
        let table = parse_price_csv(PRICES.as_bytes()).unwrap();
        let config = RiskConfig {
            weights: [("AAA", 0.6), ("BBB", 0.4)].into_iter().collect(),
            ..RiskConfig::default()
        };

        let selected = configured_universe(table, &config).unwrap();
        assert_eq!(selected.assets(), ["AAA", "BBB"]);
        assert!(validate_weights(&config.weights, selected.assets()).is_ok());
    }

    #[test]
    fn test_missing_configured_asset_fails() {
        let table = parse_price_csv(PRICES.as_bytes()).unwrap();
        let config = RiskConfig {
            weights: [("AAA", 0.5), ("ZZZ", 0.5)].into_iter().collect(),
            ..RiskConfig::default()
        };
        assert!(configured_universe(table, &config).is_err());
    }

    #[test]
    fn test_empty_weights_keep_every_column() {
        let table = parse_price_csv(PRICES.as_bytes()).unwrap();
        let selected = configured_universe(table, &RiskConfig::default()).unwrap();
        assert_eq!(selected.asset_count(), 3);
    }
}
