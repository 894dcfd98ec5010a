//! Command dispatcher that routes parsed clap commands to the dashboards.
//!
//! One-shot commands render once and map any dashboard error to exit status
//! 1. `interactive` hands the same rendering functions to the REPL session.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::process::ExitCode;
use tracing::{debug, info};

use crate::cli::formatters::{
    format_error, format_error_json, format_portfolio_json, format_portfolio_report,
    format_projection_json, format_projection_report,
};
use crate::cli::{Cli, Commands, PortfolioArgs, ProjectionArgs};
use crate::config::{Config, DisplayConfig};
use crate::dashboard::inputs::parse_allocation;
use crate::dashboard::{
    run_portfolio, run_projection, DashboardKind, PortfolioInputs, ProjectionInputs,
};
use crate::error::DashboardError;
use crate::market::parse_symbol_list;
use crate::sources::{PriceSource, Source};

/// How a render is printed
#[derive(Debug, Clone, PartialEq)]
pub struct OutputOptions {
    pub json: bool,
    pub display: DisplayConfig,
}

/// Today's date in local time; the default end of every date range
pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

/// Load config and apply the `--data-dir` flag on top of file and env
pub fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    if let Some(dir) = &cli.data_dir {
        config.use_data_dir(dir.clone());
    }
    Ok(config)
}

/// Route a parsed command line
pub async fn dispatch(cli: Cli) -> Result<ExitCode> {
    let config = load_config(&cli)?;
    let source = Source::from_config(&config).context("Failed to set up the price source")?;
    info!("Using {} price source", source.name());

    let output = OutputOptions {
        json: cli.json,
        display: config.display.clone(),
    };
    let today = today();

    let rendered = match cli.command {
        Commands::Stocks(args) => {
            dispatch_portfolio(&source, DashboardKind::Stocks, &args, today, &output).await
        }
        Commands::Crypto(args) => {
            dispatch_portfolio(&source, DashboardKind::Crypto, &args, today, &output).await
        }
        Commands::Fund(args) => {
            dispatch_projection(&source, DashboardKind::Fund, &args, today, &output).await
        }
        Commands::Currency(args) => {
            dispatch_projection(&source, DashboardKind::Currency, &args, today, &output).await
        }
        Commands::Interactive { dashboard } => {
            crate::ui::launch_session(&source, dashboard, &config).await?;
            return Ok(ExitCode::SUCCESS);
        }
    };

    match rendered {
        Ok(text) => {
            println!("{}", text);
            Ok(ExitCode::SUCCESS)
        }
        Err(err) => {
            debug!("Render failed: {:?}", err);
            if output.json {
                println!("{}", format_error_json(&err));
            } else {
                eprint!("{}", format_error(&err));
            }
            Ok(ExitCode::FAILURE)
        }
    }
}

/// Portfolio inputs from the command line, falling back to dashboard defaults
pub fn portfolio_inputs(
    kind: DashboardKind,
    args: &PortfolioArgs,
    today: NaiveDate,
) -> Result<PortfolioInputs, DashboardError> {
    let mut inputs = PortfolioInputs::defaults(kind, today);
    if let Some(symbols) = &args.symbols {
        inputs.symbols = parse_symbol_list(symbols);
    }
    if let Some(from) = args.from {
        inputs.from = from;
    }
    if let Some(to) = args.to {
        inputs.to = to;
    }
    if let Some(threshold) = args.threshold {
        inputs.threshold = threshold;
    }
    for spec in &args.allocations {
        let (symbol, percent) = parse_allocation(spec)?;
        inputs.set_allocation(&symbol, percent)?;
    }
    Ok(inputs)
}

/// Projection inputs from the command line, falling back to dashboard defaults
pub fn projection_inputs(
    kind: DashboardKind,
    args: &ProjectionArgs,
    today: NaiveDate,
) -> ProjectionInputs {
    let mut inputs = ProjectionInputs::defaults(kind, today);
    if let Some(symbol) = &args.symbol {
        inputs.symbol = symbol.clone();
    }
    if let Some(amount) = args.amount {
        inputs.amount = amount;
    }
    if let Some(years) = args.years {
        inputs.years = years;
    }
    if let Some(end_date) = args.end_date {
        inputs.end_date = end_date;
    }
    inputs
}

async fn dispatch_portfolio<S: PriceSource>(
    source: &S,
    kind: DashboardKind,
    args: &PortfolioArgs,
    today: NaiveDate,
    output: &OutputOptions,
) -> Result<String, DashboardError> {
    let inputs = portfolio_inputs(kind, args, today)?;
    render_portfolio(source, kind, &inputs, output).await
}

async fn dispatch_projection<S: PriceSource>(
    source: &S,
    kind: DashboardKind,
    args: &ProjectionArgs,
    today: NaiveDate,
    output: &OutputOptions,
) -> Result<String, DashboardError> {
    let inputs = projection_inputs(kind, args, today);
    render_projection(source, kind, &inputs, output).await
}

/// Run one portfolio render cycle and format it
pub async fn render_portfolio<S: PriceSource>(
    source: &S,
    kind: DashboardKind,
    inputs: &PortfolioInputs,
    output: &OutputOptions,
) -> Result<String, DashboardError> {
    let report = run_portfolio(source, kind, inputs).await?;
    if output.json {
        Ok(format_portfolio_json(&report))
    } else {
        Ok(format_portfolio_report(
            &report,
            &kind.profile(),
            output.display.table_rows,
            output.display.chart_width,
        ))
    }
}

/// Run one projection render cycle and format it
pub async fn render_projection<S: PriceSource>(
    source: &S,
    kind: DashboardKind,
    inputs: &ProjectionInputs,
    output: &OutputOptions,
) -> Result<String, DashboardError> {
    let report = run_projection(source, kind, inputs).await?;
    if output.json {
        Ok(format_projection_json(&report))
    } else {
        Ok(format_projection_report(
            &report,
            &kind.profile(),
            output.display.chart_width,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    fn parse(args: &[&str]) -> Cli {
        let mut argv = vec!["marketdash"];
        argv.extend_from_slice(args);
        Cli::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_portfolio_inputs_from_args() {
        let cli = parse(&[
            "crypto",
            "btc-usd, sol-usd",
            "--alloc",
            "SOL-USD=50",
            "--threshold",
            "500",
        ]);
        let Commands::Crypto(args) = cli.command else {
            panic!("expected crypto");
        };

        let inputs = portfolio_inputs(DashboardKind::Crypto, &args, today()).unwrap();
        assert_eq!(inputs.symbols, vec!["BTC-USD", "SOL-USD"]);
        assert_eq!(inputs.allocations.get("SOL-USD"), Some(&50));
        assert_eq!(inputs.threshold, dec!(500));
        assert_eq!(inputs.to, today());
    }

    #[test]
    fn test_portfolio_inputs_reject_bad_allocation() {
        let cli = parse(&["stocks", "--alloc", "AAPL=120"]);
        let Commands::Stocks(args) = cli.command else {
            panic!("expected stocks");
        };
        let err = portfolio_inputs(DashboardKind::Stocks, &args, today()).unwrap_err();
        assert_eq!(err.kind(), "invalid_input");
    }

    #[test]
    fn test_projection_inputs_defaults() {
        let cli = parse(&["currency"]);
        let Commands::Currency(args) = cli.command else {
            panic!("expected currency");
        };
        let inputs = projection_inputs(DashboardKind::Currency, &args, today());
        assert_eq!(inputs.symbol, "INR");
        assert_eq!(inputs.amount, 10_000);
        assert_eq!(inputs.years, 5);
        assert_eq!(inputs.end_date, today());
    }

    #[test]
    fn test_data_dir_flag_selects_csv_source() {
        let tmp = tempfile::tempdir().unwrap();
        let config_path = tmp.path().join("config.toml");
        std::fs::write(&config_path, "[display]\ntable_rows = 3\n").unwrap();

        let cli = parse(&[
            "--config",
            config_path.to_str().unwrap(),
            "--data-dir",
            tmp.path().to_str().unwrap(),
            "stocks",
        ]);
        let config = load_config(&cli).unwrap();
        assert_eq!(config.display.table_rows, 3);
        assert_eq!(config.source.data_dir.as_deref(), Some(tmp.path()));
        assert_eq!(Source::from_config(&config).unwrap().name(), "CSV directory");
    }
}
