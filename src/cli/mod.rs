use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::dashboard::DashboardKind;

pub mod formatters;

#[derive(Parser)]
#[command(name = "marketdash")]
#[command(version, about = "Terminal market dashboards for stocks, crypto, funds and currencies")]
#[command(
    long_about = "Fetch daily market history, chart it in the terminal, value a weighted stock or crypto portfolio, and project a naive compounded return for a mutual fund or currency."
)]
pub struct Cli {
    /// Disable colorized/ANSI output
    #[arg(long = "no-color", global = true)]
    pub no_color: bool,

    /// Output results in JSON format
    #[arg(long = "json", global = true)]
    pub json: bool,

    /// Config file (default: <config dir>/marketdash/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Read prices from <DIR>/<SYMBOL>.csv instead of the network
    #[arg(long = "data-dir", global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Stock exchange portfolio: adjusted closes, weighted value, alert
    Stocks(PortfolioArgs),

    /// Cryptocurrency portfolio: closes, weighted value, alert
    Crypto(PortfolioArgs),

    /// Mutual fund history and expected return projection
    Fund(ProjectionArgs),

    /// Currency exchange rate history and expected return projection
    Currency(ProjectionArgs),

    /// Interactive session: change inputs and re-render a dashboard
    Interactive {
        /// Dashboard to start with (stocks, crypto, fund, currency)
        #[arg(default_value = "stocks")]
        dashboard: DashboardKind,
    },
}

#[derive(Args, Debug, Clone)]
pub struct PortfolioArgs {
    /// Comma-separated symbols (e.g., AAPL,GOOGL,MSFT); dashboard defaults when omitted
    pub symbols: Option<String>,

    /// Start date (YYYY-MM-DD, default 2020-01-01)
    #[arg(short, long)]
    pub from: Option<NaiveDate>,

    /// End date (YYYY-MM-DD, default today)
    #[arg(short, long)]
    pub to: Option<NaiveDate>,

    /// Allocation percentage per symbol, repeatable (e.g., --alloc AAPL=20)
    #[arg(short, long = "alloc", value_name = "SYMBOL=PCT")]
    pub allocations: Vec<String>,

    /// Alert when the portfolio value rises above this amount
    #[arg(long)]
    pub threshold: Option<rust_decimal::Decimal>,
}

#[derive(Args, Debug, Clone)]
pub struct ProjectionArgs {
    /// Symbol from the dashboard's list; dashboard default when omitted
    pub symbol: Option<String>,

    /// Investment amount (1000 to 100000, steps of 1000)
    #[arg(short, long)]
    pub amount: Option<u32>,

    /// Investment period in years (1 to 10)
    #[arg(short, long)]
    pub years: Option<u32>,

    /// Last date of history used for the projection (YYYY-MM-DD, default today)
    #[arg(short, long = "end-date")]
    pub end_date: Option<NaiveDate>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_stocks_with_allocations() {
        let cli = Cli::try_parse_from([
            "marketdash",
            "--no-color",
            "stocks",
            "AAPL,MSFT",
            "--from",
            "2023-01-01",
            "--alloc",
            "AAPL=20",
            "--alloc",
            "MSFT=30",
            "--threshold",
            "150.5",
        ])
        .unwrap();

        assert!(cli.no_color);
        match cli.command {
            Commands::Stocks(args) => {
                assert_eq!(args.symbols.as_deref(), Some("AAPL,MSFT"));
                assert_eq!(args.from, NaiveDate::from_ymd_opt(2023, 1, 1));
                assert_eq!(args.allocations, vec!["AAPL=20", "MSFT=30"]);
                assert_eq!(args.threshold.map(|t| t.to_string()), Some("150.5".to_string()));
            }
            _ => panic!("expected stocks"),
        }
    }

    #[test]
    fn test_parse_fund_and_interactive() {
        let cli =
            Cli::try_parse_from(["marketdash", "fund", "SPY", "-a", "5000", "-y", "3", "--json"])
                .unwrap();
        assert!(cli.json);
        match cli.command {
            Commands::Fund(args) => {
                assert_eq!(args.symbol.as_deref(), Some("SPY"));
                assert_eq!(args.amount, Some(5000));
                assert_eq!(args.years, Some(3));
            }
            _ => panic!("expected fund"),
        }

        let cli = Cli::try_parse_from(["marketdash", "interactive", "currency"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Interactive {
                dashboard: DashboardKind::Currency
            }
        ));
    }

    #[test]
    fn test_bad_date_is_rejected() {
        assert!(Cli::try_parse_from(["marketdash", "crypto", "--to", "yesterday"]).is_err());
    }
}
