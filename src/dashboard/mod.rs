//! Dashboard profiles and the shared fetch → compute pipeline
//!
//! The four dashboards differ only in their defaults, the price column they
//! read and whether they value a weighted portfolio or project a return for
//! a single instrument. Each is a [`Profile`] fed to one pipeline.

pub mod inputs;
pub mod pipeline;

pub use inputs::{PortfolioInputs, ProjectionInputs, SliderSpec};
pub use pipeline::{run_portfolio, run_projection, PortfolioReport, ProjectionReport};

use rust_decimal::Decimal;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::market::{normalize_symbol, PriceField};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DashboardKind {
    Stocks,
    Crypto,
    Fund,
    Currency,
}

/// What a dashboard computes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Several symbols over a date range, weighted into one value
    Portfolio,
    /// One symbol's full history, projected forward
    Projection,
}

/// Severity of a banner line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BannerLevel {
    Success,
    Info,
    Warning,
    Error,
}

#[derive(Debug, Clone)]
pub struct Profile {
    pub kind: DashboardKind,
    pub title: &'static str,
    /// Noun used in section headers ("Stock", "Cryptocurrency", ...)
    pub subject: &'static str,
    pub mode: Mode,
    pub price_field: PriceField,
    pub money_label: &'static str,
    pub default_symbols: &'static [&'static str],
    /// Fixed choice list for single-select dashboards
    pub choices: &'static [&'static str],
    pub default_threshold: Decimal,
    /// Banner used for a fired alert (portfolio) or the projected return
    pub alert_level: BannerLevel,
}

const FUND_SYMBOLS: &[&str] = &["VTSAX", "SPY", "AGG", "VTI", "VFIAX"];

const CURRENCY_CODES: &[&str] = &[
    "INR", "EUR", "GBP", "JPY", "CAD", "HKD", "CHF", "ZAR", "AUD", "MXN", "NZD", "SGD", "KRW",
    "BRL", "TRY", "NOK", "SEK", "RUB", "TWD", "PLN",
];

impl DashboardKind {
    pub const ALL: [DashboardKind; 4] = [
        DashboardKind::Stocks,
        DashboardKind::Crypto,
        DashboardKind::Fund,
        DashboardKind::Currency,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DashboardKind::Stocks => "stocks",
            DashboardKind::Crypto => "crypto",
            DashboardKind::Fund => "fund",
            DashboardKind::Currency => "currency",
        }
    }

    pub fn profile(&self) -> Profile {
        match self {
            DashboardKind::Stocks => Profile {
                kind: *self,
                title: "Stock Exchange Portfolio Manager",
                subject: "Stock",
                mode: Mode::Portfolio,
                price_field: PriceField::AdjClose,
                money_label: "$",
                default_symbols: &["AAPL", "GOOGL", "MSFT"],
                choices: &[],
                default_threshold: Decimal::ONE_HUNDRED,
                alert_level: BannerLevel::Success,
            },
            DashboardKind::Crypto => Profile {
                kind: *self,
                title: "Cryptocurrency Portfolio Manager",
                subject: "Cryptocurrency",
                mode: Mode::Portfolio,
                price_field: PriceField::Close,
                money_label: "₹",
                default_symbols: &["BTC-USD", "ETH-USD"],
                choices: &[],
                default_threshold: Decimal::from(10_000),
                alert_level: BannerLevel::Warning,
            },
            DashboardKind::Fund => Profile {
                kind: *self,
                title: "Mutual Fund Performance Analysis",
                subject: "Fund",
                mode: Mode::Projection,
                price_field: PriceField::Close,
                money_label: "₹",
                default_symbols: &["VTSAX"],
                choices: FUND_SYMBOLS,
                default_threshold: Decimal::ZERO,
                alert_level: BannerLevel::Success,
            },
            DashboardKind::Currency => Profile {
                kind: *self,
                title: "Currency Performance Analysis",
                subject: "Currency",
                mode: Mode::Projection,
                price_field: PriceField::Close,
                money_label: "₹",
                default_symbols: &["INR"],
                choices: CURRENCY_CODES,
                default_threshold: Decimal::ZERO,
                alert_level: BannerLevel::Info,
            },
        }
    }

    /// Symbol as the data provider knows it. Currency codes are quoted
    /// against USD as `<CODE>=X`; everything else passes through.
    pub fn provider_symbol(&self, symbol: &str) -> String {
        let symbol = normalize_symbol(symbol);
        match self {
            DashboardKind::Currency if !symbol.ends_with("=X") => format!("{}=X", symbol),
            _ => symbol,
        }
    }
}

impl fmt::Display for DashboardKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DashboardKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "stocks" | "stock" => Ok(DashboardKind::Stocks),
            "crypto" => Ok(DashboardKind::Crypto),
            "fund" | "funds" | "mutual" => Ok(DashboardKind::Fund),
            "currency" | "fx" => Ok(DashboardKind::Currency),
            other => Err(format!(
                "unknown dashboard '{}' (expected stocks, crypto, fund or currency)",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profiles_match_modes() {
        assert_eq!(DashboardKind::Stocks.profile().mode, Mode::Portfolio);
        assert_eq!(DashboardKind::Crypto.profile().mode, Mode::Portfolio);
        assert_eq!(DashboardKind::Fund.profile().mode, Mode::Projection);
        assert_eq!(DashboardKind::Currency.profile().mode, Mode::Projection);
        assert_eq!(DashboardKind::Currency.profile().choices.len(), 20);
        assert_eq!(
            DashboardKind::Stocks.profile().price_field,
            PriceField::AdjClose
        );
    }

    #[test]
    fn test_provider_symbol() {
        assert_eq!(DashboardKind::Currency.provider_symbol("inr"), "INR=X");
        assert_eq!(DashboardKind::Currency.provider_symbol("EUR=X"), "EUR=X");
        assert_eq!(DashboardKind::Fund.provider_symbol("spy"), "SPY");
        assert_eq!(DashboardKind::Crypto.provider_symbol("btc-usd"), "BTC-USD");
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!("Stocks".parse::<DashboardKind>(), Ok(DashboardKind::Stocks));
        assert_eq!("fx".parse::<DashboardKind>(), Ok(DashboardKind::Currency));
        assert!("bonds".parse::<DashboardKind>().is_err());
        for kind in DashboardKind::ALL {
            assert_eq!(kind.as_str().parse::<DashboardKind>(), Ok(kind));
        }
    }
}
