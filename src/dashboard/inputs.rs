//! User inputs for one render, with the bounds the dashboards enforce

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use super::{DashboardKind, Mode};
use crate::analytics::{AllocationWeights, InvestmentParameters};
use crate::error::{DashboardError, Result};
use crate::market::{normalize_symbol, PriceTable};

/// Bounded integer input: `min..=max` on a `step` grid anchored at `min`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SliderSpec {
    pub label: &'static str,
    pub min: u32,
    pub max: u32,
    pub default: u32,
    pub step: u32,
}

impl SliderSpec {
    pub fn validate(&self, value: u32) -> Result<u32> {
        if value < self.min || value > self.max {
            return Err(DashboardError::InvalidInput(format!(
                "{} must be between {} and {}, got {}",
                self.label, self.min, self.max, value
            )));
        }
        if self.step > 1 && (value - self.min) % self.step != 0 {
            return Err(DashboardError::InvalidInput(format!(
                "{} must move in steps of {} from {}, got {}",
                self.label, self.step, self.min, value
            )));
        }
        Ok(value)
    }
}

pub const AMOUNT_SLIDER: SliderSpec = SliderSpec {
    label: "Investment amount",
    min: 1_000,
    max: 100_000,
    default: 10_000,
    step: 1_000,
};

pub const YEARS_SLIDER: SliderSpec = SliderSpec {
    label: "Investment period (years)",
    min: 1,
    max: 10,
    default: 5,
    step: 1,
};

pub const ALLOCATION_SLIDER: SliderSpec = SliderSpec {
    label: "Allocation (%)",
    min: 0,
    max: 100,
    default: 10,
    step: 1,
};

/// Default start of the portfolio date range
pub fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

/// Parse `SYM=PCT` into a normalized symbol and a validated percentage
pub fn parse_allocation(spec: &str) -> Result<(String, u32)> {
    let (symbol, pct) = spec.split_once('=').ok_or_else(|| {
        DashboardError::InvalidInput(format!("allocation '{}' must look like SYMBOL=PERCENT", spec))
    })?;
    let symbol = normalize_symbol(symbol);
    if symbol.is_empty() {
        return Err(DashboardError::InvalidInput(format!(
            "allocation '{}' has no symbol",
            spec
        )));
    }
    let pct: u32 = pct.trim().trim_end_matches('%').parse().map_err(|_| {
        DashboardError::InvalidInput(format!("allocation '{}' has an invalid percentage", spec))
    })?;
    Ok((symbol, ALLOCATION_SLIDER.validate(pct)?))
}

/// Inputs of a portfolio dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct PortfolioInputs {
    pub symbols: Vec<String>,
    pub from: NaiveDate,
    pub to: NaiveDate,
    /// Explicit percentages; fetched symbols without one get the slider default
    pub allocations: BTreeMap<String, u32>,
    pub threshold: Decimal,
}

impl PortfolioInputs {
    pub fn defaults(kind: DashboardKind, today: NaiveDate) -> Self {
        let profile = kind.profile();
        Self {
            symbols: profile
                .default_symbols
                .iter()
                .map(|s| s.to_string())
                .collect(),
            from: default_start_date(),
            to: today,
            allocations: BTreeMap::new(),
            threshold: profile.default_threshold,
        }
    }

    pub fn set_allocation(&mut self, symbol: &str, percent: u32) -> Result<()> {
        let percent = ALLOCATION_SLIDER.validate(percent)?;
        self.allocations.insert(normalize_symbol(symbol), percent);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.symbols.is_empty() {
            return Err(DashboardError::InvalidInput(
                "enter at least one symbol".to_string(),
            ));
        }
        if self.from > self.to {
            return Err(DashboardError::InvalidInput(format!(
                "start date {} is after end date {}",
                self.from, self.to
            )));
        }
        Ok(())
    }

    /// One weight per fetched symbol (explicit percentage or the default),
    /// plus any explicit allocation for a symbol that was not fetched.
    pub fn weights_for(&self, table: &PriceTable) -> Result<AllocationWeights> {
        let mut weights = AllocationWeights::new();
        for symbol in table.symbols() {
            let percent = self
                .allocations
                .get(symbol)
                .copied()
                .unwrap_or(ALLOCATION_SLIDER.default);
            weights.set_percent(symbol, percent)?;
        }
        for (symbol, percent) in &self.allocations {
            if weights.get(symbol).is_none() {
                weights.set_percent(symbol, *percent)?;
            }
        }
        Ok(weights)
    }
}

/// Inputs of a projection dashboard
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectionInputs {
    pub symbol: String,
    pub amount: u32,
    pub years: u32,
    pub end_date: NaiveDate,
}

impl ProjectionInputs {
    pub fn defaults(kind: DashboardKind, today: NaiveDate) -> Self {
        let profile = kind.profile();
        Self {
            symbol: profile
                .default_symbols
                .first()
                .map(|s| s.to_string())
                .unwrap_or_default(),
            amount: AMOUNT_SLIDER.default,
            years: YEARS_SLIDER.default,
            end_date: today,
        }
    }

    /// Check the inputs against the dashboard's sliders and choice list
    pub fn parameters(&self, kind: DashboardKind) -> Result<InvestmentParameters> {
        let profile = kind.profile();
        if profile.mode != Mode::Projection {
            return Err(DashboardError::InvalidInput(format!(
                "{} is not a projection dashboard",
                kind
            )));
        }
        let symbol = normalize_symbol(&self.symbol);
        if !profile.choices.is_empty() && !profile.choices.contains(&symbol.as_str()) {
            return Err(DashboardError::InvalidInput(format!(
                "{} is not one of: {}",
                symbol,
                profile.choices.join(", ")
            )));
        }
        let amount = AMOUNT_SLIDER.validate(self.amount)?;
        let years = YEARS_SLIDER.validate(self.years)?;
        InvestmentParameters::new(Decimal::from(amount), years, self.end_date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::PriceSeries;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    #[test]
    fn test_slider_bounds_and_step() {
        assert_eq!(AMOUNT_SLIDER.validate(25_000).unwrap(), 25_000);
        assert!(AMOUNT_SLIDER.validate(500).is_err());
        assert!(AMOUNT_SLIDER.validate(100_001).is_err());
        assert!(AMOUNT_SLIDER.validate(1_500).is_err());
        assert!(YEARS_SLIDER.validate(0).is_err());
        assert_eq!(YEARS_SLIDER.validate(10).unwrap(), 10);
    }

    #[test]
    fn test_parse_allocation() {
        assert_eq!(parse_allocation("aapl=20").unwrap(), ("AAPL".to_string(), 20));
        assert_eq!(parse_allocation("BTC-USD = 35%").unwrap(), ("BTC-USD".to_string(), 35));
        assert!(parse_allocation("AAPL").is_err());
        assert!(parse_allocation("=20").is_err());
        assert!(parse_allocation("AAPL=abc").is_err());
        assert!(parse_allocation("AAPL=150").is_err());
    }

    #[test]
    fn test_portfolio_defaults() {
        let inputs = PortfolioInputs::defaults(DashboardKind::Crypto, today());
        assert_eq!(inputs.symbols, vec!["BTC-USD", "ETH-USD"]);
        assert_eq!(inputs.from, default_start_date());
        assert_eq!(inputs.to, today());
        assert_eq!(inputs.threshold, dec!(10000));
        assert!(inputs.validate().is_ok());
    }

    #[test]
    fn test_weights_default_and_override() {
        let d = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let table: PriceTable = ["AAPL", "MSFT"]
            .iter()
            .map(|s| PriceSeries::from_closes(s, &[(d, dec!(1))]).unwrap())
            .collect();

        let mut inputs = PortfolioInputs::defaults(DashboardKind::Stocks, today());
        inputs.set_allocation("msft", 40).unwrap();
        inputs.set_allocation("TSLA", 5).unwrap();

        let weights = inputs.weights_for(&table).unwrap();
        assert_eq!(weights.get("AAPL"), Some(dec!(0.1)));
        assert_eq!(weights.get("MSFT"), Some(dec!(0.4)));
        // kept so valuation can report the symbol as missing
        assert_eq!(weights.get("TSLA"), Some(dec!(0.05)));
    }

    #[test]
    fn test_inverted_range_is_invalid() {
        let mut inputs = PortfolioInputs::defaults(DashboardKind::Stocks, today());
        inputs.from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        assert!(inputs.validate().is_err());
        inputs.from = inputs.to;
        inputs.symbols.clear();
        assert!(inputs.validate().is_err());
    }

    #[test]
    fn test_projection_parameters() {
        let inputs = ProjectionInputs::defaults(DashboardKind::Fund, today());
        assert_eq!(inputs.symbol, "VTSAX");
        let params = inputs.parameters(DashboardKind::Fund).unwrap();
        assert_eq!(params.amount, dec!(10000));
        assert_eq!(params.years, 5);
        assert_eq!(params.end_date, today());
    }

    #[test]
    fn test_projection_symbol_must_be_a_choice() {
        let mut inputs = ProjectionInputs::defaults(DashboardKind::Currency, today());
        inputs.symbol = "xyz".to_string();
        assert!(inputs.parameters(DashboardKind::Currency).is_err());
        inputs.symbol = "eur".to_string();
        assert!(inputs.parameters(DashboardKind::Currency).is_ok());
    }

    #[test]
    fn test_projection_on_portfolio_dashboard_rejected() {
        let inputs = ProjectionInputs::defaults(DashboardKind::Fund, today());
        assert!(inputs.parameters(DashboardKind::Stocks).is_err());
    }
}
