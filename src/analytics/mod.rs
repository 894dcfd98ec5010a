//! Portfolio valuation and return estimation
//!
//! Pure functions over fetched price data and user inputs. Nothing in this
//! module performs I/O.

pub mod alert;
pub mod returns;
pub mod valuation;

pub use alert::check_threshold;
pub use returns::{estimate_expected_return, mean_return, pct_changes};
pub use valuation::value_portfolio;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

use crate::error::{DashboardError, Result};
use crate::market::{normalize_symbol, PriceSeries};

/// Fraction of a notional portfolio assigned to each symbol.
///
/// Each weight lies in `[0, 1]`. Weights are not required to sum to 1.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AllocationWeights {
    weights: BTreeMap<String, Decimal>,
}

impl AllocationWeights {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the weight for `symbol`, replacing any previous one
    pub fn set(&mut self, symbol: &str, weight: Decimal) -> Result<()> {
        if weight < Decimal::ZERO || weight > Decimal::ONE {
            return Err(DashboardError::InvalidInput(format!(
                "weight for {} must be between 0 and 1, got {}",
                normalize_symbol(symbol),
                weight
            )));
        }
        self.weights.insert(normalize_symbol(symbol), weight);
        Ok(())
    }

    /// Set the weight from a whole percentage (0..=100)
    pub fn set_percent(&mut self, symbol: &str, percent: u32) -> Result<()> {
        if percent > 100 {
            return Err(DashboardError::InvalidInput(format!(
                "allocation for {} must be between 0 and 100%, got {}%",
                normalize_symbol(symbol),
                percent
            )));
        }
        self.set(symbol, Decimal::from(percent) / Decimal::ONE_HUNDRED)
    }

    pub fn get(&self, symbol: &str) -> Option<Decimal> {
        self.weights.get(&normalize_symbol(symbol)).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Decimal)> {
        self.weights.iter().map(|(s, w)| (s.as_str(), *w))
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn total(&self) -> Decimal {
        self.weights.values().copied().sum()
    }

    /// Each weight's share of the total, for the allocation breakdown.
    /// All shares are zero when every weight is zero.
    pub fn shares(&self) -> Vec<(&str, Decimal)> {
        let total = self.total();
        self.iter()
            .map(|(symbol, weight)| {
                let share = if total > Decimal::ZERO {
                    weight / total
                } else {
                    Decimal::ZERO
                };
                (symbol, share)
            })
            .collect()
    }
}

/// Amount, horizon and window end for a return projection
#[derive(Debug, Clone, PartialEq)]
pub struct InvestmentParameters {
    pub amount: Decimal,
    pub years: u32,
    pub end_date: NaiveDate,
}

impl InvestmentParameters {
    /// Validated parameters: the amount must be positive and the horizon at
    /// least one year.
    pub fn new(amount: Decimal, years: u32, end_date: NaiveDate) -> Result<Self> {
        if amount <= Decimal::ZERO {
            return Err(DashboardError::InvalidInput(format!(
                "investment amount must be positive, got {}",
                amount
            )));
        }
        if years == 0 {
            return Err(DashboardError::InvalidInput(
                "investment period must be at least one year".to_string(),
            ));
        }
        Ok(Self {
            amount,
            years,
            end_date,
        })
    }

    pub fn expected_return(&self, series: &PriceSeries) -> Result<Decimal> {
        estimate_expected_return(self.amount, self.years, self.end_date, series)
    }
}
