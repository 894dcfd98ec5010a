//! One render cycle: validate inputs, fetch, compute.
//!
//! Each call re-runs the whole cycle from scratch; nothing is kept between
//! calls.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::{debug, info};

use super::inputs::{PortfolioInputs, ProjectionInputs};
use super::{DashboardKind, Mode};
use crate::analytics::{check_threshold, value_portfolio, AllocationWeights, InvestmentParameters};
use crate::error::{DashboardError, Result};
use crate::market::{PriceSeries, PriceTable};
use crate::sources::{fetch_table, FetchRange, PriceSource};

/// Everything a portfolio dashboard shows
#[derive(Debug, Clone)]
pub struct PortfolioReport {
    pub dashboard: DashboardKind,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub table: PriceTable,
    pub weights: AllocationWeights,
    pub value: Decimal,
    pub threshold: Decimal,
    pub alert: bool,
}

/// Everything a projection dashboard shows
#[derive(Debug, Clone)]
pub struct ProjectionReport {
    pub dashboard: DashboardKind,
    /// Symbol as the user picked it
    pub symbol: String,
    /// Symbol sent to the data source
    pub provider_symbol: String,
    pub series: PriceSeries,
    pub observations: usize,
    pub first_date: Option<NaiveDate>,
    pub last_date: Option<NaiveDate>,
    pub high_low: Option<(Decimal, Decimal)>,
    pub parameters: InvestmentParameters,
    pub expected_return: Decimal,
}

fn require_mode(kind: DashboardKind, mode: Mode) -> Result<()> {
    if kind.profile().mode != mode {
        return Err(DashboardError::InvalidInput(format!(
            "{} dashboard does not support this view",
            kind
        )));
    }
    Ok(())
}

/// Fetch the symbols, weight them and check the alert threshold
pub async fn run_portfolio<S: PriceSource>(
    source: &S,
    kind: DashboardKind,
    inputs: &PortfolioInputs,
) -> Result<PortfolioReport> {
    require_mode(kind, Mode::Portfolio)?;
    inputs.validate()?;
    let profile = kind.profile();

    let symbols: Vec<String> = inputs
        .symbols
        .iter()
        .map(|s| kind.provider_symbol(s))
        .collect();
    let table = fetch_table(source, &symbols, inputs.from, inputs.to, profile.price_field).await?;

    let weights = inputs.weights_for(&table)?;
    let value = value_portfolio(&weights, &table)?;
    let alert = check_threshold(value, inputs.threshold);
    info!(
        "{} portfolio value {} (threshold {}, alert {})",
        kind, value, inputs.threshold, alert
    );

    Ok(PortfolioReport {
        dashboard: kind,
        from: inputs.from,
        to: inputs.to,
        table,
        weights,
        value,
        threshold: inputs.threshold,
        alert,
    })
}

/// Fetch one symbol's full history and project the expected return
pub async fn run_projection<S: PriceSource>(
    source: &S,
    kind: DashboardKind,
    inputs: &ProjectionInputs,
) -> Result<ProjectionReport> {
    require_mode(kind, Mode::Projection)?;
    let parameters = inputs.parameters(kind)?;
    let profile = kind.profile();

    let symbol = crate::market::normalize_symbol(&inputs.symbol);
    let provider_symbol = kind.provider_symbol(&symbol);
    let series = source
        .history(&provider_symbol, FetchRange::Max)
        .await?
        .with_field(profile.price_field);
    debug!("{}: {} rows of history", provider_symbol, series.len());

    if series.is_empty() {
        return Err(DashboardError::InsufficientData(
            "No data available for the selected symbol.".to_string(),
        ));
    }

    let expected_return = parameters.expected_return(&series)?;
    info!(
        "{} expected return after {} years: {}",
        symbol, parameters.years, expected_return
    );

    Ok(ProjectionReport {
        dashboard: kind,
        symbol,
        provider_symbol,
        observations: series.len(),
        first_date: series.first_date(),
        last_date: series.last_date(),
        high_low: series.price_range(),
        series,
        parameters,
        expected_return,
    })
}
