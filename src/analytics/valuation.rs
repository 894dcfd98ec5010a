use rust_decimal::Decimal;

use super::AllocationWeights;
use crate::error::{DashboardError, Result};
use crate::market::PriceTable;

/// Weighted portfolio value: the dot product of the weights and each
/// weighted symbol's most recent price.
///
/// Fails with `InsufficientData` when the table holds no rows at all or a
/// weighted symbol's series is empty, and with `MissingSymbol` when a weight
/// names a symbol the table does not have.
pub fn value_portfolio(weights: &AllocationWeights, table: &PriceTable) -> Result<Decimal> {
    if table.is_empty() {
        return Err(DashboardError::InsufficientData(
            "no price data was returned".to_string(),
        ));
    }

    let mut total = Decimal::ZERO;
    for (symbol, weight) in weights.iter() {
        let series = table
            .get(symbol)
            .ok_or_else(|| DashboardError::MissingSymbol {
                symbol: symbol.to_string(),
            })?;
        let last = series.last_price().ok_or_else(|| {
            DashboardError::InsufficientData(format!("no price rows for {}", symbol))
        })?;
        total += weight * last;
    }

    Ok(total)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market::PriceSeries;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, day).unwrap()
    }

    fn table() -> PriceTable {
        [
            PriceSeries::from_closes("AAPL", &[(d(1), dec!(170)), (d(4), dec!(175.10))]).unwrap(),
            PriceSeries::from_closes("MSFT", &[(d(1), dec!(410)), (d(4), dec!(415.50))]).unwrap(),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_single_symbol_full_weight_is_last_price() {
        let mut weights = AllocationWeights::new();
        weights.set("AAPL", dec!(1.0)).unwrap();
        assert_eq!(value_portfolio(&weights, &table()).unwrap(), dec!(175.10));
    }

    #[test]
    fn test_dot_product_of_weights_and_last_prices() {
        let mut weights = AllocationWeights::new();
        weights.set_percent("AAPL", 10).unwrap();
        weights.set_percent("MSFT", 10).unwrap();
        // 0.1 * 175.10 + 0.1 * 415.50
        assert_eq!(value_portfolio(&weights, &table()).unwrap(), dec!(59.060));
    }

    #[test]
    fn test_value_is_linear_in_weights() {
        let mut weights = AllocationWeights::new();
        weights.set("AAPL", dec!(0.2)).unwrap();
        weights.set("MSFT", dec!(0.3)).unwrap();
        let mut doubled = AllocationWeights::new();
        doubled.set("AAPL", dec!(0.4)).unwrap();
        doubled.set("MSFT", dec!(0.6)).unwrap();

        let base = value_portfolio(&weights, &table()).unwrap();
        assert_eq!(value_portfolio(&doubled, &table()).unwrap(), base * dec!(2));
    }

    #[test]
    fn test_missing_symbol() {
        let mut weights = AllocationWeights::new();
        weights.set("AAPL", dec!(0.5)).unwrap();
        let only_msft: PriceTable =
            [PriceSeries::from_closes("MSFT", &[(d(1), dec!(410))]).unwrap()]
                .into_iter()
                .collect();

        match value_portfolio(&weights, &only_msft) {
            Err(DashboardError::MissingSymbol { symbol }) => assert_eq!(symbol, "AAPL"),
            other => panic!("expected MissingSymbol, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_table_is_insufficient_data() {
        let mut weights = AllocationWeights::new();
        weights.set("AAPL", dec!(0.5)).unwrap();
        let err = value_portfolio(&weights, &PriceTable::new()).unwrap_err();
        assert!(matches!(err, DashboardError::InsufficientData(_)));
    }

    #[test]
    fn test_empty_series_is_insufficient_data() {
        let mut weights = AllocationWeights::new();
        weights.set("GOOGL", dec!(0.5)).unwrap();
        let mut t = table();
        t.insert(PriceSeries::new("GOOGL", vec![]).unwrap());
        let err = value_portfolio(&weights, &t).unwrap_err();
        assert!(matches!(err, DashboardError::InsufficientData(_)));
    }

    #[test]
    fn test_no_weights_is_zero() {
        assert_eq!(
            value_portfolio(&AllocationWeights::new(), &table()).unwrap(),
            Decimal::ZERO
        );
    }
}
