use chrono::NaiveDate;
use rust_decimal::{Decimal, MathematicalOps};

use crate::error::{DashboardError, Result};
use crate::market::PriceSeries;

/// Simple period-over-period changes `(p[i] - p[i-1]) / p[i-1]`.
///
/// The first observation produces no value. A zero previous price has no
/// defined change and is reported as `InsufficientData`.
pub fn pct_changes(prices: &[(NaiveDate, Decimal)]) -> Result<Vec<Decimal>> {
    prices
        .windows(2)
        .map(|pair| {
            let (_, prev) = pair[0];
            let (date, curr) = pair[1];
            (curr - prev).checked_div(prev).ok_or_else(|| {
                DashboardError::InsufficientData(format!(
                    "price before {} is zero, return is undefined",
                    date
                ))
            })
        })
        .collect()
}

/// Arithmetic mean, `None` for an empty slice
pub fn mean_return(returns: &[Decimal]) -> Option<Decimal> {
    if returns.is_empty() {
        return None;
    }
    let sum: Decimal = returns.iter().copied().sum();
    Some(sum / Decimal::from(returns.len()))
}

/// Naive compounded projection: `amount * (1 + mean)^years - amount`, where
/// `mean` is the average single-step change of the series between its first
/// observation and `end_date` (inclusive).
///
/// The step frequency of the series is not converted to years: a daily
/// series compounds its mean daily change once per year of horizon.
pub fn estimate_expected_return(
    amount: Decimal,
    years: u32,
    end_date: NaiveDate,
    series: &PriceSeries,
) -> Result<Decimal> {
    if amount < Decimal::ZERO {
        return Err(DashboardError::InvalidInput(format!(
            "investment amount must not be negative, got {}",
            amount
        )));
    }

    let window: Vec<(NaiveDate, Decimal)> = match series.first_date() {
        Some(start_date) => series
            .prices()
            .filter(|(date, _)| *date >= start_date && *date <= end_date)
            .collect(),
        None => Vec::new(),
    };

    if window.len() < 2 {
        return Err(DashboardError::InsufficientData(format!(
            "{} has {} observation(s) up to {}, need at least 2",
            series.symbol(),
            window.len(),
            end_date
        )));
    }

    let returns = pct_changes(&window)?;
    let mean = mean_return(&returns).ok_or_else(|| {
        DashboardError::InsufficientData(format!("no returns for {}", series.symbol()))
    })?;

    let growth = (Decimal::ONE + mean)
        .checked_powu(u64::from(years))
        .ok_or_else(|| {
            DashboardError::InvalidInput(format!(
                "expected return overflows over {} years",
                years
            ))
        })?;

    let projected = amount.checked_mul(growth).ok_or_else(|| {
        DashboardError::InvalidInput("expected return overflows".to_string())
    })?;

    Ok(projected - amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn ten_percent_steps() -> PriceSeries {
        PriceSeries::from_closes(
            "VTSAX",
            &[
                (d(2024, 1, 2), dec!(100)),
                (d(2024, 1, 3), dec!(110)),
                (d(2024, 1, 4), dec!(121)),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_pct_changes_drop_first() {
        let changes = pct_changes(&[
            (d(2024, 1, 2), dec!(100)),
            (d(2024, 1, 3), dec!(110)),
            (d(2024, 1, 4), dec!(99)),
        ])
        .unwrap();
        assert_eq!(changes, vec![dec!(0.1), dec!(-0.1)]);
        assert!(pct_changes(&[(d(2024, 1, 2), dec!(100))]).unwrap().is_empty());
    }

    #[test]
    fn test_pct_changes_zero_base() {
        let err = pct_changes(&[(d(2024, 1, 2), dec!(0)), (d(2024, 1, 3), dec!(1))]).unwrap_err();
        assert!(matches!(err, DashboardError::InsufficientData(_)));
    }

    #[test]
    fn test_mean_return() {
        assert_eq!(mean_return(&[dec!(0.1), dec!(0.3)]), Some(dec!(0.2)));
        assert_eq!(mean_return(&[]), None);
    }

    #[test]
    fn test_ten_percent_steps_one_year() {
        let series = ten_percent_steps();
        let result = estimate_expected_return(dec!(1000), 1, d(2024, 1, 4), &series).unwrap();
        assert_eq!(result, dec!(100));
    }

    #[test]
    fn test_compounds_mean_over_years() {
        let series = ten_percent_steps();
        let result = estimate_expected_return(dec!(1000), 2, d(2024, 1, 4), &series).unwrap();
        // 1000 * 1.1^2 - 1000
        assert_eq!(result, dec!(210));
    }

    #[test]
    fn test_zero_years_is_zero() {
        let series = ten_percent_steps();
        let result = estimate_expected_return(dec!(1000), 0, d(2024, 1, 4), &series).unwrap();
        assert_eq!(result, Decimal::ZERO);
    }

    #[test]
    fn test_doubling_amount_doubles_result() {
        let series = ten_percent_steps();
        let end = d(2024, 1, 4);
        let single = estimate_expected_return(dec!(1500), 3, end, &series).unwrap();
        let double = estimate_expected_return(dec!(3000), 3, end, &series).unwrap();
        assert_eq!(double, single * dec!(2));
    }

    #[test]
    fn test_end_date_bounds_window() {
        let series = ten_percent_steps();
        // only the first two rows are in the window: one +10% step
        let result = estimate_expected_return(dec!(1000), 1, d(2024, 1, 3), &series).unwrap();
        assert_eq!(result, dec!(100));
    }

    #[test]
    fn test_single_observation_in_window() {
        let series = ten_percent_steps();
        let err = estimate_expected_return(dec!(1000), 1, d(2024, 1, 2), &series).unwrap_err();
        assert!(matches!(err, DashboardError::InsufficientData(_)));
    }

    #[test]
    fn test_end_before_start_is_empty_window() {
        let series = ten_percent_steps();
        let err = estimate_expected_return(dec!(1000), 1, d(2023, 12, 31), &series).unwrap_err();
        assert!(matches!(err, DashboardError::InsufficientData(_)));
    }

    #[test]
    fn test_empty_series() {
        let series = PriceSeries::new("SPY", vec![]).unwrap();
        let err = estimate_expected_return(dec!(1000), 1, d(2024, 1, 2), &series).unwrap_err();
        assert!(matches!(err, DashboardError::InsufficientData(_)));
    }

    #[test]
    fn test_negative_amount_rejected() {
        let series = ten_percent_steps();
        let err = estimate_expected_return(dec!(-1), 1, d(2024, 1, 4), &series).unwrap_err();
        assert!(matches!(err, DashboardError::InvalidInput(_)));
    }

    #[test]
    fn test_losing_series_projects_loss() {
        let series = PriceSeries::from_closes(
            "EUR=X",
            &[(d(2024, 1, 2), dec!(1.00)), (d(2024, 1, 3), dec!(0.50))],
        )
        .unwrap();
        let result = estimate_expected_return(dec!(10000), 1, d(2024, 1, 3), &series).unwrap();
        assert_eq!(result, dec!(-5000));
    }
}
