use rust_decimal::Decimal;

/// True when the portfolio value is strictly above the alert threshold
pub fn check_threshold(value: Decimal, threshold: Decimal) -> bool {
    value > threshold
}
