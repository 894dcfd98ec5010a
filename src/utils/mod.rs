//! Utility functions for formatting money and percentages
//!
//! Centralized so every dashboard displays amounts the same way:
//! `,` as thousands separator and `.` as decimal separator.

use rust_decimal::Decimal;

/// Core formatting function with full control over output.
///
/// # Arguments
/// * `value` - The decimal value to format
/// * `width` - Minimum width for padding (0 for no padding, right-aligned)
/// * `label` - Money label placed before the number ("$", "₹", or "")
///
/// # Examples
/// ```
/// use marketdash::utils::format_money_with_width;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_money_with_width(dec!(1234.56), 0, "$"), "$1,234.56");
/// assert_eq!(format_money_with_width(dec!(1234), 12, ""), "    1,234.00");
/// ```
pub fn format_money_with_width(value: Decimal, width: usize, label: &str) -> String {
    let is_negative = value < Decimal::ZERO;
    let formatted = format!("{:.2}", value.abs());
    let (integer_part, decimal_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let with_separators: String = integer_part
        .chars()
        .rev()
        .enumerate()
        .flat_map(|(i, c)| {
            if i > 0 && i % 3 == 0 {
                vec![',', c]
            } else {
                vec![c]
            }
        })
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();

    let sign = if is_negative { "-" } else { "" };
    let result = format!("{}{}{}.{}", sign, label, with_separators, decimal_part);

    // chars, not bytes: labels like "₹" are multi-byte
    let len = result.chars().count();
    if width > len {
        format!("{}{}", " ".repeat(width - len), result)
    } else {
        result
    }
}

/// Format with a money label: "$1,234.56"
///
/// # Examples
/// ```
/// use marketdash::utils::format_money;
/// use rust_decimal_macros::dec;
///
/// assert_eq!(format_money(dec!(10000), "₹"), "₹10,000.00");
/// assert_eq!(format_money(dec!(-500), "$"), "-$500.00");
/// ```
pub fn format_money(value: Decimal, label: &str) -> String {
    format_money_with_width(value, 0, label)
}

/// Format number only (no label): "1,234.56"
pub fn format_number(value: Decimal) -> String {
    format_money_with_width(value, 0, "")
}

/// Format a fraction as a percentage with one decimal: 0.125 -> "12.5%"
pub fn format_percent(fraction: Decimal) -> String {
    format!("{:.1}%", fraction * Decimal::ONE_HUNDRED)
}
