//! Output formatting module for CLI display
//!
//! This module handles all terminal output formatting, separating
//! the concerns of data calculation from presentation.

use colored::Colorize;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::ops::Range;
use tabled::{
    builder::Builder,
    settings::{object::Columns, Alignment, Style},
    Table, Tabled,
};

use crate::analytics::AllocationWeights;
use crate::dashboard::{BannerLevel, PortfolioReport, Profile, ProjectionReport};
use crate::error::DashboardError;
use crate::market::{PricePoint, PriceSeries, PriceTable};
use crate::utils::{format_money, format_number, format_percent};

const SPARK_LEVELS: [char; 8] = ['▁', '▂', '▃', '▄', '▅', '▆', '▇', '█'];

/// Rows shown from the start of a full-history dump
pub const HEAD_ROWS: usize = 5;

/// Format a one-line banner
pub fn format_banner(level: BannerLevel, message: &str) -> String {
    match level {
        BannerLevel::Success => format!("{} {}", "✓".green().bold(), message.green()),
        BannerLevel::Info => format!("{} {}", "ℹ".blue().bold(), message),
        BannerLevel::Warning => format!("{} {}", "⚠".yellow().bold(), message.yellow()),
        BannerLevel::Error => format!("{} {}", "✗".red().bold(), message.red()),
    }
}

/// Banner for a failed render: missing data is a warning, the rest errors
pub fn format_error(err: &DashboardError) -> String {
    let level = if err.is_warning() {
        BannerLevel::Warning
    } else {
        BannerLevel::Error
    };
    format!("{}\n", format_banner(level, &err.to_string()))
}

pub fn format_error_json(err: &DashboardError) -> String {
    #[derive(Serialize)]
    struct JsonErrorBody<'a> {
        kind: &'a str,
        message: String,
    }

    #[derive(Serialize)]
    struct JsonError<'a> {
        error: JsonErrorBody<'a>,
    }

    let body = JsonError {
        error: JsonErrorBody {
            kind: err.kind(),
            message: err.to_string(),
        },
    };
    serde_json::to_string_pretty(&body)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

fn section(title: &str) -> String {
    format!("\n{}\n", title.cyan().bold())
}

/// Row ranges that squeeze `len` rows into at most `width` columns
fn column_buckets(len: usize, width: usize) -> Vec<Range<usize>> {
    if len <= width {
        (0..len).map(|i| i..i + 1).collect()
    } else {
        (0..width)
            .map(|col| col * len / width..(col + 1) * len / width)
            .collect()
    }
}

fn spark_level(value: Decimal, min: Decimal, span: Decimal) -> char {
    if span.is_zero() {
        return SPARK_LEVELS[0];
    }
    let top = Decimal::from(SPARK_LEVELS.len() - 1);
    let level = ((value - min) / span * top)
        .round()
        .to_usize()
        .unwrap_or(0)
        .min(SPARK_LEVELS.len() - 1);
    SPARK_LEVELS[level]
}

/// Block-character line chart of a series' prices, squeezed to `width`
/// columns. Each column shows the last price of its bucket.
pub fn sparkline(prices: &[Decimal], width: usize) -> String {
    if prices.is_empty() || width == 0 {
        return String::new();
    }

    let sampled: Vec<Decimal> = column_buckets(prices.len(), width)
        .into_iter()
        .map(|bucket| prices[bucket.end - 1])
        .collect();

    let min = sampled.iter().copied().min().unwrap_or_default();
    let max = sampled.iter().copied().max().unwrap_or_default();
    sampled
        .iter()
        .map(|&price| spark_level(price, min, max - min))
        .collect()
}

/// High, price and low rows per column on one shared scale. A column covers
/// a bucket of rows: its high is the bucket's highest high, its low the
/// lowest low and its price the last price.
pub fn format_band_chart(series: &PriceSeries, width: usize) -> String {
    let prices: Vec<Decimal> = series.prices().map(|(_, p)| p).collect();
    if prices.is_empty() || width == 0 {
        return String::new();
    }
    let bands: Vec<(Decimal, Decimal)> = series.low_high().collect();

    let columns: Vec<(Decimal, Decimal, Decimal)> = column_buckets(prices.len(), width)
        .into_iter()
        .map(|bucket| {
            let rows = &bands[bucket.clone()];
            let low = rows.iter().map(|&(l, _)| l).min().unwrap_or_default();
            let high = rows.iter().map(|&(_, h)| h).max().unwrap_or_default();
            (low, prices[bucket.end - 1], high)
        })
        .collect();

    let min = columns.iter().map(|c| c.0).min().unwrap_or_default();
    let max = columns.iter().map(|c| c.2).max().unwrap_or_default();
    let row = |pick: fn(&(Decimal, Decimal, Decimal)) -> Decimal| -> String {
        columns
            .iter()
            .map(|c| spark_level(pick(c), min, max - min))
            .collect()
    };

    format!(
        "high   {}  {}\nprice  {}\nlow    {}  {}\n",
        row(|c| c.2).bright_black(),
        format_number(max),
        row(|c| c.1),
        row(|c| c.0).bright_black(),
        format_number(min),
    )
}

/// One chart line per series with its range and last price
pub fn format_line_chart(series: &[&PriceSeries], width: usize) -> String {
    let label_width = series.iter().map(|s| s.symbol().len()).max().unwrap_or(0);
    let mut output = String::new();

    for s in series {
        let prices: Vec<Decimal> = s.prices().map(|(_, p)| p).collect();
        let (Some(first), Some(last)) = (prices.first().copied(), prices.last().copied()) else {
            output.push_str(&format!(
                "{:<label_width$}  {}\n",
                s.symbol(),
                "(no data)".bright_black()
            ));
            continue;
        };

        let line = sparkline(&prices, width);
        let line = if last >= first {
            line.green()
        } else {
            line.red()
        };
        let min = prices.iter().copied().min().unwrap_or_default();
        let max = prices.iter().copied().max().unwrap_or_default();

        output.push_str(&format!(
            "{:<label_width$}  {}  last {}  (min {}, max {})\n",
            s.symbol(),
            line,
            format_number(last),
            format_number(min),
            format_number(max),
        ));
    }

    output
}

/// Date-indexed dump of a table: the most recent `rows` rows, one column per
/// symbol.
pub fn format_price_table(table: &PriceTable, rows: usize) -> String {
    let aligned = table.aligned_rows();
    let skipped = aligned.len().saturating_sub(rows);

    let mut builder = Builder::default();
    let mut header = vec!["Date".to_string()];
    header.extend(table.symbols().map(str::to_string));
    builder.push_record(header);

    for (date, prices) in aligned.iter().skip(skipped) {
        let mut record = vec![date.to_string()];
        record.extend(prices.iter().map(|p| match p {
            Some(price) => format_number(*price),
            None => "N/A".to_string(),
        }));
        builder.push_record(record);
    }

    let mut table_out = builder.build();
    table_out.with(Style::modern());
    table_out.modify(Columns::new(1..), Alignment::right());

    let mut output = String::new();
    if skipped > 0 {
        output.push_str(&format!("... {} earlier rows\n", skipped));
    }
    output.push_str(&table_out.to_string());
    output.push('\n');
    output
}

/// First rows of a single series with every column the source returned
pub fn format_history_head(series: &PriceSeries, rows: usize) -> String {
    #[derive(Tabled)]
    struct HistoryRow {
        #[tabled(rename = "Date")]
        date: String,
        #[tabled(rename = "Open")]
        open: String,
        #[tabled(rename = "High")]
        high: String,
        #[tabled(rename = "Low")]
        low: String,
        #[tabled(rename = "Close")]
        close: String,
        #[tabled(rename = "Volume")]
        volume: String,
    }

    let optional = |v: Option<Decimal>| v.map(format_number).unwrap_or_else(|| "N/A".to_string());

    let data: Vec<HistoryRow> = series
        .points()
        .iter()
        .take(rows)
        .map(|p| HistoryRow {
            date: p.date.to_string(),
            open: optional(p.open),
            high: optional(p.high),
            low: optional(p.low),
            close: format_number(p.close),
            volume: p
                .volume
                .map(|v| v.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
        })
        .collect();

    let mut table = Table::new(&data);
    table.with(Style::modern());
    table.modify(Columns::new(1..), Alignment::right());

    let mut output = table.to_string();
    output.push('\n');
    if series.len() > rows {
        output.push_str(&format!("... and {} more rows\n", series.len() - rows));
    }
    output
}

/// Allocation breakdown: each weight, its share of the total, and a bar
pub fn format_allocation_breakdown(weights: &AllocationWeights) -> String {
    #[derive(Tabled)]
    struct AllocationRow {
        #[tabled(rename = "Symbol")]
        symbol: String,
        #[tabled(rename = "Weight")]
        weight: String,
        #[tabled(rename = "Share")]
        share: String,
        #[tabled(rename = "")]
        bar: String,
    }

    const BAR_WIDTH: u32 = 30;

    let rows: Vec<AllocationRow> = weights
        .shares()
        .into_iter()
        .map(|(symbol, share)| {
            let cells = (share * Decimal::from(BAR_WIDTH))
                .round()
                .to_usize()
                .unwrap_or(0);
            AllocationRow {
                symbol: symbol.to_string(),
                weight: format!("{:.2}", weights.get(symbol).unwrap_or_default()),
                share: format_percent(share),
                bar: "█".repeat(cells),
            }
        })
        .collect();

    let mut table = Table::new(&rows);
    table.with(Style::modern());
    table.modify(Columns::new(1..3), Alignment::right());
    format!("{}\n", table)
}

/// Full terminal rendering of a portfolio dashboard
pub fn format_portfolio_report(
    report: &PortfolioReport,
    profile: &Profile,
    table_rows: usize,
    chart_width: usize,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{} {}\n", "📊".cyan().bold(), profile.title.bold()));
    output.push_str(&format!(
        "{} to {} ({})\n",
        report.from,
        report.to,
        profile.price_field.as_str()
    ));

    output.push_str(&section(&format!("{} Data:", profile.subject)));
    output.push_str(&format_price_table(&report.table, table_rows));

    output.push_str(&section(&format!("{} Performance:", profile.subject)));
    let series: Vec<&PriceSeries> = report.table.iter().collect();
    output.push_str(&format_line_chart(&series, chart_width));

    output.push_str(&section("Portfolio Summary:"));
    output.push_str(&format!(
        "{:<24} {}\n",
        "Total Portfolio Value:".bold(),
        format_money(report.value, profile.money_label)
    ));
    output.push_str(&format!(
        "{:<24} {}\n",
        "Total Weight:".bold(),
        format_percent(report.weights.total())
    ));

    output.push_str(&section("Portfolio Allocation Breakdown:"));
    output.push_str(&format_allocation_breakdown(&report.weights));

    if report.alert {
        output.push_str(&section("Portfolio Alert:"));
        output.push_str(&format_banner(
            profile.alert_level,
            &format!(
                "Your portfolio value has risen above {}!",
                format_money(report.threshold, profile.money_label)
            ),
        ));
        output.push('\n');
    }

    output
}

/// Full terminal rendering of a projection dashboard
pub fn format_projection_report(
    report: &ProjectionReport,
    profile: &Profile,
    chart_width: usize,
) -> String {
    let mut output = String::new();

    output.push_str(&format!("\n{} {}\n", "📈".cyan().bold(), profile.title.bold()));

    output.push_str(&section(&format!("{} Historical Data", report.symbol)));
    if report.provider_symbol != report.symbol {
        output.push_str(&format!("Quoted as {}\n", report.provider_symbol));
    }
    output.push_str(&format_history_head(&report.series, HEAD_ROWS));

    output.push_str(&section(&format!("{} Performance Chart", profile.subject)));
    output.push_str(&format_line_chart(&[&report.series], chart_width));
    if let (Some(first), Some(last)) = (report.first_date, report.last_date) {
        output.push_str(&format!(
            "{} observations from {} to {}\n",
            report.observations, first, last
        ));
    }
    if let Some((low, high)) = report.high_low {
        output.push_str(&format!(
            "High/low band, range {} to {}\n",
            format_number(low),
            format_number(high)
        ));
        output.push_str(&format_band_chart(&report.series, chart_width));
    }

    output.push_str(&section("Expected Returns"));
    output.push_str(&format!(
        "Amount {}, {} years, history up to {}\n",
        format_money(report.parameters.amount, profile.money_label),
        report.parameters.years,
        report.parameters.end_date
    ));
    output.push_str(&format_banner(
        profile.alert_level,
        &format!(
            "Expected Returns after {} years: {}",
            report.parameters.years,
            format_money(report.expected_return, profile.money_label)
        ),
    ));
    output.push('\n');

    output
}

/// Format a portfolio report for JSON output
pub fn format_portfolio_json(report: &PortfolioReport) -> String {
    #[derive(Serialize)]
    struct JsonHolding {
        symbol: String,
        observations: usize,
        first_date: Option<String>,
        last_date: Option<String>,
        last_price: Option<String>,
        weight: Option<String>,
    }

    #[derive(Serialize)]
    struct JsonPortfolio {
        dashboard: String,
        from: String,
        to: String,
        holdings: Vec<JsonHolding>,
        total_weight: String,
        value: String,
        threshold: String,
        alert: bool,
    }

    let holdings = report
        .table
        .iter()
        .map(|s| JsonHolding {
            symbol: s.symbol().to_string(),
            observations: s.len(),
            first_date: s.first_date().map(|d| d.to_string()),
            last_date: s.last_date().map(|d| d.to_string()),
            last_price: s.last_price().map(|p| p.to_string()),
            weight: report.weights.get(s.symbol()).map(|w| w.to_string()),
        })
        .collect();

    let json_report = JsonPortfolio {
        dashboard: report.dashboard.to_string(),
        from: report.from.to_string(),
        to: report.to.to_string(),
        holdings,
        total_weight: report.weights.total().to_string(),
        value: report.value.to_string(),
        threshold: report.threshold.to_string(),
        alert: report.alert,
    };

    serde_json::to_string_pretty(&json_report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}

/// Format a projection report for JSON output
pub fn format_projection_json(report: &ProjectionReport) -> String {
    #[derive(Serialize)]
    struct JsonProjection<'a> {
        dashboard: String,
        symbol: &'a str,
        provider_symbol: &'a str,
        observations: usize,
        first_date: Option<String>,
        last_date: Option<String>,
        low: Option<String>,
        high: Option<String>,
        amount: String,
        years: u32,
        end_date: String,
        expected_return: String,
        head: &'a [PricePoint],
    }

    let points = report.series.points();
    let json_report = JsonProjection {
        dashboard: report.dashboard.to_string(),
        symbol: &report.symbol,
        provider_symbol: &report.provider_symbol,
        observations: report.observations,
        first_date: report.first_date.map(|d| d.to_string()),
        last_date: report.last_date.map(|d| d.to_string()),
        low: report.high_low.map(|(low, _)| low.to_string()),
        high: report.high_low.map(|(_, high)| high.to_string()),
        amount: report.parameters.amount.to_string(),
        years: report.parameters.years,
        end_date: report.parameters.end_date.to_string(),
        expected_return: report.expected_return.to_string(),
        head: &points[..points.len().min(HEAD_ROWS)],
    };

    serde_json::to_string_pretty(&json_report)
        .unwrap_or_else(|e| format!(r#"{{"error": "JSON serialization failed: {}"}}"#, e))
}
