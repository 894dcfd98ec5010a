//! Market data model: price observations, per-symbol series and the
//! symbol-keyed table a multi-symbol fetch produces.

use chrono::NaiveDate;
use itertools::Itertools;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

use crate::error::{DashboardError, Result};

/// Which column of a row a series treats as "the price"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PriceField {
    #[default]
    Close,
    /// Split/dividend adjusted close, falling back to `close` when absent
    AdjClose,
}

impl PriceField {
    pub fn as_str(&self) -> &'static str {
        match self {
            PriceField::Close => "Close",
            PriceField::AdjClose => "Adj Close",
        }
    }
}

/// One daily observation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub open: Option<Decimal>,
    pub high: Option<Decimal>,
    pub low: Option<Decimal>,
    pub close: Decimal,
    pub adj_close: Option<Decimal>,
    pub volume: Option<i64>,
}

impl PricePoint {
    /// Row with only a date and a close
    pub fn close_only(date: NaiveDate, close: Decimal) -> Self {
        Self {
            date,
            open: None,
            high: None,
            low: None,
            close,
            adj_close: None,
            volume: None,
        }
    }

    pub fn price(&self, field: PriceField) -> Decimal {
        match field {
            PriceField::Close => self.close,
            PriceField::AdjClose => self.adj_close.unwrap_or(self.close),
        }
    }
}

/// Date-ordered observations for one instrument
#[derive(Debug, Clone, PartialEq)]
pub struct PriceSeries {
    symbol: String,
    field: PriceField,
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, sorting by date. When a date appears twice the later
    /// row wins, so dates end up strictly increasing.
    pub fn new(symbol: &str, mut points: Vec<PricePoint>) -> Result<Self> {
        if let Some(bad) = points
            .iter()
            .find(|p| p.close < Decimal::ZERO || p.adj_close.is_some_and(|a| a < Decimal::ZERO))
        {
            return Err(DashboardError::InvalidInput(format!(
                "negative price for {} on {}",
                symbol, bad.date
            )));
        }

        // stable sort keeps arrival order among equal dates
        points.sort_by_key(|p| p.date);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.date == point.date => *last = point,
                _ => deduped.push(point),
            }
        }

        Ok(Self {
            symbol: normalize_symbol(symbol),
            field: PriceField::Close,
            points: deduped,
        })
    }

    /// Build a series from (date, price) pairs
    pub fn from_closes(symbol: &str, closes: &[(NaiveDate, Decimal)]) -> Result<Self> {
        Self::new(
            symbol,
            closes
                .iter()
                .map(|&(date, close)| PricePoint::close_only(date, close))
                .collect(),
        )
    }

    /// Same rows, priced by `field`
    pub fn with_field(mut self, field: PriceField) -> Self {
        self.field = field;
        self
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn field(&self) -> PriceField {
        self.field
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|p| p.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|p| p.date)
    }

    /// Most recent price, if any row exists
    pub fn last_price(&self) -> Option<Decimal> {
        self.points.last().map(|p| p.price(self.field))
    }

    /// (date, price) pairs using the series' price field
    pub fn prices(&self) -> impl Iterator<Item = (NaiveDate, Decimal)> + '_ {
        self.points.iter().map(|p| (p.date, p.price(self.field)))
    }

    /// Per-row (low, high), falling back to the price column for rows
    /// without a high/low.
    pub fn low_high(&self) -> impl Iterator<Item = (Decimal, Decimal)> + '_ {
        self.points.iter().map(|p| {
            let price = p.price(self.field);
            (p.low.unwrap_or(price), p.high.unwrap_or(price))
        })
    }

    /// Lowest low and highest high across the whole series
    pub fn price_range(&self) -> Option<(Decimal, Decimal)> {
        self.low_high()
            .reduce(|(lo, hi), (l, h)| (lo.min(l), hi.max(h)))
    }
}

/// Symbol-keyed collection of series from one fetch
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceTable {
    series: BTreeMap<String, PriceSeries>,
}

impl PriceTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a series under its normalized symbol, replacing any previous one
    pub fn insert(&mut self, series: PriceSeries) {
        self.series.insert(series.symbol().to_string(), series);
    }

    pub fn get(&self, symbol: &str) -> Option<&PriceSeries> {
        self.series.get(&normalize_symbol(symbol))
    }

    pub fn symbols(&self) -> impl Iterator<Item = &str> {
        self.series.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PriceSeries> {
        self.series.values()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    /// True when there are no symbols or every series is empty
    pub fn is_empty(&self) -> bool {
        self.series.values().all(PriceSeries::is_empty)
    }

    /// Union of all observation dates, ascending
    pub fn dates(&self) -> Vec<NaiveDate> {
        self.series
            .values()
            .flat_map(|s| s.points().iter().map(|p| p.date))
            .sorted()
            .dedup()
            .collect()
    }

    /// Rows aligned on the union date index; `None` where a symbol has no
    /// observation that day. Columns follow `symbols()` order.
    pub fn aligned_rows(&self) -> Vec<(NaiveDate, Vec<Option<Decimal>>)> {
        let lookups: Vec<BTreeMap<NaiveDate, Decimal>> = self
            .series
            .values()
            .map(|s| s.prices().collect())
            .collect();

        self.dates()
            .into_iter()
            .map(|date| {
                let row = lookups.iter().map(|l| l.get(&date).copied()).collect();
                (date, row)
            })
            .collect()
    }
}

impl FromIterator<PriceSeries> for PriceTable {
    fn from_iter<I: IntoIterator<Item = PriceSeries>>(iter: I) -> Self {
        let mut table = PriceTable::new();
        for series in iter {
            table.insert(series);
        }
        table
    }
}

/// Trim and uppercase a symbol
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_ascii_uppercase()
}

/// Parse a comma-separated symbol list: normalized, empties dropped,
/// duplicates removed (first occurrence wins).
pub fn parse_symbol_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(normalize_symbol)
        .filter(|s| !s.is_empty())
        .unique()
        .collect()
}
