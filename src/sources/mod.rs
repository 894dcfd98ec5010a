// Sources module - price history adapters (Yahoo Finance, offline CSV)

pub mod csv_dir;
pub mod yahoo;

pub use csv_dir::CsvDirSource;
pub use yahoo::YahooSource;

use chrono::NaiveDate;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::config::{Config, SourceKind};
use crate::error::{DashboardError, Result};
use crate::market::{PriceField, PriceSeries, PriceTable};

/// Decimal places kept when converting provider floats
pub const PRICE_DP: u32 = 6;

/// Which slice of history to fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchRange {
    /// Everything the provider has
    Max,
    /// Inclusive date range
    Between { from: NaiveDate, to: NaiveDate },
}

impl FetchRange {
    pub fn contains(&self, date: NaiveDate) -> bool {
        match *self {
            FetchRange::Max => true,
            FetchRange::Between { from, to } => date >= from && date <= to,
        }
    }
}

/// A provider of daily price history for one symbol at a time.
///
/// An unknown symbol, a transport failure or an unreadable payload is an
/// `Adapter` error. A symbol with no rows in range is an empty series.
#[allow(async_fn_in_trait)]
pub trait PriceSource {
    /// Short name for logs and headers
    fn name(&self) -> &'static str;

    async fn history(&self, symbol: &str, range: FetchRange) -> Result<PriceSeries>;
}

/// Adapter selected from configuration
pub enum Source {
    Yahoo(YahooSource),
    CsvDir(CsvDirSource),
}

impl Source {
    pub fn from_config(config: &Config) -> Result<Self> {
        match config.source.kind {
            SourceKind::Yahoo => Ok(Source::Yahoo(YahooSource::new(&config.source)?)),
            SourceKind::Csv => {
                let dir = config.source.data_dir.clone().ok_or_else(|| {
                    DashboardError::Config("source.kind = \"csv\" needs source.data_dir".to_string())
                })?;
                Ok(Source::CsvDir(CsvDirSource::new(dir)))
            }
        }
    }
}

impl PriceSource for Source {
    fn name(&self) -> &'static str {
        match self {
            Source::Yahoo(s) => s.name(),
            Source::CsvDir(s) => s.name(),
        }
    }

    async fn history(&self, symbol: &str, range: FetchRange) -> Result<PriceSeries> {
        match self {
            Source::Yahoo(s) => s.history(symbol, range).await,
            Source::CsvDir(s) => s.history(symbol, range).await,
        }
    }
}

/// Fetch every symbol over `[from, to]` into one table, one request at a time.
/// The first failing symbol aborts the fetch.
pub async fn fetch_table<S: PriceSource>(
    source: &S,
    symbols: &[String],
    from: NaiveDate,
    to: NaiveDate,
    field: PriceField,
) -> Result<PriceTable> {
    if from > to {
        return Err(DashboardError::InvalidInput(format!(
            "start date {} is after end date {}",
            from, to
        )));
    }

    info!(
        "Fetching {} symbol(s) from {} ({} to {})",
        symbols.len(),
        source.name(),
        from,
        to
    );

    let mut table = PriceTable::new();
    for symbol in symbols {
        let series = source
            .history(symbol, FetchRange::Between { from, to })
            .await?;
        debug!("{}: {} rows", series.symbol(), series.len());
        table.insert(series.with_field(field));
    }
    Ok(table)
}

/// Convert a provider float to a Decimal price
pub(crate) fn decimal_from_f64(value: f64) -> Option<Decimal> {
    if !value.is_finite() {
        return None;
    }
    Decimal::from_f64(value).map(|d| d.round_dp(PRICE_DP))
}
