//! Offline price source: one CSV file per symbol in a directory.
//!
//! Expected header: `date,open,high,low,close,adj_close,volume`. Only `date`
//! and `close` are required; the other columns may be absent or empty.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::{FetchRange, PriceSource};
use crate::error::{DashboardError, Result};
use crate::market::{normalize_symbol, PricePoint, PriceSeries};

#[derive(Debug, Deserialize)]
struct CsvRow {
    date: NaiveDate,
    #[serde(default)]
    open: Option<Decimal>,
    #[serde(default)]
    high: Option<Decimal>,
    #[serde(default)]
    low: Option<Decimal>,
    close: Decimal,
    #[serde(default)]
    adj_close: Option<Decimal>,
    #[serde(default)]
    volume: Option<i64>,
}

impl From<CsvRow> for PricePoint {
    fn from(row: CsvRow) -> Self {
        PricePoint {
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            adj_close: row.adj_close,
            volume: row.volume,
        }
    }
}

pub struct CsvDirSource {
    dir: PathBuf,
}

impl CsvDirSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, symbol: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", normalize_symbol(symbol)))
    }
}

impl PriceSource for CsvDirSource {
    fn name(&self) -> &'static str {
        "CSV directory"
    }

    async fn history(&self, symbol: &str, range: FetchRange) -> Result<PriceSeries> {
        let path = self.path_for(symbol);
        if !path.exists() {
            return Err(DashboardError::Adapter(format!(
                "unknown symbol {} (no file at {})",
                normalize_symbol(symbol),
                path.display()
            )));
        }
        info!("Reading history for {} from {}", symbol, path.display());

        let points = read_rows(&path)?
            .into_iter()
            .filter(|p| range.contains(p.date))
            .collect::<Vec<_>>();
        debug!("{} rows in range for {}", points.len(), symbol);

        PriceSeries::new(symbol, points)
    }
}

fn read_rows(path: &Path) -> Result<Vec<PricePoint>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_path(path)
        .map_err(|e| DashboardError::Adapter(format!("failed to open {}: {}", path.display(), e)))?;

    reader
        .deserialize::<CsvRow>()
        .enumerate()
        .map(|(i, row)| {
            row.map(PricePoint::from).map_err(|e| {
                DashboardError::Adapter(format!(
                    "{} line {}: {}",
                    path.display(),
                    i + 2,
                    e
                ))
            })
        })
        .collect()
}
