use chrono::NaiveDate;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::{decimal_from_f64, FetchRange, PriceSource};
use crate::config::SourceConfig;
use crate::error::{DashboardError, Result};
use crate::market::{normalize_symbol, PricePoint, PriceSeries};

/// Yahoo Finance chart response
#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: ChartData,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    result: Option<Vec<ChartResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: Meta,
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Meta {
    /// Exchange offset from UTC in seconds at request time
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
    adjclose: Option<Vec<AdjClose>>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    open: Option<Vec<Option<f64>>>,
    high: Option<Vec<Option<f64>>>,
    low: Option<Vec<Option<f64>>>,
    close: Option<Vec<Option<f64>>>,
    volume: Option<Vec<Option<i64>>>,
}

#[derive(Debug, Deserialize)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    code: String,
    description: String,
}

/// Daily history from the Yahoo Finance chart endpoint
pub struct YahooSource {
    client: Client,
    base_url: String,
}

impl YahooSource {
    pub fn new(config: &SourceConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DashboardError::Adapter(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn chart_url(&self, symbol: &str, range: FetchRange) -> Result<String> {
        let query = match range {
            FetchRange::Max => "range=max&interval=1d".to_string(),
            FetchRange::Between { from, to } => {
                let (period1, period2) = unix_bounds(from, to)?;
                format!("period1={}&period2={}&interval=1d", period1, period2)
            }
        };
        Ok(format!(
            "{}/v8/finance/chart/{}?{}&events=div%2Csplit",
            self.base_url, symbol, query
        ))
    }
}

impl PriceSource for YahooSource {
    fn name(&self) -> &'static str {
        "Yahoo Finance"
    }

    async fn history(&self, symbol: &str, range: FetchRange) -> Result<PriceSeries> {
        let symbol = normalize_symbol(symbol);
        let url = self.chart_url(&symbol, range)?;
        info!("Fetching history for {} from Yahoo Finance", symbol);
        debug!("GET {}", url);

        let response = self.client.get(&url).send().await.map_err(|e| {
            DashboardError::Adapter(format!("failed to reach Yahoo Finance for {}: {}", symbol, e))
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DashboardError::Adapter(format!("unknown symbol {}", symbol)));
        }
        if !status.is_success() {
            return Err(DashboardError::Adapter(format!(
                "Yahoo Finance returned error status {} for {}",
                status, symbol
            )));
        }

        let data: YahooChartResponse = response.json().await.map_err(|e| {
            DashboardError::Adapter(format!("failed to parse Yahoo Finance response: {}", e))
        })?;

        series_from_chart(&symbol, data)
    }
}

/// Parse a chart payload into a series. Rows without a close are skipped.
pub fn parse_chart(symbol: &str, body: &str) -> Result<PriceSeries> {
    let data: YahooChartResponse = serde_json::from_str(body).map_err(|e| {
        DashboardError::Adapter(format!("failed to parse Yahoo Finance response: {}", e))
    })?;
    series_from_chart(symbol, data)
}

fn series_from_chart(symbol: &str, data: YahooChartResponse) -> Result<PriceSeries> {
    if let Some(error) = data.chart.error {
        return Err(DashboardError::Adapter(format!(
            "Yahoo Finance API error: {} - {}",
            error.code, error.description
        )));
    }

    let Some(result) = data.chart.result.and_then(|r| r.into_iter().next()) else {
        return PriceSeries::new(symbol, Vec::new());
    };

    // a symbol with no trading days in range comes back without timestamps
    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result.indicators.quote.into_iter().next();
    let (opens, highs, lows, closes, volumes) = match quote {
        Some(q) => (
            q.open.unwrap_or_default(),
            q.high.unwrap_or_default(),
            q.low.unwrap_or_default(),
            q.close.unwrap_or_default(),
            q.volume.unwrap_or_default(),
        ),
        None => Default::default(),
    };
    let adj_closes = result
        .indicators
        .adjclose
        .and_then(|a| a.into_iter().next())
        .and_then(|a| a.adjclose)
        .unwrap_or_default();

    let mut points = Vec::with_capacity(timestamps.len());
    let mut skipped = 0usize;
    let gmtoffset = result.meta.gmtoffset;
    for (i, &timestamp) in timestamps.iter().enumerate() {
        let date = bar_date(timestamp, gmtoffset)?;

        let Some(close) = float_at(&closes, i) else {
            skipped += 1;
            continue;
        };

        points.push(PricePoint {
            date,
            open: float_at(&opens, i),
            high: float_at(&highs, i),
            low: float_at(&lows, i),
            close,
            adj_close: float_at(&adj_closes, i),
            volume: volumes.get(i).copied().flatten(),
        });
    }

    if skipped > 0 {
        warn!("{}: skipped {} row(s) without a close price", symbol, skipped);
    }
    debug!("Parsed {} rows for {}", points.len(), symbol);

    PriceSeries::new(symbol, points)
}

/// Trading date of a daily bar. Bars are stamped at the session start in
/// exchange time, and `gmtoffset` is the offset at request time, so a bar
/// from the other side of a DST change can land an hour before midnight.
/// Shifting by one more hour keeps such bars on their own date.
fn bar_date(timestamp: i64, gmtoffset: i64) -> Result<NaiveDate> {
    let local = timestamp
        .checked_add(gmtoffset)
        .and_then(|t| t.checked_add(DST_SLACK_SECS))
        .and_then(|t| chrono::DateTime::from_timestamp(t, 0))
        .ok_or_else(|| DashboardError::Adapter(format!("invalid timestamp {}", timestamp)))?;
    Ok(local.date_naive())
}

const DST_SLACK_SECS: i64 = 3600;

fn float_at(column: &[Option<f64>], i: usize) -> Option<Decimal> {
    column.get(i).copied().flatten().and_then(decimal_from_f64)
}

/// Unix seconds from the start of `from` to the end of `to` (UTC)
fn unix_bounds(from: NaiveDate, to: NaiveDate) -> Result<(i64, i64)> {
    let start = from
        .and_hms_opt(0, 0, 0)
        .ok_or_else(|| DashboardError::InvalidInput(format!("invalid start date {}", from)))?
        .and_utc()
        .timestamp();
    let end = to
        .and_hms_opt(23, 59, 59)
        .ok_or_else(|| DashboardError::InvalidInput(format!("invalid end date {}", to)))?
        .and_utc()
        .timestamp();
    Ok((start, end))
}
