//! Marketdash - terminal market dashboards
//!
//! Fetches daily price history for stocks, cryptocurrencies, mutual funds and
//! currencies, values a weighted portfolio against an alert threshold, and
//! projects a naive compounded return for a single instrument.

pub mod analytics;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod dispatcher;
pub mod error;
pub mod market;
pub mod sources;
pub mod ui;
pub mod utils;
