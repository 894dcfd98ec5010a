//! Error handling for marketdash
//!
//! Every failure a dashboard render can hit is a tagged value of
//! [`DashboardError`]. The library returns these directly; the binary glue
//! wraps them in `anyhow` for context chaining.

use thiserror::Error;

/// Errors surfaced to the presentation layer
#[derive(Error, Debug)]
pub enum DashboardError {
    /// An allocation weight names a symbol that was not fetched
    #[error("missing symbol: {symbol} is not in the fetched price data")]
    MissingSymbol { symbol: String },

    /// Too few observations to compute the requested figure
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Opaque failure from the data source (network, unknown symbol, bad payload)
    #[error("data source error: {0}")]
    Adapter(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("config error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl DashboardError {
    /// Stable machine-readable tag, used in JSON output
    pub fn kind(&self) -> &'static str {
        match self {
            DashboardError::MissingSymbol { .. } => "missing_symbol",
            DashboardError::InsufficientData(_) => "insufficient_data",
            DashboardError::Adapter(_) => "adapter",
            DashboardError::InvalidInput(_) => "invalid_input",
            DashboardError::Config(_) => "config",
            DashboardError::Io(_) => "io",
        }
    }

    /// Whether the error means "nothing to show" rather than "something broke"
    pub fn is_warning(&self) -> bool {
        matches!(self, DashboardError::InsufficientData(_))
    }
}

/// Result type alias for library operations
pub type Result<T> = std::result::Result<T, DashboardError>;
