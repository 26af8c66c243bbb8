// =============================================================================
// Provider errors
// =============================================================================
//
// Failures at the data-acquisition boundary. Indicator computation never
// fails: short histories and degenerate correlations show up as undefined
// values in the report instead.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider has no bars (or no record at all) for the symbol / range.
    #[error("no data found for symbol {symbol} in the requested range")]
    NoData { symbol: String },

    /// Transport-level failure (DNS, TLS, timeout, body read).
    #[error("market data request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The provider answered with a non-success status.
    #[error("market data provider returned HTTP {status}: {message}")]
    Upstream { status: u16, message: String },

    /// The provider answered, but not with the shape we expect.
    #[error("malformed market data response: {0}")]
    Malformed(String),

    /// The trending page was fetched but carried no usable ticker list.
    #[error("trending tickers unavailable: {0}")]
    TrendingUnavailable(String),
}

impl ProviderError {
    pub fn no_data(symbol: impl Into<String>) -> Self {
        Self::NoData {
            symbol: symbol.into(),
        }
    }

    /// Short machine-readable code for the error log.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NoData { .. } => "no_data",
            Self::Request(_) => "request",
            Self::Upstream { .. } => "upstream",
            Self::Malformed(_) => "malformed",
            Self::TrendingUnavailable(_) => "trending_unavailable",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_symbol() {
        let err = ProviderError::no_data("ZZZZ");
        assert_eq!(
            err.to_string(),
            "no data found for symbol ZZZZ in the requested range"
        );
        assert_eq!(err.code(), "no_data");
    }

    #[test]
    fn upstream_message() {
        let err = ProviderError::Upstream {
            status: 503,
            message: "Service Unavailable".into(),
        };
        assert_eq!(
            err.to_string(),
            "market data provider returned HTTP 503: Service Unavailable"
        );
    }
}
