// =============================================================================
// Provider ports
// =============================================================================
//
// The dashboard consumes market data through these two traits. `YahooClient`
// implements both; tests plug in `MockProvider`.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::ProviderError;
use crate::market_data::{
    CorporateActions, FinancialStatements, Fundamentals, PriceHistory, TrendingTicker,
};

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily bars for `symbol` with `start <= date < end`, ascending.
    ///
    /// An empty history is a valid answer; callers decide whether that is a
    /// `NoData` condition.
    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory, ProviderError>;

    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals, ProviderError>;

    async fn corporate_actions(&self, symbol: &str) -> Result<CorporateActions, ProviderError>;

    /// Annual balance sheet, income statement and cash flow.
    async fn financials(&self, symbol: &str) -> Result<FinancialStatements, ProviderError>;
}

#[async_trait]
pub trait TrendingFeed: Send + Sync {
    /// Trending tickers in feed order.
    async fn trending(&self) -> Result<Vec<TrendingTicker>, ProviderError>;
}
