// In-memory provider for unit and router tests.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::RwLock;

use crate::error::ProviderError;
use crate::market_data::{
    Bar, CorporateActions, FinancialStatements, Fundamentals, MarketDataProvider, PriceHistory,
    TrendingFeed, TrendingTicker,
};

#[derive(Default)]
pub struct MockProvider {
    bars: RwLock<HashMap<String, Vec<Bar>>>,
    fundamentals: RwLock<HashMap<String, Fundamentals>>,
    actions: RwLock<HashMap<String, CorporateActions>>,
    financials: RwLock<HashMap<String, FinancialStatements>>,
    trending: RwLock<Option<Vec<TrendingTicker>>>,
    failing: RwLock<Vec<String>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register daily bars for `symbol`, one per calendar day starting at
    /// `start`, with the given closes.
    pub fn with_closes(self, symbol: &str, start: NaiveDate, closes: &[f64]) -> Self {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: start + chrono::Duration::days(i as i64),
                open: close,
                high: close * 1.01,
                low: close * 0.99,
                close,
                volume: 1_000 + i as u64,
            })
            .collect();
        self.bars.write().insert(symbol.to_string(), bars);
        self
    }

    pub fn with_fundamentals(self, fundamentals: Fundamentals) -> Self {
        self.fundamentals
            .write()
            .insert(fundamentals.symbol.clone(), fundamentals);
        self
    }

    pub fn with_actions(self, symbol: &str, actions: CorporateActions) -> Self {
        self.actions.write().insert(symbol.to_string(), actions);
        self
    }

    pub fn with_financials(self, symbol: &str, financials: FinancialStatements) -> Self {
        self.financials.write().insert(symbol.to_string(), financials);
        self
    }

    pub fn with_trending(self, tickers: Vec<TrendingTicker>) -> Self {
        *self.trending.write() = Some(tickers);
        self
    }

    /// Every call for `symbol` fails with an upstream error.
    pub fn failing(self, symbol: &str) -> Self {
        self.failing.write().push(symbol.to_string());
        self
    }

    fn check(&self, symbol: &str) -> Result<(), ProviderError> {
        if self.failing.read().iter().any(|s| s == symbol) {
            return Err(ProviderError::Upstream {
                status: 503,
                message: "mock outage".into(),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl MarketDataProvider for MockProvider {
    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory, ProviderError> {
        self.check(symbol)?;
        let bars = self
            .bars
            .read()
            .get(symbol)
            .map(|bars| {
                bars.iter()
                    .filter(|b| b.date >= start && b.date < end)
                    .copied()
                    .collect()
            })
            .unwrap_or_default();
        Ok(PriceHistory::new(symbol, Some("USD".into()), bars))
    }

    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals, ProviderError> {
        self.check(symbol)?;
        self.fundamentals
            .read()
            .get(symbol)
            .cloned()
            .ok_or_else(|| ProviderError::no_data(symbol))
    }

    async fn corporate_actions(&self, symbol: &str) -> Result<CorporateActions, ProviderError> {
        self.check(symbol)?;
        Ok(self.actions.read().get(symbol).cloned().unwrap_or_default())
    }

    async fn financials(&self, symbol: &str) -> Result<FinancialStatements, ProviderError> {
        self.check(symbol)?;
        Ok(self.financials.read().get(symbol).cloned().unwrap_or_default())
    }
}

#[async_trait]
impl TrendingFeed for MockProvider {
    async fn trending(&self) -> Result<Vec<TrendingTicker>, ProviderError> {
        self.trending
            .read()
            .clone()
            .ok_or_else(|| ProviderError::TrendingUnavailable("no script tag".into()))
    }
}
