// =============================================================================
// Yahoo Finance client
// =============================================================================
//
// Unauthenticated JSON endpoints plus the public trending page:
//
//   history            GET {chart}/v8/finance/chart/{sym}?period1&period2&interval=1d
//   corporate actions  GET {chart}/v8/finance/chart/{sym}?range=max&interval=3mo&events=div|split
//   fundamentals       chart meta (range=5d), topped up by quoteSummary when it answers
//   financials         GET {quoteSummary}/v10/finance/quoteSummary/{sym}?modules=<statements>
//   trending           GET {trending_url} → <script id="fin-trending-tickers">
// =============================================================================

use std::fmt;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use tracing::{debug, instrument, warn};

use super::chart::parse_chart;
use super::quote_summary::{self, parse_quote_summary, parse_statements};
use super::trending::extract_trending_tickers;
use crate::error::ProviderError;
use crate::market_data::{
    CorporateActions, FinancialStatements, Fundamentals, MarketDataProvider, PriceHistory,
    TrendingFeed, TrendingTicker,
};
use crate::runtime_config::DashboardConfig;

/// Upstream error bodies are cut to this many characters before they are
/// surfaced in an error message.
const MAX_ERROR_BODY: usize = 200;

#[derive(Clone)]
pub struct YahooClient {
    chart_base_url: String,
    quote_summary_base_url: String,
    trending_url: String,
    client: reqwest::Client,
}

impl fmt::Debug for YahooClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("YahooClient")
            .field("chart_base_url", &self.chart_base_url)
            .field("quote_summary_base_url", &self.quote_summary_base_url)
            .field("trending_url", &self.trending_url)
            .finish()
    }
}

impl YahooClient {
    pub fn new(config: &DashboardConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .context("failed to build HTTP client")?;

        debug!(
            chart = %config.chart_base_url,
            trending = %config.trending_url,
            "YahooClient initialised"
        );

        Ok(Self {
            chart_base_url: config.chart_base_url.trim_end_matches('/').to_string(),
            quote_summary_base_url: config.quote_summary_base_url.trim_end_matches('/').to_string(),
            trending_url: config.trending_url.clone(),
            client,
        })
    }

    fn chart_url(&self, symbol: &str) -> String {
        format!("{}/v8/finance/chart/{}", self.chart_base_url, encode_symbol(symbol))
    }

    /// GET `url` and return the body text. 404 means the provider does not
    /// know `symbol`; any other non-success status is an upstream failure.
    async fn get_text(
        &self,
        url: &str,
        query: &[(&str, String)],
        symbol: &str,
    ) -> Result<String, ProviderError> {
        let resp = self.client.get(url).query(query).send().await?;
        let status = resp.status();
        let body = resp.text().await?;

        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::no_data(symbol));
        }
        if !status.is_success() {
            return Err(ProviderError::Upstream {
                status: status.as_u16(),
                message: body.chars().take(MAX_ERROR_BODY).collect(),
            });
        }
        Ok(body)
    }

    fn quote_summary_url(&self, symbol: &str) -> String {
        format!(
            "{}/v10/finance/quoteSummary/{}",
            self.quote_summary_base_url,
            encode_symbol(symbol)
        )
    }

    async fn quote_summary(&self, symbol: &str) -> Result<Fundamentals, ProviderError> {
        let query = [("modules", quote_summary::MODULES.to_string())];
        let body = self
            .get_text(&self.quote_summary_url(symbol), &query, symbol)
            .await?;
        parse_quote_summary(symbol, &body)
    }
}

/// Daily bars between two midnights. Dividends and splits come from
/// `corporate_actions`, so no `events` are requested here.
fn history_query(start: NaiveDate, end: NaiveDate) -> [(&'static str, String); 4] {
    [
        ("period1", unix_midnight(start).to_string()),
        ("period2", unix_midnight(end).to_string()),
        ("interval", "1d".to_string()),
        ("includeAdjustedClose", "true".to_string()),
    ]
}

/// Midnight UTC of `date` as a unix timestamp.
fn unix_midnight(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Percent-encode a ticker for use as a path segment. Index symbols such as
/// `^GSPC` and FX pairs such as `EURUSD=X` need this.
pub(crate) fn encode_symbol(symbol: &str) -> String {
    let mut out = String::with_capacity(symbol.len());
    for b in symbol.bytes() {
        if b.is_ascii_alphanumeric() || b == b'.' || b == b'-' {
            out.push(b as char);
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}

#[async_trait]
impl MarketDataProvider for YahooClient {
    #[instrument(skip(self), name = "yahoo::history")]
    async fn history(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<PriceHistory, ProviderError> {
        let query = history_query(start, end);
        let body = self.get_text(&self.chart_url(symbol), &query, symbol).await?;
        let mut history = parse_chart(symbol, &body)?.into_history(symbol);

        // The chart API rounds the window outwards; clamp to [start, end).
        history.bars.retain(|b| b.date >= start && b.date < end);

        debug!(symbol, bars = history.len(), "history fetched");
        Ok(history)
    }

    #[instrument(skip(self), name = "yahoo::fundamentals")]
    async fn fundamentals(&self, symbol: &str) -> Result<Fundamentals, ProviderError> {
        let query = [
            ("range", "5d".to_string()),
            ("interval", "1d".to_string()),
        ];
        let body = self.get_text(&self.chart_url(symbol), &query, symbol).await?;
        let mut fundamentals = parse_chart(symbol, &body)?.meta_fundamentals(symbol);

        match self.quote_summary(symbol).await {
            Ok(summary) => {
                let mut merged = summary;
                merged.merge_missing(fundamentals);
                fundamentals = merged;
            }
            Err(e) => {
                warn!(symbol, error = %e, "quoteSummary unavailable, using chart metadata only");
            }
        }

        Ok(fundamentals)
    }

    #[instrument(skip(self), name = "yahoo::corporate_actions")]
    async fn corporate_actions(&self, symbol: &str) -> Result<CorporateActions, ProviderError> {
        let query = [
            ("range", "max".to_string()),
            ("interval", "3mo".to_string()),
            ("events", "div|split".to_string()),
        ];
        let body = self.get_text(&self.chart_url(symbol), &query, symbol).await?;
        let actions = parse_chart(symbol, &body)?.into_actions();
        debug!(
            symbol,
            dividends = actions.dividends.len(),
            splits = actions.splits.len(),
            "corporate actions fetched"
        );
        Ok(actions)
    }

    #[instrument(skip(self), name = "yahoo::financials")]
    async fn financials(&self, symbol: &str) -> Result<FinancialStatements, ProviderError> {
        let query = [("modules", quote_summary::STATEMENT_MODULES.to_string())];
        let body = self
            .get_text(&self.quote_summary_url(symbol), &query, symbol)
            .await?;
        let statements = parse_statements(symbol, &body)?;
        debug!(
            symbol,
            balance_sheet = statements.balance_sheet.len(),
            income_statement = statements.income_statement.len(),
            cash_flow = statements.cash_flow.len(),
            "financial statements fetched"
        );
        Ok(statements)
    }
}

#[async_trait]
impl TrendingFeed for YahooClient {
    #[instrument(skip(self), name = "yahoo::trending")]
    async fn trending(&self) -> Result<Vec<TrendingTicker>, ProviderError> {
        let resp = self.client.get(&self.trending_url).send().await?;
        let status = resp.status();
        if !status.is_success() {
            return Err(ProviderError::TrendingUnavailable(format!(
                "trending page returned HTTP {status}"
            )));
        }
        let html = resp.text().await?;
        let tickers = extract_trending_tickers(&html)?;
        debug!(count = tickers.len(), "trending tickers fetched");
        Ok(tickers)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbols_are_path_safe() {
        assert_eq!(encode_symbol("AAPL"), "AAPL");
        assert_eq!(encode_symbol("BRK-B"), "BRK-B");
        assert_eq!(encode_symbol("^GSPC"), "%5EGSPC");
        assert_eq!(encode_symbol("EURUSD=X"), "EURUSD%3DX");
    }

    #[test]
    fn midnight_timestamps() {
        assert_eq!(unix_midnight(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()), 86_400);
        assert_eq!(
            unix_midnight(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap()),
            1_577_836_800
        );
    }

    #[test]
    fn history_requests_bars_only() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
        let end = NaiveDate::from_ymd_opt(2024, 2, 2).unwrap();
        let query = history_query(start, end);
        assert!(query.iter().all(|(k, _)| *k != "events"));
        assert_eq!(query[0], ("period1", unix_midnight(start).to_string()));
        assert_eq!(query[1], ("period2", unix_midnight(end).to_string()));
        assert!(query.contains(&("interval", "1d".to_string())));
    }

    #[test]
    fn client_builds_from_defaults() {
        let client = YahooClient::new(&DashboardConfig::default()).unwrap();
        assert_eq!(
            client.chart_url("^GSPC"),
            "https://query1.finance.yahoo.com/v8/finance/chart/%5EGSPC"
        );
        assert!(format!("{client:?}").contains("query2.finance.yahoo.com"));
        assert_eq!(
            client.quote_summary_url("BRK-B"),
            "https://query2.finance.yahoo.com/v10/finance/quoteSummary/BRK-B"
        );
    }
}
