// =============================================================================
// Trending tickers - JSON embedded in the trending page
// =============================================================================
//
// The trending page ships its ticker list as a JSON array inside
//
//   <script id="fin-trending-tickers" type="application/json"> [...] </script>
//
// Each element carries `symbol`, `longName` and `{raw, fmt}` objects for
// `regularMarketPrice`, `regularMarketChangePercent` and `regularMarketTime`.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::market_data::{Quoted, TrendingTicker};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawTrendingItem {
    symbol: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    regular_market_price: Option<Quoted>,
    regular_market_change_percent: Option<Quoted>,
    regular_market_time: Option<Quoted>,
}

fn script_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(
            r#"(?is)<script\b[^>]*\bid\s*=\s*["']fin-trending-tickers["'][^>]*>(.*?)</script>"#,
        )
        .unwrap_or_else(|e| unreachable!("static trending regex is valid: {e}"))
    })
}

/// Pull the trending-tickers JSON out of the page and parse it.
///
/// Entries without a symbol are skipped; feed order is preserved.
pub fn extract_trending_tickers(html: &str) -> Result<Vec<TrendingTicker>, ProviderError> {
    let json = script_pattern()
        .captures(html)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .ok_or_else(|| {
            ProviderError::TrendingUnavailable("fin-trending-tickers script tag not found".into())
        })?;

    let items: Vec<RawTrendingItem> = serde_json::from_str(json).map_err(|e| {
        ProviderError::TrendingUnavailable(format!("failed to parse trending JSON: {e}"))
    })?;

    let total = items.len();
    let tickers: Vec<TrendingTicker> = items
        .into_iter()
        .filter_map(|item| {
            let symbol = item.symbol.filter(|s| !s.trim().is_empty())?;
            Some(TrendingTicker {
                symbol,
                name: item.long_name.or(item.short_name),
                price: item.regular_market_price,
                change_percent: item.regular_market_change_percent,
                market_time: item.regular_market_time,
            })
        })
        .collect();

    if tickers.len() < total {
        debug!(skipped = total - tickers.len(), "trending entries without a symbol skipped");
    }

    Ok(tickers)
}
