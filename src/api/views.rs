// =============================================================================
// View models - trending cards
// =============================================================================
//
// The Trends section renders one card per ticker, `cards_per_row` to a row.
// Every display field is pre-formatted here so the frontend only lays out
// strings; anything the feed omitted shows as "N/A".

use serde::Serialize;

use crate::market_data::{Quoted, TrendingTicker};
use crate::types::Direction;
use crate::yahoo::client::encode_symbol;

const NOT_AVAILABLE: &str = "N/A";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendingCard {
    pub symbol: String,
    pub name: String,
    pub price: String,
    pub change: String,
    pub market_time: String,
    pub direction: Direction,
    pub quote_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TrendingBoard {
    pub fetched_at: String,
    pub tickers: Vec<TrendingTicker>,
    pub rows: Vec<Vec<TrendingCard>>,
}

fn display(q: Option<&Quoted>, fallback: impl Fn(f64) -> String) -> String {
    match q {
        Some(Quoted { fmt: Some(fmt), .. }) if !fmt.trim().is_empty() => fmt.clone(),
        Some(Quoted { raw: Some(raw), .. }) => fallback(*raw),
        _ => NOT_AVAILABLE.to_string(),
    }
}

/// Cards colour by the sign shown to the user: a formatted change with a
/// minus sign is down, any other formatted change is up.
fn direction(change: Option<&Quoted>) -> Direction {
    match change {
        Some(Quoted { fmt: Some(fmt), .. }) if !fmt.trim().is_empty() => {
            if fmt.contains('-') {
                Direction::Down
            } else {
                Direction::Up
            }
        }
        Some(Quoted { raw: Some(raw), .. }) => Direction::from_change(*raw),
        _ => Direction::Flat,
    }
}

impl TrendingCard {
    pub fn from_ticker(ticker: &TrendingTicker, quote_page_base_url: &str) -> Self {
        Self {
            symbol: ticker.symbol.clone(),
            name: ticker
                .name
                .clone()
                .filter(|n| !n.trim().is_empty())
                .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            price: display(ticker.price.as_ref(), |v| format!("{v:.2}")),
            change: display(ticker.change_percent.as_ref(), |v| format!("{v:.2}%")),
            market_time: display(ticker.market_time.as_ref(), |v| format!("{v:.0}")),
            direction: direction(ticker.change_percent.as_ref()),
            quote_url: format!(
                "{}/{}/",
                quote_page_base_url.trim_end_matches('/'),
                encode_symbol(&ticker.symbol)
            ),
        }
    }
}

impl TrendingBoard {
    pub fn build(tickers: Vec<TrendingTicker>, quote_page_base_url: &str, per_row: usize) -> Self {
        let cards: Vec<TrendingCard> = tickers
            .iter()
            .map(|t| TrendingCard::from_ticker(t, quote_page_base_url))
            .collect();
        let rows = cards.chunks(per_row.max(1)).map(<[_]>::to_vec).collect();

        Self {
            fetched_at: chrono::Utc::now().to_rfc3339(),
            tickers,
            rows,
        }
    }
}
