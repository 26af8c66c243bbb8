// =============================================================================
// Yahoo chart API - response model and parsing
// =============================================================================
//
// `GET /v8/finance/chart/{symbol}` returns column-oriented arrays:
//
//   chart.result[0].timestamp                 [t0, t1, ...]   (UTC seconds)
//   chart.result[0].indicators.quote[0].open  [o0, o1, ...]   (nullable)
//   ... high / low / close / volume
//   chart.result[0].events.dividends          { "<ts>": {amount, date} }
//   chart.result[0].events.splits             { "<ts>": {date, numerator, denominator} }
//   chart.result[0].meta                      symbol-level quote metadata
//
// Unknown symbols come back as `chart.error.code == "Not Found"`.
// =============================================================================

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate};
use serde::Deserialize;
use tracing::debug;

use crate::error::ProviderError;
use crate::market_data::{Bar, CorporateActions, Dividend, Fundamentals, PriceHistory, Split};

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChartResult {
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
    #[serde(default)]
    events: Events,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    symbol: Option<String>,
    currency: Option<String>,
    exchange_name: Option<String>,
    long_name: Option<String>,
    short_name: Option<String>,
    chart_previous_close: Option<f64>,
    previous_close: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    /// Exchange offset from UTC in seconds.
    #[serde(default)]
    gmtoffset: i64,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteColumns>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteColumns {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Default, Deserialize)]
struct Events {
    #[serde(default)]
    dividends: HashMap<String, DividendEvent>,
    #[serde(default)]
    splits: HashMap<String, SplitEvent>,
}

#[derive(Debug, Deserialize)]
struct DividendEvent {
    amount: f64,
    date: i64,
}

#[derive(Debug, Deserialize)]
struct SplitEvent {
    date: i64,
    numerator: f64,
    denominator: f64,
}

// ---------------------------------------------------------------------------
// Parsing
// ---------------------------------------------------------------------------

/// Parse a chart response body and unwrap its single result.
pub(crate) fn parse_chart(symbol: &str, body: &str) -> Result<ChartResult, ProviderError> {
    let envelope: ChartEnvelope = serde_json::from_str(body)
        .map_err(|e| ProviderError::Malformed(format!("chart response for {symbol}: {e}")))?;

    if let Some(err) = envelope.chart.error {
        if err.code.eq_ignore_ascii_case("Not Found") {
            return Err(ProviderError::no_data(symbol));
        }
        return Err(ProviderError::Malformed(format!(
            "{}: {}",
            err.code,
            err.description.unwrap_or_default()
        )));
    }

    envelope
        .chart
        .result
        .and_then(|mut results| (!results.is_empty()).then(|| results.swap_remove(0)))
        .ok_or_else(|| ProviderError::no_data(symbol))
}

/// Convert a UTC timestamp into the exchange's calendar date.
fn exchange_date(ts: i64, gmtoffset: i64) -> Option<NaiveDate> {
    DateTime::from_timestamp(ts + gmtoffset, 0).map(|dt| dt.date_naive())
}

impl ChartResult {
    /// Daily bars; rows with any missing OHLC value are dropped.
    pub(crate) fn into_history(self, symbol: &str) -> PriceHistory {
        let offset = self.meta.gmtoffset;
        let cols = self.indicators.quote.into_iter().next().unwrap_or_default();

        let mut bars = Vec::with_capacity(self.timestamp.len());
        let mut dropped = 0usize;
        for (i, &ts) in self.timestamp.iter().enumerate() {
            let at = |col: &Vec<Option<f64>>| col.get(i).copied().flatten();
            let row = (
                exchange_date(ts, offset),
                at(&cols.open),
                at(&cols.high),
                at(&cols.low),
                at(&cols.close),
            );
            match row {
                (Some(date), Some(open), Some(high), Some(low), Some(close)) => {
                    let volume = at(&cols.volume).unwrap_or(0.0).max(0.0) as u64;
                    bars.push(Bar {
                        date,
                        open,
                        high,
                        low,
                        close,
                        volume,
                    });
                }
                _ => dropped += 1,
            }
        }

        if dropped > 0 {
            debug!(symbol, dropped, "skipped chart rows with missing prices");
        }

        PriceHistory::new(symbol, self.meta.currency, bars)
    }

    /// Dividends and splits, ascending by date.
    pub(crate) fn into_actions(self) -> CorporateActions {
        let offset = self.meta.gmtoffset;

        let mut dividends: Vec<Dividend> = self
            .events
            .dividends
            .into_values()
            .filter_map(|d| {
                Some(Dividend {
                    date: exchange_date(d.date, offset)?,
                    amount: d.amount,
                })
            })
            .collect();
        dividends.sort_by_key(|d| d.date);

        let mut splits: Vec<Split> = self
            .events
            .splits
            .into_values()
            .filter_map(|s| {
                Some(Split {
                    date: exchange_date(s.date, offset)?,
                    numerator: s.numerator,
                    denominator: s.denominator,
                })
            })
            .collect();
        splits.sort_by_key(|s| s.date);

        CorporateActions { dividends, splits }
    }

    /// Fundamentals available from chart metadata alone.
    pub(crate) fn meta_fundamentals(&self, symbol: &str) -> Fundamentals {
        let m = &self.meta;
        Fundamentals {
            symbol: m.symbol.clone().unwrap_or_else(|| symbol.to_string()),
            long_name: m.long_name.clone().or_else(|| m.short_name.clone()),
            previous_close: m.previous_close.or(m.chart_previous_close),
            day_low: m.regular_market_day_low,
            day_high: m.regular_market_day_high,
            fifty_two_week_low: m.fifty_two_week_low,
            fifty_two_week_high: m.fifty_two_week_high,
            volume: m.regular_market_volume.map(|v| v.max(0.0) as u64),
            currency: m.currency.clone(),
            exchange: m.exchange_name.clone(),
            ..Default::default()
        }
    }
}
