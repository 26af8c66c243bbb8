use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Data types
// ---------------------------------------------------------------------------

/// One daily OHLCV bar.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Daily bars for one symbol, ascending by date with unique dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceHistory {
    pub symbol: String,
    pub currency: Option<String>,
    pub bars: Vec<Bar>,
}

impl PriceHistory {
    /// Build a history, sorting by date and keeping the last bar for any
    /// duplicated date.
    pub fn new(symbol: impl Into<String>, currency: Option<String>, mut bars: Vec<Bar>) -> Self {
        // Stable sort keeps arrival order among equal dates, so the last one
        // seen is the one retained below.
        bars.sort_by_key(|b| b.date);
        let mut deduped: Vec<Bar> = Vec::with_capacity(bars.len());
        for bar in bars {
            match deduped.last_mut() {
                Some(last) if last.date == bar.date => *last = bar,
                _ => deduped.push(bar),
            }
        }
        Self {
            symbol: symbol.into(),
            currency,
            bars: deduped,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn dates(&self) -> Vec<NaiveDate> {
        self.bars.iter().map(|b| b.date).collect()
    }

    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }
}

/// Point-in-time fundamentals for a symbol. Every field is independently
/// optional; the provider fills what it can.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub symbol: String,
    pub long_name: Option<String>,
    pub sector: Option<String>,
    pub industry: Option<String>,
    pub market_cap: Option<f64>,
    pub trailing_pe: Option<f64>,
    pub dividend_yield: Option<f64>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub day_low: Option<f64>,
    pub day_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub fifty_two_week_high: Option<f64>,
    pub volume: Option<u64>,
    pub country: Option<String>,
    pub currency: Option<String>,
    pub website: Option<String>,
    pub exchange: Option<String>,
}

impl Fundamentals {
    /// Fill every field that is `None` here from `other`.
    pub fn merge_missing(&mut self, other: Fundamentals) {
        macro_rules! fill {
            ($($field:ident),* $(,)?) => {
                $(
                    if self.$field.is_none() {
                        self.$field = other.$field;
                    }
                )*
            };
        }
        fill!(
            long_name,
            sector,
            industry,
            market_cap,
            trailing_pe,
            dividend_yield,
            previous_close,
            open,
            day_low,
            day_high,
            fifty_two_week_low,
            fifty_two_week_high,
            volume,
            country,
            currency,
            website,
            exchange,
        );
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dividend {
    pub date: NaiveDate,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Split {
    pub date: NaiveDate,
    pub numerator: f64,
    pub denominator: f64,
}

/// Dividend and split history, ascending by date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorporateActions {
    pub dividends: Vec<Dividend>,
    pub splits: Vec<Split>,
}

/// One reporting period of a financial statement: line items keyed by the
/// provider's camelCase name (`totalRevenue`, `totalAssets`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatementPeriod {
    pub end_date: NaiveDate,
    pub items: BTreeMap<String, f64>,
}

/// Annual statements, newest period first. Empty when the provider has none.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialStatements {
    pub balance_sheet: Vec<StatementPeriod>,
    pub income_statement: Vec<StatementPeriod>,
    pub cash_flow: Vec<StatementPeriod>,
}

impl FinancialStatements {
    pub fn is_empty(&self) -> bool {
        self.balance_sheet.is_empty()
            && self.income_statement.is_empty()
            && self.cash_flow.is_empty()
    }
}

/// A `{raw, fmt}` pair as published by the trending feed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Quoted {
    pub raw: Option<f64>,
    pub fmt: Option<String>,
}

/// One entry of the trending-tickers feed, in feed order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingTicker {
    pub symbol: String,
    pub name: Option<String>,
    pub price: Option<Quoted>,
    pub change_percent: Option<Quoted>,
    pub market_time: Option<Quoted>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(day: u32, close: f64) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 3, day).unwrap(),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn history_sorts_and_dedups() {
        let h = PriceHistory::new("AAPL", None, vec![bar(3, 3.0), bar(1, 1.0), bar(3, 3.5), bar(2, 2.0)]);
        assert_eq!(h.len(), 3);
        assert_eq!(h.closes(), vec![1.0, 2.0, 3.5]);
    }

    #[test]
    fn empty_history() {
        let h = PriceHistory::new("AAPL", None, Vec::new());
        assert!(h.is_empty());
        assert!(h.dates().is_empty());
    }

    #[test]
    fn merge_missing_keeps_existing_values() {
        let mut a = Fundamentals {
            symbol: "MSFT".into(),
            long_name: Some("Microsoft Corporation".into()),
            ..Default::default()
        };
        let b = Fundamentals {
            symbol: "MSFT".into(),
            long_name: Some("Other".into()),
            sector: Some("Technology".into()),
            volume: Some(42),
            ..Default::default()
        };
        a.merge_missing(b);
        assert_eq!(a.long_name.as_deref(), Some("Microsoft Corporation"));
        assert_eq!(a.sector.as_deref(), Some("Technology"));
        assert_eq!(a.volume, Some(42));
    }
}
