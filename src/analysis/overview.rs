// =============================================================================
// Quote overview - the Search section payload
// =============================================================================

use chrono::NaiveDate;
use serde::Serialize;

use crate::indicators::{sma, DerivedSeries};
use crate::market_data::{
    Bar, CorporateActions, Dividend, FinancialStatements, Fundamentals, PriceHistory, Split,
};
use crate::runtime_config::IndicatorParams;
use crate::types::HistoryPeriod;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuoteOverview {
    pub symbol: String,
    pub period: HistoryPeriod,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub fundamentals: Fundamentals,
    pub bars: Vec<Bar>,
    /// Medium and long SMA drawn over the candlesticks.
    pub overlays: Vec<DerivedSeries>,
    pub last_close: Option<f64>,
    /// Percent change of the last close against the previous close.
    pub change_pct: Option<f64>,
    pub dividends: Vec<Dividend>,
    pub splits: Vec<Split>,
    pub financials: FinancialStatements,
}

impl QuoteOverview {
    pub fn build(
        fundamentals: Fundamentals,
        history: &PriceHistory,
        actions: CorporateActions,
        financials: FinancialStatements,
        period: HistoryPeriod,
        (start, end): (NaiveDate, NaiveDate),
        params: &IndicatorParams,
    ) -> Self {
        let mut bars = history.bars.clone();
        if let Some(sessions) = period.trading_sessions() {
            let skip = bars.len().saturating_sub(sessions);
            bars.drain(..skip);
        }

        let dates: Vec<NaiveDate> = bars.iter().map(|b| b.date).collect();
        let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
        let overlays = vec![
            DerivedSeries::aligned(
                format!("SMA{}", params.sma_medium),
                &dates,
                sma(&closes, params.sma_medium),
            ),
            DerivedSeries::aligned(
                format!("SMA{}", params.sma_long),
                &dates,
                sma(&closes, params.sma_long),
            ),
        ];

        let last_close = closes.last().copied();
        let previous = match closes.len() {
            0 | 1 => fundamentals.previous_close,
            n => Some(closes[n - 2]),
        };
        let change_pct = match (last_close, previous) {
            (Some(last), Some(prev)) if prev != 0.0 => Some((last / prev - 1.0) * 100.0),
            _ => None,
        };

        Self {
            symbol: history.symbol.clone(),
            period,
            start,
            end,
            fundamentals,
            bars,
            overlays,
            last_close,
            change_pct,
            dividends: actions.dividends,
            splits: actions.splits,
            financials,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn history(closes: &[f64]) -> PriceHistory {
        let bars = closes
            .iter()
            .enumerate()
            .map(|(i, &close)| Bar {
                date: day(i as u32 + 1),
                open: close,
                high: close,
                low: close,
                close,
                volume: 10,
            })
            .collect();
        PriceHistory::new("MSFT", None, bars)
    }

    fn fundamentals() -> Fundamentals {
        Fundamentals {
            symbol: "MSFT".into(),
            previous_close: Some(400.0),
            ..Default::default()
        }
    }

    #[test]
    fn month_keeps_every_bar_and_aligns_overlays() {
        let h = history(&[410.0, 412.0, 408.0, 420.0]);
        let o = QuoteOverview::build(
            fundamentals(),
            &h,
            CorporateActions::default(),
            FinancialStatements::default(),
            HistoryPeriod::OneMonth,
            (day(1), day(5)),
            &IndicatorParams::default(),
        );
        assert_eq!(o.bars.len(), 4);
        assert_eq!(o.overlays.len(), 2);
        assert_eq!(o.overlays[0].name, "SMA50");
        assert_eq!(o.overlays[1].len(), 4);
        assert_eq!(o.overlays[1].defined_count(), 0);
        assert_eq!(o.last_close, Some(420.0));
        let change = o.change_pct.unwrap();
        assert!((change - (420.0 / 408.0 - 1.0) * 100.0).abs() < 1e-9);
    }

    #[test]
    fn one_day_keeps_the_last_session_only() {
        let h = history(&[410.0, 412.0, 408.0]);
        let o = QuoteOverview::build(
            fundamentals(),
            &h,
            CorporateActions::default(),
            FinancialStatements::default(),
            HistoryPeriod::OneDay,
            (day(1), day(4)),
            &IndicatorParams::default(),
        );
        assert_eq!(o.bars.len(), 1);
        assert_eq!(o.bars[0].close, 408.0);
        // Falls back to the quoted previous close.
        assert!((o.change_pct.unwrap() - 2.0).abs() < 1e-9);
    }

    #[test]
    fn actions_are_passed_through() {
        let actions = CorporateActions {
            dividends: vec![Dividend {
                date: day(2),
                amount: 0.75,
            }],
            splits: Vec::new(),
        };
        let o = QuoteOverview::build(
            fundamentals(),
            &history(&[1.0, 2.0]),
            actions,
            FinancialStatements::default(),
            HistoryPeriod::FiveDays,
            (day(1), day(3)),
            &IndicatorParams::default(),
        );
        assert_eq!(o.dividends.len(), 1);
        assert!(o.splits.is_empty());
        assert_eq!(o.bars.len(), 2);
        assert!(o.financials.is_empty());
    }
}
