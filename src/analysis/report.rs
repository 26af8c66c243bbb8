// =============================================================================
// Analysis report - everything the Analysis section charts for one symbol
// =============================================================================
//
// Built from the symbol's history and (optionally) the benchmark's history
// over the same window. All series are aligned on the symbol's date axis.
// Short histories and a missing benchmark never fail the report; they show
// up as undefined points plus an entry in `notes`.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::ProviderError;
use crate::indicators::{
    bollinger, correlation, cumulative_returns, daily_returns, ema, macd, rsi,
    returns::joined_pairs, significant_changes, sma, DerivedSeries, SignificantChange,
};
use crate::market_data::{Bar, PriceHistory};
use crate::runtime_config::{DashboardConfig, IndicatorParams};

/// A recoverable condition worth showing next to the charts.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Note {
    /// Fewer bars than `window` needs; the indicator is undefined throughout.
    InsufficientHistory {
        indicator: String,
        window: usize,
        available: usize,
    },
    /// The benchmark could not be loaded; correlation is omitted.
    BenchmarkUnavailable { symbol: String, reason: String },
    /// Too few overlapping returns, or a flat leg, to correlate.
    DegenerateCorrelation { pairs: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RsiPanel {
    pub series: DerivedSeries,
    pub overbought: f64,
    pub oversold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacdPanel {
    pub ema_fast: DerivedSeries,
    pub ema_slow: DerivedSeries,
    pub macd: DerivedSeries,
    pub signal: DerivedSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BollingerPanel {
    pub middle: DerivedSeries,
    pub upper: DerivedSeries,
    pub lower: DerivedSeries,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisReport {
    pub symbol: String,
    pub benchmark_symbol: String,
    pub currency: Option<String>,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub bars: Vec<Bar>,
    /// Short, medium and long SMA followed by the trend EMA.
    pub moving_averages: Vec<DerivedSeries>,
    pub rsi: RsiPanel,
    pub macd: MacdPanel,
    pub bollinger: BollingerPanel,
    pub daily_returns: DerivedSeries,
    pub cumulative_returns: DerivedSeries,
    pub significant_changes: Vec<SignificantChange>,
    /// Pearson correlation of daily returns against the benchmark.
    pub correlation: Option<f64>,
    pub notes: Vec<Note>,
}

impl AnalysisReport {
    /// Assemble the report. `benchmark` is the outcome of the benchmark
    /// fetch; a failure or an empty history only drops the correlation.
    pub fn build(
        history: &PriceHistory,
        benchmark: Result<&PriceHistory, &ProviderError>,
        start: NaiveDate,
        end: NaiveDate,
        config: &DashboardConfig,
    ) -> Self {
        let params = &config.indicators;
        let dates = history.dates();
        let closes = history.closes();
        let mut notes = insufficient_history_notes(closes.len(), params);

        let moving_averages = vec![
            DerivedSeries::aligned(
                format!("SMA{}", params.sma_short),
                &dates,
                sma(&closes, params.sma_short),
            ),
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
            DerivedSeries::dense(
                format!("EMA{}", params.ema_trend),
                &dates,
                ema(&closes, params.ema_trend),
            ),
        ];

        let rsi = RsiPanel {
            series: DerivedSeries::aligned(
                format!("RSI{}", params.rsi_period),
                &dates,
                rsi(&closes, params.rsi_period),
            ),
            overbought: params.rsi_overbought,
            oversold: params.rsi_oversold,
        };

        let lines = macd(&closes, params.ema_fast, params.ema_slow, params.macd_signal);
        let macd = MacdPanel {
            ema_fast: DerivedSeries::dense(format!("EMA{}", params.ema_fast), &dates, lines.ema_fast),
            ema_slow: DerivedSeries::dense(format!("EMA{}", params.ema_slow), &dates, lines.ema_slow),
            macd: DerivedSeries::dense("MACD", &dates, lines.macd),
            signal: DerivedSeries::dense("Signal", &dates, lines.signal),
        };

        let bands = bollinger(&closes, params.bollinger_window, params.bollinger_k);
        let bollinger = BollingerPanel {
            middle: DerivedSeries::aligned("Middle Band", &dates, bands.middle),
            upper: DerivedSeries::aligned("Upper Band", &dates, bands.upper),
            lower: DerivedSeries::aligned("Lower Band", &dates, bands.lower),
        };

        let returns = daily_returns(&closes);
        let significant =
            significant_changes(&dates, &closes, &returns, config.significant_change_pct);
        let cumulative = cumulative_returns(&returns);
        let daily = DerivedSeries::aligned("Daily Return", &dates, returns);

        let correlation = match benchmark {
            Ok(bench) if !bench.is_empty() => {
                let bench_returns = DerivedSeries::aligned(
                    "Benchmark Return",
                    &bench.dates(),
                    daily_returns(&bench.closes()),
                );
                let corr = correlation(&daily, &bench_returns);
                if corr.is_none() {
                    let (pairs, _) = joined_pairs(&daily, &bench_returns);
                    notes.push(Note::DegenerateCorrelation { pairs: pairs.len() });
                }
                corr
            }
            Ok(_) => {
                notes.push(Note::BenchmarkUnavailable {
                    symbol: config.benchmark_symbol.clone(),
                    reason: ProviderError::no_data(&config.benchmark_symbol).to_string(),
                });
                None
            }
            Err(e) => {
                notes.push(Note::BenchmarkUnavailable {
                    symbol: config.benchmark_symbol.clone(),
                    reason: e.to_string(),
                });
                None
            }
        };

        Self {
            symbol: history.symbol.clone(),
            benchmark_symbol: config.benchmark_symbol.clone(),
            currency: history.currency.clone(),
            start,
            end,
            bars: history.bars.clone(),
            moving_averages,
            rsi,
            macd,
            bollinger,
            daily_returns: daily,
            cumulative_returns: DerivedSeries::dense("Cumulative Return", &dates, cumulative),
            significant_changes: significant,
            correlation,
            notes,
        }
    }
}

/// One note per windowed indicator that cannot produce a single value.
fn insufficient_history_notes(available: usize, params: &IndicatorParams) -> Vec<Note> {
    // RSI needs one extra bar: the first delta is undefined.
    let windows = [
        (format!("SMA{}", params.sma_short), params.sma_short, params.sma_short),
        (format!("SMA{}", params.sma_medium), params.sma_medium, params.sma_medium),
        (format!("SMA{}", params.sma_long), params.sma_long, params.sma_long),
        (format!("RSI{}", params.rsi_period), params.rsi_period, params.rsi_period + 1),
        (
            "Bollinger".to_string(),
            params.bollinger_window,
            params.bollinger_window,
        ),
    ];

    windows
        .into_iter()
        .filter(|(_, _, needed)| available < *needed)
        .map(|(indicator, window, _)| Note::InsufficientHistory {
            indicator,
            window,
            available,
        })
        .collect()
}
