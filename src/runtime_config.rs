// =============================================================================
// Dashboard Configuration - JSON settings with atomic save
// =============================================================================
//
// Every tunable of the dashboard lives here: where to bind, which provider
// endpoints to call, the benchmark used for correlation, the default analysis
// date range and the indicator windows.
//
// All fields carry `#[serde(default)]` so that adding new fields never breaks
// loading an older config file. Persistence uses an atomic tmp + rename.
// =============================================================================

use std::path::Path;

use anyhow::{ensure, Context, Result};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::info;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

fn default_benchmark_symbol() -> String {
    "^GSPC".to_string()
}

fn default_chart_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_quote_summary_base_url() -> String {
    "https://query2.finance.yahoo.com".to_string()
}

fn default_trending_url() -> String {
    "https://finance.yahoo.com/markets/stocks/trending/".to_string()
}

fn default_quote_page_base_url() -> String {
    "https://finance.yahoo.com/quote".to_string()
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
        .to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_analysis_start() -> NaiveDate {
    NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

fn default_analysis_end() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default()
}

fn default_significant_change_pct() -> f64 {
    3.0
}

fn default_cards_per_row() -> usize {
    5
}

fn default_max_recent_errors() -> usize {
    50
}

fn default_sma_short() -> usize {
    20
}

fn default_sma_medium() -> usize {
    50
}

fn default_sma_long() -> usize {
    200
}

fn default_ema_fast() -> usize {
    12
}

fn default_ema_slow() -> usize {
    26
}

fn default_ema_trend() -> usize {
    50
}

fn default_macd_signal() -> usize {
    9
}

fn default_rsi_period() -> usize {
    14
}

fn default_rsi_overbought() -> f64 {
    70.0
}

fn default_rsi_oversold() -> f64 {
    30.0
}

fn default_bollinger_window() -> usize {
    20
}

fn default_bollinger_k() -> f64 {
    2.0
}

// =============================================================================
// IndicatorParams
// =============================================================================

/// Window lengths for every indicator on the analysis page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    #[serde(default = "default_sma_short")]
    pub sma_short: usize,

    #[serde(default = "default_sma_medium")]
    pub sma_medium: usize,

    #[serde(default = "default_sma_long")]
    pub sma_long: usize,

    /// Fast EMA span, also the MACD fast leg.
    #[serde(default = "default_ema_fast")]
    pub ema_fast: usize,

    /// Slow EMA span, also the MACD slow leg.
    #[serde(default = "default_ema_slow")]
    pub ema_slow: usize,

    /// EMA plotted next to the medium SMA.
    #[serde(default = "default_ema_trend")]
    pub ema_trend: usize,

    #[serde(default = "default_macd_signal")]
    pub macd_signal: usize,

    #[serde(default = "default_rsi_period")]
    pub rsi_period: usize,

    /// Guide line drawn on the RSI chart.
    #[serde(default = "default_rsi_overbought")]
    pub rsi_overbought: f64,

    /// Guide line drawn on the RSI chart.
    #[serde(default = "default_rsi_oversold")]
    pub rsi_oversold: f64,

    #[serde(default = "default_bollinger_window")]
    pub bollinger_window: usize,

    /// Number of standard deviations between the middle and outer bands.
    #[serde(default = "default_bollinger_k")]
    pub bollinger_k: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            sma_short: default_sma_short(),
            sma_medium: default_sma_medium(),
            sma_long: default_sma_long(),
            ema_fast: default_ema_fast(),
            ema_slow: default_ema_slow(),
            ema_trend: default_ema_trend(),
            macd_signal: default_macd_signal(),
            rsi_period: default_rsi_period(),
            rsi_overbought: default_rsi_overbought(),
            rsi_oversold: default_rsi_oversold(),
            bollinger_window: default_bollinger_window(),
            bollinger_k: default_bollinger_k(),
        }
    }
}

impl IndicatorParams {
    pub fn validate(&self) -> Result<()> {
        let windows = [
            ("sma_short", self.sma_short),
            ("sma_medium", self.sma_medium),
            ("sma_long", self.sma_long),
            ("ema_fast", self.ema_fast),
            ("ema_slow", self.ema_slow),
            ("ema_trend", self.ema_trend),
            ("macd_signal", self.macd_signal),
            ("rsi_period", self.rsi_period),
            ("bollinger_window", self.bollinger_window),
        ];
        for (name, value) in windows {
            ensure!(value > 0, "indicator window `{name}` must be positive");
        }
        ensure!(
            self.bollinger_k > 0.0 && self.bollinger_k.is_finite(),
            "bollinger_k must be a positive number, got {}",
            self.bollinger_k
        );
        ensure!(
            self.rsi_oversold < self.rsi_overbought,
            "rsi_oversold ({}) must be below rsi_overbought ({})",
            self.rsi_oversold,
            self.rsi_overbought
        );
        Ok(())
    }
}

// =============================================================================
// DashboardConfig
// =============================================================================

/// Top-level configuration for the stock tracker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DashboardConfig {
    // --- Server --------------------------------------------------------------

    /// Address the HTTP API binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    // --- Provider ------------------------------------------------------------

    /// Reference instrument for the correlation figure.
    #[serde(default = "default_benchmark_symbol")]
    pub benchmark_symbol: String,

    /// Host serving `/v8/finance/chart/{symbol}`.
    #[serde(default = "default_chart_base_url")]
    pub chart_base_url: String,

    /// Host serving `/v10/finance/quoteSummary/{symbol}`.
    #[serde(default = "default_quote_summary_base_url")]
    pub quote_summary_base_url: String,

    /// Page whose `fin-trending-tickers` script carries the trending list.
    #[serde(default = "default_trending_url")]
    pub trending_url: String,

    /// Prefix for the per-symbol quote links on trending cards.
    #[serde(default = "default_quote_page_base_url")]
    pub quote_page_base_url: String,

    /// The trending page rejects requests without a browser user agent.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    // --- Analysis ------------------------------------------------------------

    /// Start date used when an analysis request omits `start`.
    #[serde(default = "default_analysis_start")]
    pub default_start: NaiveDate,

    /// End date (exclusive) used when an analysis request omits `end`.
    #[serde(default = "default_analysis_end")]
    pub default_end: NaiveDate,

    /// Absolute daily move, in percent, above which a day is marked.
    #[serde(default = "default_significant_change_pct")]
    pub significant_change_pct: f64,

    #[serde(default)]
    pub indicators: IndicatorParams,

    // --- Presentation --------------------------------------------------------

    #[serde(default = "default_cards_per_row")]
    pub cards_per_row: usize,

    /// Capacity of the recent provider-error log.
    #[serde(default = "default_max_recent_errors")]
    pub max_recent_errors: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            benchmark_symbol: default_benchmark_symbol(),
            chart_base_url: default_chart_base_url(),
            quote_summary_base_url: default_quote_summary_base_url(),
            trending_url: default_trending_url(),
            quote_page_base_url: default_quote_page_base_url(),
            user_agent: default_user_agent(),
            request_timeout_secs: default_request_timeout_secs(),
            default_start: default_analysis_start(),
            default_end: default_analysis_end(),
            significant_change_pct: default_significant_change_pct(),
            indicators: IndicatorParams::default(),
            cards_per_row: default_cards_per_row(),
            max_recent_errors: default_max_recent_errors(),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read dashboard config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse dashboard config from {}", path.display()))?;

        info!(
            path = %path.display(),
            benchmark = %config.benchmark_symbol,
            bind_addr = %config.bind_addr,
            "dashboard config loaded"
        );

        Ok(config)
    }

    /// Persist the configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise dashboard config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "dashboard config saved (atomic)");
        Ok(())
    }

    /// Reject settings that would make every request fail.
    pub fn validate(&self) -> Result<()> {
        ensure!(
            !self.benchmark_symbol.trim().is_empty(),
            "benchmark_symbol must not be empty"
        );
        ensure!(
            self.default_start < self.default_end,
            "default_start ({}) must be before default_end ({})",
            self.default_start,
            self.default_end
        );
        ensure!(
            self.significant_change_pct >= 0.0 && self.significant_change_pct.is_finite(),
            "significant_change_pct must be a non-negative number"
        );
        ensure!(self.cards_per_row > 0, "cards_per_row must be positive");
        ensure!(
            self.request_timeout_secs > 0,
            "request_timeout_secs must be positive"
        );
        self.indicators.validate()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = DashboardConfig::default();
        assert_eq!(cfg.benchmark_symbol, "^GSPC");
        assert_eq!(cfg.default_start, NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(cfg.default_end, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(cfg.cards_per_row, 5);
        assert!((cfg.significant_change_pct - 3.0).abs() < f64::EPSILON);

        let p = &cfg.indicators;
        assert_eq!((p.sma_short, p.sma_medium, p.sma_long), (20, 50, 200));
        assert_eq!((p.ema_fast, p.ema_slow, p.ema_trend), (12, 26, 50));
        assert_eq!(p.macd_signal, 9);
        assert_eq!(p.rsi_period, 14);
        assert_eq!(p.bollinger_window, 20);
        assert!((p.bollinger_k - 2.0).abs() < f64::EPSILON);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: DashboardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, DashboardConfig::default());
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{ "benchmark_symbol": "^NDX", "indicators": { "rsi_period": 7 } }"#;
        let cfg: DashboardConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.benchmark_symbol, "^NDX");
        assert_eq!(cfg.indicators.rsi_period, 7);
        assert_eq!(cfg.indicators.sma_long, 200);
        assert_eq!(cfg.cards_per_row, 5);
    }

    #[test]
    fn validate_rejects_zero_window() {
        let mut cfg = DashboardConfig::default();
        cfg.indicators.bollinger_window = 0;
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("bollinger_window"));
    }

    #[test]
    fn validate_rejects_inverted_date_range() {
        let mut cfg = DashboardConfig::default();
        cfg.default_end = cfg.default_start;
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn save_then_load_roundtrip() {
        let dir = std::env::temp_dir().join(format!("stock-tracker-cfg-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("dashboard_config.json");

        let mut cfg = DashboardConfig::default();
        cfg.benchmark_symbol = "^DJI".into();
        cfg.save(&path).unwrap();

        let loaded = DashboardConfig::load(&path).unwrap();
        assert_eq!(loaded, cfg);
        assert!(!path.with_extension("json.tmp").exists());

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn load_missing_file_is_an_error() {
        assert!(DashboardConfig::load("/nonexistent/dashboard_config.json").is_err());
    }
}
