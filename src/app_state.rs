// =============================================================================
// Central Application State - Stock Tracker
// =============================================================================
//
// Shared by every request handler via `Arc<AppState>`. Configuration and the
// provider handles are immutable after startup; the only mutable piece is the
// bounded log of recent provider failures shown on the dashboard.
// =============================================================================

use std::sync::Arc;

use chrono::Utc;
use parking_lot::RwLock;
use serde::Serialize;
use tracing::warn;

use crate::error::ProviderError;
use crate::market_data::{MarketDataProvider, TrendingFeed};
use crate::runtime_config::DashboardConfig;

// =============================================================================
// Error Record
// =============================================================================

/// A recorded provider failure for the dashboard error log.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorRecord {
    /// Human-readable error message.
    pub message: String,
    /// Machine-readable error code (see [`ProviderError::code`]).
    pub code: Option<String>,
    /// Symbol the failing request was about, if any.
    pub symbol: Option<String>,
    /// ISO 8601 timestamp.
    pub at: String,
}

// =============================================================================
// AppState
// =============================================================================

pub struct AppState {
    pub config: Arc<DashboardConfig>,

    // ── Providers ───────────────────────────────────────────────────────
    pub provider: Arc<dyn MarketDataProvider>,
    pub trending: Arc<dyn TrendingFeed>,

    // ── Error Log ───────────────────────────────────────────────────────
    pub recent_errors: RwLock<Vec<ErrorRecord>>,

    /// Instant when the server was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(
        config: DashboardConfig,
        provider: Arc<dyn MarketDataProvider>,
        trending: Arc<dyn TrendingFeed>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            provider,
            trending,
            recent_errors: RwLock::new(Vec::new()),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    // ── Error Log ───────────────────────────────────────────────────────

    /// Record a provider failure. The log is capped at
    /// `config.max_recent_errors`; oldest entries are evicted first.
    pub fn push_error(&self, err: &ProviderError, symbol: Option<&str>) {
        warn!(code = err.code(), symbol = symbol.unwrap_or("-"), error = %err, "provider call failed");

        let record = ErrorRecord {
            message: err.to_string(),
            code: Some(err.code().to_string()),
            symbol: symbol.map(str::to_string),
            at: Utc::now().to_rfc3339(),
        };

        let cap = self.config.max_recent_errors;
        let mut errors = self.recent_errors.write();
        errors.push(record);
        if errors.len() > cap {
            let excess = errors.len() - cap;
            errors.drain(..excess);
        }
    }

    pub fn recent_errors(&self) -> Vec<ErrorRecord> {
        self.recent_errors.read().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::mock::MockProvider;

    fn state(cap: usize) -> AppState {
        let mock = Arc::new(MockProvider::new());
        let config = DashboardConfig {
            max_recent_errors: cap,
            ..Default::default()
        };
        AppState::new(config, mock.clone(), mock)
    }

    #[test]
    fn error_log_is_bounded_and_keeps_newest() {
        let s = state(3);
        for i in 0..5 {
            s.push_error(&ProviderError::no_data(format!("SYM{i}")), Some("X"));
        }
        let errors = s.recent_errors();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].message.contains("SYM2"));
        assert!(errors[2].message.contains("SYM4"));
        assert_eq!(errors[2].code.as_deref(), Some("no_data"));
        assert_eq!(errors[2].symbol.as_deref(), Some("X"));
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let s = state(0);
        s.push_error(&ProviderError::Malformed("bad".into()), None);
        assert!(s.recent_errors().is_empty());
    }
}
