// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free implementations of the indicators rendered by the
// analysis dashboard. Every function returns one output per input bar, with
// `None` marking warm-up gaps, so callers are forced to handle
// insufficient-data and division-by-zero cases. Empty input yields empty
// output; nothing here performs I/O or returns an error.

pub mod bollinger;
pub mod macd;
pub mod moving_average;
pub mod returns;
pub mod rsi;
pub mod series;

pub use bollinger::bollinger;
pub use macd::macd;
pub use moving_average::{ema, sma};
pub use returns::{
    correlation, cumulative_returns, daily_returns, significant_changes, SignificantChange,
};
pub use rsi::rsi;
pub use series::DerivedSeries;
