pub mod bar;
#[cfg(test)]
pub mod mock;
pub mod provider;

// Re-export the data types for convenient access (e.g. `use crate::market_data::Bar`).
pub use bar::{
    Bar, CorporateActions, Dividend, FinancialStatements, Fundamentals, PriceHistory, Quoted,
    Split, StatementPeriod, TrendingTicker,
};
pub use provider::{MarketDataProvider, TrendingFeed};
