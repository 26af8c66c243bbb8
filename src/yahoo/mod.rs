mod chart;
pub mod client;
mod quote_summary;
mod trending;

pub use client::YahooClient;
