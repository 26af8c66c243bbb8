// =============================================================================
// Analysis assembly
// =============================================================================
//
// Pure glue between provider data and the indicator engine. Each builder
// takes already-fetched data and returns a chart-ready, serialisable payload.

pub mod overview;
pub mod report;

pub use overview::QuoteOverview;
pub use report::AnalysisReport;
