//! Holdings analytics pipeline

pub mod cache;
pub mod compare;
pub mod config;
pub mod correlation;
pub mod error;
pub mod fetcher;
pub mod holdings;
pub mod insights;
pub mod isolation;
pub mod log;
pub mod market;
pub mod quotes;
pub mod rebalance;
pub mod risk;
pub mod sector;
pub mod simulator;
pub mod stats;
pub mod symbol;

// Re-export main types for cleaner imports
pub use error::{AnalyticsError, AnalyticsResult};
pub use holdings::{HoldingRecord, PortfolioSnapshot, RawTable};
pub use isolation::BatchOutcome;
pub use market::{HistoricalPeriod, MarketDataProvider, PriceSeries, QuoteData, ReturnSeries};
