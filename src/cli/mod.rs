pub mod compare;
pub mod correlation;
pub mod input;
pub mod quotes;
pub mod rebalance;
pub mod risk;
pub mod sectors;
pub mod setup;
pub mod simulate;
pub mod summary;
pub mod ui;
