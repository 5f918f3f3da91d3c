//! Differences between two holdings snapshots.
use crate::core::holdings::{HoldingRecord, PortfolioSnapshot};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Presence {
    Both,
    /// Position closed since the old snapshot.
    OnlyOld,
    /// Position started since the old snapshot.
    OnlyNew,
}

/// A delta is `None` when a snapshot holds the symbol but the amount is
/// missing from its row; an absent side counts as zero.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotDiff {
    pub symbol: String,
    pub quantity_delta: Option<f64>,
    pub value_delta: Option<f64>,
    pub profit_loss_delta: Option<f64>,
    pub presence: Presence,
}

/// Totals are `None` as soon as one row's delta is undefined.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotComparison {
    pub rows: Vec<SnapshotDiff>,
    pub total_value_delta: Option<f64>,
    pub total_profit_loss_delta: Option<f64>,
}

fn side(record: Option<&HoldingRecord>, field: fn(&HoldingRecord) -> Option<f64>) -> Option<f64> {
    match record {
        Some(h) => field(h),
        None => Some(0.0),
    }
}

fn delta(
    before: Option<&HoldingRecord>,
    after: Option<&HoldingRecord>,
    field: fn(&HoldingRecord) -> Option<f64>,
) -> Option<f64> {
    Some(side(after, field)? - side(before, field)?)
}

fn total(rows: &[SnapshotDiff], field: fn(&SnapshotDiff) -> Option<f64>) -> Option<f64> {
    rows.iter().map(field).sum()
}

/// Outer-joins both snapshots on symbol.
///
/// Rows are sorted by value delta, largest gain first; rows without a value
/// delta go last.
pub fn compare_snapshots(old: &PortfolioSnapshot, new: &PortfolioSnapshot) -> SnapshotComparison {
    let symbols: BTreeSet<&str> = old
        .holdings
        .iter()
        .chain(new.holdings.iter())
        .map(|h| h.symbol.as_str())
        .collect();

    let mut rows: Vec<SnapshotDiff> = symbols
        .into_iter()
        .map(|symbol| {
            let before = old.get(symbol);
            let after = new.get(symbol);
            let presence = match (before.is_some(), after.is_some()) {
                (true, true) => Presence::Both,
                (true, false) => Presence::OnlyOld,
                _ => Presence::OnlyNew,
            };
            SnapshotDiff {
                symbol: symbol.to_string(),
                quantity_delta: delta(before, after, |h| h.quantity),
                value_delta: delta(before, after, |h| h.current_value),
                profit_loss_delta: delta(before, after, |h| h.profit_loss),
                presence,
            }
        })
        .collect();

    rows.sort_by(|a, b| match (a.value_delta, b.value_delta) {
        (Some(x), Some(y)) => y.total_cmp(&x).then_with(|| a.symbol.cmp(&b.symbol)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.symbol.cmp(&b.symbol),
    });

    SnapshotComparison {
        total_value_delta: total(&rows, |r| r.value_delta),
        total_profit_loss_delta: total(&rows, |r| r.profit_loss_delta),
        rows,
    }
}
