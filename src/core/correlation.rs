//! Pairwise return correlation across holdings.
use crate::core::error::{AnalyticsError, AnalyticsResult};
use crate::core::market::{PriceSeries, ReturnSeries};
use crate::core::stats;
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CorrelationMatrix {
    pub symbols: Vec<String>,
    /// `values[i][j]` is the correlation of `symbols[i]` with `symbols[j]`.
    pub values: Vec<Vec<f64>>,
    /// Trading days common to every included symbol.
    pub observations: usize,
    /// Symbols left out, with the reason.
    pub excluded: BTreeMap<String, String>,
}

impl CorrelationMatrix {
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.symbols.iter().position(|s| s == a)?;
        let j = self.symbols.iter().position(|s| s == b)?;
        Some(self.values[i][j])
    }

    /// Most positively correlated distinct pair.
    pub fn strongest_pair(&self) -> Option<(&str, &str, f64)> {
        let mut best: Option<(&str, &str, f64)> = None;
        for i in 0..self.symbols.len() {
            for j in (i + 1)..self.symbols.len() {
                let value = self.values[i][j];
                if best.is_none_or(|(_, _, b)| value > b) {
                    best = Some((&self.symbols[i], &self.symbols[j], value));
                }
            }
        }
        best
    }
}

fn well_formed(prices: &PriceSeries) -> bool {
    !prices.is_empty() && prices.values().all(|p| p.is_finite() && *p > 0.0)
}

/// Builds the correlation matrix of daily returns.
///
/// Returns are computed per symbol and then restricted to the dates every
/// included symbol traded on. Fewer than two usable symbols, or fewer than two
/// common dates, is [`AnalyticsError::InsufficientData`].
pub fn correlation_matrix(prices: &BTreeMap<String, PriceSeries>) -> AnalyticsResult<CorrelationMatrix> {
    let mut excluded = BTreeMap::new();
    let mut returns: BTreeMap<&str, ReturnSeries> = BTreeMap::new();
    for (symbol, series) in prices {
        if !well_formed(series) {
            excluded.insert(symbol.clone(), "price series is empty or malformed".to_string());
            continue;
        }
        let series_returns = ReturnSeries::from_prices(series);
        if series_returns.is_empty() {
            excluded.insert(symbol.clone(), "not enough price history".to_string());
            continue;
        }
        returns.insert(symbol.as_str(), series_returns);
    }

    let common_dates = |returns: &BTreeMap<&str, ReturnSeries>| -> BTreeSet<NaiveDate> {
        let mut iter = returns.values();
        let Some(first) = iter.next() else {
            return BTreeSet::new();
        };
        let mut dates: BTreeSet<NaiveDate> = first.points.keys().copied().collect();
        for series in iter {
            dates.retain(|d| series.points.contains_key(d));
        }
        dates
    };

    let mut dates = common_dates(&returns);
    let flat: Vec<&str> = returns
        .iter()
        .filter(|(_, series)| {
            let values: Vec<f64> = dates.iter().map(|d| series.points[d]).collect();
            stats::variance(&values).is_some_and(|v| v == 0.0)
        })
        .map(|(symbol, _)| *symbol)
        .collect();
    if !flat.is_empty() {
        for symbol in flat {
            returns.remove(symbol);
            excluded.insert(symbol.to_string(), "returns have no variance".to_string());
        }
        dates = common_dates(&returns);
    }

    if returns.len() < 2 {
        return Err(AnalyticsError::InsufficientData(format!(
            "correlation needs at least two symbols with price history, found {}",
            returns.len()
        )));
    }
    if dates.len() < 2 {
        return Err(AnalyticsError::InsufficientData(format!(
            "only {} trading days are common to all {} symbols",
            dates.len(),
            returns.len()
        )));
    }

    let columns: Vec<Vec<f64>> = returns
        .values()
        .map(|series| dates.iter().map(|d| series.points[d]).collect())
        .collect();
    let n = columns.len();
    let mut values = vec![vec![1.0; n]; n];
    for i in 0..n {
        for j in (i + 1)..n {
            let r = stats::pearson(&columns[i], &columns[j]).unwrap_or(0.0);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    debug!(symbols = n, observations = dates.len(), "Computed correlation matrix");
    Ok(CorrelationMatrix {
        symbols: returns.keys().map(|s| s.to_string()).collect(),
        values,
        observations: dates.len(),
        excluded,
    })
}
