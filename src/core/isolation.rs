//! Per-symbol fault isolation.
//!
//! Market data is fetched symbol by symbol from an unreliable service. Every
//! stage that works per symbol (fetching, risk, correlation inputs, quotes)
//! keeps successes and failures side by side in a [`BatchOutcome`] so one bad
//! symbol never aborts the rest of the batch and no failure goes unreported.
use futures::{StreamExt, stream};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Display;
use std::future::Future;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchOutcome<T> {
    pub succeeded: BTreeMap<String, T>,
    /// Symbol to human readable failure reason.
    pub failed: BTreeMap<String, String>,
}

impl<T> Default for BatchOutcome<T> {
    fn default() -> Self {
        Self {
            succeeded: BTreeMap::new(),
            failed: BTreeMap::new(),
        }
    }
}

impl<T> BatchOutcome<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Splits a list of per-symbol results into successes and failures.
    pub fn from_results<E: Display>(results: impl IntoIterator<Item = (String, Result<T, E>)>) -> Self {
        let mut outcome = Self::new();
        for (symbol, result) in results {
            match result {
                Ok(value) => outcome.record_success(symbol, value),
                Err(e) => outcome.record_failure(symbol, e),
            }
        }
        outcome
    }

    pub fn record_success(&mut self, symbol: String, value: T) {
        self.failed.remove(&symbol);
        self.succeeded.insert(symbol, value);
    }

    pub fn record_failure(&mut self, symbol: String, reason: impl Display) {
        debug!("Isolated failure for {}: {}", symbol, reason);
        self.succeeded.remove(&symbol);
        self.failed.insert(symbol, reason.to_string());
    }

    /// Number of symbols that went into the batch.
    pub fn requested(&self) -> usize {
        self.succeeded.len() + self.failed.len()
    }

    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }

    /// Applies a fallible step to every success; new failures join the list.
    pub fn try_map<U, E: Display>(
        self,
        mut step: impl FnMut(&str, T) -> Result<U, E>,
    ) -> BatchOutcome<U> {
        let mut next = BatchOutcome {
            succeeded: BTreeMap::new(),
            failed: self.failed,
        };
        for (symbol, value) in self.succeeded {
            match step(&symbol, value) {
                Ok(mapped) => {
                    next.succeeded.insert(symbol, mapped);
                }
                Err(e) => next.record_failure(symbol, e),
            }
        }
        next
    }

    /// One line summary such as "2 of 5 symbols unavailable".
    pub fn availability_note(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        Some(format!(
            "{} of {} symbols unavailable",
            self.failed.len(),
            self.requested()
        ))
    }
}

/// Runs `fetch` for every symbol with at most `concurrency` calls in flight.
///
/// Each call settles independently; `on_done` fires once per finished symbol.
pub async fn fetch_isolated<T, E, F, Fut>(
    symbols: &[String],
    concurrency: usize,
    on_done: &(dyn Fn() + Sync),
    fetch: F,
) -> BatchOutcome<T>
where
    E: Display,
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let results: Vec<(String, Result<T, E>)> = stream::iter(symbols.iter().cloned())
        .map(|symbol| {
            let pending = fetch(symbol.clone());
            async move { (symbol, pending.await) }
        })
        .buffer_unordered(concurrency.max(1))
        .inspect(|_| on_done())
        .collect()
        .await;

    BatchOutcome::from_results(results)
}
