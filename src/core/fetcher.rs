//! Fetches market data for many symbols at once without letting one failure
//! spoil the batch.
use crate::core::cache::Cache;
use crate::core::isolation::{BatchOutcome, fetch_isolated};
use crate::core::market::{HistoricalPeriod, MarketDataProvider, PriceSeries, QuoteData, ReturnSeries};
use crate::core::symbol::SymbolResolver;
use anyhow::{Result, anyhow};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchSettings {
    /// Upper bound for a single provider call.
    pub timeout_ms: u64,
    /// Calls allowed in flight at once.
    pub max_concurrency: usize,
}

impl Default for FetchSettings {
    fn default() -> Self {
        FetchSettings {
            timeout_ms: 15_000,
            max_concurrency: 8,
        }
    }
}

pub struct MarketDataFetcher {
    provider: Arc<dyn MarketDataProvider>,
    settings: FetchSettings,
    history_cache: Cache<(String, HistoricalPeriod), PriceSeries>,
}

impl MarketDataFetcher {
    pub fn new(provider: Arc<dyn MarketDataProvider>, settings: FetchSettings) -> Self {
        MarketDataFetcher {
            provider,
            settings,
            history_cache: Cache::new(),
        }
    }

    fn timeout(&self) -> Duration {
        Duration::from_millis(self.settings.timeout_ms)
    }

    /// Price history for one ticker, served from cache when possible.
    #[instrument(name = "FetchHistory", skip(self), fields(ticker = %ticker, period = %period))]
    pub async fn history(&self, ticker: &str, period: HistoricalPeriod) -> Result<PriceSeries> {
        let key = (ticker.to_string(), period);
        if let Some(cached) = self.history_cache.get(&key).await {
            return Ok(cached);
        }

        let series = tokio::time::timeout(self.timeout(), self.provider.fetch_history(ticker, period))
            .await
            .map_err(|_| {
                anyhow!(
                    "Timed out after {}ms fetching history for {}",
                    self.settings.timeout_ms,
                    ticker
                )
            })??;

        if series.is_empty() {
            return Err(anyhow!("No price history returned for {}", ticker));
        }
        debug!("Fetched {} closes for {}", series.len(), ticker);

        self.history_cache.put(key, series.clone()).await;
        Ok(series)
    }

    /// Price histories keyed by internal symbol.
    pub async fn fetch_histories(
        &self,
        symbols: &[String],
        resolver: &SymbolResolver,
        period: HistoricalPeriod,
        on_done: &(dyn Fn() + Sync),
    ) -> BatchOutcome<PriceSeries> {
        fetch_isolated(symbols, self.settings.max_concurrency, on_done, |symbol| {
            let ticker = resolver.resolve(&symbol);
            async move { self.history(&ticker, period).await }
        })
        .await
    }

    /// Return series keyed by internal symbol.
    pub async fn fetch_returns(
        &self,
        symbols: &[String],
        resolver: &SymbolResolver,
        period: HistoricalPeriod,
        on_done: &(dyn Fn() + Sync),
    ) -> BatchOutcome<ReturnSeries> {
        self.fetch_histories(symbols, resolver, period, on_done)
            .await
            .try_map(|symbol, prices| {
                let returns = ReturnSeries::from_prices(&prices);
                if returns.is_empty() {
                    Err(format!("Not enough price history for {symbol} to compute returns"))
                } else {
                    Ok(returns)
                }
            })
    }

    /// Return series of the benchmark index, addressed by its own ticker.
    pub async fn fetch_benchmark(&self, ticker: &str, period: HistoricalPeriod) -> Result<ReturnSeries> {
        let prices = self.history(ticker, period).await?;
        let returns = ReturnSeries::from_prices(&prices);
        if returns.is_empty() {
            return Err(anyhow!("Not enough price history for benchmark {}", ticker));
        }
        Ok(returns)
    }

    /// Latest quotes keyed by ticker. Quotes are never cached.
    pub async fn fetch_quotes(
        &self,
        tickers: &[String],
        on_done: &(dyn Fn() + Sync),
    ) -> BatchOutcome<QuoteData> {
        fetch_isolated(tickers, self.settings.max_concurrency, on_done, |ticker| async move {
            tokio::time::timeout(self.timeout(), self.provider.fetch_quote(&ticker))
                .await
                .map_err(|_| {
                    anyhow!(
                        "Timed out after {}ms fetching quote for {}",
                        self.settings.timeout_ms,
                        ticker
                    )
                })?
        })
        .await
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider serving canned series; unknown tickers fail, "SLOW.NS" hangs.
    pub(crate) struct MockMarketData {
        pub series: HashMap<String, PriceSeries>,
        pub quotes: HashMap<String, QuoteData>,
        pub calls: AtomicUsize,
    }

    impl MockMarketData {
        pub(crate) fn new(series: HashMap<String, PriceSeries>) -> Self {
            Self {
                series,
                quotes: HashMap::new(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl MarketDataProvider for MockMarketData {
        async fn fetch_history(&self, ticker: &str, _period: HistoricalPeriod) -> Result<PriceSeries> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if ticker == "SLOW.NS" {
                tokio::time::sleep(Duration::from_secs(5)).await;
            }
            self.series
                .get(ticker)
                .cloned()
                .ok_or_else(|| anyhow!("No price data found for symbol: {}", ticker))
        }

        async fn fetch_quote(&self, ticker: &str) -> Result<QuoteData> {
            self.quotes
                .get(ticker)
                .cloned()
                .ok_or_else(|| anyhow!("No quote found for symbol: {}", ticker))
        }
    }

    pub(crate) fn prices(closes: &[f64]) -> PriceSeries {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, close)| (start + chrono::Duration::days(i as i64), *close))
            .collect()
    }

    fn fast_settings() -> FetchSettings {
        FetchSettings {
            timeout_ms: 50,
            max_concurrency: 4,
        }
    }

    #[tokio::test]
    async fn test_partial_results_with_failures() {
        let provider = MockMarketData::new(HashMap::from([
            ("INFY.NS".to_string(), prices(&[100.0, 101.0, 99.0])),
            ("TCS.NS".to_string(), prices(&[50.0, 51.0, 52.0])),
        ]));
        let fetcher = MarketDataFetcher::new(Arc::new(provider), fast_settings());
        let symbols: Vec<String> = ["INFY", "TCS", "GONE", "SLOW"].iter().map(|s| s.to_string()).collect();

        let outcome = fetcher
            .fetch_returns(&symbols, &SymbolResolver::default(), HistoricalPeriod::OneYear, &|| ())
            .await;

        assert_eq!(outcome.requested(), 4);
        assert_eq!(outcome.succeeded.len(), 2);
        assert_eq!(outcome.succeeded["INFY"].len(), 2);
        assert_eq!(outcome.failed["GONE"], "No price data found for symbol: GONE.NS");
        assert!(outcome.failed["SLOW"].contains("Timed out"));
    }

    #[tokio::test]
    async fn test_single_close_is_not_enough_for_returns() {
        let provider = MockMarketData::new(HashMap::from([("NEW.NS".to_string(), prices(&[10.0]))]));
        let fetcher = MarketDataFetcher::new(Arc::new(provider), fast_settings());

        let outcome = fetcher
            .fetch_returns(&["NEW".to_string()], &SymbolResolver::default(), HistoricalPeriod::OneYear, &|| ())
            .await;
        assert!(outcome.succeeded.is_empty());
        assert!(outcome.failed["NEW"].contains("Not enough price history"));
    }

    #[tokio::test]
    async fn test_history_is_cached() {
        let provider = Arc::new(MockMarketData::new(HashMap::from([(
            "^NSEI".to_string(),
            prices(&[1.0, 2.0, 3.0]),
        )])));
        let fetcher = MarketDataFetcher::new(provider.clone(), fast_settings());

        fetcher.fetch_benchmark("^NSEI", HistoricalPeriod::OneYear).await.unwrap();
        fetcher.fetch_benchmark("^NSEI", HistoricalPeriod::OneYear).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);

        fetcher.fetch_benchmark("^NSEI", HistoricalPeriod::TwoYears).await.unwrap();
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_empty_history_is_a_failure() {
        let provider = MockMarketData::new(HashMap::from([("EMPTY.NS".to_string(), PriceSeries::new())]));
        let fetcher = MarketDataFetcher::new(Arc::new(provider), fast_settings());
        let err = fetcher
            .history("EMPTY.NS", HistoricalPeriod::OneYear)
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No price history returned for EMPTY.NS");
    }
}
