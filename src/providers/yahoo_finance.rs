use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, instrument};

use crate::core::config::YahooProviderConfig;
use crate::core::market::{HistoricalPeriod, MarketDataProvider, PriceSeries, QuoteData};
use crate::providers::util::{encode_ticker, with_retry};

/// Market data from the Yahoo Finance chart API.
pub struct YahooFinanceProvider {
    base_url: String,
    client: reqwest::Client,
    retries: usize,
    retry_delay_ms: u64,
}

impl YahooFinanceProvider {
    pub fn new(config: &YahooProviderConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("hlens/0.1")
            .build()
            .context("Failed to build HTTP client")?;
        Ok(YahooFinanceProvider {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            client,
            retries: config.retries,
            retry_delay_ms: config.retry_delay_ms,
        })
    }

    async fn fetch_chart(&self, ticker: &str, range: &str) -> Result<ChartItem> {
        let url = format!(
            "{}/v8/finance/chart/{}?interval=1d&range={}",
            self.base_url,
            encode_ticker(ticker),
            range
        );
        debug!("Requesting chart data from {}", url);

        let response = with_retry(
            || async { self.client.get(&url).send().await?.error_for_status() },
            self.retries,
            self.retry_delay_ms,
        )
        .await
        .map_err(|e| anyhow!("Request error: {} for symbol: {}", e, ticker))?;

        let text = response
            .text()
            .await
            .with_context(|| format!("Failed to read response body for {ticker}"))?;
        let data: YahooChartResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for {}: {}", ticker, e))?;

        data.chart
            .result
            .and_then(|items| items.into_iter().next())
            .ok_or_else(|| anyhow!("No price data found for symbol: {}", ticker))
    }
}

#[derive(Deserialize, Debug)]
struct YahooChartResponse {
    chart: ChartResult,
}

#[derive(Deserialize, Debug)]
struct ChartResult {
    result: Option<Vec<ChartItem>>,
}

#[derive(Deserialize, Debug)]
struct ChartItem {
    meta: ChartMeta,
    timestamp: Option<Vec<i64>>,
    indicators: Option<Indicators>,
}

#[derive(Deserialize, Debug)]
struct ChartMeta {
    #[serde(alias = "regularMarketPrice")]
    regular_market_price: Option<f64>,
    #[serde(alias = "chartPreviousClose")]
    chart_previous_close: Option<f64>,
    #[serde(alias = "previousClose")]
    previous_close: Option<f64>,
    #[serde(alias = "regularMarketTime")]
    regular_market_time: Option<i64>,
    #[serde(alias = "gmtoffset", default)]
    gmt_offset: i64,
}

#[derive(Deserialize, Debug)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
    #[serde(default)]
    adjclose: Vec<AdjClose>,
}

#[derive(Deserialize, Debug)]
struct Quote {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Deserialize, Debug)]
struct AdjClose {
    adjclose: Option<Vec<Option<f64>>>,
}

/// Pairs timestamps with closes, preferring adjusted closes. Bars without a
/// close (trading halts, partial days) are skipped.
fn extract_closes(item: &ChartItem) -> PriceSeries {
    let Some(timestamps) = item.timestamp.as_ref() else {
        return PriceSeries::new();
    };
    let closes = item.indicators.as_ref().and_then(|inds| {
        inds.adjclose
            .first()
            .and_then(|a| a.adjclose.as_ref())
            .or_else(|| inds.quote.first().and_then(|q| q.close.as_ref()))
    });
    let Some(closes) = closes else {
        return PriceSeries::new();
    };

    timestamps
        .iter()
        .zip(closes.iter())
        .filter_map(|(ts, close)| {
            let close = (*close)?;
            let local = DateTime::<Utc>::from_timestamp(ts + item.meta.gmt_offset, 0)?;
            Some((local.date_naive(), close))
        })
        .collect()
}

#[async_trait]
impl MarketDataProvider for YahooFinanceProvider {
    #[instrument(name = "YahooHistoryFetch", skip(self), fields(ticker = %ticker))]
    async fn fetch_history(&self, ticker: &str, period: HistoricalPeriod) -> Result<PriceSeries> {
        let item = self.fetch_chart(ticker, period.range_param()).await?;
        let series = extract_closes(&item);
        debug!("Parsed {} daily closes for {}", series.len(), ticker);
        Ok(series)
    }

    #[instrument(name = "YahooQuoteFetch", skip(self), fields(ticker = %ticker))]
    async fn fetch_quote(&self, ticker: &str) -> Result<QuoteData> {
        let item = self.fetch_chart(ticker, "1d").await?;
        let meta = item.meta;
        Ok(QuoteData {
            price: meta.regular_market_price,
            previous_close: meta.chart_previous_close.or(meta.previous_close),
            timestamp: meta
                .regular_market_time
                .and_then(|ts| DateTime::<Utc>::from_timestamp(ts, 0)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn create_mock_server(ticker_path: &str, status: u16, body: &str) -> MockServer {
        let mock_server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{ticker_path}")))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(&mock_server)
            .await;
        mock_server
    }

    fn provider(base_url: &str) -> YahooFinanceProvider {
        YahooFinanceProvider::new(&YahooProviderConfig {
            base_url: base_url.to_string(),
            retries: 0,
            retry_delay_ms: 1,
        })
        .unwrap()
    }

    // 2024-01-01 03:45 UTC, then the next two days
    const TS: [i64; 3] = [1704080700, 1704167100, 1704253500];

    #[tokio::test]
    async fn test_history_prefers_adjusted_close() {
        let body = format!(
            r#"{{
                "chart": {{
                    "result": [{{
                        "meta": {{ "regularMarketPrice": 102.0, "gmtoffset": 19800 }},
                        "timestamp": [{}, {}, {}],
                        "indicators": {{
                            "quote": [{{ "close": [10.0, 11.0, 12.0] }}],
                            "adjclose": [{{ "adjclose": [100.0, null, 102.0] }}]
                        }}
                    }}]
                }}
            }}"#,
            TS[0], TS[1], TS[2]
        );
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v8/finance/chart/INFY.NS"))
            .and(query_param("range", "1y"))
            .and(query_param("interval", "1d"))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(&server)
            .await;

        let series = provider(&server.uri())
            .fetch_history("INFY.NS", HistoricalPeriod::OneYear)
            .await
            .unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series[&NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()], 100.0);
        assert_eq!(series[&NaiveDate::from_ymd_opt(2024, 1, 3).unwrap()], 102.0);
    }

    #[tokio::test]
    async fn test_history_falls_back_to_close() {
        let body = format!(
            r#"{{"chart": {{"result": [{{
                "meta": {{}},
                "timestamp": [{}, {}],
                "indicators": {{ "quote": [{{ "close": [20.0, 21.0] }}] }}
            }}]}}}}"#,
            TS[0], TS[1]
        );
        let server = create_mock_server("%5ENSEI", 200, &body).await;
        let series = provider(&server.uri())
            .fetch_history("^NSEI", HistoricalPeriod::OneYear)
            .await
            .unwrap();
        assert_eq!(series.values().copied().collect::<Vec<_>>(), vec![20.0, 21.0]);
    }

    #[tokio::test]
    async fn test_no_price_result_data() {
        let server = create_mock_server("INVALID.NS", 200, r#"{"chart": {"result": []}}"#).await;
        let result = provider(&server.uri())
            .fetch_history("INVALID.NS", HistoricalPeriod::OneYear)
            .await;
        assert_eq!(
            result.unwrap_err().to_string(),
            "No price data found for symbol: INVALID.NS"
        );
    }

    #[tokio::test]
    async fn test_http_error_is_reported() {
        let server = create_mock_server("GONE.NS", 404, "").await;
        let err = provider(&server.uri())
            .fetch_history("GONE.NS", HistoricalPeriod::OneYear)
            .await
            .unwrap_err()
            .to_string();
        assert!(err.starts_with("Request error:"), "{err}");
        assert!(err.ends_with("for symbol: GONE.NS"), "{err}");
    }

    #[tokio::test]
    async fn test_malformed_response() {
        let server = create_mock_server("BAD.NS", 200, r#"{"chart": "nope"}"#).await;
        let err = provider(&server.uri())
            .fetch_history("BAD.NS", HistoricalPeriod::OneYear)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Failed to parse JSON response for BAD.NS"));
    }

    #[tokio::test]
    async fn test_quote_fetch() {
        let body = r#"{"chart": {"result": [{
            "meta": {
                "regularMarketPrice": 1512.5,
                "chartPreviousClose": 1500.0,
                "regularMarketTime": 1704253500
            }
        }]}}"#;
        let server = create_mock_server("INFY.NS", 200, body).await;
        let quote = provider(&server.uri()).fetch_quote("INFY.NS").await.unwrap();
        assert_eq!(quote.price, Some(1512.5));
        assert_eq!(quote.previous_close, Some(1500.0));
        assert_eq!(quote.timestamp.unwrap().timestamp(), 1704253500);
    }
}
