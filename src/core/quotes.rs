//! Live quote rows for display.
use crate::core::isolation::BatchOutcome;
use crate::core::market::QuoteData;
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LiveQuote {
    pub ticker: String,
    pub price: Option<f64>,
    pub previous_close: Option<f64>,
    /// Zero when either price is unavailable.
    pub change: f64,
    pub change_percent: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
    pub error: Option<String>,
}

/// Formats a quote for the live view.
///
/// Unlike the analytical reports, a missing price degrades to a zero change
/// here so the row can still be shown. The percentage stays undefined when
/// there is no previous close to divide by.
pub fn format_quote(ticker: &str, quote: Result<&QuoteData, &str>) -> LiveQuote {
    let quote = match quote {
        Ok(quote) => quote,
        Err(e) => {
            return LiveQuote {
                ticker: ticker.to_string(),
                price: None,
                previous_close: None,
                change: 0.0,
                change_percent: None,
                timestamp: None,
                error: Some(e.to_string()),
            };
        }
    };

    let change = match (quote.price, quote.previous_close) {
        (Some(price), Some(prev)) => price - prev,
        _ => 0.0,
    };
    let change_percent = quote
        .previous_close
        .filter(|prev| *prev != 0.0 && quote.price.is_some())
        .map(|prev| change / prev * 100.0);

    LiveQuote {
        ticker: ticker.to_string(),
        price: quote.price,
        previous_close: quote.previous_close,
        change,
        change_percent,
        timestamp: quote.timestamp,
        error: None,
    }
}

/// One row per requested ticker, in the order requested.
pub fn format_quotes(tickers: &[String], outcome: &BatchOutcome<QuoteData>) -> Vec<LiveQuote> {
    tickers
        .iter()
        .map(|ticker| match outcome.succeeded.get(ticker) {
            Some(quote) => format_quote(ticker, Ok(quote)),
            None => {
                let reason = outcome
                    .failed
                    .get(ticker)
                    .map(String::as_str)
                    .unwrap_or("quote was not requested");
                format_quote(ticker, Err(reason))
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quote(price: Option<f64>, previous_close: Option<f64>) -> QuoteData {
        QuoteData {
            price,
            previous_close,
            timestamp: None,
        }
    }

    #[test]
    fn test_change_and_percent() {
        let row = format_quote("INFY.NS", Ok(&quote(Some(110.0), Some(100.0))));
        assert_eq!(row.change, 10.0);
        assert_eq!(row.change_percent, Some(10.0));
        assert!(row.error.is_none());
    }

    #[test]
    fn test_missing_values_default_change_to_zero() {
        let row = format_quote("X.NS", Ok(&quote(None, Some(100.0))));
        assert_eq!(row.change, 0.0);
        assert_eq!(row.change_percent, None);

        let row = format_quote("X.NS", Ok(&quote(Some(5.0), None)));
        assert_eq!(row.change, 0.0);
        assert_eq!(row.change_percent, None);

        let row = format_quote("X.NS", Ok(&quote(Some(5.0), Some(0.0))));
        assert_eq!(row.change, 5.0);
        assert_eq!(row.change_percent, None);
    }

    #[test]
    fn test_failure_is_isolated_to_its_row() {
        let tickers = vec!["A.NS".to_string(), "B.NS".to_string()];
        let outcome = BatchOutcome::from_results(vec![
            ("A.NS".to_string(), Ok(quote(Some(2.0), Some(1.0)))),
            ("B.NS".to_string(), Err("HTTP error: 404 Not Found")),
        ]);
        let rows = format_quotes(&tickers, &outcome);

        assert_eq!(rows[0].change_percent, Some(100.0));
        assert!(rows[0].error.is_none());
        assert_eq!(rows[1].error.as_deref(), Some("HTTP error: 404 Not Found"));
        assert_eq!(rows[1].price, None);
    }
}
