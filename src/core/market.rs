//! Market data abstractions and core types

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt::Display;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum HistoricalPeriod {
    OneMonth,
    SixMonths,
    OneYear,
    TwoYears,
    FiveYears,
}

impl Display for HistoricalPeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                HistoricalPeriod::OneMonth => "1M",
                HistoricalPeriod::SixMonths => "6M",
                HistoricalPeriod::OneYear => "1Y",
                HistoricalPeriod::TwoYears => "2Y",
                HistoricalPeriod::FiveYears => "5Y",
            }
        )
    }
}

impl HistoricalPeriod {
    /// Range token understood by the chart API.
    pub fn range_param(&self) -> &'static str {
        match self {
            HistoricalPeriod::OneMonth => "1mo",
            HistoricalPeriod::SixMonths => "6mo",
            HistoricalPeriod::OneYear => "1y",
            HistoricalPeriod::TwoYears => "2y",
            HistoricalPeriod::FiveYears => "5y",
        }
    }
}

impl FromStr for HistoricalPeriod {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "1M" => Ok(HistoricalPeriod::OneMonth),
            "6M" => Ok(HistoricalPeriod::SixMonths),
            "1Y" => Ok(HistoricalPeriod::OneYear),
            "2Y" => Ok(HistoricalPeriod::TwoYears),
            "5Y" => Ok(HistoricalPeriod::FiveYears),
            _ => Err(anyhow::anyhow!("Invalid historical period: {}", s)),
        }
    }
}

/// Daily closing prices keyed by trading date.
pub type PriceSeries = BTreeMap<NaiveDate, f64>;

/// Day-over-day fractional changes of a price series.
///
/// The first observation has no predecessor and is dropped. A day whose
/// previous close is zero is skipped rather than producing an infinite change.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct ReturnSeries {
    pub points: BTreeMap<NaiveDate, f64>,
}

impl ReturnSeries {
    pub fn from_prices(prices: &PriceSeries) -> Self {
        let points = prices
            .iter()
            .zip(prices.iter().skip(1))
            .filter_map(|((_, prev), (date, close))| {
                if *prev == 0.0 {
                    return None;
                }
                let change = (close - prev) / prev;
                change.is_finite().then_some((*date, change))
            })
            .collect();
        ReturnSeries { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.values().copied().collect()
    }

    /// Pairs of (self, other) values on the dates both series share.
    pub fn align(&self, other: &ReturnSeries) -> Vec<(f64, f64)> {
        self.points
            .iter()
            .filter_map(|(date, a)| other.points.get(date).map(|b| (*a, *b)))
            .collect()
    }
}

/// Latest quote for a ticker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuoteData {
    pub price: Option<f64>,
    pub previous_close: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Daily closes for `ticker` over the lookback `period`.
    async fn fetch_history(&self, ticker: &str, period: HistoricalPeriod) -> Result<PriceSeries>;

    async fn fetch_quote(&self, ticker: &str) -> Result<QuoteData>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, day).unwrap()
    }

    #[test]
    fn test_returns_drop_first_delta() {
        let prices = PriceSeries::from([(date(1), 100.0), (date(2), 110.0), (date(3), 99.0)]);
        let returns = ReturnSeries::from_prices(&prices);

        assert_eq!(returns.len(), 2);
        assert!(!returns.points.contains_key(&date(1)));
        assert!((returns.points[&date(2)] - 0.10).abs() < 1e-12);
        assert!((returns.points[&date(3)] + 0.10).abs() < 1e-12);
    }

    #[test]
    fn test_returns_skip_zero_previous_close() {
        let prices = PriceSeries::from([(date(1), 0.0), (date(2), 10.0), (date(3), 11.0)]);
        let returns = ReturnSeries::from_prices(&prices);
        assert_eq!(returns.len(), 1);
        assert!(returns.points.contains_key(&date(3)));
    }

    #[test]
    fn test_align_is_inner_join() {
        let a = ReturnSeries {
            points: BTreeMap::from([(date(2), 0.1), (date(3), 0.2), (date(5), 0.3)]),
        };
        let b = ReturnSeries {
            points: BTreeMap::from([(date(3), 1.0), (date(4), 2.0), (date(5), 3.0)]),
        };
        assert_eq!(a.align(&b), vec![(0.2, 1.0), (0.3, 3.0)]);
    }

    #[test]
    fn test_period_round_trip() {
        let period: HistoricalPeriod = "1y".parse().unwrap();
        assert_eq!(period, HistoricalPeriod::OneYear);
        assert_eq!(period.to_string(), "1Y");
        assert_eq!(period.range_param(), "1y");
        assert!("7Y".parse::<HistoricalPeriod>().is_err());
    }
}
