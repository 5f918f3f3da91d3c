//! Benchmark-relative risk statistics per holding.
use crate::core::isolation::BatchOutcome;
use crate::core::market::ReturnSeries;
use crate::core::stats;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RiskSettings {
    /// Annual risk-free rate as a fraction (0.065 for 6.5%).
    pub risk_free_rate: f64,
    pub trading_days: u32,
}

impl Default for RiskSettings {
    fn default() -> Self {
        RiskSettings {
            risk_free_rate: 0.065,
            trading_days: 252,
        }
    }
}

impl RiskSettings {
    pub fn daily_risk_free(&self) -> f64 {
        self.risk_free_rate / self.trading_days as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskMetric {
    pub symbol: String,
    /// `None` when the benchmark returns have no variance.
    pub beta: Option<f64>,
    /// Daily, unannualized Sharpe ratio. `None` when the holding's returns
    /// have no variance.
    pub sharpe: Option<f64>,
    /// Number of dates shared with the benchmark.
    pub observations: usize,
}

/// Risk metrics for the holdings that had usable data, plus the reasons the
/// others did not.
pub type RiskReport = BatchOutcome<RiskMetric>;

pub struct RiskEngine {
    settings: RiskSettings,
}

impl RiskEngine {
    pub fn new(settings: RiskSettings) -> Self {
        Self { settings }
    }

    /// Beta and Sharpe for one return series against the benchmark.
    ///
    /// Only dates present in both series are used; nothing is interpolated.
    pub fn metric(
        &self,
        symbol: &str,
        stock: &ReturnSeries,
        benchmark: &ReturnSeries,
    ) -> Result<RiskMetric, String> {
        let aligned = stock.align(benchmark);
        if aligned.len() < 2 {
            return Err(format!(
                "risk unavailable for {symbol}: only {} trading days overlap with the benchmark",
                aligned.len()
            ));
        }
        let (s, b): (Vec<f64>, Vec<f64>) = aligned.into_iter().unzip();

        let bench_var = stats::variance(&b).unwrap_or(0.0);
        let beta = (bench_var != 0.0)
            .then(|| stats::covariance(&s, &b).unwrap_or(0.0) / bench_var);

        let std = stats::sample_std_dev(&s).unwrap_or(0.0);
        let sharpe = (std != 0.0).then(|| {
            let mean = stats::mean(&s).unwrap_or(0.0);
            (mean - self.settings.daily_risk_free()) / std
        });

        if beta.is_none() && sharpe.is_none() {
            return Err(format!(
                "risk unavailable for {symbol}: neither the returns nor the benchmark have variance"
            ));
        }

        debug!(symbol, ?beta, ?sharpe, observations = s.len(), "Computed risk metric");
        Ok(RiskMetric {
            symbol: symbol.to_string(),
            beta,
            sharpe,
            observations: s.len(),
        })
    }

    /// Metrics for every symbol in `returns`; fetch failures carry through
    /// with the same "risk unavailable" wording as computation failures.
    pub fn analyze(&self, mut returns: BatchOutcome<ReturnSeries>, benchmark: &ReturnSeries) -> RiskReport {
        for (symbol, reason) in returns.failed.iter_mut() {
            *reason = format!("risk unavailable for {symbol}: {reason}");
        }
        returns.try_map(|symbol, series| self.metric(symbol, &series, benchmark))
    }
}
