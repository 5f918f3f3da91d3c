//! Sector rebalancing suggestions against benchmark weights and policy caps.
use crate::core::error::{AnalyticsError, AnalyticsResult};
use crate::core::sector::SectorExposure;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt::Display;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RebalanceSettings {
    /// Percentage points of drift from the benchmark tolerated before acting.
    pub delta_threshold: f64,
    /// Benchmark sector weights in percent.
    pub benchmark_weights: HashMap<String, f64>,
    /// Maximum allowed sector weights in percent; absent sectors are uncapped.
    pub sector_caps: HashMap<String, f64>,
}

fn percent_table(pairs: &[(&str, f64)]) -> HashMap<String, f64> {
    pairs.iter().map(|(k, v)| (k.to_string(), *v)).collect()
}

/// Nifty 50 sector weights and the built-in caps. Each field falls back to
/// these on its own, so a partial config section keeps the rest.
impl Default for RebalanceSettings {
    fn default() -> Self {
        RebalanceSettings {
            delta_threshold: 3.0,
            benchmark_weights: percent_table(&[
                ("Banking", 28.0),
                ("IT", 13.0),
                ("Energy", 12.0),
                ("Financial Services", 9.0),
                ("FMCG", 8.0),
                ("Auto", 7.0),
                ("Pharma", 4.0),
                ("Infrastructure", 4.0),
                ("Metals", 3.0),
                ("Telecom", 3.0),
                ("Other", 9.0),
            ]),
            sector_caps: percent_table(&[
                ("Banking", 35.0),
                ("IT", 25.0),
                ("Energy", 20.0),
                ("Financial Services", 20.0),
                ("Other", 20.0),
            ]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RebalanceAction {
    ExceedsCap,
    Increase,
    Trim,
    Hold,
}

impl Display for RebalanceAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let text = match self {
            RebalanceAction::ExceedsCap => "Exceeds cap",
            RebalanceAction::Increase => "Increase",
            RebalanceAction::Trim => "Trim",
            RebalanceAction::Hold => "Hold",
        };
        write!(f, "{text}")
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RebalancingRow {
    pub sector: String,
    pub current_weight: f64,
    pub benchmark_weight: f64,
    pub max_allowed: f64,
    /// Benchmark weight minus current weight.
    pub delta_to_benchmark: f64,
    pub action: RebalanceAction,
}

/// Classifies one sector. A cap breach outranks any benchmark drift.
pub fn classify(current: f64, benchmark: f64, max_allowed: f64, threshold: f64) -> RebalanceAction {
    let delta = benchmark - current;
    if current > max_allowed {
        RebalanceAction::ExceedsCap
    } else if delta > threshold {
        RebalanceAction::Increase
    } else if delta < -threshold {
        RebalanceAction::Trim
    } else {
        RebalanceAction::Hold
    }
}

pub struct RebalancingAdvisor {
    settings: RebalanceSettings,
}

impl RebalancingAdvisor {
    pub fn new(settings: RebalanceSettings) -> Self {
        Self { settings }
    }

    pub fn max_allowed(&self, sector: &str) -> f64 {
        self.settings.sector_caps.get(sector).copied().unwrap_or(100.0)
    }

    /// One row per sector held or present in the benchmark, sorted by sector.
    pub fn advise(&self, exposure: &SectorExposure) -> AnalyticsResult<Vec<RebalancingRow>> {
        let weights = exposure.weights().ok_or_else(|| {
            AnalyticsError::DegenerateArithmetic(
                "sector weights are undefined for a portfolio with zero value".to_string(),
            )
        })?;

        let sectors: BTreeSet<&String> = weights
            .keys()
            .chain(self.settings.benchmark_weights.keys())
            .collect();

        Ok(sectors
            .into_iter()
            .map(|sector| {
                let current_weight = weights.get(sector).copied().unwrap_or(0.0);
                let benchmark_weight = self
                    .settings
                    .benchmark_weights
                    .get(sector)
                    .copied()
                    .unwrap_or(0.0);
                let max_allowed = self.max_allowed(sector);
                RebalancingRow {
                    sector: sector.clone(),
                    current_weight,
                    benchmark_weight,
                    max_allowed,
                    delta_to_benchmark: benchmark_weight - current_weight,
                    action: classify(
                        current_weight,
                        benchmark_weight,
                        max_allowed,
                        self.settings.delta_threshold,
                    ),
                }
            })
            .collect())
    }
}
