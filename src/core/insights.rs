//! Flags worth calling out next to the summary.
use crate::core::holdings::PortfolioSnapshot;
use crate::core::sector::SectorExposure;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightThresholds {
    pub big_gainer_percent: f64,
    pub laggard_percent: f64,
    pub overweight_sector: String,
    pub overweight_percent: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        InsightThresholds {
            big_gainer_percent: 100.0,
            laggard_percent: -20.0,
            overweight_sector: "Banking".to_string(),
            overweight_percent: 40.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum Insight {
    /// Return above the configured gainer threshold.
    BigGainer {
        symbol: String,
        return_percent: f64,
        threshold: f64,
    },
    /// Return below the configured laggard threshold.
    Laggard {
        symbol: String,
        return_percent: f64,
        threshold: f64,
    },
    SectorOverweight { sector: String, weight: f64 },
}

impl std::fmt::Display for Insight {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Insight::BigGainer {
                symbol,
                return_percent,
                threshold,
            } => write!(
                f,
                "{symbol} is a big gainer ({return_percent:.2}%, above {threshold:.2}%)"
            ),
            Insight::Laggard {
                symbol,
                return_percent,
                threshold,
            } => write!(
                f,
                "{symbol} is a laggard ({return_percent:.2}%, below {threshold:.2}%)"
            ),
            Insight::SectorOverweight { sector, weight } => {
                write!(f, "{sector} is overweight at {weight:.2}% of the portfolio")
            }
        }
    }
}

pub fn portfolio_insights(
    snapshot: &PortfolioSnapshot,
    exposure: &SectorExposure,
    thresholds: &InsightThresholds,
) -> Vec<Insight> {
    let mut insights = Vec::new();
    for holding in snapshot.ranked_by_return() {
        let Some(return_percent) = holding.return_percent else {
            continue;
        };
        if return_percent > thresholds.big_gainer_percent {
            insights.push(Insight::BigGainer {
                symbol: holding.symbol.clone(),
                return_percent,
                threshold: thresholds.big_gainer_percent,
            });
        } else if return_percent < thresholds.laggard_percent {
            insights.push(Insight::Laggard {
                symbol: holding.symbol.clone(),
                return_percent,
                threshold: thresholds.laggard_percent,
            });
        }
    }

    if let Some(weight) = exposure.weight(&thresholds.overweight_sector) {
        if weight > thresholds.overweight_percent {
            insights.push(Insight::SectorOverweight {
                sector: thresholds.overweight_sector.clone(),
                weight,
            });
        }
    }
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::holdings::HoldingRecord;
    use crate::core::sector::SectorClassifier;
    use std::collections::HashMap;

    #[test]
    fn test_flags_gainers_laggards_and_overweight_banking() {
        let classifier = SectorClassifier::new(HashMap::from([
            ("SBIN".to_string(), "Banking".to_string()),
            ("YESBANK".to_string(), "Banking".to_string()),
        ]));
        let snapshot = PortfolioSnapshot::new(
            "now",
            vec![
                HoldingRecord::new("SBIN", 10.0, 1000.0, 2500.0, 1500.0, &classifier),
                HoldingRecord::new("YESBANK", 100.0, 2000.0, 1000.0, -1000.0, &classifier),
                HoldingRecord::new("INFY", 1.0, 1000.0, 1100.0, 100.0, &classifier),
                HoldingRecord::new("GIFT", 1.0, 0.0, 100.0, 100.0, &classifier),
            ],
        );
        let exposure = classifier.exposure(&snapshot);
        let insights = portfolio_insights(&snapshot, &exposure, &InsightThresholds::default());

        assert_eq!(insights.len(), 3);
        assert_eq!(
            insights[0],
            Insight::BigGainer {
                symbol: "SBIN".to_string(),
                return_percent: 150.0,
                threshold: 100.0
            }
        );
        assert_eq!(
            insights[1],
            Insight::Laggard {
                symbol: "YESBANK".to_string(),
                return_percent: -50.0,
                threshold: -20.0
            }
        );
        assert!(matches!(&insights[2], Insight::SectorOverweight { sector, .. } if sector == "Banking"));
        assert_eq!(
            insights[1].to_string(),
            "YESBANK is a laggard (-50.00%, below -20.00%)"
        );
    }

    #[test]
    fn test_message_follows_configured_threshold() {
        let classifier = SectorClassifier::default();
        let snapshot = PortfolioSnapshot::new(
            "now",
            vec![HoldingRecord::new("INFY", 1.0, 1000.0, 1300.0, 300.0, &classifier)],
        );
        let thresholds = InsightThresholds {
            big_gainer_percent: 25.0,
            ..InsightThresholds::default()
        };
        let insights = portfolio_insights(&snapshot, &classifier.exposure(&snapshot), &thresholds);

        assert_eq!(insights.len(), 1);
        let message = insights[0].to_string();
        assert_eq!(message, "INFY is a big gainer (30.00%, above 25.00%)");
        assert!(!message.contains("doubled"));
    }
}
