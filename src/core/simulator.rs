//! What-if reallocation of fresh cash across existing holdings.
use crate::core::error::{AnalyticsError, AnalyticsResult};
use crate::core::holdings::PortfolioSnapshot;
use crate::core::sector::{SectorClassifier, SectorExposure};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimulatedAllocation {
    pub amount: f64,
    /// Cash going to each target symbol.
    pub allocations: BTreeMap<String, f64>,
    /// Cash going to each sector.
    pub sector_deltas: BTreeMap<String, f64>,
    pub before: SectorExposure,
    pub after: SectorExposure,
}

impl SimulatedAllocation {
    /// Weight shift per sector in percentage points, `None` if undefined.
    pub fn weight_shift(&self, sector: &str) -> Option<f64> {
        let after = self.after.weight(sector)?;
        let before = self.before.weight(sector).unwrap_or(0.0);
        Some(after - before)
    }
}

/// Splits `amount` evenly across `targets` and projects the sector exposure.
///
/// Targets must be holdings of `snapshot` so their sector is known.
pub fn simulate(
    snapshot: &PortfolioSnapshot,
    classifier: &SectorClassifier,
    amount: f64,
    targets: &[String],
) -> AnalyticsResult<SimulatedAllocation> {
    if targets.is_empty() {
        return Err(AnalyticsError::DegenerateArithmetic(
            "choose at least one target holding to allocate to".to_string(),
        ));
    }
    if !amount.is_finite() || amount < 0.0 {
        return Err(AnalyticsError::DegenerateArithmetic(format!(
            "allocation amount must be a non-negative number, got {amount}"
        )));
    }
    if let Some(unknown) = targets.iter().find(|t| snapshot.get(t).is_none()) {
        return Err(AnalyticsError::UnknownSymbol(unknown.clone()));
    }

    let per_target = amount / targets.len() as f64;
    let mut allocations = BTreeMap::new();
    let mut sector_deltas: BTreeMap<String, f64> = BTreeMap::new();
    for target in targets {
        *allocations.entry(target.clone()).or_insert(0.0) += per_target;
        *sector_deltas.entry(classifier.classify(target)).or_insert(0.0) += per_target;
    }

    let before = classifier.exposure(snapshot);
    let mut after = before.clone();
    for (sector, delta) in &sector_deltas {
        *after.values.entry(sector.clone()).or_insert(0.0) += delta;
    }

    Ok(SimulatedAllocation {
        amount,
        allocations,
        sector_deltas,
        before,
        after,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::holdings::HoldingRecord;
    use std::collections::HashMap;

    fn fixture() -> (PortfolioSnapshot, SectorClassifier) {
        let classifier = SectorClassifier::new(HashMap::from([
            ("A".to_string(), "IT".to_string()),
            ("B".to_string(), "IT".to_string()),
            ("C".to_string(), "Banking".to_string()),
        ]));
        let snapshot = PortfolioSnapshot::new(
            "now",
            vec![
                HoldingRecord::new("A", 1.0, 1000.0, 1000.0, 0.0, &classifier),
                HoldingRecord::new("B", 1.0, 1000.0, 1000.0, 0.0, &classifier),
                HoldingRecord::new("C", 1.0, 2000.0, 2000.0, 0.0, &classifier),
            ],
        );
        (snapshot, classifier)
    }

    fn targets(symbols: &[&str]) -> Vec<String> {
        symbols.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_even_split() {
        let (snapshot, classifier) = fixture();
        let sim = simulate(&snapshot, &classifier, 1000.0, &targets(&["A", "B", "C"])).unwrap();

        for symbol in ["A", "B", "C"] {
            assert_eq!(sim.allocations[symbol], 1000.0 / 3.0);
        }
        assert!((sim.sector_deltas["IT"] - 2000.0 / 3.0).abs() < 1e-9);
        assert!((sim.after.value("IT") - (2000.0 + 2000.0 / 3.0)).abs() < 1e-9);
        assert!((sim.after.total() - 5000.0).abs() < 1e-9);
        assert_eq!(sim.before.total(), 4000.0);
    }

    #[test]
    fn test_weight_shift() {
        let (snapshot, classifier) = fixture();
        let sim = simulate(&snapshot, &classifier, 1000.0, &targets(&["C"])).unwrap();
        // Banking: 50% before, 60% after.
        assert!((sim.weight_shift("Banking").unwrap() - 10.0).abs() < 1e-9);
        assert!((sim.weight_shift("IT").unwrap() + 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_targets_rejected() {
        let (snapshot, classifier) = fixture();
        let err = simulate(&snapshot, &classifier, 1000.0, &[]).unwrap_err();
        assert!(matches!(err, AnalyticsError::DegenerateArithmetic(_)));
    }

    #[test]
    fn test_unknown_target_and_bad_amount_rejected() {
        let (snapshot, classifier) = fixture();
        assert_eq!(
            simulate(&snapshot, &classifier, 10.0, &targets(&["ZZZ"])).unwrap_err(),
            AnalyticsError::UnknownSymbol("ZZZ".to_string())
        );
        assert!(simulate(&snapshot, &classifier, f64::NAN, &targets(&["A"])).is_err());
        assert!(simulate(&snapshot, &classifier, -5.0, &targets(&["A"])).is_err());
    }
}
