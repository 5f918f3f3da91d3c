//! Sector classification and exposure aggregation.
use crate::core::holdings::PortfolioSnapshot;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

pub const OTHER_SECTOR: &str = "Other";

/// Looks up the sector of a symbol in a static table.
#[derive(Debug, Clone, Default)]
pub struct SectorClassifier {
    sectors: HashMap<String, String>,
}

impl SectorClassifier {
    pub fn new(sectors: HashMap<String, String>) -> Self {
        Self { sectors }
    }

    /// Unknown symbols fall into [`OTHER_SECTOR`].
    pub fn classify(&self, symbol: &str) -> String {
        self.sectors
            .get(symbol)
            .cloned()
            .unwrap_or_else(|| OTHER_SECTOR.to_string())
    }

    pub fn exposure(&self, snapshot: &PortfolioSnapshot) -> SectorExposure {
        let mut values: BTreeMap<String, f64> = BTreeMap::new();
        let mut unvalued = Vec::new();
        for holding in &snapshot.holdings {
            let sector = self.classify(&holding.symbol);
            match holding.current_value {
                Some(value) => *values.entry(sector).or_insert(0.0) += value,
                None => unvalued.push(holding.symbol.clone()),
            }
        }
        SectorExposure { values, unvalued }
    }
}

/// Current value held per sector.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct SectorExposure {
    pub values: BTreeMap<String, f64>,
    /// Holdings whose current value was not available.
    pub unvalued: Vec<String>,
}

impl SectorExposure {
    pub fn from_values(values: BTreeMap<String, f64>) -> Self {
        Self {
            values,
            unvalued: Vec::new(),
        }
    }

    pub fn total(&self) -> f64 {
        self.values.values().sum()
    }

    pub fn value(&self, sector: &str) -> f64 {
        self.values.get(sector).copied().unwrap_or(0.0)
    }

    /// Weight of a sector in percent. `None` when the portfolio has no value.
    pub fn weight(&self, sector: &str) -> Option<f64> {
        let total = self.total();
        if total == 0.0 {
            return None;
        }
        Some(self.value(sector) / total * 100.0)
    }

    /// All sector weights, or `None` when the portfolio has no value.
    pub fn weights(&self) -> Option<BTreeMap<String, f64>> {
        let total = self.total();
        if total == 0.0 {
            return None;
        }
        Some(
            self.values
                .iter()
                .map(|(sector, value)| (sector.clone(), value / total * 100.0))
                .collect(),
        )
    }

    /// Sectors ordered by value, largest first.
    pub fn ranked(&self) -> Vec<(&str, f64)> {
        let mut ranked: Vec<(&str, f64)> = self
            .values
            .iter()
            .map(|(sector, value)| (sector.as_str(), *value))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(b.0)));
        ranked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::holdings::HoldingRecord;

    fn classifier() -> SectorClassifier {
        SectorClassifier::new(HashMap::from([
            ("HDFCBANK".to_string(), "Banking".to_string()),
            ("PNB".to_string(), "Banking".to_string()),
            ("INFY".to_string(), "IT".to_string()),
        ]))
    }

    fn snapshot(classifier: &SectorClassifier) -> PortfolioSnapshot {
        PortfolioSnapshot::new(
            "test",
            vec![
                HoldingRecord::new("HDFCBANK", 10.0, 1500.0, 1600.0, 100.0, classifier),
                HoldingRecord::new("PNB", 20.0, 2000.0, 1800.0, -200.0, classifier),
                HoldingRecord::new("INFY", 10.0, 1000.0, 1500.0, 500.0, classifier),
                HoldingRecord::new("XYZ", 1.0, 100.0, 100.0, 0.0, classifier),
            ],
        )
    }

    #[test]
    fn test_unknown_symbol_is_other() {
        let classifier = classifier();
        assert_eq!(classifier.classify("INFY"), "IT");
        assert_eq!(classifier.classify("NOPE"), OTHER_SECTOR);
    }

    #[test]
    fn test_sector_values_sum_to_total() {
        let classifier = classifier();
        let snapshot = snapshot(&classifier);
        let exposure = classifier.exposure(&snapshot);

        assert_eq!(exposure.value("Banking"), 3400.0);
        assert_eq!(exposure.value("IT"), 1500.0);
        assert_eq!(exposure.value(OTHER_SECTOR), 100.0);
        assert!((exposure.total() - snapshot.total_current_value()).abs() < 1e-9);

        let weights = exposure.weights().unwrap();
        let sum: f64 = weights.values().sum();
        assert!((sum - 100.0).abs() < 1e-9);
        assert!((exposure.weight("IT").unwrap() - 30.0).abs() < 1e-9);
        assert_eq!(exposure.ranked()[0].0, "Banking");
    }

    #[test]
    fn test_zero_total_has_undefined_weights() {
        let exposure = SectorExposure::from_values(BTreeMap::from([
            ("IT".to_string(), 0.0),
            ("Banking".to_string(), 0.0),
        ]));
        assert_eq!(exposure.weight("IT"), None);
        assert_eq!(exposure.weights(), None);
    }

    #[test]
    fn test_unvalued_holdings_are_reported() {
        let classifier = classifier();
        let mut snapshot = snapshot(&classifier);
        snapshot.holdings[3].current_value = None;
        let exposure = classifier.exposure(&snapshot);
        assert_eq!(exposure.unvalued, vec!["XYZ".to_string()]);
        assert!(!exposure.values.contains_key(OTHER_SECTOR));
    }
}
