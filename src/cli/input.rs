//! Reads holdings exports from disk.
use crate::core::holdings::{PortfolioSnapshot, RawTable, normalize_holdings};
use crate::core::sector::SectorClassifier;
use anyhow::{Context, Result};
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Parses CSV text into a raw table. Rows may have fewer cells than headers.
pub fn read_table<R: Read>(reader: R) -> Result<RawTable> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let headers = csv_reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (index, record) in csv_reader.records().enumerate() {
        let record = record.with_context(|| format!("Failed to read CSV row {}", index + 1))?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }
        rows.push(record.iter().map(str::to_string).collect());
    }

    Ok(RawTable { headers, rows })
}

/// Loads and normalizes a holdings CSV file.
pub fn load_snapshot(path: &Path, classifier: &SectorClassifier) -> Result<PortfolioSnapshot> {
    let file = std::fs::File::open(path)
        .with_context(|| format!("Failed to open holdings file: {}", path.display()))?;
    let table = read_table(file)
        .with_context(|| format!("Failed to parse holdings file: {}", path.display()))?;
    debug!("Read {} rows from {}", table.rows.len(), path.display());

    let label = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "holdings".to_string());
    let snapshot = normalize_holdings(&table, &label, classifier)
        .with_context(|| format!("Cannot analyze {}", path.display()))?;
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const KITE_EXPORT: &str = "\
Instrument,Qty.,Avg. cost,LTP,Invested,Cur. val,P&L,Net chg.,Day chg.
INFY,10,100,150,1000,1500,500,50,1.2
PNB,20,100,90,2000,1800,-200,-10,-0.4
,,,,,,,,
";

    #[test]
    fn test_read_table() {
        let table = read_table(KITE_EXPORT.as_bytes()).unwrap();
        assert_eq!(table.headers[1], "Qty.");
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.rows[1][0], "PNB");
    }

    #[test]
    fn test_load_snapshot_from_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
        file.write_all(KITE_EXPORT.as_bytes())?;

        let snapshot = load_snapshot(file.path(), &SectorClassifier::default())?;
        assert_eq!(snapshot.holdings.len(), 2);
        assert_eq!(snapshot.summary().total_current_value, 3300.0);
        Ok(())
    }

    #[test]
    fn test_missing_column_names_column() -> Result<()> {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"Instrument,Qty.,Invested,P&L\nINFY,10,1000,500\n")?;

        let err = load_snapshot(file.path(), &SectorClassifier::default()).unwrap_err();
        assert!(format!("{err:#}").contains("column 'Cur val'"));
        Ok(())
    }
}
