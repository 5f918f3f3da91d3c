//! Normalizes raw holdings tables into canonical holding records.
//!
//! Broker exports change their column headers between versions ("Avg. cost"
//! vs "Avg cost", trailing spaces, "Cur. val"), so headers are canonicalized
//! before they are matched against a table of known aliases.
use crate::core::error::{AnalyticsError, AnalyticsResult};
use crate::core::sector::SectorClassifier;
use serde::Serialize;
use std::collections::{HashMap, HashSet};
use tracing::{debug, warn};

/// An already-parsed tabular holdings export: header names plus string cells.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Column {
    Symbol,
    Quantity,
    AvgCost,
    CurrentPrice,
    Invested,
    CurrentValue,
    ProfitLoss,
    NetChange,
    DayChange,
}

impl Column {
    fn display_name(&self) -> &'static str {
        match self {
            Column::Symbol => "Instrument",
            Column::Quantity => "Qty",
            Column::AvgCost => "Avg cost",
            Column::CurrentPrice => "LTP",
            Column::Invested => "Invested",
            Column::CurrentValue => "Cur val",
            Column::ProfitLoss => "P&L",
            Column::NetChange => "Net chg",
            Column::DayChange => "Day chg",
        }
    }

    fn aliases(&self) -> &'static [&'static str] {
        match self {
            Column::Symbol => &["instrument", "symbol", "stock", "tradingsymbol"],
            Column::Quantity => &["qty", "quantity", "quantity available"],
            Column::AvgCost => &["avg cost", "average price", "avgcost"],
            Column::CurrentPrice => &["ltp", "last price", "currentprice"],
            Column::Invested => &["invested", "investedamount"],
            Column::CurrentValue => &["cur val", "current value", "currentvalue"],
            Column::ProfitLoss => &["p&l", "pl", "unrealized p&l"],
            Column::NetChange => &["net chg", "netchangepercent"],
            Column::DayChange => &["day chg", "daychangepercent"],
        }
    }

    const ALL: [Column; 9] = [
        Column::Symbol,
        Column::Quantity,
        Column::AvgCost,
        Column::CurrentPrice,
        Column::Invested,
        Column::CurrentValue,
        Column::ProfitLoss,
        Column::NetChange,
        Column::DayChange,
    ];

    const REQUIRED: [Column; 4] = [
        Column::Symbol,
        Column::Invested,
        Column::CurrentValue,
        Column::ProfitLoss,
    ];
}

/// Trims, drops periods, collapses inner whitespace and lowercases a header.
pub fn canonical_header(header: &str) -> String {
    header
        .trim()
        .trim_start_matches('\u{feff}')
        .replace('.', "")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Parses a numeric cell, tolerating thousands separators and a currency sign.
pub fn parse_amount(cell: &str) -> Option<f64> {
    let cleaned: String = cell
        .trim()
        .trim_start_matches(['₹', '$'])
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Return on investment in percent, undefined when nothing was invested.
pub fn return_percent(profit_loss: f64, invested: f64) -> Option<f64> {
    if invested == 0.0 {
        return None;
    }
    let value = profit_loss / invested * 100.0;
    value.is_finite().then_some(value)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HoldingRecord {
    pub symbol: String,
    pub quantity: Option<f64>,
    pub avg_cost: Option<f64>,
    pub current_price: Option<f64>,
    pub invested_amount: Option<f64>,
    pub current_value: Option<f64>,
    pub profit_loss: Option<f64>,
    pub return_percent: Option<f64>,
    pub sector: String,
    pub net_change_percent: Option<f64>,
    pub day_change_percent: Option<f64>,
}

impl HoldingRecord {
    /// Builds a record from known amounts, deriving return and sector.
    pub fn new(
        symbol: &str,
        quantity: f64,
        invested_amount: f64,
        current_value: f64,
        profit_loss: f64,
        classifier: &SectorClassifier,
    ) -> Self {
        let avg_cost = (quantity != 0.0).then(|| invested_amount / quantity);
        let current_price = (quantity != 0.0).then(|| current_value / quantity);
        HoldingRecord {
            symbol: symbol.to_string(),
            quantity: Some(quantity),
            avg_cost,
            current_price,
            invested_amount: Some(invested_amount),
            current_value: Some(current_value),
            profit_loss: Some(profit_loss),
            return_percent: return_percent(profit_loss, invested_amount),
            sector: classifier.classify(symbol),
            net_change_percent: None,
            day_change_percent: None,
        }
    }
}

/// One uploaded set of holdings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSnapshot {
    pub label: String,
    pub holdings: Vec<HoldingRecord>,
}

/// Aggregate valuation of a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PortfolioSummary {
    pub holdings: usize,
    pub total_invested: f64,
    pub total_current_value: f64,
    pub total_profit_loss: f64,
    /// `None` unless every holding has both invested amount and P&L.
    pub overall_return_percent: Option<f64>,
    /// Holdings missing an invested, current or P&L amount. Totals exclude
    /// the missing amounts.
    pub incomplete: Vec<String>,
}

impl PortfolioSnapshot {
    pub fn new(label: &str, holdings: Vec<HoldingRecord>) -> Self {
        PortfolioSnapshot {
            label: label.to_string(),
            holdings,
        }
    }

    pub fn get(&self, symbol: &str) -> Option<&HoldingRecord> {
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    pub fn symbols(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.symbol.clone()).collect()
    }

    pub fn total_invested(&self) -> f64 {
        self.holdings.iter().filter_map(|h| h.invested_amount).sum()
    }

    pub fn total_current_value(&self) -> f64 {
        self.holdings.iter().filter_map(|h| h.current_value).sum()
    }

    pub fn total_profit_loss(&self) -> f64 {
        self.holdings.iter().filter_map(|h| h.profit_loss).sum()
    }

    pub fn summary(&self) -> PortfolioSummary {
        let total_invested = self.total_invested();
        let total_profit_loss = self.total_profit_loss();
        let return_basis_complete = self
            .holdings
            .iter()
            .all(|h| h.invested_amount.is_some() && h.profit_loss.is_some());
        let incomplete = self
            .holdings
            .iter()
            .filter(|h| {
                h.invested_amount.is_none() || h.current_value.is_none() || h.profit_loss.is_none()
            })
            .map(|h| h.symbol.clone())
            .collect();
        PortfolioSummary {
            holdings: self.holdings.len(),
            total_invested,
            total_current_value: self.total_current_value(),
            total_profit_loss,
            overall_return_percent: if return_basis_complete {
                return_percent(total_profit_loss, total_invested)
            } else {
                None
            },
            incomplete,
        }
    }

    /// Holdings ordered by return, best first. Undefined returns sort last.
    pub fn ranked_by_return(&self) -> Vec<&HoldingRecord> {
        let mut ranked: Vec<&HoldingRecord> = self.holdings.iter().collect();
        ranked.sort_by(|a, b| match (a.return_percent, b.return_percent) {
            (Some(x), Some(y)) => y.total_cmp(&x),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.symbol.cmp(&b.symbol),
        });
        ranked
    }
}

/// Maps a raw holdings table onto canonical records.
///
/// A missing required column fails the whole upload with
/// [`AnalyticsError::MalformedInput`]. A cell that cannot be parsed only
/// leaves that field of that row unset.
pub fn normalize_holdings(
    table: &RawTable,
    label: &str,
    classifier: &SectorClassifier,
) -> AnalyticsResult<PortfolioSnapshot> {
    let mut positions: HashMap<Column, usize> = HashMap::new();
    for (index, header) in table.headers.iter().enumerate() {
        let canonical = canonical_header(header);
        if let Some(column) = Column::ALL
            .iter()
            .find(|c| c.aliases().contains(&canonical.as_str()))
        {
            positions.entry(*column).or_insert(index);
        } else {
            debug!("Ignoring unrecognized column '{}'", header);
        }
    }

    for column in Column::REQUIRED {
        if !positions.contains_key(&column) {
            return Err(AnalyticsError::missing_column(column.display_name()));
        }
    }

    let cell = |row: &[String], column: Column| -> Option<f64> {
        positions
            .get(&column)
            .and_then(|i| row.get(*i))
            .and_then(|c| parse_amount(c))
    };

    let mut seen = HashSet::new();
    let mut holdings = Vec::with_capacity(table.rows.len());
    for (row_index, row) in table.rows.iter().enumerate() {
        let symbol = positions
            .get(&Column::Symbol)
            .and_then(|i| row.get(*i))
            .map(|s| s.trim().to_string())
            .unwrap_or_default();
        if symbol.is_empty() {
            debug!("Skipping row {} without a symbol", row_index + 1);
            continue;
        }
        if !seen.insert(symbol.clone()) {
            return Err(AnalyticsError::DuplicateSymbol(symbol));
        }

        let invested_amount = cell(row, Column::Invested);
        let profit_loss = cell(row, Column::ProfitLoss);
        let return_pct = match (profit_loss, invested_amount) {
            (Some(pl), Some(invested)) => return_percent(pl, invested),
            _ => None,
        };
        if invested_amount.is_none() || profit_loss.is_none() {
            warn!(
                "Row {} ({}) has unparsable amounts; return is unavailable",
                row_index + 1,
                symbol
            );
        }

        holdings.push(HoldingRecord {
            sector: classifier.classify(&symbol),
            symbol,
            quantity: cell(row, Column::Quantity),
            avg_cost: cell(row, Column::AvgCost),
            current_price: cell(row, Column::CurrentPrice),
            invested_amount,
            current_value: cell(row, Column::CurrentValue),
            profit_loss,
            return_percent: return_pct,
            net_change_percent: cell(row, Column::NetChange),
            day_change_percent: cell(row, Column::DayChange),
        });
    }

    debug!("Normalized {} holdings for '{}'", holdings.len(), label);
    Ok(PortfolioSnapshot::new(label, holdings))
}
