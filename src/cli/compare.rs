use super::ui;
use crate::core::compare::{Presence, SnapshotComparison, compare_snapshots};
use crate::core::holdings::PortfolioSnapshot;
use anyhow::Result;
use comfy_table::Cell;

fn presence_label(presence: Presence) -> &'static str {
    match presence {
        Presence::Both => "",
        Presence::OnlyOld => "closed",
        Presence::OnlyNew => "new",
    }
}

fn delta_cell(delta: Option<f64>) -> Cell {
    delta.map_or(ui::na_cell(false), |d| ui::change_cell(d, ""))
}

fn total_text(total: Option<f64>) -> String {
    total.map_or_else(|| "N/A".to_string(), |t| format!("{t:.2}"))
}

pub fn render(comparison: &SnapshotComparison) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Instrument"),
        ui::header_cell("Qty Δ"),
        ui::header_cell("Value Δ"),
        ui::header_cell("P&L Δ"),
        ui::header_cell("Status"),
    ]);
    for row in &comparison.rows {
        table.add_row(vec![
            Cell::new(&row.symbol),
            delta_cell(row.quantity_delta),
            delta_cell(row.value_delta),
            delta_cell(row.profit_loss_delta),
            Cell::new(presence_label(row.presence)),
        ]);
    }
    format!(
        "{}\n\n{} {}   {} {}",
        table,
        ui::style_text("Value change:", ui::StyleType::TotalLabel),
        total_text(comparison.total_value_delta),
        ui::style_text("P&L change:", ui::StyleType::TotalLabel),
        total_text(comparison.total_profit_loss_delta)
    )
}

pub fn run(old: &PortfolioSnapshot, new: &PortfolioSnapshot) -> Result<()> {
    let comparison = compare_snapshots(old, new);
    println!(
        "Changes from {} to {}\n",
        ui::style_text(&old.label, ui::StyleType::Title),
        ui::style_text(&new.label, ui::StyleType::Title)
    );
    println!("{}", render(&comparison));
    Ok(())
}
