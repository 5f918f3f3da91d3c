use super::ui;
use crate::core::config::AppConfig;
use crate::core::holdings::PortfolioSnapshot;
use crate::core::simulator::{SimulatedAllocation, simulate};
use anyhow::Result;
use comfy_table::Cell;
use std::collections::BTreeSet;

pub fn render(sim: &SimulatedAllocation) -> String {
    let mut allocations = ui::new_styled_table();
    allocations.set_header(vec![ui::header_cell("Target"), ui::header_cell("Allocated")]);
    for (symbol, amount) in &sim.allocations {
        allocations.add_row(vec![Cell::new(symbol), ui::number_cell(*amount)]);
    }

    let mut sectors = ui::new_styled_table();
    sectors.set_header(vec![
        ui::header_cell("Sector"),
        ui::header_cell("Before"),
        ui::header_cell("After"),
        ui::header_cell("Weight Before"),
        ui::header_cell("Weight After"),
        ui::header_cell("Shift"),
    ]);
    let names: BTreeSet<&String> = sim.before.values.keys().chain(sim.after.values.keys()).collect();
    for sector in names {
        sectors.add_row(vec![
            Cell::new(sector),
            ui::number_cell(sim.before.value(sector)),
            ui::number_cell(sim.after.value(sector)),
            ui::format_optional_cell(sim.before.weight(sector), |w| format!("{w:.2}%")),
            ui::format_optional_cell(sim.after.weight(sector), |w| format!("{w:.2}%")),
            sim.weight_shift(sector)
                .map_or(ui::na_cell(false), |s| ui::change_cell(s, " pp")),
        ]);
    }

    format!("{allocations}\n\n{sectors}")
}

pub fn run(snapshot: &PortfolioSnapshot, config: &AppConfig, amount: f64, targets: &[String]) -> Result<()> {
    let sim = simulate(snapshot, &config.sector_classifier(), amount, targets)?;
    println!(
        "What-if: investing {amount:.2} across {} holding(s) in {}\n",
        targets.len(),
        ui::style_text(&snapshot.label, ui::StyleType::Title)
    );
    println!("{}", render(&sim));
    Ok(())
}
