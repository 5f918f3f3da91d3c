use super::ui;
use crate::core::config::AppConfig;
use crate::core::holdings::PortfolioSnapshot;
use crate::core::rebalance::{RebalanceAction, RebalancingAdvisor, RebalancingRow};
use anyhow::Result;
use comfy_table::{Cell, Color};

fn action_cell(action: RebalanceAction) -> Cell {
    let color = match action {
        RebalanceAction::ExceedsCap => Color::Red,
        RebalanceAction::Increase => Color::Green,
        RebalanceAction::Trim => Color::Yellow,
        RebalanceAction::Hold => Color::DarkGrey,
    };
    Cell::new(action).fg(color)
}

pub fn render(rows: &[RebalancingRow]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Sector"),
        ui::header_cell("Current %"),
        ui::header_cell("Benchmark %"),
        ui::header_cell("Max %"),
        ui::header_cell("Delta"),
        ui::header_cell("Suggestion"),
    ]);
    for row in rows {
        table.add_row(vec![
            Cell::new(&row.sector),
            ui::number_cell(row.current_weight),
            ui::number_cell(row.benchmark_weight),
            ui::number_cell(row.max_allowed),
            ui::change_cell(row.delta_to_benchmark, ""),
            action_cell(row.action),
        ]);
    }
    table.to_string()
}

pub fn run(snapshot: &PortfolioSnapshot, config: &AppConfig) -> Result<()> {
    let exposure = config.sector_classifier().exposure(snapshot);
    let rows = RebalancingAdvisor::new(config.rebalance.clone()).advise(&exposure)?;
    println!(
        "Rebalancing vs benchmark weights: {}\n",
        ui::style_text(&snapshot.label, ui::StyleType::Title)
    );
    println!("{}", render(&rows));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_rows() {
        let rows = vec![RebalancingRow {
            sector: "Banking".to_string(),
            current_weight: 35.0,
            benchmark_weight: 28.0,
            max_allowed: 30.0,
            delta_to_benchmark: -7.0,
            action: RebalanceAction::ExceedsCap,
        }];
        let output = console::strip_ansi_codes(&render(&rows)).to_string();
        assert!(output.contains("Exceeds cap"));
        assert!(output.contains("-7.00"));
    }
}
