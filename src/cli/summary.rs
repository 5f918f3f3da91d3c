use super::ui;
use crate::core::config::AppConfig;
use crate::core::holdings::PortfolioSnapshot;
use crate::core::insights::portfolio_insights;
use anyhow::Result;
use comfy_table::Cell;

/// Valuation totals followed by the per-holding return table.
pub fn render(snapshot: &PortfolioSnapshot) -> String {
    let summary = snapshot.summary();

    let mut totals = ui::new_styled_table();
    totals.set_header(vec![
        ui::header_cell("Total Invested"),
        ui::header_cell("Current Value"),
        ui::header_cell("Unrealized P&L"),
        ui::header_cell("Overall Return"),
    ]);
    totals.add_row(vec![
        ui::number_cell(summary.total_invested),
        ui::number_cell(summary.total_current_value),
        ui::change_cell(summary.total_profit_loss, ""),
        summary
            .overall_return_percent
            .map_or(ui::na_cell(false), |r| ui::change_cell(r, "%")),
    ]);

    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Instrument"),
        ui::header_cell("Sector"),
        ui::header_cell("Qty"),
        ui::header_cell("Invested"),
        ui::header_cell("Current Value"),
        ui::header_cell("P&L"),
        ui::header_cell("Return"),
    ]);
    for holding in snapshot.ranked_by_return() {
        table.add_row(vec![
            Cell::new(&holding.symbol),
            Cell::new(&holding.sector),
            ui::format_optional_cell(holding.quantity, |q| format!("{q}")),
            ui::format_optional_cell(holding.invested_amount, |v| format!("{v:.2}")),
            ui::format_optional_cell(holding.current_value, |v| format!("{v:.2}")),
            holding
                .profit_loss
                .map_or(ui::na_cell(true), |pl| ui::change_cell(pl, "")),
            holding
                .return_percent
                .map_or(ui::na_cell(false), |r| ui::change_cell(r, "%")),
        ]);
    }

    let mut output = format!(
        "Portfolio: {}\n\n{}\n\n{}",
        ui::style_text(&snapshot.label, ui::StyleType::Title),
        totals,
        table
    );
    if !summary.incomplete.is_empty() {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!(
                    "Amounts missing for {}; totals exclude them",
                    summary.incomplete.join(", ")
                ),
                ui::StyleType::Warning
            )
        ));
    }
    output
}

pub fn run(snapshot: &PortfolioSnapshot, config: &AppConfig) -> Result<()> {
    println!("{}", render(snapshot));

    let exposure = config.sector_classifier().exposure(snapshot);
    let insights = portfolio_insights(snapshot, &exposure, &config.insights);
    if !insights.is_empty() {
        println!("\n{}", ui::style_text("Insights", ui::StyleType::TotalLabel));
        for insight in insights {
            println!("  • {insight}");
        }
    }
    ui::print_separator();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::holdings::HoldingRecord;
    use crate::core::sector::SectorClassifier;

    #[test]
    fn test_render_shows_totals_and_na_for_undefined_return() {
        let classifier = SectorClassifier::default();
        let snapshot = PortfolioSnapshot::new(
            "holdings",
            vec![
                HoldingRecord::new("INFY", 10.0, 1000.0, 1500.0, 500.0, &classifier),
                HoldingRecord::new("GIFT", 1.0, 0.0, 100.0, 100.0, &classifier),
            ],
        );
        let output = console::strip_ansi_codes(&render(&snapshot)).to_string();
        assert!(output.contains("1000.00"));
        assert!(output.contains("1600.00"));
        assert!(output.contains("60.00%"));
        assert!(output.contains("50.00%"));
        assert!(output.contains("N/A"));
        assert!(!output.contains("Amounts missing"));
    }

    #[test]
    fn test_render_flags_incomplete_holdings() {
        let classifier = SectorClassifier::default();
        let mut pnb = HoldingRecord::new("PNB", 20.0, 2000.0, 1800.0, -200.0, &classifier);
        pnb.invested_amount = None;
        let snapshot = PortfolioSnapshot::new(
            "holdings",
            vec![HoldingRecord::new("INFY", 10.0, 1000.0, 1500.0, 500.0, &classifier), pnb],
        );
        let output = console::strip_ansi_codes(&render(&snapshot)).to_string();
        assert!(output.contains("Amounts missing for PNB; totals exclude them"));
        assert!(!output.contains("30.00%"));
    }
}
