use super::ui;
use crate::core::config::AppConfig;
use crate::core::holdings::PortfolioSnapshot;
use crate::core::sector::SectorExposure;
use anyhow::Result;
use comfy_table::Cell;

pub fn render(exposure: &SectorExposure) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Sector"),
        ui::header_cell("Value"),
        ui::header_cell("Weight"),
    ]);
    for (sector, value) in exposure.ranked() {
        table.add_row(vec![
            Cell::new(sector),
            ui::number_cell(value),
            ui::format_optional_cell(exposure.weight(sector), |w| format!("{w:.2}%")),
        ]);
    }

    let mut output = table.to_string();
    if !exposure.unvalued.is_empty() {
        output.push_str(&format!(
            "\n{}",
            ui::style_text(
                &format!("Without a current value: {}", exposure.unvalued.join(", ")),
                ui::StyleType::Warning
            )
        ));
    }
    output
}

pub fn run(snapshot: &PortfolioSnapshot, config: &AppConfig) -> Result<()> {
    let exposure = config.sector_classifier().exposure(snapshot);
    println!(
        "Sector exposure: {}\n",
        ui::style_text(&snapshot.label, ui::StyleType::Title)
    );
    println!("{}", render(&exposure));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_render_weights() {
        let exposure = SectorExposure::from_values(BTreeMap::from([
            ("IT".to_string(), 750.0),
            ("Banking".to_string(), 250.0),
        ]));
        let output = render(&exposure);
        assert!(output.contains("75.00%"));
        assert!(output.contains("25.00%"));
        assert!(output.find("IT").unwrap() < output.find("Banking").unwrap());
    }
}
