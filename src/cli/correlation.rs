use super::ui;
use crate::core::config::AppConfig;
use crate::core::correlation::{CorrelationMatrix, correlation_matrix};
use crate::core::error::AnalyticsError;
use crate::core::fetcher::MarketDataFetcher;
use crate::core::holdings::PortfolioSnapshot;
use anyhow::Result;
use comfy_table::{Cell, CellAlignment, Color};

fn correlation_cell(value: f64) -> Cell {
    let color = if value >= 0.7 {
        Color::Red
    } else if value <= -0.3 {
        Color::Blue
    } else {
        Color::Reset
    };
    Cell::new(format!("{value:.2}"))
        .fg(color)
        .set_alignment(CellAlignment::Right)
}

pub fn render(matrix: &CorrelationMatrix) -> String {
    let mut table = ui::new_styled_table();
    let mut header = vec![ui::header_cell("")];
    header.extend(matrix.symbols.iter().map(|s| ui::header_cell(s)));
    table.set_header(header);

    for (symbol, row) in matrix.symbols.iter().zip(&matrix.values) {
        let mut cells = vec![ui::header_cell(symbol)];
        cells.extend(row.iter().map(|v| correlation_cell(*v)));
        table.add_row(cells);
    }

    let mut output = format!(
        "{}\n{}",
        table,
        ui::style_text(
            &format!("{} common trading days", matrix.observations),
            ui::StyleType::Subtle
        )
    );
    if let Some((a, b, r)) = matrix.strongest_pair() {
        output.push_str(&format!("\nMost correlated: {a} / {b} ({r:.2})"));
    }
    if let Some(note) = ui::failures_note(&matrix.excluded, matrix.symbols.len() + matrix.excluded.len()) {
        output.push_str(&format!("\n{note}"));
    }
    output
}

/// Correlation heatmap of one year of daily returns.
pub async fn run(
    snapshot: &PortfolioSnapshot,
    fetcher: &MarketDataFetcher,
    config: &AppConfig,
) -> Result<()> {
    let symbols = snapshot.symbols();
    let pb = ui::new_progress_bar(symbols.len() as u64, true);
    pb.set_message("Fetching price history...");
    let histories = fetcher
        .fetch_histories(&symbols, &config.symbol_resolver(), config.benchmark.period, &|| pb.inc(1))
        .await;
    pb.finish_and_clear();

    println!(
        "Correlation of daily returns ({}): {}\n",
        config.benchmark.period,
        ui::style_text(&snapshot.label, ui::StyleType::Title)
    );

    match correlation_matrix(&histories.succeeded) {
        Ok(matrix) => println!("{}", render(&matrix)),
        Err(AnalyticsError::InsufficientData(reason)) => {
            println!(
                "{}",
                ui::style_text(&format!("Correlation not computed: {reason}"), ui::StyleType::Warning)
            );
        }
        Err(e) => return Err(e.into()),
    }
    if let Some(note) = ui::failures_note(&histories.failed, histories.requested()) {
        println!("{note}");
    }
    Ok(())
}
