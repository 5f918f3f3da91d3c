use super::ui;
use crate::core::fetcher::MarketDataFetcher;
use crate::core::quotes::{LiveQuote, format_quotes};
use anyhow::Result;
use comfy_table::Cell;
use std::collections::HashSet;

pub fn render(quotes: &[LiveQuote]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Ticker"),
        ui::header_cell("Price"),
        ui::header_cell("Prev Close"),
        ui::header_cell("Change"),
        ui::header_cell("Change %"),
        ui::header_cell("As of"),
    ]);
    for quote in quotes {
        if let Some(error) = &quote.error {
            table.add_row(vec![
                Cell::new(&quote.ticker),
                ui::na_cell(true),
                ui::na_cell(true),
                ui::na_cell(true),
                ui::na_cell(true),
                Cell::new(ui::style_text(error, ui::StyleType::Error)),
            ]);
            continue;
        }
        table.add_row(vec![
            Cell::new(&quote.ticker),
            ui::format_optional_cell(quote.price, |p| format!("{p:.2}")),
            ui::format_optional_cell(quote.previous_close, |p| format!("{p:.2}")),
            ui::change_cell(quote.change, ""),
            quote
                .change_percent
                .map_or(ui::na_cell(false), |c| ui::change_cell(c, "%")),
            Cell::new(
                quote
                    .timestamp
                    .map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
                    .unwrap_or_default(),
            ),
        ]);
    }
    table.to_string()
}

/// Drops repeated tickers, keeping the first occurrence of each.
pub fn unique_tickers(tickers: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    tickers
        .iter()
        .filter(|t| seen.insert(*t))
        .cloned()
        .collect()
}

/// One refresh of live quotes. Polling is left to the caller.
pub async fn run(tickers: &[String], fetcher: &MarketDataFetcher) -> Result<()> {
    let tickers = unique_tickers(tickers);
    if tickers.is_empty() {
        println!("No tickers to quote.");
        return Ok(());
    }

    let pb = ui::new_progress_bar(tickers.len() as u64, true);
    pb.set_message("Fetching quotes...");
    let outcome = fetcher.fetch_quotes(&tickers, &|| pb.inc(1)).await;
    pb.finish_and_clear();

    println!("{}", render(&format_quotes(&tickers, &outcome)));
    if let Some(note) = outcome.availability_note() {
        println!("{}", ui::style_text(&note, ui::StyleType::Warning));
    }
    Ok(())
}
