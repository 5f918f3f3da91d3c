use super::ui;
use crate::core::config::AppConfig;
use crate::core::error::AnalyticsError;
use crate::core::fetcher::MarketDataFetcher;
use crate::core::holdings::PortfolioSnapshot;
use crate::core::risk::{RiskEngine, RiskReport};
use anyhow::Result;
use comfy_table::Cell;
use tracing::info;

pub fn render(report: &RiskReport) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Instrument"),
        ui::header_cell("Beta"),
        ui::header_cell("Sharpe (daily)"),
        ui::header_cell("Days"),
    ]);
    for metric in report.succeeded.values() {
        table.add_row(vec![
            Cell::new(&metric.symbol),
            metric.beta.map_or(ui::na_cell(false), ui::number_cell),
            metric
                .sharpe
                .map_or(ui::na_cell(false), |sharpe| ui::change_cell(sharpe, "")),
            Cell::new(metric.observations),
        ]);
    }
    for symbol in report.failed.keys() {
        table.add_row(vec![
            Cell::new(symbol),
            ui::na_cell(true),
            ui::na_cell(true),
            ui::na_cell(true),
        ]);
    }

    let mut output = table.to_string();
    if let Some(note) = ui::failures_note(&report.failed, report.requested()) {
        output.push_str(&format!("\n{note}"));
    }
    output
}

/// Beta and Sharpe for every holding against the configured benchmark.
pub async fn run(
    snapshot: &PortfolioSnapshot,
    fetcher: &MarketDataFetcher,
    config: &AppConfig,
) -> Result<()> {
    let benchmark = &config.benchmark;
    info!("Computing risk metrics against {}", benchmark.ticker);

    let benchmark_returns = fetcher
        .fetch_benchmark(&benchmark.ticker, benchmark.period)
        .await
        .map_err(|e| AnalyticsError::ExternalFetchFailure {
            symbol: benchmark.ticker.clone(),
            reason: format!("{e:#}; risk metrics skipped"),
        })?;

    let symbols = snapshot.symbols();
    let pb = ui::new_progress_bar(symbols.len() as u64, true);
    pb.set_message("Fetching price history...");
    let returns = fetcher
        .fetch_returns(&symbols, &config.symbol_resolver(), benchmark.period, &|| pb.inc(1))
        .await;
    pb.finish_and_clear();

    let report = RiskEngine::new(config.risk.clone()).analyze(returns, &benchmark_returns);

    println!(
        "Risk metrics vs {} ({}): {}\n",
        benchmark.ticker,
        benchmark.period,
        ui::style_text(&snapshot.label, ui::StyleType::Title)
    );
    println!("{}", render(&report));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::isolation::BatchOutcome;
    use crate::core::risk::RiskMetric;

    #[test]
    fn test_render_lists_unavailable_symbols() {
        let mut report: RiskReport = BatchOutcome::new();
        report.record_success(
            "INFY".to_string(),
            RiskMetric {
                symbol: "INFY".to_string(),
                beta: Some(0.85),
                sharpe: Some(0.04),
                observations: 245,
            },
        );
        report.record_success(
            "FLAT".to_string(),
            RiskMetric {
                symbol: "FLAT".to_string(),
                beta: Some(0.0),
                sharpe: None,
                observations: 245,
            },
        );
        report.record_failure(
            "GONE".to_string(),
            "risk unavailable for GONE: No price data found for symbol: GONE.NS",
        );

        let output = console::strip_ansi_codes(&render(&report)).to_string();
        assert!(output.contains("0.85"));
        assert!(output.contains("245"));
        assert!(output.contains("1 of 3 symbols unavailable"));
        assert!(output.contains("GONE: risk unavailable for GONE: No price data"));

        let flat_row = output.lines().find(|l| l.contains("FLAT")).unwrap();
        assert!(flat_row.contains("0.00"));
        assert!(flat_row.contains("N/A"));
    }
}
