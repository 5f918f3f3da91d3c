pub mod cli;
pub mod core;
pub mod providers;

use crate::core::config::AppConfig;
use crate::core::fetcher::MarketDataFetcher;
use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, info};

/// Commands that operate on holdings exports.
#[derive(Debug, Clone)]
pub enum AppCommand {
    Summary {
        holdings: PathBuf,
    },
    Sectors {
        holdings: PathBuf,
    },
    Risk {
        holdings: PathBuf,
    },
    Correlation {
        holdings: PathBuf,
    },
    Rebalance {
        holdings: PathBuf,
    },
    Simulate {
        holdings: PathBuf,
        amount: f64,
        targets: Vec<String>,
    },
    Compare {
        old: PathBuf,
        new: PathBuf,
    },
    Quotes {
        holdings: Option<PathBuf>,
        tickers: Vec<String>,
    },
}

fn load_config(config_path: Option<&str>) -> Result<AppConfig> {
    let config = match config_path {
        Some(path) => AppConfig::load_from_path(path)?,
        None => AppConfig::load()?,
    };
    debug!("Loaded config: {config:#?}");
    Ok(config)
}

fn market_data(config: &AppConfig) -> Result<MarketDataFetcher> {
    let provider = providers::yahoo_finance::YahooFinanceProvider::new(&config.providers.yahoo)?;
    Ok(MarketDataFetcher::new(
        Arc::new(provider),
        config.fetch.clone(),
    ))
}

pub async fn run_command(command: AppCommand, config_path: Option<&str>) -> Result<()> {
    info!("Holdings analyzer starting...");
    let config = load_config(config_path)?;
    let classifier = config.sector_classifier();

    match command {
        AppCommand::Summary { holdings } => {
            let snapshot = cli::input::load_snapshot(&holdings, &classifier)?;
            cli::summary::run(&snapshot, &config)
        }
        AppCommand::Sectors { holdings } => {
            let snapshot = cli::input::load_snapshot(&holdings, &classifier)?;
            cli::sectors::run(&snapshot, &config)
        }
        AppCommand::Risk { holdings } => {
            let snapshot = cli::input::load_snapshot(&holdings, &classifier)?;
            let fetcher = market_data(&config)?;
            cli::risk::run(&snapshot, &fetcher, &config).await
        }
        AppCommand::Correlation { holdings } => {
            let snapshot = cli::input::load_snapshot(&holdings, &classifier)?;
            let fetcher = market_data(&config)?;
            cli::correlation::run(&snapshot, &fetcher, &config).await
        }
        AppCommand::Rebalance { holdings } => {
            let snapshot = cli::input::load_snapshot(&holdings, &classifier)?;
            cli::rebalance::run(&snapshot, &config)
        }
        AppCommand::Simulate {
            holdings,
            amount,
            targets,
        } => {
            let snapshot = cli::input::load_snapshot(&holdings, &classifier)?;
            cli::simulate::run(&snapshot, &config, amount, &targets)
        }
        AppCommand::Compare { old, new } => {
            let old = cli::input::load_snapshot(&old, &classifier)?;
            let new = cli::input::load_snapshot(&new, &classifier)?;
            cli::compare::run(&old, &new)
        }
        AppCommand::Quotes { holdings, tickers } => {
            let mut tickers = tickers;
            if let Some(path) = holdings {
                let snapshot = cli::input::load_snapshot(&path, &classifier)?;
                let resolver = config.symbol_resolver();
                tickers.extend(snapshot.holdings.iter().map(|h| resolver.resolve(&h.symbol)));
            }
            let fetcher = market_data(&config)?;
            cli::quotes::run(&tickers, &fetcher).await
        }
    }
}
