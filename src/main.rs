use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use hlens::core::log::init_logging;
use std::path::PathBuf;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Display portfolio totals, per-holding returns and insights
    Summary {
        /// Holdings export (CSV)
        holdings: PathBuf,
    },
    /// Display sector exposure
    Sectors { holdings: PathBuf },
    /// Display beta and Sharpe ratio per holding against the benchmark
    Risk { holdings: PathBuf },
    /// Display the correlation matrix of daily returns
    Correlation { holdings: PathBuf },
    /// Suggest sector rebalancing against benchmark weights
    Rebalance { holdings: PathBuf },
    /// Project sector exposure after investing new money
    Simulate {
        holdings: PathBuf,
        /// Amount to invest, split evenly across targets
        #[arg(short, long)]
        amount: f64,
        /// Holding to invest in (repeatable)
        #[arg(short, long = "target", required = true)]
        targets: Vec<String>,
    },
    /// Compare two holdings snapshots
    Compare { old: PathBuf, new: PathBuf },
    /// Display live quotes
    Quotes {
        /// Quote every holding in this export
        holdings: Option<PathBuf>,
        /// Exchange ticker to quote (repeatable)
        #[arg(short, long = "ticker")]
        tickers: Vec<String>,
    },
}

impl From<Commands> for hlens::AppCommand {
    fn from(cmd: Commands) -> hlens::AppCommand {
        match cmd {
            Commands::Summary { holdings } => hlens::AppCommand::Summary { holdings },
            Commands::Sectors { holdings } => hlens::AppCommand::Sectors { holdings },
            Commands::Risk { holdings } => hlens::AppCommand::Risk { holdings },
            Commands::Correlation { holdings } => hlens::AppCommand::Correlation { holdings },
            Commands::Rebalance { holdings } => hlens::AppCommand::Rebalance { holdings },
            Commands::Simulate {
                holdings,
                amount,
                targets,
            } => hlens::AppCommand::Simulate {
                holdings,
                amount,
                targets,
            },
            Commands::Compare { old, new } => hlens::AppCommand::Compare { old, new },
            Commands::Quotes { holdings, tickers } => hlens::AppCommand::Quotes { holdings, tickers },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => match cli.config_path.as_deref() {
            Some(path) => hlens::cli::setup::setup_at_path(path),
            None => hlens::cli::setup::setup(),
        },
        Some(cmd) => hlens::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
