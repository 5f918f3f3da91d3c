use crate::core::fetcher::FetchSettings;
use crate::core::insights::InsightThresholds;
use crate::core::market::HistoricalPeriod;
use crate::core::rebalance::RebalanceSettings;
use crate::core::risk::RiskSettings;
use crate::core::sector::SectorClassifier;
use crate::core::symbol::{DEFAULT_EXCHANGE_SUFFIX, SymbolResolver};
use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct YahooProviderConfig {
    pub base_url: String,
    pub retries: usize,
    pub retry_delay_ms: u64,
}

impl Default for YahooProviderConfig {
    fn default() -> Self {
        YahooProviderConfig {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            retries: 2,
            retry_delay_ms: 500,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct ProvidersConfig {
    #[serde(default)]
    pub yahoo: YahooProviderConfig,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct BenchmarkConfig {
    pub ticker: String,
    pub period: HistoricalPeriod,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        BenchmarkConfig {
            ticker: "^NSEI".to_string(),
            period: HistoricalPeriod::OneYear,
        }
    }
}

/// Static lookup tables. Edit these instead of code when a broker symbol
/// diverges from its exchange ticker or a sector is missing.
#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct TablesConfig {
    pub sectors: HashMap<String, String>,
    pub symbol_overrides: HashMap<String, String>,
    pub exchange_suffix: String,
}

impl Default for TablesConfig {
    fn default() -> Self {
        TablesConfig {
            sectors: default_sectors(),
            symbol_overrides: default_symbol_overrides(),
            exchange_suffix: DEFAULT_EXCHANGE_SUFFIX.to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default)]
    pub benchmark: BenchmarkConfig,
    #[serde(default)]
    pub tables: TablesConfig,
    #[serde(default)]
    pub risk: RiskSettings,
    #[serde(default)]
    pub rebalance: RebalanceSettings,
    #[serde(default)]
    pub insights: InsightThresholds,
    #[serde(default)]
    pub fetch: FetchSettings,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            providers: ProvidersConfig::default(),
            benchmark: BenchmarkConfig::default(),
            tables: TablesConfig::default(),
            risk: RiskSettings::default(),
            rebalance: RebalanceSettings::default(),
            insights: InsightThresholds::default(),
            fetch: FetchSettings::default(),
        }
    }
}

impl AppConfig {
    /// Loads the config from the default location, or built-in defaults when
    /// no config file has been created yet.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("in", "hlens", "hlens")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    pub fn sector_classifier(&self) -> SectorClassifier {
        SectorClassifier::new(self.tables.sectors.clone())
    }

    pub fn symbol_resolver(&self) -> SymbolResolver {
        SymbolResolver::new(
            self.tables.symbol_overrides.clone(),
            &self.tables.exchange_suffix,
        )
    }
}

fn table(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn default_sectors() -> HashMap<String, String> {
    table(&[
        ("HDFCBANK", "Banking"),
        ("ICICIBANK", "Banking"),
        ("SBIN", "Banking"),
        ("KOTAKBANK", "Banking"),
        ("AXISBANK", "Banking"),
        ("PNB", "Banking"),
        ("BANKBARODA", "Banking"),
        ("YESBANK", "Banking"),
        ("IDFCFIRSTB", "Banking"),
        ("INFY", "IT"),
        ("TCS", "IT"),
        ("WIPRO", "IT"),
        ("HCLTECH", "IT"),
        ("TECHM", "IT"),
        ("RELIANCE", "Energy"),
        ("ONGC", "Energy"),
        ("NTPC", "Energy"),
        ("POWERGRID", "Energy"),
        ("TATAPOWER", "Energy"),
        ("ITC", "FMCG"),
        ("HINDUNILVR", "FMCG"),
        ("NESTLEIND", "FMCG"),
        ("BRITANNIA", "FMCG"),
        ("TATAMOTORS", "Auto"),
        ("MARUTI", "Auto"),
        ("M&M", "Auto"),
        ("BAJAJ-AUTO", "Auto"),
        ("SUNPHARMA", "Pharma"),
        ("DRREDDY", "Pharma"),
        ("CIPLA", "Pharma"),
        ("BAJFINANCE", "Financial Services"),
        ("HDFCLIFE", "Financial Services"),
        ("TATASTEEL", "Metals"),
        ("HINDALCO", "Metals"),
        ("LT", "Infrastructure"),
        ("BHARTIARTL", "Telecom"),
        ("IDEA", "Telecom"),
    ])
}

fn default_symbol_overrides() -> HashMap<String, String> {
    table(&[
        ("MOTHERSUMI", "MOTHERSON.NS"),
        ("ZOMATO", "ETERNAL.NS"),
        ("LTI", "LTIM.NS"),
    ])
}
