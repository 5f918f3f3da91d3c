use std::collections::HashMap;

pub const DEFAULT_EXCHANGE_SUFFIX: &str = ".NS";

/// Maps broker symbols to the tickers the market data provider knows.
///
/// Renamed or restructured companies keep their old symbol in broker exports,
/// so an override table is consulted first; everything else gets the
/// exchange suffix appended.
#[derive(Debug, Clone)]
pub struct SymbolResolver {
    overrides: HashMap<String, String>,
    suffix: String,
}

impl SymbolResolver {
    pub fn new(overrides: HashMap<String, String>, suffix: &str) -> Self {
        Self {
            overrides,
            suffix: suffix.to_string(),
        }
    }

    pub fn resolve(&self, symbol: &str) -> String {
        match self.overrides.get(symbol) {
            Some(ticker) => ticker.clone(),
            None => format!("{symbol}{}", self.suffix),
        }
    }
}

impl Default for SymbolResolver {
    fn default() -> Self {
        Self::new(HashMap::new(), DEFAULT_EXCHANGE_SUFFIX)
    }
}
