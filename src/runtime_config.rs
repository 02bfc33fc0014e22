// =============================================================================
// Runtime Configuration — Startup settings for the analyzer
// =============================================================================
//
// Every tunable lives here and is passed explicitly to the client and the
// dashboard at construction time. All fields carry `#[serde(default)]` so a
// partial (or empty) JSON file still loads.
//
// The API key is deliberately not part of this file; see `ApiCredential`.
// =============================================================================

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::rsi::DEFAULT_RSI_PERIOD;

/// Environment variable holding the Alpha Vantage API key.
pub const API_KEY_ENV: &str = "ALPHA_VANTAGE_API_KEY";

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_base_url() -> String {
    "https://www.alphavantage.co/query".to_string()
}

fn default_symbols() -> Vec<SymbolEntry> {
    [
        ("NASDAQ Composite", "^IXIC"),
        ("NASDAQ 100", "^NDX"),
        ("QQQ ETF", "QQQ"),
        ("NASDAQ Futures", "NQ=F"),
    ]
    .into_iter()
    .map(|(name, ticker)| SymbolEntry {
        display_name: name.to_string(),
        ticker: ticker.to_string(),
    })
    .collect()
}

fn default_chart_symbol() -> String {
    "QQQ".to_string()
}

fn default_chart_points() -> usize {
    30
}

fn default_rsi_window() -> usize {
    DEFAULT_RSI_PERIOD
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_bind_addr() -> String {
    "0.0.0.0:3001".to_string()
}

// =============================================================================
// SymbolEntry
// =============================================================================

/// One row of the overview table: what the user sees and what we query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SymbolEntry {
    pub display_name: String,
    pub ticker: String,
}

// =============================================================================
// RuntimeConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Alpha Vantage query endpoint.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Overview symbols, in display order.
    #[serde(default = "default_symbols")]
    pub symbols: Vec<SymbolEntry>,

    /// Ticker used for the technical (chart + RSI) section.
    #[serde(default = "default_chart_symbol")]
    pub chart_symbol: String,

    /// Number of most recent closes shown on the chart.
    #[serde(default = "default_chart_points")]
    pub chart_points: usize,

    /// RSI look-back window.
    #[serde(default = "default_rsi_window")]
    pub rsi_window: usize,

    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Address the dashboard API listens on.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            symbols: default_symbols(),
            chart_symbol: default_chart_symbol(),
            chart_points: default_chart_points(),
            rsi_window: default_rsi_window(),
            request_timeout_secs: default_request_timeout_secs(),
            bind_addr: default_bind_addr(),
        }
    }
}

impl RuntimeConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read runtime config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse runtime config from {}", path.display()))?;

        info!(
            path = %path.display(),
            symbols = config.symbols.len(),
            chart_symbol = %config.chart_symbol,
            "runtime config loaded"
        );

        Ok(config)
    }
}

// =============================================================================
// ApiCredential
// =============================================================================

/// The Alpha Vantage API key, if one was provided.
///
/// A blank value is treated the same as a missing one.
#[derive(Clone, Default)]
pub struct ApiCredential(Option<String>);

impl ApiCredential {
    pub fn new(key: impl Into<String>) -> Self {
        let key = key.into();
        if key.trim().is_empty() {
            Self(None)
        } else {
            Self(Some(key.trim().to_string()))
        }
    }

    /// Read the key from [`API_KEY_ENV`]. `.env` must already be loaded.
    pub fn from_env() -> Self {
        std::env::var(API_KEY_ENV)
            .map(Self::new)
            .unwrap_or_default()
    }

    pub fn key(&self) -> Option<&str> {
        self.0.as_deref()
    }

    pub fn is_present(&self) -> bool {
        self.0.is_some()
    }
}

impl std::fmt::Debug for ApiCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.0 {
            Some(_) => f.write_str("ApiCredential(<redacted>)"),
            None => f.write_str("ApiCredential(<missing>)"),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let cfg = RuntimeConfig::default();
        assert_eq!(cfg.base_url, "https://www.alphavantage.co/query");
        assert_eq!(cfg.symbols.len(), 4);
        assert_eq!(cfg.symbols[0].display_name, "NASDAQ Composite");
        assert_eq!(cfg.symbols[0].ticker, "^IXIC");
        assert_eq!(cfg.symbols[3].ticker, "NQ=F");
        assert_eq!(cfg.chart_symbol, "QQQ");
        assert_eq!(cfg.chart_points, 30);
        assert_eq!(cfg.rsi_window, 14);
    }

    #[test]
    fn deserialise_empty_json_uses_defaults() {
        let cfg: RuntimeConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.symbols, default_symbols());
        assert_eq!(cfg.request_timeout_secs, 10);
        assert_eq!(cfg.bind_addr, "0.0.0.0:3001");
    }

    #[test]
    fn deserialise_partial_json_fills_defaults() {
        let json = r#"{
            "chart_symbol": "SPY",
            "symbols": [{ "display_name": "S&P 500 ETF", "ticker": "SPY" }]
        }"#;
        let cfg: RuntimeConfig = serde_json::from_str(json).unwrap();
        assert_eq!(cfg.chart_symbol, "SPY");
        assert_eq!(cfg.symbols.len(), 1);
        assert_eq!(cfg.symbols[0].ticker, "SPY");
        assert_eq!(cfg.rsi_window, 14);
    }

    #[test]
    fn load_missing_file_is_error() {
        assert!(RuntimeConfig::load("/definitely/not/here/analyzer_config.json").is_err());
    }

    #[test]
    fn blank_credential_is_missing() {
        assert!(!ApiCredential::new("   ").is_present());
        assert!(!ApiCredential::default().is_present());
        assert_eq!(ApiCredential::new(" abc ").key(), Some("abc"));
    }

    #[test]
    fn credential_debug_is_redacted() {
        let cred = ApiCredential::new("super-secret");
        let shown = format!("{cred:?}");
        assert!(!shown.contains("super-secret"));
        assert!(shown.contains("redacted"));
    }
}
