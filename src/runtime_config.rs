// =============================================================================
// Runtime Configuration — server, strategy and market-data settings
// =============================================================================
//
// Every tunable lives here.  The JSON file is optional; all fields carry
// `#[serde(default)]` so a partial (or empty) file still loads, and a handful
// of environment variables override the file for deployment-specific values.
//
// Secrets (API key / app secret) are NOT part of this struct.  They are read
// from the environment by the Schwab client on every request.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::atr::DEFAULT_ATR_PERIOD;
use crate::strategy::ticket::DEFAULT_SPREAD_WIDTH;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_bind_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_allowed_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_string()]
}

fn default_atr_period() -> usize {
    DEFAULT_ATR_PERIOD
}

fn default_spread_width() -> f64 {
    DEFAULT_SPREAD_WIDTH
}

fn default_schwab_base_url() -> String {
    "https://api.schwabapi.com".to_string()
}

fn default_token_path() -> PathBuf {
    PathBuf::from("./.secrets/schwab_token.json")
}

// =============================================================================
// StrategyParams
// =============================================================================

/// Tunable parameters for the break-of-structure ticket.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StrategyParams {
    /// Number of trailing true ranges averaged into the ATR.
    #[serde(default = "default_atr_period")]
    pub atr_period: usize,

    /// Distance between short and long strikes of the credit spread.
    #[serde(default = "default_spread_width")]
    pub spread_width: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            atr_period: default_atr_period(),
            spread_width: default_spread_width(),
        }
    }
}

// =============================================================================
// SchwabConfig
// =============================================================================

/// Where to reach the market-data vendor and where its OAuth token lives.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchwabConfig {
    #[serde(default = "default_schwab_base_url")]
    pub base_url: String,

    /// Token file written by the login helper.
    #[serde(default = "default_token_path")]
    pub token_path: PathBuf,
}

impl Default for SchwabConfig {
    fn default() -> Self {
        Self {
            base_url: default_schwab_base_url(),
            token_path: default_token_path(),
        }
    }
}

// =============================================================================
// RuntimeConfig
// =============================================================================

/// Top-level configuration for the API server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuntimeConfig {
    /// Socket address the HTTP server binds to.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    /// Origins allowed by the CORS layer (the web dashboard).
    #[serde(default = "default_allowed_origins")]
    pub allowed_origins: Vec<String>,

    #[serde(default)]
    pub strategy_params: StrategyParams,

    #[serde(default)]
    pub schwab: SchwabConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            allowed_origins: default_allowed_origins(),
            strategy_params: StrategyParams::default(),
            schwab: SchwabConfig::default(),
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
            bind_addr = %config.bind_addr,
            atr_period = config.strategy_params.atr_period,
            "runtime config loaded"
        );

        Ok(config)
    }

    /// Apply environment overrides through `lookup` (normally `std::env::var`).
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("PROTRADE_BIND_ADDR") {
            self.bind_addr = addr;
        }
        if let Some(origins) = lookup("PROTRADE_ALLOWED_ORIGINS") {
            self.allowed_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }
        if let Some(path) = lookup("SCHWAB_TOKEN_PATH") {
            self.schwab.token_path = PathBuf::from(path);
        }
        if let Some(url) = lookup("SCHWAB_BASE_URL") {
            self.schwab.base_url = url.trim_end_matches('/').to_string();
        }
    }
}
