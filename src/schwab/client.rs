// =============================================================================
// Schwab Market Data Client — bearer-token REST calls
// =============================================================================
//
// Credentials come from two places:
//   - SCHWAB_API_KEY / SCHWAB_APP_SECRET in the environment
//   - the OAuth token file written by the login helper
//
// Both are re-read on every `load` so a refreshed token is picked up without
// restarting the server.  Missing credentials are "not ready" (`Ok(None)`),
// which the API reports separately from an upstream failure.
//
// SECURITY: the access token is never logged or serialized.
// =============================================================================

use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::market_data::{Candle, Timestamp};
use crate::runtime_config::SchwabConfig;
use crate::types::Timeframe;

/// Failures talking to Schwab.  None of these may be turned into a WAIT
/// ticket by callers.
#[derive(Debug, Error)]
pub enum SchwabError {
    #[error("failed to read Schwab token file {path}: {reason}")]
    Token { path: PathBuf, reason: String },

    #[error("Schwab request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Schwab returned {status}: {body}")]
    Upstream { status: u16, body: String },

    #[error("failed to decode Schwab response: {0}")]
    Decode(String),
}

// -----------------------------------------------------------------------------
// Wire types
// -----------------------------------------------------------------------------

#[derive(Deserialize)]
struct TokenFile {
    token: TokenBody,
}

#[derive(Deserialize)]
struct TokenBody {
    access_token: String,
}

#[derive(Deserialize)]
struct PriceHistory {
    #[serde(default)]
    candles: Vec<RawCandle>,
}

#[derive(Deserialize)]
struct RawCandle {
    datetime: Timestamp,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: f64,
}

impl From<RawCandle> for Candle {
    fn from(row: RawCandle) -> Self {
        Candle::new(row.datetime, row.open, row.high, row.low, row.close, row.volume)
    }
}

// -----------------------------------------------------------------------------
// Client
// -----------------------------------------------------------------------------

/// Schwab market-data client bound to one access token.
#[derive(Clone)]
pub struct SchwabClient {
    http: reqwest::Client,
    base_url: String,
    access_token: String,
}

impl SchwabClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        access_token: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            access_token: access_token.into(),
        }
    }

    /// Build a client from the token file and app credentials.
    ///
    /// Returns `Ok(None)` when the token file does not exist yet or either
    /// credential is unset/empty.  A token file that exists but cannot be
    /// parsed is an error.
    pub fn load<F>(
        http: reqwest::Client,
        config: &SchwabConfig,
        lookup: F,
    ) -> Result<Option<Self>, SchwabError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if !config.token_path.exists() {
            debug!(path = %config.token_path.display(), "Schwab token file not found");
            return Ok(None);
        }

        let has = |key: &str| lookup(key).is_some_and(|v| !v.trim().is_empty());
        if !has("SCHWAB_API_KEY") || !has("SCHWAB_APP_SECRET") {
            warn!("SCHWAB_API_KEY / SCHWAB_APP_SECRET not set — Schwab client not ready");
            return Ok(None);
        }

        let access_token = read_access_token(&config.token_path)?;
        Ok(Some(Self::new(http, config.base_url.clone(), access_token)))
    }

    /// GET /marketdata/v1/quotes — returns the HTTP status code only.
    #[instrument(skip(self), name = "schwab::get_quote")]
    pub async fn get_quote(&self, symbol: &str) -> Result<u16, SchwabError> {
        let url = format!("{}/marketdata/v1/quotes", self.base_url);
        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&[("symbols", symbol)])
            .send()
            .await?;

        let status = resp.status().as_u16();
        debug!(symbol, status, "quote probe finished");
        Ok(status)
    }

    /// GET /marketdata/v1/pricehistory for `timeframe`, oldest candle first.
    #[instrument(skip(self), name = "schwab::get_price_history")]
    pub async fn get_price_history(
        &self,
        symbol: &str,
        timeframe: Timeframe,
    ) -> Result<Vec<Candle>, SchwabError> {
        let window = timeframe.history_window();
        let url = format!("{}/marketdata/v1/pricehistory", self.base_url);
        let params = [
            ("symbol", symbol.to_string()),
            ("periodType", window.period_type.to_string()),
            ("period", window.period.to_string()),
            ("frequencyType", window.frequency_type.to_string()),
            ("frequency", window.frequency.to_string()),
        ];

        let resp = self
            .http
            .get(&url)
            .bearer_auth(&self.access_token)
            .query(&params)
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;

        if !status.is_success() {
            return Err(SchwabError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        let history: PriceHistory =
            serde_json::from_str(&body).map_err(|e| SchwabError::Decode(e.to_string()))?;
        let candles: Vec<Candle> = history.candles.into_iter().map(Candle::from).collect();

        debug!(symbol, %timeframe, count = candles.len(), "price history fetched");
        Ok(candles)
    }
}

fn read_access_token(path: &Path) -> Result<String, SchwabError> {
    let token_err = |reason: String| SchwabError::Token {
        path: path.to_path_buf(),
        reason,
    };

    let content = std::fs::read_to_string(path).map_err(|e| token_err(e.to_string()))?;
    let file: TokenFile = serde_json::from_str(&content).map_err(|e| token_err(e.to_string()))?;

    if file.token.access_token.is_empty() {
        return Err(token_err("access_token is empty".to_string()));
    }
    Ok(file.token.access_token)
}

impl std::fmt::Debug for SchwabClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchwabClient")
            .field("base_url", &self.base_url)
            .field("access_token", &"<redacted>")
            .finish()
    }
}
