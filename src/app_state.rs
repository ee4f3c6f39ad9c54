// =============================================================================
// Central Application State — ProTrade API
// =============================================================================
//
// Shared by every handler through `Arc<AppState>`.  Nothing in here is
// mutated after startup: the analysis pipeline is pure and the Schwab client
// is rebuilt from disk/env per request, so no locks are needed.
// =============================================================================

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::runtime_config::RuntimeConfig;
use crate::schwab::{SchwabClient, SchwabError};

/// Source of credential values, normally the process environment.
pub type EnvLookup = Arc<dyn Fn(&str) -> Option<String> + Send + Sync>;

/// Central application state shared across all handlers via `Arc<AppState>`.
pub struct AppState {
    pub runtime_config: RuntimeConfig,

    /// Pooled HTTP client reused by every per-request `SchwabClient`.
    http: reqwest::Client,

    env: EnvLookup,

    /// Instant when the server was started. Used for uptime reporting.
    pub start_time: std::time::Instant,
}

impl AppState {
    /// Construct state that reads credentials from the process environment.
    pub fn new(config: RuntimeConfig) -> Result<Self> {
        Self::with_env(config, Arc::new(|key: &str| std::env::var(key).ok()))
    }

    pub fn with_env(config: RuntimeConfig, env: EnvLookup) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .context("failed to build reqwest client")?;

        Ok(Self {
            runtime_config: config,
            http,
            env,
            start_time: std::time::Instant::now(),
        })
    }

    /// Load a Schwab client with the current token file and credentials.
    ///
    /// `Ok(None)` means credentials are not available yet.
    pub fn schwab_client(&self) -> Result<Option<SchwabClient>, SchwabError> {
        SchwabClient::load(self.http.clone(), &self.runtime_config.schwab, |key: &str| {
            (self.env)(key)
        })
    }
}
