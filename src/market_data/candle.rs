// =============================================================================
// Candle — normalized OHLCV bar handed to the analysis pipeline
// =============================================================================
//
// The market-data adapter converts vendor rows into this shape before any
// indicator sees them.  Candles are supplied oldest first; nothing downstream
// re-sorts them.
//
// `timestamp` is opaque to the core: vendors send either epoch milliseconds
// or ISO-8601 strings and we carry whichever we got straight through to the
// JSON output.
// =============================================================================

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Ordering key of a bar, exactly as the vendor delivered it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    EpochMillis(i64),
    Iso(String),
}

impl From<i64> for Timestamp {
    fn from(ms: i64) -> Self {
        Self::EpochMillis(ms)
    }
}

impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EpochMillis(ms) => write!(f, "{ms}"),
            Self::Iso(s) => f.write_str(s),
        }
    }
}

/// A single OHLCV price bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: Timestamp,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(default)]
    pub volume: f64,
}

/// Reasons a candle sequence cannot be analysed.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CandleError {
    #[error("no candles to analyse")]
    Empty,

    #[error("malformed candle at index {index}: {reason}")]
    Malformed { index: usize, reason: String },
}

impl Candle {
    pub fn new(
        timestamp: impl Into<Timestamp>,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: f64,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// Check the OHLC invariants (`low <= open, close <= high`), finiteness,
    /// and a non-negative volume.
    ///
    /// Returns the violated rule as a message; callers attach the index.
    pub fn validate(&self) -> Result<(), String> {
        let fields = [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
            ("volume", self.volume),
        ];
        if let Some((name, value)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return Err(format!("{name} is not finite ({value})"));
        }
        if self.low > self.high {
            return Err(format!("low {} above high {}", self.low, self.high));
        }
        if self.open < self.low || self.open > self.high {
            return Err(format!(
                "open {} outside [{}, {}]",
                self.open, self.low, self.high
            ));
        }
        if self.close < self.low || self.close > self.high {
            return Err(format!(
                "close {} outside [{}, {}]",
                self.close, self.low, self.high
            ));
        }
        if self.volume < 0.0 {
            return Err(format!("negative volume {}", self.volume));
        }
        Ok(())
    }
}

/// Validate every candle in order, failing on the first bad one.
pub fn validate_series(candles: &[Candle]) -> Result<(), CandleError> {
    for (index, candle) in candles.iter().enumerate() {
        candle
            .validate()
            .map_err(|reason| CandleError::Malformed { index, reason })?;
    }
    Ok(())
}

/// Keep only the most recent `limit` candles.
pub fn tail(candles: &[Candle], limit: usize) -> &[Candle] {
    let start = candles.len().saturating_sub(limit);
    &candles[start..]
}
