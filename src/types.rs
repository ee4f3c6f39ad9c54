// =============================================================================
// Shared types used across the ProTrade API
// =============================================================================

use serde::{Deserialize, Serialize};

/// Candle resolution the API accepts.  Anything else is rejected at the edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Timeframe {
    #[serde(rename = "30m")]
    ThirtyMinute,
    #[serde(rename = "1d")]
    Daily,
}

impl Default for Timeframe {
    fn default() -> Self {
        Self::ThirtyMinute
    }
}

impl std::fmt::Display for Timeframe {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ThirtyMinute => write!(f, "30m"),
            Self::Daily => write!(f, "1d"),
        }
    }
}

/// Error returned when a timeframe string is not one of the supported values.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("tf must be '30m' or '1d'")]
pub struct UnsupportedTimeframe;

impl std::str::FromStr for Timeframe {
    type Err = UnsupportedTimeframe;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "30m" => Ok(Self::ThirtyMinute),
            "1d" => Ok(Self::Daily),
            _ => Err(UnsupportedTimeframe),
        }
    }
}

/// Price-history window requested from the vendor for a timeframe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HistoryWindow {
    pub period_type: &'static str,
    pub period: u32,
    pub frequency_type: &'static str,
    pub frequency: u32,
}

impl Timeframe {
    /// 30m bars cover the last 10 days; daily bars the last 3 months.
    pub fn history_window(self) -> HistoryWindow {
        match self {
            Self::ThirtyMinute => HistoryWindow {
                period_type: "day",
                period: 10,
                frequency_type: "minute",
                frequency: 30,
            },
            Self::Daily => HistoryWindow {
                period_type: "month",
                period: 3,
                frequency_type: "daily",
                frequency: 1,
            },
        }
    }
}
