// =============================================================================
// Average True Range (ATR) — trailing simple mean
// =============================================================================
//
// ATR measures market volatility by decomposing the entire range of a bar.
//
// True Range (TR) for each bar:
//   TR = max(H - L, |H - prevClose|, |L - prevClose|)
//
// ATR is the arithmetic mean of the LAST `period` TR values.  Older TR values
// are ignored entirely, so the result only reflects the most recent window of
// the sequence as given.
//
// Default period: 14
// =============================================================================

use crate::market_data::Candle;

/// Standard look-back used by the breakout pipeline.
pub const DEFAULT_ATR_PERIOD: usize = 14;

/// True Range of `cur` relative to the previous bar's close.
pub fn true_range(prev: &Candle, cur: &Candle) -> f64 {
    let hl = cur.high - cur.low;
    let hc = (cur.high - prev.close).abs();
    let lc = (cur.low - prev.close).abs();
    hl.max(hc).max(lc)
}

/// Compute the ATR over the trailing `period` true ranges.
///
/// # Arguments
/// - `candles` — slice of OHLCV candles (oldest first).
/// - `period`  — number of trailing TR values to average.
///
/// # Returns
/// `None` when:
/// - `period` is zero.
/// - There are fewer than `period + 1` candles (we need `period` TR values,
///   each requiring a previous candle).
pub fn calculate_atr(candles: &[Candle], period: usize) -> Option<f64> {
    if period == 0 || candles.len() < period + 1 {
        return None;
    }

    let window = &candles[candles.len() - period - 1..];
    let sum: f64 = window
        .windows(2)
        .map(|pair| true_range(&pair[0], &pair[1]))
        .sum();

    Some(sum / period as f64)
}
