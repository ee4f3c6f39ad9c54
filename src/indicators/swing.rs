// =============================================================================
// Swing Structure — most recent swing high / swing low
// =============================================================================
//
// A bar is a swing high when its high is STRICTLY above both neighbours'
// highs, and a swing low when its low is STRICTLY below both neighbours'
// lows.  Flat tops and bottoms never register, and the first and last bars
// can never be swings because they lack a neighbour on one side.
//
// Only the latest swing of each kind is kept:
//   resistance = most recent swing high
//   support    = most recent swing low
// =============================================================================

use serde::Serialize;

use crate::market_data::Candle;

/// Latest structural levels found in a candle sequence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SwingLevels {
    pub support: Option<f64>,
    pub resistance: Option<f64>,
}

/// Scan interior candles oldest -> newest and return the last swing low and
/// swing high.
pub fn swing_levels(candles: &[Candle]) -> SwingLevels {
    let mut levels = SwingLevels::default();

    for w in candles.windows(3) {
        let (prev, cur, next) = (&w[0], &w[1], &w[2]);

        if cur.high > prev.high && cur.high > next.high {
            levels.resistance = Some(cur.high);
        }
        if cur.low < prev.low && cur.low < next.low {
            levels.support = Some(cur.low);
        }
    }

    levels
}
