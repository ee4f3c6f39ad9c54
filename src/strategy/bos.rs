// =============================================================================
// Break-of-Structure Signal — candles -> {ATR, levels} -> ticket
// =============================================================================
//
// Pipeline:
//   1. Validate the candle sequence (fail fast on a malformed bar)
//   2. ATR over the trailing `atr_period` true ranges
//   3. Latest swing high / swing low
//   4. Classify the last close into a TradeTicket
//
// Too few candles is not an error: ATR or a level comes back `None` and the
// ticket degrades to WAIT.  Only an empty or malformed sequence is rejected.
// =============================================================================

use serde::Serialize;
use tracing::debug;

use crate::indicators::atr::calculate_atr;
use crate::indicators::swing::swing_levels;
use crate::market_data::{validate_series, Candle, CandleError};
use crate::runtime_config::StrategyParams;
use crate::strategy::ticket::{build_ticket, TradeTicket};
use crate::types::Timeframe;

/// Everything that went into a ticket, plus the ticket itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BosReport {
    pub symbol: String,
    pub timeframe: Timeframe,
    pub last_close: f64,
    pub atr: Option<f64>,
    pub support: Option<f64>,
    pub resistance: Option<f64>,
    pub ticket: TradeTicket,
}

/// Run the full signal pipeline over `candles` (oldest first).
pub fn analyze(
    symbol: &str,
    timeframe: Timeframe,
    candles: &[Candle],
    params: &StrategyParams,
) -> Result<BosReport, CandleError> {
    validate_series(candles)?;
    let last_close = candles.last().ok_or(CandleError::Empty)?.close;

    let atr = calculate_atr(candles, params.atr_period);
    let levels = swing_levels(candles);
    let ticket = build_ticket(
        last_close,
        levels.support,
        levels.resistance,
        atr,
        params.spread_width,
    );

    debug!(
        symbol,
        %timeframe,
        candles = candles.len(),
        last_close,
        ?atr,
        support = ?levels.support,
        resistance = ?levels.resistance,
        mode = ticket.mode(),
        "BOS analysis complete"
    );

    Ok(BosReport {
        symbol: symbol.to_string(),
        timeframe,
        last_close,
        atr,
        support: levels.support,
        resistance: levels.resistance,
        ticket,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::ticket::{SpreadAction, WaitReason};

    fn bar(high: f64, low: f64, close: f64) -> Candle {
        Candle::new(0, close, high, low, close, 1_000.0)
    }

    /// 16 bars ranging between 96 and 104 with a swing high at 106
    /// and a swing low at 94, followed by `last`.
    fn ranging_then(last: Candle) -> Vec<Candle> {
        let mut candles = Vec::new();
        for i in 0..16 {
            let c = match i {
                5 => bar(106.0, 99.0, 104.0),
                9 => bar(101.0, 94.0, 96.0),
                _ => bar(104.0, 96.0, 100.0),
            };
            candles.push(c);
        }
        candles.push(last);
        candles
    }

    #[test]
    fn empty_sequence_is_rejected() {
        let err = analyze("SPY", Timeframe::Daily, &[], &StrategyParams::default()).unwrap_err();
        assert_eq!(err, CandleError::Empty);
    }

    #[test]
    fn malformed_candle_fails_fast() {
        let mut candles = ranging_then(bar(104.0, 96.0, 100.0));
        candles[3] = Candle::new(0, 100.0, 90.0, 110.0, 100.0, 0.0);
        match analyze("SPY", Timeframe::Daily, &candles, &StrategyParams::default()) {
            Err(CandleError::Malformed { index, .. }) => assert_eq!(index, 3),
            other => panic!("expected malformed candle error, got {other:?}"),
        }
    }

    #[test]
    fn short_history_waits_for_data() {
        let candles = vec![
            bar(104.0, 96.0, 100.0),
            bar(106.0, 94.0, 100.0),
            bar(104.0, 96.0, 100.0),
        ];
        let report = analyze("SPY", Timeframe::ThirtyMinute, &candles, &StrategyParams::default())
            .unwrap();
        assert_eq!(report.atr, None);
        assert_eq!(report.resistance, Some(106.0));
        assert_eq!(
            report.ticket,
            TradeTicket::Wait {
                reason: WaitReason::InsufficientData
            }
        );
    }

    #[test]
    fn single_candle_has_no_levels() {
        let candles = vec![bar(104.0, 96.0, 100.0)];
        let report = analyze("SPY", Timeframe::Daily, &candles, &StrategyParams::default()).unwrap();
        assert_eq!(report.last_close, 100.0);
        assert_eq!((report.support, report.resistance, report.atr), (None, None, None));
    }

    #[test]
    fn breakout_above_swing_high() {
        let candles = ranging_then(bar(110.0, 103.0, 109.0));
        let report = analyze("SPY", Timeframe::Daily, &candles, &StrategyParams::default()).unwrap();
        assert_eq!(report.resistance, Some(106.0));
        assert_eq!(report.support, Some(94.0));
        let atr = report.atr.expect("17 candles is enough for ATR(14)");
        match report.ticket {
            TradeTicket::BullishBos {
                action,
                short_strike,
                long_strike,
                stop_level,
            } => {
                assert_eq!(action, SpreadAction::SellPutSpread);
                assert_eq!(short_strike, 106.0);
                assert_eq!(long_strike, 101.0);
                assert!((stop_level - (106.0 - atr)).abs() < 0.006);
            }
            other => panic!("expected BULLISH_BOS, got {other:?}"),
        }
    }

    #[test]
    fn breakdown_below_swing_low() {
        let candles = ranging_then(bar(97.0, 90.0, 91.0));
        let report = analyze("QQQ", Timeframe::ThirtyMinute, &candles, &StrategyParams::default())
            .unwrap();
        assert!(matches!(
            report.ticket,
            TradeTicket::BearishBos { short_strike, long_strike, .. }
                if short_strike == 94.0 && long_strike == 99.0
        ));
    }

    #[test]
    fn inside_range_waits() {
        let candles = ranging_then(bar(104.0, 96.0, 100.0));
        let report = analyze("SPY", Timeframe::Daily, &candles, &StrategyParams::default()).unwrap();
        assert_eq!(
            report.ticket,
            TradeTicket::Wait {
                reason: WaitReason::InsideRange
            }
        );
    }

    #[test]
    fn report_serialises_inputs_and_ticket() {
        let candles = vec![bar(104.0, 96.0, 100.0)];
        let report = analyze("SPY", Timeframe::ThirtyMinute, &candles, &StrategyParams::default())
            .unwrap();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["symbol"], "SPY");
        assert_eq!(json["timeframe"], "30m");
        assert_eq!(json["last_close"], 100.0);
        assert!(json["atr"].is_null());
        assert!(json["support"].is_null());
        assert_eq!(json["ticket"]["mode"], "WAIT");
    }
}
