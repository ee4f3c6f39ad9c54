// =============================================================================
// Trade Ticket — breakout-of-structure classification
// =============================================================================
//
// Turns (last close, support, resistance, ATR) into exactly one of:
//   WAIT         — levels/ATR missing, or price inside the structure range
//   BULLISH_BOS  — close above resistance  -> sell a put spread
//   BEARISH_BOS  — close below support     -> sell a call spread
//
// Rules are evaluated in that order; the first match wins.  Breakouts use
// strict inequality, so a close exactly on a level is still inside the range.
//
// Strike placement:
//   short_strike = round(broken level)            (half-to-even)
//   long_strike  = short_strike -/+ width         (put / call side)
//   stop_level   = short_strike -/+ ATR, 2 dp     (half-to-even)
// =============================================================================

use serde::{Serialize, Serializer};

/// Default distance between the short and long strikes.
pub const DEFAULT_SPREAD_WIDTH: f64 = 5.0;

/// Which credit spread to open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SpreadAction {
    SellPutSpread,
    SellCallSpread,
}

/// Why no trade is recommended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WaitReason {
    InsufficientData,
    InsideRange,
}

impl std::fmt::Display for WaitReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientData => write!(f, "Not enough data for levels/ATR yet."),
            Self::InsideRange => write!(f, "Price is inside the structure range."),
        }
    }
}

impl Serialize for WaitReason {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// The recommendation produced for a single analysis run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode")]
pub enum TradeTicket {
    #[serde(rename = "WAIT")]
    Wait { reason: WaitReason },

    #[serde(rename = "BULLISH_BOS")]
    BullishBos {
        action: SpreadAction,
        short_strike: f64,
        long_strike: f64,
        stop_level: f64,
    },

    #[serde(rename = "BEARISH_BOS")]
    BearishBos {
        action: SpreadAction,
        short_strike: f64,
        long_strike: f64,
        stop_level: f64,
    },
}

impl TradeTicket {
    pub fn mode(&self) -> &'static str {
        match self {
            Self::Wait { .. } => "WAIT",
            Self::BullishBos { .. } => "BULLISH_BOS",
            Self::BearishBos { .. } => "BEARISH_BOS",
        }
    }
}

/// Round to the nearest integer strike; exact halves go to the even integer.
pub fn round_half_even(x: f64) -> f64 {
    x.round_ties_even()
}

/// Round to two decimal places with the same half-to-even policy.
pub fn round_to_cents(x: f64) -> f64 {
    (x * 100.0).round_ties_even() / 100.0
}

/// Classify the latest close against the structure and size the spread.
pub fn build_ticket(
    last_close: f64,
    support: Option<f64>,
    resistance: Option<f64>,
    atr: Option<f64>,
    width: f64,
) -> TradeTicket {
    let (Some(support), Some(resistance), Some(atr)) = (support, resistance, atr) else {
        return TradeTicket::Wait {
            reason: WaitReason::InsufficientData,
        };
    };

    if last_close > resistance {
        let short_strike = round_half_even(resistance);
        return TradeTicket::BullishBos {
            action: SpreadAction::SellPutSpread,
            short_strike,
            long_strike: short_strike - width,
            stop_level: round_to_cents(short_strike - atr),
        };
    }

    if last_close < support {
        let short_strike = round_half_even(support);
        return TradeTicket::BearishBos {
            action: SpreadAction::SellCallSpread,
            short_strike,
            long_strike: short_strike + width,
            stop_level: round_to_cents(short_strike + atr),
        };
    }

    TradeTicket::Wait {
        reason: WaitReason::InsideRange,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SUP: Option<f64> = Some(4180.0);
    const RES: Option<f64> = Some(4220.0);
    const ATR: Option<f64> = Some(15.0);

    #[test]
    fn bullish_breakout_sells_put_spread() {
        let ticket = build_ticket(4230.0, SUP, RES, ATR, DEFAULT_SPREAD_WIDTH);
        assert_eq!(
            ticket,
            TradeTicket::BullishBos {
                action: SpreadAction::SellPutSpread,
                short_strike: 4220.0,
                long_strike: 4215.0,
                stop_level: 4205.0,
            }
        );
    }

    #[test]
    fn bearish_breakout_sells_call_spread() {
        let ticket = build_ticket(4170.0, SUP, RES, ATR, DEFAULT_SPREAD_WIDTH);
        assert_eq!(
            ticket,
            TradeTicket::BearishBos {
                action: SpreadAction::SellCallSpread,
                short_strike: 4180.0,
                long_strike: 4185.0,
                stop_level: 4195.0,
            }
        );
    }

    #[test]
    fn inside_range_waits() {
        let ticket = build_ticket(4200.0, SUP, RES, ATR, DEFAULT_SPREAD_WIDTH);
        match ticket {
            TradeTicket::Wait { reason } => {
                assert_eq!(reason, WaitReason::InsideRange);
                assert!(reason.to_string().contains("inside the structure range"));
            }
            other => panic!("expected WAIT, got {other:?}"),
        }
    }

    #[test]
    fn close_on_a_level_is_inside_range() {
        for close in [4180.0, 4220.0] {
            let ticket = build_ticket(close, SUP, RES, ATR, DEFAULT_SPREAD_WIDTH);
            assert_eq!(
                ticket,
                TradeTicket::Wait {
                    reason: WaitReason::InsideRange
                }
            );
        }
    }

    #[test]
    fn missing_input_always_waits_for_data() {
        let insufficient = TradeTicket::Wait {
            reason: WaitReason::InsufficientData,
        };
        // Would be a bullish breakout if ATR were known.
        assert_eq!(build_ticket(5000.0, SUP, RES, None, 5.0), insufficient);
        assert_eq!(build_ticket(5000.0, None, RES, ATR, 5.0), insufficient);
        assert_eq!(build_ticket(1000.0, SUP, None, ATR, 5.0), insufficient);
        assert_eq!(build_ticket(1000.0, None, None, None, 5.0), insufficient);
    }

    #[test]
    fn every_input_combination_yields_one_ticket() {
        let opts = [None, Some(100.0)];
        for sup in opts {
            for res in [None, Some(110.0)] {
                for atr in [None, Some(2.0)] {
                    for close in [90.0, 105.0, 120.0] {
                        let mode = build_ticket(close, sup, res, atr, 5.0).mode();
                        assert!(["WAIT", "BULLISH_BOS", "BEARISH_BOS"].contains(&mode));
                        if sup.is_none() || res.is_none() || atr.is_none() {
                            assert_eq!(mode, "WAIT");
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn strikes_round_half_to_even() {
        assert_eq!(round_half_even(4220.5), 4220.0);
        assert_eq!(round_half_even(4221.5), 4222.0);
        assert_eq!(round_half_even(4220.4), 4220.0);
        assert_eq!(round_half_even(4220.6), 4221.0);

        let ticket = build_ticket(4230.0, SUP, Some(4221.5), ATR, 5.0);
        match ticket {
            TradeTicket::BullishBos { short_strike, long_strike, .. } => {
                assert_eq!(short_strike, 4222.0);
                assert_eq!(long_strike, 4217.0);
            }
            other => panic!("expected BULLISH_BOS, got {other:?}"),
        }
    }

    #[test]
    fn stop_level_rounds_to_cents() {
        assert_eq!(round_to_cents(4205.126), 4205.13);
        assert_eq!(round_to_cents(4205.124), 4205.12);
        // 0.125 and 0.375 are exact in binary, so the tie is real.
        assert_eq!(round_to_cents(0.125), 0.12);
        assert_eq!(round_to_cents(0.375), 0.38);

        let ticket = build_ticket(4170.0, SUP, RES, Some(12.3456), 5.0);
        match ticket {
            TradeTicket::BearishBos { stop_level, .. } => assert_eq!(stop_level, 4192.35),
            other => panic!("expected BEARISH_BOS, got {other:?}"),
        }
    }

    #[test]
    fn custom_width_is_applied() {
        match build_ticket(4230.0, SUP, RES, ATR, 10.0) {
            TradeTicket::BullishBos { long_strike, .. } => assert_eq!(long_strike, 4210.0),
            other => panic!("expected BULLISH_BOS, got {other:?}"),
        }
    }

    #[test]
    fn serialises_with_mode_tag() {
        let bull = build_ticket(4230.0, SUP, RES, ATR, 5.0);
        let json = serde_json::to_value(&bull).unwrap();
        assert_eq!(json["mode"], "BULLISH_BOS");
        assert_eq!(json["action"], "SELL_PUT_SPREAD");
        assert_eq!(json["short_strike"], 4220.0);
        assert_eq!(json["stop_level"], 4205.0);

        let wait = build_ticket(4200.0, SUP, RES, ATR, 5.0);
        let json = serde_json::to_value(&wait).unwrap();
        assert_eq!(json["mode"], "WAIT");
        assert_eq!(json["reason"], "Price is inside the structure range.");
    }
}
