// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicators used by the breakout strategy.  Public
// functions return `Option<T>` so callers are forced to handle the
// insufficient-data case instead of receiving a sentinel zero.

pub mod atr;
pub mod swing;
