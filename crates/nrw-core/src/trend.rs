//! Trend classification between consecutive readings

use crate::types::Trend;

/// Changes within this many percentage points count as stable
pub const TREND_DEADBAND_PCT: f64 = 1.0;

/// Classify the move from `previous_pct` to `current_pct`
///
/// Callers without a previous reading pass `current_pct` twice.
pub fn classify_trend(current_pct: f64, previous_pct: f64) -> Trend {
    if current_pct > previous_pct + TREND_DEADBAND_PCT {
        Trend::Up
    } else if current_pct < previous_pct - TREND_DEADBAND_PCT {
        Trend::Down
    } else {
        Trend::Stable
    }
}
