//! Balance-driven trend label.
//!
//! A fixed threshold heuristic, not a model: a balance of at least one
//! native unit reads as `Bullish`, anything less as `Bearish`. Confidence
//! values are constants.

use serde::Serialize;

use crate::blockchain::balance::DisplayBalance;

/// Whole native units at or above which the trend is bullish.
pub const BULLISH_THRESHOLD_UNITS: u64 = 1;
pub const BULLISH_CONFIDENCE: f64 = 0.82;
pub const BEARISH_CONFIDENCE: f64 = 0.76;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Trend {
    Bullish,
    Bearish,
}

impl std::fmt::Display for Trend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Trend::Bullish => f.write_str("Bullish"),
            Trend::Bearish => f.write_str("Bearish"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Prediction {
    pub trend: Trend,
    /// In `[0, 1]`.
    pub confidence: f64,
}

impl Prediction {
    /// Confidence as a percentage string, e.g. `"82.00%"`.
    pub fn confidence_percent(&self) -> String {
        format!("{:.2}%", self.confidence * 100.0)
    }
}

pub fn predict(balance: &DisplayBalance) -> Prediction {
    if balance.is_at_least_units(BULLISH_THRESHOLD_UNITS) {
        Prediction {
            trend: Trend::Bullish,
            confidence: BULLISH_CONFIDENCE,
        }
    } else {
        Prediction {
            trend: Trend::Bearish,
            confidence: BEARISH_CONFIDENCE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ethers::types::U256;

    fn predict_raw(raw: U256) -> Prediction {
        predict(&DisplayBalance::from_raw(raw))
    }

    #[test]
    fn half_a_unit_is_bearish() {
        let p = predict_raw(U256::from(500_000_000_000_000_000u64));
        assert_eq!(p.trend, Trend::Bearish);
        assert_eq!(p.confidence_percent(), "76.00%");
    }

    #[test]
    fn threshold_is_inclusive() {
        let p = predict_raw(U256::exp10(18));
        assert_eq!(p.trend, Trend::Bullish);
        assert_eq!(p.confidence_percent(), "82.00%");
    }

    #[test]
    fn one_wei_below_threshold_is_bearish() {
        assert_eq!(predict_raw(U256::exp10(18) - U256::one()).trend, Trend::Bearish);
        assert_eq!(predict_raw(U256::zero()).trend, Trend::Bearish);
    }

    #[test]
    fn trend_serializes_by_name() {
        assert_eq!(serde_json::to_string(&Trend::Bullish).unwrap(), "\"Bullish\"");
        assert_eq!(Trend::Bearish.to_string(), "Bearish");
    }
}
