// src/blockchain/balance.rs

use std::fmt;

use ethers::types::{Address, U256};
use serde::{Serialize, Serializer};

use crate::blockchain::{connector::ChainConnector, context::CallContext, error::ChainResult};

/// Decimal places between wei and the display unit.
pub const NATIVE_DECIMALS: usize = 18;

fn one_unit() -> U256 {
    U256::exp10(NATIVE_DECIMALS)
}

/// A wei balance viewed in whole native units.
///
/// Conversion is exact fixed-point arithmetic on the raw integer: the
/// integer part is `raw / 10^18` and the fraction is `raw % 10^18`, rendered
/// with trailing zeros trimmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct DisplayBalance {
    raw: U256,
}

impl DisplayBalance {
    pub fn from_raw(raw: U256) -> Self {
        Self { raw }
    }

    pub fn raw(&self) -> U256 {
        self.raw
    }

    pub fn whole_units(&self) -> U256 {
        self.raw / one_unit()
    }

    /// The sub-unit remainder, in wei.
    pub fn fractional_wei(&self) -> U256 {
        self.raw % one_unit()
    }

    /// Exact comparison against a whole number of units.
    pub fn is_at_least_units(&self, units: u64) -> bool {
        self.raw >= U256::from(units).saturating_mul(one_unit())
    }
}

impl fmt::Display for DisplayBalance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.whole_units();
        let fraction = self.fractional_wei();
        if fraction.is_zero() {
            return write!(f, "{}", whole);
        }
        let digits = format!("{:0>width$}", fraction.to_string(), width = NATIVE_DECIMALS);
        write!(f, "{}.{}", whole, digits.trim_end_matches('0'))
    }
}

impl Serialize for DisplayBalance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Fetch the latest balance of `address` and convert it for display.
pub async fn report(
    ctx: &CallContext,
    connector: &ChainConnector,
    address: Address,
) -> ChainResult<DisplayBalance> {
    let raw = connector.get_balance(ctx, address).await?;
    Ok(DisplayBalance::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shown(raw: U256) -> String {
        DisplayBalance::from_raw(raw).to_string()
    }

    #[test]
    fn zero_is_zero() {
        assert_eq!(shown(U256::zero()), "0");
    }

    #[test]
    fn reference_balance_renders_exactly() {
        assert_eq!(shown(U256::from(2_370_000_000_000_000_000u64)), "2.37");
        assert_eq!(shown(U256::from(500_000_000_000_000_000u64)), "0.5");
        assert_eq!(shown(U256::exp10(18)), "1");
    }

    #[test]
    fn smallest_unit_keeps_all_places() {
        assert_eq!(shown(U256::one()), "0.000000000000000001");
        assert_eq!(shown(U256::exp10(18) - U256::one()), "0.999999999999999999");
    }

    #[test]
    fn large_balances_keep_the_integer_part_exact() {
        // 123456789012345678901234567.000000000000000042
        let raw = U256::from_dec_str("123456789012345678901234567000000000000000042").unwrap();
        assert_eq!(shown(raw), "123456789012345678901234567.000000000000000042");
        assert_eq!(
            DisplayBalance::from_raw(U256::MAX).whole_units(),
            U256::MAX / U256::exp10(18)
        );
    }

    #[test]
    fn threshold_comparison_is_inclusive_and_exact() {
        let one = DisplayBalance::from_raw(U256::exp10(18));
        let just_below = DisplayBalance::from_raw(U256::exp10(18) - U256::one());
        assert!(one.is_at_least_units(1));
        assert!(!just_below.is_at_least_units(1));
        assert!(DisplayBalance::from_raw(U256::MAX).is_at_least_units(u64::MAX));
    }

    #[test]
    fn serializes_as_decimal_string() {
        let balance = DisplayBalance::from_raw(U256::from(2_370_000_000_000_000_000u64));
        assert_eq!(serde_json::to_string(&balance).unwrap(), "\"2.37\"");
    }
}
