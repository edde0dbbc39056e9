//! Approval amounts entered on the command line.

use alloy_primitives::{
    utils::{parse_units, ParseUnits},
    U256,
};

/// Parse `amount` as base units, or as a decimal token quantity scaled by
/// `decimals` when `decimal` is set. Negative amounts are rejected.
pub fn parse_amount(amount: &str, decimal: bool, decimals: u8) -> eyre::Result<U256> {
    let amount = amount.trim();
    if amount.starts_with('-') {
        eyre::bail!("Amount must not be negative: {}", amount);
    }

    if !decimal {
        return amount
            .parse::<U256>()
            .map_err(|e| eyre::eyre!("Invalid amount {}: {}", amount, e));
    }

    match parse_units(amount, decimals)? {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => eyre::bail!("Amount must not be negative: {}", amount),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ONE_TOKEN: u64 = 1_000_000_000_000_000_000;

    #[test]
    fn test_base_units() {
        assert_eq!(parse_amount("1000", false, 18).unwrap(), U256::from(1000));
    }

    #[test]
    fn test_decimal_amount_is_scaled() {
        assert_eq!(parse_amount("1", true, 18).unwrap(), U256::from(ONE_TOKEN));
        assert_eq!(
            parse_amount("1.5", true, 18).unwrap(),
            U256::from(ONE_TOKEN + ONE_TOKEN / 2)
        );
        assert_eq!(parse_amount("2.5", true, 6).unwrap(), U256::from(2_500_000));
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert!(parse_amount("-1", true, 18).is_err());
        assert!(parse_amount("-1", false, 18).is_err());
        assert!(parse_amount(" -0.5", true, 18).is_err());
    }

    #[test]
    fn test_overflow_rejected() {
        let too_large = format!("1{}", "0".repeat(78));
        assert!(parse_amount(&too_large, false, 18).is_err());
        assert!(parse_amount(&format!("1{}", "0".repeat(60)), true, 18).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_amount("ten", false, 18).is_err());
        assert!(parse_amount("1.2.3", true, 18).is_err());
    }
}
