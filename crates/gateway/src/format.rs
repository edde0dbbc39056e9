use alloy_primitives::{
    utils::{format_units, UnitsError},
    U256,
};

/// Scale a raw base-unit amount by `decimals` for display.
///
/// Trailing fractional zeros are dropped, so one whole token reads `"1"`.
pub fn format_amount(raw: U256, decimals: u8) -> Result<String, UnitsError> {
    let formatted = format_units(raw, decimals)?;

    let Some((whole, fraction)) = formatted.split_once('.') else {
        return Ok(formatted);
    };
    let fraction = fraction.trim_end_matches('0');
    if fraction.is_empty() {
        Ok(whole.to_string())
    } else {
        Ok(format!("{whole}.{fraction}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WAD: u64 = 1_000_000_000_000_000_000;

    #[test]
    fn test_one_token() {
        assert_eq!(format_amount(U256::from(WAD), 18).unwrap(), "1");
    }

    #[test]
    fn test_fractional() {
        assert_eq!(format_amount(U256::from(WAD + WAD / 2), 18).unwrap(), "1.5");
        assert_eq!(format_amount(U256::from(1u64), 18).unwrap(), "0.000000000000000001");
    }

    #[test]
    fn test_zero() {
        assert_eq!(format_amount(U256::ZERO, 18).unwrap(), "0");
    }

    #[test]
    fn test_large_balance() {
        let raw = U256::from(WAD) * U256::from(1_234_567u64);
        assert_eq!(format_amount(raw, 18).unwrap(), "1234567");
    }

    #[test]
    fn test_six_decimals() {
        assert_eq!(format_amount(U256::from(2_500_000u64), 6).unwrap(), "2.5");
    }
}
