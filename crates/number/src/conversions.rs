use {
    crate::{
        u256_ext::U256Ext,
        wad::{WAD, WAD_DECIMALS},
    },
    alloy::primitives::U256,
    bigdecimal::{BigDecimal, RoundingMode, num_bigint::ToBigInt},
};

pub fn u256_to_big_decimal(value: &U256) -> BigDecimal {
    BigDecimal::from(value.to_big_int())
}

/// Interprets a WAD as the decimal number it represents, e.g. `0.65e18`
/// becomes `0.65`. The conversion is exact.
pub fn wad_to_big_decimal(value: &U256) -> BigDecimal {
    BigDecimal::new(value.to_big_int(), i64::from(WAD_DECIMALS))
}

/// Converts an integral decimal to [`U256`]. Returns `None` for fractional,
/// negative or too large values.
pub fn big_decimal_to_u256(value: &BigDecimal) -> Option<U256> {
    if !value.is_integer() {
        return None;
    }
    U256::from_big_int(&value.to_bigint()?).ok()
}

/// Scales a decimal number by 1e18 and rounds it down to the next WAD unit.
/// Returns `None` for negative or too large values.
pub fn big_decimal_to_wad_floor(value: &BigDecimal) -> Option<U256> {
    let scaled = (value * u256_to_big_decimal(&WAD)).with_scale_round(0, RoundingMode::Floor);
    big_decimal_to_u256(&scaled)
}

#[cfg(test)]
mod tests {
    use {super::*, num::Zero, std::str::FromStr};

    #[test]
    fn u256_to_big_decimal_() {
        assert_eq!(u256_to_big_decimal(&U256::ZERO), BigDecimal::zero());
        assert_eq!(
            u256_to_big_decimal(&U256::MAX),
            BigDecimal::from_str(
                "115792089237316195423570985008687907853269984665640564039457584007913129639935"
            )
            .unwrap()
        );
    }

    #[test]
    fn wad_to_big_decimal_() {
        assert_eq!(
            wad_to_big_decimal(&U256::from(650_000_000_000_000_000_u64)),
            BigDecimal::from_str("0.65").unwrap()
        );
        assert_eq!(wad_to_big_decimal(&WAD), BigDecimal::from(1));
    }

    #[test]
    fn big_decimal_to_u256_() {
        assert_eq!(big_decimal_to_u256(&BigDecimal::from(7)), Some(U256::from(7)));
        assert!(big_decimal_to_u256(&BigDecimal::from(-1)).is_none());
        assert!(big_decimal_to_u256(&BigDecimal::from_str("0.5").unwrap()).is_none());
    }

    #[test]
    fn big_decimal_to_wad_floor_() {
        let value = BigDecimal::from_str("0.0000118307496734982163").unwrap();
        assert_eq!(
            big_decimal_to_wad_floor(&value),
            Some(U256::from(11_830_749_673_498_u64))
        );
        assert_eq!(
            big_decimal_to_wad_floor(&BigDecimal::from_str("0.65").unwrap()),
            Some(U256::from(650_000_000_000_000_000_u64))
        );
        assert!(big_decimal_to_wad_floor(&BigDecimal::from_str("-0.1").unwrap()).is_none());
    }
}
