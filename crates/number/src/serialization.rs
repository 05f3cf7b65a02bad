use {
    alloy::primitives::U256,
    serde::{Deserialize, Deserializer, Serializer, de},
    serde_json::value::RawValue,
    serde_with::{DeserializeAs, SerializeAs},
};

/// Serialize [`U256`] as a decimal string and deserialize it from either a
/// decimal string or a non-negative JSON integer of any size.
///
/// Integers are decoded from their raw JSON text instead of going through
/// `u64` or `f64`, so this only deserializes from `serde_json`.
pub struct DecimalU256;

impl<'de> DeserializeAs<'de, U256> for DecimalU256 {
    fn deserialize_as<D>(deserializer: D) -> Result<U256, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = <Box<RawValue>>::deserialize(deserializer)?;
        parse_json_decimal(raw.get()).map_err(de::Error::custom)
    }
}

/// Parses a JSON string or number holding a non-negative integer.
fn parse_json_decimal(json: &str) -> Result<U256, String> {
    let json = json.trim();
    let digits = if json.starts_with('"') {
        serde_json::from_str::<String>(json).map_err(|err| err.to_string())?
    } else {
        json.to_owned()
    };
    let digits = digits.trim();
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return Err(format!(
            "{json} is not a non-negative integer, expected a u256 as decimal string or integer"
        ));
    }
    U256::from_str_radix(digits, 10)
        .map_err(|err| format!("failed to decode {json} as decimal u256: {err}"))
}

impl SerializeAs<U256> for DecimalU256 {
    fn serialize_as<S>(source: &U256, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&source.to_string())
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        serde::{Deserialize, Serialize},
        serde_with::serde_as,
    };

    #[serde_as]
    #[derive(Debug, Deserialize, Serialize, PartialEq)]
    struct Wrapper(#[serde_as(as = "DecimalU256")] U256);

    #[test]
    fn deserializes_strings_and_integers() {
        let result: Wrapper = serde_json::from_str(r#""650000000000000000""#).unwrap();
        assert_eq!(result.0, U256::from(650_000_000_000_000_000_u64));

        let result: Wrapper = serde_json::from_str("650000000000000000").unwrap();
        assert_eq!(result.0, U256::from(650_000_000_000_000_000_u64));

        let result: Wrapper =
            serde_json::from_str(r#""115792089237316195423570985008687907853269984665640564039457584007913129639935""#)
                .unwrap();
        assert_eq!(result.0, U256::MAX);
    }

    #[test]
    fn keeps_integers_beyond_u64_exact() {
        let result: Wrapper = serde_json::from_str("20000000000000000000").unwrap();
        assert_eq!(result.0, U256::from(20_000_000_000_000_000_000_u128));

        let result: Wrapper = serde_json::from_str(
            "115792089237316195423570985008687907853269984665640564039457584007913129639935",
        )
        .unwrap();
        assert_eq!(result.0, U256::MAX);

        // One above U256::MAX
        assert!(
            serde_json::from_str::<Wrapper>(
                "115792089237316195423570985008687907853269984665640564039457584007913129639936"
            )
            .is_err()
        );
    }

    #[test]
    fn rejects_malformed_values() {
        assert!(serde_json::from_str::<Wrapper>(r#""10e""#).is_err());
        assert!(serde_json::from_str::<Wrapper>(r#""0.5""#).is_err());
        assert!(serde_json::from_str::<Wrapper>("-1").is_err());
        assert!(serde_json::from_str::<Wrapper>("0.5").is_err());
        assert!(serde_json::from_str::<Wrapper>("null").is_err());
        assert!(serde_json::from_str::<Wrapper>("1e3").is_err());
        assert!(serde_json::from_str::<Wrapper>("true").is_err());
        assert!(serde_json::from_str::<Wrapper>(r#""""#).is_err());
    }

    #[test]
    fn serializes_as_decimal_string() {
        let serialized = serde_json::to_string(&Wrapper(U256::from(10))).unwrap();
        assert_eq!(serialized, "\"10\"");
    }
}
