use {
    crate::Error,
    alloy::primitives::U256,
    number::{serialization::DecimalU256, wad::WAD},
    serde::{Deserialize, Serialize},
    serde_json::Value,
    serde_with::serde_as,
    std::{fmt, str::FromStr},
};

/// The keys a serialized rate model consists of, no more and no less.
pub const EXPECTED_KEYS: [&str; 4] = ["UBar", "R0", "R1", "R2"];

/// Parameters of a two-slope interest rate curve.
///
/// The rate starts at `R0` for zero utilization, rises by `R1` until the
/// kink at utilization `UBar` and by another `R2` between the kink and full
/// utilization.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Deserialize, Serialize)]
#[serde(try_from = "RawRateModel", into = "RawRateModel")]
pub struct RateModel {
    u_bar: U256,
    r0: U256,
    r1: U256,
    r2: U256,
}

impl RateModel {
    /// Creates a rate model, rejecting kinks that would make the curve
    /// undefined (`UBar == 0` or `UBar >= 1.0`).
    pub fn new(u_bar: U256, r0: U256, r1: U256, r2: U256) -> Result<Self, Error> {
        if u_bar.is_zero() {
            return Err(Error::InvalidRateModel("UBar must be positive".to_owned()));
        }
        if u_bar >= WAD {
            return Err(Error::InvalidRateModel(format!(
                "UBar must be below {WAD} but is {u_bar}"
            )));
        }
        Ok(Self::new_unchecked(u_bar, r0, r1, r2))
    }

    pub(crate) const fn new_unchecked(u_bar: U256, r0: U256, r1: U256, r2: U256) -> Self {
        Self { u_bar, r0, r1, r2 }
    }

    /// Utilization at which the slope changes.
    pub fn u_bar(&self) -> U256 {
        self.u_bar
    }

    /// Rate at zero utilization.
    pub fn r0(&self) -> U256 {
        self.r0
    }

    /// Rate increase between zero utilization and the kink.
    pub fn r1(&self) -> U256 {
        self.r1
    }

    /// Rate increase between the kink and full utilization.
    pub fn r2(&self) -> U256 {
        self.r2
    }
}

/// Wire representation as stored on chain, e.g.
/// `{"UBar":"650000000000000000","R0":"0","R1":"80000000000000000","R2":"1000000000000000000"}`.
#[serde_as]
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
struct RawRateModel {
    #[serde(rename = "UBar")]
    #[serde_as(as = "DecimalU256")]
    u_bar: U256,
    #[serde(rename = "R0")]
    #[serde_as(as = "DecimalU256")]
    r0: U256,
    #[serde(rename = "R1")]
    #[serde_as(as = "DecimalU256")]
    r1: U256,
    #[serde(rename = "R2")]
    #[serde_as(as = "DecimalU256")]
    r2: U256,
}

impl TryFrom<RawRateModel> for RateModel {
    type Error = Error;

    fn try_from(raw: RawRateModel) -> Result<Self, Self::Error> {
        Self::new(raw.u_bar, raw.r0, raw.r1, raw.r2)
    }
}

impl From<RateModel> for RawRateModel {
    fn from(model: RateModel) -> Self {
        Self {
            u_bar: model.u_bar,
            r0: model.r0,
            r1: model.r1,
            r2: model.r2,
        }
    }
}

impl FromStr for RateModel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Only the keys are read from the parsed value. Numbers beyond u64
        // turn into floats there, so the values are decoded from `s` below.
        let object = match serde_json::from_str(s) {
            Ok(Value::Object(object)) => object,
            Ok(other) => {
                return Err(Error::InvalidRateModel(format!(
                    "expected a JSON object but got {other}"
                )));
            }
            Err(err) => return Err(Error::InvalidRateModel(format!("malformed JSON: {err}"))),
        };

        let missing = EXPECTED_KEYS
            .iter()
            .filter(|key| !object.contains_key(**key))
            .collect::<Vec<_>>();
        let unexpected = object
            .keys()
            .filter(|key| !EXPECTED_KEYS.contains(&key.as_str()))
            .collect::<Vec<_>>();
        if !missing.is_empty() || !unexpected.is_empty() {
            return Err(Error::InvalidRateModel(format!(
                "expected keys {EXPECTED_KEYS:?}, missing {missing:?}, unexpected {unexpected:?}"
            )));
        }

        let raw: RawRateModel = serde_json::from_str(s)
            .map_err(|err| Error::InvalidRateModel(err.to_string()))?;
        Self::try_from(raw)
    }
}

impl fmt::Display for RateModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(&RawRateModel::from(*self)).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}

#[cfg(test)]
mod tests {
    use {super::*, number::wad::parse_wad};

    fn weth() -> RateModel {
        RateModel::new(
            parse_wad("0.65").unwrap(),
            U256::ZERO,
            parse_wad("0.08").unwrap(),
            parse_wad("1").unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn parses_string_values() {
        let model: RateModel = r#"{"UBar":"650000000000000000","R0":"0","R1":"80000000000000000","R2":"1000000000000000000"}"#
            .parse()
            .unwrap();
        assert_eq!(model, weth());
    }

    #[test]
    fn parses_integer_values() {
        let model: RateModel = r#"{"R2":1000000000000000000,"R1":80000000000000000,"R0":0,"UBar":650000000000000000}"#
            .parse()
            .unwrap();
        assert_eq!(model, weth());
    }

    #[test]
    fn display_round_trips() {
        let model = weth();
        assert_eq!(
            model.to_string(),
            r#"{"UBar":"650000000000000000","R0":"0","R1":"80000000000000000","R2":"1000000000000000000"}"#
        );
        assert_eq!(model.to_string().parse::<RateModel>().unwrap(), model);
    }

    #[test]
    fn serde_uses_wire_format() {
        let model = weth();
        let json = serde_json::to_value(model).unwrap();
        assert_eq!(json["UBar"], "650000000000000000");
        assert_eq!(
            serde_json::from_str::<RateModel>(&json.to_string()).unwrap(),
            model
        );
    }

    #[test]
    fn parses_integers_beyond_u64() {
        let model: RateModel = r#"{"UBar":650000000000000000,"R0":0,"R1":80000000000000000,"R2":20000000000000000000}"#
            .parse()
            .unwrap();
        assert_eq!(model.r2(), U256::from(20_000_000_000_000_000_000_u128));
        assert_eq!(model.u_bar(), parse_wad("0.65").unwrap());
    }

    #[test]
    fn rejects_missing_keys() {
        let err = r#"{"UBar":"650000000000000000","R0":"0","R1":"80000000000000000"}"#
            .parse::<RateModel>()
            .unwrap_err();
        let Error::InvalidRateModel(message) = err else {
            panic!("unexpected error {err:?}");
        };
        assert!(message.contains(r#"missing ["R2"]"#), "{message}");
    }

    #[test]
    fn rejects_unexpected_keys() {
        let err = r#"{"UBar":"650000000000000000","R0":"0","R1":"80000000000000000","R2":"1","R3":"1"}"#
            .parse::<RateModel>()
            .unwrap_err();
        let Error::InvalidRateModel(message) = err else {
            panic!("unexpected error {err:?}");
        };
        assert!(message.contains(r#"unexpected ["R3"]"#), "{message}");

        // The serde path is just as strict.
        assert!(
            serde_json::from_str::<RateModel>(
                r#"{"UBar":"1","R0":"0","R1":"0","R2":"0","R3":"1"}"#
            )
            .is_err()
        );
    }

    #[test]
    fn rejects_malformed_input() {
        for input in [
            "",
            "not json",
            "[]",
            r#""UBar""#,
            r#"{"UBar":"0.65","R0":"0","R1":"0","R2":"0"}"#,
            r#"{"UBar":0.65,"R0":0,"R1":0,"R2":0}"#,
            r#"{"UBar":-1,"R0":0,"R1":0,"R2":0}"#,
            r#"{"UBar":"1","R0":null,"R1":"0","R2":"0"}"#,
        ] {
            assert!(
                matches!(input.parse::<RateModel>(), Err(Error::InvalidRateModel(_))),
                "{input}"
            );
        }
    }

    #[test]
    fn rejects_degenerate_kinks() {
        assert!(RateModel::new(U256::ZERO, U256::ZERO, U256::ZERO, U256::ZERO).is_err());
        assert!(RateModel::new(WAD, U256::ZERO, U256::ZERO, U256::ZERO).is_err());
        assert!(RateModel::new(WAD - U256::ONE, U256::ZERO, U256::ZERO, U256::ZERO).is_ok());
        assert!(
            r#"{"UBar":"0","R0":"0","R1":"0","R2":"0"}"#
                .parse::<RateModel>()
                .is_err()
        );
    }
}
