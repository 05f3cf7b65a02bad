//! Rate models of the L1 tokens supported at launch. The `lp-fee` CLI quotes
//! with these instead of the rate model store when started with
//! `--builtin-rate-models`.

use {
    crate::RateModel,
    alloy::primitives::{Address, U256, address},
    std::{collections::HashMap, sync::LazyLock},
};

const fn wad(value: u64) -> U256 {
    U256::from_limbs([value, 0, 0, 0])
}

pub static RATE_MODELS: LazyLock<HashMap<Address, RateModel>> = LazyLock::new(|| {
    maplit::hashmap! {
        // WETH
        address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2") => RateModel::new_unchecked(
            wad(650_000_000_000_000_000),
            wad(0),
            wad(80_000_000_000_000_000),
            wad(1_000_000_000_000_000_000),
        ),
        // USDC
        address!("0xA0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48") => RateModel::new_unchecked(
            wad(800_000_000_000_000_000),
            wad(0),
            wad(40_000_000_000_000_000),
            wad(600_000_000_000_000_000),
        ),
        // UMA
        address!("0x04Fa0d235C4abf4BcF4787aF4CF447DE572eF828") => RateModel::new_unchecked(
            wad(500_000_000_000_000_000),
            wad(0),
            wad(50_000_000_000_000_000),
            wad(2_000_000_000_000_000_000),
        ),
        // BADGER
        address!("0x3472A5A71965499acd81997a54BBA8D852C6E53d") => RateModel::new_unchecked(
            wad(500_000_000_000_000_000),
            wad(25_000_000_000_000_000),
            wad(25_000_000_000_000_000),
            wad(2_000_000_000_000_000_000),
        ),
    }
});

/// Returns the built-in rate model of `token`, if there is one.
pub fn rate_model_for(token: &Address) -> Option<RateModel> {
    RATE_MODELS.get(token).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_models_are_valid() {
        for model in RATE_MODELS.values() {
            let validated = RateModel::new(model.u_bar(), model.r0(), model.r1(), model.r2());
            assert_eq!(validated.as_ref(), Ok(model));
            assert_eq!(model.to_string().parse::<RateModel>().as_ref(), Ok(model));
        }
    }

    #[test]
    fn looks_up_by_address() {
        let weth = rate_model_for(&address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2")).unwrap();
        assert_eq!(
            weth.to_string(),
            r#"{"UBar":"650000000000000000","R0":"0","R1":"80000000000000000","R2":"1000000000000000000"}"#
        );
        assert_eq!(rate_model_for(&Address::ZERO), None);
    }
}
