//! Helpers for WAD fixed-point numbers, i.e. [`U256`] values scaled by 1e18.

use {
    alloy::primitives::{
        U256,
        utils::{ParseUnits, format_units, parse_units},
    },
    anyhow::{Result, anyhow},
};

/// Number of decimals of a WAD fixed-point number.
pub const WAD_DECIMALS: u8 = 18;

/// `1.0` as a WAD.
pub const WAD: U256 = U256::from_limbs([1_000_000_000_000_000_000, 0, 0, 0]);

/// `0.5` as a WAD.
pub const HALF_WAD: U256 = U256::from_limbs([500_000_000_000_000_000, 0, 0, 0]);

/// Parses a human readable decimal string (e.g. `"0.65"`) into a WAD.
pub fn parse_wad(value: &str) -> Result<U256> {
    match parse_units(value.trim(), "ether")
        .map_err(|err| anyhow!("invalid WAD {value:?}: {err}"))?
    {
        ParseUnits::U256(value) => Ok(value),
        ParseUnits::I256(_) => Err(anyhow!("negative WAD {value:?}")),
    }
}

/// Formats a WAD as a human readable decimal string (e.g. `"0.650000000000000000"`).
pub fn format_wad(value: U256) -> String {
    format_units(value, "ether").unwrap_or_else(|_| value.to_string())
}
