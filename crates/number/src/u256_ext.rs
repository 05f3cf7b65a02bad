//! Extension trait for converting [`U256`] from and to arbitrary precision
//! integers.

use {
    alloy::primitives::U256,
    anyhow::{Result, ensure},
    num::{BigInt, BigUint, bigint::Sign},
};

pub trait U256Ext: Sized {
    /// Convert to BigInt.
    fn to_big_int(&self) -> BigInt;

    /// Convert to BigUint.
    fn to_big_uint(&self) -> BigUint;

    /// Create from BigInt. Fails for negative or too large values.
    fn from_big_int(input: &BigInt) -> Result<Self>;

    /// Create from BigUint. Fails for values that don't fit into 256 bits.
    fn from_big_uint(input: &BigUint) -> Result<Self>;
}

impl U256Ext for U256 {
    fn to_big_int(&self) -> BigInt {
        BigInt::from_biguint(Sign::Plus, self.to_big_uint())
    }

    fn to_big_uint(&self) -> BigUint {
        BigUint::from_bytes_be(self.to_be_bytes::<32>().as_slice())
    }

    fn from_big_int(input: &BigInt) -> Result<Self> {
        ensure!(input.sign() != Sign::Minus, "negative");
        Self::from_big_uint(input.magnitude())
    }

    fn from_big_uint(input: &BigUint) -> Result<Self> {
        let bytes = input.to_bytes_be();
        ensure!(bytes.len() <= 32, "too large");
        Ok(U256::from_be_slice(&bytes))
    }
}
