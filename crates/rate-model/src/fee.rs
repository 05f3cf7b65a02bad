use {
    crate::{Error, RateModel, curve::area_under_curve},
    alloy::primitives::U256,
    bigdecimal::{BigDecimal, num_bigint::BigInt},
    num::{FromPrimitive, One, ToPrimitive, Zero},
    number::{
        conversions::{big_decimal_to_wad_floor, wad_to_big_decimal},
        wad::WAD,
    },
};

/// LP fees are charged as if liquidity was lent out for one week.
pub const WEEKS_PER_YEAR: u32 = 52;

/// Significant digits kept while taking roots.
///
/// Fees are floored to 18 decimals of a root close to 1, so the root has to
/// be exact to at least 30 significant digits for the floor to be stable.
/// Every Newton step rounds about `2 * log2(n)` times, which costs a few of
/// the remaining digits.
const PRECISION: u64 = 50;
/// Newton iteration stops once consecutive estimates are this close (1e-45),
/// well below the 1e-30 the fee needs and above the rounding noise of
/// [`PRECISION`].
const TOLERANCE_SCALE: i64 = 45;
const MAX_ITERATIONS: usize = 100;

/// Average APY over the utilization range crossed by a relay, as WAD.
///
/// Works in either direction since only the size of the range matters.
pub fn apy_from_utilization(
    model: &RateModel,
    utilization_before: U256,
    utilization_after: U256,
) -> Result<U256, Error> {
    if utilization_before == utilization_after {
        return Err(Error::InvalidInput("deposit cannot have zero size"));
    }
    let area_before = area_under_curve(model, utilization_before)?;
    let area_after = area_under_curve(model, utilization_after)?;
    let area = area_after
        .abs_diff(area_before)
        .checked_mul(WAD)
        .ok_or_else(|| Error::InvalidRateModel("APY overflows 256 bits".to_owned()))?;
    Ok(area / utilization_after.abs_diff(utilization_before))
}

/// Converts an APY into the compounding rate of a single one of `periods`
/// periods per year, i.e. `(1 + apy)^(1 / periods) - 1`, rounded down to WAD.
pub fn periodic_fee(apy: U256, periods: u32) -> Result<U256, Error> {
    if periods == 0 {
        return Err(Error::InvalidInput("number of periods must be positive"));
    }
    let growth = BigDecimal::one() + wad_to_big_decimal(&apy);
    let root = nth_root(&growth, periods)
        .ok_or(Error::InvalidInput("periodic fee did not converge"))?;
    let fee = root - BigDecimal::one();
    big_decimal_to_wad_floor(&fee.max(BigDecimal::zero()))
        .ok_or(Error::InvalidInput("periodic fee does not fit into 256 bits"))
}

/// Fee charged to a relay that moves the pool utilization from `before` to
/// `after`: the weekly rate of the APY over that range.
pub fn realized_lp_fee_pct(
    model: &RateModel,
    utilization_before: U256,
    utilization_after: U256,
) -> Result<U256, Error> {
    let apy = apy_from_utilization(model, utilization_before, utilization_after)?;
    periodic_fee(apy, WEEKS_PER_YEAR)
}

/// `n`th root of a positive `value` using Newton's method, accurate to about
/// [`PRECISION`] significant digits.
///
/// Returns `None` if the iteration does not settle.
pub fn nth_root(value: &BigDecimal, n: u32) -> Option<BigDecimal> {
    if n == 1 || value.is_zero() {
        return Some(value.clone());
    }
    let n_decimal = BigDecimal::from(n);
    let n_minus_one = BigDecimal::from(n - 1);
    let tolerance = BigDecimal::new(BigInt::one(), TOLERANCE_SCALE);

    let mut root = initial_estimate(value, n);
    for _ in 0..MAX_ITERATIONS {
        let power = pow(&root, n - 1);
        let next = ((&n_minus_one * &root + value / &power) / &n_decimal).with_prec(PRECISION);
        if (&next - &root).abs() <= tolerance {
            return Some(next);
        }
        root = next;
    }
    None
}

/// Root in double precision. Newton's method converges quadratically from
/// there, so a handful of steps reach [`PRECISION`] for any `value` in the
/// range of `f64`.
fn initial_estimate(value: &BigDecimal, n: u32) -> BigDecimal {
    value
        .to_f64()
        .map(|value| value.powf(1.0 / f64::from(n)))
        .filter(|root| root.is_finite() && *root > 0.0)
        .and_then(BigDecimal::from_f64)
        .map(|root| root.with_prec(PRECISION))
        .unwrap_or_else(|| value.clone())
}

/// Exponentiation by squaring, rounding to [`PRECISION`] after every step.
fn pow(base: &BigDecimal, mut exponent: u32) -> BigDecimal {
    let mut result = BigDecimal::one();
    let mut base = base.clone();
    while exponent > 0 {
        if exponent & 1 == 1 {
            result = (&result * &base).with_prec(PRECISION);
        }
        base = (&base * &base).with_prec(PRECISION);
        exponent >>= 1;
    }
    result
}
