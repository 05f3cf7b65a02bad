use {
    crate::{Error, RateModel},
    alloy::primitives::{U256, U512},
    number::wad::{HALF_WAD, WAD},
};

/// Interest rate at `utilization`, both as WAD.
///
/// Fails if the rate does not fit into 256 bits.
pub fn instantaneous_rate(model: &RateModel, utilization: U256) -> Result<U256, Error> {
    narrow(rate(&Curve::new(model), widen(utilization))?)
}

/// Integral of [`instantaneous_rate`] from zero to `utilization`.
///
/// Each segment of the curve is a rectangle below a triangle. Divisions
/// truncate in the same order the pool contracts do, so results are
/// reproducible to the last wei. Intermediate products are computed in 512
/// bits so large rates don't overflow before the divisions bring them back
/// down.
pub fn area_under_curve(model: &RateModel, utilization: U256) -> Result<U256, Error> {
    let curve = Curve::new(model);
    let utilization = widen(utilization);
    let area = add(
        below_kink_area(&curve, utilization)?,
        above_kink_area(&curve, utilization)?,
    )?;
    narrow(area)
}

/// A [`RateModel`] widened to 512 bits.
struct Curve {
    u_bar: U512,
    r0: U512,
    r1: U512,
    r2: U512,
}

impl Curve {
    fn new(model: &RateModel) -> Self {
        Self {
            u_bar: widen(model.u_bar()),
            r0: widen(model.r0()),
            r1: widen(model.r1()),
            r2: widen(model.r2()),
        }
    }
}

fn rate(curve: &Curve, utilization: U512) -> Result<U512, Error> {
    // `u_bar` is in (0, WAD) for every constructed model.
    let before_kink = mul(utilization.min(curve.u_bar), curve.r1)? / curve.u_bar;
    let after_kink =
        mul(utilization.saturating_sub(curve.u_bar), curve.r2)? / (widen(WAD) - curve.u_bar);
    add(add(curve.r0, before_kink)?, after_kink)
}

fn below_kink_area(curve: &Curve, utilization: U512) -> Result<U512, Error> {
    let utilization = utilization.min(curve.u_bar);
    let rectangle = mul(utilization, curve.r0)? / widen(WAD);
    let rise = rate(curve, utilization)? - curve.r0;
    let triangle = triangle(rise, utilization)?;
    add(rectangle, triangle)
}

fn above_kink_area(curve: &Curve, utilization: U512) -> Result<U512, Error> {
    if utilization <= curve.u_bar {
        return Ok(U512::ZERO);
    }
    let utilization_after_kink = utilization - curve.u_bar;
    let rate_at_kink = add(curve.r0, curve.r1)?;
    let rectangle = mul(utilization_after_kink, rate_at_kink)? / widen(WAD);
    let rise = rate(curve, utilization)? - rate_at_kink;
    let triangle = triangle(rise, utilization_after_kink)?;
    add(rectangle, triangle)
}

/// `HALF_WAD * rise * width / WAD / WAD`
fn triangle(rise: U512, width: U512) -> Result<U512, Error> {
    Ok(mul(mul(widen(HALF_WAD), rise)?, width)? / widen(WAD) / widen(WAD))
}

fn widen(value: U256) -> U512 {
    U512::from_limbs_slice(value.as_limbs())
}

fn narrow(value: U512) -> Result<U256, Error> {
    U256::checked_from_limbs_slice(value.as_limbs()).ok_or_else(overflow)
}

fn mul(a: U512, b: U512) -> Result<U512, Error> {
    a.checked_mul(b).ok_or_else(overflow)
}

fn add(a: U512, b: U512) -> Result<U512, Error> {
    a.checked_add(b).ok_or_else(overflow)
}

fn overflow() -> Error {
    Error::InvalidRateModel("rate curve overflows 256 bits".to_owned())
}
