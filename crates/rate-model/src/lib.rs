//! Piecewise-linear interest rate curves of the bridge pools and the
//! conversion of their APY into the LP fee charged for a single relay.
//!
//! All quantities are WAD fixed point numbers (`1e18` represents `1.0`).

pub mod curve;
pub mod fee;
pub mod known;
pub mod model;

pub use self::{
    curve::{area_under_curve, instantaneous_rate},
    fee::{WEEKS_PER_YEAR, apy_from_utilization, periodic_fee, realized_lp_fee_pct},
    model::RateModel,
};

#[derive(Clone, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    #[error("invalid rate model: {0}")]
    InvalidRateModel(String),
}
