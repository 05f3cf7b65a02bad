//! Bindings for the contracts the LP fee is derived from.

pub mod alloy;

pub use self::alloy::{BridgePool, InstanceExt, RateModelStore, networks};
