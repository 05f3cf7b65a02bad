//! Maps wall-clock timestamps to the block that was the chain head at that
//! time.

pub mod block_times;
pub mod cache;
pub mod locator;

pub use {
    block_times::BlockTimes,
    cache::BlockCache,
    ethrpc::Block,
    locator::BlockLocator,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("timestamp {timestamp} is before the first block of the chain")]
    OutOfRange { timestamp: u64 },

    #[error("blocks are not ordered by timestamp: {0}")]
    Inconsistent(String),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}
