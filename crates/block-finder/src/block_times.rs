use std::{collections::HashMap, time::Duration};

/// Expected time between two blocks per chain. Only used as a heuristic for
/// how far back to jump when searching for old blocks, so it doesn't need to
/// be exact.
#[derive(Clone, Debug, PartialEq)]
pub struct BlockTimes {
    default: Duration,
    per_chain: HashMap<u64, Duration>,
}

impl BlockTimes {
    /// Long term average of Ethereum mainnet (https://etherscan.io/chart/blocktime).
    pub const DEFAULT: Duration = Duration::from_millis(13_500);

    /// Policy that uses `default` for every chain.
    pub fn new(default: Duration) -> Self {
        Self {
            default,
            per_chain: HashMap::new(),
        }
    }

    /// Overrides the block time of a single chain.
    pub fn with_chain(mut self, chain_id: u64, block_time: Duration) -> Self {
        self.per_chain.insert(chain_id, block_time);
        self
    }

    pub fn average_block_time(&self, chain_id: u64) -> Duration {
        self.per_chain
            .get(&chain_id)
            .copied()
            .unwrap_or(self.default)
    }

    /// Estimates how many blocks get mined on `chain_id` within `seconds`,
    /// padded by `cushion` (e.g. `0.1` for 10% more) and rounded up.
    pub fn estimate_blocks_elapsed(&self, chain_id: u64, seconds: u64, cushion: f64) -> u64 {
        let block_time = self.average_block_time(chain_id).as_secs_f64();
        // `as` saturates, so a zero block time ends up jumping straight to genesis.
        (seconds as f64 * (1. + cushion) / block_time).ceil() as u64
    }
}

impl Default for BlockTimes {
    fn default() -> Self {
        // https://polygonscan.com/chart/blocktime
        Self::new(Self::DEFAULT).with_chain(137, Duration::from_millis(2_500))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy() {
        let times = BlockTimes::default();
        assert_eq!(times.average_block_time(1), Duration::from_millis(13_500));
        assert_eq!(times.average_block_time(137), Duration::from_millis(2_500));
        assert_eq!(times.average_block_time(10), BlockTimes::DEFAULT);
    }

    #[test]
    fn overrides() {
        let times = BlockTimes::default().with_chain(10, Duration::from_secs(2));
        assert_eq!(times.average_block_time(10), Duration::from_secs(2));
        assert_eq!(times.average_block_time(137), Duration::from_millis(2_500));
    }

    #[test]
    fn estimates_blocks_elapsed_with_cushion() {
        let times = BlockTimes::default();
        // 1000s * 1.1 / 13.5s = 81.5 blocks, rounded up
        assert_eq!(times.estimate_blocks_elapsed(1, 1_000, 0.1), 82);
        // 100s * 1.1 / 13.5s = 8.15 blocks, rounded up
        assert_eq!(times.estimate_blocks_elapsed(1, 100, 0.1), 9);
        // 10s * 1.1 / 2.5s = 4.4 blocks, rounded up
        assert_eq!(times.estimate_blocks_elapsed(137, 10, 0.1), 5);
        assert_eq!(times.estimate_blocks_elapsed(1, 0, 0.1), 0);
    }
}
