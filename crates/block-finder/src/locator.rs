use {
    crate::{BlockCache, BlockTimes, Error},
    ethrpc::{Block, BlockRetrieving},
    std::{num::NonZeroUsize, sync::Arc},
    tracing::instrument,
};

/// Finds the block that was the chain head at a given point in time.
///
/// Every fetched block is cached, so repeated lookups for nearby timestamps
/// get cheaper over time. The locator assumes that the node only serves
/// final blocks; reorgs lead to undefined (but non-panicking) results.
///
/// Lookups take `&mut self` since they grow the cache, callers sharing a
/// locator have to serialize access.
pub struct BlockLocator {
    retriever: Arc<dyn BlockRetrieving>,
    chain_id: u64,
    block_times: BlockTimes,
    cache: BlockCache,
}

impl BlockLocator {
    /// How much further than the block time estimate suggests to jump back
    /// when searching for older blocks.
    const CUSHION: f64 = 0.1;

    pub fn new(retriever: Arc<dyn BlockRetrieving>, chain_id: u64) -> Self {
        Self {
            retriever,
            chain_id,
            block_times: BlockTimes::default(),
            cache: BlockCache::new(),
        }
    }

    pub fn with_block_times(mut self, block_times: BlockTimes) -> Self {
        self.block_times = block_times;
        self
    }

    /// Bounds the number of cached blocks. Blocks already cached are kept.
    pub fn with_cache_capacity(mut self, capacity: NonZeroUsize) -> Self {
        let mut cache = BlockCache::with_capacity_limit(capacity);
        for block in self.cache.blocks() {
            cache.insert(*block);
        }
        self.cache = cache;
        self
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn cache(&self) -> &BlockCache {
        &self.cache
    }

    /// Fetches the most recent block and caches it.
    pub async fn latest_block(&mut self) -> Result<Block, Error> {
        let block = self.retriever.latest_block().await?;
        Metrics::get().fetched_blocks.with_label_values(&["latest"]).inc();
        Ok(self.cache_block(block))
    }

    /// Returns the latest block whose timestamp is `<= timestamp`.
    #[instrument(skip(self), fields(chain_id = self.chain_id))]
    pub async fn resolve(&mut self, timestamp: u64) -> Result<Block, Error> {
        // If the newest cached block is too early, the answer might be the
        // current chain head.
        if self
            .cache
            .last()
            .is_none_or(|last| last.timestamp < timestamp)
        {
            let latest = self.latest_block().await?;
            if latest.timestamp <= timestamp {
                tracing::debug!(number = latest.number, "timestamp is at or after the latest block");
                return Ok(latest);
            }
        }

        let first = self
            .cache
            .first()
            .copied()
            .ok_or_else(|| Error::Inconsistent("no cached blocks".into()))?;
        if first.timestamp > timestamp {
            self.search_backwards(first, timestamp).await?;
        }

        let index = self.cache.index_for_timestamp(timestamp);
        let blocks = self.cache.blocks();
        let start = index.checked_sub(1).and_then(|i| blocks.get(i)).copied();
        let end = blocks.get(index).copied();
        match (start, end) {
            (_, Some(end)) if end.timestamp == timestamp => Ok(end),
            (Some(start), Some(end)) => self.interpolate(start, end, timestamp).await,
            _ => Err(Error::Inconsistent(format!(
                "cached blocks don't bracket timestamp {timestamp}"
            ))),
        }
    }

    /// Returns the block with the given number, from the cache if possible.
    async fn block(&mut self, number: u64) -> Result<Block, Error> {
        if let Some(block) = self.cache.get(number) {
            return Ok(*block);
        }
        let block = self.retriever.block(number).await?;
        Metrics::get().fetched_blocks.with_label_values(&["number"]).inc();
        Ok(self.cache_block(block))
    }

    fn cache_block(&mut self, block: Block) -> Block {
        let block = self.cache.insert(block);
        Metrics::get()
            .cached_blocks
            .set(i64::try_from(self.cache.len()).unwrap_or(i64::MAX));
        block
    }

    /// Walks backwards from `first` (the earliest cached block) in growing
    /// steps until a block at or before `timestamp` is cached.
    async fn search_backwards(&mut self, first: Block, timestamp: u64) -> Result<(), Error> {
        let step = self
            .block_times
            .estimate_blocks_elapsed(self.chain_id, first.timestamp - timestamp, Self::CUSHION)
            .max(1);

        let mut multiplier = 1_u64;
        loop {
            let number = first.number.saturating_sub(step.saturating_mul(multiplier));
            let block = self.block(number).await?;
            tracing::debug!(number, timestamp = block.timestamp, "probed earlier block");
            if block.timestamp <= timestamp {
                return Ok(());
            }
            if number == 0 {
                return Err(Error::OutOfRange { timestamp });
            }
            multiplier += 1;
        }
    }

    /// Narrows down the bracket `start.timestamp <= timestamp <
    /// end.timestamp` by estimating the target block number through linear
    /// interpolation until `start` and `end` are adjacent.
    async fn interpolate(
        &mut self,
        mut start: Block,
        mut end: Block,
        timestamp: u64,
    ) -> Result<Block, Error> {
        let mut steps = 0_u64;
        loop {
            if end.timestamp == timestamp {
                tracing::debug!(steps, number = end.number, "found block with exact timestamp");
                return Ok(end);
            }
            if end.number == start.number + 1 {
                tracing::debug!(steps, number = start.number, "found latest block before timestamp");
                return Ok(start);
            }
            if end.number <= start.number
                || start.timestamp > timestamp
                || end.timestamp < timestamp
            {
                return Err(Error::Inconsistent(format!(
                    "{start:?} and {end:?} don't bracket timestamp {timestamp}"
                )));
            }

            let number = Self::estimate(&start, &end, timestamp)
                .clamp(start.number + 1, end.number - 1);
            let probe = self.block(number).await?;
            if probe.timestamp < start.timestamp || probe.timestamp > end.timestamp {
                return Err(Error::Inconsistent(format!(
                    "{probe:?} is not between {start:?} and {end:?}"
                )));
            }
            tracing::trace!(number, timestamp = probe.timestamp, "probed block");

            if probe.timestamp < timestamp {
                start = probe;
            } else {
                end = probe;
            }
            steps += 1;
        }
    }

    /// Block number at which `timestamp` would be if block times between
    /// `start` and `end` were uniform, rounded to the nearest block.
    fn estimate(start: &Block, end: &Block, timestamp: u64) -> u64 {
        let elapsed = u128::from(timestamp - start.timestamp);
        let duration = u128::from(end.timestamp - start.timestamp);
        let distance = end.number - start.number;
        let offset = (2 * elapsed * u128::from(distance) + duration) / (2 * duration);
        start.number + u64::try_from(offset).unwrap_or(distance)
    }
}

#[derive(prometheus_metric_storage::MetricStorage)]
#[metric(subsystem = "block_locator")]
struct Metrics {
    /// Number of blocks requested from the node.
    #[metric(labels("kind"))]
    fetched_blocks: prometheus::IntCounterVec,

    /// Number of blocks currently held in the cache.
    cached_blocks: prometheus::IntGauge,
}

impl Metrics {
    fn get() -> &'static Self {
        Metrics::instance(observe::metrics::get_storage_registry()).unwrap()
    }
}
