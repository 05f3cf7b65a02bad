use {ethrpc::Block, std::num::NonZeroUsize};

/// Returns the leftmost index at which `target` could be inserted into
/// `items` without breaking their ascending order by `key`, i.e. the index of
/// the first item whose key is `>= target`.
pub fn sorted_index_by<T, K, F>(items: &[T], target: &K, key: F) -> usize
where
    K: Ord,
    F: Fn(&T) -> K,
{
    items.partition_point(|item| key(item) < *target)
}

/// Blocks fetched so far, strictly ascending by number.
///
/// Since blocks are assumed to be final, ascending numbers imply
/// non-decreasing timestamps, which lets the cache be searched by either key.
#[derive(Clone, Debug, Default)]
pub struct BlockCache {
    blocks: Vec<Block>,
    capacity: Option<NonZeroUsize>,
}

impl BlockCache {
    /// The smallest capacity that still fits a bracketing pair of blocks.
    const MIN_CAPACITY: usize = 2;

    /// Creates a cache that never evicts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a cache holding at most `capacity` blocks (but at least 2).
    ///
    /// When full, inserting a block evicts the cached block furthest away
    /// from it so that the neighbourhood of the current search survives.
    pub fn with_capacity_limit(capacity: NonZeroUsize) -> Self {
        Self {
            blocks: Vec::new(),
            capacity: NonZeroUsize::new(capacity.get().max(Self::MIN_CAPACITY)),
        }
    }

    /// Adds a block to the cache and returns the cached version of it. A
    /// block whose number is already cached is not added a second time.
    pub fn insert(&mut self, block: Block) -> Block {
        let index = self.index_for(block.number);
        if let Some(cached) = self.blocks.get(index).filter(|cached| cached.number == block.number)
        {
            return *cached;
        }
        self.blocks.insert(index, block);
        self.evict_furthest_from(block.number);
        block
    }

    /// Index of the first cached block whose number is `>= number`.
    pub fn index_for(&self, number: u64) -> usize {
        sorted_index_by(&self.blocks, &number, |block| block.number)
    }

    /// Index of the first cached block whose timestamp is `>= timestamp`.
    pub fn index_for_timestamp(&self, timestamp: u64) -> usize {
        sorted_index_by(&self.blocks, &timestamp, |block| block.timestamp)
    }

    pub fn get(&self, number: u64) -> Option<&Block> {
        self.blocks
            .get(self.index_for(number))
            .filter(|block| block.number == number)
    }

    pub fn first(&self) -> Option<&Block> {
        self.blocks.first()
    }

    pub fn last(&self) -> Option<&Block> {
        self.blocks.last()
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    fn evict_furthest_from(&mut self, number: u64) {
        let Some(capacity) = self.capacity else {
            return;
        };
        while self.blocks.len() > capacity.get() {
            let (Some(first), Some(last)) = (self.blocks.first(), self.blocks.last()) else {
                return;
            };
            if number.abs_diff(first.number) >= number.abs_diff(last.number) {
                self.blocks.remove(0);
            } else {
                self.blocks.pop();
            }
        }
    }
}
