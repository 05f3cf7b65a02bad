use {
    crate::AlloyProvider,
    alloy::{eips::BlockId, providers::Provider},
    anyhow::{Context as _, Result},
    serde::Serialize,
};

/// The parts of a block needed to map wall-clock time to chain height.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize)]
pub struct Block {
    pub number: u64,
    /// Unix timestamp in seconds.
    pub timestamp: u64,
}

/// Trait for abstracting the retrieval of blocks from a node.
///
/// Implementations must be idempotent: asking for the same block number
/// twice has to return the same block.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait BlockRetrieving: Send + Sync + 'static {
    /// Returns the most recent block.
    async fn latest_block(&self) -> Result<Block>;

    /// Returns the block with the given number.
    async fn block(&self, number: u64) -> Result<Block>;
}

#[async_trait::async_trait]
impl BlockRetrieving for AlloyProvider {
    async fn latest_block(&self) -> Result<Block> {
        get_block_at_id(self, BlockId::latest()).await
    }

    async fn block(&self, number: u64) -> Result<Block> {
        get_block_at_id(self, BlockId::number(number)).await
    }
}

async fn get_block_at_id(provider: &AlloyProvider, id: BlockId) -> Result<Block> {
    let block = provider
        .get_block(id)
        .await
        .with_context(|| format!("failed to get block for {id:?}"))?
        .with_context(|| format!("no block for {id:?}"))?;
    tracing::trace!(number = block.header.number, timestamp = block.header.timestamp, "fetched block");

    Ok(Block {
        number: block.header.number,
        timestamp: block.header.timestamp,
    })
}
