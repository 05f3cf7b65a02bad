use {
    crate::{Error, pool::PoolQuerying},
    alloy::primitives::{Address, U256},
    anyhow::Context,
    block_finder::{Block, BlockLocator},
    number::{serialization::DecimalU256, wad::format_wad},
    rate_model::{RateModel, WEEKS_PER_YEAR, apy_from_utilization, periodic_fee},
    serde::Serialize,
    serde_with::serde_as,
    std::sync::Arc,
    tokio::sync::Mutex,
    tracing::instrument,
};

/// Everything that went into a fee quote.
#[serde_as]
#[derive(Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LpFeeQuote {
    /// Block whose state the quote is based on.
    pub block: Block,
    #[serde_as(as = "DecimalU256")]
    pub utilization_before: U256,
    #[serde_as(as = "DecimalU256")]
    pub utilization_after: U256,
    pub rate_model: RateModel,
    #[serde_as(as = "DecimalU256")]
    pub apy: U256,
    /// Weekly LP fee as WAD.
    #[serde_as(as = "DecimalU256")]
    pub fee: U256,
}

/// Quotes the fee liquidity providers earn for a relay through a bridge pool.
pub struct LpFeeEstimator {
    locator: Mutex<BlockLocator>,
    pools: Arc<dyn PoolQuerying>,
}

impl LpFeeEstimator {
    pub fn new(locator: BlockLocator, pools: Arc<dyn PoolQuerying>) -> Self {
        Self {
            locator: Mutex::new(locator),
            pools,
        }
    }

    /// Weekly LP fee (as WAD) for relaying `amount` of `token` through
    /// `pool`, based on the chain state at `timestamp` or the latest block.
    pub async fn quote(
        &self,
        token: Address,
        pool: Address,
        amount: U256,
        timestamp: Option<u64>,
    ) -> Result<U256, Error> {
        Ok(self
            .quote_detailed(token, pool, amount, timestamp)
            .await?
            .fee)
    }

    /// Like [`Self::quote`] but returns the intermediate values as well.
    #[instrument(skip(self))]
    pub async fn quote_detailed(
        &self,
        token: Address,
        pool: Address,
        amount: U256,
        timestamp: Option<u64>,
    ) -> Result<LpFeeQuote, Error> {
        let result = self.compute(token, pool, amount, timestamp).await;
        let label = match &result {
            Ok(_) => "success",
            Err(err) => err.label(),
        };
        Metrics::get().quotes.with_label_values(&[label]).inc();
        result
    }

    async fn compute(
        &self,
        token: Address,
        pool: Address,
        amount: U256,
        timestamp: Option<u64>,
    ) -> Result<LpFeeQuote, Error> {
        if amount.is_zero() {
            return Err(Error::InvalidInput("amount must be positive"));
        }

        let block = {
            let mut locator = self.locator.lock().await;
            match timestamp {
                Some(timestamp) => locator.resolve(timestamp).await?,
                None => locator.latest_block().await?,
            }
        };

        let utilization_before = self
            .pools
            .liquidity_utilization_current(pool, block.number)
            .await
            .context("utilization before relay")?;
        let utilization_after = self
            .pools
            .liquidity_utilization_post_relay(pool, amount, block.number)
            .await
            .context("utilization after relay")?;
        let rate_model: RateModel = self
            .pools
            .rate_model_for_token(token, block.number)
            .await
            .context("rate model")?
            .parse()?;
        tracing::debug!(
            block = block.number,
            %utilization_before,
            %utilization_after,
            %rate_model,
            "fetched pool state"
        );

        let apy = apy_from_utilization(&rate_model, utilization_before, utilization_after)?;
        let fee = periodic_fee(apy, WEEKS_PER_YEAR)?;
        tracing::info!(
            block = block.number,
            apy = %format_wad(apy),
            fee = %format_wad(fee),
            "quoted LP fee"
        );

        Ok(LpFeeQuote {
            block,
            utilization_before,
            utilization_after,
            rate_model,
            apy,
            fee,
        })
    }
}

#[derive(prometheus_metric_storage::MetricStorage)]
#[metric(subsystem = "estimator")]
struct Metrics {
    /// Number of LP fee quotes by result.
    #[metric(labels("result"))]
    quotes: prometheus::IntCounterVec,
}

impl Metrics {
    fn get() -> &'static Self {
        Metrics::instance(observe::metrics::get_storage_registry()).unwrap()
    }
}
