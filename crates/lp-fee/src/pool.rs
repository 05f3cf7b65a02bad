//! Reads the bridge pool state a quote depends on.

use {
    alloy::{
        eips::BlockId,
        primitives::{Address, U256},
    },
    anyhow::{Context, Result},
    contracts::{BridgePool, RateModelStore},
    ethrpc::AlloyProvider,
};

/// Contract state needed to price a relay. Every read is pinned to a block so
/// that all inputs of a quote come from the same chain state.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait PoolQuerying: Send + Sync + 'static {
    /// The L1 token `pool` holds liquidity for, at the latest block.
    async fn l1_token(&self, pool: Address) -> Result<Address>;

    /// Utilization of `pool` at `block`, as WAD.
    async fn liquidity_utilization_current(&self, pool: Address, block: u64) -> Result<U256>;

    /// Utilization of `pool` at `block` if `amount` was relayed, as WAD. Can
    /// exceed 1.0 when the relay is larger than the free liquidity.
    async fn liquidity_utilization_post_relay(
        &self,
        pool: Address,
        amount: U256,
        block: u64,
    ) -> Result<U256>;

    /// The serialized rate model of `token` at `block`.
    async fn rate_model_for_token(&self, token: Address, block: u64) -> Result<String>;
}

/// [`PoolQuerying`] backed by `eth_call`s against a node.
pub struct OnchainPools {
    provider: AlloyProvider,
    rate_model_store: RateModelStore::Instance,
}

impl OnchainPools {
    pub fn new(provider: AlloyProvider, rate_model_store: RateModelStore::Instance) -> Self {
        Self {
            provider,
            rate_model_store,
        }
    }

    fn bridge_pool(&self, pool: Address) -> BridgePool::Instance {
        BridgePool::Instance::new(pool, self.provider.clone())
    }
}

#[async_trait::async_trait]
impl PoolQuerying for OnchainPools {
    async fn l1_token(&self, pool: Address) -> Result<Address> {
        self.bridge_pool(pool)
            .l1Token()
            .call()
            .await
            .with_context(|| format!("failed to get l1Token of pool {pool}"))
    }

    async fn liquidity_utilization_current(&self, pool: Address, block: u64) -> Result<U256> {
        self.bridge_pool(pool)
            .liquidityUtilizationCurrent()
            .block(BlockId::number(block))
            .call()
            .await
            .with_context(|| {
                format!("failed to get liquidityUtilizationCurrent of pool {pool} at block {block}")
            })
    }

    async fn liquidity_utilization_post_relay(
        &self,
        pool: Address,
        amount: U256,
        block: u64,
    ) -> Result<U256> {
        self.bridge_pool(pool)
            .liquidityUtilizationPostRelay(amount)
            .block(BlockId::number(block))
            .call()
            .await
            .with_context(|| {
                format!(
                    "failed to get liquidityUtilizationPostRelay({amount}) of pool {pool} at \
                     block {block}"
                )
            })
    }

    async fn rate_model_for_token(&self, token: Address, block: u64) -> Result<String> {
        self.rate_model_store
            .l1TokenRateModels(token)
            .block(BlockId::number(block))
            .call()
            .await
            .with_context(|| format!("failed to get rate model of {token} at block {block}"))
    }
}

/// Answers rate model queries from [`rate_model::known`] and everything else
/// from the wrapped [`PoolQuerying`].
pub struct BuiltinRateModels<P> {
    inner: P,
}

impl<P> BuiltinRateModels<P> {
    pub fn new(inner: P) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl<P: PoolQuerying> PoolQuerying for BuiltinRateModels<P> {
    async fn l1_token(&self, pool: Address) -> Result<Address> {
        self.inner.l1_token(pool).await
    }

    async fn liquidity_utilization_current(&self, pool: Address, block: u64) -> Result<U256> {
        self.inner.liquidity_utilization_current(pool, block).await
    }

    async fn liquidity_utilization_post_relay(
        &self,
        pool: Address,
        amount: U256,
        block: u64,
    ) -> Result<U256> {
        self.inner
            .liquidity_utilization_post_relay(pool, amount, block)
            .await
    }

    async fn rate_model_for_token(&self, token: Address, _: u64) -> Result<String> {
        rate_model::known::rate_model_for(&token)
            .map(|model| model.to_string())
            .with_context(|| format!("no built-in rate model for {token}"))
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        alloy::{
            primitives::address,
            providers::mock::Asserter,
            sol_types::SolValue,
        },
    };

    const POOL: Address = address!("0x7355Efc63Ae731f584380a9838292c7046c1e433");
    const WETH: Address = address!("0xC02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2");

    fn pools(asserter: Asserter) -> OnchainPools {
        let provider = ethrpc::mock_provider(asserter);
        let store = RateModelStore::Instance::new(
            RateModelStore::DEPLOYMENT_INFO[&contracts::networks::MAINNET],
            provider.clone(),
        );
        OnchainPools::new(provider, store)
    }

    #[tokio::test]
    async fn decodes_contract_responses() {
        let asserter = Asserter::new();
        let pools = pools(asserter.clone());

        asserter.push_success(&WETH.abi_encode());
        assert_eq!(pools.l1_token(POOL).await.unwrap(), WETH);

        let utilization = U256::from(500_000_000_000_000_000_u64);
        asserter.push_success(&utilization.abi_encode());
        assert_eq!(
            pools.liquidity_utilization_current(POOL, 100).await.unwrap(),
            utilization
        );

        asserter.push_success(&(utilization + U256::ONE).abi_encode());
        assert_eq!(
            pools
                .liquidity_utilization_post_relay(POOL, U256::from(1000), 100)
                .await
                .unwrap(),
            utilization + U256::ONE
        );

        let rate_model = r#"{"UBar":"650000000000000000","R0":"0","R1":"80000000000000000","R2":"1000000000000000000"}"#;
        asserter.push_success(&rate_model.to_owned().abi_encode());
        assert_eq!(
            pools.rate_model_for_token(WETH, 100).await.unwrap(),
            rate_model
        );
    }

    #[tokio::test]
    async fn builtin_rate_models_bypass_the_store() {
        let mut inner = MockPoolQuerying::new();
        inner
            .expect_liquidity_utilization_current()
            .withf(|pool, block| *pool == POOL && *block == 100)
            .returning(|_, _| Ok(U256::from(5)));
        inner.expect_rate_model_for_token().never();
        let pools = BuiltinRateModels::new(inner);

        assert_eq!(
            pools.liquidity_utilization_current(POOL, 100).await.unwrap(),
            U256::from(5)
        );
        let model = pools.rate_model_for_token(WETH, 100).await.unwrap();
        assert_eq!(
            model.parse::<rate_model::RateModel>().unwrap(),
            rate_model::known::RATE_MODELS[&WETH]
        );
        let err = pools
            .rate_model_for_token(Address::ZERO, 100)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no built-in rate model"), "{err}");
    }

    #[tokio::test]
    async fn node_errors_carry_context() {
        let asserter = Asserter::new();
        let pools = pools(asserter.clone());

        asserter.push_failure_msg("execution reverted");
        let err = pools
            .liquidity_utilization_current(POOL, 7)
            .await
            .unwrap_err();
        assert!(format!("{err:?}").contains("at block 7"), "{err:?}");
    }
}
