/// Chain ids of the networks Across relays between.
pub mod networks {
    pub const MAINNET: u64 = 1;
    pub const OPTIMISM: u64 = 10;
    pub const POLYGON: u64 = 137;
    pub const BOBA: u64 = 288;
    pub const ARBITRUM_ONE: u64 = 42161;
}

crate::bindings!(BridgePool {
    function l1Token() external view returns (address);
    function liquidityUtilizationCurrent() external view returns (uint256);
    function liquidityUtilizationPostRelay(uint256 relayedAmount) external view returns (uint256);
});

crate::bindings!(RateModelStore {
    function l1TokenRateModels(address l1Token) external view returns (string);
} deployments: maplit::hashmap! {
    MAINNET => address!("0xd18fFeb5fdd1F2e122251eA7Bf357D8Af0B60B50"),
});

pub use alloy::providers::DynProvider as Provider;

/// Contracts with a well-known address per network.
pub trait InstanceExt: Sized {
    /// Connects to the deployment on the chain `provider` talks to.
    fn deployed(
        provider: &Provider,
    ) -> impl std::future::Future<Output = anyhow::Result<Self>> + Send;
}

/// Generates a module named after the contract containing the `sol!`
/// bindings of `interface` and an `Instance` alias for them.
///
/// An optional `deployments:` map from chain id to address additionally
/// generates `DEPLOYMENT_INFO` and implements [`InstanceExt`].
#[macro_export]
macro_rules! bindings {
    ($contract:ident { $($interface:tt)* } $(deployments: $deployments:expr)? $(,)?) => {
        paste::paste! {
            #[allow(non_snake_case)]
            mod [<$contract Sol>] {
                alloy::sol!(
                    #[allow(missing_docs)]
                    #[sol(rpc)]
                    interface $contract {
                        $($interface)*
                    }
                );
            }

            #[allow(non_snake_case)]
            pub mod $contract {
                pub use super::[<$contract Sol>]::$contract::*;

                pub type Instance = [<$contract Instance>]<alloy::providers::DynProvider>;

                $(
                pub static DEPLOYMENT_INFO: std::sync::LazyLock<
                    std::collections::HashMap<u64, alloy::primitives::Address>,
                > = std::sync::LazyLock::new(|| {
                    #[allow(unused_imports)]
                    use {alloy::primitives::address, $crate::alloy::networks::*};
                    $deployments
                });

                impl $crate::alloy::InstanceExt for Instance {
                    fn deployed(
                        provider: &alloy::providers::DynProvider,
                    ) -> impl std::future::Future<Output = anyhow::Result<Self>> + Send {
                        use {alloy::providers::Provider as _, anyhow::Context as _};

                        async move {
                            let chain_id = provider
                                .get_chain_id()
                                .await
                                .context("could not fetch current chain id")?;
                            let address = DEPLOYMENT_INFO.get(&chain_id).with_context(|| {
                                format!(
                                    "{} is not deployed on chain {chain_id}",
                                    stringify!($contract)
                                )
                            })?;
                            Ok(Self::new(*address, provider.clone()))
                        }
                    }
                }
                )?
            }
        }
    };
}
