pub mod blocks;

pub use blocks::{Block, BlockRetrieving};
#[cfg(any(test, feature = "test-util"))]
pub use blocks::MockBlockRetrieving;
use {
    alloy::{
        providers::{DynProvider, Provider, ProviderBuilder},
        rpc::client::ClientBuilder,
    },
    url::Url,
};

pub type AlloyProvider = DynProvider;

/// Creates a provider talking to the node at `url` over HTTP.
pub fn provider(url: Url) -> AlloyProvider {
    let rpc = ClientBuilder::default().http(url);
    ProviderBuilder::new().connect_client(rpc).erased()
}

#[cfg(any(test, feature = "test-util"))]
pub fn mock_provider(asserter: alloy::providers::mock::Asserter) -> AlloyProvider {
    ProviderBuilder::new()
        .connect_mocked_client(asserter)
        .erased()
}
