//! Across HTTP API client implementation.
//!
//! For more information on the HTTP API, consult:
//! <https://docs.across.to/reference/api>

use {
    alloy::primitives::{Address, U256},
    anyhow::{Context, Result},
    number::serialization::DecimalU256,
    reqwest::{Client, IntoUrl, StatusCode},
    serde::{Deserialize, Serialize},
    serde_with::serde_as,
    url::Url,
};

/// Query parameters of the suggested fees endpoint.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct SuggestedFeesQuery {
    /// Token to transfer on the origin chain. Use the zero address for ETH.
    pub l2_token: Address,
    /// Chain the transfer originates from.
    pub chain_id: u64,
    /// Amount to transfer in atoms of `l2_token`.
    pub amount: U256,
}

impl SuggestedFeesQuery {
    fn format_url(&self, endpoint: &Url) -> Url {
        let mut url = endpoint.clone();
        url.query_pairs_mut()
            .append_pair("amount", &self.amount.to_string())
            .append_pair("chainId", &self.chain_id.to_string())
            .append_pair("l2Token", &format!("{:#x}", self.l2_token));
        url
    }
}

/// Relayer fees as a fraction of the transferred amount, in WAD.
#[serde_as]
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedFees {
    #[serde_as(as = "DecimalU256")]
    pub slow_fee_pct: U256,
    #[serde_as(as = "DecimalU256")]
    pub instant_fee_pct: U256,
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The API answered with anything but `200 OK`, e.g. `400` for invalid
    /// input or fees above 25% of the amount.
    #[error("suggested fees request failed with {status}: {body}")]
    Upstream { status: StatusCode, body: String },

    // Connectivity or non-response error
    #[error("failed on send")]
    Send(#[source] reqwest::Error),

    #[error("failed to deserialize response {body:?}")]
    Deserialize {
        #[source]
        source: serde_json::Error,
        body: String,
    },
}

/// Abstract Across API. Provides a mockable implementation.
#[cfg_attr(any(test, feature = "test-util"), mockall::automock)]
#[async_trait::async_trait]
pub trait AcrossApi: Send + Sync + 'static {
    /// Retrieves the fees a relayer currently asks for a transfer.
    async fn suggested_fees(&self, query: SuggestedFeesQuery) -> Result<SuggestedFees, Error>;
}

/// Across API client implementation.
#[derive(Clone, Debug)]
pub struct DefaultAcrossApi {
    client: Client,
    endpoint: Url,
}

impl DefaultAcrossApi {
    /// Default Across API URL.
    pub const DEFAULT_URL: &'static str = "https://across.to/api/";

    /// Creates a new client for the API hosted at `base_url`.
    pub fn new(base_url: impl IntoUrl, client: Client) -> Result<Self> {
        let mut base_url = base_url.into_url().context("across api url")?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        let endpoint = base_url
            .join("suggested-fees")
            .context("suggested fees url")?;
        Ok(Self { client, endpoint })
    }
}

#[async_trait::async_trait]
impl AcrossApi for DefaultAcrossApi {
    async fn suggested_fees(&self, query: SuggestedFeesQuery) -> Result<SuggestedFees, Error> {
        let url = query.format_url(&self.endpoint);
        tracing::debug!(%url, "querying Across API");

        let response = self.client.get(url).send().await.map_err(Error::Send)?;
        let status = response.status();
        let body = response.text().await.map_err(Error::Send)?;
        tracing::debug!(%status, %body, "response from Across API");

        if status != StatusCode::OK {
            return Err(Error::Upstream { status, body });
        }
        serde_json::from_str(&body).map_err(|source| Error::Deserialize { source, body })
    }
}
