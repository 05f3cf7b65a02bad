//! LP fee quoting for relays through Across bridge pools.

pub mod arguments;
pub mod estimator;
pub mod pool;

pub use {
    estimator::{LpFeeEstimator, LpFeeQuote},
    pool::{BuiltinRateModels, OnchainPools, PoolQuerying},
};

use {
    crate::arguments::{Arguments, Command, QuoteArguments, SuggestedFeesArguments},
    across_api::{AcrossApi, DefaultAcrossApi, SuggestedFeesQuery},
    alloy::providers::Provider,
    anyhow::{Context, Result},
    block_finder::{BlockLocator, BlockTimes},
    contracts::{InstanceExt, RateModelStore},
    std::sync::Arc,
};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),

    #[error("timestamp {timestamp} is before the first block of the chain")]
    OutOfRange { timestamp: u64 },

    #[error("invalid rate model: {0}")]
    InvalidRateModel(String),

    #[error(transparent)]
    Upstream(#[from] anyhow::Error),
}

impl Error {
    /// Short name for metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::InvalidInput(_) => "invalid_input",
            Self::OutOfRange { .. } => "out_of_range",
            Self::InvalidRateModel(_) => "invalid_rate_model",
            Self::Upstream(_) => "upstream",
        }
    }
}

impl From<block_finder::Error> for Error {
    fn from(err: block_finder::Error) -> Self {
        match err {
            block_finder::Error::OutOfRange { timestamp } => Self::OutOfRange { timestamp },
            err @ block_finder::Error::Inconsistent(_) => Self::Upstream(err.into()),
            block_finder::Error::Upstream(err) => Self::Upstream(err),
        }
    }
}

impl From<rate_model::Error> for Error {
    fn from(err: rate_model::Error) -> Self {
        match err {
            rate_model::Error::InvalidInput(message) => Self::InvalidInput(message),
            rate_model::Error::InvalidRateModel(message) => Self::InvalidRateModel(message),
        }
    }
}

pub async fn run(args: Arguments) -> Result<()> {
    match args.command {
        Command::Quote(args) => quote(args).await,
        Command::SuggestedFees(args) => suggested_fees(args).await,
    }
}

async fn quote(args: QuoteArguments) -> Result<()> {
    let provider = ethrpc::provider(args.node_url);
    let chain_id = provider
        .get_chain_id()
        .await
        .context("could not fetch current chain id")?;

    let block_times = args
        .average_block_time
        .iter()
        .fold(BlockTimes::default(), |times, entry| {
            times.with_chain(entry.chain_id, entry.block_time)
        });
    let mut locator =
        BlockLocator::new(Arc::new(provider.clone()), chain_id).with_block_times(block_times);
    if let Some(capacity) = args.block_cache_size {
        locator = locator.with_cache_capacity(capacity);
    }

    let rate_model_store = match args.rate_model_store {
        Some(address) => RateModelStore::Instance::new(address, provider.clone()),
        None => RateModelStore::Instance::deployed(&provider).await?,
    };
    let onchain = OnchainPools::new(provider, rate_model_store);
    let pools: Arc<dyn PoolQuerying> = if args.builtin_rate_models {
        Arc::new(BuiltinRateModels::new(onchain))
    } else {
        Arc::new(onchain)
    };
    let token = match args.token {
        Some(token) => token,
        None => pools.l1_token(args.bridge_pool).await?,
    };

    let estimator = LpFeeEstimator::new(locator, pools);
    let quote = estimator
        .quote_detailed(token, args.bridge_pool, args.amount, args.timestamp)
        .await?;
    println!("{}", serde_json::to_string_pretty(&quote)?);
    Ok(())
}

async fn suggested_fees(args: SuggestedFeesArguments) -> Result<()> {
    let api = DefaultAcrossApi::new(args.across_api_url, reqwest::Client::new())?;
    let fees = api
        .suggested_fees(SuggestedFeesQuery {
            l2_token: args.l2_token,
            chain_id: args.origin_chain_id,
            amount: args.amount,
        })
        .await?;
    println!("{}", serde_json::to_string_pretty(&fees)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use {super::*, anyhow::anyhow};

    #[test]
    fn converts_block_finder_errors() {
        assert!(matches!(
            Error::from(block_finder::Error::OutOfRange { timestamp: 3 }),
            Error::OutOfRange { timestamp: 3 }
        ));
        let err = Error::from(block_finder::Error::Inconsistent("5 after 6".to_owned()));
        assert!(matches!(&err, Error::Upstream(_)));
        assert!(err.to_string().contains("5 after 6"));
        assert!(matches!(
            Error::from(block_finder::Error::Upstream(anyhow!("timeout"))),
            Error::Upstream(_)
        ));
    }

    #[test]
    fn converts_rate_model_errors() {
        assert!(matches!(
            Error::from(rate_model::Error::InvalidInput("zero")),
            Error::InvalidInput("zero")
        ));
        let err = Error::from(rate_model::Error::InvalidRateModel("UBar".to_owned()));
        assert_eq!(err.label(), "invalid_rate_model");
    }
}
