use {
    alloy::primitives::{Address, U256},
    anyhow::{Context, ensure},
    clap::{Args, Parser, Subcommand},
    std::{
        fmt::{self, Display, Formatter},
        num::NonZeroUsize,
        str::FromStr,
        time::Duration,
    },
    tracing::level_filters::LevelFilter,
    url::Url,
};

/// Quote LP fees of relays through Across bridge pools
#[derive(Parser)]
#[command(version)]
pub struct Arguments {
    #[clap(long, env, default_value = "warn")]
    pub log_filter: String,

    #[clap(long, env, default_value = "error")]
    pub log_stderr_threshold: LevelFilter,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Computes the LP fee of a relay from on-chain pool state.
    Quote(QuoteArguments),
    /// Fetches the relayer fees currently suggested by the Across API.
    SuggestedFees(SuggestedFeesArguments),
}

#[derive(Args)]
pub struct QuoteArguments {
    /// The Ethereum node URL to connect to.
    #[clap(long, env, default_value = "http://localhost:8545")]
    pub node_url: Url,

    /// Bridge pool the relay goes through.
    #[clap(long, env)]
    pub bridge_pool: Address,

    /// L1 token of the pool. Read from the pool when omitted.
    #[clap(long, env)]
    pub token: Option<Address>,

    /// Amount to relay in atoms of the token.
    #[clap(long, env)]
    pub amount: U256,

    /// Unix timestamp in seconds whose chain state to quote at. Defaults to
    /// the latest block.
    #[clap(long, env)]
    pub timestamp: Option<u64>,

    /// Maximum number of blocks kept while searching for the block of
    /// `timestamp`. Unbounded by default.
    #[clap(long, env)]
    pub block_cache_size: Option<NonZeroUsize>,

    /// Average block time overrides as `<chain id>=<seconds>` pairs, e.g.
    /// `10=2,42161=0.25`.
    #[clap(long, env, value_delimiter = ',')]
    pub average_block_time: Vec<BlockTimeOverride>,

    /// Address of the rate model store. Defaults to the known deployment of
    /// the connected chain.
    #[clap(long, env)]
    pub rate_model_store: Option<Address>,

    /// Use the rate models built into this binary instead of reading them
    /// from the rate model store. Only tokens supported at launch have one.
    #[clap(long, env, action = clap::ArgAction::Set, default_value = "false")]
    pub builtin_rate_models: bool,
}

#[derive(Args)]
pub struct SuggestedFeesArguments {
    #[clap(long, env, default_value = across_api::DefaultAcrossApi::DEFAULT_URL)]
    pub across_api_url: Url,

    /// Token to transfer on the origin chain. Use the zero address for ETH.
    #[clap(long, env)]
    pub l2_token: Address,

    /// Chain the transfer originates from.
    #[clap(long, env)]
    pub origin_chain_id: u64,

    /// Amount to transfer in atoms of the token.
    #[clap(long, env)]
    pub amount: U256,
}

/// Average block time of a single chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BlockTimeOverride {
    pub chain_id: u64,
    pub block_time: Duration,
}

impl FromStr for BlockTimeOverride {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (chain_id, seconds) = s
            .split_once('=')
            .context("expected <chain id>=<seconds>")?;
        let chain_id = chain_id.trim().parse().context("chain id")?;
        let seconds: f64 = seconds.trim().parse().context("block time")?;
        ensure!(seconds > 0., "block time must be positive");
        let block_time = Duration::try_from_secs_f64(seconds).context("block time")?;
        Ok(Self {
            chain_id,
            block_time,
        })
    }
}

impl Display for BlockTimeOverride {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.chain_id, self.block_time.as_secs_f64())
    }
}

fn display_option(f: &mut Formatter<'_>, name: &str, option: &Option<impl Display>) -> fmt::Result {
    write!(f, "{name}: ")?;
    match option {
        Some(display) => writeln!(f, "{display}"),
        None => writeln!(f, "None"),
    }
}

impl Display for Arguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            log_filter,
            log_stderr_threshold,
            command,
        } = self;

        writeln!(f, "log_filter: {log_filter}")?;
        writeln!(f, "log_stderr_threshold: {log_stderr_threshold}")?;
        match command {
            Command::Quote(args) => write!(f, "{args}"),
            Command::SuggestedFees(args) => write!(f, "{args}"),
        }
    }
}

impl Display for QuoteArguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            node_url: _,
            bridge_pool,
            token,
            amount,
            timestamp,
            block_cache_size,
            average_block_time,
            rate_model_store,
            builtin_rate_models,
        } = self;

        writeln!(f, "node_url: SECRET")?;
        writeln!(f, "bridge_pool: {bridge_pool}")?;
        display_option(f, "token", token)?;
        writeln!(f, "amount: {amount}")?;
        display_option(f, "timestamp", timestamp)?;
        display_option(f, "block_cache_size", block_cache_size)?;
        writeln!(f, "average_block_time: {average_block_time:?}")?;
        display_option(f, "rate_model_store", rate_model_store)?;
        writeln!(f, "builtin_rate_models: {builtin_rate_models}")?;
        Ok(())
    }
}

impl Display for SuggestedFeesArguments {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let Self {
            across_api_url,
            l2_token,
            origin_chain_id,
            amount,
        } = self;

        writeln!(f, "across_api_url: {across_api_url}")?;
        writeln!(f, "l2_token: {l2_token}")?;
        writeln!(f, "origin_chain_id: {origin_chain_id}")?;
        writeln!(f, "amount: {amount}")?;
        Ok(())
    }
}
