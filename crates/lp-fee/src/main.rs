use clap::Parser;

#[tokio::main]
async fn main() {
    let args = lp_fee::arguments::Arguments::parse();
    observe::tracing::initialize(&args.log_filter, args.log_stderr_threshold);
    if let Err(err) = observe::metrics::setup_registry(Some("lp_fee".into())) {
        tracing::warn!(?err, "failed to set up metrics registry");
    }
    tracing::info!("running lp-fee with validated arguments:\n{}", args);

    let result = lp_fee::run(args).await;
    match observe::metrics::encode(observe::metrics::get_registry()) {
        Ok(metrics) => tracing::debug!("metrics:\n{metrics}"),
        Err(err) => tracing::warn!(?err, "failed to encode metrics"),
    }
    if let Err(err) = result {
        tracing::error!(?err, "lp-fee failed");
        std::process::exit(1);
    }
}
