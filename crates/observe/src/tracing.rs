use {
    std::{io::IsTerminal, panic::PanicHookInfo, sync::Once},
    time::macros::format_description,
    tracing::level_filters::LevelFilter,
    tracing_subscriber::{
        EnvFilter,
        Layer,
        fmt::{time::UtcTime, writer::MakeWriterExt as _},
        prelude::*,
        util::SubscriberInitExt,
    },
};

/// Installs the global subscriber and routes panics through it.
///
/// `env_filter` uses the `EnvFilter` directive syntax, e.g.
/// `warn,lp_fee=debug`. Events at `stderr_threshold` or more severe go to
/// stderr, the rest to stdout.
pub fn initialize(env_filter: &str, stderr_threshold: LevelFilter) {
    install(env_filter, stderr_threshold);
}

/// [`initialize`] for tests: only the first call in a process has an effect.
pub fn initialize_reentrant(env_filter: &str) {
    static INIT: Once = Once::new();
    INIT.call_once(|| install(env_filter, LevelFilter::ERROR));
}

fn install(env_filter: &str, stderr_threshold: LevelFilter) {
    let stderr_level = stderr_threshold
        .into_level()
        .unwrap_or(tracing::Level::ERROR);
    let writer = std::io::stdout
        .with_min_level(stderr_level)
        .or_else(std::io::stderr);
    let timer = UtcTime::new(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ));

    let layer = tracing_subscriber::fmt::layer()
        .with_writer(writer)
        .with_timer(timer)
        .with_ansi(std::io::stdout().is_terminal())
        .with_filter(EnvFilter::new(env_filter));
    tracing_subscriber::registry().with(layer).init();
    std::panic::set_hook(Box::new(log_panic));
    tracing::debug!(%env_filter, "initialized tracing");
}

/// Logs panics as errors, including a backtrace, so they end up wherever the
/// rest of the logs go.
fn log_panic(panic: &PanicHookInfo) {
    let thread = std::thread::current();
    let backtrace = std::backtrace::Backtrace::force_capture();
    tracing::error!(
        thread = thread.name().unwrap_or("<unnamed>"),
        "{panic}\nstack backtrace:\n{backtrace}"
    );
}
