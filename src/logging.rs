use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Diagnostics go to stderr so they never mix with relayed command stdout.
/// `RUST_LOG` overrides the `--debug` default.
pub fn init(debug: bool) {
    let default = if debug { "devenv=debug" } else { "devenv=warn" };

    let _ = tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .try_init();
}
