use tracing_subscriber::EnvFilter;

/// Install the stderr subscriber; `RUST_LOG` overrides the default `warn` level
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
