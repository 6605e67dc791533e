use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

pub(crate) const LOG_ENV: &str = "UPLIFT_LOG";

pub(crate) fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .try_init();
}
