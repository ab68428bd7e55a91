//! Tracing initialisation for the `dust-build` binary.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Environment variable holding a tracing filter, e.g. `DUST_LOG=debug`.
pub const LOG_ENV: &str = "DUST_LOG";

/// Install the global subscriber, writing to stderr.
///
/// `DUST_LOG` takes precedence over `level`. Only the first call has an effect.
pub fn init_tracing(level: Level) {
    let env_filter =
        EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(level.as_str()));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .ok();
}
