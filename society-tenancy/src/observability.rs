//! Tracing setup for binaries and test harnesses embedding the resolver.
//!
//! The library itself only emits `tracing` events; installing a
//! subscriber is left to the host unless the `subscriber` feature is on.

/// Default directive used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "society_tenancy=info";

/// Install a global fmt subscriber.
///
/// `filter` is used when `RUST_LOG` is not set. With `json` the output
/// is one JSON object per line. Returns an error if a global subscriber
/// is already installed.
#[cfg(feature = "subscriber")]
pub fn init_tracing(filter: Option<&str>, json: bool) -> anyhow::Result<()> {
    use tracing_subscriber::EnvFilter;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(filter.unwrap_or(DEFAULT_FILTER)))?;

    let builder = tracing_subscriber::fmt().with_env_filter(env_filter);
    if json {
        builder
            .json()
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
    } else {
        builder
            .try_init()
            .map_err(|e| anyhow::anyhow!("failed to install tracing subscriber: {e}"))
    }
}
