//! Tracing/logging initialization for the analysis engine.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset: the engine's own crates at info,
/// everything else (tokio, hyper-level noise from future backends) at warn.
const DEFAULT_FILTER: &str = "warn,edgemind=info,edgemind_core=info,edgemind_telemetry=info,\
                              edgemind_reasoning=info,edgemind_engine=info";

/// Initialize tracing/logging for the process.
///
/// Safe to call multiple times (subsequent calls are no-ops). Tick bodies log
/// structured fields, so output is JSON for downstream collection.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .json()
        .with_timer(tracing_subscriber::fmt::time::SystemTime)
        .with_target(false)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent() {
        init();
        init();
    }

    #[test]
    fn default_filter_parses() {
        assert!(DEFAULT_FILTER.parse::<EnvFilter>().is_ok());
    }
}
