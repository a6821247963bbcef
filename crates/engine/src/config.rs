//! Engine configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Tunables for the tiered analysis engine.
///
/// Mutated only via the engine's explicit `pause`/`resume`/`configure` calls;
/// every tick reads a fresh copy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Cadence of the cheap local diff (tier 1).
    pub check_interval: Duration,
    /// Cadence of the comprehensive summary (tier 3).
    pub summary_interval: Duration,
    /// Metric movement (percent of previous value) worth escalating.
    pub change_threshold_pct: f64,
    /// How long a reported anomaly suppresses repeats of its dedup triple.
    pub anomaly_cache_ttl: Duration,
    /// Delay before the one-shot warm-up analysis after `start()`.
    pub warmup_delay: Duration,
    pub is_paused: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            check_interval: Duration::from_secs(60),
            summary_interval: Duration::from_secs(30 * 60),
            change_threshold_pct: 5.0,
            anomaly_cache_ttl: Duration::from_secs(15 * 60),
            warmup_delay: Duration::from_secs(20),
            is_paused: false,
        }
    }
}
