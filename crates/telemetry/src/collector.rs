//! Trend collector: the never-raise wrapper over the time-series boundary.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tracing::warn;

use edgemind_core::{Enterprise, EquipmentState};

use crate::point::{MetricsSource, TrendPoint};

/// Pulls a trailing window of aggregated metric points.
///
/// A source failure resolves to an empty result and a warn log; at the
/// scheduler level a quiet tick is indistinguishable from a data-source
/// outage. That trade is deliberate: the next tick proceeds normally either
/// way.
pub struct TrendCollector<S: MetricsSource> {
    source: Arc<S>,
    window: Duration,
    granularity: Duration,
}

impl<S: MetricsSource> TrendCollector<S> {
    /// Default sampling: 5-minute trailing window at 1-minute granularity.
    pub fn new(source: Arc<S>) -> Self {
        Self {
            source,
            window: Duration::from_secs(5 * 60),
            granularity: Duration::from_secs(60),
        }
    }

    pub fn with_window(mut self, window: Duration, granularity: Duration) -> Self {
        self.window = window;
        self.granularity = granularity;
        self
    }

    /// Collect trend points; never raises.
    pub async fn collect_trends(&self) -> Vec<TrendPoint> {
        match self.source.query_trends(self.window, self.granularity).await {
            Ok(points) => points,
            Err(e) => {
                warn!(error = %e, "trend query failed; treating tick as quiet");
                Vec::new()
            }
        }
    }

    /// Collect the live equipment-state table; never raises.
    pub async fn collect_states(&self) -> HashMap<String, (Enterprise, EquipmentState)> {
        match self.source.equipment_states().await {
            Ok(states) => states,
            Err(e) => {
                warn!(error = %e, "equipment-state query failed; treating table as empty");
                HashMap::new()
            }
        }
    }
}
