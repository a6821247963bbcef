//! Trend points and the time-series source boundary.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use edgemind_core::{Enterprise, EquipmentState};

/// One aggregated metric point from the time-series store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub measurement: String,
    pub enterprise: Enterprise,
    pub site: String,
    pub area: String,
    pub time: DateTime<Utc>,
    pub value: f64,
}

/// Failure at the time-series boundary.
///
/// This error never crosses the collector: a failing source resolves to an
/// empty result at the tier above.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("time-series query failed: {0}")]
    Query(String),

    #[error("time-series store unavailable: {0}")]
    Unavailable(String),
}

/// Pull boundary to the time-series store and the live equipment-state table.
///
/// Implementations wrap whatever backend actually holds the telemetry; the
/// engine only ever sees ordered points and a flat state table.
#[async_trait]
pub trait MetricsSource: Send + Sync + 'static {
    /// Trailing-window aggregated points, ordered by time, possibly empty.
    async fn query_trends(
        &self,
        window: Duration,
        granularity: Duration,
    ) -> Result<Vec<TrendPoint>, SourceError>;

    /// Current equipment states, keyed by equipment id.
    async fn equipment_states(
        &self,
    ) -> Result<HashMap<String, (Enterprise, EquipmentState)>, SourceError>;
}
