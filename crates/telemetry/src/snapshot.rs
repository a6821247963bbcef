//! Snapshot builder: reduce raw points into a comparable metric map.

use chrono::{DateTime, Utc};
use std::collections::HashMap;

use edgemind_core::{Enterprise, EquipmentState};

use crate::point::TrendPoint;

/// Key metric names worth comparing tick over tick.
///
/// The allow-list keeps the diff focused: the store carries dozens of
/// measurements, and comparing all of them would drown real movement in
/// sensor noise.
pub const TRACKED_MEASUREMENTS: [&str; 5] =
    ["oee", "availability", "performance", "quality", "waste"];

/// Per-enterprise metric key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MetricKey {
    pub enterprise: Enterprise,
    pub measurement: String,
}

impl MetricKey {
    pub fn new(enterprise: Enterprise, measurement: impl Into<String>) -> Self {
        Self { enterprise, measurement: measurement.into() }
    }
}

impl core::fmt::Display for MetricKey {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}::{}", self.enterprise, self.measurement)
    }
}

/// One row of the flattened equipment-state table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EquipmentEntry {
    pub enterprise: Enterprise,
    pub state: EquipmentState,
}

/// Point-in-time reduction of metric averages and equipment states.
///
/// Exactly one previous snapshot is retained by the engine; it is replaced
/// atomically after every tick that queried fresh data, whether or not
/// analysis ran.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricsSnapshot {
    pub timestamp: DateTime<Utc>,
    pub metrics: HashMap<MetricKey, f64>,
    pub equipment_states: HashMap<String, EquipmentEntry>,
}

impl MetricsSnapshot {
    pub fn metric(&self, enterprise: Enterprise, measurement: &str) -> Option<f64> {
        self.metrics.get(&MetricKey::new(enterprise, measurement)).copied()
    }
}

/// Average tracked measurements per (enterprise, measurement) and flatten the
/// live equipment-state table.
pub fn build_snapshot(
    points: &[TrendPoint],
    equipment_states: &HashMap<String, (Enterprise, EquipmentState)>,
) -> MetricsSnapshot {
    let mut sums: HashMap<MetricKey, (f64, u32)> = HashMap::new();

    for point in points {
        if !TRACKED_MEASUREMENTS.contains(&point.measurement.as_str()) {
            continue;
        }
        if !point.value.is_finite() {
            continue;
        }
        let entry = sums
            .entry(MetricKey::new(point.enterprise, point.measurement.as_str()))
            .or_insert((0.0, 0));
        entry.0 += point.value;
        entry.1 += 1;
    }

    let metrics = sums
        .into_iter()
        .map(|(key, (sum, count))| (key, sum / f64::from(count)))
        .collect();

    let equipment_states = equipment_states
        .iter()
        .map(|(id, (enterprise, state))| {
            (id.clone(), EquipmentEntry { enterprise: *enterprise, state: *state })
        })
        .collect();

    MetricsSnapshot { timestamp: Utc::now(), metrics, equipment_states }
}
