//! Delta detector: pure comparison of two snapshots.

use serde::{Deserialize, Serialize};

use edgemind_core::{Enterprise, EquipmentState};

use crate::snapshot::MetricsSnapshot;

/// Direction of a metric movement.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increased,
    Decreased,
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Direction::Increased => f.write_str("increased"),
            Direction::Decreased => f.write_str("decreased"),
        }
    }
}

/// A detected deviation between two snapshots.
///
/// Ephemeral: produced and consumed within a single tick, then discarded.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    Metric {
        enterprise: Enterprise,
        measurement: String,
        previous_value: f64,
        current_value: f64,
        /// Magnitude in percent of the previous value; direction is separate.
        change_pct: f64,
        direction: Direction,
    },
    StateTransition {
        equipment: String,
        enterprise: Enterprise,
        previous_state: EquipmentState,
        current_state: EquipmentState,
    },
}

impl Change {
    pub fn enterprise(&self) -> Enterprise {
        match self {
            Change::Metric { enterprise, .. } | Change::StateTransition { enterprise, .. } => {
                *enterprise
            }
        }
    }
}

/// Compare `current` against `previous` at `threshold_pct`.
///
/// Pure and deterministic. Cold-start policy: with no previous snapshot the
/// result is empty — the first snapshot is never diffed against anything, so
/// an anomaly already present at start-up is not detected until the next tick
/// shows further movement. Documented limitation, kept on purpose.
pub fn detect_changes(
    current: &MetricsSnapshot,
    previous: Option<&MetricsSnapshot>,
    threshold_pct: f64,
) -> Vec<Change> {
    let Some(previous) = previous else {
        return Vec::new();
    };

    let mut changes = Vec::new();

    for (key, &current_value) in &current.metrics {
        let Some(&previous_value) = previous.metrics.get(key) else {
            continue;
        };
        // Cannot express a percentage of zero (or garbage).
        if previous_value == 0.0 || !previous_value.is_finite() || !current_value.is_finite() {
            continue;
        }

        let change_pct = ((current_value - previous_value).abs() / previous_value.abs()) * 100.0;
        if change_pct >= threshold_pct {
            changes.push(Change::Metric {
                enterprise: key.enterprise,
                measurement: key.measurement.clone(),
                previous_value,
                current_value,
                change_pct,
                direction: if current_value >= previous_value {
                    Direction::Increased
                } else {
                    Direction::Decreased
                },
            });
        }
    }

    for (equipment, entry) in &current.equipment_states {
        let Some(previous_entry) = previous.equipment_states.get(equipment) else {
            continue;
        };
        if previous_entry.state == entry.state {
            continue;
        }
        // Only transitions that enter or exit a concerning state carry signal.
        if !previous_entry.state.is_concerning() && !entry.state.is_concerning() {
            continue;
        }
        changes.push(Change::StateTransition {
            equipment: equipment.clone(),
            enterprise: entry.enterprise,
            previous_state: previous_entry.state,
            current_state: entry.state,
        });
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{EquipmentEntry, MetricKey};
    use chrono::Utc;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn snapshot(metrics: Vec<(Enterprise, &str, f64)>) -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            metrics: metrics
                .into_iter()
                .map(|(e, m, v)| (MetricKey::new(e, m), v))
                .collect(),
            equipment_states: HashMap::new(),
        }
    }

    fn with_equipment(
        mut snap: MetricsSnapshot,
        equipment: &str,
        enterprise: Enterprise,
        state: EquipmentState,
    ) -> MetricsSnapshot {
        snap.equipment_states
            .insert(equipment.to_string(), EquipmentEntry { enterprise, state });
        snap
    }

    #[test]
    fn availability_drop_eighty_to_sixty_is_twenty_five_pct_decrease() {
        let previous = snapshot(vec![(Enterprise::B, "availability", 80.0)]);
        let current = snapshot(vec![(Enterprise::B, "availability", 60.0)]);

        let changes = detect_changes(&current, Some(&previous), 5.0);
        assert_eq!(changes.len(), 1);
        match &changes[0] {
            Change::Metric { enterprise, measurement, change_pct, direction, .. } => {
                assert_eq!(*enterprise, Enterprise::B);
                assert_eq!(measurement, "availability");
                assert!((change_pct - 25.0).abs() < 1e-9);
                assert_eq!(*direction, Direction::Decreased);
            }
            other => panic!("expected a metric change, got {other:?}"),
        }
    }

    #[test]
    fn threshold_boundary_is_inclusive() {
        let previous = snapshot(vec![(Enterprise::A, "oee", 100.0)]);

        // Exactly at threshold: reported.
        let at = snapshot(vec![(Enterprise::A, "oee", 105.0)]);
        assert_eq!(detect_changes(&at, Some(&previous), 5.0).len(), 1);

        // Below threshold: silent.
        let below = snapshot(vec![(Enterprise::A, "oee", 104.0)]);
        assert!(detect_changes(&below, Some(&previous), 5.0).is_empty());
    }

    #[test]
    fn zero_previous_value_is_skipped() {
        let previous = snapshot(vec![(Enterprise::A, "waste", 0.0)]);
        let current = snapshot(vec![(Enterprise::A, "waste", 12.0)]);
        assert!(detect_changes(&current, Some(&previous), 5.0).is_empty());
    }

    #[test]
    fn entering_down_is_reported_running_to_running_is_not() {
        let base = snapshot(vec![]);
        let previous =
            with_equipment(base.clone(), "CNC-07", Enterprise::B, EquipmentState::Running);
        let current =
            with_equipment(base.clone(), "CNC-07", Enterprise::B, EquipmentState::Down);

        let changes = detect_changes(&current, Some(&previous), 5.0);
        assert_eq!(changes.len(), 1);
        assert!(matches!(
            &changes[0],
            Change::StateTransition {
                previous_state: EquipmentState::Running,
                current_state: EquipmentState::Down,
                ..
            }
        ));

        let unchanged = detect_changes(&previous, Some(&previous), 5.0);
        assert!(unchanged.is_empty());
    }

    #[test]
    fn recovering_from_down_is_reported() {
        let base = snapshot(vec![]);
        let previous =
            with_equipment(base.clone(), "MIX-02", Enterprise::C, EquipmentState::Down);
        let current =
            with_equipment(base, "MIX-02", Enterprise::C, EquipmentState::Running);

        assert_eq!(detect_changes(&current, Some(&previous), 5.0).len(), 1);
    }

    proptest! {
        /// Cold-start law: with no previous snapshot, no changes, ever.
        #[test]
        fn cold_start_yields_no_changes(
            values in proptest::collection::vec((0usize..3, 0usize..5, -1e6f64..1e6), 0..20),
            threshold in 0.0f64..100.0,
        ) {
            let metrics = values
                .into_iter()
                .map(|(e, m, v)| (Enterprise::ALL[e], TRACKED[m], v))
                .collect::<Vec<_>>();
            let current = snapshot(metrics);
            prop_assert!(detect_changes(&current, None, threshold).is_empty());
        }

        /// Movements strictly below threshold never surface.
        #[test]
        fn below_threshold_is_never_reported(
            previous_value in 1.0f64..1e4,
            fraction in 0.0f64..0.99,
            threshold in 1.0f64..50.0,
        ) {
            let delta = previous_value * (threshold / 100.0) * fraction;
            let previous = snapshot(vec![(Enterprise::A, "oee", previous_value)]);
            let current = snapshot(vec![(Enterprise::A, "oee", previous_value + delta)]);
            prop_assert!(detect_changes(&current, Some(&previous), threshold).is_empty());
        }
    }

    const TRACKED: [&str; 5] = ["oee", "availability", "performance", "quality", "waste"];
}
