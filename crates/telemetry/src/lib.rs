//! `edgemind-telemetry` — trend collection, snapshots, and change detection.
//!
//! This crate is the cheap tier of the analysis engine: it pulls a trailing
//! window of aggregated metric points from the time-series store (an external
//! collaborator behind [`MetricsSource`]), reduces them into comparable
//! snapshots, and diffs consecutive snapshots with a pure, deterministic
//! detector. Nothing here talks to the reasoning service.

pub mod collector;
pub mod delta;
pub mod point;
pub mod snapshot;

pub use collector::TrendCollector;
pub use delta::{detect_changes, Change, Direction};
pub use point::{MetricsSource, SourceError, TrendPoint};
pub use snapshot::{build_snapshot, EquipmentEntry, MetricKey, MetricsSnapshot, TRACKED_MEASUREMENTS};
