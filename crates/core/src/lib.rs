//! `edgemind-core` — domain foundation building blocks.
//!
//! This crate contains **pure domain** primitives (no infrastructure concerns):
//! the enterprise/equipment/severity vocabulary shared by every tier of the
//! analysis engine, and the `Insight` family the reasoning tiers produce.

pub mod enterprise;
pub mod equipment;
pub mod error;
pub mod insight;
pub mod severity;
pub mod tier;

pub use enterprise::{Enterprise, EnterpriseFocus};
pub use equipment::EquipmentState;
pub use error::{DomainError, DomainResult};
pub use insight::{Anomaly, DegradedFlags, Insight, TrendObservation, WasteAlert};
pub use severity::Severity;
pub use tier::AnalysisTier;
