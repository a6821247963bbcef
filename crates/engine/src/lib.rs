//! `edgemind-engine` — tiered analysis engine: state, dedup, processing, scheduling.
//!
//! Control flows top-down from the [`TierScheduler`]; data flows bottom-up
//! (collector → snapshot → detector → orchestrator → processor). All shared
//! mutable state lives in one explicitly owned [`AnalysisEngine`] instance,
//! passed by reference to the scheduler and processor; external status
//! queries read a copy and never block the tick path.

pub mod config;
pub mod dedup;
pub mod engine;
pub mod history;
pub mod processor;
pub mod scheduler;
pub mod sinks;

pub use config::AnalysisConfig;
pub use dedup::{AnomalyCacheEntry, AnomalyDedupCache};
pub use engine::{AnalysisEngine, ConversationGuard, EngineStatus};
pub use history::BoundedHistory;
pub use processor::InsightProcessor;
pub use scheduler::{SchedulerState, TierScheduler};
pub use sinks::{
    AnomalyStore, InMemoryAnomalyStore, InMemoryInsightBroadcast, InMemoryTicketSink,
    InsightBroadcast, TicketSink,
};
