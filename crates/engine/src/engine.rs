//! The explicitly owned engine state.
//!
//! One `AnalysisEngine` instance is shared by reference between the
//! scheduler, orchestrating tick bodies, and the insight processor. The tick
//! path is the single writer; the mutex is only ever held across synchronous
//! sections, never across an await. Status queries copy.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use edgemind_core::{Anomaly, EnterpriseFocus, Insight};
use edgemind_telemetry::MetricsSnapshot;

use crate::config::AnalysisConfig;
use crate::dedup::AnomalyDedupCache;
use crate::history::BoundedHistory;

/// Insight history cap (oldest evicted).
pub const MAX_INSIGHT_HISTORY: usize = 50;
/// Reported-anomaly list cap (oldest evicted).
pub const MAX_ANOMALY_LIST: usize = 100;

/// Copy-out view for external status queries.
#[derive(Debug, Clone, PartialEq)]
pub struct EngineStatus {
    pub is_paused: bool,
    pub is_running: bool,
    pub config: AnalysisConfig,
    pub has_previous_snapshot: bool,
    pub anomaly_cache_size: usize,
    pub last_scheduled_run: Option<DateTime<Utc>>,
}

struct EngineState {
    config: AnalysisConfig,
    previous_snapshot: Option<MetricsSnapshot>,
    dedup: AnomalyDedupCache,
    insights: BoundedHistory<Insight>,
    anomalies: BoundedHistory<Anomaly>,
    focus: EnterpriseFocus,
    last_scheduled_run: Option<DateTime<Utc>>,
}

/// Shared state of the tiered analysis engine.
pub struct AnalysisEngine {
    state: Mutex<EngineState>,
    /// Guards the single system-wide reasoning conversation.
    in_flight: AtomicBool,
}

impl AnalysisEngine {
    pub fn new(config: AnalysisConfig) -> Self {
        let dedup = AnomalyDedupCache::new(config.anomaly_cache_ttl);
        Self {
            state: Mutex::new(EngineState {
                config,
                previous_snapshot: None,
                dedup,
                insights: BoundedHistory::new(MAX_INSIGHT_HISTORY),
                anomalies: BoundedHistory::new(MAX_ANOMALY_LIST),
                focus: EnterpriseFocus::ROTATION[0],
                last_scheduled_run: None,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    // ── config ──────────────────────────────────────────────────────────

    pub fn config(&self) -> AnalysisConfig {
        self.state.lock().unwrap().config.clone()
    }

    /// Explicit configure call; the only mutation path besides pause/resume.
    pub fn configure(&self, apply: impl FnOnce(&mut AnalysisConfig)) {
        let mut state = self.state.lock().unwrap();
        apply(&mut state.config);
        let ttl = state.config.anomaly_cache_ttl;
        state.dedup.set_ttl(ttl);
    }

    pub fn set_paused(&self, paused: bool) {
        self.state.lock().unwrap().config.is_paused = paused;
    }

    // ── snapshot ────────────────────────────────────────────────────────

    /// Install the fresh snapshot and hand back the previous one.
    ///
    /// Called after every tick that queried fresh data, whether or not
    /// analysis ran; once set, the previous snapshot never reverts to `None`.
    pub fn swap_snapshot(&self, snapshot: MetricsSnapshot) -> Option<MetricsSnapshot> {
        self.state.lock().unwrap().previous_snapshot.replace(snapshot)
    }

    pub fn has_previous_snapshot(&self) -> bool {
        self.state.lock().unwrap().previous_snapshot.is_some()
    }

    pub fn previous_snapshot(&self) -> Option<MetricsSnapshot> {
        self.state.lock().unwrap().previous_snapshot.clone()
    }

    // ── dedup cache ─────────────────────────────────────────────────────

    pub fn is_duplicate_anomaly(&self, key: &str, now_ms: i64) -> bool {
        self.state.lock().unwrap().dedup.is_duplicate(key, now_ms)
    }

    pub fn record_anomaly_occurrence(&self, key: &str, summary: &str, now_ms: i64) {
        self.state.lock().unwrap().dedup.record(key, summary, now_ms);
    }

    pub fn sweep_dedup(&self, now_ms: i64) {
        self.state.lock().unwrap().dedup.sweep(now_ms);
    }

    pub fn anomaly_cache_size(&self) -> usize {
        self.state.lock().unwrap().dedup.len()
    }

    pub fn anomaly_occurrences(&self, key: &str) -> Option<u32> {
        self.state.lock().unwrap().dedup.get(key).map(|e| e.occurrence_count)
    }

    // ── history ─────────────────────────────────────────────────────────

    pub fn push_insight(&self, insight: Insight) {
        self.state.lock().unwrap().insights.push(insight);
    }

    pub fn insights(&self) -> Vec<Insight> {
        self.state.lock().unwrap().insights.to_vec()
    }

    pub fn latest_summary(&self) -> Option<String> {
        self.state.lock().unwrap().insights.latest().map(|i| i.summary.clone())
    }

    pub fn push_anomaly(&self, anomaly: Anomaly) {
        self.state.lock().unwrap().anomalies.push(anomaly);
    }

    pub fn anomalies(&self) -> Vec<Anomaly> {
        self.state.lock().unwrap().anomalies.to_vec()
    }

    // ── rotation / bookkeeping ──────────────────────────────────────────

    /// Current focus for a comprehensive run; advances the rotation by one.
    pub fn take_focus(&self) -> EnterpriseFocus {
        let mut state = self.state.lock().unwrap();
        let focus = state.focus;
        state.focus = focus.next();
        focus
    }

    pub fn current_focus(&self) -> EnterpriseFocus {
        self.state.lock().unwrap().focus
    }

    pub fn mark_scheduled_run(&self, at: DateTime<Utc>) {
        self.state.lock().unwrap().last_scheduled_run = Some(at);
    }

    pub fn last_scheduled_run(&self) -> Option<DateTime<Utc>> {
        self.state.lock().unwrap().last_scheduled_run
    }

    // ── single-flight guard ─────────────────────────────────────────────

    /// Claim the system-wide conversation slot. `None` means a conversation
    /// is already in flight and the caller must skip, not queue.
    ///
    /// The slot is released when the returned guard drops, which also covers
    /// a tick task cancelled mid-conversation.
    pub fn try_begin_conversation(&self) -> Option<ConversationGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
            .then(|| ConversationGuard { engine: self })
    }

    pub fn conversation_in_flight(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    fn release_conversation(&self) {
        self.in_flight.store(false, Ordering::Release);
    }

    // ── status ──────────────────────────────────────────────────────────

    pub fn status(&self, is_running: bool) -> EngineStatus {
        let state = self.state.lock().unwrap();
        EngineStatus {
            is_paused: state.config.is_paused,
            is_running,
            config: state.config.clone(),
            has_previous_snapshot: state.previous_snapshot.is_some(),
            anomaly_cache_size: state.dedup.len(),
            last_scheduled_run: state.last_scheduled_run,
        }
    }
}

/// Held for the duration of one reasoning conversation.
///
/// Releases the single-flight slot on drop, so the slot cannot stay taken
/// when the owning tick is cancelled at an await point.
#[must_use = "dropping the guard releases the conversation slot"]
pub struct ConversationGuard<'a> {
    engine: &'a AnalysisEngine,
}

impl Drop for ConversationGuard<'_> {
    fn drop(&mut self) {
        self.engine.release_conversation();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use edgemind_core::Enterprise;
    use std::collections::HashMap;

    fn empty_snapshot() -> MetricsSnapshot {
        MetricsSnapshot {
            timestamp: Utc::now(),
            metrics: HashMap::new(),
            equipment_states: HashMap::new(),
        }
    }

    #[test]
    fn snapshot_never_reverts_to_none() {
        let engine = AnalysisEngine::new(AnalysisConfig::default());
        assert!(!engine.has_previous_snapshot());

        assert!(engine.swap_snapshot(empty_snapshot()).is_none());
        assert!(engine.has_previous_snapshot());

        assert!(engine.swap_snapshot(empty_snapshot()).is_some());
        assert!(engine.has_previous_snapshot());
    }

    #[test]
    fn conversation_slot_is_single_flight_and_released_on_drop() {
        let engine = AnalysisEngine::new(AnalysisConfig::default());
        let guard = engine.try_begin_conversation();
        assert!(guard.is_some());
        assert!(engine.try_begin_conversation().is_none());
        // The failed claim must not have disturbed the active slot.
        assert!(engine.conversation_in_flight());

        drop(guard);
        assert!(!engine.conversation_in_flight());
        assert!(engine.try_begin_conversation().is_some());
    }

    #[test]
    fn focus_rotation_advances_one_slot_per_take() {
        let engine = AnalysisEngine::new(AnalysisConfig::default());
        assert_eq!(engine.take_focus(), EnterpriseFocus::Single(Enterprise::A));
        assert_eq!(engine.take_focus(), EnterpriseFocus::Single(Enterprise::B));
        assert_eq!(engine.take_focus(), EnterpriseFocus::Single(Enterprise::C));
        assert_eq!(engine.take_focus(), EnterpriseFocus::CrossEnterprise);
        assert_eq!(engine.take_focus(), EnterpriseFocus::Single(Enterprise::A));
    }

    #[test]
    fn configure_updates_dedup_ttl() {
        let engine = AnalysisEngine::new(AnalysisConfig::default());
        engine.record_anomaly_occurrence("k", "s", 0);
        engine.configure(|c| c.anomaly_cache_ttl = std::time::Duration::from_millis(10));
        assert!(!engine.is_duplicate_anomaly("k", 11));
    }

    #[test]
    fn status_copies_without_blocking_state() {
        let engine = AnalysisEngine::new(AnalysisConfig::default());
        engine.mark_scheduled_run(Utc::now());
        let status = engine.status(true);
        assert!(status.is_running);
        assert!(!status.is_paused);
        assert!(!status.has_previous_snapshot);
        assert_eq!(status.anomaly_cache_size, 0);
        assert!(status.last_scheduled_run.is_some());
    }
}
