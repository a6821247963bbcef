//! Tier scheduler: timers, tick bodies, and the control surface.
//!
//! Owns the periodic cheap-check timer, the periodic comprehensive-summary
//! timer, and a one-shot warm-up timer as cancellable task handles, so
//! start/pause/resume/stop are first-class state transitions. Cheap-check
//! ticks cannot overlap: each loop awaits its tick body before asking the
//! interval for the next tick, and missed ticks are skipped.

use chrono::Utc;
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

use edgemind_core::AnalysisTier;
use edgemind_reasoning::{build_comprehensive, build_targeted, ToolOrchestrator};
use edgemind_telemetry::{build_snapshot, detect_changes, MetricsSource, TrendCollector};

use crate::engine::{AnalysisEngine, EngineStatus};
use crate::processor::InsightProcessor;

/// Scheduler lifecycle: `Stopped → Running ⇄ Paused → Terminated`.
///
/// `Terminated` is terminal: a stopped scheduler is not restartable, callers
/// build a fresh one.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum SchedulerState {
    Stopped,
    Running,
    Paused,
    Terminated,
}

#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("invalid scheduler transition: {from:?} -> {to:?}")]
    InvalidTransition { from: SchedulerState, to: SchedulerState },
}

enum TickKind {
    Cheap,
    Comprehensive,
}

/// Everything a tick body needs; shared with the timer tasks.
struct SchedulerInner<S: MetricsSource> {
    engine: Arc<AnalysisEngine>,
    collector: TrendCollector<S>,
    orchestrator: ToolOrchestrator,
    processor: InsightProcessor,
}

impl<S: MetricsSource> SchedulerInner<S> {
    /// Tier 1: query, snapshot, diff, and escalate to a targeted conversation
    /// when something moved. Never raises.
    async fn cheap_tick(&self) {
        if self.engine.config().is_paused {
            return;
        }
        self.engine.mark_scheduled_run(Utc::now());

        let points = self.collector.collect_trends().await;
        let states = self.collector.collect_states().await;
        let snapshot = build_snapshot(&points, &states);

        // The previous snapshot is replaced after every tick that queried
        // fresh data, whether or not analysis runs below.
        let previous = self.engine.swap_snapshot(snapshot.clone());
        self.engine.sweep_dedup(Utc::now().timestamp_millis());

        let threshold = self.engine.config().change_threshold_pct;
        let changes = detect_changes(&snapshot, previous.as_ref(), threshold);
        if changes.is_empty() {
            debug!("cheap check: no significant changes");
            return;
        }

        info!(changes = changes.len(), "cheap check detected changes; escalating");

        let Some(_guard) = self.engine.try_begin_conversation() else {
            info!("conversation already in flight; skipping targeted analysis");
            return;
        };
        let summary = self.engine.latest_summary();
        let prompt = build_targeted(&changes, summary.as_deref());
        match self.orchestrator.run(prompt, AnalysisTier::Targeted).await {
            Ok(insight) => self.processor.process(&self.engine, insight).await,
            Err(e) => warn!(error = %e, "targeted analysis failed; next tick proceeds normally"),
        }
    }

    /// Tier 3: enterprise-rotated deep dive. A cycle that fires while a
    /// conversation is in flight is dropped entirely, not queued.
    async fn comprehensive_tick(&self) {
        if self.engine.config().is_paused {
            return;
        }
        self.engine.mark_scheduled_run(Utc::now());

        let Some(_guard) = self.engine.try_begin_conversation() else {
            info!("conversation already in flight; dropping this comprehensive cycle");
            return;
        };
        // The rotation advances only when a run actually happens, so the
        // dropped cycle's unit keeps its turn.
        let focus = self.engine.take_focus();
        info!(focus = %focus, "starting comprehensive analysis");

        let summary = self.engine.latest_summary();
        let prompt = build_comprehensive(focus, summary.as_deref(), None);
        match self.orchestrator.run(prompt, AnalysisTier::Comprehensive).await {
            Ok(insight) => self.processor.process(&self.engine, insight).await,
            Err(e) => warn!(error = %e, "comprehensive analysis failed; cycle lost"),
        }
    }
}

/// Scheduler and control surface for the tiered analysis engine.
pub struct TierScheduler<S: MetricsSource> {
    inner: Arc<SchedulerInner<S>>,
    state: Mutex<SchedulerState>,
    timers: Mutex<Vec<JoinHandle<()>>>,
}

impl<S: MetricsSource> TierScheduler<S> {
    pub fn new(
        engine: Arc<AnalysisEngine>,
        collector: TrendCollector<S>,
        orchestrator: ToolOrchestrator,
        processor: InsightProcessor,
    ) -> Self {
        Self {
            inner: Arc::new(SchedulerInner { engine, collector, orchestrator, processor }),
            state: Mutex::new(SchedulerState::Stopped),
            timers: Mutex::new(Vec::new()),
        }
    }

    /// From `Stopped`: create both periodic timers plus the one-shot warm-up
    /// timer and transition to `Running`.
    pub fn start(&self) -> Result<(), SchedulerError> {
        self.transition(SchedulerState::Stopped, SchedulerState::Running)?;
        self.inner.engine.set_paused(false);
        self.spawn_periodic_timers();
        self.spawn_warmup_timer();
        info!("tier scheduler started");
        Ok(())
    }

    /// From `Running`: cancel the timers, keep every piece of accumulated
    /// state (snapshot, caches, history) untouched.
    pub fn pause(&self) -> Result<(), SchedulerError> {
        self.transition(SchedulerState::Running, SchedulerState::Paused)?;
        self.cancel_timers();
        self.inner.engine.set_paused(true);
        info!("tier scheduler paused");
        Ok(())
    }

    /// From `Paused`: recreate the periodic timers without resetting state.
    pub fn resume(&self) -> Result<(), SchedulerError> {
        self.transition(SchedulerState::Paused, SchedulerState::Running)?;
        self.inner.engine.set_paused(false);
        self.spawn_periodic_timers();
        info!("tier scheduler resumed");
        Ok(())
    }

    /// Cancel everything; terminal. Subsequent `start()` calls are rejected.
    pub fn stop(&self) {
        self.cancel_timers();
        *self.state.lock().unwrap() = SchedulerState::Terminated;
        info!("tier scheduler stopped");
    }

    pub fn state(&self) -> SchedulerState {
        *self.state.lock().unwrap()
    }

    /// Copy-out status; never blocks the tick path.
    pub fn status(&self) -> EngineStatus {
        let is_running = self.state() == SchedulerState::Running;
        self.inner.engine.status(is_running)
    }

    /// Run one cheap-check tick immediately (outside timer cadence).
    pub async fn run_cheap_tick_now(&self) {
        self.inner.cheap_tick().await;
    }

    /// Run one comprehensive cycle immediately (outside timer cadence).
    pub async fn run_comprehensive_now(&self) {
        self.inner.comprehensive_tick().await;
    }

    fn transition(
        &self,
        expected: SchedulerState,
        to: SchedulerState,
    ) -> Result<(), SchedulerError> {
        let mut state = self.state.lock().unwrap();
        if *state != expected {
            return Err(SchedulerError::InvalidTransition { from: *state, to });
        }
        *state = to;
        Ok(())
    }

    fn spawn_periodic_timers(&self) {
        let config = self.inner.engine.config();
        let mut timers = self.timers.lock().unwrap();
        timers.push(Self::spawn_periodic(
            self.inner.clone(),
            config.check_interval,
            TickKind::Cheap,
        ));
        timers.push(Self::spawn_periodic(
            self.inner.clone(),
            config.summary_interval,
            TickKind::Comprehensive,
        ));
    }

    fn spawn_warmup_timer(&self) {
        let inner = self.inner.clone();
        let delay = self.inner.engine.config().warmup_delay;
        self.timers.lock().unwrap().push(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!("warm-up analysis firing");
            inner.comprehensive_tick().await;
        }));
    }

    fn spawn_periodic(
        inner: Arc<SchedulerInner<S>>,
        period: std::time::Duration,
        kind: TickKind,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick fires immediately; consume it so the
            // cadence starts one period out (warm-up covers the start burst).
            ticker.tick().await;
            loop {
                ticker.tick().await;
                match kind {
                    TickKind::Cheap => inner.cheap_tick().await,
                    TickKind::Comprehensive => inner.comprehensive_tick().await,
                }
            }
        })
    }

    fn cancel_timers(&self) {
        for handle in self.timers.lock().unwrap().drain(..) {
            handle.abort();
        }
    }
}

impl<S: MetricsSource> Drop for TierScheduler<S> {
    fn drop(&mut self) {
        self.cancel_timers();
    }
}
