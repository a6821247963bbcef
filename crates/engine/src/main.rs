//! Demo daemon: runs the tiered analysis engine against simulated externals.
//!
//! The metrics source drifts deterministically so the cheap check escalates
//! every few ticks, and the reasoning client answers with a canned insight.
//! Useful for watching the engine's logs end to end without live backends.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;

use edgemind_core::{Enterprise, EquipmentState};
use edgemind_engine::{
    AnalysisConfig, AnalysisEngine, InMemoryAnomalyStore, InMemoryInsightBroadcast,
    InMemoryTicketSink, InsightProcessor, TierScheduler,
};
use edgemind_reasoning::{
    builtin_tool_schemas, OrchestratorConfig, ReasoningClient, ReasoningError, ReasoningRequest,
    ReasoningResponse, ToolHandler, ToolOrchestrator, ToolOutcome, ToolRegistry,
};
use edgemind_telemetry::{MetricsSource, SourceError, TrendCollector, TrendPoint};

/// Deterministic drifting telemetry.
struct SimulatedSource {
    tick: AtomicU64,
}

#[async_trait]
impl MetricsSource for SimulatedSource {
    async fn query_trends(
        &self,
        _window: Duration,
        _granularity: Duration,
    ) -> Result<Vec<TrendPoint>, SourceError> {
        let tick = self.tick.fetch_add(1, Ordering::SeqCst);
        // Enterprise B's availability sags sharply every fourth tick.
        let availability_b = if tick % 4 == 3 { 58.0 } else { 82.0 };
        let point = |enterprise, measurement: &str, value| TrendPoint {
            measurement: measurement.to_string(),
            enterprise,
            site: "site-1".into(),
            area: "line-1".into(),
            time: Utc::now(),
            value,
        };
        Ok(vec![
            point(Enterprise::A, "availability", 88.0),
            point(Enterprise::A, "oee", 71.0),
            point(Enterprise::B, "availability", availability_b),
            point(Enterprise::B, "oee", 64.0),
            point(Enterprise::C, "quality", 97.5),
        ])
    }

    async fn equipment_states(
        &self,
    ) -> Result<HashMap<String, (Enterprise, EquipmentState)>, SourceError> {
        let mut states = HashMap::new();
        states.insert("CNC-07".to_string(), (Enterprise::B, EquipmentState::Running));
        states.insert("MIX-02".to_string(), (Enterprise::C, EquipmentState::Running));
        Ok(states)
    }
}

/// Reasoning client that answers every conversation with a canned insight.
struct CannedReasoner;

#[async_trait]
impl ReasoningClient for CannedReasoner {
    async fn complete(
        &self,
        _request: ReasoningRequest,
    ) -> Result<ReasoningResponse, ReasoningError> {
        Ok(ReasoningResponse::text(
            r#"{"summary":"Enterprise B availability dipped below its operating band","severity":"medium","confidence":0.7,"anomalies":[{"enterprise":"Enterprise B","equipment":"line-1","severity":"medium","description":"availability sag consistent with short stops"}],"recommendations":["review changeover schedule on line-1"]}"#,
        ))
    }
}

/// Echo tool handler standing in for the factory backend.
struct CannedTool {
    name: String,
}

#[async_trait]
impl ToolHandler for CannedTool {
    fn name(&self) -> &str {
        &self.name
    }

    async fn call(&self, input: &serde_json::Value) -> ToolOutcome {
        ToolOutcome::ok(serde_json::json!({ "request": input, "note": "simulated backend" }))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    edgemind_observability::init();

    let config = AnalysisConfig {
        check_interval: Duration::from_secs(10),
        summary_interval: Duration::from_secs(120),
        warmup_delay: Duration::from_secs(5),
        ..AnalysisConfig::default()
    };
    let engine = Arc::new(AnalysisEngine::new(config));

    let mut registry = ToolRegistry::new();
    for schema in builtin_tool_schemas() {
        registry.register(Arc::new(CannedTool { name: schema.name }));
    }

    let collector = TrendCollector::new(Arc::new(SimulatedSource { tick: AtomicU64::new(0) }));
    let orchestrator = ToolOrchestrator::new(
        Arc::new(CannedReasoner),
        Arc::new(registry),
        OrchestratorConfig::default(),
    );
    let processor = InsightProcessor::new(
        Arc::new(InMemoryInsightBroadcast::new()),
        Arc::new(InMemoryAnomalyStore::new()),
        Arc::new(InMemoryTicketSink::new()),
    );

    let scheduler = TierScheduler::new(engine.clone(), collector, orchestrator, processor);
    scheduler.start()?;
    tracing::info!("edgemind analysis engine running; ctrl-c to stop");

    tokio::signal::ctrl_c().await?;
    scheduler.stop();
    tracing::info!(status = ?scheduler.status(), "shut down");
    Ok(())
}
