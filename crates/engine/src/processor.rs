//! Insight processor: history, dedup gating, and downstream fan-out.

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use edgemind_core::Insight;

use crate::engine::AnalysisEngine;
use crate::sinks::{AnomalyStore, InsightBroadcast, TicketSink};

/// Finalizes an insight: appends it to bounded history, dedups its anomalies,
/// and triggers downstream side effects for first-time occurrences only.
pub struct InsightProcessor {
    broadcast: Arc<dyn InsightBroadcast>,
    store: Arc<dyn AnomalyStore>,
    tickets: Arc<dyn TicketSink>,
}

impl InsightProcessor {
    pub fn new(
        broadcast: Arc<dyn InsightBroadcast>,
        store: Arc<dyn AnomalyStore>,
        tickets: Arc<dyn TicketSink>,
    ) -> Self {
        Self { broadcast, store, tickets }
    }

    pub async fn process(&self, engine: &AnalysisEngine, insight: Insight) {
        engine.push_insight(insight.clone());

        let now_ms = Utc::now().timestamp_millis();
        for anomaly in &insight.anomalies {
            let key = anomaly.dedup_key();
            let duplicate = engine.is_duplicate_anomaly(&key, now_ms);
            // Repeats still count; they just stay quiet.
            engine.record_anomaly_occurrence(&key, &insight.summary, now_ms);

            if duplicate {
                debug!(key = %key, "suppressing duplicate anomaly within TTL");
                continue;
            }

            info!(
                key = %key,
                severity = %anomaly.severity,
                "first-occurrence anomaly reported"
            );
            engine.push_anomaly(anomaly.clone());
            self.store.persist(anomaly).await;
            if anomaly.severity.requires_ticket() {
                self.tickets.open_ticket(anomaly).await;
            }
        }

        // Every finalized insight is broadcast, duplicates or not.
        self.broadcast.broadcast(&insight).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::sinks::{InMemoryAnomalyStore, InMemoryInsightBroadcast, InMemoryTicketSink};
    use edgemind_core::{Anomaly, Severity};

    struct Fixture {
        engine: AnalysisEngine,
        broadcast: Arc<InMemoryInsightBroadcast>,
        store: Arc<InMemoryAnomalyStore>,
        tickets: Arc<InMemoryTicketSink>,
        processor: InsightProcessor,
    }

    fn fixture() -> Fixture {
        let broadcast = Arc::new(InMemoryInsightBroadcast::new());
        let store = Arc::new(InMemoryAnomalyStore::new());
        let tickets = Arc::new(InMemoryTicketSink::new());
        let processor =
            InsightProcessor::new(broadcast.clone(), store.clone(), tickets.clone());
        Fixture {
            engine: AnalysisEngine::new(AnalysisConfig::default()),
            broadcast,
            store,
            tickets,
            processor,
        }
    }

    fn anomaly(equipment: &str, severity: Severity) -> Anomaly {
        Anomaly {
            enterprise: "Enterprise B".into(),
            equipment: equipment.into(),
            severity,
            description: "availability collapsed".into(),
            recommendation: Some("inspect spindle".into()),
        }
    }

    fn insight_with(anomalies: Vec<Anomaly>) -> Insight {
        Insight { summary: "tick analysis".into(), anomalies, ..Insight::default() }
    }

    #[tokio::test]
    async fn first_occurrence_fans_out_high_severity_gets_ticket() {
        let f = fixture();
        let insight =
            insight_with(vec![anomaly("CNC-07", Severity::High), anomaly("MIX-02", Severity::Low)]);

        f.processor.process(&f.engine, insight).await;

        assert_eq!(f.store.all().len(), 2);
        // Only the high-severity anomaly opens a ticket.
        let tickets = f.tickets.all();
        assert_eq!(tickets.len(), 1);
        assert_eq!(tickets[0].equipment, "CNC-07");
        assert_eq!(f.engine.anomalies().len(), 2);
    }

    #[tokio::test]
    async fn duplicates_within_ttl_skip_side_effects_but_count() {
        let f = fixture();
        let insight = insight_with(vec![anomaly("CNC-07", Severity::High)]);

        f.processor.process(&f.engine, insight.clone()).await;
        f.processor.process(&f.engine, insight).await;

        // Side effects fired once; the repeat was recorded for counting.
        assert_eq!(f.store.all().len(), 1);
        assert_eq!(f.tickets.all().len(), 1);
        assert_eq!(f.engine.anomalies().len(), 1);
        assert_eq!(f.engine.anomaly_occurrences("Enterprise B|CNC-07|high"), Some(2));
    }

    #[tokio::test]
    async fn every_insight_is_broadcast_even_with_duplicate_anomalies() {
        let f = fixture();
        let insight = insight_with(vec![anomaly("CNC-07", Severity::Medium)]);

        f.processor.process(&f.engine, insight.clone()).await;
        f.processor.process(&f.engine, insight).await;

        assert_eq!(f.broadcast.all().len(), 2);
        assert_eq!(f.engine.insights().len(), 2);
    }

    #[tokio::test]
    async fn distinct_triples_are_not_collapsed() {
        let f = fixture();
        // Same equipment, different severities: different dedup triples.
        let insight = insight_with(vec![
            anomaly("CNC-07", Severity::High),
            anomaly("CNC-07", Severity::Low),
        ]);

        f.processor.process(&f.engine, insight).await;
        assert_eq!(f.store.all().len(), 2);
    }
}
