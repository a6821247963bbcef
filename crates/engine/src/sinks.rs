//! Downstream sinks (external collaborators, fire-and-forget).
//!
//! The engine never waits on downstream outcomes: sinks are infallible at
//! this boundary and own their own retries/logging. In-memory implementations
//! back the tests and the demo binary.

use async_trait::async_trait;
use std::sync::Mutex;

use edgemind_core::{Anomaly, Insight};

/// Receives every finalized insight, duplicates included.
#[async_trait]
pub trait InsightBroadcast: Send + Sync + 'static {
    async fn broadcast(&self, insight: &Insight);
}

/// Receives every newly reported (non-duplicate) anomaly.
#[async_trait]
pub trait AnomalyStore: Send + Sync + 'static {
    async fn persist(&self, anomaly: &Anomaly);
}

/// Receives first-occurrence high-severity anomalies only.
#[async_trait]
pub trait TicketSink: Send + Sync + 'static {
    async fn open_ticket(&self, anomaly: &Anomaly);
}

#[derive(Debug, Default)]
pub struct InMemoryInsightBroadcast {
    inner: Mutex<Vec<Insight>>,
}

impl InMemoryInsightBroadcast {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Insight> {
        self.inner.lock().unwrap().clone()
    }
}

#[async_trait]
impl InsightBroadcast for InMemoryInsightBroadcast {
    async fn broadcast(&self, insight: &Insight) {
        self.inner.lock().unwrap().push(insight.clone());
    }
}

#[derive(Debug, Default)]
pub struct InMemoryAnomalyStore {
    inner: Mutex<Vec<Anomaly>>,
}

impl InMemoryAnomalyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Anomaly> {
        self.inner.lock().unwrap().clone()
    }
}

#[async_trait]
impl AnomalyStore for InMemoryAnomalyStore {
    async fn persist(&self, anomaly: &Anomaly) {
        self.inner.lock().unwrap().push(anomaly.clone());
    }
}

#[derive(Debug, Default)]
pub struct InMemoryTicketSink {
    inner: Mutex<Vec<Anomaly>>,
}

impl InMemoryTicketSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn all(&self) -> Vec<Anomaly> {
        self.inner.lock().unwrap().clone()
    }
}

#[async_trait]
impl TicketSink for InMemoryTicketSink {
    async fn open_ticket(&self, anomaly: &Anomaly) {
        self.inner.lock().unwrap().push(anomaly.clone());
    }
}
