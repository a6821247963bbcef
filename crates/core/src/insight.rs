//! Structured insight model (reasoning-tier output).
//!
//! An `Insight` is the terminal product of a reasoning conversation. It is
//! **always well-formed** once returned: when the reasoning service's final
//! text cannot be fully recovered, the orchestrator still produces an insight
//! carrying a degraded flag rather than a null/absent result.
//!
//! Wire fields use camelCase because that is the schema the reasoning service
//! is instructed to emit; every field defaults so a partial JSON object still
//! deserializes.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::severity::Severity;
use crate::tier::AnalysisTier;

/// A single anomaly reported inside an insight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Anomaly {
    /// Enterprise label as reported by the reasoning service.
    ///
    /// Kept as a string at this boundary: the dedup key is textual and a
    /// slightly off label must not invalidate an otherwise good anomaly.
    pub enterprise: String,
    pub equipment: String,
    pub severity: Severity,
    pub description: String,
    pub recommendation: Option<String>,
}

impl Anomaly {
    /// Dedup cache key: coarse by design (enterprise + equipment + severity,
    /// not the full anomaly text).
    pub fn dedup_key(&self) -> String {
        format!("{}|{}|{}", self.enterprise, self.equipment, self.severity)
    }
}

/// A notable metric trend called out by the reasoning service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrendObservation {
    pub enterprise: String,
    pub metric: String,
    pub direction: String,
    pub detail: String,
}

/// A waste/scrap alert called out by the reasoning service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WasteAlert {
    pub enterprise: String,
    pub category: String,
    pub detail: String,
}

/// Flags describing how an insight was degraded on its way out.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DegradedFlags {
    /// The final text contained no recoverable JSON object; the summary is a
    /// best-effort extraction.
    pub parse_error: bool,
    /// The tool budget ran out mid-conversation and a final answer was forced.
    pub forced_final: bool,
}

impl DegradedFlags {
    pub fn any(&self) -> bool {
        self.parse_error || self.forced_final
    }
}

/// Finished analysis insight.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Insight {
    pub id: Uuid,
    pub timestamp: Option<DateTime<Utc>>,
    pub summary: String,
    pub trends: Vec<TrendObservation>,
    pub anomalies: Vec<Anomaly>,
    pub waste_alerts: Vec<WasteAlert>,
    pub recommendations: Vec<String>,
    pub enterprise_insights: HashMap<String, String>,
    pub severity: Severity,
    pub confidence: f64,
    pub analysis_tier: AnalysisTier,
    pub tool_calls_used: u32,
    pub degraded: DegradedFlags,
}

impl Insight {
    /// Stamp the engine-owned fields after recovery from wire JSON.
    pub fn finalized(mut self, tier: AnalysisTier, tool_calls_used: u32) -> Self {
        self.id = Uuid::now_v7();
        self.timestamp = Some(Utc::now());
        self.analysis_tier = tier;
        self.tool_calls_used = tool_calls_used;
        self
    }

    /// Best-effort insight for unparsable final text.
    pub fn parse_degraded(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            confidence: 0.0,
            degraded: DegradedFlags { parse_error: true, forced_final: false },
            ..Self::default()
        }
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded.any()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_still_deserializes() {
        let insight: Insight =
            serde_json::from_str(r#"{"summary":"all quiet","severity":"low"}"#).unwrap();
        assert_eq!(insight.summary, "all quiet");
        assert_eq!(insight.severity, Severity::Low);
        assert!(insight.anomalies.is_empty());
        assert!(!insight.is_degraded());
    }

    #[test]
    fn dedup_key_is_coarse() {
        let a = Anomaly {
            enterprise: "Enterprise B".into(),
            equipment: "CNC-07".into(),
            severity: Severity::High,
            description: "spindle vibration exceeded envelope".into(),
            recommendation: None,
        };
        let b = Anomaly { description: "different text, same triple".into(), ..a.clone() };
        assert_eq!(a.dedup_key(), b.dedup_key());
        assert_eq!(a.dedup_key(), "Enterprise B|CNC-07|high");
    }
}
