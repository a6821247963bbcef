//! Anomaly severity scale.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// Severity of a reported anomaly.
///
/// Ordered: `Low < Medium < High < Critical`. Ticketing applies from `High`
/// upward; lower severities stay on the dashboard only.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl Severity {
    /// First-occurrence anomalies at this severity open a ticket downstream.
    pub fn requires_ticket(&self) -> bool {
        *self >= Severity::High
    }
}

impl core::fmt::Display for Severity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let s = match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
            Severity::Critical => "critical",
        };
        f.write_str(s)
    }
}

// Reasoning-service output is not guaranteed to respect casing, so accept
// "HIGH" as readily as "high" instead of rejecting the whole insight.
impl<'de> Deserialize<'de> for Severity {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        match raw.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(de::Error::custom(format!("unknown severity: {other}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticket_threshold_is_high() {
        assert!(!Severity::Low.requires_ticket());
        assert!(!Severity::Medium.requires_ticket());
        assert!(Severity::High.requires_ticket());
        assert!(Severity::Critical.requires_ticket());
    }

    #[test]
    fn deserialization_ignores_case() {
        let s: Severity = serde_json::from_str("\"HIGH\"").unwrap();
        assert_eq!(s, Severity::High);
        assert!(serde_json::from_str::<Severity>("\"urgent\"").is_err());
    }
}
