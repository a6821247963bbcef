//! Analysis tier vocabulary.

use serde::{Deserialize, Serialize};

/// Which tier produced an insight.
///
/// Tier 1 (the cheap local diff) never produces an insight on its own; it only
/// escalates. Insights therefore carry either the targeted or comprehensive
/// tier.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnalysisTier {
    #[default]
    Targeted,
    Comprehensive,
}

impl core::fmt::Display for AnalysisTier {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            AnalysisTier::Targeted => f.write_str("targeted"),
            AnalysisTier::Comprehensive => f.write_str("comprehensive"),
        }
    }
}
