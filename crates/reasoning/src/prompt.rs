//! Prompt builders for the targeted and comprehensive tiers.

use std::collections::BTreeSet;

use edgemind_core::{Enterprise, EnterpriseFocus};
use edgemind_telemetry::Change;

/// Tool budget for a targeted (narrow) conversation.
pub const TARGETED_TOOL_BUDGET: u32 = 3;
/// Tool budget for a comprehensive (enterprise-rotated) conversation.
pub const COMPREHENSIVE_TOOL_BUDGET: u32 = 9;

const SYSTEM_PROMPT: &str = "\
You are the analysis engine of a factory intelligence platform covering three \
business units: Enterprise A and Enterprise B (discrete manufacturing, measured \
with OEE) and Enterprise C (ISA-88 batch processing; use batch terminology, \
never OEE, for Enterprise C). You may call the provided tools to look up live \
data before answering.

Respond with exactly one JSON object and no other text, using this shape:
{
  \"summary\": \"...\",
  \"trends\": [{\"enterprise\": \"...\", \"metric\": \"...\", \"direction\": \"...\", \"detail\": \"...\"}],
  \"anomalies\": [{\"enterprise\": \"...\", \"equipment\": \"...\", \"severity\": \"low|medium|high|critical\", \"description\": \"...\", \"recommendation\": \"...\"}],
  \"wasteAlerts\": [{\"enterprise\": \"...\", \"category\": \"...\", \"detail\": \"...\"}],
  \"recommendations\": [\"...\"],
  \"enterpriseInsights\": {\"Enterprise A\": \"...\"},
  \"severity\": \"low|medium|high|critical\",
  \"confidence\": 0.0
}";

/// A ready-to-run conversation request: the system prompt, the opening user
/// turn, and the tool budget for this tier.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisPrompt {
    pub system: String,
    pub user: String,
    pub tool_budget: u32,
}

/// Narrow prompt scoped to the enterprises implicated by the given changes.
pub fn build_targeted(changes: &[Change], current_summary: Option<&str>) -> AnalysisPrompt {
    // BTreeSet for stable ordering in the rendered prompt.
    let implicated: BTreeSet<String> =
        changes.iter().map(|c| c.enterprise().to_string()).collect();

    let mut user = String::from(
        "A cheap telemetry diff just detected the following changes. Analyze only the \
         implicated enterprises and report whether any constitute an anomaly.\n\n",
    );

    user.push_str(&format!(
        "Implicated enterprises: {}\n\nChanges:\n",
        implicated.into_iter().collect::<Vec<_>>().join(", ")
    ));
    for change in changes {
        user.push_str("- ");
        user.push_str(&describe_change(change));
        user.push('\n');
    }
    if let Some(summary) = current_summary {
        user.push_str(&format!("\nMost recent analysis summary for context: {summary}\n"));
    }

    AnalysisPrompt { system: SYSTEM_PROMPT.to_string(), user, tool_budget: TARGETED_TOOL_BUDGET }
}

/// Deep-dive prompt for the comprehensive tier, scoped by the rotation focus.
pub fn build_comprehensive(
    focus: EnterpriseFocus,
    current_summary: Option<&str>,
    domain_context: Option<&str>,
) -> AnalysisPrompt {
    let mut user = match focus {
        EnterpriseFocus::Single(enterprise) if enterprise.uses_batch_processing() => format!(
            "Run a comprehensive batch-processing review of {enterprise} (ISA-88). Check \
             batch health, active phases, and any stalled or faulted units via \
             get_batch_status and get_equipment_states. Do not use OEE terminology.\n"
        ),
        EnterpriseFocus::Single(enterprise) => format!(
            "Run a comprehensive OEE deep dive on {enterprise}: availability, performance, \
             quality, limiting factors, downtime drivers, and waste. Use get_oee_breakdown, \
             get_equipment_states, and get_downtime_analysis as needed.\n"
        ),
        EnterpriseFocus::CrossEnterprise => String::from(
            "Run a cross-enterprise comparison of Enterprise A, Enterprise B, and \
             Enterprise C. Compare headline effectiveness, flag the weakest performer, and \
             note any pattern that spans business units. Remember Enterprise C is batch.\n",
        ),
    };

    if let Some(context) = domain_context {
        user.push_str(&format!("\nOperating context: {context}\n"));
    }
    if let Some(summary) = current_summary {
        user.push_str(&format!("\nMost recent analysis summary for context: {summary}\n"));
    }

    AnalysisPrompt {
        system: SYSTEM_PROMPT.to_string(),
        user,
        tool_budget: COMPREHENSIVE_TOOL_BUDGET,
    }
}

fn describe_change(change: &Change) -> String {
    match change {
        Change::Metric {
            enterprise,
            measurement,
            previous_value,
            current_value,
            change_pct,
            direction,
        } => format!(
            "{enterprise} {measurement} {direction} by {change_pct:.1}% \
             ({previous_value:.1} -> {current_value:.1})"
        ),
        Change::StateTransition { equipment, enterprise, previous_state, current_state } => {
            format!("{equipment} ({enterprise}) transitioned {previous_state} -> {current_state}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use edgemind_telemetry::Direction;

    #[test]
    fn targeted_prompt_names_only_implicated_enterprises() {
        let changes = vec![Change::Metric {
            enterprise: Enterprise::B,
            measurement: "availability".into(),
            previous_value: 80.0,
            current_value: 60.0,
            change_pct: 25.0,
            direction: Direction::Decreased,
        }];

        let prompt = build_targeted(&changes, Some("all quiet earlier"));
        assert!(prompt.user.contains("Implicated enterprises: Enterprise B"));
        assert!(prompt.user.contains("availability decreased by 25.0%"));
        assert!(prompt.user.contains("all quiet earlier"));
        assert!(!prompt.user.contains("Enterprise A,"));
        assert_eq!(prompt.tool_budget, TARGETED_TOOL_BUDGET);
    }

    #[test]
    fn comprehensive_prompt_uses_batch_terms_for_enterprise_c() {
        let prompt =
            build_comprehensive(EnterpriseFocus::Single(Enterprise::C), None, None);
        assert!(prompt.user.contains("ISA-88"));
        assert!(prompt.user.contains("get_batch_status"));
        assert_eq!(prompt.tool_budget, COMPREHENSIVE_TOOL_BUDGET);

        let oee = build_comprehensive(EnterpriseFocus::Single(Enterprise::A), None, None);
        assert!(oee.user.contains("OEE deep dive"));
    }

    #[test]
    fn cross_enterprise_slot_compares_all_units() {
        let prompt = build_comprehensive(EnterpriseFocus::CrossEnterprise, None, Some("night shift"));
        assert!(prompt.user.contains("cross-enterprise comparison"));
        assert!(prompt.user.contains("night shift"));
    }
}
