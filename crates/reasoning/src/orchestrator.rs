//! Bounded multi-round tool-call conversation driver.
//!
//! Termination is structural, not cooperative: a per-conversation tool budget
//! bounds total tool invocations, a forced-final phase stops offering tools
//! once that budget is spent, and a hard round cap ends the conversation even
//! against a service that never stops asking for tools. Each network round is
//! raced against a timeout; a timeout abandons the conversation with no retry
//! and no backoff.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use edgemind_core::{AnalysisTier, Insight};

use crate::client::{ReasoningClient, ReasoningError};
use crate::message::{ContentBlock, Message, ReasoningRequest};
use crate::prompt::AnalysisPrompt;
use crate::recovery::recover_insight;
use crate::tool::{builtin_tool_schemas, ToolOutcome, ToolRegistry, ToolSchema};

const FORCED_FINAL_INSTRUCTION: &str = "Your tool budget for this conversation is exhausted. \
     Do not request any more tools. Respond now with your final JSON answer.";

/// Why a conversation produced no insight.
///
/// These abort the conversation entirely; the scheduler treats them as a
/// transient miss and lets the next tick proceed normally.
#[derive(Debug, Error)]
pub enum ConversationError {
    #[error("reasoning round exceeded its timeout")]
    Timeout,

    #[error(transparent)]
    Service(#[from] ReasoningError),

    #[error("conversation exceeded {0} rounds without final text")]
    RoundLimit(u32),
}

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Model identifier forwarded to the reasoning service.
    pub model: String,
    pub max_tokens: u32,
    /// Hard cap on rounds regardless of tool budget.
    pub max_rounds: u32,
    /// Per-round network timeout.
    pub round_timeout: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            model: "anthropic.claude-3-5-sonnet-20240620-v1:0".to_string(),
            max_tokens: 2048,
            max_rounds: 12,
            round_timeout: Duration::from_secs(45),
        }
    }
}

/// Drives one conversation with the reasoning service to completion.
pub struct ToolOrchestrator {
    client: Arc<dyn ReasoningClient>,
    registry: Arc<ToolRegistry>,
    config: OrchestratorConfig,
}

impl ToolOrchestrator {
    pub fn new(
        client: Arc<dyn ReasoningClient>,
        registry: Arc<ToolRegistry>,
        config: OrchestratorConfig,
    ) -> Self {
        Self { client, registry, config }
    }

    /// Run one bounded conversation and recover an insight from its final
    /// text. A completed conversation always yields *some* insight, degraded
    /// at worst; only timeouts, service failures, and the round cap yield an
    /// error.
    pub async fn run(
        &self,
        prompt: AnalysisPrompt,
        tier: AnalysisTier,
    ) -> Result<Insight, ConversationError> {
        let schemas = builtin_tool_schemas();
        let mut messages = vec![Message::user_text(prompt.user)];
        let mut calls_used: u32 = 0;
        let mut forced_final = false;

        for round in 1..=self.config.max_rounds {
            let tools: Vec<ToolSchema> = if forced_final { Vec::new() } else { schemas.clone() };
            let request = ReasoningRequest {
                model: self.config.model.clone(),
                max_tokens: self.config.max_tokens,
                system: prompt.system.clone(),
                tools,
                messages: messages.clone(),
            };

            let response =
                match tokio::time::timeout(self.config.round_timeout, self.client.complete(request))
                    .await
                {
                    Ok(Ok(response)) => response,
                    Ok(Err(e)) => {
                        warn!(round, error = %e, "reasoning service failed; abandoning conversation");
                        return Err(ConversationError::Service(e));
                    }
                    Err(_) => {
                        warn!(round, timeout = ?self.config.round_timeout, "reasoning round timed out");
                        return Err(ConversationError::Timeout);
                    }
                };

            let calls: Vec<(String, String, serde_json::Value)> = response
                .tool_calls()
                .into_iter()
                .map(|(id, name, input)| (id.to_string(), name.to_string(), input.clone()))
                .collect();
            messages.push(Message::assistant(response.content.clone()));

            if calls.is_empty() {
                let text = response.final_text();
                let mut insight = recover_insight(&text);
                insight.degraded.forced_final |= forced_final;
                let insight = insight.finalized(tier, calls_used);
                info!(
                    round,
                    tool_calls = calls_used,
                    degraded = insight.is_degraded(),
                    "conversation completed"
                );
                return Ok(insight);
            }

            let mut results = Vec::with_capacity(calls.len() + 1);
            for (id, name, input) in calls {
                let outcome = if forced_final || calls_used >= prompt.tool_budget {
                    forced_final = true;
                    ToolOutcome::fail(FORCED_FINAL_INSTRUCTION)
                } else {
                    calls_used += 1;
                    debug!(round, tool = %name, calls_used, "executing tool call");
                    self.registry.dispatch(&name, &input).await
                };
                results.push(ContentBlock::ToolResult {
                    tool_use_id: id,
                    content: outcome.to_result_content(),
                });
            }
            if calls_used >= prompt.tool_budget {
                forced_final = true;
            }
            if forced_final {
                results.push(ContentBlock::Text { text: FORCED_FINAL_INSTRUCTION.to_string() });
            }
            messages.push(Message::user(results));
        }

        warn!(max_rounds = self.config.max_rounds, "conversation hit the round cap");
        Err(ConversationError::RoundLimit(self.config.max_rounds))
    }
}
