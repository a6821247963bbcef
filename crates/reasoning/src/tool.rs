//! Tool schemas and the tool-handler dispatch seam.
//!
//! The four factory tools are external collaborators: their computation
//! (OEE breakdowns, state tables, downtime, batch health) happens in the
//! backend. This module owns only their schemas and the dispatch rule that a
//! handler-level failure is surfaced to the conversation **as data**, never
//! as an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value as JsonValue};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Schema advertised to the reasoning service for one callable tool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSchema {
    pub name: String,
    pub description: String,
    pub input_schema: JsonValue,
}

/// Result of one tool invocation, as fed back into the conversation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolOutcome {
    pub success: bool,
    pub data: Option<JsonValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ToolOutcome {
    pub fn ok(data: JsonValue) -> Self {
        Self { success: true, data: Some(data), error: None }
    }

    pub fn fail(error: impl Into<String>) -> Self {
        Self { success: false, data: None, error: Some(error.into()) }
    }

    /// The JSON payload appended to the conversation as a tool result.
    pub fn to_result_content(&self) -> JsonValue {
        serde_json::to_value(self).unwrap_or_else(|_| json!({"success": false}))
    }
}

/// One externally implemented tool.
#[async_trait]
pub trait ToolHandler: Send + Sync + 'static {
    fn name(&self) -> &str;

    /// Execute the tool. Implementations report their own failures through
    /// `ToolOutcome::fail`; this method itself is infallible.
    async fn call(&self, input: &JsonValue) -> ToolOutcome;
}

/// Name-keyed dispatch over the registered handlers.
#[derive(Default)]
pub struct ToolRegistry {
    handlers: HashMap<String, Arc<dyn ToolHandler>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, handler: Arc<dyn ToolHandler>) {
        self.handlers.insert(handler.name().to_string(), handler);
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Dispatch one call. An unknown tool name is a handler-level failure and
    /// comes back as data like any other.
    pub async fn dispatch(&self, name: &str, input: &JsonValue) -> ToolOutcome {
        match self.handlers.get(name) {
            Some(handler) => {
                debug!(tool = name, "dispatching tool call");
                handler.call(input).await
            }
            None => ToolOutcome::fail(format!("unknown tool: {name}")),
        }
    }
}

/// Schemas for the four factory tools.
pub fn builtin_tool_schemas() -> Vec<ToolSchema> {
    vec![
        ToolSchema {
            name: "get_oee_breakdown".into(),
            description:
                "OEE breakdown (availability, performance, quality) for a discrete \
                 manufacturing enterprise, optionally narrowed to one site."
                    .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "enterprise": { "type": "string" },
                    "site": { "type": "string" }
                },
                "required": ["enterprise"]
            }),
        },
        ToolSchema {
            name: "get_equipment_states".into(),
            description: "Current equipment states (RUNNING/IDLE/DOWN/FAULT) for an enterprise."
                .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "enterprise": { "type": "string" }
                },
                "required": ["enterprise"]
            }),
        },
        ToolSchema {
            name: "get_downtime_analysis".into(),
            description: "Downtime totals and top loss reasons for an enterprise.".into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "enterprise": { "type": "string" }
                },
                "required": ["enterprise"]
            }),
        },
        ToolSchema {
            name: "get_batch_status".into(),
            description:
                "ISA-88 batch health for Enterprise C, optionally narrowed to one equipment type."
                    .into(),
            input_schema: json!({
                "type": "object",
                "properties": {
                    "equipment_type": { "type": "string" }
                }
            }),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl ToolHandler for EchoTool {
        fn name(&self) -> &str {
            "get_equipment_states"
        }

        async fn call(&self, input: &JsonValue) -> ToolOutcome {
            ToolOutcome::ok(json!({"echo": input}))
        }
    }

    #[tokio::test]
    async fn unknown_tool_fails_as_data() {
        let registry = ToolRegistry::new();
        let outcome = registry.dispatch("get_oee_breakdown", &json!({})).await;
        assert!(!outcome.success);
        assert!(outcome.error.unwrap().contains("unknown tool"));
    }

    #[tokio::test]
    async fn dispatch_routes_by_name() {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool));

        let outcome = registry
            .dispatch("get_equipment_states", &json!({"enterprise": "Enterprise A"}))
            .await;
        assert!(outcome.success);
        assert_eq!(outcome.data.unwrap()["echo"]["enterprise"], "Enterprise A");
    }

    #[test]
    fn four_builtin_schemas() {
        let schemas = builtin_tool_schemas();
        let names: Vec<_> = schemas.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(
            names,
            [
                "get_oee_breakdown",
                "get_equipment_states",
                "get_downtime_analysis",
                "get_batch_status"
            ]
        );
    }
}
