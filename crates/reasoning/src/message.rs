//! Message model for the tool-calling completion API.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::tool::ToolSchema;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One block of message content.
///
/// The service's final turn is `Text`; intermediate turns may carry one or
/// more `ToolUse` requests, each answered by a `ToolResult` tagged with the
/// originating call id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: JsonValue,
    },
    ToolResult {
        tool_use_id: String,
        content: JsonValue,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    pub content: Vec<ContentBlock>,
}

impl Message {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self { role: Role::User, content: vec![ContentBlock::Text { text: text.into() }] }
    }

    pub fn assistant(content: Vec<ContentBlock>) -> Self {
        Self { role: Role::Assistant, content }
    }

    pub fn user(content: Vec<ContentBlock>) -> Self {
        Self { role: Role::User, content }
    }
}

/// One round-trip request to the reasoning service.
#[derive(Debug, Clone, Serialize)]
pub struct ReasoningRequest {
    pub model: String,
    pub max_tokens: u32,
    pub system: String,
    pub tools: Vec<ToolSchema>,
    pub messages: Vec<Message>,
}

/// One response from the reasoning service: either terminal text or one or
/// more tool-call requests.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReasoningResponse {
    pub content: Vec<ContentBlock>,
}

impl ReasoningResponse {
    pub fn text(text: impl Into<String>) -> Self {
        Self { content: vec![ContentBlock::Text { text: text.into() }] }
    }

    /// Tool-call requests in this response, in order.
    pub fn tool_calls(&self) -> Vec<(&str, &str, &JsonValue)> {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::ToolUse { id, name, input } => {
                    Some((id.as_str(), name.as_str(), input))
                }
                _ => None,
            })
            .collect()
    }

    /// Concatenated text blocks (the terminal answer when no tool calls).
    pub fn final_text(&self) -> String {
        self.content
            .iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}
