//! `edgemind-reasoning` — the reasoning-service boundary and tool orchestration.
//!
//! Everything expensive lives here: the message model for the tool-calling
//! completion API, the four factory tool handlers' dispatch seam, prompt
//! construction for the targeted and comprehensive tiers, the bounded
//! conversation state machine, and recovery of a structured [`Insight`]
//! from free-form final text.
//!
//! The service itself is an external collaborator behind [`ReasoningClient`];
//! this crate never opens a socket.
//!
//! [`Insight`]: edgemind_core::Insight

pub mod client;
pub mod message;
pub mod orchestrator;
pub mod prompt;
pub mod recovery;
pub mod tool;

pub use client::{ReasoningClient, ReasoningError};
pub use message::{ContentBlock, Message, ReasoningRequest, ReasoningResponse, Role};
pub use orchestrator::{ConversationError, OrchestratorConfig, ToolOrchestrator};
pub use prompt::{build_comprehensive, build_targeted, AnalysisPrompt};
pub use recovery::recover_insight;
pub use tool::{builtin_tool_schemas, ToolHandler, ToolOutcome, ToolRegistry, ToolSchema};
