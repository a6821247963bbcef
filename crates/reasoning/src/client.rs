//! Reasoning-service client boundary.

use async_trait::async_trait;
use thiserror::Error;

use crate::message::{ReasoningRequest, ReasoningResponse};

/// Failure at the reasoning-service boundary.
#[derive(Debug, Error)]
pub enum ReasoningError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("service rejected request: {0}")]
    Service(String),
}

/// Tool-calling completion API.
///
/// Implementations wrap whatever hosts the model (managed runtime, local
/// gateway, test stub). The orchestrator races each call against its round
/// timeout, so implementations need no timeout of their own.
#[async_trait]
pub trait ReasoningClient: Send + Sync + 'static {
    async fn complete(&self, request: ReasoningRequest)
        -> Result<ReasoningResponse, ReasoningError>;
}
