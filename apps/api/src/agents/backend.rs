// Text-generation backend port
//
// The worker gateway talks to the remote service only through this trait,
// so tests can substitute a scripted backend.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::errors::AgentResult;

/// One generation request for a named worker
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationRequest {
    pub worker: String,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

/// Text produced by a worker
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Generation {
    pub text: String,
}

/// Remote text-generation service
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Issue a single request/response generation call
    ///
    /// Connection failures and non-success statuses are `TransportError`.
    async fn generate(&self, request: &GenerationRequest) -> AgentResult<Generation>;

    /// Worker names the backend currently serves
    async fn list_available(&self) -> AgentResult<Vec<String>>;

    /// Register a worker from its definition document
    async fn create(&self, name: &str, definition: &str) -> AgentResult<()>;
}
