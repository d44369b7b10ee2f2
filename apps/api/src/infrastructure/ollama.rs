//! Ollama HTTP adapter for the text-generation port

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::agents::{AgentError, AgentResult, Generation, GenerationRequest, TextGenerator};

/// Client for a local Ollama server; each worker is an Ollama model
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
}

impl OllamaClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

#[derive(Serialize)]
struct GenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    stream: bool,
    options: GenerateOptions,
}

#[derive(Serialize)]
struct GenerateOptions {
    temperature: f32,
    num_predict: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    response: String,
}

#[derive(Deserialize)]
struct TagsResponse {
    #[serde(default)]
    models: Vec<ModelTag>,
}

#[derive(Deserialize)]
struct ModelTag {
    name: String,
}

#[derive(Serialize)]
struct CreateRequest<'a> {
    name: &'a str,
    modelfile: &'a str,
}

fn transport(e: reqwest::Error) -> AgentError {
    AgentError::TransportError(e.to_string())
}

async fn ensure_success(response: reqwest::Response) -> AgentResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(AgentError::TransportError(format!(
        "status {}: {}",
        status.as_u16(),
        body.trim()
    )))
}

#[async_trait]
impl TextGenerator for OllamaClient {
    async fn generate(&self, request: &GenerationRequest) -> AgentResult<Generation> {
        debug!(worker = %request.worker, prompt_len = request.prompt.len(), "Calling Ollama generate");

        let body = GenerateRequest {
            model: &request.worker,
            prompt: &request.prompt,
            stream: false,
            options: GenerateOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            },
        };

        let response = self
            .client
            .post(self.url("/api/generate"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;

        let parsed: GenerateResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(transport)?;

        Ok(Generation {
            text: parsed.response,
        })
    }

    async fn list_available(&self) -> AgentResult<Vec<String>> {
        let response = self
            .client
            .get(self.url("/api/tags"))
            .send()
            .await
            .map_err(transport)?;

        let tags: TagsResponse = ensure_success(response)
            .await?
            .json()
            .await
            .map_err(transport)?;

        Ok(tags.models.into_iter().map(|m| m.name).collect())
    }

    async fn create(&self, name: &str, definition: &str) -> AgentResult<()> {
        let body = CreateRequest {
            name,
            modelfile: definition,
        };

        let response = self
            .client
            .post(self.url("/api/create"))
            .json(&body)
            .send()
            .await
            .map_err(transport)?;
        ensure_success(response).await?;

        info!(worker = %name, "Ollama model created");
        Ok(())
    }
}
