use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use super::backend::{GenerationRequest, TextGenerator};
use super::errors::{AgentError, AgentResult};
use crate::config::GenerationParams;
use crate::domain::repositories::{KnowledgeRepository, NewKnowledgeEntry};

/// Worker Gateway: the single path to the text-generation backend
///
/// Every invocation, from any project, takes `invoke_lock` before the remote
/// call and releases it once the response or error is in hand. Calls are
/// therefore serialized process-wide for this gateway instance.
pub struct WorkerGateway {
    backend: Arc<dyn TextGenerator>,
    knowledge: Arc<dyn KnowledgeRepository>,
    workers: HashSet<String>,
    invoke_lock: Mutex<()>,
    timeout: Option<Duration>,
}

impl WorkerGateway {
    /// Create a gateway serving the given worker names
    pub fn new(
        backend: Arc<dyn TextGenerator>,
        knowledge: Arc<dyn KnowledgeRepository>,
        workers: HashSet<String>,
    ) -> Self {
        Self {
            backend,
            knowledge,
            workers,
            invoke_lock: Mutex::new(()),
            timeout: None,
        }
    }

    /// Bound the wait for a single remote call
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Whether `name` is in the configured worker set
    pub fn knows(&self, name: &str) -> bool {
        self.workers.contains(name)
    }

    /// Invoke a worker and return its text
    ///
    /// # Errors
    /// * `UnknownWorker` - `worker` is not configured
    /// * `TransportError` - the remote call failed or timed out
    pub async fn invoke(
        &self,
        worker: &str,
        prompt: &str,
        params: GenerationParams,
        project_id: Option<i64>,
    ) -> AgentResult<String> {
        if !self.knows(worker) {
            warn!(agent = %worker, "Invocation of unknown worker");
            return Err(AgentError::UnknownWorker(worker.to_string()));
        }

        let request = GenerationRequest {
            worker: worker.to_string(),
            prompt: prompt.to_string(),
            temperature: params.temperature,
            max_tokens: params.max_tokens,
        };

        let generation = {
            let _guard = self.invoke_lock.lock().await;
            debug!(agent = %worker, prompt_len = prompt.len(), "Invoking worker");

            match self.timeout {
                Some(limit) => tokio::time::timeout(limit, self.backend.generate(&request))
                    .await
                    .map_err(|_| {
                        AgentError::TransportError(format!(
                            "no response from {} within {}s",
                            worker,
                            limit.as_secs()
                        ))
                    })?,
                None => self.backend.generate(&request).await,
            }
        };

        let generation = generation.map_err(|e| {
            error!(agent = %worker, error = %e, "Worker invocation failed");
            e
        })?;

        self.log_exchange(worker, prompt, &generation.text, project_id).await;

        Ok(generation.text)
    }

    /// Invoke a worker, folding any error into explanatory text
    pub async fn ask(&self, worker: &str, prompt: &str, params: GenerationParams) -> String {
        match self.invoke(worker, prompt, params, None).await {
            Ok(text) => text,
            Err(e) => e.in_band_text(),
        }
    }

    async fn log_exchange(&self, worker: &str, prompt: &str, response: &str, project_id: Option<i64>) {
        let entry = NewKnowledgeEntry::exchange(worker, prompt, response, project_id);
        match self.knowledge.record(entry).await {
            Ok(id) => info!(agent = %worker, knowledge_id = id, "Worker response stored"),
            Err(e) => warn!(agent = %worker, error = %e, "Failed to store worker response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::backend::Generation;
    use crate::domain::repositories::{KnowledgeEntry, StoreError, StoreResult};
    use async_trait::async_trait;
    use std::sync::Mutex as StdMutex;

    struct EchoBackend {
        fail: bool,
    }

    #[async_trait]
    impl TextGenerator for EchoBackend {
        async fn generate(&self, request: &GenerationRequest) -> AgentResult<Generation> {
            if self.fail {
                return Err(AgentError::TransportError("status 500".to_string()));
            }
            Ok(Generation {
                text: format!("{} says: {}", request.worker, request.prompt),
            })
        }

        async fn list_available(&self) -> AgentResult<Vec<String>> {
            Ok(vec![])
        }

        async fn create(&self, _name: &str, _definition: &str) -> AgentResult<()> {
            Ok(())
        }
    }

    #[derive(Default)]
    struct RecordingKnowledge {
        entries: StdMutex<Vec<NewKnowledgeEntry>>,
        broken: bool,
    }

    #[async_trait]
    impl KnowledgeRepository for RecordingKnowledge {
        async fn record(&self, entry: NewKnowledgeEntry) -> StoreResult<i64> {
            if self.broken {
                return Err(StoreError::NotFound("knowledge table".to_string()));
            }
            let mut entries = self.entries.lock().unwrap();
            entries.push(entry);
            Ok(entries.len() as i64)
        }

        async fn categories(&self) -> StoreResult<Vec<String>> {
            Ok(vec![])
        }

        async fn by_category(&self, _category: &str) -> StoreResult<Vec<KnowledgeEntry>> {
            Ok(vec![])
        }

        async fn search(&self, _term: &str) -> StoreResult<Vec<KnowledgeEntry>> {
            Ok(vec![])
        }
    }

    fn gateway(fail: bool, knowledge: Arc<RecordingKnowledge>) -> WorkerGateway {
        WorkerGateway::new(
            Arc::new(EchoBackend { fail }),
            knowledge,
            ["vision".to_string()].into_iter().collect(),
        )
    }

    #[tokio::test]
    async fn test_invoke_logs_exchange_with_default_category() {
        let knowledge = Arc::new(RecordingKnowledge::default());
        let gateway = gateway(false, knowledge.clone());

        let text = gateway
            .invoke("vision", "hello", GenerationParams::default(), Some(7))
            .await
            .unwrap();

        assert_eq!(text, "vision says: hello");
        let entries = knowledge.entries.lock().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].category, "Général");
        assert_eq!(entries[0].project_id, Some(7));
        assert_eq!(entries[0].query.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn test_unknown_worker_is_rejected() {
        let knowledge = Arc::new(RecordingKnowledge::default());
        let gateway = gateway(false, knowledge.clone());

        let result = gateway
            .invoke("ghost", "hello", GenerationParams::default(), None)
            .await;

        assert!(matches!(result, Err(AgentError::UnknownWorker(_))));
        assert!(knowledge.entries.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_ask_returns_in_band_error_text() {
        let gateway = gateway(true, Arc::new(RecordingKnowledge::default()));

        let text = gateway.ask("vision", "hello", GenerationParams::default()).await;

        assert!(text.starts_with("Error communicating with the agent"));
    }

    #[tokio::test]
    async fn test_knowledge_failure_does_not_fail_invocation() {
        let knowledge = Arc::new(RecordingKnowledge {
            broken: true,
            ..Default::default()
        });
        let gateway = gateway(false, knowledge);

        let result = gateway
            .invoke("vision", "hello", GenerationParams::default(), None)
            .await;

        assert!(result.is_ok());
    }
}
