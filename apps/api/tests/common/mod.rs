//! Test doubles shared by the integration suites

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Notify;

use webagency_api::agents::{
    AgentError, AgentResult, Generation, GenerationRequest, StepExecutor, TextGenerator,
};
use webagency_api::config::{PipelineConfig, WorkerDefinition};
use webagency_api::domain::project::{Project, ProjectStatus};
use webagency_api::domain::repositories::{
    ProjectRepository, SnapshotStore, StoreError, StoreResult,
};
use webagency_api::domain::workflow::{StepOutcome, WorkflowState, WorkflowStepDefinition};
use webagency_api::workflow::{ProjectWorkflow, WorkflowDeps, WorkflowReport};

/// Pipeline of `n` steps, each owned by its own worker `w1..wn`
pub fn pipeline(n: usize) -> PipelineConfig {
    let workers = (1..=n)
        .map(|i| WorkerDefinition {
            name: format!("w{}", i),
            title: format!("Worker {}", i),
            description: format!("handles step {}", i),
        })
        .collect();
    let steps = (1..=n)
        .map(|i| WorkflowStepDefinition {
            id: format!("{:02}_step", i),
            agent: format!("w{}", i),
            title: format!("Step {}", i),
            description: format!("Produce deliverable {}", i),
        })
        .collect();

    PipelineConfig {
        workers,
        steps,
        generation: Default::default(),
    }
}

// ---------------------------------------------------------------------------
// Projects
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct InMemoryProjects {
    rows: Mutex<Vec<Project>>,
}

impl InMemoryProjects {
    pub fn with(names: &[&str]) -> Arc<Self> {
        let repo = Self::default();
        {
            let mut rows = repo.rows.lock().unwrap();
            for (i, name) in names.iter().enumerate() {
                rows.push(Project {
                    id: i as i64 + 1,
                    name: name.to_string(),
                    description: None,
                    status: ProjectStatus::Created,
                    created_at: Utc::now(),
                });
            }
        }
        Arc::new(repo)
    }

    pub fn status_of(&self, name: &str) -> Option<ProjectStatus> {
        let rows = self.rows.lock().unwrap();
        rows.iter().find(|p| p.name == name).map(|p| p.status)
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjects {
    async fn create(&self, name: &str, description: Option<&str>) -> StoreResult<Project> {
        let mut rows = self.rows.lock().unwrap();
        let project = Project {
            id: rows.len() as i64 + 1,
            name: name.to_string(),
            description: description.map(str::to_string),
            status: ProjectStatus::Created,
            created_at: Utc::now(),
        };
        rows.push(project.clone());
        Ok(project)
    }

    async fn find_by_name(&self, name: &str) -> StoreResult<Option<Project>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|p| p.name == name).cloned())
    }

    async fn find_by_id(&self, id: i64) -> StoreResult<Option<Project>> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().find(|p| p.id == id).cloned())
    }

    async fn list(&self) -> StoreResult<Vec<Project>> {
        let mut rows = self.rows.lock().unwrap().clone();
        rows.reverse();
        Ok(rows)
    }

    async fn update_status(&self, name: &str, status: ProjectStatus) -> StoreResult<()> {
        let mut rows = self.rows.lock().unwrap();
        match rows.iter_mut().find(|p| p.name == name) {
            Some(project) => {
                project.status = status;
                Ok(())
            }
            None => Err(StoreError::NotFound(format!("project '{}'", name))),
        }
    }
}

// ---------------------------------------------------------------------------
// Snapshots
// ---------------------------------------------------------------------------

/// Keeps every saved snapshot, last one wins on load
#[derive(Default)]
pub struct MemorySnapshots {
    saved: Mutex<HashMap<String, Vec<WorkflowState>>>,
}

impl MemorySnapshots {
    pub fn history(&self, project: &str) -> Vec<WorkflowState> {
        self.saved
            .lock()
            .unwrap()
            .get(project)
            .cloned()
            .unwrap_or_default()
    }

    pub fn latest(&self, project: &str) -> Option<WorkflowState> {
        self.history(project).pop()
    }
}

#[async_trait]
impl SnapshotStore for MemorySnapshots {
    async fn save(&self, state: &WorkflowState) -> StoreResult<()> {
        self.saved
            .lock()
            .unwrap()
            .entry(state.project_name.clone())
            .or_default()
            .push(state.clone());
        Ok(())
    }

    async fn load(&self, project: &str) -> StoreResult<Option<WorkflowState>> {
        Ok(self.latest(project))
    }
}

/// Snapshot store whose writes always fail
#[derive(Default)]
pub struct BrokenSnapshots {
    attempts: AtomicUsize,
}

impl BrokenSnapshots {
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SnapshotStore for BrokenSnapshots {
    async fn save(&self, _state: &WorkflowState) -> StoreResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(StoreError::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "read-only data directory",
        )))
    }

    async fn load(&self, _project: &str) -> StoreResult<Option<WorkflowState>> {
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Step executors
// ---------------------------------------------------------------------------

/// Step executor stub with scripted failures and an optional gate
///
/// When a step id is gated, its execution blocks until `release()` is called.
#[derive(Default)]
pub struct ScriptedExecutor {
    failing: HashSet<String>,
    panicking: HashSet<String>,
    gated: HashSet<String>,
    gate: Notify,
    entered: Notify,
    delay: Duration,
    calls: Mutex<Vec<(String, String)>>,
}

impl ScriptedExecutor {
    pub fn succeeding() -> Self {
        Self::default()
    }

    pub fn failing_on(mut self, step_id: &str) -> Self {
        self.failing.insert(step_id.to_string());
        self
    }

    pub fn panicking_on(mut self, step_id: &str) -> Self {
        self.panicking.insert(step_id.to_string());
        self
    }

    pub fn gated_on(mut self, step_id: &str) -> Self {
        self.gated.insert(step_id.to_string());
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Unblock the gated step
    pub fn release(&self) {
        self.gate.notify_one();
    }

    /// Wait until a gated step has started executing
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn executed_steps(&self) -> Vec<String> {
        self.calls().into_iter().map(|(_, step)| step).collect()
    }
}

#[async_trait]
impl StepExecutor for ScriptedExecutor {
    async fn execute(&self, project: &str, step_id: &str, agent: &str) -> StepOutcome {
        self.calls
            .lock()
            .unwrap()
            .push((project.to_string(), step_id.to_string()));

        if self.gated.contains(step_id) {
            self.entered.notify_one();
            self.gate.notified().await;
        }
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        if self.panicking.contains(step_id) {
            panic!("executor crashed on {}", step_id);
        }
        if self.failing.contains(step_id) {
            StepOutcome::failed(step_id, agent, "scripted failure")
        } else {
            StepOutcome::succeeded(step_id, agent, format!("{}/{}.md", project, step_id))
        }
    }
}

// ---------------------------------------------------------------------------
// Text generation
// ---------------------------------------------------------------------------

/// Backend stub recording the time window of every call
pub struct RecordingGenerator {
    pub latency: Duration,
    pub available: Mutex<Vec<String>>,
    pub created: Mutex<Vec<(String, String)>>,
    pub windows: Mutex<Vec<(String, Instant, Instant)>>,
    pub prompts: Mutex<Vec<(String, String)>>,
    pub fail_workers: HashSet<String>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl RecordingGenerator {
    pub fn new(latency: Duration) -> Self {
        Self {
            latency,
            available: Mutex::new(Vec::new()),
            created: Mutex::new(Vec::new()),
            windows: Mutex::new(Vec::new()),
            prompts: Mutex::new(Vec::new()),
            fail_workers: HashSet::new(),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }

    pub fn failing_for(mut self, worker: &str) -> Self {
        self.fail_workers.insert(worker.to_string());
        self
    }

    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    pub fn call_windows(&self) -> Vec<(String, Instant, Instant)> {
        self.windows.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for RecordingGenerator {
    async fn generate(&self, request: &GenerationRequest) -> AgentResult<Generation> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);
        let started = Instant::now();

        self.prompts
            .lock()
            .unwrap()
            .push((request.worker.clone(), request.prompt.clone()));
        tokio::time::sleep(self.latency).await;

        let finished = Instant::now();
        self.windows
            .lock()
            .unwrap()
            .push((request.worker.clone(), started, finished));
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        if self.fail_workers.contains(&request.worker) {
            return Err(AgentError::TransportError("connection refused".to_string()));
        }

        Ok(Generation {
            text: format!("Deliverable from {}", request.worker),
        })
    }

    async fn list_available(&self) -> AgentResult<Vec<String>> {
        Ok(self.available.lock().unwrap().clone())
    }

    async fn create(&self, name: &str, definition: &str) -> AgentResult<()> {
        self.created
            .lock()
            .unwrap()
            .push((name.to_string(), definition.to_string()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Workflow helpers
// ---------------------------------------------------------------------------

pub fn deps(
    executor: Arc<dyn StepExecutor>,
    projects: Arc<dyn ProjectRepository>,
    snapshots: Arc<dyn SnapshotStore>,
    pipeline: PipelineConfig,
) -> WorkflowDeps {
    WorkflowDeps {
        executor,
        projects,
        snapshots,
        pipeline: Arc::new(pipeline),
        step_delay: Duration::from_millis(1),
    }
}

/// Poll `status()` until `done` holds, panicking after five seconds
pub async fn wait_until<F>(workflow: &ProjectWorkflow, done: F) -> WorkflowReport
where
    F: Fn(&WorkflowReport) -> bool,
{
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let report = workflow.status().await;
        if done(&report) {
            return report;
        }
        assert!(Instant::now() < deadline, "timed out waiting, last report: {:?}", report);
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
}

pub fn is_finished(report: &WorkflowReport) -> bool {
    report.status.is_terminal()
}
