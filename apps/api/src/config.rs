//! Application and pipeline configuration
//!
//! `AppConfig` is read from the environment (after `.env` is loaded).
//! `PipelineConfig` is the ordered step list plus the worker set. Every
//! step-number, step-id and agent lookup in the crate goes through it.

use std::collections::HashSet;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::workflow::WorkflowStepDefinition;

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Failed to read pipeline file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse pipeline file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(String),
}

/// A named text-generation worker
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerDefinition {
    pub name: String,
    pub title: String,
    pub description: String,
}

/// Sampling parameters for one worker invocation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
        }
    }
}

/// Ordered pipeline and the workers that own its steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub workers: Vec<WorkerDefinition>,
    pub steps: Vec<WorkflowStepDefinition>,
    #[serde(default)]
    pub generation: GenerationParams,
}

impl PipelineConfig {
    /// Reads a pipeline from a JSON file and validates it
    pub fn from_file(path: &std::path::Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        let pipeline: PipelineConfig = serde_json::from_str(&raw)?;
        pipeline.validate()?;
        Ok(pipeline)
    }

    /// Checks that step ids are unique and every step is owned by a declared worker
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.steps.is_empty() {
            return Err(ConfigError::InvalidPipeline("pipeline has no steps".to_string()));
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if !seen.insert(step.id.as_str()) {
                return Err(ConfigError::InvalidPipeline(format!(
                    "duplicate step id {}",
                    step.id
                )));
            }
            if self.worker(&step.agent).is_none() {
                return Err(ConfigError::InvalidPipeline(format!(
                    "step {} is owned by undeclared worker {}",
                    step.id, step.agent
                )));
            }
        }

        Ok(())
    }

    /// Names of every configured worker
    pub fn worker_names(&self) -> HashSet<String> {
        self.workers.iter().map(|w| w.name.clone()).collect()
    }

    pub fn worker(&self, name: &str) -> Option<&WorkerDefinition> {
        self.workers.iter().find(|w| w.name == name)
    }

    /// Display title of a worker, falling back to its name
    pub fn worker_title<'a>(&'a self, name: &'a str) -> &'a str {
        self.worker(name).map(|w| w.title.as_str()).unwrap_or(name)
    }

    /// Position of a step in the pipeline
    pub fn step_index(&self, step_id: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.id == step_id)
    }

    pub fn step(&self, step_id: &str) -> Option<&WorkflowStepDefinition> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// Step at a 1-based step number
    pub fn step_by_number(&self, number: usize) -> Option<&WorkflowStepDefinition> {
        number.checked_sub(1).and_then(|i| self.steps.get(i))
    }

    /// Agent owning a step
    pub fn agent_for_step(&self, step_id: &str) -> Option<&str> {
        self.step(step_id).map(|s| s.agent.as_str())
    }

    /// Steps that run before `step_id`, in pipeline order
    pub fn preceding_steps(&self, step_id: &str) -> &[WorkflowStepDefinition] {
        match self.step_index(step_id) {
            Some(index) => &self.steps[..index],
            None => &[],
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        let worker = |name: &str, title: &str, description: &str| WorkerDefinition {
            name: name.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        };
        let step = |id: &str, agent: &str, title: &str, description: &str| WorkflowStepDefinition {
            id: id.to_string(),
            agent: agent.to_string(),
            title: title.to_string(),
            description: description.to_string(),
        };

        Self {
            workers: vec![
                worker("vision", "Digital Strategist", "frame the strategy and positioning of the project"),
                worker("pixel", "UX/UI Designer", "design the user journeys, wireframes and visual identity"),
                worker("arch", "Technical Architect", "define the technical architecture and stack"),
                worker("script", "Frontend Developer", "implement the user interface"),
                worker("node", "Backend Developer", "build the APIs and server-side services"),
                worker("data", "Database Specialist", "model and optimise the data layer"),
                worker("secure", "Security Expert", "audit the project and recommend protections"),
                worker("test", "QA Tester", "define the test strategy and scenarios"),
                worker("deploy", "DevOps Engineer", "plan deployment and infrastructure"),
                worker("pm", "Project Manager", "plan and coordinate the delivery"),
            ],
            steps: vec![
                step("01_strategic_brief", "vision", "Strategic brief", "Strategic analysis of the project"),
                step("02_ux_design", "pixel", "UX/UI design", "Wireframes and visual design"),
                step("03_architecture", "arch", "Technical architecture", "Definition of the technical architecture"),
                step("04_planning", "pm", "Project planning", "Detailed project schedule"),
                step("05_frontend", "script", "Frontend development", "User interface implementation"),
                step("06_backend", "node", "Backend development", "APIs and services"),
                step("07_database", "data", "Database", "Database design"),
                step("08_security", "secure", "Security audit", "Security analysis and recommendations"),
                step("09_testing", "test", "Test plan", "Test strategy and scenarios"),
                step("10_deployment", "deploy", "Deployment plan", "Deployment strategy and configuration"),
            ],
            generation: GenerationParams::default(),
        }
    }
}

/// Runtime settings for the API server
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub data_dir: PathBuf,
    pub ollama_url: String,
    pub bind_addr: SocketAddr,
    pub step_delay: Duration,
    pub worker_timeout: Option<Duration>,
    pub modelfiles_dir: PathBuf,
    pub bootstrap_agents: bool,
    pub pipeline: PipelineConfig,
}

impl AppConfig {
    /// Reads settings from environment variables, applying defaults
    pub fn from_env() -> Result<Self, ConfigError> {
        let pipeline = match std::env::var("PIPELINE_CONFIG") {
            Ok(path) => PipelineConfig::from_file(std::path::Path::new(&path))?,
            Err(_) => PipelineConfig::default(),
        };

        let bind_addr = env_or("BIND_ADDR", "0.0.0.0:5001");
        let bind_addr = bind_addr.parse().map_err(|_| ConfigError::InvalidValue {
            key: "BIND_ADDR".to_string(),
            value: bind_addr.clone(),
        })?;

        let worker_timeout = match std::env::var("WORKER_TIMEOUT_SECS") {
            Ok(value) => Some(Duration::from_secs(parse_env("WORKER_TIMEOUT_SECS", &value)?)),
            Err(_) => None,
        };

        let step_delay_ms = parse_env("STEP_DELAY_MS", &env_or("STEP_DELAY_MS", "1000"))?;
        let bootstrap_agents = parse_env("BOOTSTRAP_AGENTS", &env_or("BOOTSTRAP_AGENTS", "true"))?;

        Ok(Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or_else(|_| {
                tracing::warn!("DATABASE_URL not set, using default");
                "sqlite://data/db/agency.db?mode=rwc".to_string()
            }),
            data_dir: PathBuf::from(env_or("DATA_DIR", "data")),
            ollama_url: env_or("OLLAMA_URL", "http://localhost:11434"),
            bind_addr,
            step_delay: Duration::from_millis(step_delay_ms),
            worker_timeout,
            modelfiles_dir: PathBuf::from(env_or("MODELFILES_DIR", "agents/modelfiles")),
            bootstrap_agents,
            pipeline,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}
