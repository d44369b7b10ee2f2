// Agent system modules
//
// Worker gateway, prompt composition, step processing and feedback intake.
// The workflow engine drives pipelines through the `StepExecutor` seam.

pub mod backend;
pub mod errors;
pub mod feedback;
pub mod gateway;
pub mod manager;
pub mod processor;
pub mod prompts;
pub mod types;

// Re-export main types
pub use backend::{Generation, GenerationRequest, TextGenerator};
pub use errors::{AgentError, AgentResult};
pub use gateway::WorkerGateway;
pub use manager::AgentManager;
pub use processor::{StepExecutor, StepProcessor};
pub use prompts::StepContext;
pub use types::{AgentInfo, AgentStores, BootstrapReport};
