// Workflow execution engine
//
// One `ProjectWorkflow` per project drives the ordered pipeline on a
// background task; the registry keeps at most one live engine per project.

pub mod engine;
pub mod errors;
pub mod registry;

pub use engine::{ProjectWorkflow, WorkflowDeps, WorkflowReport};
pub use errors::{WorkflowError, WorkflowResult};
pub use registry::WorkflowRegistry;
