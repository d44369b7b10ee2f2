// Workflow domain module
// Contains the workflow snapshot aggregate, step state and status value objects

pub mod state;
pub mod step;
pub mod value_objects;

// Re-export main types for convenience
pub use state::WorkflowState;
pub use step::{StepOutcome, StepState, WorkflowStepDefinition};
pub use value_objects::{StepStatus, WorkflowStatus};
