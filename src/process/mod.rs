//! Process state: the per-instance variable context, instances and definitions.

mod context;
mod definition;
mod instance;

pub use context::ExecutionContext;
pub use definition::{DefinitionStatus, ProcessDefinition};
pub use instance::{ConditionFailure, ProcessInstance, ProcessStatus};
