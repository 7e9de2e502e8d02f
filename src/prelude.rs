//! Prelude module for convenient imports
//!
//! Re-exports the types needed to parse a flowchart, run it and observe the
//! run, so most callers only need `use nagare::prelude::*;`.
//!
//! # Example
//!
//! ```rust,no_run
//! use nagare::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let source = std::fs::read_to_string("path/to/flow.mmd")?;
//! let graph = FlowParser::new().parse(&source)?;
//! println!("{}", graph);
//!
//! let engine = ProcessEngine::new();
//! let mut instance = ProcessInstance::new("flow");
//! engine.execute_graph(&mut instance, &graph)?;
//! println!("Finished as {}", instance.status);
//! # Ok(())
//! # }
//! ```

// Front-end
pub use crate::ast::{Direction, Flowchart, NodeShape};
pub use crate::graph::{CompiledFlow, FlowGraph, GraphEdge, GraphNode};
pub use crate::syntax::FlowParser;

// Execution
pub use crate::engine::{EngineConfig, ProcessEngine};
pub use crate::executor::{
    NodeExecutionResult, NodeExecutionStatus, NodeExecutor, NodeExecutorRegistry,
};
pub use crate::expression::{ConditionEngine, ExpressionEngine, Value};
pub use crate::process::{ExecutionContext, ProcessInstance, ProcessStatus};

// Events
pub use crate::event::{EventListener, EventLog, EventPublisher, EventType, ProcessEvent};

// Services
pub use crate::service::{DefinitionService, InstanceService};

// Error types
pub use crate::error::{EngineError, ExpressionError, ParseError, ServiceError};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
