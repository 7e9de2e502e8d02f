//! Shape-based node execution.
//!
//! Every node is dispatched to a [`NodeExecutor`] chosen by its shape. Several
//! executors may share a shape; the [`NodeExecutorRegistry`] picks the first one
//! whose [`NodeExecutor::validate`] accepts the node.

mod builtin;
mod registry;

pub use builtin::{
    DecisionNodeExecutor, EndNodeExecutor, LAST_EXECUTED_TASK, PROCESS_COMPLETED,
    StartNodeExecutor, TaskNodeExecutor,
};
pub use registry::NodeExecutorRegistry;

use crate::ast::NodeShape;
use crate::graph::GraphNode;
use crate::process::ExecutionContext;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

/// Defines the contract for running one kind of node.
pub trait NodeExecutor: Send + Sync {
    /// A short name used in logs.
    fn name(&self) -> &str;

    fn supported_shape(&self) -> NodeShape;

    fn execute(&self, node: &GraphNode, context: &mut ExecutionContext) -> NodeExecutionResult;

    /// Whether this executor is the right candidate for `node` among those
    /// registered for its shape.
    fn validate(&self, node: &GraphNode) -> bool;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeExecutionStatus {
    Success,
    Failed,
    Waiting,
}

/// The outcome of executing a single node.
///
/// `outputs` of a successful result are merged into the instance context.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeExecutionResult {
    pub success: bool,
    pub error_message: Option<String>,
    pub outputs: Map<String, JsonValue>,
    pub status: NodeExecutionStatus,
}

impl NodeExecutionResult {
    pub fn success() -> Self {
        Self {
            success: true,
            error_message: None,
            outputs: Map::new(),
            status: NodeExecutionStatus::Success,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            error_message: Some(message.into()),
            outputs: Map::new(),
            status: NodeExecutionStatus::Failed,
        }
    }

    /// A successful result that nonetheless reports it is waiting on something.
    /// The engine treats it like `success`.
    pub fn waiting() -> Self {
        Self {
            status: NodeExecutionStatus::Waiting,
            ..Self::success()
        }
    }

    pub fn with_output(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.outputs.insert(name.into(), value.into());
        self
    }
}
