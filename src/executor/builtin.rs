use super::{NodeExecutionResult, NodeExecutor};
use crate::ast::NodeShape;
use crate::graph::GraphNode;
use crate::process::ExecutionContext;

/// Context key holding the label of the most recent task node.
pub const LAST_EXECUTED_TASK: &str = "lastExecutedTask";

/// Context key set to `true` once an end node has run.
pub const PROCESS_COMPLETED: &str = "processCompleted";

fn named(node: &GraphNode, name: &str) -> bool {
    node.id.eq_ignore_ascii_case(name) || node.label.eq_ignore_ascii_case(name)
}

/// Entry point of a flow. Accepts any circle and has no side effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct StartNodeExecutor;

impl NodeExecutor for StartNodeExecutor {
    fn name(&self) -> &str {
        "start"
    }

    fn supported_shape(&self) -> NodeShape {
        NodeShape::Circle
    }

    fn execute(&self, _node: &GraphNode, _context: &mut ExecutionContext) -> NodeExecutionResult {
        NodeExecutionResult::success()
    }

    fn validate(&self, node: &GraphNode) -> bool {
        node.shape == NodeShape::Circle
    }
}

/// A unit of work. Records its label under [`LAST_EXECUTED_TASK`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TaskNodeExecutor;

impl NodeExecutor for TaskNodeExecutor {
    fn name(&self) -> &str {
        "task"
    }

    fn supported_shape(&self) -> NodeShape {
        NodeShape::Rectangle
    }

    fn execute(&self, node: &GraphNode, context: &mut ExecutionContext) -> NodeExecutionResult {
        context.set(LAST_EXECUTED_TASK, node.label.clone());
        NodeExecutionResult::success()
    }

    fn validate(&self, node: &GraphNode) -> bool {
        node.shape == NodeShape::Rectangle
    }
}

/// A branch point. Routing is done by the engine through edge conditions.
#[derive(Debug, Clone, Copy, Default)]
pub struct DecisionNodeExecutor;

impl NodeExecutor for DecisionNodeExecutor {
    fn name(&self) -> &str {
        "decision"
    }

    fn supported_shape(&self) -> NodeShape {
        NodeShape::Diamond
    }

    fn execute(&self, _node: &GraphNode, _context: &mut ExecutionContext) -> NodeExecutionResult {
        NodeExecutionResult::success()
    }

    fn validate(&self, node: &GraphNode) -> bool {
        node.shape == NodeShape::Diamond
    }
}

/// Terminal circle. Only claims circles whose id or label is `end`, so it must
/// be registered ahead of [`StartNodeExecutor`].
#[derive(Debug, Clone, Copy, Default)]
pub struct EndNodeExecutor;

impl NodeExecutor for EndNodeExecutor {
    fn name(&self) -> &str {
        "end"
    }

    fn supported_shape(&self) -> NodeShape {
        NodeShape::Circle
    }

    fn execute(&self, _node: &GraphNode, context: &mut ExecutionContext) -> NodeExecutionResult {
        context.set(PROCESS_COMPLETED, true);
        NodeExecutionResult::success()
    }

    fn validate(&self, node: &GraphNode) -> bool {
        node.shape == NodeShape::Circle && named(node, "end")
    }
}
