use super::{
    DecisionNodeExecutor, EndNodeExecutor, NodeExecutor, StartNodeExecutor, TaskNodeExecutor,
};
use crate::ast::NodeShape;
use crate::error::ExecutorError;
use crate::graph::GraphNode;
use ahash::AHashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, warn};

/// Maps each shape to its candidate executors, in registration order.
///
/// Read-mostly after construction, but registration is allowed at any time
/// from any thread.
#[derive(Default)]
pub struct NodeExecutorRegistry {
    executors: RwLock<AHashMap<NodeShape, Vec<Arc<dyn NodeExecutor>>>>,
}

impl NodeExecutorRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// The built-in executors. End precedes Start so end-named circles reach it.
    pub fn with_defaults() -> Self {
        Self::from_executors([
            Arc::new(EndNodeExecutor) as Arc<dyn NodeExecutor>,
            Arc::new(StartNodeExecutor),
            Arc::new(TaskNodeExecutor),
            Arc::new(DecisionNodeExecutor),
        ])
    }

    pub fn from_executors(executors: impl IntoIterator<Item = Arc<dyn NodeExecutor>>) -> Self {
        let registry = Self::new();
        for executor in executors {
            registry.register(executor);
        }
        registry
    }

    /// An independent registry holding the same candidates, in the same order.
    pub fn snapshot(&self) -> Self {
        Self {
            executors: RwLock::new(self.executors.read().clone()),
        }
    }

    /// Builder form of [`register`](Self::register).
    pub fn with_executor(self, executor: Arc<dyn NodeExecutor>) -> Self {
        self.register(executor);
        self
    }

    /// Registers `executor` ahead of any existing candidates for its shape,
    /// so it is consulted first.
    pub fn register_first(&self, executor: Arc<dyn NodeExecutor>) {
        debug!(
            executor = executor.name(),
            shape = %executor.supported_shape(),
            "Registering node executor with precedence"
        );
        self.executors
            .write()
            .entry(executor.supported_shape())
            .or_default()
            .insert(0, executor);
    }

    pub fn register(&self, executor: Arc<dyn NodeExecutor>) {
        debug!(
            executor = executor.name(),
            shape = %executor.supported_shape(),
            "Registering node executor"
        );
        self.executors
            .write()
            .entry(executor.supported_shape())
            .or_default()
            .push(executor);
    }

    /// Resolves the executor for `node`: the first candidate that validates it,
    /// else the first candidate registered for its shape.
    ///
    /// `validate` runs without the registry lock held, so an executor may
    /// register others from inside it.
    pub fn executor_for(&self, node: &GraphNode) -> Result<Arc<dyn NodeExecutor>, ExecutorError> {
        let candidates = self
            .executors
            .read()
            .get(&node.shape)
            .filter(|c| !c.is_empty())
            .cloned()
            .ok_or_else(|| ExecutorError::UnsupportedShape {
                shape: node.shape.to_string(),
            })?;

        if let Some(executor) = candidates.iter().find(|c| c.validate(node)) {
            return Ok(Arc::clone(executor));
        }

        let fallback = &candidates[0];
        warn!(
            node_id = %node.id,
            executor = fallback.name(),
            "No executor validated node, using first registered for shape"
        );
        Ok(Arc::clone(fallback))
    }

    /// The first executor registered for `shape`, ignoring validation.
    pub fn first_for_shape(&self, shape: NodeShape) -> Result<Arc<dyn NodeExecutor>, ExecutorError> {
        self.executors
            .read()
            .get(&shape)
            .and_then(|c| c.first().cloned())
            .ok_or_else(|| ExecutorError::UnsupportedShape {
                shape: shape.to_string(),
            })
    }

    pub fn has_executor(&self, shape: NodeShape) -> bool {
        self.executors
            .read()
            .get(&shape)
            .is_some_and(|c| !c.is_empty())
    }

    /// Number of executors registered for `shape`.
    pub fn candidate_count(&self, shape: NodeShape) -> usize {
        self.executors.read().get(&shape).map_or(0, Vec::len)
    }
}
