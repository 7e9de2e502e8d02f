//! Common test utilities: flowchart fixtures, engines and custom executors.
use nagare::prelude::*;
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;

/// The order approval flow. Orders above 1000 need a manager (`D`), the rest
/// are approved automatically (`E`).
#[allow(dead_code)]
pub const ORDER_APPROVAL: &str = r#"
flowchart TD
    A((Start)) --> B[Receive order]
    B --> C{Amount check}
    C -->|?#amount > 1000| D[Manager approval]
    C -->|?#amount <= 1000| E[Auto approve]
    D --> F((End))
    E --> F
"#;

/// A start node feeding a two-node cycle with no way out.
#[allow(dead_code)]
pub const ENDLESS_LOOP: &str = r#"
flowchart TD
    S((Start)) --> X[Work]
    X --> Y[Again]
    Y --> X
"#;

/// A linear flow whose middle steps live in a subgraph.
#[allow(dead_code)]
pub const WITH_SUBGRAPH: &str = r#"
flowchart LR
    A((Start)) --> B[Prepare]
    subgraph Review stage
        B --> C[Check]
        C --> D[Sign]
    end
    D --> E((End))
"#;

/// A straight line of tasks without any conditions.
#[allow(dead_code)]
pub const LINEAR: &str = r#"
flowchart TD
    A((Start)) --> B[First]
    B --> C[Second]
    C --> D((End))
"#;

/// Builds a variable map from `(name, value)` pairs.
#[allow(dead_code)]
pub fn vars(pairs: &[(&str, JsonValue)]) -> Map<String, JsonValue> {
    pairs
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect()
}

/// An engine that records every event into the returned log.
#[allow(dead_code)]
pub fn engine_with_log() -> (ProcessEngine, Arc<EventLog>) {
    let publisher = Arc::new(EventPublisher::new());
    let log = Arc::new(EventLog::new());
    publisher.subscribe_all(log.clone());
    let engine = ProcessEngine::builder().with_publisher(publisher).build();
    (engine, log)
}

/// A rectangle executor that fails on one node id and ignores every other node.
#[allow(dead_code)]
pub struct FailingExecutor {
    pub node_id: String,
    pub message: String,
}

#[allow(dead_code)]
impl FailingExecutor {
    pub fn on(node_id: &str, message: &str) -> Arc<Self> {
        Arc::new(Self {
            node_id: node_id.to_string(),
            message: message.to_string(),
        })
    }
}

impl NodeExecutor for FailingExecutor {
    fn name(&self) -> &str {
        "failing"
    }

    fn supported_shape(&self) -> NodeShape {
        NodeShape::Rectangle
    }

    fn execute(&self, _node: &GraphNode, _context: &mut ExecutionContext) -> NodeExecutionResult {
        NodeExecutionResult::failed(self.message.clone())
    }

    fn validate(&self, node: &GraphNode) -> bool {
        node.id == self.node_id
    }
}

/// A rectangle executor that writes an output variable named after the node.
#[allow(dead_code)]
pub struct OutputExecutor;

impl NodeExecutor for OutputExecutor {
    fn name(&self) -> &str {
        "output"
    }

    fn supported_shape(&self) -> NodeShape {
        NodeShape::Rectangle
    }

    fn execute(&self, node: &GraphNode, _context: &mut ExecutionContext) -> NodeExecutionResult {
        NodeExecutionResult::success().with_output(format!("visited_{}", node.id), true)
    }

    fn validate(&self, _node: &GraphNode) -> bool {
        true
    }
}
