//! The process engine: walks a [`FlowGraph`] for one [`ProcessInstance`],
//! dispatching each node to its executor and routing along edges whose
//! conditions hold.
//!
//! Traversal is breadth-first over a FIFO queue. A node whose executor reports
//! failure suspends the instance; a node with no eligible successor completes
//! it. Everything else that goes wrong terminates the instance and is returned
//! as an [`EngineError`].

mod builder;
mod config;

pub use builder::ProcessEngineBuilder;
pub use config::{DEFAULT_MAX_STEPS, EngineConfig};

use crate::ast::NodeShape;
use crate::error::{EngineError, ExecutionError};
use crate::event::{EventPublisher, ProcessEvent};
use crate::executor::NodeExecutorRegistry;
use crate::expression::ExpressionEngine;
use crate::graph::{FlowGraph, GraphNode};
use crate::process::{ConditionFailure, ProcessInstance};
use crate::syntax::FlowParser;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::{Level, debug, info, warn};

pub struct ProcessEngine {
    registry: Arc<NodeExecutorRegistry>,
    expressions: Arc<dyn ExpressionEngine>,
    publisher: Arc<EventPublisher>,
    config: EngineConfig,
}

impl Default for ProcessEngine {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl ProcessEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> ProcessEngineBuilder {
        ProcessEngineBuilder::new()
    }

    pub fn registry(&self) -> &Arc<NodeExecutorRegistry> {
        &self.registry
    }

    pub fn publisher(&self) -> &Arc<EventPublisher> {
        &self.publisher
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Parses `source` and runs `instance` through it.
    ///
    /// Returns `Ok` when the instance ends up COMPLETED or SUSPENDED. On `Err`
    /// the instance has already been moved to TERMINATED, unless it was
    /// COMPLETED or TERMINATED to begin with, in which case it is untouched.
    pub fn execute(&self, instance: &mut ProcessInstance, source: &str) -> Result<(), EngineError> {
        ensure_not_finished(instance)?;
        self.announce_start(instance);
        let outcome = FlowParser::new()
            .parse(source)
            .map_err(ExecutionError::from)
            .and_then(|graph| self.run(instance, &graph));
        self.finish(instance, outcome)
    }

    /// Runs `instance` through an already parsed graph.
    pub fn execute_graph(
        &self,
        instance: &mut ProcessInstance,
        graph: &FlowGraph,
    ) -> Result<(), EngineError> {
        ensure_not_finished(instance)?;
        self.announce_start(instance);
        let outcome = self.run(instance, graph);
        self.finish(instance, outcome)
    }

    fn announce_start(&self, instance: &ProcessInstance) {
        info!(
            instance_id = %instance.id,
            definition_id = %instance.definition_id,
            "Process started"
        );
        self.publisher.publish(&ProcessEvent::process_started(
            &instance.id,
            &instance.definition_id,
            instance.context.variables(),
        ));
    }

    fn finish(
        &self,
        instance: &mut ProcessInstance,
        outcome: Result<(), ExecutionError>,
    ) -> Result<(), EngineError> {
        let Err(cause) = outcome else {
            return Ok(());
        };

        let reason = cause.to_string();
        info!(instance_id = %instance.id, error = %reason, "Process terminated");
        instance.mark_terminated(Some(reason.clone()));
        self.publisher
            .publish(&ProcessEvent::process_terminated(&instance.id, reason));
        Err(EngineError::new(instance.id.clone(), cause))
    }

    fn run(&self, instance: &mut ProcessInstance, graph: &FlowGraph) -> Result<(), ExecutionError> {
        let start = find_start_node(graph).ok_or(ExecutionError::NoStartNode)?;
        instance.mark_running();
        instance.current_node_id = Some(start.id.clone());

        let mut pending = VecDeque::from([start.id.clone()]);
        let mut steps = 0;

        while let Some(node_id) = pending.pop_front() {
            if steps >= self.config.max_steps {
                return Err(ExecutionError::LoopLimitExceeded {
                    max_steps: self.config.max_steps,
                });
            }
            steps += 1;

            let node = graph
                .node(&node_id)
                .ok_or_else(|| ExecutionError::NodeNotFound(node_id.clone()))?;
            instance.current_node_id = Some(node.id.clone());
            self.publisher.publish(&ProcessEvent::node_started(
                &instance.id,
                &node.id,
                &node.label,
            ));

            let executor = self.registry.executor_for(node)?;
            debug!(
                instance_id = %instance.id,
                node_id = %node.id,
                executor = executor.name(),
                step = steps,
                "Executing node"
            );
            let result = executor.execute(node, &mut instance.context);
            self.publisher.publish(&ProcessEvent::node_completed(
                &instance.id,
                &node.id,
                result.clone(),
            ));

            if !result.success {
                info!(
                    instance_id = %instance.id,
                    node_id = %node.id,
                    reason = result.error_message.as_deref().unwrap_or_default(),
                    "Process suspended"
                );
                instance.mark_suspended(result.error_message.clone());
                self.publisher.publish(&ProcessEvent::process_suspended(
                    &instance.id,
                    &node.id,
                    result.error_message,
                ));
                return Ok(());
            }
            instance.context.extend(result.outputs);

            let next = self.next_nodes(instance, graph, node);
            if next.is_empty() {
                instance.mark_completed();
                info!(instance_id = %instance.id, steps, "Process completed");
                self.publisher.publish(&ProcessEvent::process_completed(
                    &instance.id,
                    instance.context.variables(),
                ));
                return Ok(());
            }
            pending.extend(next);
        }

        Ok(())
    }

    /// Targets of the outgoing edges of `node` that may be taken, in edge order.
    fn next_nodes(
        &self,
        instance: &mut ProcessInstance,
        graph: &FlowGraph,
        node: &GraphNode,
    ) -> Vec<String> {
        let mut next = Vec::new();

        for edge in graph.outgoing(&node.id) {
            if !edge.is_conditional() {
                next.push(edge.to.clone());
                continue;
            }

            match self.expressions.evaluate(&edge.condition, &instance.context) {
                Ok(taken) => {
                    if tracing::enabled!(Level::DEBUG) {
                        let explanation = self
                            .expressions
                            .explain(&edge.condition, &instance.context)
                            .unwrap_or_else(|| edge.condition.clone());
                        debug!(
                            instance_id = %instance.id,
                            from = %edge.from,
                            to = %edge.to,
                            taken,
                            "Condition {}",
                            explanation
                        );
                    }
                    if taken {
                        next.push(edge.to.clone());
                    }
                }
                Err(e) => {
                    warn!(
                        instance_id = %instance.id,
                        from = %edge.from,
                        to = %edge.to,
                        condition = %edge.condition,
                        error = %e,
                        "Condition evaluation failed, edge skipped"
                    );
                    instance.condition_errors.push(ConditionFailure {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                        condition: edge.condition.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        next
    }
}

fn ensure_not_finished(instance: &ProcessInstance) -> Result<(), EngineError> {
    if instance.status.is_terminal() {
        warn!(instance_id = %instance.id, status = %instance.status, "Refusing to execute finished instance");
        return Err(EngineError::new(
            instance.id.clone(),
            ExecutionError::AlreadyFinished {
                status: instance.status,
            },
        ));
    }
    Ok(())
}

/// The node traversal begins at: the first node whose type, id or label is
/// `start`, or else a circle nothing points at, whichever comes first in node
/// order.
pub fn find_start_node(graph: &FlowGraph) -> Option<&GraphNode> {
    graph.nodes.iter().find(|node| {
        let named_start = node.node_type.eq_ignore_ascii_case("start")
            || node.id.eq_ignore_ascii_case("start")
            || node.label.eq_ignore_ascii_case("start");
        named_start || (node.shape == NodeShape::Circle && !graph.has_incoming(&node.id))
    })
}
