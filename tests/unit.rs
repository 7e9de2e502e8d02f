//! Unit tests for core Nagare types: contexts, statuses, executors and stores.
mod common;
use common::*;
use nagare::executor::{
    EndNodeExecutor, LAST_EXECUTED_TASK, PROCESS_COMPLETED, StartNodeExecutor, TaskNodeExecutor,
};
use nagare::prelude::*;
use nagare::process::ProcessDefinition;
use nagare::service::{DefinitionStore, InstanceStore};
use serde_json::json;
use std::sync::Arc;

#[test]
fn test_context_typed_reads() {
    let mut ctx = ExecutionContext::new();
    ctx.set("amount", 1500);
    ctx.set("name", "bob");
    ctx.set("nothing", serde_json::Value::Null);

    assert_eq!(ctx.get_or("amount", 0u32), 1500);
    assert_eq!(ctx.get_or("name", 0u32), 0);
    assert_eq!(ctx.get_or("nothing", 7i64), 7);
    assert_eq!(ctx.get_or("missing", String::from("x")), "x");
    assert!(ctx.has("nothing"));
}

#[test]
fn test_context_copies_are_detached() {
    let mut ctx = ExecutionContext::with_variables(vars(&[("a", json!(1))]));
    let mut copy = ctx.variables();
    copy.insert("b".to_string(), json!(2));
    assert_eq!(ctx.len(), 1);

    ctx.extend(copy);
    assert_eq!(ctx.len(), 2);
    assert_eq!(ctx.remove("a"), Some(json!(1)));
    assert!(!ctx.has("a"));
}

#[test]
fn test_context_ids_are_unique() {
    assert_ne!(ExecutionContext::new().id(), ExecutionContext::new().id());
}

#[test]
fn test_status_display_and_terminality() {
    assert_eq!(ProcessStatus::Running.to_string(), "RUNNING");
    assert_eq!(
        serde_json::to_string(&ProcessStatus::Terminated).unwrap(),
        "\"TERMINATED\""
    );
    assert!(ProcessStatus::Completed.is_terminal());
    assert!(!ProcessStatus::Suspended.is_terminal());
}

#[test]
fn test_new_instance_is_running() {
    let instance = ProcessInstance::new("def-1")
        .with_business_key("KEY")
        .with_start_user("alice");
    assert_eq!(instance.status, ProcessStatus::Running);
    assert_eq!(instance.start_user_id.as_deref(), Some("alice"));
    assert!(instance.end_time.is_none());
    assert!(!instance.is_finished());
}

#[test]
fn test_builtin_executors() {
    let mut ctx = ExecutionContext::new();
    let task = GraphNode::new("B", "Review", NodeShape::Rectangle);
    assert!(TaskNodeExecutor.execute(&task, &mut ctx).success);
    assert_eq!(ctx.get(LAST_EXECUTED_TASK), Some(&json!("Review")));

    let end = GraphNode::new("F", "End", NodeShape::Circle);
    let start = GraphNode::new("A", "Start", NodeShape::Circle);
    assert!(EndNodeExecutor.validate(&end));
    assert!(!EndNodeExecutor.validate(&start));
    assert!(StartNodeExecutor.validate(&end));

    EndNodeExecutor.execute(&end, &mut ctx);
    assert_eq!(ctx.get(PROCESS_COMPLETED), Some(&json!(true)));
}

#[test]
fn test_registry_resolution() {
    let registry = NodeExecutorRegistry::with_defaults();
    let end = GraphNode::new("end", "Finish", NodeShape::Circle);
    let start = GraphNode::new("A", "Begin", NodeShape::Circle);
    let soft = GraphNode::new("R", "Soft", NodeShape::RoundRectangle);

    assert_eq!(registry.executor_for(&end).unwrap().name(), "end");
    assert_eq!(registry.executor_for(&start).unwrap().name(), "start");
    assert_eq!(registry.candidate_count(NodeShape::Circle), 2);
    assert!(!registry.has_executor(NodeShape::RoundRectangle));
    assert_eq!(
        registry.executor_for(&soft).err().unwrap().to_string(),
        "No executor found for shape: round_rectangle"
    );
}

#[test]
fn test_registry_falls_back_to_first_candidate() {
    let registry = NodeExecutorRegistry::new().with_executor(FailingExecutor::on("X", "boom"));
    let other = GraphNode::new("Y", "Other", NodeShape::Rectangle);
    assert_eq!(registry.executor_for(&other).unwrap().name(), "failing");
}

#[test]
fn test_registered_first_takes_precedence() {
    let registry = NodeExecutorRegistry::with_defaults();
    registry.register_first(Arc::new(OutputExecutor));
    assert_eq!(
        registry.first_for_shape(NodeShape::Rectangle).unwrap().name(),
        "output"
    );
}

#[test]
fn test_builder_leaves_shared_registry_alone() {
    let shared = Arc::new(NodeExecutorRegistry::with_defaults());
    let before = shared.candidate_count(NodeShape::Rectangle);

    for _ in 0..2 {
        let engine = ProcessEngine::builder()
            .with_registry(Arc::clone(&shared))
            .with_executor(Arc::new(OutputExecutor))
            .build();
        assert_eq!(engine.registry().candidate_count(NodeShape::Rectangle), before + 1);
        assert_eq!(
            engine.registry().first_for_shape(NodeShape::Rectangle).unwrap().name(),
            "output"
        );
    }
    assert_eq!(shared.candidate_count(NodeShape::Rectangle), before);
    assert_eq!(
        shared.first_for_shape(NodeShape::Rectangle).unwrap().name(),
        "task"
    );

    // Without extra executors the engine uses the shared registry itself.
    let engine = ProcessEngine::builder()
        .with_registry(Arc::clone(&shared))
        .build();
    assert!(Arc::ptr_eq(engine.registry(), &shared));
}

/// Registers a round-rectangle executor into its own registry while validating.
struct SelfExtendingExecutor {
    registry: Arc<NodeExecutorRegistry>,
}

impl NodeExecutor for SelfExtendingExecutor {
    fn name(&self) -> &str {
        "self-extending"
    }

    fn supported_shape(&self) -> NodeShape {
        NodeShape::Rectangle
    }

    fn execute(&self, _node: &GraphNode, _context: &mut ExecutionContext) -> NodeExecutionResult {
        NodeExecutionResult::success()
    }

    fn validate(&self, _node: &GraphNode) -> bool {
        if !self.registry.has_executor(NodeShape::RoundRectangle) {
            self.registry.register(Arc::new(RoundedExecutor));
        }
        true
    }
}

struct RoundedExecutor;

impl NodeExecutor for RoundedExecutor {
    fn name(&self) -> &str {
        "rounded"
    }

    fn supported_shape(&self) -> NodeShape {
        NodeShape::RoundRectangle
    }

    fn execute(&self, _node: &GraphNode, _context: &mut ExecutionContext) -> NodeExecutionResult {
        NodeExecutionResult::success()
    }

    fn validate(&self, _node: &GraphNode) -> bool {
        true
    }
}

#[test]
fn test_validate_may_register_executors() {
    let registry = Arc::new(NodeExecutorRegistry::new());
    registry.register(Arc::new(SelfExtendingExecutor {
        registry: Arc::clone(&registry),
    }));

    let task = GraphNode::new("T", "Task", NodeShape::Rectangle);
    assert_eq!(registry.executor_for(&task).unwrap().name(), "self-extending");

    let soft = GraphNode::new("R", "Soft", NodeShape::RoundRectangle);
    assert_eq!(registry.executor_for(&soft).unwrap().name(), "rounded");
}

#[test]
fn test_engine_config_from_json() {
    assert_eq!(EngineConfig::from_json("{}").unwrap().max_steps, 1000);
    assert_eq!(
        EngineConfig::from_json(r#"{"maxSteps": 5}"#).unwrap(),
        EngineConfig::default().with_max_steps(5)
    );
    assert!(EngineConfig::from_json("[]").is_err());
}

#[test]
fn test_instance_store_queries() {
    let store = InstanceStore::new();
    let a = store.save(ProcessInstance::new("d1").with_business_key("K1"));
    store.save(ProcessInstance::new("d1"));
    store.save(ProcessInstance::new("d2"));

    assert_eq!(store.len(), 3);
    assert_eq!(store.find_by_definition_id("d1").len(), 2);
    assert_eq!(store.find_by_business_key("K1").unwrap().id, a.id);
    assert_eq!(store.find_by_status(ProcessStatus::Running).len(), 3);

    assert!(store.delete(&a.id).is_some());
    assert!(store.find_by_id(&a.id).is_none());
    assert_eq!(store.len(), 2);
}

#[test]
fn test_definition_store_versions() {
    let service = DefinitionService::new(Arc::new(DefinitionStore::new()));
    service.create("order", None, LINEAR).unwrap();
    service.create("order", None, LINEAR).unwrap();

    let store = service.store();
    assert_eq!(store.max_version("order"), 2);
    assert_eq!(store.max_version("unknown"), 0);
    let versions: Vec<u32> = store
        .find_by_name("order")
        .iter()
        .map(|d: &ProcessDefinition| d.version)
        .collect();
    assert_eq!(versions, vec![1, 2]);
}
