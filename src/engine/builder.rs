use super::{EngineConfig, ProcessEngine};
use crate::event::EventPublisher;
use crate::executor::{NodeExecutor, NodeExecutorRegistry};
use crate::expression::{ConditionEngine, ExpressionEngine};
use std::sync::Arc;

/// Assembles a [`ProcessEngine`]. Anything not supplied falls back to the
/// built-in executors, a [`ConditionEngine`] and an empty publisher.
#[derive(Default)]
pub struct ProcessEngineBuilder {
    registry: Option<Arc<NodeExecutorRegistry>>,
    expressions: Option<Arc<dyn ExpressionEngine>>,
    publisher: Option<Arc<EventPublisher>>,
    extra_executors: Vec<Arc<dyn NodeExecutor>>,
    config: EngineConfig,
}

impl ProcessEngineBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Uses `registry` as is. If executors are also added with
    /// [`with_executor`](Self::with_executor), the engine gets its own copy of
    /// the registry with them on top and `registry` itself is not changed.
    pub fn with_registry(mut self, registry: Arc<NodeExecutorRegistry>) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Registers `executor` ahead of the candidates already in the registry.
    /// Executors added earlier take precedence over later ones.
    pub fn with_executor(mut self, executor: Arc<dyn NodeExecutor>) -> Self {
        self.extra_executors.push(executor);
        self
    }

    pub fn with_expression_engine(mut self, engine: Arc<dyn ExpressionEngine>) -> Self {
        self.expressions = Some(engine);
        self
    }

    pub fn with_publisher(mut self, publisher: Arc<EventPublisher>) -> Self {
        self.publisher = Some(publisher);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.config.max_steps = max_steps;
        self
    }

    pub fn build(self) -> ProcessEngine {
        let registry = match self.registry {
            Some(shared) if self.extra_executors.is_empty() => shared,
            Some(shared) => Arc::new(shared.snapshot()),
            None => Arc::new(NodeExecutorRegistry::with_defaults()),
        };
        for executor in self.extra_executors.into_iter().rev() {
            registry.register_first(executor);
        }

        ProcessEngine {
            registry,
            expressions: self
                .expressions
                .unwrap_or_else(|| Arc::new(ConditionEngine::new())),
            publisher: self.publisher.unwrap_or_default(),
            config: self.config,
        }
    }
}
