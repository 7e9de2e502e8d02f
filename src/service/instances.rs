use super::definitions::DefinitionService;
use super::store::InstanceStore;
use crate::engine::ProcessEngine;
use crate::error::ServiceError;
use crate::event::ProcessEvent;
use crate::process::{ProcessInstance, ProcessStatus};
use serde_json::{Map, Value as JsonValue};
use std::sync::Arc;
use tracing::info;

/// Creates, runs and steers process instances of stored definitions.
pub struct InstanceService {
    store: Arc<InstanceStore>,
    definitions: Arc<DefinitionService>,
    engine: Arc<ProcessEngine>,
}

impl InstanceService {
    pub fn new(
        store: Arc<InstanceStore>,
        definitions: Arc<DefinitionService>,
        engine: Arc<ProcessEngine>,
    ) -> Self {
        Self {
            store,
            definitions,
            engine,
        }
    }

    pub fn store(&self) -> &Arc<InstanceStore> {
        &self.store
    }

    /// Stores a new RUNNING instance of `definition_id` without executing it.
    pub fn create(
        &self,
        definition_id: &str,
        business_key: Option<&str>,
        variables: Map<String, JsonValue>,
    ) -> Result<ProcessInstance, ServiceError> {
        self.definitions.require(definition_id)?;

        let mut instance = ProcessInstance::new(definition_id).with_variables(variables);
        instance.business_key = business_key.map(str::to_string);
        info!(
            instance_id = %instance.id,
            definition_id = %definition_id,
            "Process instance created"
        );
        Ok(self.store.save(instance))
    }

    /// Executes a RUNNING instance and stores the outcome.
    ///
    /// The instance is saved even when execution fails, so a TERMINATED
    /// instance stays inspectable after the error is returned.
    pub fn start(&self, instance_id: &str) -> Result<ProcessInstance, ServiceError> {
        let instance = self.require(instance_id)?;
        self.expect_status(&instance, ProcessStatus::Running)?;
        self.run(instance)
    }

    pub fn create_and_start(
        &self,
        definition_id: &str,
        business_key: Option<&str>,
        variables: Map<String, JsonValue>,
    ) -> Result<ProcessInstance, ServiceError> {
        let instance = self.create(definition_id, business_key, variables)?;
        self.start(&instance.id)
    }

    /// Pauses a RUNNING instance.
    pub fn suspend(&self, instance_id: &str) -> Result<ProcessInstance, ServiceError> {
        let mut instance = self.require(instance_id)?;
        self.expect_status(&instance, ProcessStatus::Running)?;

        instance.mark_suspended(None);
        info!(instance_id = %instance_id, "Process instance suspended");
        Ok(self.store.save(instance))
    }

    /// Resumes a SUSPENDED instance by re-running it from its start node.
    pub fn resume(&self, instance_id: &str) -> Result<ProcessInstance, ServiceError> {
        let mut instance = self.require(instance_id)?;
        self.expect_status(&instance, ProcessStatus::Suspended)?;

        instance.mark_running();
        info!(instance_id = %instance_id, "Process instance resumed");
        let instance = self.store.save(instance);
        self.run(instance)
    }

    /// Stops a RUNNING or SUSPENDED instance for good.
    pub fn terminate(&self, instance_id: &str) -> Result<ProcessInstance, ServiceError> {
        let mut instance = self.require(instance_id)?;
        if instance.status.is_terminal() {
            return Err(ServiceError::InvalidState {
                id: instance.id,
                expected: "RUNNING or SUSPENDED".to_string(),
                actual: instance.status.to_string(),
            });
        }

        instance.mark_terminated(None);
        info!(instance_id = %instance_id, "Process instance terminated");
        self.engine
            .publisher()
            .publish(&ProcessEvent::process_terminated(
                instance_id,
                "terminated by request",
            ));
        Ok(self.store.save(instance))
    }

    pub fn get(&self, instance_id: &str) -> Option<ProcessInstance> {
        self.store.find_by_id(instance_id)
    }

    pub fn find_by_business_key(&self, business_key: &str) -> Option<ProcessInstance> {
        self.store.find_by_business_key(business_key)
    }

    pub fn list_by_definition(&self, definition_id: &str) -> Vec<ProcessInstance> {
        self.store.find_by_definition_id(definition_id)
    }

    pub fn list_by_status(&self, status: ProcessStatus) -> Vec<ProcessInstance> {
        self.store.find_by_status(status)
    }

    pub fn list_all(&self) -> Vec<ProcessInstance> {
        self.store.find_all()
    }

    fn run(&self, mut instance: ProcessInstance) -> Result<ProcessInstance, ServiceError> {
        let definition = self.definitions.require(&instance.definition_id)?;
        let outcome = self.engine.execute(&mut instance, &definition.source);
        let instance = self.store.save(instance);
        outcome?;
        Ok(instance)
    }

    fn require(&self, instance_id: &str) -> Result<ProcessInstance, ServiceError> {
        self.store
            .find_by_id(instance_id)
            .ok_or_else(|| ServiceError::InstanceNotFound(instance_id.to_string()))
    }

    fn expect_status(
        &self,
        instance: &ProcessInstance,
        expected: ProcessStatus,
    ) -> Result<(), ServiceError> {
        if instance.status == expected {
            return Ok(());
        }
        Err(ServiceError::InvalidState {
            id: instance.id.clone(),
            expected: expected.to_string(),
            actual: instance.status.to_string(),
        })
    }
}
