use super::store::DefinitionStore;
use crate::error::ServiceError;
use crate::process::{DefinitionStatus, ProcessDefinition};
use crate::syntax::FlowParser;
use chrono::Utc;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Versioned lifecycle of flowchart definitions: DRAFT, then ACTIVE, then ARCHIVED.
pub struct DefinitionService {
    store: Arc<DefinitionStore>,
    parser: FlowParser,
}

impl Default for DefinitionService {
    fn default() -> Self {
        Self::new(Arc::new(DefinitionStore::new()))
    }
}

impl DefinitionService {
    pub fn new(store: Arc<DefinitionStore>) -> Self {
        Self {
            store,
            parser: FlowParser::new(),
        }
    }

    pub fn store(&self) -> &Arc<DefinitionStore> {
        &self.store
    }

    /// Validates `source` and stores it as the next DRAFT version of `name`.
    pub fn create(
        &self,
        name: &str,
        description: Option<&str>,
        source: &str,
    ) -> Result<ProcessDefinition, ServiceError> {
        let graph_json = self.parser.parse_to_json(source)?;
        let now = Utc::now();

        let definition = self.store.save_next_version(ProcessDefinition {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            description: description.map(str::to_string),
            version: 0,
            source: source.to_string(),
            graph_json,
            status: DefinitionStatus::Draft,
            created_at: now,
            updated_at: now,
        });
        info!(
            definition_id = %definition.id,
            name = %definition.name,
            version = definition.version,
            "Process definition created"
        );
        Ok(definition)
    }

    /// Replaces the source of a DRAFT definition.
    pub fn update(&self, id: &str, source: &str) -> Result<ProcessDefinition, ServiceError> {
        let mut definition = self.require(id)?;
        if definition.status != DefinitionStatus::Draft {
            return Err(ServiceError::InvalidState {
                id: id.to_string(),
                expected: DefinitionStatus::Draft.to_string(),
                actual: definition.status.to_string(),
            });
        }

        definition.graph_json = self.parser.parse_to_json(source)?;
        definition.source = source.to_string();
        definition.updated_at = Utc::now();
        info!(definition_id = %id, "Process definition updated");
        Ok(self.store.save(definition))
    }

    pub fn deploy(&self, id: &str) -> Result<ProcessDefinition, ServiceError> {
        self.transition(id, DefinitionStatus::Active)
    }

    pub fn archive(&self, id: &str) -> Result<ProcessDefinition, ServiceError> {
        self.transition(id, DefinitionStatus::Archived)
    }

    pub fn get(&self, id: &str) -> Option<ProcessDefinition> {
        self.store.find_by_id(id)
    }

    /// The highest version stored under `name`.
    pub fn latest_version(&self, name: &str) -> Option<ProcessDefinition> {
        self.store
            .find_by_name(name)
            .into_iter()
            .max_by_key(|d| d.version)
    }

    pub fn list_all(&self) -> Vec<ProcessDefinition> {
        self.store.find_all()
    }

    pub(crate) fn require(&self, id: &str) -> Result<ProcessDefinition, ServiceError> {
        self.store
            .find_by_id(id)
            .ok_or_else(|| ServiceError::DefinitionNotFound(id.to_string()))
    }

    fn transition(
        &self,
        id: &str,
        status: DefinitionStatus,
    ) -> Result<ProcessDefinition, ServiceError> {
        let mut definition = self.require(id)?;
        definition.status = status;
        definition.updated_at = Utc::now();
        info!(definition_id = %id, status = %status, "Process definition status changed");
        Ok(self.store.save(definition))
    }
}
