//! In-memory stores for definitions and instances.
//!
//! Records are cloned in and out, so callers never hold a reference into the
//! store across a lock.

use crate::process::{ProcessDefinition, ProcessInstance, ProcessStatus};
use indexmap::IndexMap;
use parking_lot::RwLock;

/// Insertion-ordered records keyed by id.
#[derive(Debug)]
struct Records<T> {
    rows: RwLock<IndexMap<String, T>>,
}

impl<T> Default for Records<T> {
    fn default() -> Self {
        Self {
            rows: RwLock::new(IndexMap::new()),
        }
    }
}

impl<T: Clone> Records<T> {
    fn put(&self, id: &str, record: T) {
        self.rows.write().insert(id.to_string(), record);
    }

    fn get(&self, id: &str) -> Option<T> {
        self.rows.read().get(id).cloned()
    }

    fn filter(&self, predicate: impl Fn(&T) -> bool) -> Vec<T> {
        self.rows
            .read()
            .values()
            .filter(|r| predicate(r))
            .cloned()
            .collect()
    }

    fn all(&self) -> Vec<T> {
        self.rows.read().values().cloned().collect()
    }

    /// Computes a record from the current rows and inserts it under one write lock.
    fn put_with(&self, make: impl FnOnce(&IndexMap<String, T>) -> (String, T)) -> T {
        let mut rows = self.rows.write();
        let (id, record) = make(&rows);
        rows.insert(id, record.clone());
        record
    }

    fn remove(&self, id: &str) -> Option<T> {
        self.rows.write().shift_remove(id)
    }

    fn len(&self) -> usize {
        self.rows.read().len()
    }
}

#[derive(Debug, Default)]
pub struct DefinitionStore {
    records: Records<ProcessDefinition>,
}

impl DefinitionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the definition with the same id.
    pub fn save(&self, definition: ProcessDefinition) -> ProcessDefinition {
        self.records.put(&definition.id, definition.clone());
        definition
    }

    /// Stores `definition` as the next version of its name. Concurrent callers
    /// always receive distinct versions.
    pub fn save_next_version(&self, mut definition: ProcessDefinition) -> ProcessDefinition {
        self.records.put_with(|rows| {
            definition.version = rows
                .values()
                .filter(|d| d.name == definition.name)
                .map(|d| d.version)
                .max()
                .unwrap_or(0)
                + 1;
            (definition.id.clone(), definition)
        })
    }

    pub fn find_by_id(&self, id: &str) -> Option<ProcessDefinition> {
        self.records.get(id)
    }

    /// Every version stored under `name`.
    pub fn find_by_name(&self, name: &str) -> Vec<ProcessDefinition> {
        self.records.filter(|d| d.name == name)
    }

    /// Highest version stored under `name`, or 0 if there is none.
    pub fn max_version(&self, name: &str) -> u32 {
        self.find_by_name(name)
            .iter()
            .map(|d| d.version)
            .max()
            .unwrap_or(0)
    }

    pub fn find_all(&self) -> Vec<ProcessDefinition> {
        self.records.all()
    }

    pub fn delete(&self, id: &str) -> Option<ProcessDefinition> {
        self.records.remove(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Default)]
pub struct InstanceStore {
    records: Records<ProcessInstance>,
}

impl InstanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces the instance with the same id.
    pub fn save(&self, instance: ProcessInstance) -> ProcessInstance {
        self.records.put(&instance.id, instance.clone());
        instance
    }

    pub fn find_by_id(&self, id: &str) -> Option<ProcessInstance> {
        self.records.get(id)
    }

    pub fn find_by_definition_id(&self, definition_id: &str) -> Vec<ProcessInstance> {
        self.records.filter(|i| i.definition_id == definition_id)
    }

    pub fn find_by_business_key(&self, business_key: &str) -> Option<ProcessInstance> {
        self.records
            .filter(|i| i.business_key.as_deref() == Some(business_key))
            .into_iter()
            .next()
    }

    pub fn find_by_status(&self, status: ProcessStatus) -> Vec<ProcessInstance> {
        self.records.filter(|i| i.status == status)
    }

    pub fn find_all(&self) -> Vec<ProcessInstance> {
        self.records.all()
    }

    pub fn delete(&self, id: &str) -> Option<ProcessInstance> {
        self.records.remove(id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
