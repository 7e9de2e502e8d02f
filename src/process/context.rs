use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// The variable bag owned by one process instance.
///
/// Executors and edge conditions read and write it during execution. Bulk
/// reads return a copy so callers cannot mutate engine-owned state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionContext {
    id: String,
    variables: Map<String, JsonValue>,
}

impl Default for ExecutionContext {
    fn default() -> Self {
        Self::new()
    }
}

impl ExecutionContext {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            variables: Map::new(),
        }
    }

    pub fn with_variables(variables: Map<String, JsonValue>) -> Self {
        let mut context = Self::new();
        context.variables = variables;
        context
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<JsonValue>) {
        self.variables.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.variables.get(name)
    }

    /// Reads a variable as `T`, falling back to `default` if it is unset,
    /// null, or of another type.
    pub fn get_or<T: DeserializeOwned>(&self, name: &str, default: T) -> T {
        self.variables
            .get(name)
            .filter(|v| !v.is_null())
            .and_then(|v| serde_json::from_value(v.clone()).ok())
            .unwrap_or(default)
    }

    pub fn has(&self, name: &str) -> bool {
        self.variables.contains_key(name)
    }

    pub fn remove(&mut self, name: &str) -> Option<JsonValue> {
        self.variables.remove(name)
    }

    /// A copy of every variable.
    pub fn variables(&self) -> Map<String, JsonValue> {
        self.variables.clone()
    }

    /// Merges `variables` in, overwriting existing names.
    pub fn extend(&mut self, variables: Map<String, JsonValue>) {
        self.variables.extend(variables);
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }
}
