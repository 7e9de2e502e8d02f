use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DefinitionStatus {
    Draft,
    Active,
    Archived,
}

impl fmt::Display for DefinitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DefinitionStatus::Draft => "DRAFT",
            DefinitionStatus::Active => "ACTIVE",
            DefinitionStatus::Archived => "ARCHIVED",
        };
        f.write_str(name)
    }
}

/// A versioned flowchart. Each `create` under an existing name adds a new version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessDefinition {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub version: u32,
    pub source: String,
    /// The parsed graph rendered as indented JSON.
    pub graph_json: String,
    pub status: DefinitionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
