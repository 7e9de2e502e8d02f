use super::{FlowGraph, GraphEdge, GraphNode};
use crate::ast::NodeShape;
use crate::error::ArtifactError;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A parsed flow graph bundled with the source it came from, ready to be
/// stored and executed later without re-parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFlow {
    pub name: String,
    pub source: String,
    pub graph: FlowGraph,
}

// bincode is not self-describing, so the on-disk form never skips fields.
#[derive(Serialize, Deserialize)]
struct FlowRecord {
    name: String,
    source: String,
    nodes: Vec<(String, String, NodeShape)>,
    edges: Vec<(String, String, String, String)>,
}

impl From<&CompiledFlow> for FlowRecord {
    fn from(flow: &CompiledFlow) -> Self {
        Self {
            name: flow.name.clone(),
            source: flow.source.clone(),
            nodes: flow
                .graph
                .nodes
                .iter()
                .map(|n| (n.id.clone(), n.label.clone(), n.shape))
                .collect(),
            edges: flow
                .graph
                .edges
                .iter()
                .map(|e| {
                    (
                        e.from.clone(),
                        e.to.clone(),
                        e.label.clone(),
                        e.condition.clone(),
                    )
                })
                .collect(),
        }
    }
}

impl From<FlowRecord> for CompiledFlow {
    fn from(record: FlowRecord) -> Self {
        let nodes = record
            .nodes
            .into_iter()
            .map(|(id, label, shape)| GraphNode::new(id, label, shape))
            .collect();
        let edges = record
            .edges
            .into_iter()
            .map(|(from, to, label, condition)| GraphEdge {
                from,
                to,
                label,
                condition,
            })
            .collect();
        Self {
            name: record.name,
            source: record.source,
            graph: FlowGraph { nodes, edges },
        }
    }
}

impl CompiledFlow {
    pub fn new(name: impl Into<String>, source: impl Into<String>, graph: FlowGraph) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
            graph,
        }
    }

    /// Serializes the flow to bytes using the bincode format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        encode_to_vec(FlowRecord::from(self), standard())
            .map_err(|e| ArtifactError::Encode(e.to_string()))
    }

    /// Deserializes a compiled flow from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        decode_from_slice::<FlowRecord, _>(bytes, standard())
            .map(|(record, _)| record.into()) // bincode 2 returns a tuple (data, bytes_read)
            .map_err(|e| ArtifactError::Decode(e.to_string()))
    }

    /// Saves the compiled flow to a file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ArtifactError> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        fs::write(path, bytes).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })
    }

    /// Loads a compiled flow from a file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ArtifactError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| ArtifactError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(&bytes)
    }
}
