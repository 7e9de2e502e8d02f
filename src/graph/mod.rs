//! The flat node/edge graph that the process engine executes.

mod artifact;

pub use artifact::CompiledFlow;

use crate::ast::{NodeDecl, NodeShape};
use crate::error::ParseError;
use itertools::Itertools;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A node of the executable graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
    #[serde(rename = "type")]
    pub node_type: String,
    pub shape: NodeShape,
}

impl GraphNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>, shape: NodeShape) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            node_type: shape.as_str().to_string(),
            shape,
        }
    }
}

impl From<&NodeDecl> for GraphNode {
    fn from(decl: &NodeDecl) -> Self {
        GraphNode::new(decl.id.clone(), decl.label.clone(), decl.shape)
    }
}

/// A directed edge. An empty condition is unconditional and is left out of JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub from: String,
    pub to: String,
    pub label: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub condition: String,
}

impl GraphEdge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            label: String::new(),
            condition: String::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_condition(mut self, condition: impl Into<String>) -> Self {
        self.condition = condition.into();
        self
    }

    pub fn is_conditional(&self) -> bool {
        !self.condition.is_empty()
    }
}

/// Nodes and edges with no nesting. Every edge endpoint is present in `nodes`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowGraph {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node(id).is_some()
    }

    /// Edges leaving `id`, in edge-list order.
    pub fn outgoing<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.from == id)
    }

    /// Edges arriving at `id`, in edge-list order.
    pub fn incoming<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a GraphEdge> + 'a {
        self.edges.iter().filter(move |e| e.to == id)
    }

    pub fn has_incoming(&self, id: &str) -> bool {
        self.incoming(id).next().is_some()
    }

    /// Ids referenced by an edge but missing from the node list.
    pub fn dangling_endpoints(&self) -> Vec<&str> {
        self.edges
            .iter()
            .flat_map(|e| [e.from.as_str(), e.to.as_str()])
            .filter(|id| !self.contains_node(id))
            .unique()
            .collect()
    }

    pub fn to_json(&self) -> Result<String, ParseError> {
        serde_json::to_string(self).map_err(|e| ParseError::Json(e.to_string()))
    }

    pub fn to_json_pretty(&self) -> Result<String, ParseError> {
        serde_json::to_string_pretty(self).map_err(|e| ParseError::Json(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ParseError> {
        serde_json::from_str(json).map_err(|e| ParseError::Json(e.to_string()))
    }
}

impl fmt::Display for FlowGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FlowGraph ({} nodes, {} edges)", self.nodes.len(), self.edges.len())?;
        for node in &self.nodes {
            writeln!(f, "  {} [{}] \"{}\"", node.id, node.shape, node.label)?;
        }
        for edge in &self.edges {
            write!(f, "  {} --> {}", edge.from, edge.to)?;
            if !edge.label.is_empty() {
                write!(f, " |{}|", edge.label)?;
            }
            if edge.is_conditional() {
                write!(f, " when {}", edge.condition)?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
