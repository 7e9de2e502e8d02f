//! Abstract syntax tree produced by the flowchart parser.

mod shape;

pub use shape::NodeShape;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Layout direction declared after the `flowchart`/`graph` keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Direction {
    #[default]
    TD,
    TB,
    LR,
    RL,
    BT,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::TD => "TD",
            Direction::TB => "TB",
            Direction::LR => "LR",
            Direction::RL => "RL",
            Direction::BT => "BT",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An explicitly or implicitly declared node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeDecl {
    pub id: String,
    pub label: String,
    pub shape: NodeShape,
}

impl NodeDecl {
    pub fn new(id: impl Into<String>, label: impl Into<String>, shape: NodeShape) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            shape,
        }
    }

    /// A node referenced only by an edge: a rectangle labeled with its own id.
    pub fn implicit(id: &str) -> Self {
        Self::new(id, id, NodeShape::Rectangle)
    }
}

/// A directed edge. An empty `condition` means the edge is unconditional.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeDecl {
    pub from: String,
    pub to: String,
    pub label: String,
    pub condition: String,
}

impl EdgeDecl {
    pub fn is_conditional(&self) -> bool {
        !self.condition.is_empty()
    }
}

/// A `subgraph ... end` block. Purely organisational; it has no effect on routing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubgraphDecl {
    pub title: String,
    pub statements: Vec<AstNode>,
}

/// The root of a parsed flowchart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flowchart {
    pub direction: Direction,
    pub statements: Vec<AstNode>,
}

/// Every syntactic construct of the flowchart language.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AstNode {
    Flowchart(Flowchart),
    Node(NodeDecl),
    Edge(EdgeDecl),
    Subgraph(SubgraphDecl),
}

impl Flowchart {
    /// Visits every statement depth-first, a subgraph before its own statements.
    pub fn walk<'a, F>(&'a self, visit: &mut F)
    where
        F: FnMut(&'a AstNode),
    {
        walk_statements(&self.statements, visit);
    }

    /// Edges in document order, subgraph boundaries ignored.
    pub fn edges(&self) -> Vec<&EdgeDecl> {
        let mut edges = Vec::new();
        self.walk(&mut |node| {
            if let AstNode::Edge(edge) = node {
                edges.push(edge);
            }
        });
        edges
    }
}

fn walk_statements<'a, F>(statements: &'a [AstNode], visit: &mut F)
where
    F: FnMut(&'a AstNode),
{
    for statement in statements {
        visit(statement);
        match statement {
            AstNode::Subgraph(subgraph) => walk_statements(&subgraph.statements, visit),
            AstNode::Flowchart(root) => walk_statements(&root.statements, visit),
            AstNode::Node(_) | AstNode::Edge(_) => {}
        }
    }
}
