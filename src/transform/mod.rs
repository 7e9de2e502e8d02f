//! Flattens a flowchart AST into an executable [`FlowGraph`].

use crate::ast::{AstNode, Flowchart, NodeDecl};
use crate::graph::{FlowGraph, GraphEdge, GraphNode};
use crate::syntax::NodeRegistry;
use indexmap::IndexMap;

/// Two-pass AST to graph transformer.
///
/// Nodes keep their first known declaration: the preloaded parser registry
/// first, then explicit `Node` statements, then implicit rectangles for edge
/// endpoints that were never declared. Node order follows that sequence.
#[derive(Debug, Default)]
pub struct Transformer {
    nodes: IndexMap<String, GraphNode>,
}

impl Transformer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the transformer with the declarations the parser collected.
    pub fn with_registry(mut self, registry: &NodeRegistry) -> Self {
        self.preload(registry.iter());
        self
    }

    pub fn preload<'a>(&mut self, declarations: impl IntoIterator<Item = &'a NodeDecl>) {
        for decl in declarations {
            self.add_node(decl);
        }
    }

    pub fn transform(mut self, flowchart: &Flowchart) -> FlowGraph {
        // --- 1. Collect declared nodes ---
        self.collect_nodes(&flowchart.statements);

        // --- 2. Emit edges in document order ---
        let mut edges = Vec::new();
        self.emit_edges(&flowchart.statements, &mut edges);

        FlowGraph {
            nodes: self.nodes.into_values().collect(),
            edges,
        }
    }

    fn collect_nodes(&mut self, statements: &[AstNode]) {
        for statement in statements {
            match statement {
                AstNode::Node(decl) => self.add_node(decl),
                AstNode::Subgraph(subgraph) => self.collect_nodes(&subgraph.statements),
                AstNode::Flowchart(root) => self.collect_nodes(&root.statements),
                AstNode::Edge(_) => {}
            }
        }
    }

    fn emit_edges(&mut self, statements: &[AstNode], edges: &mut Vec<GraphEdge>) {
        for statement in statements {
            match statement {
                AstNode::Edge(edge) => {
                    self.ensure_node(&edge.from);
                    self.ensure_node(&edge.to);
                    edges.push(GraphEdge {
                        from: edge.from.clone(),
                        to: edge.to.clone(),
                        label: edge.label.clone(),
                        condition: edge.condition.clone(),
                    });
                }
                AstNode::Subgraph(subgraph) => self.emit_edges(&subgraph.statements, edges),
                AstNode::Flowchart(root) => self.emit_edges(&root.statements, edges),
                AstNode::Node(_) => {}
            }
        }
    }

    fn add_node(&mut self, decl: &NodeDecl) {
        if !self.nodes.contains_key(&decl.id) {
            self.nodes.insert(decl.id.clone(), GraphNode::from(decl));
        }
    }

    fn ensure_node(&mut self, id: &str) {
        if !self.nodes.contains_key(id) {
            self.nodes
                .insert(id.to_string(), GraphNode::from(&NodeDecl::implicit(id)));
        }
    }
}

/// Transforms `flowchart` using the node declarations from `registry`.
pub fn transform(flowchart: &Flowchart, registry: &NodeRegistry) -> FlowGraph {
    Transformer::new().with_registry(registry).transform(flowchart)
}
