//! Flowchart front-end: lexer, parser and the [`FlowParser`] entry point.

pub mod lexer;
pub mod parser;
pub mod token;

pub use lexer::tokenize;
pub use parser::{NodeRegistry, Parser, parse};
pub use token::{Token, TokenKind};

use crate::ast::Flowchart;
use crate::error::ParseError;
use crate::graph::FlowGraph;
use crate::transform::Transformer;
use tracing::debug;

/// Runs the full text to graph pipeline.
#[derive(Debug, Clone, Copy, Default)]
pub struct FlowParser;

impl FlowParser {
    pub fn new() -> Self {
        Self
    }

    /// Lexes and parses `source` into an AST and its node registry.
    pub fn parse_ast(&self, source: &str) -> Result<(Flowchart, NodeRegistry), ParseError> {
        if source.trim().is_empty() {
            return Err(ParseError::EmptySource);
        }
        let tokens = tokenize(source)?;
        parse(tokens)
    }

    /// Parses `source` into a flat [`FlowGraph`].
    pub fn parse(&self, source: &str) -> Result<FlowGraph, ParseError> {
        let (flowchart, registry) = self.parse_ast(source)?;
        let graph = Transformer::new()
            .with_registry(&registry)
            .transform(&flowchart);
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            direction = %flowchart.direction,
            "Parsed flowchart"
        );
        Ok(graph)
    }

    /// Parses `source` and renders the graph as indented JSON.
    pub fn parse_to_json(&self, source: &str) -> Result<String, ParseError> {
        self.parse(source)?.to_json_pretty()
    }

    /// Parses `source` and renders the graph as single-line JSON.
    pub fn parse_to_compact_json(&self, source: &str) -> Result<String, ParseError> {
        self.parse(source)?.to_json()
    }

    pub fn validate(&self, source: &str) -> bool {
        self.parse(source).is_ok()
    }
}

/// Shorthand for `FlowParser::new().parse(source)`.
pub fn parse_flowchart(source: &str) -> Result<FlowGraph, ParseError> {
    FlowParser::new().parse(source)
}
