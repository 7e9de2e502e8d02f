use super::token::{Token, TokenKind};
use crate::ast::{AstNode, Direction, EdgeDecl, Flowchart, NodeDecl, NodeShape, SubgraphDecl};
use crate::error::ParseError;
use ahash::AHashSet;
use indexmap::IndexMap;

/// Node declarations collected while parsing, keyed by id in declaration order.
///
/// The first explicit declaration of an id is kept. A node first seen as a bare
/// edge endpoint is recorded as an implicit rectangle, which a later explicit
/// declaration still replaces.
#[derive(Debug, Clone, Default)]
pub struct NodeRegistry {
    nodes: IndexMap<String, NodeDecl>,
    explicit: AHashSet<String>,
}

impl NodeRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records an explicitly shaped node. Returns `false` if an earlier explicit
    /// declaration already claimed the id.
    pub fn declare(&mut self, node: NodeDecl) -> bool {
        if self.explicit.contains(&node.id) {
            return false;
        }
        self.explicit.insert(node.id.clone());
        // `insert` on an existing key keeps the original position.
        self.nodes.insert(node.id.clone(), node);
        true
    }

    /// Records a bare reference, creating an implicit rectangle if the id is unknown.
    pub fn reference(&mut self, id: &str) {
        if !self.nodes.contains_key(id) {
            self.nodes.insert(id.to_string(), NodeDecl::implicit(id));
        }
    }

    pub fn get(&self, id: &str) -> Option<&NodeDecl> {
        self.nodes.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn is_explicit(&self, id: &str) -> bool {
        self.explicit.contains(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &NodeDecl> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Parses a token stream into a flowchart AST plus its node registry.
pub fn parse(tokens: Vec<Token>) -> Result<(Flowchart, NodeRegistry), ParseError> {
    Parser::new(tokens).parse()
}

/// Recursive-descent parser with one token of lookahead.
pub struct Parser {
    tokens: Vec<Token>,
    current: usize,
    registry: NodeRegistry,
}

impl Parser {
    pub fn new(mut tokens: Vec<Token>) -> Self {
        if tokens.last().is_none_or(|t| t.kind != TokenKind::Eof) {
            let (line, column) = tokens.last().map_or((1, 1), |t| (t.line, t.column));
            tokens.push(Token::new(TokenKind::Eof, "", line, column));
        }
        Self {
            tokens,
            current: 0,
            registry: NodeRegistry::new(),
        }
    }

    pub fn parse(mut self) -> Result<(Flowchart, NodeRegistry), ParseError> {
        self.skip_newlines();
        if !self.match_any(&[TokenKind::Flowchart, TokenKind::Graph]) {
            return Err(self.error("Expected 'flowchart' or 'graph' keyword"));
        }
        self.skip_newlines();
        let direction = self.parse_direction();
        self.skip_newlines();
        let statements = self.parse_statements()?;

        Ok((
            Flowchart {
                direction,
                statements,
            },
            self.registry,
        ))
    }

    fn parse_direction(&mut self) -> Direction {
        let direction = match self.peek().kind {
            TokenKind::TD => Direction::TD,
            TokenKind::TB => Direction::TB,
            TokenKind::LR => Direction::LR,
            TokenKind::RL => Direction::RL,
            TokenKind::BT => Direction::BT,
            _ => return Direction::default(),
        };
        self.advance();
        direction
    }

    /// Parses statements until `end` or end of input. The `end` is left for the caller.
    fn parse_statements(&mut self) -> Result<Vec<AstNode>, ParseError> {
        let mut statements = Vec::new();
        loop {
            self.skip_newlines();
            if self.is_at_end() || self.check(TokenKind::End) {
                break;
            }
            statements.push(self.parse_statement()?);
            self.skip_newlines();
        }
        Ok(statements)
    }

    fn parse_statement(&mut self) -> Result<AstNode, ParseError> {
        if self.match_any(&[TokenKind::Subgraph]) {
            return self.parse_subgraph().map(AstNode::Subgraph);
        }
        self.parse_node_or_edge()
    }

    fn parse_subgraph(&mut self) -> Result<SubgraphDecl, ParseError> {
        self.skip_newlines();

        // Shape tokens are taken verbatim here, never parsed as node shapes.
        let mut title = String::new();
        while !self.check(TokenKind::Newline) && !self.is_at_end() {
            title.push_str(&self.advance().text);
        }
        let title = title.trim().to_string();

        let statements = self.parse_statements()?;
        if !self.match_any(&[TokenKind::End]) {
            return Err(self.error(&format!("Subgraph '{}' is missing 'end'", title)));
        }

        Ok(SubgraphDecl { title, statements })
    }

    fn parse_node_or_edge(&mut self) -> Result<AstNode, ParseError> {
        if !self.check(TokenKind::Identifier) {
            let found = self.peek().to_string();
            return Err(self.error(&format!("Expected node identifier, found {}", found)));
        }
        let node_id = self.advance().text.clone();

        if self.peek().kind.is_shape_open() {
            let node = self.parse_node_shape(&node_id)?;
            self.registry.declare(node.clone());
            if self.check(TokenKind::Arrow) {
                return self.parse_edge(node_id).map(AstNode::Edge);
            }
            return Ok(AstNode::Node(node));
        }

        if self.check(TokenKind::Arrow) {
            self.registry.reference(&node_id);
            return self.parse_edge(node_id).map(AstNode::Edge);
        }

        Err(self.error(&format!(
            "Expected node shape or '-->' after '{}'",
            node_id
        )))
    }

    fn parse_node_shape(&mut self, node_id: &str) -> Result<NodeDecl, ParseError> {
        let (label, shape) = if self.match_any(&[TokenKind::BracketOpen]) {
            let label = self.parse_text_until(TokenKind::BracketClose);
            self.expect(TokenKind::BracketClose, "]")?;
            (label, NodeShape::Rectangle)
        } else if self.match_any(&[TokenKind::BraceOpen]) {
            let label = self.parse_text_until(TokenKind::BraceClose);
            self.expect(TokenKind::BraceClose, "}")?;
            (label, NodeShape::Diamond)
        } else if self.match_any(&[TokenKind::ParenOpen]) {
            if self.match_any(&[TokenKind::ParenOpen]) {
                let label = self.parse_text_until(TokenKind::ParenClose);
                self.expect(TokenKind::ParenClose, ")")?;
                self.expect(TokenKind::ParenClose, ")")?;
                (label, NodeShape::Circle)
            } else if self.match_any(&[TokenKind::BracketOpen]) {
                let label = self.parse_text_until(TokenKind::BracketClose);
                self.expect(TokenKind::BracketClose, "]")?;
                self.expect(TokenKind::ParenClose, ")")?;
                (label, NodeShape::RoundRectangle)
            } else {
                return Err(self.error("Unrecognized node shape, expected '((' or '(['"));
            }
        } else {
            return Err(self.error("Expected node shape"));
        };

        Ok(NodeDecl::new(node_id, label, shape))
    }

    fn parse_edge(&mut self, from: String) -> Result<EdgeDecl, ParseError> {
        self.expect(TokenKind::Arrow, "-->")?;

        let mut label = String::new();
        let mut condition = String::new();
        if self.match_any(&[TokenKind::Pipe]) {
            let text = self.parse_text_until(TokenKind::Pipe);
            self.expect(TokenKind::Pipe, "|")?;
            match text.strip_prefix('?') {
                Some(expr) => condition = expr.trim().to_string(),
                None => label = text,
            }
        }

        if !self.check(TokenKind::Identifier) {
            let found = self.peek().to_string();
            return Err(self.error(&format!(
                "Expected target node identifier, found {}",
                found
            )));
        }
        let to = self.advance().text.clone();

        if self.peek().kind.is_shape_open() {
            let node = self.parse_node_shape(&to)?;
            self.registry.declare(node);
        } else {
            self.registry.reference(&to);
        }

        Ok(EdgeDecl {
            from,
            to,
            label,
            condition,
        })
    }

    /// Concatenates raw token text up to (not including) `end`, then trims.
    fn parse_text_until(&mut self, end: TokenKind) -> String {
        let mut text = String::new();
        while !self.check(end) && !self.is_at_end() {
            text.push_str(&self.advance().text);
        }
        text.trim().to_string()
    }

    fn expect(&mut self, kind: TokenKind, symbol: &str) -> Result<(), ParseError> {
        if self.match_any(&[kind]) {
            Ok(())
        } else {
            let found = self.peek().to_string();
            Err(self.error(&format!("Expected '{}', found {}", symbol, found)))
        }
    }

    fn skip_newlines(&mut self) {
        while self.match_any(&[TokenKind::Newline]) {}
    }

    fn check(&self, kind: TokenKind) -> bool {
        !self.is_at_end() && self.peek().kind == kind
    }

    fn match_any(&mut self, kinds: &[TokenKind]) -> bool {
        if kinds.iter().any(|&kind| self.check(kind)) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn peek(&self) -> &Token {
        // `new` guarantees a trailing Eof, so the last token is always present.
        let index = self.current.min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn advance(&mut self) -> &Token {
        let index = self.current.min(self.tokens.len() - 1);
        if !self.is_at_end() {
            self.current += 1;
        }
        &self.tokens[index]
    }

    fn is_at_end(&self) -> bool {
        self.peek().kind == TokenKind::Eof
    }

    fn error(&self, message: &str) -> ParseError {
        let token = self.peek();
        ParseError::Syntax {
            message: message.to_string(),
            line: token.line,
            column: token.column,
        }
    }
}
