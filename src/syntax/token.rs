use std::fmt;

/// The category of a lexed token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Keywords
    Flowchart,
    Graph,
    Subgraph,
    End,

    // Directions
    TD,
    TB,
    LR,
    RL,
    BT,

    // Structure
    BracketOpen,
    BracketClose,
    BraceOpen,
    BraceClose,
    ParenOpen,
    ParenClose,
    Arrow,
    Pipe,

    // Content
    Identifier,
    Text,
    Newline,
    Eof,
}

impl TokenKind {
    /// Looks up a word in the keyword table. Matching is case-sensitive.
    pub fn keyword(word: &str) -> Option<TokenKind> {
        let kind = match word {
            "flowchart" => TokenKind::Flowchart,
            "graph" => TokenKind::Graph,
            "subgraph" => TokenKind::Subgraph,
            "end" => TokenKind::End,
            "TD" => TokenKind::TD,
            "TB" => TokenKind::TB,
            "LR" => TokenKind::LR,
            "RL" => TokenKind::RL,
            "BT" => TokenKind::BT,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_direction(self) -> bool {
        matches!(
            self,
            TokenKind::TD | TokenKind::TB | TokenKind::LR | TokenKind::RL | TokenKind::BT
        )
    }

    pub fn is_shape_open(self) -> bool {
        matches!(
            self,
            TokenKind::BracketOpen | TokenKind::BraceOpen | TokenKind::ParenOpen
        )
    }
}

/// A single lexed token with its 1-based source position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, text: impl Into<String>, line: usize, column: usize) -> Self {
        Self {
            kind,
            text: text.into(),
            line,
            column,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            TokenKind::Newline => write!(f, "newline"),
            TokenKind::Eof => write!(f, "end of input"),
            _ => write!(f, "'{}'", self.text),
        }
    }
}
