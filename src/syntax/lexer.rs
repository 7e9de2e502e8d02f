use super::token::{Token, TokenKind};
use crate::error::ParseError;

/// Symbols that lex as single-character text, so conditions and labels can be
/// reassembled from consecutive tokens.
const TEXT_SYMBOLS: &[char] = &['#', '>', '<', '=', '!', '+', '-', '*', '/', '.', ':', '?'];

/// Converts flowchart source into a token stream terminated by `Eof`.
pub fn tokenize(source: &str) -> Result<Vec<Token>, ParseError> {
    Lexer::new(source).tokenize()
}

struct Lexer {
    chars: Vec<char>,
    position: usize,
    line: usize,
    column: usize,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            position: 0,
            line: 1,
            column: 1,
        }
    }

    fn tokenize(mut self) -> Result<Vec<Token>, ParseError> {
        let mut tokens = Vec::new();
        loop {
            self.skip_whitespace();
            if self.is_at_end() {
                break;
            }
            tokens.push(self.next_token()?);
        }
        tokens.push(Token::new(TokenKind::Eof, "", self.line, self.column));
        Ok(tokens)
    }

    fn next_token(&mut self) -> Result<Token, ParseError> {
        let (line, column) = (self.line, self.column);
        let current = self.peek_at(0).unwrap_or('\0');

        if current == '\n' {
            self.advance();
            return Ok(Token::new(TokenKind::Newline, "\n", line, column));
        }

        if current == '-' && self.peek_at(1) == Some('-') && self.peek_at(2) == Some('>') {
            self.advance();
            self.advance();
            self.advance();
            return Ok(Token::new(TokenKind::Arrow, "-->", line, column));
        }

        let structural = match current {
            '[' => Some(TokenKind::BracketOpen),
            ']' => Some(TokenKind::BracketClose),
            '{' => Some(TokenKind::BraceOpen),
            '}' => Some(TokenKind::BraceClose),
            '(' => Some(TokenKind::ParenOpen),
            ')' => Some(TokenKind::ParenClose),
            '|' => Some(TokenKind::Pipe),
            _ => None,
        };
        if let Some(kind) = structural {
            self.advance();
            return Ok(Token::new(kind, current.to_string(), line, column));
        }

        if current.is_ascii_digit() {
            let digits = self.take_while(|c| c.is_ascii_digit());
            return Ok(Token::new(TokenKind::Text, digits, line, column));
        }

        if current.is_alphabetic() || current == '_' {
            let word = self.take_while(|c| c.is_alphanumeric() || c == '_');
            let kind = TokenKind::keyword(&word).unwrap_or(TokenKind::Identifier);
            return Ok(Token::new(kind, word, line, column));
        }

        if TEXT_SYMBOLS.contains(&current) {
            self.advance();
            return Ok(Token::new(TokenKind::Text, current.to_string(), line, column));
        }

        Err(ParseError::Lexical {
            message: format!("Unrecognized character '{}'", current),
            line,
            column,
        })
    }

    fn take_while<F>(&mut self, predicate: F) -> String
    where
        F: Fn(char) -> bool,
    {
        let mut run = String::new();
        while let Some(c) = self.peek_at(0) {
            if !predicate(c) {
                break;
            }
            run.push(c);
            self.advance();
        }
        run
    }

    // Newlines are significant, so only horizontal whitespace is skipped.
    fn skip_whitespace(&mut self) {
        while matches!(self.peek_at(0), Some(' ' | '\t' | '\r')) {
            self.advance();
        }
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.position + offset).copied()
    }

    fn advance(&mut self) {
        if let Some(&c) = self.chars.get(self.position) {
            self.position += 1;
            if c == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
    }

    fn is_at_end(&self) -> bool {
        self.position >= self.chars.len()
    }
}
