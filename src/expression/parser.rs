use super::{Expression, Value};
use crate::error::ExpressionError;

#[derive(Debug, Clone, PartialEq)]
enum ExprToken {
    Number(f64),
    Text(String),
    Word(String),
    Hash,
    Op(&'static str),
    LParen,
    RParen,
}

const TWO_CHAR_OPS: [&str; 6] = ["==", "!=", ">=", "<=", "&&", "||"];

/// Parses a condition such as `#amount > 1000 and #approved == true`.
///
/// Variables are written `#name` or as a bare `name`. Operators bind, from
/// loosest to tightest: `or`, `and`, `xor`, equality, comparison, `+ -`, `* /`,
/// then the unary `! -`.
pub fn parse_expression(source: &str) -> Result<Expression, ExpressionError> {
    let tokens = lex(source)?;
    let mut parser = ExprParser {
        source,
        tokens,
        pos: 0,
    };
    let expression = parser.parse_or()?;
    if let Some(token) = parser.tokens.get(parser.pos) {
        return Err(parser.error(&format!("unexpected {:?}", token)));
    }
    Ok(expression)
}

fn syntax_error(source: &str, message: impl Into<String>) -> ExpressionError {
    ExpressionError::Syntax {
        expression: source.to_string(),
        message: message.into(),
    }
}

fn lex(source: &str) -> Result<Vec<ExprToken>, ExpressionError> {
    let chars: Vec<char> = source.chars().collect();
    let mut tokens = Vec::new();
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if c.is_ascii_digit() {
            let start = i;
            while i < chars.len() && chars[i].is_ascii_digit() {
                i += 1;
            }
            if i + 1 < chars.len() && chars[i] == '.' && chars[i + 1].is_ascii_digit() {
                i += 1;
                while i < chars.len() && chars[i].is_ascii_digit() {
                    i += 1;
                }
            }
            let text: String = chars[start..i].iter().collect();
            let number = text
                .parse::<f64>()
                .map_err(|_| syntax_error(source, format!("invalid number '{}'", text)))?;
            tokens.push(ExprToken::Number(number));
            continue;
        }

        if c.is_alphabetic() || c == '_' {
            let start = i;
            while i < chars.len() && (chars[i].is_alphanumeric() || chars[i] == '_') {
                i += 1;
            }
            tokens.push(ExprToken::Word(chars[start..i].iter().collect()));
            continue;
        }

        if c == '\'' || c == '"' {
            let start = i + 1;
            let end = chars[start..]
                .iter()
                .position(|&q| q == c)
                .map(|offset| start + offset)
                .ok_or_else(|| syntax_error(source, "unterminated string literal"))?;
            tokens.push(ExprToken::Text(chars[start..end].iter().collect()));
            i = end + 1;
            continue;
        }

        if i + 1 < chars.len() {
            let pair: String = chars[i..i + 2].iter().collect();
            if let Some(op) = TWO_CHAR_OPS.iter().find(|op| **op == pair) {
                tokens.push(ExprToken::Op(*op));
                i += 2;
                continue;
            }
        }

        let token = match c {
            '#' => ExprToken::Hash,
            '(' => ExprToken::LParen,
            ')' => ExprToken::RParen,
            '>' => ExprToken::Op(">"),
            '<' => ExprToken::Op("<"),
            '!' => ExprToken::Op("!"),
            '+' => ExprToken::Op("+"),
            '-' => ExprToken::Op("-"),
            '*' => ExprToken::Op("*"),
            '/' => ExprToken::Op("/"),
            '=' => return Err(syntax_error(source, "use '==' to compare values")),
            other => {
                return Err(syntax_error(
                    source,
                    format!("unexpected character '{}'", other),
                ));
            }
        };
        tokens.push(token);
        i += 1;
    }

    Ok(tokens)
}

struct ExprParser<'a> {
    source: &'a str,
    tokens: Vec<ExprToken>,
    pos: usize,
}

impl ExprParser<'_> {
    fn parse_or(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_and()?;
        while self.eat_op("||") || self.eat_word("or") {
            let right = self.parse_and()?;
            left = Expression::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_xor()?;
        while self.eat_op("&&") || self.eat_word("and") {
            let right = self.parse_xor()?;
            left = Expression::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_xor(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_equality()?;
        while self.eat_word("xor") {
            let right = self.parse_equality()?;
            left = Expression::Xor(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_equality(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_comparison()?;
        loop {
            let build: fn(Box<Expression>, Box<Expression>) -> Expression = if self.eat_op("==") {
                Expression::Equal
            } else if self.eat_op("!=") {
                Expression::NotEqual
            } else {
                break;
            };
            let right = self.parse_comparison()?;
            left = build(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_comparison(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_additive()?;
        loop {
            let build: fn(Box<Expression>, Box<Expression>) -> Expression = if self.eat_op(">=") {
                Expression::GreaterThanOrEqual
            } else if self.eat_op("<=") {
                Expression::SmallerThanOrEqual
            } else if self.eat_op(">") {
                Expression::GreaterThan
            } else if self.eat_op("<") {
                Expression::SmallerThan
            } else {
                break;
            };
            let right = self.parse_additive()?;
            left = build(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_additive(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_term()?;
        loop {
            let build: fn(Box<Expression>, Box<Expression>) -> Expression = if self.eat_op("+") {
                Expression::Sum
            } else if self.eat_op("-") {
                Expression::Subtract
            } else {
                break;
            };
            let right = self.parse_term()?;
            left = build(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_term(&mut self) -> Result<Expression, ExpressionError> {
        let mut left = self.parse_unary()?;
        loop {
            let build: fn(Box<Expression>, Box<Expression>) -> Expression = if self.eat_op("*") {
                Expression::Multiply
            } else if self.eat_op("/") {
                Expression::Divide
            } else {
                break;
            };
            let right = self.parse_unary()?;
            left = build(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Expression, ExpressionError> {
        if self.eat_op("!") || self.eat_word("not") {
            return Ok(Expression::Not(Box::new(self.parse_unary()?)));
        }
        if self.eat_op("-") {
            return Ok(Expression::Negate(Box::new(self.parse_unary()?)));
        }
        self.parse_primary()
    }

    fn parse_primary(&mut self) -> Result<Expression, ExpressionError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or_else(|| self.error("unexpected end of expression"))?;
        self.pos += 1;

        match token {
            ExprToken::Number(n) => Ok(Expression::Literal(Value::Number(n))),
            ExprToken::Text(s) => Ok(Expression::Literal(Value::Text(s))),
            ExprToken::Hash => match self.tokens.get(self.pos).cloned() {
                Some(ExprToken::Word(name)) => {
                    self.pos += 1;
                    Ok(Expression::Variable(name))
                }
                _ => Err(self.error("expected variable name after '#'")),
            },
            ExprToken::Word(word) => self.parse_word(word),
            ExprToken::LParen => {
                let inner = self.parse_or()?;
                self.expect_rparen()?;
                Ok(inner)
            }
            other => Err(self.error(&format!("unexpected {:?}", other))),
        }
    }

    fn parse_word(&mut self, word: String) -> Result<Expression, ExpressionError> {
        match word.to_ascii_lowercase().as_str() {
            "true" => Ok(Expression::Literal(Value::Bool(true))),
            "false" => Ok(Expression::Literal(Value::Bool(false))),
            "null" => Ok(Expression::Literal(Value::Null)),
            "and" | "or" | "xor" | "not" => {
                Err(self.error(&format!("unexpected operator '{}'", word)))
            }
            "abs" if self.tokens.get(self.pos) == Some(&ExprToken::LParen) => {
                self.pos += 1;
                let inner = self.parse_or()?;
                self.expect_rparen()?;
                Ok(Expression::Abs(Box::new(inner)))
            }
            _ => Ok(Expression::Variable(word)),
        }
    }

    fn expect_rparen(&mut self) -> Result<(), ExpressionError> {
        if self.tokens.get(self.pos) == Some(&ExprToken::RParen) {
            self.pos += 1;
            Ok(())
        } else {
            Err(self.error("expected ')'"))
        }
    }

    fn eat_op(&mut self, op: &str) -> bool {
        if matches!(self.tokens.get(self.pos), Some(ExprToken::Op(o)) if *o == op) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn eat_word(&mut self, word: &str) -> bool {
        if matches!(self.tokens.get(self.pos), Some(ExprToken::Word(w)) if w.eq_ignore_ascii_case(word))
        {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn error(&self, message: &str) -> ExpressionError {
        syntax_error(self.source, message)
    }
}
