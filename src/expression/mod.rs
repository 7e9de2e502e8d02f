//! Edge-condition evaluation.
//!
//! The process engine only sees the [`ExpressionEngine`] trait. The built-in
//! [`ConditionEngine`] parses a small infix language (`#amount > 1000 and
//! #vip == true`) and evaluates it against an [`ExecutionContext`].

mod ast;
mod engine;
mod parser;
mod trace;
mod value;

pub use ast::Expression;
pub use parser::parse_expression;
pub use trace::{EvaluationTrace, Operator};
pub use value::Value;

use crate::error::ExpressionError;
use crate::process::ExecutionContext;
use ahash::AHashMap;
use engine::AstEngine;
use parking_lot::RwLock;
use std::sync::Arc;

/// Boolean and value evaluation of expression text against a context.
pub trait ExpressionEngine: Send + Sync {
    /// Evaluates `expression` as a condition. A null result counts as `false`.
    fn evaluate(
        &self,
        expression: &str,
        context: &ExecutionContext,
    ) -> Result<bool, ExpressionError>;

    fn calculate_value(
        &self,
        expression: &str,
        context: &ExecutionContext,
    ) -> Result<Value, ExpressionError>;

    fn validate_syntax(&self, expression: &str) -> bool;

    /// A human-readable account of how `expression` evaluated, if supported.
    fn explain(&self, _expression: &str, _context: &ExecutionContext) -> Option<String> {
        None
    }
}

/// The default [`ExpressionEngine`], with a per-source cache of parsed expressions.
#[derive(Debug)]
pub struct ConditionEngine {
    cache: Option<RwLock<AHashMap<String, Arc<Expression>>>>,
}

impl Default for ConditionEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ConditionEngine {
    pub fn new() -> Self {
        Self {
            cache: Some(RwLock::new(AHashMap::new())),
        }
    }

    /// An engine that re-parses on every call.
    pub fn uncached() -> Self {
        Self { cache: None }
    }

    pub fn parse(&self, expression: &str) -> Result<Arc<Expression>, ExpressionError> {
        let Some(cache) = &self.cache else {
            return parse_expression(expression).map(Arc::new);
        };
        if let Some(parsed) = cache.read().get(expression) {
            return Ok(Arc::clone(parsed));
        }
        let parsed = Arc::new(parse_expression(expression)?);
        cache
            .write()
            .insert(expression.to_string(), Arc::clone(&parsed));
        Ok(parsed)
    }

    pub fn cached_len(&self) -> usize {
        self.cache.as_ref().map_or(0, |cache| cache.read().len())
    }

    /// Evaluates `expression` and returns its full trace.
    pub fn trace(
        &self,
        expression: &str,
        context: &ExecutionContext,
    ) -> Result<EvaluationTrace, ExpressionError> {
        let parsed = self.parse(expression)?;
        AstEngine::new(context).evaluate(&parsed)
    }
}

impl ExpressionEngine for ConditionEngine {
    fn evaluate(
        &self,
        expression: &str,
        context: &ExecutionContext,
    ) -> Result<bool, ExpressionError> {
        match self.calculate_value(expression, context)? {
            Value::Bool(b) => Ok(b),
            Value::Null => Ok(false),
            found => Err(ExpressionError::NotBoolean {
                expression: expression.to_string(),
                found,
            }),
        }
    }

    fn calculate_value(
        &self,
        expression: &str,
        context: &ExecutionContext,
    ) -> Result<Value, ExpressionError> {
        self.trace(expression, context)
            .map(|trace| trace.outcome())
    }

    fn validate_syntax(&self, expression: &str) -> bool {
        self.parse(expression).is_ok()
    }

    fn explain(&self, expression: &str, context: &ExecutionContext) -> Option<String> {
        self.trace(expression, context)
            .ok()
            .map(|trace| trace.to_string())
    }
}
