use super::{EvaluationTrace, Expression, Operator, Value};
use crate::error::ExpressionError;
use crate::process::ExecutionContext;
use std::cmp::Ordering;

type Evaluated = Result<EvaluationTrace, ExpressionError>;

/// Walks a parsed expression against one context, recording every step.
pub(super) struct AstEngine<'a> {
    context: &'a ExecutionContext,
}

impl<'a> AstEngine<'a> {
    pub(super) fn new(context: &'a ExecutionContext) -> Self {
        Self { context }
    }

    pub(super) fn evaluate(&self, expr: &Expression) -> Evaluated {
        match expr {
            Expression::Literal(value) => Ok(EvaluationTrace::Literal(value.clone())),
            Expression::Variable(name) => self.read(name),

            // --- Arithmetic ---
            Expression::Sum(l, r) => self.binary(Operator::Add, l, r, add),
            Expression::Subtract(l, r) => self.binary(Operator::Subtract, l, r, |a, b| {
                numbers(Operator::Subtract, a, b).map(|(x, y)| Value::Number(x - y))
            }),
            Expression::Multiply(l, r) => self.binary(Operator::Multiply, l, r, |a, b| {
                numbers(Operator::Multiply, a, b).map(|(x, y)| Value::Number(x * y))
            }),
            Expression::Divide(l, r) => self.binary(Operator::Divide, l, r, |a, b| {
                let (x, y) = numbers(Operator::Divide, a, b)?;
                if y == 0.0 {
                    return Err(ExpressionError::DivisionByZero);
                }
                Ok(Value::Number(x / y))
            }),
            Expression::Negate(v) => self.unary(Operator::Negate, v, |n| {
                number(Operator::Negate, n).map(|n| Value::Number(-n))
            }),
            Expression::Abs(v) => self.unary(Operator::Abs, v, |n| {
                number(Operator::Abs, n).map(|n| Value::Number(n.abs()))
            }),

            // --- Comparison ---
            Expression::GreaterThan(l, r) => self.compare(Operator::Greater, l, r, Ordering::is_gt),
            Expression::GreaterThanOrEqual(l, r) => {
                self.compare(Operator::GreaterOrEqual, l, r, Ordering::is_ge)
            }
            Expression::SmallerThan(l, r) => self.compare(Operator::Less, l, r, Ordering::is_lt),
            Expression::SmallerThanOrEqual(l, r) => {
                self.compare(Operator::LessOrEqual, l, r, Ordering::is_le)
            }
            Expression::Equal(l, r) => {
                self.binary(Operator::Equal, l, r, |a, b| Ok(Value::Bool(a == b)))
            }
            Expression::NotEqual(l, r) => {
                self.binary(Operator::NotEqual, l, r, |a, b| Ok(Value::Bool(a != b)))
            }

            // --- Logic ---
            Expression::And(l, r) => self.short_circuit(Operator::And, l, r, false),
            Expression::Or(l, r) => self.short_circuit(Operator::Or, l, r, true),
            Expression::Xor(l, r) => self.binary(Operator::Xor, l, r, |a, b| {
                Ok(Value::Bool(truth(Operator::Xor, a)? ^ truth(Operator::Xor, b)?))
            }),
            Expression::Not(v) => self.unary(Operator::Not, v, |b| {
                truth(Operator::Not, b).map(|b| Value::Bool(!b))
            }),
        }
    }

    fn read(&self, name: &str) -> Evaluated {
        let value = self
            .context
            .get(name)
            .map(|json| Value::from_json(name, json))
            .transpose()?;
        Ok(EvaluationTrace::Variable {
            name: name.to_string(),
            value,
        })
    }

    fn unary<F>(&self, op: Operator, operand: &Expression, apply: F) -> Evaluated
    where
        F: FnOnce(Value) -> Result<Value, ExpressionError>,
    {
        let operand = self.evaluate(operand)?;
        let outcome = apply(operand.outcome())?;
        Ok(EvaluationTrace::Unary {
            op,
            operand: Box::new(operand),
            outcome,
        })
    }

    fn binary<F>(&self, op: Operator, l: &Expression, r: &Expression, combine: F) -> Evaluated
    where
        F: FnOnce(Value, Value) -> Result<Value, ExpressionError>,
    {
        let left = self.evaluate(l)?;
        let right = self.evaluate(r)?;
        let outcome = combine(left.outcome(), right.outcome())?;
        Ok(EvaluationTrace::Binary {
            op,
            left: Box::new(left),
            right: Some(Box::new(right)),
            outcome,
        })
    }

    fn compare(
        &self,
        op: Operator,
        l: &Expression,
        r: &Expression,
        holds: fn(Ordering) -> bool,
    ) -> Evaluated {
        self.binary(op, l, r, |a, b| {
            // NaN is unordered, so every comparison with it is false.
            ordering(op, a, b).map(|o| Value::Bool(o.is_some_and(holds)))
        })
    }

    /// `and`/`or`: the right side is skipped once the left equals `decisive`.
    fn short_circuit(&self, op: Operator, l: &Expression, r: &Expression, decisive: bool) -> Evaluated {
        let left = self.evaluate(l)?;
        if truth(op, left.outcome())? == decisive {
            return Ok(EvaluationTrace::Binary {
                op,
                left: Box::new(left),
                right: None,
                outcome: Value::Bool(decisive),
            });
        }
        let right = self.evaluate(r)?;
        let outcome = Value::Bool(truth(op, right.outcome())?);
        Ok(EvaluationTrace::Binary {
            op,
            left: Box::new(left),
            right: Some(Box::new(right)),
            outcome,
        })
    }
}

fn mismatch(op: Operator, expected: &str, found: Value) -> ExpressionError {
    ExpressionError::TypeMismatch {
        operation: op.symbol().to_string(),
        expected: expected.to_string(),
        found,
    }
}

fn truth(op: Operator, value: Value) -> Result<bool, ExpressionError> {
    match value {
        Value::Bool(b) => Ok(b),
        other => Err(mismatch(op, "Bool", other)),
    }
}

fn number(op: Operator, value: Value) -> Result<f64, ExpressionError> {
    match value {
        Value::Number(n) => Ok(n),
        other => Err(mismatch(op, "Number", other)),
    }
}

fn numbers(op: Operator, a: Value, b: Value) -> Result<(f64, f64), ExpressionError> {
    Ok((number(op, a)?, number(op, b)?))
}

/// `+` adds numbers and concatenates as soon as either side is text.
fn add(a: Value, b: Value) -> Result<Value, ExpressionError> {
    match (a, b) {
        (Value::Text(l), r) => Ok(Value::Text(l + &plain(&r))),
        (l, Value::Text(r)) => Ok(Value::Text(plain(&l) + &r)),
        (l, r) => numbers(Operator::Add, l, r).map(|(x, y)| Value::Number(x + y)),
    }
}

fn ordering(op: Operator, a: Value, b: Value) -> Result<Option<Ordering>, ExpressionError> {
    match (a, b) {
        (Value::Text(l), Value::Text(r)) => Ok(Some(l.cmp(&r))),
        (Value::Text(_), other) => Err(mismatch(op, "Text", other)),
        (l, r) => numbers(op, l, r).map(|(x, y)| x.partial_cmp(&y)),
    }
}

// Text without the quotes `Display` adds.
fn plain(value: &Value) -> String {
    match value {
        Value::Text(s) => s.clone(),
        other => other.to_string(),
    }
}
