use super::Value;
use std::fmt;

/// An operator as it is shown in an explained condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Or,
    And,
    Xor,
    Equal,
    NotEqual,
    Greater,
    GreaterOrEqual,
    Less,
    LessOrEqual,
    Add,
    Subtract,
    Multiply,
    Divide,
    Not,
    Negate,
    Abs,
}

impl Operator {
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Or => "or",
            Operator::And => "and",
            Operator::Xor => "xor",
            Operator::Equal => "==",
            Operator::NotEqual => "!=",
            Operator::Greater => ">",
            Operator::GreaterOrEqual => ">=",
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Not => "not",
            Operator::Negate => "-",
            Operator::Abs => "abs",
        }
    }

    // Higher binds tighter.
    fn binding(self) -> u8 {
        match self {
            Operator::Or => 1,
            Operator::And => 2,
            Operator::Xor => 3,
            Operator::Equal | Operator::NotEqual => 4,
            Operator::Greater
            | Operator::GreaterOrEqual
            | Operator::Less
            | Operator::LessOrEqual => 5,
            Operator::Add | Operator::Subtract => 6,
            Operator::Multiply | Operator::Divide => 7,
            Operator::Not | Operator::Negate | Operator::Abs => 8,
        }
    }
}

/// How a condition evaluated against one context, node by node.
///
/// `Display` renders it back as condition text with every variable annotated
/// by the value it held, e.g. `#amount (was 1500) > 1000`.
#[derive(Debug, Clone, PartialEq)]
pub enum EvaluationTrace {
    Literal(Value),
    /// `value` is `None` when the context has no such variable.
    Variable {
        name: String,
        value: Option<Value>,
    },
    Unary {
        op: Operator,
        operand: Box<EvaluationTrace>,
        outcome: Value,
    },
    /// `right` is `None` when `and`/`or` decided on the left side alone.
    Binary {
        op: Operator,
        left: Box<EvaluationTrace>,
        right: Option<Box<EvaluationTrace>>,
        outcome: Value,
    },
}

impl EvaluationTrace {
    pub fn outcome(&self) -> Value {
        match self {
            EvaluationTrace::Literal(value) => value.clone(),
            EvaluationTrace::Variable { value, .. } => value.clone().unwrap_or(Value::Null),
            EvaluationTrace::Unary { outcome, .. } | EvaluationTrace::Binary { outcome, .. } => {
                outcome.clone()
            }
        }
    }

    /// Variables in the order they were read, with their values.
    pub fn variables(&self) -> Vec<(&str, Option<&Value>)> {
        let mut read = Vec::new();
        self.collect_variables(&mut read);
        read
    }

    fn collect_variables<'a>(&'a self, read: &mut Vec<(&'a str, Option<&'a Value>)>) {
        match self {
            EvaluationTrace::Literal(_) => {}
            EvaluationTrace::Variable { name, value } => {
                read.push((name.as_str(), value.as_ref()));
            }
            EvaluationTrace::Unary { operand, .. } => operand.collect_variables(read),
            EvaluationTrace::Binary { left, right, .. } => {
                left.collect_variables(read);
                if let Some(right) = right {
                    right.collect_variables(read);
                }
            }
        }
    }

    fn render(&self, f: &mut fmt::Formatter<'_>, parent: u8) -> fmt::Result {
        match self {
            EvaluationTrace::Literal(value) => write!(f, "{}", value),
            EvaluationTrace::Variable {
                name,
                value: Some(value),
            } => write!(f, "#{} (was {})", name, value),
            EvaluationTrace::Variable { name, value: None } => write!(f, "#{} (unset)", name),
            EvaluationTrace::Unary {
                op: Operator::Abs,
                operand,
                ..
            } => {
                f.write_str("abs(")?;
                operand.render(f, 0)?;
                f.write_str(")")
            }
            EvaluationTrace::Unary { op, operand, .. } => {
                f.write_str(op.symbol())?;
                if *op == Operator::Not {
                    f.write_str(" ")?;
                }
                operand.render(f, op.binding())
            }
            EvaluationTrace::Binary {
                op, left, right, ..
            } => {
                let wrap = op.binding() < parent;
                if wrap {
                    f.write_str("(")?;
                }
                left.render(f, op.binding())?;
                write!(f, " {} ", op.symbol())?;
                match right {
                    // Operators are left-associative, so an equal-binding right side needs parentheses.
                    Some(right) => right.render(f, op.binding() + 1)?,
                    None => f.write_str("...")?,
                }
                if wrap {
                    f.write_str(")")?;
                }
                Ok(())
            }
        }
    }
}

impl fmt::Display for EvaluationTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.render(f, 0)
    }
}
