use super::Value;
use std::collections::BTreeSet;
use std::fmt;

/// A parsed condition expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Expression {
    // Arithmetic
    Sum(Box<Expression>, Box<Expression>),
    Subtract(Box<Expression>, Box<Expression>),
    Multiply(Box<Expression>, Box<Expression>),
    Divide(Box<Expression>, Box<Expression>),
    Negate(Box<Expression>),
    Abs(Box<Expression>),

    // Logical
    Not(Box<Expression>),
    And(Box<Expression>, Box<Expression>),
    Or(Box<Expression>, Box<Expression>),
    Xor(Box<Expression>, Box<Expression>),

    // Comparison
    Equal(Box<Expression>, Box<Expression>),
    NotEqual(Box<Expression>, Box<Expression>),
    GreaterThan(Box<Expression>, Box<Expression>),
    GreaterThanOrEqual(Box<Expression>, Box<Expression>),
    SmallerThan(Box<Expression>, Box<Expression>),
    SmallerThanOrEqual(Box<Expression>, Box<Expression>),

    // Leaf nodes
    Literal(Value),
    Variable(String),
}

impl Expression {
    /// Collects the names of all variables the expression reads.
    pub fn collect_variables(&self, names: &mut BTreeSet<String>) {
        match self {
            Expression::Variable(name) => {
                names.insert(name.clone());
            }
            Expression::Sum(l, r)
            | Expression::Subtract(l, r)
            | Expression::Multiply(l, r)
            | Expression::Divide(l, r)
            | Expression::And(l, r)
            | Expression::Or(l, r)
            | Expression::Xor(l, r)
            | Expression::Equal(l, r)
            | Expression::NotEqual(l, r)
            | Expression::GreaterThan(l, r)
            | Expression::GreaterThanOrEqual(l, r)
            | Expression::SmallerThan(l, r)
            | Expression::SmallerThanOrEqual(l, r) => {
                l.collect_variables(names);
                r.collect_variables(names);
            }
            Expression::Abs(v) | Expression::Not(v) | Expression::Negate(v) => {
                v.collect_variables(names);
            }
            Expression::Literal(_) => {}
        }
    }

    pub fn variables(&self) -> BTreeSet<String> {
        let mut names = BTreeSet::new();
        self.collect_variables(&mut names);
        names
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(v) => write!(f, "{}", v),
            Expression::Variable(name) => write!(f, "#{}", name),
            Expression::Negate(v) => write!(f, "-({})", v),
            Expression::Abs(v) => write!(f, "abs({})", v),
            Expression::Not(v) => write!(f, "!({})", v),
            Expression::Sum(l, r) => write!(f, "({} + {})", l, r),
            Expression::Subtract(l, r) => write!(f, "({} - {})", l, r),
            Expression::Multiply(l, r) => write!(f, "({} * {})", l, r),
            Expression::Divide(l, r) => write!(f, "({} / {})", l, r),
            Expression::And(l, r) => write!(f, "({} && {})", l, r),
            Expression::Or(l, r) => write!(f, "({} || {})", l, r),
            Expression::Xor(l, r) => write!(f, "({} xor {})", l, r),
            Expression::Equal(l, r) => write!(f, "({} == {})", l, r),
            Expression::NotEqual(l, r) => write!(f, "({} != {})", l, r),
            Expression::GreaterThan(l, r) => write!(f, "({} > {})", l, r),
            Expression::GreaterThanOrEqual(l, r) => write!(f, "({} >= {})", l, r),
            Expression::SmallerThan(l, r) => write!(f, "({} < {})", l, r),
            Expression::SmallerThanOrEqual(l, r) => write!(f, "({} <= {})", l, r),
        }
    }
}
