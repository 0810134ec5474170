//! Moving values between tree nodes and folded literals

use super::coerce::coerce;
use crate::ast::{ConstValue, Node};
use crate::config::{MathConfig, SimplifyOptions};
use crate::error::FoldError;
use crate::literal::Literal;
use bigdecimal::BigDecimal;
use num_rational::Rational64;

/// Result of folding a subtree
#[derive(Debug, Clone, PartialEq)]
pub enum Folded {
    /// The subtree reduced to a single value
    Literal(Literal),
    /// Something symbolic remains
    Node(Node),
}

impl Folded {
    pub fn is_node(&self) -> bool {
        matches!(self, Folded::Node(_))
    }

    /// Convert back to a node, raising a literal if needed
    pub fn into_node(self) -> Result<Node, FoldError> {
        match self {
            Folded::Node(node) => Ok(node),
            Folded::Literal(value) => raise(value),
        }
    }
}

/// Literal for a constant payload; `None` for payloads that stay nodes
pub fn lower(value: &ConstValue, config: &MathConfig, options: &SimplifyOptions) -> Option<Literal> {
    match value {
        ConstValue::Number(n) => Some(coerce(Literal::Number(*n), config, options)),
        ConstValue::Decimal(d) => Some(Literal::Decimal(d.clone())),
        ConstValue::Text(s) => Some(Literal::Text(s.clone())),
        ConstValue::Bool(_) | ConstValue::Null | ConstValue::Undefined => None,
    }
}

/// Node form of a literal
///
/// Negative rationals and floats become a unary minus over a positive
/// constant. Complex values have no node form.
pub fn raise(value: Literal) -> Result<Node, FoldError> {
    match value {
        Literal::Fraction(r) => Ok(fraction_node(&r)),
        Literal::Number(n) => Ok(signed_number(n)),
        Literal::Decimal(d) => Ok(Node::decimal(d)),
        Literal::Complex(_) => Err(FoldError::Unrepresentable { kind: "Complex" }),
        Literal::Text(s) => Ok(Node::string(s)),
        Literal::Matrix(items) => items
            .into_iter()
            .map(raise)
            .collect::<Result<Vec<_>, _>>()
            .map(Node::Array),
    }
}

fn signed_number(n: f64) -> Node {
    if n < 0.0 {
        Node::unary_minus(Node::number(-n))
    } else {
        // -0.0 prints as "-0"
        Node::number(n.abs())
    }
}

/// Integers up to 2^53 are exact as doubles
const MAX_SAFE_INTEGER: u64 = 1 << 53;

fn fraction_node(r: &Rational64) -> Node {
    let magnitude = integer_node(r.numer().unsigned_abs());
    let numerator = if *r.numer() < 0 {
        Node::unary_minus(magnitude)
    } else {
        magnitude
    };
    if *r.denom() == 1 {
        return numerator;
    }
    Node::binary("/", "divide", numerator, integer_node(r.denom().unsigned_abs()))
}

/// Constant for a non-negative integer, as a decimal once a double would round it
fn integer_node(n: u64) -> Node {
    if n <= MAX_SAFE_INTEGER {
        Node::number(n as f64)
    } else {
        Node::decimal(BigDecimal::from(n))
    }
}
