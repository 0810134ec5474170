//! Expression tree nodes

use bigdecimal::BigDecimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Payload of a constant node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ConstValue {
    /// Double-precision number
    Number(f64),
    /// Arbitrary-precision decimal
    Decimal(BigDecimal),
    /// String literal
    Text(String),
    /// Boolean literal
    Bool(bool),
    /// `null`
    Null,
    /// `undefined`, also the result of reading a missing record key
    Undefined,
}

/// An operator application such as `a + b` or `-x`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OperatorNode {
    /// Operator symbol, e.g. `+`
    pub op: String,
    /// Name of the function implementing the operator, e.g. `add`
    pub fn_name: String,
    pub args: Vec<Node>,
    /// Multiplication written by juxtaposition (`2 x`)
    #[serde(default)]
    pub implicit: bool,
}

impl OperatorNode {
    pub fn is_unary(&self) -> bool {
        self.args.len() == 1
    }
}

/// Expression node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    /// Named variable
    Symbol(String),
    /// Literal value
    Constant(ConstValue),
    /// Operator application
    Operator(OperatorNode),
    /// Function call: name(args)
    Call { name: String, args: Vec<Node> },
    /// Grouping parentheses
    Parenthesis(Box<Node>),
    /// Indexing or member access: object[index]
    Accessor { object: Box<Node>, index: Box<Node> },
    /// Index dimensions of an accessor
    Index(Vec<Node>),
    /// Array literal
    Array(Vec<Node>),
    /// Record literal: {key: value, ...}
    Object(BTreeMap<String, Node>),
    /// Assignment: target = value
    Assignment { target: Box<Node>, value: Box<Node> },
    /// Sequence of statements
    Block(Vec<Node>),
    /// Function definition: name(params) = body
    FunctionAssignment {
        name: String,
        params: Vec<String>,
        body: Box<Node>,
    },
    /// Range: start:end or start:step:end
    Range {
        start: Box<Node>,
        end: Box<Node>,
        step: Option<Box<Node>>,
    },
    /// Conditional: condition ? true_expr : false_expr
    Conditional {
        condition: Box<Node>,
        true_expr: Box<Node>,
        false_expr: Box<Node>,
    },
}

impl Node {
    pub fn symbol(name: impl Into<String>) -> Self {
        Node::Symbol(name.into())
    }

    pub fn number(value: f64) -> Self {
        Node::Constant(ConstValue::Number(value))
    }

    pub fn decimal(value: BigDecimal) -> Self {
        Node::Constant(ConstValue::Decimal(value))
    }

    pub fn string(value: impl Into<String>) -> Self {
        Node::Constant(ConstValue::Text(value.into()))
    }

    pub fn undefined() -> Self {
        Node::Constant(ConstValue::Undefined)
    }

    pub fn operator(op: impl Into<String>, fn_name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Operator(OperatorNode {
            op: op.into(),
            fn_name: fn_name.into(),
            args,
            implicit: false,
        })
    }

    pub fn binary(op: &str, fn_name: &str, lhs: Node, rhs: Node) -> Self {
        Node::operator(op, fn_name, vec![lhs, rhs])
    }

    pub fn unary_minus(operand: Node) -> Self {
        Node::operator("-", "unaryMinus", vec![operand])
    }

    pub fn call(name: impl Into<String>, args: Vec<Node>) -> Self {
        Node::Call {
            name: name.into(),
            args,
        }
    }

    pub fn parenthesis(content: Node) -> Self {
        Node::Parenthesis(Box::new(content))
    }

    pub fn accessor(object: Node, index: Node) -> Self {
        Node::Accessor {
            object: Box::new(object),
            index: Box::new(index),
        }
    }

    /// Human-readable name of the node kind, used in diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Node::Symbol(_) => "symbol",
            Node::Constant(_) => "constant",
            Node::Operator(_) => "operator",
            Node::Call { .. } => "function call",
            Node::Parenthesis(_) => "parenthesis",
            Node::Accessor { .. } => "accessor",
            Node::Index(_) => "index",
            Node::Array(_) => "array",
            Node::Object(_) => "object",
            Node::Assignment { .. } => "assignment",
            Node::Block(_) => "block",
            Node::FunctionAssignment { .. } => "function assignment",
            Node::Range { .. } => "range",
            Node::Conditional { .. } => "conditional",
        }
    }

    /// The constant payload, if this is a constant node
    pub fn as_constant(&self) -> Option<&ConstValue> {
        match self {
            Node::Constant(value) => Some(value),
            _ => None,
        }
    }

    /// Whether any node of the tree satisfies `pred`
    pub fn any(&self, pred: &dyn Fn(&Node) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        self.children().iter().any(|child| child.any(pred))
    }

    /// Direct children in source order
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Node::Symbol(_) | Node::Constant(_) => Vec::new(),
            Node::Operator(op) => op.args.iter().collect(),
            Node::Call { args, .. } => args.iter().collect(),
            Node::Parenthesis(inner) => vec![inner.as_ref()],
            Node::Accessor { object, index } => vec![object.as_ref(), index.as_ref()],
            Node::Index(items) | Node::Array(items) | Node::Block(items) => items.iter().collect(),
            Node::Object(props) => props.values().collect(),
            Node::Assignment { target, value } => vec![target.as_ref(), value.as_ref()],
            Node::FunctionAssignment { body, .. } => vec![body.as_ref()],
            Node::Range { start, end, step } => {
                let mut children = vec![start.as_ref()];
                if let Some(step) = step {
                    children.push(step.as_ref());
                }
                children.push(end.as_ref());
                children
            }
            Node::Conditional {
                condition,
                true_expr,
                false_expr,
            } => vec![condition.as_ref(), true_expr.as_ref(), false_expr.as_ref()],
        }
    }
}

/// Function implementing a binary operator symbol
pub fn binary_operator_function(op: &str) -> Option<&'static str> {
    Some(match op {
        "+" => "add",
        "-" => "subtract",
        "*" => "multiply",
        "/" => "divide",
        "%" => "mod",
        "^" => "pow",
        "==" => "equal",
        "!=" => "unequal",
        "<" => "smaller",
        ">" => "larger",
        "<=" => "smallerEq",
        ">=" => "largerEq",
        "and" => "and",
        "or" => "or",
        _ => return None,
    })
}

/// Function implementing a unary operator symbol
pub fn unary_operator_function(op: &str) -> Option<&'static str> {
    Some(match op {
        "-" => "unaryMinus",
        "+" => "unaryPlus",
        "not" => "not",
        _ => return None,
    })
}
