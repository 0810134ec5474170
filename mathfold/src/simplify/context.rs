//! Operator properties and operand flattening

use crate::ast::{Node, OperatorNode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Algebraic properties of a function
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OperatorProperties {
    pub commutative: bool,
    pub associative: bool,
}

/// Per-function override; unset fields keep the default
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperatorOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commutative: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associative: Option<bool>,
}

/// Context restricting or extending which operators may be regrouped
///
/// For example, a matrix context marks `multiply` as non-commutative.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FoldContext {
    overrides: BTreeMap<String, OperatorOverride>,
}

impl FoldContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, properties: OperatorOverride) -> Self {
        self.overrides.insert(name.into(), properties);
        self
    }

    pub fn get(&self, name: &str) -> Option<&OperatorOverride> {
        self.overrides.get(name)
    }

    /// Effective properties of `name` in this context
    pub fn properties(&self, name: &str) -> OperatorProperties {
        let defaults = default_properties(name);
        match self.overrides.get(name) {
            Some(o) => OperatorProperties {
                commutative: o.commutative.unwrap_or(defaults.commutative),
                associative: o.associative.unwrap_or(defaults.associative),
            },
            None => defaults,
        }
    }
}

/// Built-in properties: `add`, `multiply`, `and`, `or` regroup freely
pub fn default_properties(name: &str) -> OperatorProperties {
    match name {
        "add" | "multiply" | "and" | "or" => OperatorProperties {
            commutative: true,
            associative: true,
        },
        _ => OperatorProperties::default(),
    }
}

fn properties(name: &str, context: Option<&FoldContext>) -> OperatorProperties {
    match context {
        Some(ctx) => ctx.properties(name),
        None => default_properties(name),
    }
}

pub fn is_commutative(name: &str, context: Option<&FoldContext>) -> bool {
    properties(name, context).commutative
}

pub fn is_associative(name: &str, context: Option<&FoldContext>) -> bool {
    properties(name, context).associative
}

/// The shape of an operation being folded; rebuilds nodes of the same shape
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Operation {
    Operator {
        op: String,
        fn_name: String,
        implicit: bool,
    },
    Call {
        name: String,
    },
}

impl Operation {
    pub(crate) fn of_operator(node: &OperatorNode) -> Self {
        Operation::Operator {
            op: node.op.clone(),
            fn_name: node.fn_name.clone(),
            implicit: node.implicit,
        }
    }

    pub(crate) fn of_call(name: &str) -> Self {
        Operation::Call {
            name: name.to_string(),
        }
    }

    /// Evaluator function name
    pub(crate) fn fn_name(&self) -> &str {
        match self {
            Operation::Operator { fn_name, .. } => fn_name,
            Operation::Call { name } => name,
        }
    }

    /// Build a node of this shape over `args`
    pub(crate) fn make_node(&self, args: Vec<Node>) -> Node {
        match self {
            Operation::Operator {
                op,
                fn_name,
                implicit,
            } => Node::Operator(OperatorNode {
                op: op.clone(),
                fn_name: fn_name.clone(),
                args,
                implicit: *implicit,
            }),
            Operation::Call { name } => Node::call(name.clone(), args),
        }
    }

    /// Whether `node` is another application of this operation
    fn applies_to(&self, node: &Node) -> bool {
        match (self, node) {
            (Operation::Operator { op, fn_name, .. }, Node::Operator(other)) => {
                other.args.len() > 1 && other.op == *op && other.fn_name == *fn_name
            }
            (Operation::Call { name }, Node::Call { name: other, .. }) => other == name,
            _ => false,
        }
    }
}

/// Flatten nested applications of an associative operation into one operand list
///
/// Parentheses around a nested application are transparent. Works from an
/// explicit stack, so chain length is not limited by the call stack.
pub(crate) fn all_children(operation: &Operation, args: Vec<Node>) -> Vec<Node> {
    let mut children = Vec::with_capacity(args.len());
    let mut pending: Vec<Node> = args.into_iter().rev().collect();
    while let Some(arg) = pending.pop() {
        if !operation.applies_to(unwrapped(&arg)) {
            children.push(arg);
            continue;
        }
        match into_unwrapped(arg) {
            Node::Operator(op) => pending.extend(op.args.into_iter().rev()),
            Node::Call { args, .. } => pending.extend(args.into_iter().rev()),
            other => children.push(other),
        }
    }
    children
}

fn unwrapped(mut node: &Node) -> &Node {
    while let Node::Parenthesis(inner) = node {
        node = &**inner;
    }
    node
}

fn into_unwrapped(mut node: Node) -> Node {
    loop {
        match node {
            Node::Parenthesis(inner) => node = *inner,
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add(a: Node, b: Node) -> Node {
        Node::binary("+", "add", a, b)
    }

    fn plus() -> Operation {
        Operation::Operator {
            op: "+".into(),
            fn_name: "add".into(),
            implicit: false,
        }
    }

    #[test]
    fn test_default_properties() {
        assert!(is_commutative("add", None));
        assert!(is_associative("multiply", None));
        assert!(!is_associative("subtract", None));
        assert!(!is_commutative("divide", None));
    }

    #[test]
    fn test_context_overrides_single_property() {
        let ctx = FoldContext::new().with(
            "multiply",
            OperatorOverride {
                commutative: Some(false),
                associative: None,
            },
        );
        assert!(!is_commutative("multiply", Some(&ctx)));
        assert!(is_associative("multiply", Some(&ctx)));
        assert!(is_commutative("add", Some(&ctx)));
    }

    #[test]
    fn test_all_children_flattens_nested_and_parenthesized() {
        let x = Node::symbol("x");
        let tree_args = vec![
            Node::parenthesis(add(Node::number(1.0), x.clone())),
            add(Node::number(2.0), Node::symbol("y")),
        ];
        let children = all_children(&plus(), tree_args);
        assert_eq!(
            children,
            vec![Node::number(1.0), x, Node::number(2.0), Node::symbol("y")]
        );
    }

    #[test]
    fn test_all_children_keeps_other_operators() {
        let product = Node::binary("*", "multiply", Node::number(2.0), Node::symbol("x"));
        let children = all_children(&plus(), vec![product.clone(), Node::number(1.0)]);
        assert_eq!(children, vec![product, Node::number(1.0)]);
    }

    #[test]
    fn test_make_node_preserves_shape() {
        let call = Operation::of_call("add");
        assert_eq!(
            call.make_node(vec![Node::symbol("a"), Node::symbol("b")]),
            Node::call("add", vec![Node::symbol("a"), Node::symbol("b")])
        );
        assert_eq!(plus().fn_name(), "add");
    }
}
