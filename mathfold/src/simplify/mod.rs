//! Constant folding
//!
//! Evaluates every subtree built purely from literals and strips redundant
//! grouping, leaving symbolic subtrees in place. Literal subtrees are kept as
//! [`Literal`] values for as long as possible and only raised back into
//! nodes when they meet something symbolic.
//!
//! ```
//! use mathfold::{parse_expression, simplify_constant, MathConfig, SimplifyOptions};
//!
//! let expr = parse_expression("x + 4*3/6", &MathConfig::default()).unwrap();
//! let folded = simplify_constant(expr, &SimplifyOptions::default()).unwrap();
//! assert_eq!(folded.to_string(), "x + 2");
//! ```

mod accessor;
mod boundary;
mod coerce;
mod context;
mod fold_op;

pub use boundary::{lower, raise, Folded};
pub use coerce::{coerce, exact_fraction};
pub use context::{
    default_properties, is_associative, is_commutative, FoldContext, OperatorOverride,
    OperatorProperties,
};

use crate::ast::Node;
use crate::config::{MathConfig, SimplifyOptions};
use crate::error::FoldError;
use crate::eval::{EvalResult, Evaluator, MathLibrary};
use crate::literal::Literal;
use context::{all_children, Operation};
use tracing::{debug, trace};

/// Stack growth parameters for deep trees
const STACK_RED_ZONE: usize = 128 * 1024; // 128KB remaining triggers growth
const STACK_GROW_SIZE: usize = 4 * 1024 * 1024; // Grow by 4MB each time

/// Function names that fold like their operators
const OPERATOR_FUNCTIONS: [&str; 2] = ["add", "multiply"];

/// Constant folder bound to an evaluator and a numeric configuration
pub struct Simplifier<E: Evaluator = MathLibrary> {
    evaluator: E,
    config: MathConfig,
}

impl Simplifier<MathLibrary> {
    pub fn new() -> Self {
        Self::with_evaluator(MathLibrary::new())
    }
}

impl Default for Simplifier<MathLibrary> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Evaluator> Simplifier<E> {
    pub fn with_evaluator(evaluator: E) -> Self {
        Self {
            evaluator,
            config: MathConfig::default(),
        }
    }

    pub fn with_config(mut self, config: MathConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &MathConfig {
        &self.config
    }

    /// Fold every constant subexpression of `node`
    ///
    /// Fails on assignment, block, function definition, range and conditional
    /// nodes, and when a complex value would have to become a node.
    pub fn simplify_constant(&self, node: Node, options: &SimplifyOptions) -> Result<Node, FoldError> {
        debug!(number = ?self.config.number, exact = options.exact_fractions, "simplify constant");
        let mut folder = ConstantFolder::new(&self.evaluator, &self.config, options);
        let result = folder.fold(node)?.into_node()?;
        debug!(%result, "simplify constant done");
        Ok(result)
    }
}

/// Fold with the default math library and number configuration
pub fn simplify_constant(node: Node, options: &SimplifyOptions) -> Result<Node, FoldError> {
    Simplifier::new().simplify_constant(node, options)
}

/// Recursive walker for one top-level fold
pub(crate) struct ConstantFolder<'a, E: ?Sized> {
    evaluator: &'a E,
    config: &'a MathConfig,
    options: &'a SimplifyOptions,
    depth: usize,
}

impl<'a, E: Evaluator + ?Sized> ConstantFolder<'a, E> {
    pub(crate) fn new(evaluator: &'a E, config: &'a MathConfig, options: &'a SimplifyOptions) -> Self {
        Self {
            evaluator,
            config,
            options,
            depth: 0,
        }
    }

    fn coerce(&self, value: Literal) -> Literal {
        coerce(value, self.config, self.options)
    }

    /// Call the evaluator, retrying once with fractions turned into floats
    fn evaluate(&self, name: &str, args: &[Literal]) -> EvalResult<Literal> {
        match self.evaluator.evaluate(name, args) {
            Ok(value) => Ok(self.coerce(value)),
            Err(err) if args.iter().any(Literal::contains_fraction) => {
                debug!(function = name, error = %err, "retrying without fractions");
                let plain: Vec<Literal> = args.iter().cloned().map(Literal::without_fractions).collect();
                self.evaluator.evaluate(name, &plain).map(|value| self.coerce(value))
            }
            Err(err) => Err(err),
        }
    }

    pub(crate) fn fold(&mut self, node: Node) -> Result<Folded, FoldError> {
        if self.depth >= self.options.max_depth {
            return Err(FoldError::DepthExceeded {
                limit: self.options.max_depth,
            });
        }
        self.depth += 1;
        let result = stacker::maybe_grow(STACK_RED_ZONE, STACK_GROW_SIZE, || self.fold_inner(node));
        self.depth -= 1;
        result
    }

    fn fold_inner(&mut self, node: Node) -> Result<Folded, FoldError> {
        trace!(kind = node.kind_name(), depth = self.depth, "fold");
        match node {
            Node::Symbol(_) => Ok(Folded::Node(node)),

            Node::Constant(value) => match lower(&value, self.config, self.options) {
                Some(literal) => Ok(Folded::Literal(literal)),
                None => Ok(Folded::Node(Node::Constant(value))),
            },

            Node::Call { name, args } => {
                if self.evaluator.is_raw_args(&name) {
                    return Ok(Folded::Node(Node::Call { name, args }));
                }
                if OPERATOR_FUNCTIONS.contains(&name.as_str()) {
                    return self.fold_operation(Operation::of_call(&name), args);
                }
                self.fold_call(name, args)
            }

            Node::Operator(op) => {
                let operation = Operation::of_operator(&op);
                if op.is_unary() {
                    let mut args = op.args;
                    let operand = args.pop().map(|arg| self.fold(arg)).transpose()?;
                    return match operand {
                        Some(operand) => self.fold_unary(&operation, operand),
                        None => Ok(Folded::Node(operation.make_node(Vec::new()))),
                    };
                }
                self.fold_operation(operation, op.args)
            }

            Node::Parenthesis(content) => self.fold(*content),

            Node::Accessor { object, index } => {
                let object = self.fold(*object)?;
                let index = self.fold(*index)?;
                self.fold_accessor(object, index)
            }

            Node::Array(items) => {
                let folded = self.fold_all(items)?;
                if folded.iter().any(Folded::is_node) {
                    return nodes_of(folded).map(|items| Folded::Node(Node::Array(items)));
                }
                let literals = folded
                    .into_iter()
                    .filter_map(|item| match item {
                        Folded::Literal(value) => Some(value),
                        Folded::Node(_) => None,
                    })
                    .collect();
                Ok(Folded::Literal(Literal::Matrix(literals)))
            }

            Node::Index(dims) => {
                let dims = dims
                    .into_iter()
                    .map(|dim| self.fold(dim)?.into_node())
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Folded::Node(Node::Index(dims)))
            }

            Node::Object(props) => {
                let props = props
                    .into_iter()
                    .map(|(key, value)| -> Result<(String, Node), FoldError> {
                        Ok((key, self.fold(value)?.into_node()?))
                    })
                    .collect::<Result<_, _>>()?;
                Ok(Folded::Node(Node::Object(props)))
            }

            Node::Assignment { .. }
            | Node::Block(_)
            | Node::FunctionAssignment { .. }
            | Node::Range { .. }
            | Node::Conditional { .. } => Err(FoldError::Unsupported {
                kind: node.kind_name(),
            }),
        }
    }

    fn fold_all(&mut self, nodes: Vec<Node>) -> Result<Vec<Folded>, FoldError> {
        nodes.into_iter().map(|node| self.fold(node)).collect()
    }

    fn fold_unary(&self, operation: &Operation, operand: Folded) -> Result<Folded, FoldError> {
        let Folded::Literal(value) = operand else {
            return Ok(Folded::Node(operation.make_node(vec![operand.into_node()?])));
        };
        match self.evaluate(operation.fn_name(), std::slice::from_ref(&value)) {
            Ok(result) => Ok(Folded::Literal(result)),
            Err(err) => {
                debug!(function = operation.fn_name(), error = %err, "unary evaluation failed");
                Ok(Folded::Node(operation.make_node(vec![raise(value)?])))
            }
        }
    }

    fn fold_call(&mut self, name: String, args: Vec<Node>) -> Result<Folded, FoldError> {
        let folded = self.fold_all(args)?;

        if !folded.iter().any(Folded::is_node) {
            let literals: Vec<Literal> = folded
                .iter()
                .filter_map(|arg| match arg {
                    Folded::Literal(value) => Some(value.clone()),
                    Folded::Node(_) => None,
                })
                .collect();
            match self.evaluate(&name, &literals) {
                Ok(value) => return Ok(Folded::Literal(value)),
                Err(err) => debug!(function = %name, error = %err, "evaluation failed, keeping call"),
            }
        }

        if name == "size" {
            if let [Folded::Node(array @ Node::Array(_))] = folded.as_slice() {
                let shape = array_shape(array)
                    .into_iter()
                    .map(|d| Literal::Number(d as f64))
                    .collect();
                return Ok(Folded::Literal(self.coerce(Literal::Matrix(shape))));
            }
        }

        nodes_of(folded).map(|args| Folded::Node(Node::call(name, args)))
    }

    /// Fold a binary or n-ary operation, regrouping when its properties allow
    fn fold_operation(&mut self, operation: Operation, args: Vec<Node>) -> Result<Folded, FoldError> {
        let context = self.options.context.as_ref();
        let associative = is_associative(operation.fn_name(), context);
        let commutative = is_commutative(operation.fn_name(), context);

        if !associative {
            let folded = self.fold_all(args)?;
            return self.fold_op(&operation, folded);
        }

        let folded = self.fold_all(all_children(&operation, args))?;
        let literal_count = folded.iter().filter(|f| !f.is_node()).count();
        if !commutative || literal_count <= 1 {
            return self.fold_op(&operation, folded);
        }

        let (literals, symbolic): (Vec<_>, Vec<_>) = folded.into_iter().partition(|f| !f.is_node());
        let head = self.fold_op(&operation, literals)?;
        let operands = std::iter::once(head).chain(symbolic).collect();
        self.fold_op(&operation, operands)
    }
}

fn nodes_of(folded: Vec<Folded>) -> Result<Vec<Node>, FoldError> {
    folded.into_iter().map(Folded::into_node).collect()
}

/// Dimensions of a nested array node, following the first element of each level
fn array_shape(node: &Node) -> Vec<usize> {
    let mut shape = Vec::new();
    let mut section = node;
    while let Node::Array(items) = section {
        shape.push(items.len());
        match items.first() {
            Some(first) => section = first,
            None => break,
        }
    }
    shape
}
