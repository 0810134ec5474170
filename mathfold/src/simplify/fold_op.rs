//! Folding of operand lists

use super::boundary::{raise, Folded};
use super::context::Operation;
use super::ConstantFolder;
use crate::ast::Node;
use crate::error::FoldError;
use crate::eval::Evaluator;
use crate::literal::Literal;
use tracing::debug;

/// Accumulator of a left fold: at most one node and one literal
#[derive(Debug)]
enum Pending {
    Literal(Literal),
    Node(Node),
    /// A node followed by a literal not yet combined with it
    NodeThenLiteral(Node, Literal),
}

impl From<Folded> for Pending {
    fn from(folded: Folded) -> Self {
        match folded {
            Folded::Literal(value) => Pending::Literal(value),
            Folded::Node(node) => Pending::Node(node),
        }
    }
}

/// Collapse everything accumulated into one node
fn collapse(operation: &Operation, pending: Pending) -> Result<Node, FoldError> {
    match pending {
        Pending::Literal(value) => raise(value),
        Pending::Node(node) => Ok(node),
        Pending::NodeThenLiteral(node, value) => Ok(operation.make_node(vec![node, raise(value)?])),
    }
}

fn attach(operation: &Operation, pending: Pending, next: Node) -> Result<Pending, FoldError> {
    let tree = collapse(operation, pending)?;
    Ok(Pending::Node(operation.make_node(vec![tree, next])))
}

impl<E: Evaluator + ?Sized> ConstantFolder<'_, E> {
    /// Fold an ordered operand list left to right
    ///
    /// Adjacent literals are combined through the evaluator; everything else
    /// is rebuilt as a binary tree with the shape of `operation`. Callers
    /// put literals first when the operation is commutative.
    pub(super) fn fold_op(
        &self,
        operation: &Operation,
        operands: Vec<Folded>,
    ) -> Result<Folded, FoldError> {
        let mut operands = operands.into_iter();
        let Some(first) = operands.next() else {
            return Ok(Folded::Node(operation.make_node(Vec::new())));
        };

        let mut pending = Pending::from(first);
        for next in operands {
            pending = self.step(operation, pending, next)?;
        }

        match pending {
            Pending::Literal(value) => Ok(Folded::Literal(value)),
            pending => collapse(operation, pending).map(Folded::Node),
        }
    }

    fn step(
        &self,
        operation: &Operation,
        pending: Pending,
        next: Folded,
    ) -> Result<Pending, FoldError> {
        match (pending, next) {
            (Pending::Node(node), Folded::Literal(value)) => {
                Ok(Pending::NodeThenLiteral(node, value))
            }
            (Pending::Literal(last), Folded::Literal(value)) => {
                match self.combine(operation, &last, &value) {
                    Some(combined) => Ok(Pending::Literal(combined)),
                    None => attach(operation, Pending::Literal(last), raise(value)?),
                }
            }
            (Pending::NodeThenLiteral(node, last), Folded::Literal(value)) => {
                match self.combine(operation, &last, &value) {
                    Some(combined) => Ok(Pending::NodeThenLiteral(node, combined)),
                    None => attach(operation, Pending::NodeThenLiteral(node, last), raise(value)?),
                }
            }
            (pending, Folded::Node(next)) => attach(operation, pending, next),
        }
    }

    fn combine(&self, operation: &Operation, lhs: &Literal, rhs: &Literal) -> Option<Literal> {
        let args = [lhs.clone(), rhs.clone()];
        match self.evaluate(operation.fn_name(), &args) {
            Ok(value) => Some(value),
            Err(err) => {
                debug!(function = operation.fn_name(), %lhs, %rhs, error = %err, "literal combination failed");
                None
            }
        }
    }
}
