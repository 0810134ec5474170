//! Constant indexing of arrays, matrices and objects
//!
//! Only the first two remaining dimensions are ever inspected, so a constant
//! third index of a 3-D array stays symbolic.

use super::boundary::Folded;
use super::ConstantFolder;
use crate::ast::{ConstValue, Node};
use crate::error::FoldError;
use crate::eval::Evaluator;
use crate::literal::Literal;
use tracing::debug;

/// Constant, positive, integral index value
fn constant_index(node: &Node) -> Option<usize> {
    let value = match node.as_constant()? {
        ConstValue::Number(n) => *n,
        ConstValue::Decimal(d) => num_traits::ToPrimitive::to_f64(d)?,
        _ => return None,
    };
    (value >= 1.0 && value.fract() == 0.0 && value <= usize::MAX as f64).then(|| value as usize)
}

/// Object key named by a constant index
fn constant_key(node: &Node) -> Option<String> {
    match node.as_constant()? {
        ConstValue::Text(s) => Some(s.clone()),
        ConstValue::Number(n) => Some(n.to_string()),
        ConstValue::Decimal(d) => Some(d.to_string()),
        _ => None,
    }
}

fn unresolved(object: Folded, dims: Vec<Node>) -> Result<Folded, FoldError> {
    Ok(Folded::Node(Node::accessor(object.into_node()?, Node::Index(dims))))
}

impl<E: Evaluator + ?Sized> ConstantFolder<'_, E> {
    /// Resolve an accessor whose object and index are already folded
    pub(super) fn fold_accessor(&mut self, object: Folded, index: Folded) -> Result<Folded, FoldError> {
        let dims = match index {
            Folded::Node(Node::Index(dims)) => dims,
            other => {
                return Ok(Folded::Node(Node::accessor(
                    object.into_node()?,
                    other.into_node()?,
                )));
            }
        };

        match object {
            Folded::Node(Node::Array(_)) | Folded::Literal(Literal::Matrix(_)) => {
                self.resolve_dimensions(object, dims)
            }
            Folded::Node(Node::Object(props)) => self.resolve_member(props, dims),
            other => unresolved(other, dims),
        }
    }

    fn resolve_dimensions(&mut self, object: Folded, dims: Vec<Node>) -> Result<Folded, FoldError> {
        let total = dims.len();
        let mut remaining = dims;
        let mut target = object;

        while let Some(first) = remaining.first() {
            if let Some(i) = constant_index(first) {
                match self.select(target, i)? {
                    Ok(element) => {
                        target = element;
                        remaining.remove(0);
                    }
                    Err(original) => {
                        target = original;
                        break;
                    }
                }
            } else if let Some(j) = remaining.get(1).and_then(constant_index) {
                match self.column(target, j)? {
                    Ok(column) => {
                        target = column;
                        remaining.remove(1);
                    }
                    Err(original) => {
                        target = original;
                        break;
                    }
                }
            } else {
                break;
            }
        }

        if remaining.is_empty() {
            return Ok(target);
        }
        if remaining.len() == total {
            debug!(dimensions = total, "no constant index could be resolved");
        }
        unresolved(target, remaining)
    }

    /// Element `i` (1-based) of an array or matrix; gives the target back on failure
    fn select(&mut self, target: Folded, i: usize) -> Result<Result<Folded, Folded>, FoldError> {
        match target {
            Folded::Node(Node::Array(mut items)) if i <= items.len() => {
                let item = items.swap_remove(i - 1);
                self.fold(item).map(Ok)
            }
            Folded::Literal(Literal::Matrix(mut items)) if i <= items.len() => {
                Ok(Ok(Folded::Literal(items.swap_remove(i - 1))))
            }
            other => {
                debug!(index = i, "index out of range or target not indexable");
                Ok(Err(other))
            }
        }
    }

    /// Column `j` (1-based) across every row; gives the target back on failure
    fn column(&mut self, target: Folded, j: usize) -> Result<Result<Folded, Folded>, FoldError> {
        match target {
            Folded::Node(Node::Array(rows)) => {
                let picked: Option<Vec<Node>> = rows
                    .iter()
                    .map(|row| match row {
                        Node::Array(items) => items.get(j - 1).cloned(),
                        _ => None,
                    })
                    .collect();
                match picked {
                    Some(column) => self.fold(Node::Array(column)).map(Ok),
                    None => Ok(Err(Folded::Node(Node::Array(rows)))),
                }
            }
            Folded::Literal(Literal::Matrix(rows)) => {
                let picked: Option<Vec<Literal>> = rows
                    .iter()
                    .map(|row| match row {
                        Literal::Matrix(items) => items.get(j - 1).cloned(),
                        _ => None,
                    })
                    .collect();
                match picked {
                    Some(column) => Ok(Ok(Folded::Literal(Literal::Matrix(column)))),
                    None => Ok(Err(Folded::Literal(Literal::Matrix(rows)))),
                }
            }
            other => Ok(Err(other)),
        }
    }

    fn resolve_member(
        &mut self,
        mut props: std::collections::BTreeMap<String, Node>,
        dims: Vec<Node>,
    ) -> Result<Folded, FoldError> {
        let key = match dims.as_slice() {
            [only] => constant_key(only),
            _ => None,
        };
        let Some(key) = key else {
            return unresolved(Folded::Node(Node::Object(props)), dims);
        };
        match props.remove(&key) {
            Some(member) => self.fold(member),
            None => Ok(Folded::Node(Node::undefined())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{MathConfig, SimplifyOptions};
    use crate::eval::MathLibrary;
    use num_rational::Rational64;
    use std::collections::BTreeMap;

    fn frac(n: i64) -> Literal {
        Literal::Fraction(Rational64::from_integer(n))
    }

    fn index(dims: Vec<Node>) -> Folded {
        Folded::Node(Node::Index(dims))
    }

    fn access(object: Folded, dims: Vec<Node>) -> Result<Folded, FoldError> {
        let library = MathLibrary::new();
        let config = MathConfig::default();
        let options = SimplifyOptions::default();
        let mut folder = ConstantFolder::new(&library, &config, &options);
        folder.fold_accessor(object, index(dims))
    }

    fn square() -> Literal {
        Literal::matrix(vec![
            Literal::matrix(vec![frac(1), frac(2)]),
            Literal::matrix(vec![frac(3), frac(4)]),
        ])
    }

    #[test]
    fn test_constant_index_values() {
        assert_eq!(constant_index(&Node::number(2.0)), Some(2));
        assert_eq!(constant_index(&Node::number(0.0)), None);
        assert_eq!(constant_index(&Node::number(1.5)), None);
        assert_eq!(constant_index(&Node::string("1")), None);
        assert_eq!(constant_index(&Node::symbol("i")), None);
    }

    #[test]
    fn test_matrix_fully_resolved() {
        let result = access(
            Folded::Literal(square()),
            vec![Node::number(2.0), Node::number(1.0)],
        );
        assert_eq!(result, Ok(Folded::Literal(frac(3))));
    }

    #[test]
    fn test_symbolic_first_dimension_extracts_column() {
        let result = access(
            Folded::Literal(square()),
            vec![Node::symbol("i"), Node::number(2.0)],
        );
        let column = Node::Array(vec![Node::number(2.0), Node::number(4.0)]);
        assert_eq!(
            result,
            Ok(Folded::Node(Node::accessor(
                column,
                Node::Index(vec![Node::symbol("i")])
            )))
        );
    }

    #[test]
    fn test_partially_symbolic_array() {
        let array = Folded::Node(Node::Array(vec![Node::number(1.0), Node::symbol("x")]));
        assert_eq!(
            access(array.clone(), vec![Node::number(2.0)]),
            Ok(Folded::Node(Node::symbol("x")))
        );
        assert_eq!(
            access(array, vec![Node::number(1.0)]),
            Ok(Folded::Literal(frac(1)))
        );
    }

    #[test]
    fn test_out_of_range_stays_accessor() {
        let result = access(Folded::Literal(square()), vec![Node::number(3.0)]);
        let Ok(Folded::Node(Node::Accessor { index, .. })) = result else {
            panic!("Expected accessor");
        };
        assert_eq!(*index, Node::Index(vec![Node::number(3.0)]));
    }

    #[test]
    fn test_object_member_lookup() {
        let mut props = BTreeMap::new();
        props.insert("a".to_string(), Node::number(1.0));
        props.insert("b".to_string(), Node::symbol("y"));
        let object = Folded::Node(Node::Object(props));
        assert_eq!(
            access(object.clone(), vec![Node::string("b")]),
            Ok(Folded::Node(Node::symbol("y")))
        );
        assert_eq!(
            access(object.clone(), vec![Node::string("missing")]),
            Ok(Folded::Node(Node::undefined()))
        );
        assert!(matches!(
            access(object, vec![Node::symbol("k")]),
            Ok(Folded::Node(Node::Accessor { .. }))
        ));
    }

    #[test]
    fn test_other_targets_stay_accessors() {
        let result = access(Folded::Node(Node::symbol("A")), vec![Node::number(1.0)]);
        assert_eq!(
            result,
            Ok(Folded::Node(Node::accessor(
                Node::symbol("A"),
                Node::Index(vec![Node::number(1.0)])
            )))
        );
    }
}
