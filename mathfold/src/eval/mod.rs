//! Evaluation of named functions over literal values
//!
//! The folding pass never hardcodes the function catalogue: it calls an
//! [`Evaluator`] supplied by the host. [`MathLibrary`] is the default one.

mod library;

pub use library::{BuiltinFn, MathLibrary};

use crate::literal::Literal;
use thiserror::Error;

/// Recoverable evaluation failure
///
/// The walker catches these and keeps the subexpression symbolic.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    #[error("undefined function: {0}")]
    UndefinedFunction(String),

    #[error("function {name} expects {expected} argument(s), got {got}")]
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },

    #[error("type error in {name}: unexpected {got}")]
    TypeMismatch { name: String, got: String },

    #[error("division by zero")]
    DivisionByZero,

    #[error("overflow in {0}")]
    Overflow(String),

    #[error("dimension mismatch in {name}: {detail}")]
    DimensionMismatch { name: String, detail: String },
}

impl EvalError {
    pub fn arity(name: &str, expected: usize, got: usize) -> Self {
        EvalError::ArityMismatch {
            name: name.to_string(),
            expected,
            got,
        }
    }

    pub fn type_mismatch(name: &str, got: &Literal) -> Self {
        EvalError::TypeMismatch {
            name: name.to_string(),
            got: got.type_name().to_string(),
        }
    }

    pub fn overflow(name: &str) -> Self {
        EvalError::Overflow(name.to_string())
    }

    pub fn dimensions(name: &str, detail: impl Into<String>) -> Self {
        EvalError::DimensionMismatch {
            name: name.to_string(),
            detail: detail.into(),
        }
    }
}

/// Result type for evaluator calls
pub type EvalResult<T> = Result<T, EvalError>;

/// Dispatch-by-name evaluator supplied by the host
pub trait Evaluator {
    /// Apply the function `name` to literal arguments
    fn evaluate(&self, name: &str, args: &[Literal]) -> EvalResult<Literal>;

    /// Functions that must receive unevaluated syntax
    fn is_raw_args(&self, name: &str) -> bool {
        let _ = name;
        false
    }
}

impl<E: Evaluator + ?Sized> Evaluator for &E {
    fn evaluate(&self, name: &str, args: &[Literal]) -> EvalResult<Literal> {
        (**self).evaluate(name, args)
    }

    fn is_raw_args(&self, name: &str) -> bool {
        (**self).is_raw_args(name)
    }
}
