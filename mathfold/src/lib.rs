//! Constant folding for symbolic math expressions
//!
//! Parses expressions such as `x + 4*3/6` and evaluates every subtree made
//! purely of literals, so the result reads `x + 2`.

pub mod ast;
pub mod config;
pub mod error;
pub mod eval;
pub mod lexer;
pub mod literal;
pub mod parser;
pub mod repl;
pub mod simplify;

pub use ast::{ConstValue, Node, Span};
pub use config::{FileConfig, MathConfig, NumberType, SimplifyOptions};
pub use error::{Error, FoldError, Result};
pub use eval::{EvalError, Evaluator, MathLibrary};
pub use literal::Literal;
pub use parser::parse_expression;
pub use simplify::{simplify_constant, FoldContext, OperatorOverride, Simplifier};
