//! Expression tree definitions

mod node;
mod print;
mod span;

pub use node::*;
pub use span::*;
