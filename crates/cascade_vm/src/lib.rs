//! CascadeLang runtime: the object heap with its reverse-reference index and
//! cascade-delete algorithm, plus the tree-walking interpreter that drives it.

mod builtins;
pub mod heap;
mod runtime_error;
pub mod types;
pub mod value;
mod vm;

pub use runtime_error::RuntimeError;
pub use vm::{eval, eval_with_output};
