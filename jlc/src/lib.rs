//! Semantic analysis core of a Java-like compiler.
//!
//! A parser hands over a syntax tree that may still contain ambiguous names. The
//! `Pipeline` resolves them, assigns and checks types, computes the exceptions every term
//! may throw and builds flow graphs of all code bodies, reporting problems as
//! `CompilationError`s along the way.

pub mod ast;
pub mod cfg;
pub mod errors;
pub mod options;
pub mod passes;
pub mod pipeline;
pub mod scope;
pub mod source;
pub mod types;
pub mod utils;
pub mod visit;

pub use crate::ast::{Node, NodeKind, NodeTag};
pub use crate::errors::{Abort, CompilationError, ErrorKind, InternalCompilerError, Severity};
pub use crate::options::{CompilerOptions, ErrorPolicy};
pub use crate::pipeline::{Compilation, Extensions, Pipeline};
