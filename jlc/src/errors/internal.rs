//! Fatal errors that indicate a bug in the compiler or in one of its collaborators.

use crate::ast::NodeTag;
use crate::errors::CompilationError;
use crate::source::Position;
use crate::types::Type;
use thiserror::Error;

/// An invariant of the analysis pipeline was broken.
///
/// Unlike `CompilationError`s, these are never collected: the pipeline stops immediately.
#[derive(Debug, Error)]
pub enum InternalCompilerError {
    #[error("ambiguous {tag} node at {position} survived until {pass}")]
    AmbiguousNodeSurvived {
        tag: NodeTag,
        position: Position,
        pass: &'static str,
    },

    #[error("{tag} node at {position} has no type during {pass}")]
    MissingType {
        tag: NodeTag,
        position: Position,
        pass: &'static str,
    },

    #[error("unexpected {tag} node at {position} during {pass}")]
    UnexpectedNode {
        tag: NodeTag,
        position: Position,
        pass: &'static str,
    },

    #[error("type of {tag} node at {position} would change from `{old}` to `{new}`")]
    MonotonicityViolation {
        tag: NodeTag,
        position: Position,
        old: Type,
        new: Type,
    },

    #[error("{0}")]
    Other(String),
}

/// Why a pass stopped before finishing the tree.
#[derive(Debug, Error)]
pub enum Abort {
    #[error("internal compiler error: {0}")]
    Fatal(#[from] InternalCompilerError),

    /// A user error under the fail-fast policy.
    #[error("{0}")]
    Semantic(CompilationError),
}

impl Abort {
    pub fn is_fatal(&self) -> bool {
        match self {
            Abort::Fatal(_) => true,
            Abort::Semantic(_) => false,
        }
    }
}
