//! Provenance information attached to every syntax node.

use std::fmt::{self, Display, Formatter};

/// Identifies a source file known to the driver.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, Default)]
pub struct FileId(pub u32);

/// Location of a node in its source file.
///
/// Positions are assigned by the parser and never change afterwards: rewriting a node keeps
/// the position of the node it replaces.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug)]
pub struct Position {
    pub file: FileId,
    pub line: u32,
    pub column: u32,

    /// Byte offsets of the node text, used when rendering diagnostics.
    pub start: usize,
    pub end: usize,
}

impl Position {
    pub fn new(file: FileId, line: u32, column: u32, start: usize, end: usize) -> Position {
        Position {
            file,
            line,
            column,
            start,
            end,
        }
    }

    /// A position in the default file that only carries a line and a column.
    pub fn at(line: u32, column: u32) -> Position {
        Position::new(FileId::default(), line, column, 0, 0)
    }

    /// A placeholder for nodes that are not backed by any source text.
    ///
    /// Can be useful when the caller is sure that the position is never going to be shown
    /// to the end user.
    pub fn synthetic() -> Position {
        Position::at(0, 0)
    }

    /// The empty position at the start of `self`.
    pub fn start_of(&self) -> Position {
        Position {
            end: self.start,
            ..*self
        }
    }

    pub fn is_synthetic(&self) -> bool {
        self.line == 0
    }
}

impl Display for Position {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.is_synthetic() {
            write!(f, "<synthetic>")
        } else {
            write!(f, "{}:{}", self.line, self.column)
        }
    }
}
