//! Compilation error definitions.

mod diagnostics;
mod internal;
mod kinds;

pub use diagnostics::Diagnostics;
pub use internal::{Abort, InternalCompilerError};
pub use kinds::constructors::*;

use crate::source::{FileId, Position};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use std::fmt::{self, Display, Formatter};

/// Classes of user-caused problems.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ErrorKind {
    UnresolvedName,
    TypeMismatch,
    DuplicateCatch,
    UncaughtExceptionNotThrown,
    DuplicateDeclaration,
    UncaughtException,
    UnreachableCode,
    InvalidBranchTarget,
    InvalidConstruct,
    UnassignedVariable,
}

impl ErrorKind {
    /// Unique code identifying a class of errors.
    pub fn code(self) -> &'static str {
        use ErrorKind::*;
        match self {
            UnresolvedName => "E0001",
            TypeMismatch => "E0002",
            DuplicateCatch => "E0003",
            UncaughtExceptionNotThrown => "E0004",
            DuplicateDeclaration => "E0005",
            UncaughtException => "E0006",
            UnreachableCode => "E0007",
            InvalidBranchTarget => "E0008",
            InvalidConstruct => "E0009",
            UnassignedVariable => "E0010",
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Severity {
    Error,
    Warning,
}

/// A user-caused problem detected during analysis.
///
/// Errors make the compilation fail; warnings are only reported.
#[derive(Clone, Debug)]
pub struct CompilationError {
    pub kind: ErrorKind,
    pub severity: Severity,

    /// Short (single-line) message describing the problem.
    pub message: String,

    /// Location in code where the problem occurred.
    pub location: Option<Position>,

    /// Extended description of the problem that is shown directly next to code.
    pub subtitle: Option<String>,

    /// Useful information related to the error, bound to some location in code.
    pub bound_notes: Vec<(Position, String)>,

    /// Useful information related to the error, not bound to any location.
    pub free_notes: Vec<String>,
}

impl CompilationError {
    /// Creates a new compilation error.
    ///
    /// Constructor functions from `kinds` should be used from the outside of this module.
    fn new(kind: ErrorKind, message: impl Into<String>) -> CompilationError {
        CompilationError {
            kind,
            severity: Severity::Error,
            message: message.into(),
            location: None,
            subtitle: None,
            bound_notes: Vec::new(),
            free_notes: Vec::new(),
        }
    }

    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    /// Annotates an error with a location in source code which refers to the primary cause.
    fn with_location(self, location: Position) -> CompilationError {
        CompilationError {
            location: Some(location),
            ..self
        }
    }

    /// Annotates an error with a subtitle to be displayed next to the primary cause location.
    fn with_subtitle(self, subtitle: impl Into<String>) -> CompilationError {
        CompilationError {
            subtitle: Some(subtitle.into()),
            ..self
        }
    }

    /// Annotates an error with a note referring to an auxiliary location in code.
    fn with_bound_note(mut self, location: Position, note: impl Into<String>) -> CompilationError {
        self.bound_notes.push((location, note.into()));
        self
    }

    /// Annotates an error with a note that cannot be linked to source code in a meaningful way.
    fn with_free_note(mut self, note: impl Into<String>) -> CompilationError {
        self.free_notes.push(note.into());
        self
    }

    /// Reports the problem with a different severity.
    pub fn with_severity(self, severity: Severity) -> CompilationError {
        CompilationError { severity, ..self }
    }

    /// Builds a `codespan_reporting` diagnostic that can be used for displaying the error.
    ///
    /// `file_id` maps the files of node positions to the ids of the caller's file database.
    pub fn to_codespan<I: Copy>(&self, file_id: impl Fn(FileId) -> I) -> Diagnostic<I> {
        let mut labels = Vec::new();

        if let Some(ref location) = self.location {
            let label = Label::primary(file_id(location.file), location.start..location.end);
            labels.push(match self.subtitle {
                Some(ref subtitle) => label.with_message(subtitle),
                None => label,
            });
        }

        for (location, note) in &self.bound_notes {
            labels.push(
                Label::secondary(file_id(location.file), location.start..location.end)
                    .with_message(note),
            );
        }

        let diagnostic = match self.severity {
            Severity::Error => Diagnostic::error(),
            Severity::Warning => Diagnostic::warning(),
        };
        diagnostic
            .with_code(self.code())
            .with_message(&self.message)
            .with_labels(labels)
            .with_notes(self.free_notes.clone())
    }
}

impl Display for CompilationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let severity = match self.severity {
            Severity::Error => "error",
            Severity::Warning => "warning",
        };
        write!(f, "{}[{}]: {}", severity, self.code(), self.message)?;
        if let Some(location) = self.location {
            write!(f, " at {}", location)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codespan_diagnostic_carries_labels() {
        let location = Position::new(FileId(3), 2, 5, 10, 14);
        let error = unresolved_name("foo", location);
        let diagnostic = error.to_codespan(|file| file.0 as usize);

        assert_eq!(diagnostic.code.as_deref(), Some("E0001"));
        assert_eq!(diagnostic.labels.len(), 1);
        assert_eq!(diagnostic.labels[0].file_id, 3);
        assert_eq!(diagnostic.labels[0].range, 10..14);
    }

    #[test]
    fn display_includes_code_and_position() {
        let error = unreachable_code(Position::at(4, 1));
        assert_eq!(error.severity, Severity::Warning);
        assert_eq!(
            error.with_severity(Severity::Error).to_string(),
            "error[E0007]: unreachable statement at 4:1"
        );
    }
}
