use crate::errors::{CompilationError, ErrorKind};
use crate::source::Position;

pub fn duplicate_local(name: &str, location: Position, previous: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::DuplicateDeclaration,
        format!("variable `{}` is already defined in this method", name),
    )
    .with_location(location)
    .with_subtitle("redefined here")
    .with_bound_note(previous, "previous definition")
}

pub fn duplicate_case_label(label: &str, location: Position, previous: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::DuplicateDeclaration,
        format!("duplicate case label `{}`", label),
    )
    .with_location(location)
    .with_bound_note(previous, "first used here")
}

pub fn duplicate_default_label(location: Position, previous: Position) -> CompilationError {
    CompilationError::new(ErrorKind::DuplicateDeclaration, "duplicate default label")
        .with_location(location)
        .with_bound_note(previous, "first used here")
}
