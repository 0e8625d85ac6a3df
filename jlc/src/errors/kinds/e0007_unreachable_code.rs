use crate::errors::{CompilationError, ErrorKind, Severity};
use crate::source::Position;

pub fn unreachable_code(location: Position) -> CompilationError {
    CompilationError::new(ErrorKind::UnreachableCode, "unreachable statement")
        .with_location(location)
        .with_subtitle("control never reaches this statement")
        .with_severity(Severity::Warning)
}
