use crate::errors::{CompilationError, ErrorKind};
use crate::source::Position;

pub fn variable_not_initialized(name: &str, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::UnassignedVariable,
        format!("variable `{}` might not have been initialized", name),
    )
    .with_location(location)
    .with_subtitle("read before it is definitely assigned")
}

pub fn final_variable_reassigned(name: &str, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::UnassignedVariable,
        format!("final variable `{}` might already have been assigned", name),
    )
    .with_location(location)
}
