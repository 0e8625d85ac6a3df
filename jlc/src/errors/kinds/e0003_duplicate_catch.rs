use crate::errors::{CompilationError, ErrorKind};
use crate::source::Position;
use crate::types::Type;

pub fn duplicate_catch(
    caught: &Type,
    location: Position,
    earlier: &Type,
    earlier_location: Position,
) -> CompilationError {
    CompilationError::new(
        ErrorKind::DuplicateCatch,
        format!(
            "exception `{}` has already been caught by an earlier catch block",
            caught
        ),
    )
    .with_location(location)
    .with_subtitle("this catch block is unreachable")
    .with_bound_note(earlier_location, format!("`{}` is caught here", earlier))
}
