use crate::errors::{CompilationError, ErrorKind};
use crate::source::Position;
use crate::types::Type;

pub fn catch_not_thrown(caught: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::UncaughtExceptionNotThrown,
        format!(
            "exception `{}` is never thrown in the body of the corresponding try statement",
            caught
        ),
    )
    .with_location(location)
    .with_subtitle("this catch block can never run")
}
