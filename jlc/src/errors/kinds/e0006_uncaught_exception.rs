use crate::errors::{CompilationError, ErrorKind};
use crate::source::Position;
use crate::types::Type;

pub fn uncaught_exception(exception: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::UncaughtException,
        format!(
            "unreported exception `{}`; must either be caught or declared to be thrown",
            exception
        ),
    )
    .with_location(location)
    .with_subtitle(format!("may throw `{}`", exception))
}
