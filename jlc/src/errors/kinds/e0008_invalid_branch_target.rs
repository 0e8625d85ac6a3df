use crate::errors::{CompilationError, ErrorKind};
use crate::source::Position;

pub fn branch_target_not_found(
    keyword: &str,
    label: Option<&str>,
    location: Position,
) -> CompilationError {
    let message = match label {
        Some(label) => format!("undefined label `{}` for `{}`", label, keyword),
        None => format!("`{}` outside of a loop or switch", keyword),
    };
    CompilationError::new(ErrorKind::InvalidBranchTarget, message)
        .with_location(location)
        .with_subtitle("target of branch statement not found")
}

pub fn continue_target_not_loop(label: &str, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::InvalidBranchTarget,
        format!("label `{}` does not name a loop", label),
    )
    .with_location(location)
    .with_free_note("`continue` can only target `while`, `do` and `for` statements")
}
