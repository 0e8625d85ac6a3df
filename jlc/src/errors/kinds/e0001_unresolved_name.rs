use crate::errors::{CompilationError, ErrorKind};
use crate::source::Position;
use crate::types::{Package, Type};

pub fn unresolved_name(name: &str, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::UnresolvedName,
        format!("cannot find symbol `{}`", name),
    )
    .with_location(location)
    .with_subtitle("not a local variable, field, type or package in the current scope")
}

pub fn unresolved_member(container: &str, name: &str, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::UnresolvedName,
        format!("cannot find symbol `{}` in `{}`", name, container),
    )
    .with_location(location)
    .with_subtitle(format!("`{}` has no member with this name", container))
}

pub fn package_used_as_value(package: &Package, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::UnresolvedName,
        format!("cannot find symbol `{}`", package),
    )
    .with_location(location)
    .with_subtitle("only resolves to a package, which is not a value or a type")
}

pub fn method_not_found(container: &Type, name: &str, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::UnresolvedName,
        format!("cannot find method `{}` in `{}`", name, container),
    )
    .with_location(location)
    .with_subtitle("refers to an unknown method")
}
