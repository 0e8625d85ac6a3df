use crate::errors::{CompilationError, ErrorKind};
use crate::source::Position;
use crate::types::{MethodInstance, Type};

pub fn type_mismatch(expected: &Type, found: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::TypeMismatch,
        format!(
            "incompatible types: `{}` cannot be converted to `{}`",
            found, expected
        ),
    )
    .with_location(location)
    .with_subtitle(format!("expected `{}`, found `{}`", expected, found))
}

pub fn condition_not_boolean(found: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::TypeMismatch,
        format!("condition must be of type `boolean`, not `{}`", found),
    )
    .with_location(location)
}

pub fn operator_type_mismatch(
    operator: &str,
    operands: &[&Type],
    location: Position,
) -> CompilationError {
    let operands: Vec<_> = operands.iter().map(|type_| format!("`{}`", type_)).collect();
    CompilationError::new(
        ErrorKind::TypeMismatch,
        format!(
            "operator `{}` cannot be applied to {}",
            operator,
            operands.join(" and ")
        ),
    )
    .with_location(location)
}

pub fn invalid_cast(from: &Type, to: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::TypeMismatch,
        format!("cannot cast `{}` to `{}`", from, to),
    )
    .with_location(location)
}

pub fn not_throwable(found: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::TypeMismatch,
        format!("`{}` is not a subclass of `java.lang.Throwable`", found),
    )
    .with_location(location)
}

pub fn not_an_array(found: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::TypeMismatch,
        format!("array required, but `{}` found", found),
    )
    .with_location(location)
}

pub fn switch_selector_type(found: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::TypeMismatch,
        format!(
            "switch selector must be of type `char`, `byte`, `short` or `int`, not `{}`",
            found
        ),
    )
    .with_location(location)
}

pub fn no_applicable_method(
    name: &str,
    arguments: &[Type],
    candidates: &[MethodInstance],
    location: Position,
) -> CompilationError {
    let arguments: Vec<_> = arguments.iter().map(ToString::to_string).collect();
    let mut error = CompilationError::new(
        ErrorKind::TypeMismatch,
        format!(
            "no `{}` accepts arguments of types ({})",
            name,
            arguments.join(", ")
        ),
    )
    .with_location(location);
    for candidate in candidates {
        error = error.with_free_note(format!("candidate: {}", candidate.signature()));
    }
    error
}

pub fn ambiguous_call(
    name: &str,
    candidates: &[MethodInstance],
    location: Position,
) -> CompilationError {
    let signatures: Vec<_> = candidates.iter().map(MethodInstance::signature).collect();
    CompilationError::new(
        ErrorKind::TypeMismatch,
        format!("reference to `{}` is ambiguous", name),
    )
    .with_location(location)
    .with_free_note(format!("candidates: {}", signatures.join("; ")))
}

pub fn return_type_mismatch(expected: &Type, found: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::TypeMismatch,
        format!(
            "cannot return a value of type `{}` from a method returning `{}`",
            found, expected
        ),
    )
    .with_location(location)
}

pub fn not_a_class(found: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::TypeMismatch,
        format!("class type required, but `{}` found", found),
    )
    .with_location(location)
}
