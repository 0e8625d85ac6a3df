use crate::errors::{CompilationError, ErrorKind};
use crate::source::Position;
use crate::types::{FieldInstance, MethodInstance, Type};

pub fn abstract_instantiation(class: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::InvalidConstruct,
        format!("`{}` is abstract; cannot be instantiated", class),
    )
    .with_location(location)
}

pub fn return_outside_method(location: Position) -> CompilationError {
    CompilationError::new(ErrorKind::InvalidConstruct, "return outside of a method body")
        .with_location(location)
}

pub fn return_value_in_void(location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::InvalidConstruct,
        "cannot return a value from a method whose result type is `void`",
    )
    .with_location(location)
}

pub fn missing_return_value(expected: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::InvalidConstruct,
        format!("missing return value of type `{}`", expected),
    )
    .with_location(location)
}

pub fn missing_return_statement(location: Position) -> CompilationError {
    CompilationError::new(ErrorKind::InvalidConstruct, "missing return statement")
        .with_location(location)
        .with_subtitle("control can reach the end of this method")
}

pub fn not_a_variable(operator: &str, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::InvalidConstruct,
        format!("operand of `{}` must be a variable", operator),
    )
    .with_location(location)
}

pub fn type_used_as_value(type_: &Type, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::InvalidConstruct,
        format!("type `{}` used where a value is expected", type_),
    )
    .with_location(location)
}

pub fn value_used_as_type(location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::InvalidConstruct,
        "expression used where a type is expected",
    )
    .with_location(location)
}

pub fn instance_field_in_static_context(field: &FieldInstance, location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::InvalidConstruct,
        format!(
            "non-static field `{}` cannot be referenced through the type `{}`",
            field.name, field.container
        ),
    )
    .with_location(location)
}

pub fn void_value(location: Position) -> CompilationError {
    CompilationError::new(ErrorKind::InvalidConstruct, "`void` type not allowed here")
        .with_location(location)
}

pub fn this_outside_class(location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::InvalidConstruct,
        "`this` and `super` can only be used inside a class",
    )
    .with_location(location)
}

pub fn this_in_static_context(location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::InvalidConstruct,
        "`this` and `super` cannot be used in a static context",
    )
    .with_location(location)
}

pub fn case_label_not_constant(location: Position) -> CompilationError {
    CompilationError::new(
        ErrorKind::InvalidConstruct,
        "case label must be a constant expression",
    )
    .with_location(location)
}

pub fn instance_method_in_static_context(
    method: &MethodInstance,
    location: Position,
) -> CompilationError {
    CompilationError::new(
        ErrorKind::InvalidConstruct,
        format!(
            "non-static method `{}` cannot be referenced from a static context",
            method.signature()
        ),
    )
    .with_location(location)
}
