//! Semantic types and the symbols that the analysis passes bind names to.
//!
//! Types are plain values: two `Type`s are equal when they denote the same type, regardless of
//! where they were obtained. Class types are shared through `Arc`, so that a single populated
//! `ClassTable` can serve compilation units analyzed on different threads.

mod class;
mod resolver;
mod system;
mod table;

pub use class::{
    ClassBuilder, ClassType, Constant, FieldInstance, Flags, LocalId, LocalInstance,
    MethodInstance,
};
pub use resolver::{Lookup, OverloadError, Package, Qualifier, Resolver};
pub use system::{StandardTypeSystem, TypeSystem};
pub use table::ClassTable;

use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Built-in primitive types, `void` included.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PrimitiveKind {
    Boolean,
    Byte,
    Short,
    Char,
    Int,
    Long,
    Float,
    Double,
    Void,
}

impl PrimitiveKind {
    pub fn name(self) -> &'static str {
        use PrimitiveKind::*;
        match self {
            Boolean => "boolean",
            Byte => "byte",
            Short => "short",
            Char => "char",
            Int => "int",
            Long => "long",
            Float => "float",
            Double => "double",
            Void => "void",
        }
    }

    pub fn from_name(name: &str) -> Option<PrimitiveKind> {
        use PrimitiveKind::*;
        let kind = match name {
            "boolean" => Boolean,
            "byte" => Byte,
            "short" => Short,
            "char" => Char,
            "int" => Int,
            "long" => Long,
            "float" => Float,
            "double" => Double,
            "void" => Void,
            _ => return None,
        };
        Some(kind)
    }

    pub fn is_numeric(self) -> bool {
        use PrimitiveKind::*;
        match self {
            Byte | Short | Char | Int | Long | Float | Double => true,
            Boolean | Void => false,
        }
    }

    pub fn is_integral(self) -> bool {
        use PrimitiveKind::*;
        match self {
            Byte | Short | Char | Int | Long => true,
            _ => false,
        }
    }
}

/// A type of a value or expression.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum Type {
    Primitive(PrimitiveKind),

    /// The type of the `null` literal.
    Null,

    Class(Arc<ClassType>),
    Array(Arc<Type>),
}

impl Type {
    pub fn boolean() -> Type {
        Type::Primitive(PrimitiveKind::Boolean)
    }

    pub fn byte() -> Type {
        Type::Primitive(PrimitiveKind::Byte)
    }

    pub fn short() -> Type {
        Type::Primitive(PrimitiveKind::Short)
    }

    pub fn char() -> Type {
        Type::Primitive(PrimitiveKind::Char)
    }

    pub fn int() -> Type {
        Type::Primitive(PrimitiveKind::Int)
    }

    pub fn long() -> Type {
        Type::Primitive(PrimitiveKind::Long)
    }

    pub fn float() -> Type {
        Type::Primitive(PrimitiveKind::Float)
    }

    pub fn double() -> Type {
        Type::Primitive(PrimitiveKind::Double)
    }

    pub fn void() -> Type {
        Type::Primitive(PrimitiveKind::Void)
    }

    pub fn class(class: &Arc<ClassType>) -> Type {
        Type::Class(Arc::clone(class))
    }

    pub fn array_of(base: Type) -> Type {
        Type::Array(Arc::new(base))
    }

    /// Wraps `base` into `dims` levels of array types.
    pub fn array_of_dims(base: Type, dims: usize) -> Type {
        (0..dims).fold(base, |type_, _| Type::array_of(type_))
    }

    pub fn primitive(&self) -> Option<PrimitiveKind> {
        match self {
            Type::Primitive(kind) => Some(*kind),
            _ => None,
        }
    }

    pub fn is_primitive(&self) -> bool {
        self.primitive().is_some()
    }

    pub fn is_numeric(&self) -> bool {
        self.primitive().map_or(false, PrimitiveKind::is_numeric)
    }

    pub fn is_integral(&self) -> bool {
        self.primitive().map_or(false, PrimitiveKind::is_integral)
    }

    pub fn is_boolean(&self) -> bool {
        self.primitive() == Some(PrimitiveKind::Boolean)
    }

    pub fn is_void(&self) -> bool {
        self.primitive() == Some(PrimitiveKind::Void)
    }

    pub fn is_null(&self) -> bool {
        match self {
            Type::Null => true,
            _ => false,
        }
    }

    /// Class, array and null types are reference types.
    pub fn is_reference(&self) -> bool {
        match self {
            Type::Class(_) | Type::Array(_) | Type::Null => true,
            Type::Primitive(_) => false,
        }
    }

    pub fn is_array(&self) -> bool {
        self.array_base().is_some()
    }

    pub fn as_class(&self) -> Option<&Arc<ClassType>> {
        match self {
            Type::Class(class) => Some(class),
            _ => None,
        }
    }

    pub fn array_base(&self) -> Option<&Type> {
        match self {
            Type::Array(base) => Some(base),
            _ => None,
        }
    }

    pub fn is_class_named(&self, name: &str) -> bool {
        self.as_class().map_or(false, |class| class.name() == name)
    }

    pub fn is_string(&self) -> bool {
        self.is_class_named("java.lang.String")
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Type::Primitive(kind) => write!(f, "{}", kind.name()),
            Type::Null => write!(f, "null"),
            Type::Class(class) => write!(f, "{}", class.name()),
            Type::Array(base) => write!(f, "{}[]", base),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn array_types_compare_structurally() {
        let a = Type::array_of(Type::int());
        let b = Type::array_of_dims(Type::int(), 1);
        assert_eq!(a, b);
        assert_ne!(a, Type::array_of(Type::long()));
        assert_eq!(Type::array_of_dims(Type::char(), 2).to_string(), "char[][]");
    }

    #[test]
    fn class_types_compare_by_name() {
        let first = ClassType::builder("p.A").build();
        let second = ClassType::builder("p.A").flags(Flags::FINAL).build();
        assert_eq!(Type::class(&first), Type::class(&second));
        assert!(Type::class(&first).is_reference());
        assert!(!Type::int().is_reference());
    }
}
