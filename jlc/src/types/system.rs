//! Type compatibility rules.

use crate::errors::InternalCompilerError;
use crate::types::{ClassType, Constant, Lookup, PrimitiveKind, Resolver, Type};

/// Oracle answering type compatibility questions for the type checker and the exception
/// checker.
///
/// Only the well-known classes and the primitive rules are required; everything else has a
/// default implementation in terms of them.
pub trait TypeSystem: Send + Sync {
    fn object(&self) -> Type;
    fn string(&self) -> Type;
    fn class_type(&self) -> Type;
    fn throwable(&self) -> Type;
    fn error(&self) -> Type;
    fn runtime_exception(&self) -> Type;
    fn null_pointer_exception(&self) -> Type;
    fn arithmetic_exception(&self) -> Type;
    fn array_index_out_of_bounds_exception(&self) -> Type;
    fn array_store_exception(&self) -> Type;
    fn class_cast_exception(&self) -> Type;
    fn negative_array_size_exception(&self) -> Type;

    /// Whether arrays may be assigned to variables of class type `class`.
    fn is_array_supertype(&self, class: &ClassType) -> bool {
        match class.name() {
            "java.lang.Object" | "java.lang.Cloneable" | "java.io.Serializable" => true,
            _ => false,
        }
    }

    fn is_subtype(&self, sub: &Type, sup: &Type) -> bool {
        if sub == sup {
            return true;
        }
        match (sub, sup) {
            (Type::Null, sup) => sup.is_reference(),
            (Type::Class(sub), Type::Class(sup)) => {
                is_subclass(sub, sup) || (sub.is_interface() && sup.name() == "java.lang.Object")
            }
            (Type::Array(_), Type::Class(sup)) => self.is_array_supertype(sup),
            (Type::Array(sub), Type::Array(sup)) => {
                sub.is_reference() && sup.is_reference() && self.is_subtype(sub, sup)
            }
            _ => false,
        }
    }

    /// Assignment conversion without a constant: identity, primitive widening or reference
    /// widening.
    fn is_implicit_cast_valid(&self, from: &Type, to: &Type) -> bool {
        match (from.primitive(), to.primitive()) {
            (Some(from), Some(to)) => from == to || is_widening(from, to),
            (None, None) => self.is_subtype(from, to),
            _ => false,
        }
    }

    /// Explicit cast conversion.
    fn is_cast_valid(&self, from: &Type, to: &Type) -> bool {
        match (from, to) {
            (Type::Primitive(from), Type::Primitive(to)) => {
                (from.is_numeric() && to.is_numeric()) || from == to
            }
            (Type::Null, to) => to.is_reference(),
            (Type::Class(from), Type::Class(to)) => {
                if from.is_interface() || to.is_interface() {
                    if !from.is_interface() && from.flags().is_final() {
                        return is_subclass(from, to);
                    }
                    if !to.is_interface() && to.flags().is_final() {
                        return is_subclass(to, from);
                    }
                    true
                } else {
                    is_subclass(from, to) || is_subclass(to, from)
                }
            }
            (Type::Class(from), Type::Array(_)) => self.is_array_supertype(from),
            (Type::Array(_), Type::Class(to)) => self.is_array_supertype(to),
            (Type::Array(from), Type::Array(to)) => match (from.primitive(), to.primitive()) {
                (Some(from), Some(to)) => from == to,
                (None, None) => self.is_cast_valid(from, to),
                _ => false,
            },
            _ => false,
        }
    }

    /// Whether a constant `value` fits into `to` (assignment narrowing of `int` constants).
    fn numeric_conversion_valid(&self, to: &Type, value: &Constant) -> bool {
        let value = match value {
            Constant::Int(_) | Constant::Char(_) => match value.as_int() {
                Some(value) => value,
                None => return false,
            },
            _ => return false,
        };
        let (min, max) = match to.primitive() {
            Some(PrimitiveKind::Byte) => (i8::MIN as i64, i8::MAX as i64),
            Some(PrimitiveKind::Short) => (i16::MIN as i64, i16::MAX as i64),
            Some(PrimitiveKind::Char) => (0, u16::MAX as i64),
            Some(PrimitiveKind::Int) => (i32::MIN as i64, i32::MAX as i64),
            _ => return false,
        };
        min <= value && value <= max
    }

    /// Unary numeric promotion.
    fn unary_promotion(&self, type_: &Type) -> Option<Type> {
        use PrimitiveKind::*;
        match type_.primitive()? {
            Byte | Short | Char | Int => Some(Type::int()),
            Long => Some(Type::long()),
            Float => Some(Type::float()),
            Double => Some(Type::double()),
            Boolean | Void => None,
        }
    }

    /// Binary numeric promotion.
    fn binary_promotion(&self, left: &Type, right: &Type) -> Option<Type> {
        use PrimitiveKind::*;
        let left = self.unary_promotion(left)?.primitive()?;
        let right = self.unary_promotion(right)?.primitive()?;
        let result = if left == Double || right == Double {
            Type::double()
        } else if left == Float || right == Float {
            Type::float()
        } else if left == Long || right == Long {
            Type::long()
        } else {
            Type::int()
        };
        Some(result)
    }

    /// The most specific type both `left` and `right` can be converted to, used for the
    /// type of conditional expressions.
    fn least_common_ancestor(&self, left: &Type, right: &Type) -> Option<Type> {
        if left == right {
            return Some(left.clone());
        }
        if left.is_numeric() && right.is_numeric() {
            if self.is_implicit_cast_valid(left, right) {
                return Some(right.clone());
            }
            if self.is_implicit_cast_valid(right, left) {
                return Some(left.clone());
            }
            let byte_or_short = |t: &Type| {
                t.primitive() == Some(PrimitiveKind::Byte)
                    || t.primitive() == Some(PrimitiveKind::Short)
            };
            if (left.primitive() == Some(PrimitiveKind::Char) && byte_or_short(right))
                || (right.primitive() == Some(PrimitiveKind::Char) && byte_or_short(left))
            {
                return Some(Type::int());
            }
            return None;
        }
        if left.is_primitive() || right.is_primitive() {
            return None;
        }

        match (left, right) {
            (Type::Array(left_base), Type::Array(right_base)) => {
                if left_base.is_primitive() || right_base.is_primitive() {
                    return Some(self.object());
                }
                let base = self.least_common_ancestor(left_base, right_base)?;
                Some(Type::array_of(base))
            }
            (Type::Array(_), _) | (_, Type::Array(_)) => {
                if left.is_null() {
                    Some(right.clone())
                } else if right.is_null() {
                    Some(left.clone())
                } else if self.is_subtype(left, right) {
                    Some(right.clone())
                } else if self.is_subtype(right, left) {
                    Some(left.clone())
                } else {
                    Some(self.object())
                }
            }
            (Type::Null, other) | (other, Type::Null) if other.is_reference() => {
                Some(other.clone())
            }
            (Type::Class(left_class), Type::Class(right_class)) => {
                if left_class.is_interface() || right_class.is_interface() {
                    if self.is_subtype(left, right) {
                        return Some(right.clone());
                    }
                    if self.is_subtype(right, left) {
                        return Some(left.clone());
                    }
                    return Some(self.object());
                }
                if self.is_subtype(left, right) {
                    return Some(right.clone());
                }
                if self.is_subtype(right, left) {
                    return Some(left.clone());
                }
                let mut ancestor = left_class.superclass();
                while let Some(class) = ancestor {
                    if is_subclass(right_class, class) {
                        return Some(Type::class(class));
                    }
                    ancestor = class.superclass();
                }
                Some(self.object())
            }
            _ => None,
        }
    }

    fn is_throwable(&self, type_: &Type) -> bool {
        self.is_subtype(type_, &self.throwable())
    }

    /// Unchecked exceptions need not be declared or caught.
    fn is_unchecked_exception(&self, type_: &Type) -> bool {
        self.is_subtype(type_, &self.runtime_exception()) || self.is_subtype(type_, &self.error())
    }

    fn unchecked_exceptions(&self) -> Vec<Type> {
        vec![self.runtime_exception(), self.error()]
    }

    /// Whether a value of `type_` can be the operand of string concatenation.
    fn can_coerce_to_string(&self, type_: &Type) -> bool {
        !type_.is_void()
    }
}

fn is_widening(from: PrimitiveKind, to: PrimitiveKind) -> bool {
    use PrimitiveKind::*;
    match from {
        Byte => [Short, Int, Long, Float, Double].contains(&to),
        Short | Char => [Int, Long, Float, Double].contains(&to),
        Int => [Long, Float, Double].contains(&to),
        Long => [Float, Double].contains(&to),
        Float => to == Double,
        Boolean | Double | Void => false,
    }
}

/// Whether `sub` is `sup` or inherits from it (through superclasses or interfaces).
fn is_subclass(sub: &ClassType, sup: &ClassType) -> bool {
    sub == sup || sub.supertypes().any(|supertype| is_subclass(supertype, sup))
}

/// Well-known classes looked up once per compilation session.
struct CoreClasses {
    object: Type,
    string: Type,
    class: Type,
    throwable: Type,
    error: Type,
    runtime_exception: Type,
    null_pointer_exception: Type,
    arithmetic_exception: Type,
    array_index_out_of_bounds_exception: Type,
    array_store_exception: Type,
    class_cast_exception: Type,
    negative_array_size_exception: Type,
}

/// The Java 1.4 type system over classes provided by a `Resolver`.
pub struct StandardTypeSystem {
    core: CoreClasses,
}

impl StandardTypeSystem {
    /// Loads the well-known classes from `resolver`.
    pub fn new(resolver: &dyn Resolver) -> Result<StandardTypeSystem, InternalCompilerError> {
        let load = |name: &str| match resolver.find_class(name) {
            Lookup::Found(class) => Ok(Type::Class(class)),
            _ => Err(InternalCompilerError::Other(format!(
                "core class `{}` is not available",
                name
            ))),
        };

        Ok(StandardTypeSystem {
            core: CoreClasses {
                object: load("java.lang.Object")?,
                string: load("java.lang.String")?,
                class: load("java.lang.Class")?,
                throwable: load("java.lang.Throwable")?,
                error: load("java.lang.Error")?,
                runtime_exception: load("java.lang.RuntimeException")?,
                null_pointer_exception: load("java.lang.NullPointerException")?,
                arithmetic_exception: load("java.lang.ArithmeticException")?,
                array_index_out_of_bounds_exception: load(
                    "java.lang.ArrayIndexOutOfBoundsException",
                )?,
                array_store_exception: load("java.lang.ArrayStoreException")?,
                class_cast_exception: load("java.lang.ClassCastException")?,
                negative_array_size_exception: load("java.lang.NegativeArraySizeException")?,
            },
        })
    }
}

impl TypeSystem for StandardTypeSystem {
    fn object(&self) -> Type {
        self.core.object.clone()
    }

    fn string(&self) -> Type {
        self.core.string.clone()
    }

    fn class_type(&self) -> Type {
        self.core.class.clone()
    }

    fn throwable(&self) -> Type {
        self.core.throwable.clone()
    }

    fn error(&self) -> Type {
        self.core.error.clone()
    }

    fn runtime_exception(&self) -> Type {
        self.core.runtime_exception.clone()
    }

    fn null_pointer_exception(&self) -> Type {
        self.core.null_pointer_exception.clone()
    }

    fn arithmetic_exception(&self) -> Type {
        self.core.arithmetic_exception.clone()
    }

    fn array_index_out_of_bounds_exception(&self) -> Type {
        self.core.array_index_out_of_bounds_exception.clone()
    }

    fn array_store_exception(&self) -> Type {
        self.core.array_store_exception.clone()
    }

    fn class_cast_exception(&self) -> Type {
        self.core.class_cast_exception.clone()
    }

    fn negative_array_size_exception(&self) -> Type {
        self.core.negative_array_size_exception.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ClassTable;

    fn type_system() -> (ClassTable, StandardTypeSystem) {
        let table = ClassTable::with_core_classes();
        let types = StandardTypeSystem::new(&table).unwrap();
        (table, types)
    }

    fn class(table: &ClassTable, name: &str) -> Type {
        Type::class(&table.class(name).unwrap())
    }

    #[test]
    fn primitive_widening() {
        let (_, ts) = type_system();
        assert!(ts.is_implicit_cast_valid(&Type::byte(), &Type::int()));
        assert!(ts.is_implicit_cast_valid(&Type::char(), &Type::long()));
        assert!(!ts.is_implicit_cast_valid(&Type::char(), &Type::short()));
        assert!(!ts.is_implicit_cast_valid(&Type::boolean(), &Type::int()));
        assert!(!ts.is_implicit_cast_valid(&Type::int(), &Type::byte()));
    }

    #[test]
    fn constant_narrowing() {
        let (_, ts) = type_system();
        assert!(ts.numeric_conversion_valid(&Type::byte(), &Constant::Int(10)));
        assert!(!ts.numeric_conversion_valid(&Type::byte(), &Constant::Int(200)));
        assert!(ts.numeric_conversion_valid(&Type::char(), &Constant::Int(65)));
        assert!(!ts.numeric_conversion_valid(&Type::char(), &Constant::Int(-1)));
        assert!(!ts.numeric_conversion_valid(&Type::int(), &Constant::Long(1)));
    }

    #[test]
    fn reference_subtyping() {
        let (table, ts) = type_system();
        let object = class(&table, "java.lang.Object");
        let string = class(&table, "java.lang.String");
        let npe = class(&table, "java.lang.NullPointerException");
        let runtime = class(&table, "java.lang.RuntimeException");

        assert!(ts.is_subtype(&string, &object));
        assert!(ts.is_subtype(&npe, &runtime));
        assert!(ts.is_subtype(&Type::Null, &string));
        assert!(ts.is_subtype(&Type::array_of(Type::int()), &object));
        assert!(ts.is_subtype(&Type::array_of(string.clone()), &Type::array_of(object.clone())));
        assert!(!ts.is_subtype(&Type::array_of(Type::int()), &Type::array_of(Type::long())));
        assert!(ts.is_unchecked_exception(&npe));
        assert!(!ts.is_unchecked_exception(&class(&table, "java.io.IOException")));
    }

    #[test]
    fn casts() {
        let (table, ts) = type_system();
        let object = class(&table, "java.lang.Object");
        let string = class(&table, "java.lang.String");
        let exception = class(&table, "java.lang.Exception");

        assert!(ts.is_cast_valid(&object, &string));
        assert!(!ts.is_cast_valid(&string, &exception));
        assert!(ts.is_cast_valid(&Type::double(), &Type::char()));
        assert!(!ts.is_cast_valid(&Type::boolean(), &Type::int()));
        assert!(!ts.is_cast_valid(&Type::int(), &object));
    }

    #[test]
    fn promotions() {
        let (_, ts) = type_system();
        assert_eq!(ts.unary_promotion(&Type::char()), Some(Type::int()));
        assert_eq!(ts.binary_promotion(&Type::int(), &Type::long()), Some(Type::long()));
        assert_eq!(ts.binary_promotion(&Type::float(), &Type::long()), Some(Type::float()));
        assert_eq!(ts.binary_promotion(&Type::boolean(), &Type::int()), None);
    }

    #[test]
    fn least_common_ancestors() {
        let (table, ts) = type_system();
        let object = class(&table, "java.lang.Object");
        let npe = class(&table, "java.lang.NullPointerException");
        let arithmetic = class(&table, "java.lang.ArithmeticException");
        let runtime = class(&table, "java.lang.RuntimeException");

        assert_eq!(ts.least_common_ancestor(&Type::int(), &Type::long()), Some(Type::long()));
        assert_eq!(ts.least_common_ancestor(&Type::char(), &Type::short()), Some(Type::int()));
        assert_eq!(ts.least_common_ancestor(&npe, &arithmetic), Some(runtime));
        assert_eq!(ts.least_common_ancestor(&Type::Null, &npe), Some(npe.clone()));
        assert_eq!(
            ts.least_common_ancestor(&Type::array_of(Type::int()), &npe),
            Some(object)
        );
        assert_eq!(ts.least_common_ancestor(&Type::boolean(), &Type::int()), None);
    }
}
