//! Class types and the member symbols attached to them.

use crate::types::Type;
use std::fmt::{self, Debug, Formatter};
use std::hash::{Hash, Hasher};
use std::ops::BitOr;
use std::sync::Arc;

/// Declaration modifiers.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct Flags(u16);

impl Flags {
    pub const NONE: Flags = Flags(0);
    pub const PUBLIC: Flags = Flags(1);
    pub const PRIVATE: Flags = Flags(1 << 1);
    pub const PROTECTED: Flags = Flags(1 << 2);
    pub const STATIC: Flags = Flags(1 << 3);
    pub const FINAL: Flags = Flags(1 << 4);
    pub const ABSTRACT: Flags = Flags(1 << 5);
    pub const INTERFACE: Flags = Flags(1 << 6);

    const NAMES: [(Flags, &'static str); 7] = [
        (Flags::PUBLIC, "public"),
        (Flags::PRIVATE, "private"),
        (Flags::PROTECTED, "protected"),
        (Flags::STATIC, "static"),
        (Flags::FINAL, "final"),
        (Flags::ABSTRACT, "abstract"),
        (Flags::INTERFACE, "interface"),
    ];

    pub fn contains(self, other: Flags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_static(self) -> bool {
        self.contains(Flags::STATIC)
    }

    pub fn is_final(self) -> bool {
        self.contains(Flags::FINAL)
    }

    pub fn is_abstract(self) -> bool {
        self.contains(Flags::ABSTRACT)
    }

    pub fn is_interface(self) -> bool {
        self.contains(Flags::INTERFACE)
    }
}

impl BitOr for Flags {
    type Output = Flags;

    fn bitor(self, rhs: Flags) -> Flags {
        Flags(self.0 | rhs.0)
    }
}

impl Debug for Flags {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let names: Vec<_> = Flags::NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        write!(f, "[{}]", names.join(" "))
    }
}

/// Compile-time value of a constant expression.
#[derive(Clone, PartialEq, Debug)]
pub enum Constant {
    Boolean(bool),
    Char(char),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
}

impl Constant {
    /// The type of a literal holding this value.
    pub fn literal_type(&self) -> Option<Type> {
        let type_ = match self {
            Constant::Boolean(_) => Type::boolean(),
            Constant::Char(_) => Type::char(),
            Constant::Int(_) => Type::int(),
            Constant::Long(_) => Type::long(),
            Constant::Float(_) => Type::float(),
            Constant::Double(_) => Type::double(),
            Constant::String(_) => return None,
        };
        Some(type_)
    }

    /// Integral value of `int`-like constants (`char` included).
    pub fn as_int(&self) -> Option<i64> {
        match self {
            Constant::Char(c) => Some(*c as i64),
            Constant::Int(i) => Some(*i as i64),
            Constant::Long(l) => Some(*l),
            _ => None,
        }
    }
}

/// A field known to the type system.
#[derive(Clone, PartialEq, Debug)]
pub struct FieldInstance {
    pub name: String,

    /// Fully qualified name of the declaring class.
    pub container: String,
    pub type_: Type,
    pub flags: Flags,

    /// Value of a `static final` field initialized with a constant expression.
    pub constant: Option<Constant>,
}

/// A method or a constructor known to the type system.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct MethodInstance {
    pub name: String,
    pub container: String,
    pub formals: Vec<Type>,

    /// `None` for constructors.
    pub return_type: Option<Type>,
    pub throws: Vec<Type>,
    pub flags: Flags,
}

impl MethodInstance {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }

    /// Human-readable signature, e.g. `append(java.lang.String, int)`.
    pub fn signature(&self) -> String {
        let formals: Vec<_> = self.formals.iter().map(ToString::to_string).collect();
        format!("{}({})", self.name, formals.join(", "))
    }
}

/// Identity of a local variable within a compilation unit.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub struct LocalId(pub u32);

/// A local variable or formal parameter.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct LocalInstance {
    pub id: LocalId,
    pub name: String,
    pub type_: Type,
    pub flags: Flags,
}

/// A class or interface type.
///
/// Class types are identified by their fully qualified name. Member classes use `.` as the
/// separator as well and record the name of their outer class.
pub struct ClassType {
    name: String,
    flags: Flags,
    superclass: Option<Arc<ClassType>>,
    interfaces: Vec<Arc<ClassType>>,
    outer: Option<String>,
    fields: Vec<FieldInstance>,
    methods: Vec<MethodInstance>,
    constructors: Vec<MethodInstance>,
    member_classes: Vec<String>,
}

impl ClassType {
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder {
            class: ClassType {
                name: name.into(),
                flags: Flags::NONE,
                superclass: None,
                interfaces: Vec::new(),
                outer: None,
                fields: Vec::new(),
                methods: Vec::new(),
                constructors: Vec::new(),
                member_classes: Vec::new(),
            },
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn short_name(&self) -> &str {
        match self.name.rfind('.') {
            Some(index) => &self.name[index + 1..],
            None => &self.name,
        }
    }

    /// Package of a top-level class. Member classes report the package of their outer class.
    pub fn package(&self) -> Option<&str> {
        let top_level = match self.outer {
            Some(ref outer) => outer.as_str(),
            None => self.name.as_str(),
        };
        top_level.rfind('.').map(|index| &top_level[..index])
    }

    pub fn flags(&self) -> Flags {
        self.flags
    }

    pub fn is_interface(&self) -> bool {
        self.flags.is_interface()
    }

    pub fn superclass(&self) -> Option<&Arc<ClassType>> {
        self.superclass.as_ref()
    }

    pub fn interfaces(&self) -> &[Arc<ClassType>] {
        &self.interfaces
    }

    /// Direct supertypes: the superclass first, then interfaces in declaration order.
    pub fn supertypes(&self) -> impl Iterator<Item = &Arc<ClassType>> {
        self.superclass.iter().chain(self.interfaces.iter())
    }

    pub fn outer(&self) -> Option<&str> {
        self.outer.as_deref()
    }

    pub fn fields(&self) -> &[FieldInstance] {
        &self.fields
    }

    pub fn field(&self, name: &str) -> Option<&FieldInstance> {
        self.fields.iter().find(|field| field.name == name)
    }

    pub fn methods(&self) -> &[MethodInstance] {
        &self.methods
    }

    pub fn constructors(&self) -> &[MethodInstance] {
        &self.constructors
    }

    pub fn member_classes(&self) -> &[String] {
        &self.member_classes
    }

    pub fn has_member_class(&self, name: &str) -> bool {
        self.member_classes.iter().any(|member| member == name)
    }

    /// Fully qualified name of a member class.
    pub fn member_class_name(&self, name: &str) -> String {
        format!("{}.{}", self.name, name)
    }
}

impl PartialEq for ClassType {
    fn eq(&self, other: &ClassType) -> bool {
        self.name == other.name
    }
}

impl Eq for ClassType {}

impl Hash for ClassType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state)
    }
}

impl Debug for ClassType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "ClassType({})", self.name)
    }
}

/// Incrementally describes a class type.
pub struct ClassBuilder {
    class: ClassType,
}

impl ClassBuilder {
    pub fn flags(mut self, flags: Flags) -> ClassBuilder {
        self.class.flags = flags;
        self
    }

    pub fn superclass(mut self, superclass: &Arc<ClassType>) -> ClassBuilder {
        self.class.superclass = Some(Arc::clone(superclass));
        self
    }

    pub fn interface(mut self, interface: &Arc<ClassType>) -> ClassBuilder {
        self.class.interfaces.push(Arc::clone(interface));
        self
    }

    pub fn outer(mut self, outer: impl Into<String>) -> ClassBuilder {
        self.class.outer = Some(outer.into());
        self
    }

    pub fn field(self, name: &str, type_: Type, flags: Flags) -> ClassBuilder {
        self.field_with_constant(name, type_, flags, None)
    }

    pub fn constant(self, name: &str, type_: Type, value: Constant) -> ClassBuilder {
        let flags = Flags::PUBLIC | Flags::STATIC | Flags::FINAL;
        self.field_with_constant(name, type_, flags, Some(value))
    }

    fn field_with_constant(
        mut self,
        name: &str,
        type_: Type,
        flags: Flags,
        constant: Option<Constant>,
    ) -> ClassBuilder {
        let container = self.class.name.clone();
        self.class.fields.push(FieldInstance {
            name: name.to_string(),
            container,
            type_,
            flags,
            constant,
        });
        self
    }

    pub fn method(
        mut self,
        name: &str,
        formals: Vec<Type>,
        return_type: Type,
        throws: Vec<Type>,
        flags: Flags,
    ) -> ClassBuilder {
        let container = self.class.name.clone();
        self.class.methods.push(MethodInstance {
            name: name.to_string(),
            container,
            formals,
            return_type: Some(return_type),
            throws,
            flags,
        });
        self
    }

    pub fn constructor(mut self, formals: Vec<Type>, throws: Vec<Type>, flags: Flags) -> ClassBuilder {
        let container = self.class.name.clone();
        let name = self.class.short_name().to_string();
        self.class.constructors.push(MethodInstance {
            name,
            container,
            formals,
            return_type: None,
            throws,
            flags,
        });
        self
    }

    pub fn member_class(mut self, name: &str) -> ClassBuilder {
        self.class.member_classes.push(name.to_string());
        self
    }

    pub fn build(self) -> Arc<ClassType> {
        Arc::new(self.class)
    }
}
