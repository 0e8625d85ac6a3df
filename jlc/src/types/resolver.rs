//! Name lookup interface used by the analysis passes.

use crate::types::{ClassType, FieldInstance, Flags, MethodInstance, Type, TypeSystem};
use std::fmt::{self, Display, Formatter};
use std::sync::Arc;

/// Answer of a resolver query.
///
/// `Pending` means that the answer is not known yet (e.g. the class is still being loaded by
/// another job). The disambiguator leaves such nodes in the tree and retries them later.
#[derive(Clone, PartialEq, Debug)]
pub enum Lookup<T> {
    Found(T),
    NotFound,
    Pending,
}

impl<T> Lookup<T> {
    pub fn found(self) -> Option<T> {
        match self {
            Lookup::Found(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        match self {
            Lookup::Pending => true,
            _ => false,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Lookup<U> {
        match self {
            Lookup::Found(value) => Lookup::Found(f(value)),
            Lookup::NotFound => Lookup::NotFound,
            Lookup::Pending => Lookup::Pending,
        }
    }

    /// Keeps looking with `f` when nothing was found.
    pub fn or_else(self, f: impl FnOnce() -> Lookup<T>) -> Lookup<T> {
        match self {
            Lookup::NotFound => f(),
            other => other,
        }
    }
}

/// A (possibly nested) Java package.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Package {
    name: String,
}

impl Package {
    pub fn new(name: impl Into<String>) -> Package {
        Package { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn member_name(&self, name: &str) -> String {
        format!("{}.{}", self.name, name)
    }
}

impl Display for Package {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Something that can stand before a dot: a package or a class.
#[derive(Clone, PartialEq, Debug)]
pub enum Qualifier {
    Package(Package),
    Class(Arc<ClassType>),
}

/// Why a method or constructor call could not be resolved.
#[derive(Clone, PartialEq, Debug)]
pub enum OverloadError {
    /// The container has no method with this name at all.
    NoSuchMethod,

    /// Methods with this name exist, but none accepts the argument types.
    NoApplicable(Vec<MethodInstance>),

    /// Several applicable methods, none more specific than the others.
    Ambiguous(Vec<MethodInstance>),

    Pending,
}

/// Symbol-table queries answered on behalf of one compilation unit.
///
/// The import table, class loading and package layout are the implementor's business. Member
/// lookups have default implementations that walk the class hierarchy recorded in `ClassType`.
pub trait Resolver: Send + Sync {
    /// Looks up a class by its fully qualified name.
    fn find_class(&self, qualified_name: &str) -> Lookup<Arc<ClassType>>;

    /// Looks up a type by the simple name visible in the compilation unit (current package,
    /// imports, `java.lang`).
    fn find_type(&self, name: &str) -> Lookup<Type>;

    /// Looks up `package.name`, which is either a subpackage or a class.
    fn find_package_member(&self, package: &Package, name: &str) -> Lookup<Qualifier>;

    fn find_field(&self, container: &Type, name: &str) -> Lookup<FieldInstance> {
        match container {
            Type::Class(class) => match find_field_in_hierarchy(class, name) {
                Some(field) => Lookup::Found(field.clone()),
                None => Lookup::NotFound,
            },
            Type::Array(_) if name == "length" => Lookup::Found(FieldInstance {
                name: "length".to_string(),
                container: container.to_string(),
                type_: Type::int(),
                flags: Flags::PUBLIC | Flags::FINAL,
                constant: None,
            }),
            _ => Lookup::NotFound,
        }
    }

    fn find_member_class(&self, container: &ClassType, name: &str) -> Lookup<Arc<ClassType>> {
        if container.has_member_class(name) {
            return self.find_class(&container.member_class_name(name));
        }
        for supertype in container.supertypes() {
            if let Lookup::Found(class) = self.find_member_class(supertype, name) {
                return Lookup::Found(class);
            }
        }
        Lookup::NotFound
    }

    fn find_method(
        &self,
        container: &Type,
        name: &str,
        arguments: &[Type],
        types: &dyn TypeSystem,
    ) -> Result<MethodInstance, OverloadError> {
        let class = match container {
            Type::Class(class) => Arc::clone(class),
            Type::Array(_) => match types.object().as_class() {
                Some(object) => Arc::clone(object),
                None => return Err(OverloadError::NoSuchMethod),
            },
            _ => return Err(OverloadError::NoSuchMethod),
        };

        let mut candidates = Vec::new();
        collect_methods(&class, name, &mut candidates);
        if candidates.is_empty() && class.is_interface() {
            // Interfaces implicitly declare the public methods of `Object`.
            if let Some(object) = types.object().as_class() {
                collect_methods(object, name, &mut candidates);
            }
        }
        select_most_specific(candidates, arguments, types)
    }

    fn find_constructor(
        &self,
        class: &ClassType,
        arguments: &[Type],
        types: &dyn TypeSystem,
    ) -> Result<MethodInstance, OverloadError> {
        if class.constructors().is_empty() {
            // Default constructor.
            let default = MethodInstance {
                name: class.short_name().to_string(),
                container: class.name().to_string(),
                formals: Vec::new(),
                return_type: None,
                throws: Vec::new(),
                flags: Flags::PUBLIC,
            };
            return if arguments.is_empty() {
                Ok(default)
            } else {
                Err(OverloadError::NoApplicable(vec![default]))
            };
        }
        select_most_specific(class.constructors().to_vec(), arguments, types)
    }
}

fn find_field_in_hierarchy<'a>(class: &'a ClassType, name: &str) -> Option<&'a FieldInstance> {
    class.field(name).or_else(|| {
        class
            .supertypes()
            .find_map(|supertype| find_field_in_hierarchy(supertype, name))
    })
}

/// Collects methods named `name` from `class` and its supertypes, skipping overridden ones.
fn collect_methods(class: &ClassType, name: &str, methods: &mut Vec<MethodInstance>) {
    for method in class.methods().iter().filter(|method| method.name == name) {
        if !methods.iter().any(|seen| seen.formals == method.formals) {
            methods.push(method.clone());
        }
    }
    for supertype in class.supertypes() {
        collect_methods(supertype, name, methods);
    }
}

fn select_most_specific(
    candidates: Vec<MethodInstance>,
    arguments: &[Type],
    types: &dyn TypeSystem,
) -> Result<MethodInstance, OverloadError> {
    if candidates.is_empty() {
        return Err(OverloadError::NoSuchMethod);
    }

    let applicable: Vec<_> = candidates
        .iter()
        .filter(|method| accepts(types, &method.formals, arguments))
        .cloned()
        .collect();
    if applicable.is_empty() {
        return Err(OverloadError::NoApplicable(candidates));
    }

    let maximal: Vec<_> = applicable
        .iter()
        .filter(|method| {
            applicable
                .iter()
                .all(|other| accepts(types, &other.formals, &method.formals))
        })
        .cloned()
        .collect();

    match maximal.into_iter().next() {
        Some(method) => Ok(method),
        None => Err(OverloadError::Ambiguous(applicable)),
    }
}

fn accepts(types: &dyn TypeSystem, formals: &[Type], arguments: &[Type]) -> bool {
    formals.len() == arguments.len()
        && arguments
            .iter()
            .zip(formals)
            .all(|(argument, formal)| types.is_implicit_cast_valid(argument, formal))
}
