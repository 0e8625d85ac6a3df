//! In-memory resolver over a fixed set of classes.

use crate::types::{ClassType, Flags, Lookup, Package, Qualifier, Resolver, Type};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::trace;

/// A resolver backed by a map of fully qualified class names, with the import table of a
/// single compilation unit.
///
/// Classes can be marked as "pending" for a number of lookups, which simulates classes that
/// are still being loaded when the disambiguator first asks for them.
pub struct ClassTable {
    classes: HashMap<String, Arc<ClassType>>,
    packages: HashSet<String>,
    current_package: Option<String>,
    single_imports: Vec<String>,
    on_demand_imports: Vec<String>,
    pending: HashMap<String, AtomicUsize>,
}

impl ClassTable {
    /// An empty table that only imports `java.lang`.
    pub fn new() -> ClassTable {
        ClassTable {
            classes: HashMap::new(),
            packages: HashSet::new(),
            current_package: None,
            single_imports: Vec::new(),
            on_demand_imports: vec!["java.lang".to_string()],
            pending: HashMap::new(),
        }
    }

    /// A table populated with the parts of `java.lang` and `java.io` that the analysis
    /// passes rely on.
    pub fn with_core_classes() -> ClassTable {
        let mut table = ClassTable::new();
        let public = Flags::PUBLIC;

        let object = ClassType::builder("java.lang.Object")
            .flags(public)
            .constructor(vec![], vec![], public)
            .method("hashCode", vec![], Type::int(), vec![], public)
            .build();
        let object_type = Type::class(&object);
        table.add_class(&object);

        let string = ClassType::builder("java.lang.String")
            .flags(public | Flags::FINAL)
            .superclass(&object)
            .constructor(vec![], vec![], public)
            .method("length", vec![], Type::int(), vec![], public)
            .method("charAt", vec![Type::int()], Type::char(), vec![], public)
            .method("equals", vec![object_type], Type::boolean(), vec![], public)
            .build();
        let string_type = Type::class(&string);
        table.add_class(&string);

        for interface in &["java.lang.Cloneable", "java.io.Serializable", "java.lang.Runnable"] {
            let mut builder = ClassType::builder(*interface).flags(public | Flags::INTERFACE);
            if *interface == "java.lang.Runnable" {
                builder = builder.method(
                    "run",
                    vec![],
                    Type::void(),
                    vec![],
                    public | Flags::ABSTRACT,
                );
            }
            table.add_class(&builder.build());
        }

        table.add_class(
            &ClassType::builder("java.lang.Class")
                .flags(public | Flags::FINAL)
                .superclass(&object)
                .method("getName", vec![], string_type.clone(), vec![], public)
                .build(),
        );

        let throwable = table.add_exception("java.lang.Throwable", &object, &string_type);
        let exception = table.add_exception("java.lang.Exception", &throwable, &string_type);
        let error = table.add_exception("java.lang.Error", &throwable, &string_type);
        let runtime = table.add_exception("java.lang.RuntimeException", &exception, &string_type);
        for name in &[
            "java.lang.ArithmeticException",
            "java.lang.NullPointerException",
            "java.lang.ArrayStoreException",
            "java.lang.ClassCastException",
            "java.lang.NegativeArraySizeException",
            "java.lang.IllegalArgumentException",
            "java.lang.IllegalStateException",
        ] {
            table.add_exception(name, &runtime, &string_type);
        }
        let index = table.add_exception(
            "java.lang.IndexOutOfBoundsException",
            &runtime,
            &string_type,
        );
        table.add_exception(
            "java.lang.ArrayIndexOutOfBoundsException",
            &index,
            &string_type,
        );
        table.add_exception("java.lang.InterruptedException", &exception, &string_type);
        table.add_exception("java.lang.CloneNotSupportedException", &exception, &string_type);
        table.add_exception("java.lang.OutOfMemoryError", &error, &string_type);
        table.add_exception("java.lang.StackOverflowError", &error, &string_type);
        let io = table.add_exception("java.io.IOException", &exception, &string_type);
        table.add_exception("java.io.FileNotFoundException", &io, &string_type);

        table
    }

    fn add_exception(
        &mut self,
        name: &str,
        superclass: &Arc<ClassType>,
        string_type: &Type,
    ) -> Arc<ClassType> {
        let class = ClassType::builder(name)
            .flags(Flags::PUBLIC)
            .superclass(superclass)
            .constructor(vec![], vec![], Flags::PUBLIC)
            .constructor(vec![string_type.clone()], vec![], Flags::PUBLIC)
            .method("getMessage", vec![], string_type.clone(), vec![], Flags::PUBLIC)
            .build();
        self.add_class(&class);
        class
    }

    /// Registers a class (replacing any class with the same name) and its package.
    pub fn add_class(&mut self, class: &Arc<ClassType>) {
        if class.outer().is_none() {
            if let Some(package) = class.package() {
                let mut prefix = String::new();
                for component in package.split('.') {
                    if !prefix.is_empty() {
                        prefix.push('.');
                    }
                    prefix.push_str(component);
                    self.packages.insert(prefix.clone());
                }
            }
        }
        self.classes
            .insert(class.name().to_string(), Arc::clone(class));
    }

    pub fn class(&self, qualified_name: &str) -> Option<Arc<ClassType>> {
        self.classes.get(qualified_name).cloned()
    }

    pub fn set_package(&mut self, package: impl Into<String>) {
        self.current_package = Some(package.into());
    }

    /// `import a.b.C;`
    pub fn import_class(&mut self, qualified_name: impl Into<String>) {
        self.single_imports.push(qualified_name.into());
    }

    /// `import a.b.*;`
    pub fn import_package(&mut self, package: impl Into<String>) {
        self.on_demand_imports.push(package.into());
    }

    /// Makes the next `lookups` lookups of `qualified_name` answer `Pending`.
    pub fn mark_pending(&mut self, qualified_name: impl Into<String>, lookups: usize) {
        self.pending
            .insert(qualified_name.into(), AtomicUsize::new(lookups));
    }

    fn is_pending(&self, qualified_name: &str) -> bool {
        let counter = match self.pending.get(qualified_name) {
            Some(counter) => counter,
            None => return false,
        };
        let consumed = counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if consumed {
            trace!("class `{}` is still pending", qualified_name);
        }
        consumed
    }

    fn candidate_names(&self, name: &str) -> Vec<String> {
        let mut candidates = Vec::new();
        for import in &self.single_imports {
            if import.rsplit('.').next() == Some(name) {
                candidates.push(import.clone());
            }
        }
        match self.current_package {
            Some(ref package) => candidates.push(format!("{}.{}", package, name)),
            None => candidates.push(name.to_string()),
        }
        for package in &self.on_demand_imports {
            candidates.push(format!("{}.{}", package, name));
        }
        candidates
    }
}

impl Default for ClassTable {
    fn default() -> ClassTable {
        ClassTable::new()
    }
}

impl Resolver for ClassTable {
    fn find_class(&self, qualified_name: &str) -> Lookup<Arc<ClassType>> {
        if self.is_pending(qualified_name) {
            return Lookup::Pending;
        }
        match self.class(qualified_name) {
            Some(class) => Lookup::Found(class),
            None => Lookup::NotFound,
        }
    }

    fn find_type(&self, name: &str) -> Lookup<Type> {
        if name.contains('.') {
            return self.find_class(name).map(Type::Class);
        }
        for candidate in self.candidate_names(name) {
            match self.find_class(&candidate) {
                Lookup::NotFound => continue,
                found => return found.map(Type::Class),
            }
        }
        Lookup::NotFound
    }

    fn find_package_member(&self, package: &Package, name: &str) -> Lookup<Qualifier> {
        let qualified_name = package.member_name(name);
        self.find_class(&qualified_name)
            .map(Qualifier::Class)
            .or_else(|| {
                if self.packages.contains(&qualified_name) {
                    Lookup::Found(Qualifier::Package(Package::new(qualified_name)))
                } else {
                    Lookup::NotFound
                }
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::StandardTypeSystem;

    #[test]
    fn resolves_java_lang_by_simple_name() {
        let table = ClassTable::with_core_classes();
        let string = table.find_type("String").found().unwrap();
        assert!(string.is_string());
        assert_eq!(table.find_type("IOException"), Lookup::NotFound);
    }

    #[test]
    fn imports_make_classes_visible() {
        let mut table = ClassTable::with_core_classes();
        table.import_class("java.io.IOException");
        assert!(table
            .find_type("IOException")
            .found()
            .unwrap()
            .is_class_named("java.io.IOException"));

        table.import_package("java.io");
        assert!(table.find_type("FileNotFoundException").found().is_some());
    }

    #[test]
    fn package_members() {
        let table = ClassTable::with_core_classes();
        let java = Package::new("java");
        assert_eq!(
            table.find_package_member(&java, "io"),
            Lookup::Found(Qualifier::Package(Package::new("java.io")))
        );
        let io = Package::new("java.io");
        match table.find_package_member(&io, "IOException") {
            Lookup::Found(Qualifier::Class(class)) => assert_eq!(class.name(), "java.io.IOException"),
            other => panic!("unexpected lookup result: {:?}", other),
        }
        assert_eq!(table.find_package_member(&io, "nothing"), Lookup::NotFound);
    }

    #[test]
    fn pending_classes_resolve_later() {
        let mut table = ClassTable::with_core_classes();
        table.add_class(&ClassType::builder("p.Late").build());
        table.set_package("p");
        table.mark_pending("p.Late", 2);

        assert!(table.find_type("Late").is_pending());
        assert!(table.find_type("Late").is_pending());
        assert!(table.find_type("Late").found().is_some());
    }

    #[test]
    fn default_member_lookups_walk_the_hierarchy() {
        let table = ClassTable::with_core_classes();
        let npe = Type::Class(table.class("java.lang.NullPointerException").unwrap());
        let types = StandardTypeSystem::new(&table).unwrap();
        let method = table.find_method(&npe, "getMessage", &[], &types).unwrap();
        assert_eq!(method.container, "java.lang.NullPointerException");
        let length = table
            .find_field(&Type::array_of(Type::int()), "length")
            .found()
            .unwrap();
        assert_eq!(length.type_, Type::int());
    }
}
