//! Resolution of ambiguous names, and binding of declarations to their symbols.
//!
//! Names are resolved leaves first: by the time `a.b.c` is looked at, `a.b` has already been
//! turned into a local, a field, a type or a package, which decides how `c` is looked up.
//!
//! A resolver may not know the answer yet. Such names stay ambiguous and the pass reports
//! them as pending, so that the pipeline can run another round later.

use crate::ast::{
    build, AmbiguityRole, Ambiguous, ClassDecl, FieldDecl, Formal, LocalDecl, MethodDecl, Node,
    NodeKind, SpecialKind,
};
use crate::errors::{self, Abort, CompilationError, Diagnostics, InternalCompilerError};
use crate::passes::{declared_package, denoted_type, Env};
use crate::scope::{CodeInfo, Context};
use crate::source::Position;
use crate::types::{
    ClassType, FieldInstance, Flags, LocalId, LocalInstance, Lookup, MethodInstance, Package,
    PrimitiveKind, Qualifier, Type,
};
use crate::visit::{visit, visit_children, RuleTable, Visitor};
use std::cell::RefCell;
use std::collections::HashSet;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace};

const PASS: &str = "disambiguation";

/// Replaces the default disambiguation of one node kind.
///
/// Receives the original node and its form with disambiguated children.
pub type DisambiguationRule = fn(&mut Disambiguator, &Node, Node) -> Result<Node, Abort>;

/// State shared by all copies of one disambiguator.
#[derive(Default)]
struct Progress {
    /// Ids of the ambiguous nodes the current round left in the tree.
    pending: HashSet<usize>,
    next_local: u32,
    reported_duplicates: HashSet<LocalId>,
    final_round: bool,
}

#[derive(Clone)]
pub struct Disambiguator {
    env: Env,
    context: Context,
    diagnostics: Diagnostics,
    rules: Rc<RuleTable<DisambiguationRule>>,
    progress: Rc<RefCell<Progress>>,
}

impl Disambiguator {
    pub fn new(env: Env, diagnostics: Diagnostics) -> Disambiguator {
        Disambiguator {
            env,
            context: Context::new(),
            diagnostics,
            rules: Rc::new(RuleTable::new()),
            progress: Rc::new(RefCell::new(Progress::default())),
        }
    }

    pub fn with_rules(self, rules: RuleTable<DisambiguationRule>) -> Disambiguator {
        Disambiguator {
            rules: Rc::new(rules),
            ..self
        }
    }

    /// In the final round, names that are still pending are reported as unresolved.
    pub fn set_final_round(&mut self, final_round: bool) {
        self.progress.borrow_mut().final_round = final_round;
    }

    /// Runs one round over the tree rooted at `root`.
    pub fn run(&mut self, root: &Node) -> Result<Node, Abort> {
        self.progress.borrow_mut().pending.clear();
        let result = visit(root, self)?;
        debug!("disambiguation round left {} pending nodes", self.pending());
        Ok(result)
    }

    /// Number of nodes the last round could not resolve yet.
    pub fn pending(&self) -> usize {
        self.progress.borrow().pending.len()
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Default handling of a node whose children are already disambiguated.
    pub fn disambiguate_node(&mut self, node: Node) -> Result<Node, Abort> {
        if let NodeKind::Ambiguous(ambiguous) = node.kind() {
            let ambiguous = ambiguous.clone();
            return self.disambiguate(node, ambiguous);
        }

        match node.kind() {
            NodeKind::ArrayTypeNode(array) => match array.base.kind() {
                NodeKind::CanonicalType(base) => Ok(build::canonical(
                    node.position(),
                    Type::array_of(base.type_.clone()),
                )),
                NodeKind::Error(_) => Ok(build::error(node.position())),
                _ => Ok(node),
            },
            NodeKind::LocalDecl(decl) if decl.local.is_none() => {
                match denoted_type(&decl.type_node) {
                    Some(type_) => {
                        let local = self.fresh_local(&decl.name, type_.clone(), decl.flags);
                        Ok(node.with_kind(NodeKind::LocalDecl(LocalDecl {
                            local: Some(local),
                            ..decl.clone()
                        })))
                    }
                    None => Ok(node),
                }
            }
            NodeKind::Formal(formal) if formal.local.is_none() => {
                match denoted_type(&formal.type_node) {
                    Some(type_) => {
                        let local = self.fresh_local(&formal.name, type_.clone(), formal.flags);
                        Ok(node.with_kind(NodeKind::Formal(Formal {
                            local: Some(local),
                            ..formal.clone()
                        })))
                    }
                    None => Ok(node),
                }
            }
            NodeKind::FieldDecl(decl) if decl.field.is_none() => {
                match self.bind_field(decl) {
                    Some(field) => Ok(node.with_kind(NodeKind::FieldDecl(FieldDecl {
                        field: Some(field),
                        ..decl.clone()
                    }))),
                    None => Ok(node),
                }
            }
            NodeKind::MethodDecl(decl) if decl.method.is_none() => {
                match self.bind_method(decl) {
                    Some(method) => Ok(node.with_kind(NodeKind::MethodDecl(MethodDecl {
                        method: Some(method),
                        ..decl.clone()
                    }))),
                    None => Ok(node),
                }
            }
            _ => Ok(node),
        }
    }

    fn disambiguate(&mut self, node: Node, ambiguous: Ambiguous) -> Result<Node, Abort> {
        let Ambiguous { role, prefix, name } = ambiguous;
        let prefix = match prefix {
            Some(prefix) => prefix,
            None => return self.disambiguate_simple(node, role, &name),
        };

        match prefix.kind() {
            NodeKind::Error(_) => Ok(build::error(node.position())),
            NodeKind::Ambiguous(_) => {
                if self.progress.borrow().pending.contains(&prefix.id()) {
                    return self.defer(node, &name);
                }
                Err(InternalCompilerError::AmbiguousNodeSurvived {
                    tag: prefix.tag(),
                    position: prefix.position(),
                    pass: PASS,
                }
                .into())
            }
            NodeKind::PackageNode(package) => {
                let package = package.package.clone();
                self.package_member(node, role, &package, &name)
            }
            NodeKind::CanonicalType(canonical) => {
                let type_ = canonical.type_.clone();
                self.type_member(node, role, prefix, &type_, &name)
            }
            _ if prefix.tag().is_expression() => self.expression_member(node, role, prefix, &name),
            _ => Err(InternalCompilerError::UnexpectedNode {
                tag: prefix.tag(),
                position: prefix.position(),
                pass: PASS,
            }
            .into()),
        }
    }

    fn package_member(
        &mut self,
        node: Node,
        role: AmbiguityRole,
        package: &Package,
        name: &str,
    ) -> Result<Node, Abort> {
        let position = node.position();
        match self.env.resolver.find_package_member(package, name) {
            Lookup::Found(Qualifier::Package(member)) if role.allows_package() => {
                Ok(build::package(position, member))
            }
            Lookup::Found(Qualifier::Class(class)) if role.allows_type() => {
                Ok(build::canonical(position, Type::Class(class)))
            }
            Lookup::Pending => self.defer(node, name),
            _ => {
                let error = errors::unresolved_name(&package.member_name(name), position);
                self.fail(node, error)
            }
        }
    }

    /// `T.name`: a static field of `T` or a member class of `T`.
    fn type_member(
        &mut self,
        node: Node,
        role: AmbiguityRole,
        prefix: Node,
        type_: &Type,
        name: &str,
    ) -> Result<Node, Abort> {
        let position = node.position();
        if role.allows_expr() {
            match self.env.resolver.find_field(type_, name) {
                Lookup::Found(field) => return Ok(build::field_of(position, prefix, &field, false)),
                Lookup::Pending => return self.defer(node, name),
                Lookup::NotFound => (),
            }
        }
        if role.allows_type() {
            if let Some(class) = type_.as_class() {
                match self.env.resolver.find_member_class(class, name) {
                    Lookup::Found(member) => {
                        return Ok(build::canonical(position, Type::Class(member)))
                    }
                    Lookup::Pending => return self.defer(node, name),
                    Lookup::NotFound => (),
                }
            }
        }
        let error = errors::unresolved_member(&type_.to_string(), name, position);
        self.fail(node, error)
    }

    /// `e.name`: always a field of the static type of `e`.
    fn expression_member(
        &mut self,
        node: Node,
        role: AmbiguityRole,
        prefix: Node,
        name: &str,
    ) -> Result<Node, Abort> {
        let position = node.position();
        if !role.allows_expr() {
            let error = errors::value_used_as_type(prefix.position());
            return self.fail(node, error);
        }

        let type_ = match self.static_type(&prefix) {
            Some(type_) => type_,
            // Only known after type checking, which binds the field.
            None => return Ok(build::field(position, prefix, name)),
        };
        match self.env.resolver.find_field(&type_, name) {
            Lookup::Found(field) => Ok(build::field_of(position, prefix, &field, false)),
            Lookup::Pending => self.defer(node, name),
            Lookup::NotFound => {
                let error = errors::unresolved_member(&type_.to_string(), name, position);
                self.fail(node, error)
            }
        }
    }

    /// A name without a prefix: a local, a field of an enclosing class, a type, or failing
    /// all of these, a package.
    fn disambiguate_simple(
        &mut self,
        node: Node,
        role: AmbiguityRole,
        name: &str,
    ) -> Result<Node, Abort> {
        let position = node.position();
        let classes: Vec<Arc<ClassType>> = self.context.enclosing_classes().cloned().collect();

        if role.allows_expr() {
            if let Some(local) = self.context.lookup_local(name) {
                trace!("`{}` at {} is a local", name, position);
                return Ok(build::local_of(position, local));
            }

            for (depth, class) in classes.iter().enumerate() {
                match self.env.resolver.find_field(&Type::class(class), name) {
                    Lookup::Found(field) => {
                        let target = if field.flags.is_static() {
                            build::canonical(position, Type::class(class))
                        } else if depth == 0 {
                            build::this(position, None)
                        } else {
                            let outer = build::canonical(position, Type::class(class));
                            build::this(position, Some(outer))
                        };
                        return Ok(build::field_of(position, target, &field, true));
                    }
                    Lookup::Pending => return self.defer(node, name),
                    Lookup::NotFound => (),
                }
            }
        }

        if role.allows_type() {
            if let Some(primitive) = PrimitiveKind::from_name(name) {
                return Ok(build::canonical(position, Type::Primitive(primitive)));
            }
            for class in &classes {
                match self.env.resolver.find_member_class(class, name) {
                    Lookup::Found(member) => {
                        return Ok(build::canonical(position, Type::Class(member)))
                    }
                    Lookup::Pending => return self.defer(node, name),
                    Lookup::NotFound => (),
                }
            }
            match self.env.resolver.find_type(name) {
                Lookup::Found(type_) => return Ok(build::canonical(position, type_)),
                Lookup::Pending => return self.defer(node, name),
                Lookup::NotFound => (),
            }
        }

        // A declaration still waiting for its type may be what this name refers to.
        let waiting = {
            let progress = self.progress.borrow();
            !progress.final_round && !progress.pending.is_empty()
        };
        if waiting {
            return self.defer(node, name);
        }

        // Whether the package exists only matters once the name is used as a value or type.
        trace!("assuming `{}` at {} is a package", name, position);
        Ok(build::package(position, Package::new(name)))
    }

    /// Type of an expression that is already known before type checking.
    fn static_type(&self, node: &Node) -> Option<Type> {
        if let Some(type_) = node.type_() {
            return Some(type_.clone());
        }
        match node.kind() {
            NodeKind::Local(local) => local.local.as_ref().map(|local| local.type_.clone()),
            NodeKind::Field(field) => field.field.as_ref().map(|field| field.type_.clone()),
            NodeKind::Lit(lit) => lit
                .value
                .literal_type()
                .or_else(|| Some(self.env.types.string())),
            NodeKind::Special(special) => match (special.kind, &special.qualifier) {
                (SpecialKind::This, None) => self.context.current_class().map(Type::class),
                (SpecialKind::This, Some(qualifier)) => denoted_type(qualifier).cloned(),
                (SpecialKind::Super, None) => self
                    .context
                    .current_class()
                    .and_then(|class| class.superclass())
                    .map(Type::class),
                (SpecialKind::Super, Some(_)) => None,
            },
            _ => None,
        }
    }

    fn defer(&mut self, node: Node, name: &str) -> Result<Node, Abort> {
        if self.progress.borrow().final_round {
            let error = errors::unresolved_name(name, node.position());
            return self.fail(node, error);
        }
        trace!("`{}` at {} is pending", name, node.position());
        self.progress.borrow_mut().pending.insert(node.id());
        Ok(node)
    }

    /// Reports `error` and replaces `node` so that later passes do not report it again.
    fn fail(&mut self, node: Node, error: CompilationError) -> Result<Node, Abort> {
        self.diagnostics.report(error)?;
        Ok(build::error(node.position()))
    }

    fn fresh_local(&self, name: &str, type_: Type, flags: Flags) -> LocalInstance {
        let mut progress = self.progress.borrow_mut();
        let id = LocalId(progress.next_local);
        progress.next_local += 1;
        LocalInstance {
            id,
            name: name.to_string(),
            type_,
            flags,
        }
    }

    fn bind_field(&self, decl: &FieldDecl) -> Option<FieldInstance> {
        let class = self.context.current_class()?;
        let type_ = denoted_type(&decl.type_node)?;
        let field = class.field(&decl.name).cloned().unwrap_or_else(|| FieldInstance {
            name: decl.name.clone(),
            container: class.name().to_string(),
            type_: type_.clone(),
            flags: decl.flags,
            constant: None,
        });
        Some(field)
    }

    /// Binds a method or constructor once its signature is fully resolved.
    fn bind_method(&self, decl: &MethodDecl) -> Option<MethodInstance> {
        let class = self.context.current_class()?;
        let return_type = match decl.return_type {
            Some(ref node) => Some(denoted_type(node)?.clone()),
            None => None,
        };
        let formals = decl
            .formals
            .iter()
            .map(|formal| match formal.kind() {
                NodeKind::Formal(Formal {
                    local: Some(local), ..
                }) => Some(local.type_.clone()),
                _ => None,
            })
            .collect::<Option<Vec<Type>>>()?;
        let throws = decl
            .throws
            .iter()
            .map(|node| denoted_type(node).cloned())
            .collect::<Option<Vec<Type>>>()?;

        let declared = if decl.is_constructor() {
            class.constructors()
        } else {
            class.methods()
        };
        let method = declared
            .iter()
            .find(|method| {
                (decl.is_constructor() || method.name == decl.name) && method.formals == formals
            })
            .cloned()
            .unwrap_or_else(|| MethodInstance {
                name: decl.name.clone(),
                container: class.name().to_string(),
                formals,
                return_type,
                throws,
                flags: decl.flags,
            });
        Some(method)
    }

    /// Makes `local` visible to the nodes visited next by this disambiguator.
    fn declare(&mut self, local: &LocalInstance, position: Position) -> Result<(), Abort> {
        match self.context.add_local(local.clone(), position) {
            Ok(context) => self.context = context,
            Err(error) => {
                // Later rounds see the same declarations again.
                let first = self
                    .progress
                    .borrow_mut()
                    .reported_duplicates
                    .insert(local.id);
                if first {
                    self.diagnostics.report(error)?;
                }
            }
        }
        Ok(())
    }

    /// A local is in scope in its own initializer, so the declaration is bound as soon as
    /// its type is known and before the initializer is visited.
    fn local_decl(&mut self, node: &Node, decl: &LocalDecl) -> Result<Node, Abort> {
        let mut inner = self.clone();
        let type_node = visit(&decl.type_node, &mut inner)?;
        let local = match decl.local {
            Some(ref local) => Some(local.clone()),
            None => denoted_type(&type_node)
                .map(|type_| self.fresh_local(&decl.name, type_.clone(), decl.flags)),
        };
        if let Some(ref local) = local {
            inner.declare(local, node.position())?;
        }
        let init = match decl.init {
            Some(ref init) => Some(visit(init, &mut inner)?),
            None => None,
        };

        let unchanged = type_node.ptr_eq(&decl.type_node)
            && local.is_some() == decl.local.is_some()
            && match (&init, &decl.init) {
                (Some(new), Some(old)) => new.ptr_eq(old),
                (None, None) => true,
                _ => false,
            };
        let rebuilt = if unchanged {
            node.clone()
        } else {
            node.with_kind(NodeKind::LocalDecl(LocalDecl {
                type_node,
                init,
                local,
                ..decl.clone()
            }))
        };
        self.leave(node, rebuilt, inner)
    }

    /// The class declared by `decl`, if the resolver knows it by now.
    fn declared_class(
        &mut self,
        node: &Node,
        decl: &ClassDecl,
    ) -> Result<Option<Arc<ClassType>>, Abort> {
        if let Some(ref class) = decl.class {
            return Ok(Some(Arc::clone(class)));
        }

        let name = match (self.context.current_class(), self.context.package()) {
            (Some(outer), _) => outer.member_class_name(&decl.name),
            (None, Some(package)) => package.member_name(&decl.name),
            (None, None) => decl.name.clone(),
        };
        match self.env.resolver.find_class(&name) {
            Lookup::Found(class) => Ok(Some(class)),
            Lookup::Pending if !self.progress.borrow().final_round => {
                trace!("class `{}` is pending", name);
                self.progress.borrow_mut().pending.insert(node.id());
                Ok(None)
            }
            _ => {
                self.diagnostics
                    .report(errors::unresolved_name(&name, node.position()))?;
                Ok(None)
            }
        }
    }
}

impl Visitor for Disambiguator {
    fn override_node(&mut self, node: &Node) -> Result<Option<Node>, Abort> {
        let decl = match node.kind() {
            NodeKind::ClassDecl(decl) => decl,
            NodeKind::LocalDecl(decl) => return self.local_decl(node, decl).map(Some),
            _ => return Ok(None),
        };

        // Classes the resolver does not know yet are skipped as a whole.
        let class = match self.declared_class(node, decl)? {
            Some(class) => class,
            None => return Ok(Some(node.clone())),
        };
        let mut inner = Disambiguator {
            context: self.context.push_class(Arc::clone(&class)),
            ..self.clone()
        };
        let rebuilt = visit_children(node, &mut inner)?;
        let bound = match rebuilt.kind() {
            NodeKind::ClassDecl(decl) if decl.class.is_none() => {
                rebuilt.with_kind(NodeKind::ClassDecl(ClassDecl {
                    class: Some(class),
                    ..decl.clone()
                }))
            }
            _ => rebuilt,
        };
        Ok(Some(bound))
    }

    fn enter(&mut self, node: &Node) -> Result<Self, Abort> {
        let context = match node.kind() {
            NodeKind::SourceFile(_) => self.context.with_package(declared_package(node)),
            NodeKind::MethodDecl(_) | NodeKind::Initializer(_) | NodeKind::FieldDecl(_) => {
                match CodeInfo::of(node) {
                    Some(code) => self.context.push_code(code),
                    None => self.context.clone(),
                }
            }
            NodeKind::Block(_)
            | NodeKind::For(_)
            | NodeKind::Catch(_)
            | NodeKind::SwitchBlock(_) => self.context.push_block(),
            _ => return Ok(self.clone()),
        };
        Ok(Disambiguator {
            context,
            ..self.clone()
        })
    }

    fn add_decls(&mut self, child: &Node) -> Result<(), Abort> {
        let local = match child.kind() {
            NodeKind::LocalDecl(decl) => decl.local.as_ref(),
            NodeKind::Formal(formal) => formal.local.as_ref(),
            _ => None,
        };
        let local = match local {
            Some(local) => local,
            None => return Ok(()),
        };

        self.declare(local, child.position())
    }

    fn leave(&mut self, old: &Node, new: Node, _inner: Self) -> Result<Node, Abort> {
        if let Some(rule) = self.rules.get(new.tag()) {
            return rule(self, old, new);
        }
        self.disambiguate_node(new)
    }
}
