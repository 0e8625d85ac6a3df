//! Computation of the exceptions every term may throw, and the checks that depend on them:
//! uncaught checked exceptions, catch blocks that can never run and catch blocks hidden by
//! earlier ones.

use crate::ast::{AssignOp, Node, NodeKind, NodeTag, Try};
use crate::errors::{self, Abort, Diagnostics};
use crate::passes::Env;
use crate::source::Position;
use crate::types::{Type, TypeSystem};
use crate::visit::{visit, RuleTable, Visitor};
use std::mem;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace};

/// Replaces the default exception analysis of one node kind.
///
/// Receives the original node, its form with checked children, and the exceptions the
/// children throw. The rule must call `propagate` for whatever escapes the node.
pub type ExceptionRule = fn(&mut ExceptionChecker, &Node, Node, ThrowSet) -> Result<Node, Abort>;

/// Exception types together with the node that throws each of them first.
#[derive(Clone, Default, Debug)]
pub struct ThrowSet {
    entries: Vec<(Type, Position)>,
}

impl ThrowSet {
    pub fn new() -> ThrowSet {
        ThrowSet::default()
    }

    pub fn add(&mut self, type_: Type, position: Position) {
        if !self.contains(&type_) {
            self.entries.push((type_, position));
        }
    }

    pub fn extend(&mut self, other: ThrowSet) {
        for (type_, position) in other.entries {
            self.add(type_, position);
        }
    }

    pub fn contains(&self, type_: &Type) -> bool {
        self.entries.iter().any(|(entry, _)| entry == type_)
    }

    /// Removes the exceptions that are definitely caught by a handler for `caught`.
    pub fn remove_caught(&mut self, caught: &Type, types: &dyn TypeSystem) {
        self.entries
            .retain(|(type_, _)| !types.is_subtype(type_, caught));
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Type, Position)> {
        self.entries.iter()
    }

    pub fn types(&self) -> Vec<Type> {
        self.entries.iter().map(|(type_, _)| type_.clone()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[derive(Clone)]
pub struct ExceptionChecker {
    env: Env,
    diagnostics: Diagnostics,
    rules: Rc<RuleTable<ExceptionRule>>,

    /// Exceptions escaping the children visited so far.
    thrown: ThrowSet,
}

impl ExceptionChecker {
    pub fn new(env: Env, diagnostics: Diagnostics) -> ExceptionChecker {
        ExceptionChecker {
            env,
            diagnostics,
            rules: Rc::new(RuleTable::new()),
            thrown: ThrowSet::new(),
        }
    }

    pub fn with_rules(self, rules: RuleTable<ExceptionRule>) -> ExceptionChecker {
        ExceptionChecker {
            rules: Rc::new(rules),
            ..self
        }
    }

    pub fn run(&mut self, root: &Node) -> Result<Node, Abort> {
        let result = visit(root, self)?;
        debug!(
            "exception checking finished, {} exceptions escape the root",
            self.thrown.len()
        );
        Ok(result)
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// Exceptions escaping everything visited by this checker so far.
    pub fn thrown(&self) -> &ThrowSet {
        &self.thrown
    }

    /// Makes `thrown` escape to the parent of the node being checked.
    pub fn propagate(&mut self, thrown: ThrowSet) {
        self.thrown.extend(thrown);
    }

    /// Default handling of a node, given the exceptions thrown by its children.
    pub fn check_node(&mut self, node: Node, mut thrown: ThrowSet) -> Result<Node, Abort> {
        let types = Arc::clone(&self.env.types);
        for type_ in throw_types(&node, types.as_ref()) {
            thrown.add(type_, node.position());
        }
        let annotated = node.with_exceptions(thrown.types());

        let declared = match node.kind() {
            NodeKind::MethodDecl(decl) => match decl.method {
                Some(ref method) => method.throws.clone(),
                None => return Ok(annotated),
            },
            NodeKind::Initializer(_) | NodeKind::FieldDecl(_) => Vec::new(),
            _ => {
                self.propagate(thrown);
                return Ok(annotated);
            }
        };

        // Code bodies stop propagation: anything checked must be declared.
        for (type_, position) in thrown.iter() {
            let allowed = types.is_unchecked_exception(type_)
                || declared
                    .iter()
                    .any(|declared| types.is_subtype(type_, declared));
            if !allowed {
                self.diagnostics
                    .report(errors::uncaught_exception(type_, *position))?;
            }
        }
        Ok(annotated)
    }

    /// Whether a handler for `caught` may run even though nothing in the try block throws a
    /// related type. Handlers for supertypes of the unchecked exceptions always can.
    fn catches_unchecked(&self, caught: &Type) -> bool {
        let types = &self.env.types;
        types.is_subtype(&types.runtime_exception(), caught)
            || types.is_subtype(&types.error(), caught)
    }

    fn check_try(&mut self, node: &Node, try_: &Try) -> Result<Node, Abort> {
        let types = Arc::clone(&self.env.types);
        let mut inner = ExceptionChecker {
            thrown: ThrowSet::new(),
            ..self.clone()
        };

        let try_block = visit(&try_.try_block, &mut inner)?;
        let from_try = mem::take(&mut inner.thrown);
        let mut uncaught = from_try.clone();

        let mut handlers: Vec<(Type, Position)> = Vec::new();
        let mut catches = Vec::with_capacity(try_.catches.len());
        for catch in &try_.catches {
            let position = catch.position();
            if let Some(caught) = caught_type(catch) {
                let earlier = handlers
                    .iter()
                    .find(|(earlier, _)| types.is_subtype(&caught, earlier));
                if let Some((earlier, earlier_position)) = earlier {
                    let error =
                        errors::duplicate_catch(&caught, position, earlier, *earlier_position);
                    self.diagnostics.report(error)?;
                } else {
                    let related = from_try.iter().any(|(thrown, _)| {
                        types.is_subtype(thrown, &caught) || types.is_subtype(&caught, thrown)
                    });
                    if !related && !self.catches_unchecked(&caught) {
                        self.diagnostics
                            .report(errors::catch_not_thrown(&caught, position))?;
                    }
                }
                uncaught.remove_caught(&caught, types.as_ref());
                handlers.push((caught, position));
            }
            catches.push(visit(catch, &mut inner)?);
        }
        uncaught.extend(mem::take(&mut inner.thrown));

        let finally = match try_.finally {
            Some(ref finally) => {
                let finally = visit(finally, &mut inner)?;
                let from_finally = mem::take(&mut inner.thrown);
                if completes_abruptly(&finally) {
                    trace!("finally block at {} discards exceptions", finally.position());
                    uncaught = from_finally;
                } else {
                    uncaught.extend(from_finally);
                }
                Some(finally)
            }
            None => None,
        };

        let rebuilt = node.with_kind(NodeKind::Try(Try {
            try_block,
            catches,
            finally,
        }));
        let annotated = rebuilt.with_exceptions(uncaught.types());
        self.propagate(uncaught);
        Ok(annotated)
    }
}

impl Visitor for ExceptionChecker {
    fn override_node(&mut self, node: &Node) -> Result<Option<Node>, Abort> {
        match node.kind() {
            NodeKind::Try(try_) if self.rules.get(NodeTag::Try).is_none() => {
                let try_ = try_.clone();
                self.check_try(node, &try_).map(Some)
            }
            _ => Ok(None),
        }
    }

    fn enter(&mut self, _node: &Node) -> Result<Self, Abort> {
        Ok(ExceptionChecker {
            thrown: ThrowSet::new(),
            ..self.clone()
        })
    }

    fn leave(&mut self, old: &Node, new: Node, inner: Self) -> Result<Node, Abort> {
        if let Some(rule) = self.rules.get(new.tag()) {
            return rule(self, old, new, inner.thrown);
        }
        self.check_node(new, inner.thrown)
    }
}

/// Type caught by a catch block, if its formal is bound.
pub(crate) fn caught_type(catch: &Node) -> Option<Type> {
    match catch.kind() {
        NodeKind::Catch(catch) => match catch.formal.kind() {
            NodeKind::Formal(formal) => formal.local.as_ref().map(|local| local.type_.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// Whether `node` syntactically ends in a `return`, `throw`, `break` or `continue`.
pub(crate) fn completes_abruptly(node: &Node) -> bool {
    match node.kind() {
        NodeKind::Return(_) | NodeKind::Throw(_) | NodeKind::Branch(_) => true,
        NodeKind::Block(block) => block.statements.last().map_or(false, completes_abruptly),
        _ => false,
    }
}

/// Whether evaluating `target` can dereference `null`.
fn may_be_null(target: &Node) -> bool {
    match target.kind() {
        NodeKind::Special(_) => false,
        _ => target.tag().is_expression(),
    }
}

/// Exceptions a node may throw by itself, not counting its children.
pub fn throw_types(node: &Node, types: &dyn TypeSystem) -> Vec<Type> {
    let mut thrown = Vec::new();
    let integral = |node: &Node| node.type_().map_or(false, Type::is_integral);

    match node.kind() {
        NodeKind::Field(field) if may_be_null(&field.target) => {
            thrown.push(types.null_pointer_exception());
        }
        NodeKind::ArrayAccess(_) => {
            thrown.push(types.null_pointer_exception());
            thrown.push(types.array_index_out_of_bounds_exception());
        }
        NodeKind::Binary(binary) if binary.op.may_divide_by_zero() && integral(node) => {
            thrown.push(types.arithmetic_exception());
        }
        NodeKind::Assign(assign) => match assign.op {
            AssignOp::DivAssign | AssignOp::ModAssign if integral(&assign.left) => {
                thrown.push(types.arithmetic_exception());
            }
            AssignOp::Assign
                if assign.left.tag() == NodeTag::ArrayAccess
                    && assign.left.type_().map_or(false, Type::is_reference) =>
            {
                thrown.push(types.array_store_exception());
            }
            _ => (),
        },
        NodeKind::Cast(cast) if cast.expr.type_().map_or(false, Type::is_reference) => {
            thrown.push(types.class_cast_exception());
        }
        NodeKind::NewArray(new_array) if !new_array.dims.is_empty() => {
            thrown.push(types.negative_array_size_exception());
        }
        NodeKind::Throw(throw) => {
            if let Some(type_) = throw.expr.type_() {
                thrown.push(type_.clone());
            }
            thrown.push(types.null_pointer_exception());
        }
        NodeKind::Call(call) => {
            if let Some(ref method) = call.method {
                thrown.extend(method.throws.iter().cloned());
            }
            if call.target.as_ref().map_or(false, may_be_null) {
                thrown.push(types.null_pointer_exception());
            }
            thrown.extend(types.unchecked_exceptions());
        }
        NodeKind::New(new) => {
            if let Some(ref constructor) = new.constructor {
                thrown.extend(constructor.throws.iter().cloned());
            }
        }
        _ => (),
    }

    if node.tag().is_simple_statement() {
        thrown.push(types.error());
    }
    thrown
}
