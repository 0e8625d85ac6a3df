//! Assignment of types to expressions and checking of the typing rules of every node kind.

pub mod constants;
mod expressions;
mod statements;

use crate::ast::{ArrayInit, Node, NodeKind};
use crate::errors::{self, Abort, CompilationError, Diagnostics, InternalCompilerError};
use crate::passes::{declared_package, Env};
use crate::scope::{CodeInfo, Context};
use crate::types::{PrimitiveKind, Type};
use crate::visit::{visit, RuleTable, Visitor};
use constants::constant_value;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace};

const PASS: &str = "type checking";

/// Replaces the default type checking of one node kind.
///
/// Receives the original node and its form with type checked children.
pub type TypeCheckRule = fn(&mut TypeChecker, &Node, Node) -> Result<Node, Abort>;

#[derive(Clone)]
pub struct TypeChecker {
    env: Env,
    context: Context,
    diagnostics: Diagnostics,
    rules: Rc<RuleTable<TypeCheckRule>>,
}

impl TypeChecker {
    pub fn new(env: Env, diagnostics: Diagnostics) -> TypeChecker {
        TypeChecker {
            env,
            context: Context::new(),
            diagnostics,
            rules: Rc::new(RuleTable::new()),
        }
    }

    pub fn with_rules(self, rules: RuleTable<TypeCheckRule>) -> TypeChecker {
        TypeChecker {
            rules: Rc::new(rules),
            ..self
        }
    }

    pub fn run(&mut self, root: &Node) -> Result<Node, Abort> {
        let result = visit(root, self)?;
        debug!(
            "type checking finished with {} errors",
            self.diagnostics.error_count()
        );
        Ok(result)
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

    /// Default handling of a node whose children are already type checked.
    pub fn check_node(&mut self, node: Node) -> Result<Node, Abort> {
        let tag = node.tag();
        if tag.is_expression() {
            return self.check_expression(node);
        }
        match node.kind() {
            NodeKind::Ambiguous(_) => Err(InternalCompilerError::AmbiguousNodeSurvived {
                tag,
                position: node.position(),
                pass: PASS,
            }
            .into()),
            NodeKind::CanonicalType(canonical) => {
                let type_ = canonical.type_.clone();
                self.typed(node, type_)
            }
            _ => self.check_statement(node),
        }
    }

    fn report(&self, error: CompilationError) -> Result<(), Abort> {
        self.diagnostics.report(error)
    }

    /// Sets the type of `node`. A type that was already assigned may only be widened.
    fn typed(&self, node: Node, type_: Type) -> Result<Node, Abort> {
        if let Some(old) = node.type_() {
            if *old != type_ && !self.env.types.is_implicit_cast_valid(old, &type_) {
                return Err(InternalCompilerError::MonotonicityViolation {
                    tag: node.tag(),
                    position: node.position(),
                    old: old.clone(),
                    new: type_,
                }
                .into());
            }
        }
        trace!("{} at {} has type `{}`", node.tag(), node.position(), type_);
        Ok(node.with_type(type_))
    }

    /// Type of a child that is used as a value.
    ///
    /// `None` means that the child is erroneous. The problem has been reported by now, either
    /// earlier or by this call.
    fn value_type(&self, node: &Node) -> Result<Option<Type>, Abort> {
        let position = node.position();
        match node.kind() {
            NodeKind::Error(_) => return Ok(None),
            NodeKind::PackageNode(package) => {
                self.report(errors::package_used_as_value(&package.package, position))?;
                return Ok(None);
            }
            NodeKind::CanonicalType(canonical) => {
                self.report(errors::type_used_as_value(&canonical.type_, position))?;
                return Ok(None);
            }
            NodeKind::ArrayTypeNode(_) => {
                if let Some(type_) = self.resolved_type(node)? {
                    self.report(errors::type_used_as_value(&type_, position))?;
                }
                return Ok(None);
            }
            _ => (),
        }
        match node.type_() {
            Some(type_) if type_.is_void() => {
                self.report(errors::void_value(position))?;
                Ok(None)
            }
            type_ => Ok(type_.cloned()),
        }
    }

    /// Type denoted by a child in a type position.
    fn resolved_type(&self, node: &Node) -> Result<Option<Type>, Abort> {
        let position = node.position();
        match node.kind() {
            NodeKind::CanonicalType(canonical) => Ok(Some(canonical.type_.clone())),
            NodeKind::ArrayTypeNode(array) => Ok(self.resolved_type(&array.base)?.map(Type::array_of)),
            NodeKind::PackageNode(package) => {
                self.report(errors::unresolved_name(package.package.name(), position))?;
                Ok(None)
            }
            NodeKind::Error(_) => Ok(None),
            _ => {
                self.report(errors::value_used_as_type(position))?;
                Ok(None)
            }
        }
    }

    /// Whether the value of `expr` can be assigned to a variable of type `to`.
    ///
    /// Constant `int` expressions may be narrowed to `byte`, `short` and `char` when the value
    /// fits.
    fn is_assignable(&self, expr: &Node, from: &Type, to: &Type) -> bool {
        let types = &self.env.types;
        if types.is_implicit_cast_valid(from, to) {
            return true;
        }
        from.is_integral()
            && from.primitive() != Some(PrimitiveKind::Long)
            && to.is_integral()
            && constant_value(expr).map_or(false, |value| types.numeric_conversion_valid(to, &value))
    }

    /// Types an array initializer from the type of the variable or array it initializes.
    fn check_initializer(&self, init: &Node, expected: &Type) -> Result<Node, Abort> {
        let elements = match init.kind() {
            NodeKind::ArrayInit(array) => &array.elements,
            _ => return Ok(init.clone()),
        };
        let element_type = match expected.array_base() {
            Some(base) => base.clone(),
            None => {
                self.report(errors::not_an_array(expected, init.position()))?;
                return Ok(init.clone());
            }
        };

        let mut checked = Vec::with_capacity(elements.len());
        for element in elements {
            if let NodeKind::ArrayInit(_) = element.kind() {
                checked.push(self.check_initializer(element, &element_type)?);
                continue;
            }
            if let Some(found) = self.value_type(element)? {
                if !self.is_assignable(element, &found, &element_type) {
                    let error = errors::type_mismatch(&element_type, &found, element.position());
                    self.report(error)?;
                }
            }
            checked.push(element.clone());
        }

        let rebuilt = init.with_kind(NodeKind::ArrayInit(ArrayInit { elements: checked }));
        self.typed(rebuilt, expected.clone())
    }
}

impl Visitor for TypeChecker {
    fn override_node(&mut self, node: &Node) -> Result<Option<Node>, Abort> {
        // `x` meaning `this.x` inside static code: report the field rather than `this`.
        let field = match node.kind() {
            NodeKind::Field(field) if field.target_implicit && self.context.is_static() => field,
            _ => return Ok(None),
        };
        match field.field {
            Some(ref instance) if !instance.flags.is_static() => {
                self.report(errors::instance_field_in_static_context(
                    instance,
                    node.position(),
                ))?;
                Ok(Some(self.typed(node.clone(), instance.type_.clone())?))
            }
            _ => Ok(None),
        }
    }

    fn enter(&mut self, node: &Node) -> Result<Self, Abort> {
        let context = match node.kind() {
            NodeKind::SourceFile(_) => self.context.with_package(declared_package(node)),
            NodeKind::ClassDecl(decl) => match decl.class {
                Some(ref class) => self.context.push_class(Arc::clone(class)),
                None => self.context.clone(),
            },
            NodeKind::MethodDecl(_) | NodeKind::Initializer(_) | NodeKind::FieldDecl(_) => {
                match CodeInfo::of(node) {
                    Some(code) => self.context.push_code(code),
                    None => self.context.clone(),
                }
            }
            _ => return Ok(self.clone()),
        };
        Ok(TypeChecker {
            context,
            ..self.clone()
        })
    }

    fn leave(&mut self, old: &Node, new: Node, _inner: Self) -> Result<Node, Abort> {
        if let Some(rule) = self.rules.get(new.tag()) {
            return rule(self, old, new);
        }
        self.check_node(new)
    }
}
