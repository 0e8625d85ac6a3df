use super::TypeChecker;
use crate::ast::*;
use crate::errors::{self, Abort, CompilationError, InternalCompilerError};
use crate::source::Position;
use crate::types::{Lookup, MethodInstance, OverloadError, Type};
use std::sync::Arc;

const PASS: &str = "type checking";

impl TypeChecker {
    pub(super) fn check_expression(&mut self, node: Node) -> Result<Node, Abort> {
        match node.kind().clone() {
            NodeKind::Lit(lit) => {
                let type_ = lit
                    .value
                    .literal_type()
                    .unwrap_or_else(|| self.env.types.string());
                self.typed(node, type_)
            }
            NodeKind::NullLit(_) => self.typed(node, Type::Null),
            NodeKind::Local(local) => match local.local {
                Some(instance) => self.typed(node, instance.type_),
                None => Err(InternalCompilerError::UnexpectedNode {
                    tag: node.tag(),
                    position: node.position(),
                    pass: PASS,
                }
                .into()),
            },
            NodeKind::Field(field) => self.check_field(node, field),
            NodeKind::Call(call) => self.check_call(node, call),
            NodeKind::New(new) => self.check_new(node, new),
            NodeKind::NewArray(new_array) => self.check_new_array(node, new_array),
            // Typed by the declaration or array creation it belongs to.
            NodeKind::ArrayInit(_) => Ok(node),
            NodeKind::ArrayAccess(access) => self.check_array_access(node, access),
            NodeKind::Assign(assign) => self.check_assign(node, assign),
            NodeKind::Binary(binary) => self.check_binary(node, binary),
            NodeKind::Unary(unary) => self.check_unary(node, unary),
            NodeKind::Cast(cast) => self.check_cast(node, cast),
            NodeKind::Instanceof(instanceof) => self.check_instanceof(node, instanceof),
            NodeKind::Conditional(conditional) => self.check_conditional(node, conditional),
            NodeKind::Special(special) => self.check_special(node, special),
            NodeKind::ClassLit(class_lit) => {
                if self.resolved_type(&class_lit.type_node)?.is_none() {
                    return Ok(node);
                }
                let type_ = self.env.types.class_type();
                self.typed(node, type_)
            }
            _ => Err(InternalCompilerError::UnexpectedNode {
                tag: node.tag(),
                position: node.position(),
                pass: PASS,
            }
            .into()),
        }
    }

    fn check_field(&mut self, node: Node, field: Field) -> Result<Node, Abort> {
        let position = node.position();
        if let Some(instance) = field.field.clone() {
            if field.target.tag() == NodeTag::CanonicalType && !instance.flags.is_static() {
                self.report(errors::instance_field_in_static_context(&instance, position))?;
            }
            return self.typed(node, instance.type_);
        }

        let container = match field.target.kind() {
            NodeKind::CanonicalType(canonical) => canonical.type_.clone(),
            _ => match self.value_type(&field.target)? {
                Some(type_) => type_,
                None => return Ok(node),
            },
        };
        match self.env.resolver.find_field(&container, &field.name) {
            Lookup::Found(instance) => {
                let type_ = instance.type_.clone();
                let bound = node.with_kind(NodeKind::Field(Field {
                    field: Some(instance),
                    ..field
                }));
                self.typed(bound, type_)
            }
            _ => {
                let container = container.to_string();
                self.report(errors::unresolved_member(&container, &field.name, position))?;
                Ok(build::error(position))
            }
        }
    }

    /// Types of call arguments, or `None` if any of them is erroneous.
    fn argument_types(&self, arguments: &[Node]) -> Result<Option<Vec<Type>>, Abort> {
        let mut types = Vec::with_capacity(arguments.len());
        let mut complete = true;
        for argument in arguments {
            match self.value_type(argument)? {
                Some(type_) => types.push(type_),
                None => complete = false,
            }
        }
        Ok(if complete { Some(types) } else { None })
    }

    fn overload_error(
        &self,
        error: OverloadError,
        container: &Type,
        name: &str,
        arguments: &[Type],
        position: Position,
    ) -> CompilationError {
        match error {
            OverloadError::NoSuchMethod | OverloadError::Pending => {
                errors::method_not_found(container, name, position)
            }
            OverloadError::NoApplicable(candidates) => {
                errors::no_applicable_method(name, arguments, &candidates, position)
            }
            OverloadError::Ambiguous(candidates) => {
                errors::ambiguous_call(name, &candidates, position)
            }
        }
    }

    /// Resolves a call without a target in the innermost enclosing class that has a method
    /// with this name.
    fn find_enclosing_method(
        &self,
        name: &str,
        arguments: &[Type],
    ) -> Result<MethodInstance, (Type, OverloadError)> {
        let mut innermost = None;
        for class in self.context.enclosing_classes() {
            let container = Type::class(class);
            match self.env.resolver.find_method(
                &container,
                name,
                arguments,
                self.env.types.as_ref(),
            ) {
                Ok(method) => return Ok(method),
                Err(OverloadError::NoSuchMethod) => {
                    innermost.get_or_insert(container);
                }
                Err(error) => return Err((container, error)),
            }
        }
        let container = innermost.unwrap_or_else(|| self.env.types.object());
        Err((container, OverloadError::NoSuchMethod))
    }

    fn check_call(&mut self, node: Node, call: Call) -> Result<Node, Abort> {
        let position = node.position();
        if let Some(ref method) = call.method {
            let type_ = method.return_type.clone().unwrap_or_else(Type::void);
            return self.typed(node, type_);
        }

        let arguments = match self.argument_types(&call.arguments)? {
            Some(arguments) => arguments,
            None => return Ok(node),
        };

        let (result, static_only) = match call.target {
            None => (
                self.find_enclosing_method(&call.name, &arguments),
                self.context.is_static(),
            ),
            Some(ref target) => {
                let (container, static_only) = match target.kind() {
                    NodeKind::CanonicalType(canonical) => (canonical.type_.clone(), true),
                    _ => match self.value_type(target)? {
                        Some(type_) => (type_, false),
                        None => return Ok(node),
                    },
                };
                let result = self
                    .env
                    .resolver
                    .find_method(&container, &call.name, &arguments, self.env.types.as_ref())
                    .map_err(|error| (container, error));
                (result, static_only)
            }
        };

        let method = match result {
            Ok(method) => method,
            Err((container, error)) => {
                let error =
                    self.overload_error(error, &container, &call.name, &arguments, position);
                self.report(error)?;
                return Ok(node);
            }
        };
        if static_only && !method.flags.is_static() {
            self.report(errors::instance_method_in_static_context(&method, position))?;
        }

        let type_ = method.return_type.clone().unwrap_or_else(Type::void);
        let bound = node.with_kind(NodeKind::Call(Call {
            method: Some(method),
            ..call
        }));
        self.typed(bound, type_)
    }

    fn check_new(&mut self, node: Node, new: New) -> Result<Node, Abort> {
        let position = node.position();
        let type_ = match self.resolved_type(&new.class)? {
            Some(type_) => type_,
            None => return Ok(node),
        };
        let class = match type_.as_class() {
            Some(class) => Arc::clone(class),
            None => {
                self.report(errors::not_a_class(&type_, new.class.position()))?;
                return Ok(node);
            }
        };
        if new.constructor.is_some() {
            return self.typed(node, type_);
        }

        let arguments = match self.argument_types(&new.arguments)? {
            Some(arguments) => arguments,
            None => return Ok(node),
        };
        if class.is_interface() || class.flags().is_abstract() {
            self.report(errors::abstract_instantiation(&type_, position))?;
            return Ok(node);
        }

        let resolved =
            self.env
                .resolver
                .find_constructor(&class, &arguments, self.env.types.as_ref());
        match resolved {
            Ok(constructor) => {
                let bound = node.with_kind(NodeKind::New(New {
                    constructor: Some(constructor),
                    ..new
                }));
                self.typed(bound, type_)
            }
            Err(error) => {
                let error =
                    self.overload_error(error, &type_, class.short_name(), &arguments, position);
                self.report(error)?;
                Ok(node)
            }
        }
    }

    /// Array sizes and indices must promote to `int`.
    fn check_index(&self, index: &Node) -> Result<bool, Abort> {
        let type_ = match self.value_type(index)? {
            Some(type_) => type_,
            None => return Ok(false),
        };
        if self.env.types.unary_promotion(&type_) == Some(Type::int()) {
            return Ok(true);
        }
        self.report(errors::type_mismatch(&Type::int(), &type_, index.position()))?;
        Ok(false)
    }

    fn check_new_array(&mut self, node: Node, new_array: NewArray) -> Result<Node, Abort> {
        let base = match self.resolved_type(&new_array.base)? {
            Some(base) => base,
            None => return Ok(node),
        };
        let mut valid = true;
        for dim in &new_array.dims {
            valid &= self.check_index(dim)?;
        }
        let type_ = Type::array_of_dims(base, new_array.dims.len() + new_array.additional_dims);

        let checked = match new_array.init {
            Some(ref init) => {
                let checked = self.check_initializer(init, &type_)?;
                node.with_kind(NodeKind::NewArray(NewArray {
                    init: Some(checked),
                    ..new_array
                }))
            }
            None => node,
        };
        if !valid {
            return Ok(checked);
        }
        self.typed(checked, type_)
    }

    fn check_array_access(&mut self, node: Node, access: ArrayAccess) -> Result<Node, Abort> {
        let array = self.value_type(&access.array)?;
        let index_valid = self.check_index(&access.index)?;
        let array = match array {
            Some(array) => array,
            None => return Ok(node),
        };
        let element = match array.array_base() {
            Some(element) => element.clone(),
            None => {
                self.report(errors::not_an_array(&array, access.array.position()))?;
                return Ok(node);
            }
        };
        if !index_valid {
            return Ok(node);
        }
        self.typed(node, element)
    }

    fn check_assign(&mut self, node: Node, assign: Assign) -> Result<Node, Abort> {
        let position = node.position();
        match assign.left.kind() {
            NodeKind::Local(_) | NodeKind::Field(_) | NodeKind::ArrayAccess(_) => (),
            NodeKind::Error(_) => return Ok(node),
            _ => {
                let error = errors::not_a_variable(assign.op.symbol(), assign.left.position());
                self.report(error)?;
                return Ok(node);
            }
        }
        let (left, right) = match (
            self.value_type(&assign.left)?,
            self.value_type(&assign.right)?,
        ) {
            (Some(left), Some(right)) => (left, right),
            _ => return Ok(node),
        };

        let types = &self.env.types;
        let valid = match assign.op.binary_op() {
            None => {
                if !self.is_assignable(&assign.right, &right, &left) {
                    self.report(errors::type_mismatch(&left, &right, position))?;
                }
                true
            }
            Some(BinaryOp::Add) if left.is_string() => types.can_coerce_to_string(&right),
            Some(op) if op.is_bitwise() => {
                (left.is_boolean() && right.is_boolean())
                    || (left.is_integral() && right.is_integral())
            }
            Some(op) if op.is_shift() => left.is_integral() && right.is_integral(),
            Some(_) => left.is_numeric() && right.is_numeric(),
        };
        if !valid {
            let error = errors::operator_type_mismatch(assign.op.symbol(), &[&left, &right], position);
            self.report(error)?;
        }
        self.typed(node, left)
    }

    fn check_binary(&mut self, node: Node, binary: Binary) -> Result<Node, Abort> {
        let (left, right) = match (
            self.value_type(&binary.left)?,
            self.value_type(&binary.right)?,
        ) {
            (Some(left), Some(right)) => (left, right),
            _ => return Ok(node),
        };

        let types = &self.env.types;
        let both_boolean = left.is_boolean() && right.is_boolean();
        let both_numeric = left.is_numeric() && right.is_numeric();
        let result = match binary.op {
            BinaryOp::Add if left.is_string() || right.is_string() => {
                if types.can_coerce_to_string(&left) && types.can_coerce_to_string(&right) {
                    Some(types.string())
                } else {
                    None
                }
            }
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
                types.binary_promotion(&left, &right)
            }
            // Only the left operand is promoted.
            op if op.is_shift() => {
                if left.is_integral() && right.is_integral() {
                    types.unary_promotion(&left)
                } else {
                    None
                }
            }
            op if op.is_relational() => {
                if both_numeric {
                    Some(Type::boolean())
                } else {
                    None
                }
            }
            op if op.is_equality() => {
                let references = left.is_reference()
                    && right.is_reference()
                    && (types.is_cast_valid(&left, &right) || types.is_cast_valid(&right, &left));
                if both_numeric || both_boolean || references {
                    Some(Type::boolean())
                } else {
                    None
                }
            }
            op if op.is_bitwise() => {
                if both_boolean {
                    Some(Type::boolean())
                } else if left.is_integral() && right.is_integral() {
                    types.binary_promotion(&left, &right)
                } else {
                    None
                }
            }
            _ => {
                if both_boolean {
                    Some(Type::boolean())
                } else {
                    None
                }
            }
        };

        match result {
            Some(type_) => self.typed(node, type_),
            None => {
                let error = errors::operator_type_mismatch(
                    binary.op.symbol(),
                    &[&left, &right],
                    node.position(),
                );
                self.report(error)?;
                Ok(node)
            }
        }
    }

    fn check_unary(&mut self, node: Node, unary: Unary) -> Result<Node, Abort> {
        let position = node.position();
        if unary.op.is_update() {
            match unary.operand.kind() {
                NodeKind::Local(_) | NodeKind::Field(_) | NodeKind::ArrayAccess(_) => (),
                NodeKind::Error(_) => return Ok(node),
                _ => {
                    self.report(errors::not_a_variable(unary.op.symbol(), position))?;
                    return Ok(node);
                }
            }
        }
        let operand = match self.value_type(&unary.operand)? {
            Some(operand) => operand,
            None => return Ok(node),
        };

        let types = &self.env.types;
        let result = match unary.op {
            op if op.is_update() => {
                if operand.is_numeric() {
                    Some(operand.clone())
                } else {
                    None
                }
            }
            UnaryOp::Neg | UnaryOp::Pos => types.unary_promotion(&operand),
            UnaryOp::BitNot => {
                if operand.is_integral() {
                    types.unary_promotion(&operand)
                } else {
                    None
                }
            }
            _ => {
                if operand.is_boolean() {
                    Some(Type::boolean())
                } else {
                    None
                }
            }
        };

        match result {
            Some(type_) => self.typed(node, type_),
            None => {
                let error = errors::operator_type_mismatch(unary.op.symbol(), &[&operand], position);
                self.report(error)?;
                Ok(node)
            }
        }
    }

    fn check_cast(&mut self, node: Node, cast: Cast) -> Result<Node, Abort> {
        let (to, from) = match (
            self.resolved_type(&cast.cast_type)?,
            self.value_type(&cast.expr)?,
        ) {
            (Some(to), Some(from)) => (to, from),
            _ => return Ok(node),
        };
        if !self.env.types.is_cast_valid(&from, &to) {
            self.report(errors::invalid_cast(&from, &to, node.position()))?;
            return Ok(node);
        }
        self.typed(node, to)
    }

    fn check_instanceof(&mut self, node: Node, instanceof: Instanceof) -> Result<Node, Abort> {
        let (from, to) = match (
            self.value_type(&instanceof.expr)?,
            self.resolved_type(&instanceof.compare_type)?,
        ) {
            (Some(from), Some(to)) => (from, to),
            _ => return Ok(node),
        };
        let valid = from.is_reference()
            && to.is_reference()
            && self.env.types.is_cast_valid(&from, &to);
        if !valid {
            let error = errors::operator_type_mismatch("instanceof", &[&from, &to], node.position());
            self.report(error)?;
            return Ok(node);
        }
        self.typed(node, Type::boolean())
    }

    fn check_conditional(&mut self, node: Node, conditional: Conditional) -> Result<Node, Abort> {
        if let Some(cond) = self.value_type(&conditional.cond)? {
            if !cond.is_boolean() {
                let error = errors::condition_not_boolean(&cond, conditional.cond.position());
                self.report(error)?;
            }
        }
        let (consequent, alternative) = match (
            self.value_type(&conditional.consequent)?,
            self.value_type(&conditional.alternative)?,
        ) {
            (Some(consequent), Some(alternative)) => (consequent, alternative),
            _ => return Ok(node),
        };

        match self
            .env
            .types
            .least_common_ancestor(&consequent, &alternative)
        {
            Some(type_) => self.typed(node, type_),
            None => {
                let error = errors::operator_type_mismatch(
                    "?:",
                    &[&consequent, &alternative],
                    node.position(),
                );
                self.report(error)?;
                Ok(node)
            }
        }
    }

    fn check_special(&mut self, node: Node, special: Special) -> Result<Node, Abort> {
        let position = node.position();
        let current = match self.context.current_class() {
            Some(class) => Arc::clone(class),
            None => {
                self.report(errors::this_outside_class(position))?;
                return Ok(node);
            }
        };
        if self.context.is_static() {
            self.report(errors::this_in_static_context(position))?;
            return Ok(node);
        }

        let class = match special.qualifier {
            Some(ref qualifier) => match self.resolved_type(qualifier)? {
                Some(Type::Class(class)) => class,
                Some(other) => {
                    self.report(errors::not_a_class(&other, qualifier.position()))?;
                    return Ok(node);
                }
                None => return Ok(node),
            },
            None => current,
        };
        let type_ = match special.kind {
            SpecialKind::This => Type::Class(class),
            SpecialKind::Super => match class.superclass() {
                Some(superclass) => Type::class(superclass),
                None => self.env.types.object(),
            },
        };
        self.typed(node, type_)
    }
}

#[cfg(test)]
mod tests {
    use super::super::tests::{check, check_with, kinds, pos};
    use crate::ast::*;
    use crate::errors::ErrorKind;
    use crate::types::{ClassTable, ClassType, Flags, Package, Type};
    use std::sync::Arc;

    fn int_type() -> Node {
        build::amb_type(pos(1), "int")
    }

    fn decl(line: u32, type_node: Node, name: &str, init: Node) -> Node {
        build::local_decl(pos(line), type_node, name, Some(init))
    }

    fn name(line: u32, name: &str) -> Node {
        build::amb_expr(pos(line), name)
    }

    /// Type of the initializer of the `index`-th statement of a block.
    fn init_type(tree: &Node, index: usize) -> Option<Type> {
        let statement = tree.children()[index].clone();
        match statement.kind() {
            NodeKind::LocalDecl(LocalDecl { init: Some(init), .. }) => init.type_().cloned(),
            NodeKind::Eval(eval) => eval.expr.type_().cloned(),
            _ => None,
        }
    }

    fn counter_class() -> Arc<ClassType> {
        ClassType::builder("app.Counter")
            .field("count", Type::int(), Flags::PUBLIC)
            .method("next", vec![], Type::int(), vec![], Flags::PUBLIC)
            .method("reset", vec![Type::int()], Type::void(), vec![], Flags::PUBLIC)
            .method("reset", vec![Type::long()], Type::void(), vec![], Flags::PUBLIC)
            .method("of", vec![Type::int()], Type::int(), vec![], Flags::STATIC)
            .build()
    }

    /// `package app; class Counter { <flags> void m() { <statements> } }`
    fn in_counter(flags: Flags, statements: Vec<Node>) -> Node {
        let method = build::method_decl(
            pos(2),
            flags,
            Some(build::canonical(pos(2), Type::void())),
            "m",
            vec![],
            vec![],
            Some(build::block(pos(3), statements)),
        );
        let class = build::class_decl(pos(1), Flags::NONE, "Counter", None, vec![], vec![method]);
        let package = build::package(pos(1), Package::new("app"));
        build::source_file(pos(1), Some(package), vec![], vec![class])
    }

    fn counter_table() -> ClassTable {
        let mut table = ClassTable::with_core_classes();
        table.add_class(&counter_class());
        table.add_class(
            &ClassType::builder("app.Shape")
                .flags(Flags::ABSTRACT)
                .build(),
        );
        table.set_package("app");
        table
    }

    #[test]
    fn locals_and_arithmetic_get_int() {
        // int x = 5; x = x + 1;
        let tree = build::block(
            pos(1),
            vec![
                decl(1, int_type(), "x", build::int(pos(1), 5)),
                build::eval(
                    pos(2),
                    build::assign(
                        pos(2),
                        AssignOp::Assign,
                        name(2, "x"),
                        build::binary(pos(2), BinaryOp::Add, name(2, "x"), build::int(pos(2), 1)),
                    ),
                ),
            ],
        );
        let (checked, errors) = check(&tree);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(init_type(&checked, 1), Some(Type::int()));

        let locals: Vec<_> = checked
            .descendants()
            .into_iter()
            .filter(|node| node.tag() == NodeTag::Local)
            .collect();
        assert_eq!(locals.len(), 2);
        assert!(locals.iter().all(|local| local.type_() == Some(&Type::int())));
    }

    #[test]
    fn casting_object_to_string_is_a_narrowing_cast() {
        let tree = build::block(
            pos(1),
            vec![
                decl(1, build::amb_type(pos(1), "Object"), "o", build::string(pos(1), "hi")),
                decl(
                    2,
                    build::amb_type(pos(2), "String"),
                    "s",
                    build::cast(pos(2), build::amb_type(pos(2), "String"), name(2, "o")),
                ),
            ],
        );
        let (checked, errors) = check(&tree);
        assert!(errors.is_empty(), "{:?}", errors);
        assert!(init_type(&checked, 1).map_or(false, |type_| type_.is_string()));
    }

    #[test]
    fn invalid_casts_are_reported() {
        let tree = build::block(
            pos(1),
            vec![
                decl(1, build::amb_type(pos(1), "String"), "s", build::string(pos(1), "")),
                build::eval(pos(2), build::cast(pos(2), int_type(), name(2, "s"))),
            ],
        );
        let (_, errors) = check(&tree);
        assert_eq!(kinds(&errors), vec![ErrorKind::TypeMismatch]);
        assert_eq!(errors[0].message, "cannot cast `java.lang.String` to `int`");
    }

    #[test]
    fn shifts_promote_only_the_left_operand() {
        let tree = build::block(
            pos(1),
            vec![
                decl(1, build::amb_type(pos(1), "byte"), "b", build::int(pos(1), 1)),
                build::eval(
                    pos(2),
                    build::binary(
                        pos(2),
                        BinaryOp::Shl,
                        name(2, "b"),
                        build::lit(pos(2), crate::types::Constant::Long(3)),
                    ),
                ),
            ],
        );
        let (checked, errors) = check(&tree);
        assert!(errors.is_empty(), "{:?}", errors);
        assert_eq!(init_type(&checked, 1), Some(Type::int()));
    }

    #[test]
    fn string_concatenation_and_compound_assignment() {
        let tree = build::block(
            pos(1),
            vec![
                decl(1, build::amb_type(pos(1), "String"), "s", build::string(pos(1), "a")),
                build::eval(
                    pos(2),
                    build::assign(pos(2), AssignOp::AddAssign, name(2, "s"), build::int(pos(2), 1)),
                ),
                build::eval(
                    pos(3),
                    build::binary(pos(3), BinaryOp::Add, build::int(pos(3), 1), name(3, "s")),
                ),
                build::eval(
                    pos(4),
                    build::assign(pos(4), AssignOp::SubAssign, name(4, "s"), build::int(pos(4), 1)),
                ),
            ],
        );
        let (checked, errors) = check(&tree);
        assert_eq!(kinds(&errors), vec![ErrorKind::TypeMismatch]);
        assert_eq!(errors[0].location, Some(pos(4)));
        assert!(init_type(&checked, 1).map_or(false, |type_| type_.is_string()));
        assert!(init_type(&checked, 2).map_or(false, |type_| type_.is_string()));
    }

    #[test]
    fn bitwise_compound_assignment_needs_integral_or_boolean_operands() {
        let tree = build::block(
            pos(1),
            vec![
                decl(1, build::amb_type(pos(1), "boolean"), "flag", build::boolean(pos(1), true)),
                decl(2, build::amb_type(pos(2), "double"), "d", build::int(pos(2), 1)),
                build::eval(
                    pos(3),
                    build::assign(
                        pos(3),
                        AssignOp::BitAndAssign,
                        name(3, "flag"),
                        build::boolean(pos(3), false),
                    ),
                ),
                build::eval(
                    pos(4),
                    build::assign(pos(4), AssignOp::BitOrAssign, name(4, "d"), build::int(pos(4), 1)),
                ),
            ],
        );
        let (_, errors) = check(&tree);
        assert_eq!(kinds(&errors), vec![ErrorKind::TypeMismatch]);
        assert_eq!(errors[0].location, Some(pos(4)));
    }

    #[test]
    fn assignment_targets_must_be_variables() {
        let tree = build::eval(
            pos(1),
            build::assign(pos(1), AssignOp::Assign, build::int(pos(1), 1), build::int(pos(1), 2)),
        );
        let (_, errors) = check(&tree);
        assert_eq!(kinds(&errors), vec![ErrorKind::InvalidConstruct]);
    }

    #[test]
    fn conditionals_use_the_least_common_ancestor() {
        let tree = build::block(
            pos(1),
            vec![
                decl(1, build::amb_type(pos(1), "long"), "l", build::int(pos(1), 0)),
                build::eval(
                    pos(2),
                    build::conditional(
                        pos(2),
                        build::boolean(pos(2), true),
                        build::int(pos(2), 1),
                        name(2, "l"),
                    ),
                ),
                build::eval(
                    pos(3),
                    build::conditional(
                        pos(3),
                        build::int(pos(3), 1),
                        build::null(pos(3)),
                        build::string(pos(3), "x"),
                    ),
                ),
            ],
        );
        let (checked, errors) = check(&tree);
        assert_eq!(kinds(&errors), vec![ErrorKind::TypeMismatch]);
        assert_eq!(errors[0].message, "condition must be of type `boolean`, not `int`");
        assert_eq!(init_type(&checked, 1), Some(Type::long()));
        assert!(init_type(&checked, 2).map_or(false, |type_| type_.is_string()));
    }

    #[test]
    fn array_access_needs_an_array_and_an_int_index() {
        let array_type = build::array_type(pos(1), int_type());
        let tree = build::block(
            pos(1),
            vec![
                decl(
                    1,
                    array_type,
                    "arr",
                    build::array_init(pos(1), vec![build::int(pos(1), 1), build::int(pos(1), 2)]),
                ),
                build::eval(pos(2), build::index(pos(2), name(2, "arr"), build::int(pos(2), 0))),
                build::eval(
                    pos(3),
                    build::index(pos(3), name(3, "arr"), build::boolean(pos(3), true)),
                ),
                build::eval(pos(4), build::index(pos(4), build::int(pos(4), 3), build::int(pos(4), 0))),
            ],
        );
        let (checked, errors) = check(&tree);
        assert_eq!(
            kinds(&errors),
            vec![ErrorKind::TypeMismatch, ErrorKind::TypeMismatch]
        );
        assert_eq!(errors[0].location, Some(pos(3)));
        assert_eq!(errors[1].message, "array required, but `int` found");
        assert_eq!(init_type(&checked, 0), Some(Type::array_of(Type::int())));
        assert_eq!(init_type(&checked, 1), Some(Type::int()));
    }

    #[test]
    fn array_creation_types_dimensions_and_initializers() {
        let tree = build::block(
            pos(1),
            vec![
                build::eval(
                    pos(1),
                    build::new_array(pos(1), int_type(), vec![build::int(pos(1), 3)], 1, None),
                ),
                build::eval(
                    pos(2),
                    build::new_array(
                        pos(2),
                        build::amb_type(pos(2), "String"),
                        vec![],
                        1,
                        Some(build::array_init(pos(2), vec![build::int(pos(2), 1)])),
                    ),
                ),
            ],
        );
        let (checked, errors) = check(&tree);
        assert_eq!(kinds(&errors), vec![ErrorKind::TypeMismatch]);
        assert_eq!(errors[0].location, Some(pos(2)));
        assert_eq!(init_type(&checked, 0), Some(Type::array_of_dims(Type::int(), 2)));
    }

    #[test]
    fn small_int_constants_narrow_on_assignment() {
        let tree = build::block(
            pos(1),
            vec![
                decl(1, build::amb_type(pos(1), "byte"), "b", build::int(pos(1), 10)),
                decl(2, build::amb_type(pos(2), "byte"), "c", build::int(pos(2), 300)),
                decl(
                    3,
                    build::amb_type(pos(3), "char"),
                    "d",
                    build::binary(pos(3), BinaryOp::Add, build::int(pos(3), 60), build::int(pos(3), 5)),
                ),
            ],
        );
        let (_, errors) = check(&tree);
        assert_eq!(kinds(&errors), vec![ErrorKind::TypeMismatch]);
        assert_eq!(errors[0].location, Some(pos(2)));
    }

    #[test]
    fn equality_compares_compatible_operands() {
        let tree = build::block(
            pos(1),
            vec![
                build::eval(
                    pos(1),
                    build::binary(pos(1), BinaryOp::Eq, build::string(pos(1), "a"), build::null(pos(1))),
                ),
                build::eval(
                    pos(2),
                    build::binary(pos(2), BinaryOp::Ne, build::int(pos(2), 1), build::boolean(pos(2), true)),
                ),
            ],
        );
        let (checked, errors) = check(&tree);
        assert_eq!(kinds(&errors), vec![ErrorKind::TypeMismatch]);
        assert_eq!(errors[0].message, "operator `!=` cannot be applied to `int` and `boolean`");
        assert_eq!(init_type(&checked, 0), Some(Type::boolean()));
    }

    #[test]
    fn increments_need_numeric_variables() {
        let tree = build::block(
            pos(1),
            vec![
                decl(1, int_type(), "i", build::int(pos(1), 0)),
                build::eval(pos(2), build::unary(pos(2), UnaryOp::PostInc, name(2, "i"))),
                build::eval(pos(3), build::unary(pos(3), UnaryOp::PreDec, build::int(pos(3), 1))),
                build::eval(pos(4), build::unary(pos(4), UnaryOp::Not, name(4, "i"))),
            ],
        );
        let (checked, errors) = check(&tree);
        assert_eq!(
            kinds(&errors),
            vec![ErrorKind::InvalidConstruct, ErrorKind::TypeMismatch]
        );
        assert_eq!(init_type(&checked, 1), Some(Type::int()));
    }

    #[test]
    fn instanceof_needs_reference_types() {
        let tree = build::block(
            pos(1),
            vec![
                build::eval(
                    pos(1),
                    build::instanceof(
                        pos(1),
                        build::string(pos(1), "a"),
                        build::amb_type(pos(1), "Object"),
                    ),
                ),
                build::eval(
                    pos(2),
                    build::instanceof(pos(2), build::int(pos(2), 1), build::amb_type(pos(2), "Object")),
                ),
            ],
        );
        let (checked, errors) = check(&tree);
        assert_eq!(kinds(&errors), vec![ErrorKind::TypeMismatch]);
        assert_eq!(init_type(&checked, 0), Some(Type::boolean()));
    }

    #[test]
    fn calls_are_bound_to_the_most_specific_overload() {
        let tree = in_counter(
            Flags::NONE,
            vec![
                build::eval(pos(4), build::call(pos(4), None, "reset", vec![build::int(pos(4), 1)])),
                decl(5, int_type(), "n", build::call(pos(5), None, "next", vec![])),
                build::eval(
                    pos(6),
                    build::call(pos(6), None, "reset", vec![build::boolean(pos(6), true)]),
                ),
                build::eval(pos(7), build::call(pos(7), None, "missing", vec![])),
            ],
        );
        let (checked, errors) = check_with(counter_table(), &tree);
        assert_eq!(
            kinds(&errors),
            vec![ErrorKind::TypeMismatch, ErrorKind::UnresolvedName]
        );
        assert_eq!(errors[1].message, "cannot find method `missing` in `app.Counter`");

        let calls: Vec<_> = checked
            .descendants()
            .into_iter()
            .filter_map(|node| match node.kind() {
                NodeKind::Call(call) => Some((call.method.clone(), node.type_().cloned())),
                _ => None,
            })
            .collect();
        let (ref reset, ref reset_type) = calls[0];
        assert_eq!(reset.as_ref().map(|m| m.formals.clone()), Some(vec![Type::int()]));
        assert_eq!(*reset_type, Some(Type::void()));
        assert_eq!(calls[1].1, Some(Type::int()));
    }

    #[test]
    fn static_code_cannot_use_instance_members() {
        let tree = in_counter(
            Flags::STATIC,
            vec![
                build::eval(pos(4), name(4, "count")),
                build::eval(pos(5), build::call(pos(5), None, "next", vec![])),
                build::eval(pos(6), build::call(pos(6), None, "of", vec![build::int(pos(6), 1)])),
                build::eval(pos(7), build::this(pos(7), None)),
            ],
        );
        let (_, errors) = check_with(counter_table(), &tree);
        assert_eq!(
            kinds(&errors),
            vec![
                ErrorKind::InvalidConstruct,
                ErrorKind::InvalidConstruct,
                ErrorKind::InvalidConstruct,
            ]
        );
        let lines: Vec<_> = errors.iter().map(|e| e.location.map(|l| l.line)).collect();
        assert_eq!(lines, vec![Some(4), Some(5), Some(7)]);
    }

    #[test]
    fn this_and_fields_in_instance_methods() {
        let tree = in_counter(
            Flags::NONE,
            vec![
                build::eval(pos(4), name(4, "count")),
                build::eval(
                    pos(5),
                    build::field(pos(5), build::this(pos(5), None), "count"),
                ),
                build::eval(pos(6), build::super_(pos(6), None)),
            ],
        );
        let (checked, errors) = check_with(counter_table(), &tree);
        assert!(errors.is_empty(), "{:?}", errors);

        let types: Vec<_> = checked
            .descendants()
            .into_iter()
            .filter(|node| node.tag() == NodeTag::Eval)
            .map(|node| node.children()[0].type_().map(ToString::to_string))
            .collect();
        assert_eq!(
            types,
            vec![
                Some("int".to_string()),
                Some("int".to_string()),
                Some("java.lang.Object".to_string()),
            ]
        );
    }

    #[test]
    fn abstract_classes_cannot_be_instantiated() {
        let tree = in_counter(
            Flags::NONE,
            vec![
                build::eval(pos(4), build::new(pos(4), build::amb_type(pos(4), "Shape"), vec![])),
                build::eval(pos(5), build::new(pos(5), build::amb_type(pos(5), "Counter"), vec![])),
                build::eval(
                    pos(6),
                    build::new(
                        pos(6),
                        build::amb_type(pos(6), "Counter"),
                        vec![build::int(pos(6), 1)],
                    ),
                ),
            ],
        );
        let (checked, errors) = check_with(counter_table(), &tree);
        assert_eq!(
            kinds(&errors),
            vec![ErrorKind::InvalidConstruct, ErrorKind::TypeMismatch]
        );
        let created: Vec<_> = checked
            .descendants()
            .into_iter()
            .filter_map(|node| match node.kind() {
                NodeKind::New(new) if new.constructor.is_some() => node.type_().cloned(),
                _ => None,
            })
            .collect();
        assert_eq!(created.len(), 1);
        assert!(created[0].is_class_named("app.Counter"));
    }

    #[test]
    fn class_literals_have_type_class() {
        let tree = build::eval(pos(1), build::class_lit(pos(1), build::amb_type(pos(1), "String")));
        let (checked, errors) = check(&tree);
        assert!(errors.is_empty(), "{:?}", errors);
        assert!(checked.children()[0].type_().map_or(false, |t| t.is_class_named("java.lang.Class")));
    }

    #[test]
    fn erroneous_operands_do_not_cascade() {
        // missing.value + 1: `missing` is a package without a member `value`.
        let operand = build::amb_dotted(pos(1), AmbiguityRole::Expr, "missing.value");
        let tree = build::eval(
            pos(1),
            build::binary(pos(1), BinaryOp::Add, operand, build::int(pos(1), 1)),
        );
        let (_, errors) = check(&tree);
        assert_eq!(kinds(&errors), vec![ErrorKind::UnresolvedName]);
    }
}
