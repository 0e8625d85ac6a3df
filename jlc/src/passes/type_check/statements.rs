use super::constants::constant_value;
use super::TypeChecker;
use crate::ast::*;
use crate::errors::{self, Abort};
use crate::scope::CodeKind;
use crate::source::Position;
use crate::types::{Constant, PrimitiveKind, Type};
use std::collections::hash_map::Entry;
use std::collections::HashMap;

impl TypeChecker {
    pub(super) fn check_statement(&mut self, node: Node) -> Result<Node, Abort> {
        match node.kind().clone() {
            NodeKind::LocalDecl(decl) => {
                let type_ = match decl.local {
                    Some(ref local) => Some(local.type_.clone()),
                    None => self.resolved_type(&decl.type_node)?,
                };
                match (type_, decl.init.clone()) {
                    (Some(type_), Some(init)) => {
                        let init = self.check_variable_init(&init, &type_, node.position())?;
                        Ok(node.with_kind(NodeKind::LocalDecl(LocalDecl {
                            init: Some(init),
                            ..decl
                        })))
                    }
                    _ => Ok(node),
                }
            }
            NodeKind::FieldDecl(decl) => {
                let type_ = match decl.field {
                    Some(ref field) => Some(field.type_.clone()),
                    None => self.resolved_type(&decl.type_node)?,
                };
                match (type_, decl.init.clone()) {
                    (Some(type_), Some(init)) => {
                        let init = self.check_variable_init(&init, &type_, node.position())?;
                        Ok(node.with_kind(NodeKind::FieldDecl(FieldDecl {
                            init: Some(init),
                            ..decl
                        })))
                    }
                    _ => Ok(node),
                }
            }
            NodeKind::If(if_) => {
                self.check_condition(&if_.cond)?;
                Ok(node)
            }
            NodeKind::While(while_) => {
                self.check_condition(&while_.cond)?;
                Ok(node)
            }
            NodeKind::Do(do_) => {
                self.check_condition(&do_.cond)?;
                Ok(node)
            }
            NodeKind::For(for_) => {
                if let Some(ref cond) = for_.cond {
                    self.check_condition(cond)?;
                }
                Ok(node)
            }
            NodeKind::Switch(switch) => {
                self.check_switch(&switch)?;
                Ok(node)
            }
            NodeKind::Throw(throw) => {
                if let Some(type_) = self.value_type(&throw.expr)? {
                    self.check_throwable(&type_, throw.expr.position())?;
                }
                Ok(node)
            }
            NodeKind::Return(return_) => {
                self.check_return(&return_, node.position())?;
                Ok(node)
            }
            NodeKind::Catch(catch) => {
                if let NodeKind::Formal(Formal {
                    local: Some(ref local),
                    ..
                }) = catch.formal.kind()
                {
                    self.check_throwable(&local.type_, catch.formal.position())?;
                }
                Ok(node)
            }
            NodeKind::MethodDecl(decl) => {
                if let Some(ref return_type) = decl.return_type {
                    self.resolved_type(return_type)?;
                }
                for thrown in &decl.throws {
                    if let Some(type_) = self.resolved_type(thrown)? {
                        self.check_throwable(&type_, thrown.position())?;
                    }
                }
                Ok(node)
            }
            NodeKind::ClassDecl(decl) => {
                for supertype in decl.superclass.iter().chain(&decl.interfaces) {
                    if let Some(type_) = self.resolved_type(supertype)? {
                        if type_.as_class().is_none() {
                            self.report(errors::not_a_class(&type_, supertype.position()))?;
                        }
                    }
                }
                Ok(node)
            }
            NodeKind::Eval(eval) => {
                // Only names that do not denote values are a problem; calls may be `void`.
                match eval.expr.kind() {
                    NodeKind::PackageNode(_)
                    | NodeKind::CanonicalType(_)
                    | NodeKind::ArrayTypeNode(_) => {
                        self.value_type(&eval.expr)?;
                    }
                    _ => (),
                }
                Ok(node)
            }
            _ => Ok(node),
        }
    }

    /// Checks the initializer of a variable of type `type_` declared at `position`.
    fn check_variable_init(
        &self,
        init: &Node,
        type_: &Type,
        position: Position,
    ) -> Result<Node, Abort> {
        if init.tag() == NodeTag::ArrayInit {
            return self.check_initializer(init, type_);
        }
        if let Some(found) = self.value_type(init)? {
            if !self.is_assignable(init, &found, type_) {
                self.report(errors::type_mismatch(type_, &found, position))?;
            }
        }
        Ok(init.clone())
    }

    fn check_condition(&self, cond: &Node) -> Result<(), Abort> {
        if let Some(type_) = self.value_type(cond)? {
            if !type_.is_boolean() {
                self.report(errors::condition_not_boolean(&type_, cond.position()))?;
            }
        }
        Ok(())
    }

    fn check_throwable(&self, type_: &Type, position: Position) -> Result<(), Abort> {
        if !self.env.types.is_throwable(type_) {
            self.report(errors::not_throwable(type_, position))?;
        }
        Ok(())
    }

    fn check_switch(&self, switch: &Switch) -> Result<(), Abort> {
        let selector = match self.value_type(&switch.expr)? {
            Some(type_) => match type_.primitive() {
                Some(PrimitiveKind::Char)
                | Some(PrimitiveKind::Byte)
                | Some(PrimitiveKind::Short)
                | Some(PrimitiveKind::Int) => Some(type_),
                _ => {
                    self.report(errors::switch_selector_type(&type_, switch.expr.position()))?;
                    None
                }
            },
            None => None,
        };

        let mut labels: HashMap<i64, Position> = HashMap::new();
        let mut default: Option<Position> = None;
        for element in &switch.elements {
            let position = element.position();
            let label = match element.kind() {
                NodeKind::Case(case) => &case.expr,
                _ => continue,
            };
            let label = match label {
                Some(label) => label,
                None => {
                    match default {
                        Some(previous) => {
                            self.report(errors::duplicate_default_label(position, previous))?
                        }
                        None => default = Some(position),
                    }
                    continue;
                }
            };

            let constant = match constant_value(label) {
                Some(constant) => constant,
                None => {
                    if !label.is_error() {
                        self.report(errors::case_label_not_constant(label.position()))?;
                    }
                    continue;
                }
            };
            if let (Some(ref selector), Some(found)) = (&selector, self.value_type(label)?) {
                if !self.is_assignable(label, &found, selector) {
                    self.report(errors::type_mismatch(selector, &found, label.position()))?;
                    continue;
                }
            }
            let value = match constant {
                Constant::Long(_) => continue,
                constant => match constant.as_int() {
                    Some(value) => value,
                    None => continue,
                },
            };
            match labels.entry(value) {
                Entry::Occupied(previous) => {
                    let error =
                        errors::duplicate_case_label(&value.to_string(), position, *previous.get());
                    self.report(error)?;
                }
                Entry::Vacant(entry) => {
                    entry.insert(position);
                }
            }
        }
        Ok(())
    }

    fn check_return(&self, return_: &Return, position: Position) -> Result<(), Abort> {
        let code = match self.context.current_code() {
            Some(code) => code,
            None => return self.report(errors::return_outside_method(position)),
        };
        let expected = match code.kind {
            CodeKind::Initializer | CodeKind::FieldInitializer => {
                return self.report(errors::return_outside_method(position));
            }
            CodeKind::Constructor => Type::void(),
            CodeKind::Method => match code.return_type {
                Some(ref type_) => type_.clone(),
                None => return Ok(()),
            },
        };

        match return_.expr {
            Some(_) if expected.is_void() => self.report(errors::return_value_in_void(position)),
            None if expected.is_void() => Ok(()),
            None => self.report(errors::missing_return_value(&expected, position)),
            Some(ref expr) => {
                if let Some(found) = self.value_type(expr)? {
                    if !self.is_assignable(expr, &found, &expected) {
                        let error = errors::return_type_mismatch(&expected, &found, expr.position());
                        self.report(error)?;
                    }
                }
                Ok(())
            }
        }
    }
}
