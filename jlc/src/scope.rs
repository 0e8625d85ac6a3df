//! Named entity visibility tracking for the analysis passes.
//!
//! Unlike a mutable push/pop stack, scopes here are persistent: pushing a frame or adding a
//! local returns a new scope and leaves the old one intact. Visitors copy their state when
//! they descend into a node, and the copy for a sibling subtree must not see declarations
//! made inside another one.

use crate::ast::{Node, NodeKind};
use crate::errors::{duplicate_local, CompilationError};
use crate::source::Position;
use crate::types::{ClassType, LocalInstance, Package, Type};
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Arc;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum FrameKind {
    Block,

    /// Start of a method, initializer or class body. Locals of enclosing code may be
    /// shadowed past this point.
    Code,
}

struct Frame {
    kind: FrameKind,
    locals: HashMap<String, (LocalInstance, Position)>,
    parent: Option<Rc<Frame>>,
}

#[derive(Clone, Default)]
pub struct Scope {
    top: Option<Rc<Frame>>,
}

impl Scope {
    /// Creates an empty scope.
    pub fn new() -> Scope {
        Scope { top: None }
    }

    fn push(&self, kind: FrameKind) -> Scope {
        Scope {
            top: Some(Rc::new(Frame {
                kind,
                locals: HashMap::new(),
                parent: self.top.clone(),
            })),
        }
    }

    /// A scope with a new frame for a nested block on top of this one.
    pub fn push_block(&self) -> Scope {
        self.push(FrameKind::Block)
    }

    /// A scope with a new frame for a new code body on top of this one.
    pub fn push_code(&self) -> Scope {
        self.push(FrameKind::Code)
    }

    /// A scope where `local` is visible as well.
    ///
    /// Redeclaring a local of the same code body is an error.
    pub fn add_local(
        &self,
        local: LocalInstance,
        position: Position,
    ) -> Result<Scope, CompilationError> {
        if let Some(previous) = self.find_in_code(&local.name) {
            return Err(duplicate_local(&local.name, position, previous));
        }

        let (kind, mut locals, parent) = match self.top {
            Some(ref top) => (top.kind, top.locals.clone(), top.parent.clone()),
            None => (FrameKind::Block, HashMap::new(), None),
        };
        locals.insert(local.name.clone(), (local, position));
        Ok(Scope {
            top: Some(Rc::new(Frame {
                kind,
                locals,
                parent,
            })),
        })
    }

    /// Declaration site of a local named `name` in the innermost code body.
    fn find_in_code(&self, name: &str) -> Option<Position> {
        let mut frame = self.top.as_ref();
        while let Some(current) = frame {
            if let Some((_, position)) = current.locals.get(name) {
                return Some(*position);
            }
            if current.kind == FrameKind::Code {
                return None;
            }
            frame = current.parent.as_ref();
        }
        None
    }

    /// Looks up a local by name. Inner declarations shadow outer ones.
    pub fn lookup_local(&self, name: &str) -> Option<&LocalInstance> {
        let mut frame = self.top.as_ref();
        while let Some(current) = frame {
            if let Some((local, _)) = current.locals.get(name) {
                return Some(local);
            }
            frame = current.parent.as_ref();
        }
        None
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CodeKind {
    Method,
    Constructor,
    Initializer,
    FieldInitializer,
}

/// The body of code being analyzed.
#[derive(Clone, Debug)]
pub struct CodeInfo {
    pub kind: CodeKind,
    pub name: String,

    /// `None` for everything but methods, which use `void` when nothing is returned.
    pub return_type: Option<Type>,

    /// Declared checked exceptions.
    pub throws: Vec<Type>,
    pub is_static: bool,
}

impl CodeInfo {
    /// Describes the code body owned by a method, initializer or field declaration.
    ///
    /// Return type and `throws` are only known once the declaration is bound to its symbol.
    pub fn of(node: &Node) -> Option<CodeInfo> {
        let info = match node.kind() {
            NodeKind::MethodDecl(decl) => CodeInfo {
                kind: if decl.is_constructor() {
                    CodeKind::Constructor
                } else {
                    CodeKind::Method
                },
                name: decl.name.clone(),
                return_type: decl
                    .method
                    .as_ref()
                    .and_then(|method| method.return_type.clone()),
                throws: decl
                    .method
                    .as_ref()
                    .map_or_else(Vec::new, |method| method.throws.clone()),
                is_static: decl.flags.is_static(),
            },
            NodeKind::Initializer(initializer) => CodeInfo {
                kind: CodeKind::Initializer,
                name: "<init>".to_string(),
                return_type: None,
                throws: Vec::new(),
                is_static: initializer.flags.is_static(),
            },
            NodeKind::FieldDecl(decl) => CodeInfo {
                kind: CodeKind::FieldInitializer,
                name: decl.name.clone(),
                return_type: None,
                throws: Vec::new(),
                is_static: decl.flags.is_static(),
            },
            _ => return None,
        };
        Some(info)
    }
}

/// Everything a pass knows about the location of the node it is visiting.
#[derive(Clone, Default)]
pub struct Context {
    package: Option<Package>,

    /// Enclosing classes, innermost last.
    classes: Rc<Vec<Arc<ClassType>>>,
    code: Option<Rc<CodeInfo>>,
    scope: Scope,
}

impl Context {
    pub fn new() -> Context {
        Context::default()
    }

    pub fn package(&self) -> Option<&Package> {
        self.package.as_ref()
    }

    pub fn with_package(&self, package: Option<Package>) -> Context {
        Context {
            package,
            ..self.clone()
        }
    }

    /// Enters the body of `class`.
    pub fn push_class(&self, class: Arc<ClassType>) -> Context {
        let mut classes = (*self.classes).clone();
        classes.push(class);
        Context {
            package: self.package.clone(),
            classes: Rc::new(classes),
            code: None,
            scope: self.scope.push_code(),
        }
    }

    pub fn current_class(&self) -> Option<&Arc<ClassType>> {
        self.classes.last()
    }

    /// Enclosing classes, innermost first.
    pub fn enclosing_classes(&self) -> impl Iterator<Item = &Arc<ClassType>> {
        self.classes.iter().rev()
    }

    /// Enters a code body.
    pub fn push_code(&self, code: CodeInfo) -> Context {
        Context {
            code: Some(Rc::new(code)),
            scope: self.scope.push_code(),
            ..self.clone()
        }
    }

    pub fn current_code(&self) -> Option<&CodeInfo> {
        self.code.as_deref()
    }

    /// Whether `this` is unavailable at this point.
    pub fn is_static(&self) -> bool {
        self.code.as_ref().map_or(false, |code| code.is_static)
    }

    pub fn push_block(&self) -> Context {
        Context {
            scope: self.scope.push_block(),
            ..self.clone()
        }
    }

    pub fn add_local(
        &self,
        local: LocalInstance,
        position: Position,
    ) -> Result<Context, CompilationError> {
        Ok(Context {
            scope: self.scope.add_local(local, position)?,
            ..self.clone()
        })
    }

    pub fn lookup_local(&self, name: &str) -> Option<&LocalInstance> {
        self.scope.lookup_local(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ErrorKind;
    use crate::types::{Flags, LocalId};

    fn local(id: u32, name: &str) -> LocalInstance {
        LocalInstance {
            id: LocalId(id),
            name: name.to_string(),
            type_: Type::int(),
            flags: Flags::NONE,
        }
    }

    #[test]
    fn adding_a_local_keeps_the_old_scope_intact() {
        let outer = Scope::new().push_code();
        let inner = outer.add_local(local(0, "x"), Position::at(1, 1)).unwrap();
        assert_eq!(inner.lookup_local("x").map(|l| l.id), Some(LocalId(0)));
        assert!(outer.lookup_local("x").is_none());
    }

    #[test]
    fn redeclaration_in_nested_block_is_an_error() {
        let scope = Scope::new()
            .push_code()
            .add_local(local(0, "x"), Position::at(1, 1))
            .unwrap()
            .push_block();
        match scope.add_local(local(1, "x"), Position::at(2, 1)) {
            Err(error) => {
                assert_eq!(error.kind, ErrorKind::DuplicateDeclaration);
                assert_eq!(error.location, Some(Position::at(2, 1)));
            }
            Ok(_) => panic!("redeclaration was accepted"),
        }
    }

    #[test]
    fn code_bodies_may_shadow_enclosing_locals() {
        let scope = Scope::new()
            .push_code()
            .add_local(local(0, "x"), Position::at(1, 1))
            .unwrap()
            .push_code()
            .add_local(local(1, "x"), Position::at(2, 1))
            .unwrap();
        assert_eq!(scope.lookup_local("x").map(|l| l.id), Some(LocalId(1)));
    }

    #[test]
    fn sibling_blocks_may_reuse_names() {
        let method = Scope::new().push_code();
        let first = method.push_block().add_local(local(0, "i"), Position::at(1, 1));
        let second = method.push_block().add_local(local(1, "i"), Position::at(2, 1));
        assert!(first.is_ok());
        assert!(second.is_ok());
    }
}
