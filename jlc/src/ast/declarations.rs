//! Declaration payloads.

use crate::ast::{ImportKind, Node};
use crate::types::{ClassType, FieldInstance, Flags, MethodInstance};
use std::sync::Arc;

#[derive(Clone, Debug, PartialEq)]
pub struct FieldDecl {
    pub flags: Flags,
    pub type_node: Node,
    pub name: String,
    pub init: Option<Node>,
    pub field: Option<FieldInstance>,
}

/// A method, or a constructor when there is no return type.
#[derive(Clone, Debug, PartialEq)]
pub struct MethodDecl {
    pub flags: Flags,
    pub return_type: Option<Node>,
    pub name: String,
    pub formals: Vec<Node>,
    pub throws: Vec<Node>,
    pub body: Option<Node>,
    pub method: Option<MethodInstance>,
}

impl MethodDecl {
    pub fn is_constructor(&self) -> bool {
        self.return_type.is_none()
    }
}

/// A static or instance initializer block.
#[derive(Clone, Debug, PartialEq)]
pub struct Initializer {
    pub flags: Flags,
    pub body: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ClassDecl {
    pub flags: Flags,
    pub name: String,
    pub superclass: Option<Node>,
    pub interfaces: Vec<Node>,
    pub members: Vec<Node>,
    pub class: Option<Arc<ClassType>>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Import {
    pub kind: ImportKind,
    pub name: String,
}

/// A compilation unit.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceFile {
    pub package: Option<Node>,
    pub imports: Vec<Node>,
    pub decls: Vec<Node>,
}
