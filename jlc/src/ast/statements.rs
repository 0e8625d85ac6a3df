//! Statement payloads.

use crate::ast::{BranchKind, Node};
use crate::types::{Flags, LocalInstance};

#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    pub statements: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Empty {}

/// An expression evaluated for its side effects.
#[derive(Clone, Debug, PartialEq)]
pub struct Eval {
    pub expr: Node,
}

/// A local variable declaration. The variable is in scope from the next statement on.
#[derive(Clone, Debug, PartialEq)]
pub struct LocalDecl {
    pub flags: Flags,
    pub type_node: Node,
    pub name: String,
    pub init: Option<Node>,
    pub local: Option<LocalInstance>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct If {
    pub cond: Node,
    pub consequent: Node,
    pub alternative: Option<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct While {
    pub cond: Node,
    pub body: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Do {
    pub body: Node,
    pub cond: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct For {
    pub inits: Vec<Node>,
    pub cond: Option<Node>,
    pub updates: Vec<Node>,
    pub body: Node,
}

/// `switch (expr) { elements }`, where elements are `Case` labels and `SwitchBlock`s.
#[derive(Clone, Debug, PartialEq)]
pub struct Switch {
    pub expr: Node,
    pub elements: Vec<Node>,
}

/// `case expr:`, or `default:` without an expression.
#[derive(Clone, Debug, PartialEq)]
pub struct Case {
    pub expr: Option<Node>,
}

/// Statements following a group of case labels.
#[derive(Clone, Debug, PartialEq)]
pub struct SwitchBlock {
    pub statements: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Try {
    pub try_block: Node,
    pub catches: Vec<Node>,
    pub finally: Option<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Catch {
    pub formal: Node,
    pub body: Node,
}

/// A formal parameter of a method or a catch block.
#[derive(Clone, Debug, PartialEq)]
pub struct Formal {
    pub flags: Flags,
    pub type_node: Node,
    pub name: String,
    pub local: Option<LocalInstance>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Throw {
    pub expr: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Return {
    pub expr: Option<Node>,
}

/// `break` or `continue`, optionally labeled.
#[derive(Clone, Debug, PartialEq)]
pub struct Branch {
    pub kind: BranchKind,
    pub label: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Labeled {
    pub label: String,
    pub statement: Node,
}
