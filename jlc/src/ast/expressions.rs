//! Expression payloads.

use crate::ast::{AssignOp, BinaryOp, Node, SpecialKind, UnaryOp};
use crate::types::{Constant, FieldInstance, LocalInstance, MethodInstance};

/// A boolean, character, numeric or string literal.
#[derive(Clone, Debug, PartialEq)]
pub struct Lit {
    pub value: Constant,
}

#[derive(Clone, Debug, PartialEq)]
pub struct NullLit {}

/// A use of a local variable or a formal parameter.
#[derive(Clone, Debug, PartialEq)]
pub struct Local {
    pub name: String,
    pub local: Option<LocalInstance>,
}

/// `target.name`, where `target` is an expression or a type.
#[derive(Clone, Debug, PartialEq)]
pub struct Field {
    pub target: Node,
    pub name: String,
    pub field: Option<FieldInstance>,

    /// The target was not written in the source (`x` meaning `this.x` or `C.x`).
    pub target_implicit: bool,
}

/// `target.name(arguments)`. Without a target the method is looked up in the enclosing
/// classes.
#[derive(Clone, Debug, PartialEq)]
pub struct Call {
    pub target: Option<Node>,
    pub name: String,
    pub arguments: Vec<Node>,
    pub method: Option<MethodInstance>,
}

/// `new C(arguments)`.
#[derive(Clone, Debug, PartialEq)]
pub struct New {
    pub class: Node,
    pub arguments: Vec<Node>,
    pub constructor: Option<MethodInstance>,
}

/// `new T[d1][d2][]...` or `new T[] { ... }`.
#[derive(Clone, Debug, PartialEq)]
pub struct NewArray {
    pub base: Node,
    pub dims: Vec<Node>,

    /// Number of trailing `[]` without a size.
    pub additional_dims: usize,
    pub init: Option<Node>,
}

/// `{ e1, e2, ... }`, typed from the context it appears in.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayInit {
    pub elements: Vec<Node>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct ArrayAccess {
    pub array: Node,
    pub index: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Assign {
    pub op: AssignOp,
    pub left: Node,
    pub right: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Binary {
    pub op: BinaryOp,
    pub left: Node,
    pub right: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Unary {
    pub op: UnaryOp,
    pub operand: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Cast {
    pub cast_type: Node,
    pub expr: Node,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Instanceof {
    pub expr: Node,
    pub compare_type: Node,
}

/// `cond ? consequent : alternative`.
#[derive(Clone, Debug, PartialEq)]
pub struct Conditional {
    pub cond: Node,
    pub consequent: Node,
    pub alternative: Node,
}

/// `this`, `super`, `C.this` or `C.super`.
#[derive(Clone, Debug, PartialEq)]
pub struct Special {
    pub kind: SpecialKind,
    pub qualifier: Option<Node>,
}

/// `T.class`.
#[derive(Clone, Debug, PartialEq)]
pub struct ClassLit {
    pub type_node: Node,
}
