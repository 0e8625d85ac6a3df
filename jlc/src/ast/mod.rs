//! The syntax tree.
//!
//! Nodes are immutable and shared through reference counting. Every "setter" returns a new
//! node that shares all unchanged children with the original, or the original itself if
//! nothing changed. Passes rely on this to detect which subtrees a rewrite touched.

pub mod build;
mod children;
mod declarations;
mod dump;
mod expressions;
mod kinds;
mod names;
mod ops;
mod statements;

pub use declarations::*;
pub use expressions::*;
pub use kinds::{KindInfo, NodeKind, NodeTag};
pub use names::*;
pub use ops::*;
pub use statements::*;

use crate::source::Position;
use crate::types::Type;
use crate::utils::sexp::ToSexp;
use std::fmt::{self, Debug, Formatter};
use std::rc::Rc;

/// A handle to an immutable syntax node.
#[derive(Clone)]
pub struct Node(Rc<NodeData>);

#[derive(Clone)]
struct NodeData {
    position: Position,
    kind: NodeKind,

    /// Assigned once by the type checker to expressions and type nodes.
    type_: Option<Type>,

    /// Exceptions the node may throw, computed by the exception checker.
    exceptions: Option<Rc<Vec<Type>>>,
}

impl Node {
    pub fn new(position: Position, kind: impl Into<NodeKind>) -> Node {
        Node(Rc::new(NodeData {
            position,
            kind: kind.into(),
            type_: None,
            exceptions: None,
        }))
    }

    pub fn position(&self) -> Position {
        self.0.position
    }

    pub fn kind(&self) -> &NodeKind {
        &self.0.kind
    }

    pub fn tag(&self) -> NodeTag {
        self.0.kind.tag()
    }

    pub fn type_(&self) -> Option<&Type> {
        self.0.type_.as_ref()
    }

    pub fn exceptions(&self) -> Option<&[Type]> {
        self.0.exceptions.as_ref().map(|exceptions| exceptions.as_slice())
    }

    /// Whether both handles refer to the same node object.
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the node object, stable for as long as the node is alive.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as usize
    }

    pub fn is_ambiguous(&self) -> bool {
        self.tag() == NodeTag::Ambiguous
    }

    pub fn is_error(&self) -> bool {
        self.tag() == NodeTag::Error
    }

    fn update(&self, f: impl FnOnce(&mut NodeData)) -> Node {
        let mut data = (*self.0).clone();
        f(&mut data);
        Node(Rc::new(data))
    }

    /// Returns a node with the same position and attributes but different contents.
    pub fn with_kind(&self, kind: NodeKind) -> Node {
        if self.0.kind == kind {
            return self.clone();
        }
        self.update(|data| data.kind = kind)
    }

    /// Returns a node with the given type.
    ///
    /// There is deliberately no way to remove a type once it has been assigned.
    pub fn with_type(&self, type_: Type) -> Node {
        if self.0.type_.as_ref() == Some(&type_) {
            return self.clone();
        }
        self.update(|data| data.type_ = Some(type_))
    }

    pub fn with_exceptions(&self, exceptions: Vec<Type>) -> Node {
        if self.exceptions() == Some(exceptions.as_slice()) {
            return self.clone();
        }
        self.update(|data| data.exceptions = Some(Rc::new(exceptions)))
    }

    /// Direct children in source order.
    pub fn children(&self) -> Vec<&Node> {
        self.0.kind.children()
    }

    /// The node and all nodes below it, parents before children.
    pub fn descendants(&self) -> Vec<Node> {
        let mut nodes = Vec::new();
        let mut stack = vec![self.clone()];
        while let Some(node) = stack.pop() {
            stack.extend(node.children().into_iter().rev().cloned());
            nodes.push(node);
        }
        nodes
    }
}

impl PartialEq for Node {
    /// Structural equality: same position, contents and attributes.
    fn eq(&self, other: &Node) -> bool {
        self.ptr_eq(other)
            || (self.0.position == other.0.position
                && self.0.type_ == other.0.type_
                && self.0.kind == other.0.kind)
    }
}

impl Debug for Node {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_sexp().pretty_print(100))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build;
    use crate::types::Constant;

    fn pos(line: u32) -> Position {
        Position::at(line, 1)
    }

    #[test]
    fn setters_return_the_same_node_when_nothing_changes() {
        let node = build::int(pos(1), 5);
        assert!(node.with_kind(node.kind().clone()).ptr_eq(&node));

        let typed = node.with_type(Type::int());
        assert!(!typed.ptr_eq(&node));
        assert!(typed.with_type(Type::int()).ptr_eq(&typed));
        assert_eq!(node.type_(), None);
        assert_eq!(typed.type_(), Some(&Type::int()));
    }

    #[test]
    fn updates_share_unchanged_children() {
        let left = build::local(pos(1), "x");
        let right = build::int(pos(1), 1);
        let sum = build::binary(pos(1), BinaryOp::Add, left.clone(), right.clone());

        let new_right = build::int(pos(1), 2);
        let kind = match sum.kind() {
            NodeKind::Binary(binary) => NodeKind::Binary(Binary {
                right: new_right.clone(),
                ..binary.clone()
            }),
            _ => unreachable!(),
        };
        let updated = sum.with_kind(kind);

        assert!(!updated.ptr_eq(&sum));
        assert!(updated.children()[0].ptr_eq(&left));
        assert!(updated.children()[1].ptr_eq(&new_right));
        assert!(sum.children()[1].ptr_eq(&right));
        assert_eq!(updated.position(), sum.position());
    }

    #[test]
    fn structural_equality_ignores_identity() {
        let a = build::lit(pos(3), Constant::Boolean(true));
        let b = build::lit(pos(3), Constant::Boolean(true));
        assert!(!a.ptr_eq(&b));
        assert_eq!(a, b);
        assert_ne!(a, b.with_type(Type::boolean()));
    }

    #[test]
    fn debug_output_is_the_sexp_dump() {
        let sum = build::binary(
            pos(1),
            BinaryOp::Add,
            build::local(pos(1), "x"),
            build::int(pos(1), 1).with_type(Type::int()),
        );
        let printed = format!("{:?}", sum);
        assert!(printed.starts_with("(binary"), "{}", printed);
        assert!(printed.contains("(lit 1 : int)"), "{}", printed);
    }
}
