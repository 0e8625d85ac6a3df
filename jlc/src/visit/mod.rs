//! Framework for tree rewriting passes.
//!
//! A pass is a `Visitor`. For every node, `visit` asks the visitor whether it wants to
//! handle the whole subtree itself (`override_node`); otherwise it derives a visitor for the
//! children (`enter`), rewrites the children in source order, and hands the rebuilt node to
//! `leave` together with the child visitor, which is how information flows upwards.
//!
//! Visitors are cloned on entry, so any state that must outlive a subtree (reported errors,
//! counters) has to live behind a shared handle.

mod rules;

pub use rules::RuleTable;

use crate::ast::Node;
use crate::errors::Abort;

pub trait Visitor: Clone {
    /// Replaces the whole subtree of `node` without visiting its children.
    fn override_node(&mut self, _node: &Node) -> Result<Option<Node>, Abort> {
        Ok(None)
    }

    /// Returns the visitor used for the children of `node`.
    fn enter(&mut self, _node: &Node) -> Result<Self, Abort> {
        Ok(self.clone())
    }

    /// Called on the child visitor after each child has been rewritten, so that declarations
    /// become visible to the following siblings.
    fn add_decls(&mut self, _child: &Node) -> Result<(), Abort> {
        Ok(())
    }

    /// Finishes `old`, whose rewritten form (with rewritten children) is `new`.
    fn leave(&mut self, _old: &Node, new: Node, _inner: Self) -> Result<Node, Abort> {
        Ok(new)
    }
}

/// Runs `visitor` over the subtree of `node` and returns the rewritten subtree.
///
/// Unchanged subtrees are returned as they were, so the result shares every untouched node
/// with the input.
pub fn visit<V: Visitor>(node: &Node, visitor: &mut V) -> Result<Node, Abort> {
    if let Some(replacement) = visitor.override_node(node)? {
        return Ok(replacement);
    }
    let mut inner = visitor.enter(node)?;
    let rebuilt = visit_children(node, &mut inner)?;
    visitor.leave(node, rebuilt, inner)
}

/// Rewrites the children of `node` with `visitor`, without calling any hook for `node`
/// itself.
pub fn visit_children<V: Visitor>(node: &Node, visitor: &mut V) -> Result<Node, Abort> {
    let rebuilt = node.kind().map_children::<Abort>(&mut |child: &Node| {
        let child = visit(child, visitor)?;
        visitor.add_decls(&child)?;
        Ok(child)
    })?;
    Ok(match rebuilt {
        Some(kind) => node.with_kind(kind),
        None => node.clone(),
    })
}
