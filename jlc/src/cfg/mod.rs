//! Control flow graphs of code bodies.
//!
//! Every term (expression or statement) gets an entry and an exit peer. Edges connect the
//! peers in evaluation order; conditions branch with `True`/`False` edges and thrown
//! exceptions leave with `Exception` edges towards matching catch blocks or the exit of the
//! graph. Finally blocks are duplicated once per way of entering them, and every copy is
//! told apart by its `path`.

mod builder;
pub mod init;
pub mod reach;
mod terms;

pub use builder::{CfgBuilder, CfgRule};

use crate::ast::{AssignOp, Node, NodeKind};
use crate::types::Type;
use petgraph::prelude::*;
use petgraph::visit::{depth_first_search, Control, DfsEvent};
use std::collections::HashMap;
use std::rc::Rc;

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum PeerKind {
    Entry,
    Exit,
}

/// One vertex of a flow graph: the entry or exit of a term, in one copy of its code.
#[derive(Clone, Debug)]
pub struct Peer {
    pub node: Node,
    pub kind: PeerKind,

    /// Identifies the copy of a finally block (and everything inside it) this peer is in.
    /// Empty outside of duplicated finally blocks.
    pub path: Rc<Vec<usize>>,
}

#[derive(Clone, PartialEq, Debug)]
pub enum EdgeKey {
    Other,
    True,
    False,
    Exception(Type),
}

/// Edges leaving the term built last, waiting for their target.
pub type Flow = Vec<(NodeIndex, EdgeKey)>;

#[derive(Clone, PartialEq, Eq, Hash)]
struct PeerKey {
    node: usize,
    kind: PeerKind,
    path: Rc<Vec<usize>>,
}

pub struct FlowGraph {
    graph: DiGraph<Peer, EdgeKey>,
    root: Node,
    entry: NodeIndex,
    exit: NodeIndex,

    /// Peers of every term in all copies, keyed by node identity.
    by_node: HashMap<(usize, PeerKind), Vec<NodeIndex>>,
    reachable: Vec<bool>,
}

impl FlowGraph {
    fn new(graph: DiGraph<Peer, EdgeKey>, root: Node, entry: NodeIndex, exit: NodeIndex) -> FlowGraph {
        let mut by_node: HashMap<(usize, PeerKind), Vec<NodeIndex>> = HashMap::new();
        for index in graph.node_indices() {
            let peer = &graph[index];
            by_node
                .entry((peer.node.id(), peer.kind))
                .or_default()
                .push(index);
        }

        let mut reachable = vec![false; graph.node_count()];
        depth_first_search(&graph, Some(entry), |event| {
            if let DfsEvent::Discover(index, _) = event {
                reachable[index.index()] = true;
            }
            Control::<()>::Continue
        });

        FlowGraph {
            graph,
            root,
            entry,
            exit,
            by_node,
            reachable,
        }
    }

    /// The code declaration (or bare term) the graph was built for.
    pub fn root(&self) -> &Node {
        &self.root
    }

    pub fn entry(&self) -> NodeIndex {
        self.entry
    }

    pub fn exit(&self) -> NodeIndex {
        self.exit
    }

    pub fn graph(&self) -> &DiGraph<Peer, EdgeKey> {
        &self.graph
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// The peer of `node` outside of any duplicated finally block.
    pub fn peer(&self, node: &Node, kind: PeerKind) -> Option<NodeIndex> {
        self.peers(node, kind)
            .iter()
            .copied()
            .find(|index| self.graph[*index].path.is_empty())
    }

    /// Peers of `node` in every copy of the code containing it.
    pub fn peers(&self, node: &Node, kind: PeerKind) -> &[NodeIndex] {
        self.by_node
            .get(&(node.id(), kind))
            .map_or(&[], Vec::as_slice)
    }

    /// Outgoing edges of a peer, in the order they were added.
    pub fn successors(&self, index: NodeIndex) -> Vec<(NodeIndex, &EdgeKey)> {
        let mut edges: Vec<_> = self.graph.edges(index).collect();
        edges.sort_by_key(|edge| edge.id().index());
        edges
            .into_iter()
            .map(|edge| (edge.target(), edge.weight()))
            .collect()
    }

    pub fn is_peer_reachable(&self, index: NodeIndex) -> bool {
        self.reachable[index.index()]
    }

    /// Whether control can reach `node` in any copy of its code.
    pub fn is_reachable(&self, node: &Node) -> bool {
        self.peers(node, PeerKind::Entry)
            .iter()
            .any(|index| self.is_peer_reachable(*index))
    }

    /// Whether evaluation of `node` can complete normally in any copy of its code.
    pub fn completes_normally(&self, node: &Node) -> bool {
        self.peers(node, PeerKind::Exit)
            .iter()
            .any(|index| self.is_peer_reachable(*index))
    }
}

/// Whether the flow graph builder makes `node` a term with its own peers.
pub(crate) fn is_term(node: &Node) -> bool {
    let tag = node.tag();
    tag.is_expression() || tag.is_statement() || node.is_error()
}

/// The first sub-term evaluated when evaluating `node`.
pub fn entry_term(node: &Node) -> Node {
    let first = match node.kind() {
        NodeKind::Assign(assign) if assign.op == AssignOp::Assign => match assign.left.kind() {
            NodeKind::ArrayAccess(access) => Some(&access.array),
            NodeKind::Field(field) if is_term(&field.target) => Some(&field.target),
            _ => Some(&assign.right),
        },
        NodeKind::Catch(catch) => Some(&catch.body),
        NodeKind::Case(_) => None,
        _ => node.children().into_iter().find(|child| is_term(child)),
    };
    first.map_or_else(|| node.clone(), entry_term)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::build;
    use crate::source::Position;

    fn pos(line: u32) -> Position {
        Position::at(line, 1)
    }

    #[test]
    fn entry_term_of_array_store_is_the_array() {
        let array = build::local(pos(1), "arr");
        let store = build::assign(
            pos(1),
            AssignOp::Assign,
            build::index(pos(1), array.clone(), build::local(pos(1), "idx")),
            build::int(pos(1), 5),
        );
        assert!(entry_term(&store).ptr_eq(&array));
    }

    #[test]
    fn entry_term_of_local_store_is_the_value() {
        let value = build::int(pos(1), 5);
        let store = build::assign(pos(1), AssignOp::Assign, build::local(pos(1), "x"), value.clone());
        assert!(entry_term(&store).ptr_eq(&value));

        let left = build::local(pos(1), "x");
        let compound = build::assign(pos(1), AssignOp::AddAssign, left.clone(), value);
        assert!(entry_term(&compound).ptr_eq(&left));
    }

    #[test]
    fn entry_term_skips_type_nodes() {
        let init = build::int(pos(1), 1);
        let decl = build::local_decl(pos(1), build::amb_type(pos(1), "int"), "x", Some(init.clone()));
        let block = build::block(pos(1), vec![decl]);
        assert!(entry_term(&block).ptr_eq(&init));

        let empty = build::block(pos(2), vec![]);
        assert!(entry_term(&empty).ptr_eq(&empty));
    }
}
