//! Definite assignment of locals.
//!
//! A forward dataflow over the flow graph computes, before every peer, the locals assigned on
//! every path from the entry (`must`) and on at least one path (`may`). Reads need the local
//! in `must`. A store to a final local needs it missing from `may`.

use super::{FlowGraph, Peer, PeerKind};
use crate::ast::{Node, NodeKind};
use crate::errors::{self, Abort, Diagnostics};
use crate::types::{LocalId, LocalInstance};
use petgraph::graph::NodeIndex;
use std::collections::{HashSet, VecDeque};
use tracing::trace;

#[derive(Clone, Default, Debug)]
struct Assigned {
    must: HashSet<LocalId>,
    may: HashSet<LocalId>,
}

impl Assigned {
    /// Joins the state of another incoming edge. Returns whether anything changed.
    fn merge(&mut self, other: &Assigned) -> bool {
        let before = (self.must.len(), self.may.len());
        self.must.retain(|id| other.must.contains(id));
        self.may.extend(other.may.iter().copied());
        before != (self.must.len(), self.may.len())
    }

    fn assign(&mut self, id: LocalId) {
        self.must.insert(id);
        self.may.insert(id);
    }

    fn reset(&mut self, id: LocalId) {
        self.must.remove(&id);
        self.may.remove(&id);
    }
}

enum Effect<'a> {
    Read(&'a LocalInstance),
    Store(&'a LocalInstance),

    /// A declaration, with whether it has an initializer. Every execution of a declaration
    /// starts its local over, which keeps declarations in loop bodies apart.
    Declare(&'a LocalInstance, bool),
    Nothing,
}

fn stored_local(node: &Node) -> Option<&LocalInstance> {
    match node.kind() {
        NodeKind::Local(local) => local.local.as_ref(),
        _ => None,
    }
}

fn effect(peer: &Peer) -> Effect<'_> {
    let found = match (peer.kind, peer.node.kind()) {
        (PeerKind::Entry, NodeKind::Local(local)) => local.local.as_ref().map(Effect::Read),
        (PeerKind::Exit, NodeKind::Assign(assign)) => {
            stored_local(&assign.left).map(Effect::Store)
        }
        (PeerKind::Exit, NodeKind::Unary(unary)) if unary.op.is_update() => {
            stored_local(&unary.operand).map(Effect::Store)
        }
        (PeerKind::Exit, NodeKind::LocalDecl(decl)) => decl
            .local
            .as_ref()
            .map(|local| Effect::Declare(local, decl.init.is_some())),
        _ => None,
    };
    found.unwrap_or(Effect::Nothing)
}

fn transfer(peer: &Peer, state: &Assigned) -> Assigned {
    let mut out = state.clone();
    match effect(peer) {
        Effect::Store(local) | Effect::Declare(local, true) => out.assign(local.id),
        Effect::Declare(local, false) => out.reset(local.id),
        Effect::Read(_) | Effect::Nothing => (),
    }
    out
}

/// State before every peer. `None` for peers control never reaches.
fn solve(graph: &FlowGraph) -> Vec<Option<Assigned>> {
    let mut states: Vec<Option<Assigned>> = vec![None; graph.node_count()];
    states[graph.entry().index()] = Some(Assigned::default());

    let mut work: VecDeque<NodeIndex> = VecDeque::new();
    work.push_back(graph.entry());
    let mut steps = 0usize;
    while let Some(index) = work.pop_front() {
        steps += 1;
        let out = match states[index.index()] {
            Some(ref state) => transfer(&graph.graph()[index], state),
            None => continue,
        };
        for (next, _) in graph.successors(index) {
            let changed = if let Some(state) = states[next.index()].as_mut() {
                state.merge(&out)
            } else {
                states[next.index()] = Some(out.clone());
                true
            };
            if changed {
                work.push_back(next);
            }
        }
    }
    trace!("definite assignment settled after {} steps", steps);
    states
}

/// Reports reads of locals that might not have been assigned yet, and stores to final locals
/// that might already have been assigned.
///
/// Locals declared outside the graph (formals, catch parameters) are always assigned.
pub fn check_definite_assignment(
    graph: &FlowGraph,
    diagnostics: &Diagnostics,
) -> Result<(), Abort> {
    let declared: HashSet<LocalId> = graph
        .graph()
        .node_weights()
        .filter_map(|peer| match peer.node.kind() {
            NodeKind::LocalDecl(decl) => decl.local.as_ref().map(|local| local.id),
            _ => None,
        })
        .collect();
    let states = solve(graph);

    // Copies of finally blocks share their nodes.
    let mut reported: HashSet<usize> = HashSet::new();
    for index in graph.graph().node_indices() {
        let state = match states[index.index()] {
            Some(ref state) => state,
            None => continue,
        };
        let peer = &graph.graph()[index];
        let error = match effect(peer) {
            Effect::Read(local)
                if declared.contains(&local.id) && !state.must.contains(&local.id) =>
            {
                errors::variable_not_initialized(&local.name, peer.node.position())
            }
            Effect::Store(local)
                if local.flags.is_final()
                    && (!declared.contains(&local.id) || state.may.contains(&local.id)) =>
            {
                errors::final_variable_reassigned(&local.name, peer.node.position())
            }
            _ => continue,
        };
        if reported.insert(peer.node.id()) {
            diagnostics.report(error)?;
        }
    }
    Ok(())
}
