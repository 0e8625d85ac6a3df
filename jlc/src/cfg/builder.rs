use super::{EdgeKey, Flow, FlowGraph, Peer, PeerKey, PeerKind};
use crate::ast::{AssignOp, BinaryOp, Branch, BranchKind, Node, NodeKind, NodeTag};
use crate::errors::{self, Abort, CompilationError, Diagnostics};
use crate::passes::exceptions::throw_types;
use crate::passes::Env;
use crate::types::Type;
use crate::visit::RuleTable;
use petgraph::prelude::*;
use std::cell::RefCell;
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;
use std::sync::Arc;
use tracing::{debug, trace};

/// Replaces the default flow of one node kind.
///
/// Receives the node and the edges entering it, and returns the edges leaving it when it
/// completes normally.
pub type CfgRule = fn(&mut CfgBuilder, &Node, Flow) -> Result<Flow, Abort>;

/// Where branches and exceptions leaving the current term go.
#[derive(Clone, Default)]
pub(super) struct Cursor {
    pub(super) frames: Option<Rc<FrameNode>>,
    pub(super) path: Rc<Vec<usize>>,
}

pub(super) struct FrameNode {
    pub(super) frame: Frame,
    parent: Option<Rc<FrameNode>>,
}

pub(super) enum Frame {
    /// A try statement with handlers for its try block. While the catch blocks themselves
    /// are built, `catches` is empty.
    Try {
        catches: Vec<(Type, Node)>,
        finally: Option<Node>,

        /// Path the catch blocks are built under.
        path: Rc<Vec<usize>>,

        /// Exceptions that leave through the finally block.
        escaping: RefCell<Vec<(NodeIndex, Type)>>,
    },

    /// A statement `break` or `continue` can leave.
    Target {
        node: Node,
        kind: TargetKind,
        label: Option<String>,
        breaks: RefCell<Flow>,
        continues: RefCell<Flow>,
    },
}

#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub(super) enum TargetKind {
    Loop,
    Switch,
    Labeled,
}

impl Frame {
    pub(super) fn target(node: &Node, kind: TargetKind, label: Option<String>) -> Frame {
        Frame::Target {
            node: node.clone(),
            kind,
            label,
            breaks: RefCell::default(),
            continues: RefCell::default(),
        }
    }

    /// Flows collected from `break` and `continue` statements.
    pub(super) fn take_jumps(&self) -> (Flow, Flow) {
        match self {
            Frame::Target {
                breaks, continues, ..
            } => (breaks.take(), continues.take()),
            Frame::Try { .. } => (Vec::new(), Vec::new()),
        }
    }

    pub(super) fn take_escaping(&self) -> Vec<(NodeIndex, Type)> {
        match self {
            Frame::Try { escaping, .. } => escaping.take(),
            Frame::Target { .. } => Vec::new(),
        }
    }
}

pub struct CfgBuilder {
    pub(super) env: Env,
    diagnostics: Diagnostics,
    rules: Rc<RuleTable<CfgRule>>,

    graph: DiGraph<Peer, EdgeKey>,
    peers: HashMap<PeerKey, NodeIndex>,
    pub(super) cursor: Cursor,

    /// Exit of the graph being built.
    exit: NodeIndex,
}

impl CfgBuilder {
    pub fn new(env: Env, diagnostics: Diagnostics) -> CfgBuilder {
        CfgBuilder {
            env,
            diagnostics,
            rules: Rc::new(RuleTable::new()),
            graph: DiGraph::new(),
            peers: HashMap::new(),
            cursor: Cursor::default(),
            exit: NodeIndex::end(),
        }
    }

    pub fn with_rules(self, rules: RuleTable<CfgRule>) -> CfgBuilder {
        CfgBuilder {
            rules: Rc::new(rules),
            ..self
        }
    }

    /// Builds a graph for every method, constructor, initializer and initialized field in
    /// `root`, or a single graph if `root` is itself a statement or expression.
    pub fn build(&mut self, root: &Node) -> Result<Vec<FlowGraph>, Abort> {
        let roots = if is_code(root) || super::is_term(root) {
            vec![root.clone()]
        } else {
            root.descendants().into_iter().filter(is_code).collect()
        };

        let mut graphs = Vec::with_capacity(roots.len());
        for root in roots {
            graphs.push(self.build_graph(&root)?);
        }
        debug!("built {} flow graphs", graphs.len());
        Ok(graphs)
    }

    fn build_graph(&mut self, root: &Node) -> Result<FlowGraph, Abort> {
        self.graph = DiGraph::new();
        self.peers.clear();
        self.cursor = Cursor::default();

        let entry = self.peer(root, PeerKind::Entry);
        let exit = self.peer(root, PeerKind::Exit);
        self.exit = exit;

        let body = match root.kind() {
            NodeKind::MethodDecl(decl) => decl.body.clone(),
            NodeKind::Initializer(initializer) => Some(initializer.body.clone()),
            NodeKind::FieldDecl(decl) => decl.init.clone(),
            _ => None,
        };
        if root.tag().is_code_decl() {
            let flow = match body {
                Some(ref body) => self.term(body, vec![(entry, EdgeKey::Other)])?,
                None => vec![(entry, EdgeKey::Other)],
            };
            self.connect(flow, exit);
        } else {
            self.term(root, Vec::new())?;
        }

        let graph = mem::take(&mut self.graph);
        trace!(
            "flow graph of {} at {} has {} peers",
            root.tag(),
            root.position(),
            graph.node_count()
        );
        Ok(FlowGraph::new(graph, root.clone(), entry, exit))
    }

    pub fn env(&self) -> &Env {
        &self.env
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    /// The peer of `node` in the code copy currently being built, created on first use.
    pub fn peer(&mut self, node: &Node, kind: PeerKind) -> NodeIndex {
        let path = Rc::clone(&self.cursor.path);
        self.peer_at(node, kind, path)
    }

    fn peer_at(&mut self, node: &Node, kind: PeerKind, path: Rc<Vec<usize>>) -> NodeIndex {
        let key = PeerKey {
            node: node.id(),
            kind,
            path: Rc::clone(&path),
        };
        let graph = &mut self.graph;
        *self.peers.entry(key).or_insert_with(|| {
            graph.add_node(Peer {
                node: node.clone(),
                kind,
                path,
            })
        })
    }

    pub fn connect(&mut self, flow: Flow, to: NodeIndex) {
        for (from, key) in flow {
            self.graph.add_edge(from, to, key);
        }
    }

    /// Builds `node` and everything below it, entered by `incoming`.
    pub fn term(&mut self, node: &Node, incoming: Flow) -> Result<Flow, Abort> {
        if let Some(rule) = self.rules.get(node.tag()) {
            return rule(self, node, incoming);
        }
        if is_short_circuit(node) {
            let (when_true, when_false) = self.condition(node, incoming)?;
            return Ok(when_true.into_iter().chain(when_false).collect());
        }

        let entry = self.peer(node, PeerKind::Entry);
        self.connect(incoming, entry);
        let flow = self.term_body(node, vec![(entry, EdgeKey::Other)])?;

        let exit = self.peer(node, PeerKind::Exit);
        let completes = !flow.is_empty();
        self.connect(flow, exit);
        if completes {
            self.raise(node, exit);
        }

        match node.kind() {
            NodeKind::Branch(branch) => {
                self.branch(node, branch, completes, exit)?;
                Ok(Vec::new())
            }
            NodeKind::Return(_) => {
                if completes {
                    self.escape(node, vec![(exit, EdgeKey::Other)], None)?;
                }
                Ok(Vec::new())
            }
            NodeKind::Throw(_) => Ok(Vec::new()),
            _ if completes => Ok(vec![(exit, EdgeKey::Other)]),
            _ => Ok(Vec::new()),
        }
    }

    /// Builds `nodes` one after another.
    pub fn chain<'a>(
        &mut self,
        nodes: impl IntoIterator<Item = &'a Node>,
        mut flow: Flow,
    ) -> Result<Flow, Abort> {
        for node in nodes {
            flow = self.term(node, flow)?;
        }
        Ok(flow)
    }

    /// Builds a boolean term and splits the edges leaving it by its value.
    pub fn condition(&mut self, node: &Node, incoming: Flow) -> Result<(Flow, Flow), Abort> {
        let binary = match node.kind() {
            NodeKind::Binary(binary)
                if binary.op.is_short_circuit() && self.rules.get(NodeTag::Binary).is_none() =>
            {
                binary.clone()
            }
            _ => {
                let flow = self.term(node, incoming)?;
                let when_true = rekey(&flow, EdgeKey::True);
                let when_false = rekey(&flow, EdgeKey::False);
                return Ok((when_true, when_false));
            }
        };

        let entry = self.peer(node, PeerKind::Entry);
        self.connect(incoming, entry);
        let (left_true, left_false) = self.condition(&binary.left, vec![(entry, EdgeKey::Other)])?;

        let conjunction = binary.op == BinaryOp::CondAnd;
        let (when_true, when_false) = if conjunction {
            let (right_true, right_false) = self.condition(&binary.right, left_true)?;
            (right_true, left_false.into_iter().chain(right_false).collect::<Flow>())
        } else {
            let (right_true, right_false) = self.condition(&binary.right, left_false)?;
            (left_true.into_iter().chain(right_true).collect::<Flow>(), right_false)
        };

        let exit = self.peer(node, PeerKind::Exit);
        let (can_be_true, can_be_false) = (!when_true.is_empty(), !when_false.is_empty());
        self.connect(when_true, exit);
        self.connect(when_false, exit);

        let out = |possible: bool, key: EdgeKey| {
            if possible {
                vec![(exit, key)]
            } else {
                Vec::new()
            }
        };
        Ok((out(can_be_true, EdgeKey::True), out(can_be_false, EdgeKey::False)))
    }

    /// Runs `f` with a different cursor.
    pub(super) fn at<T>(
        &mut self,
        cursor: Cursor,
        f: impl FnOnce(&mut CfgBuilder) -> Result<T, Abort>,
    ) -> Result<T, Abort> {
        let saved = mem::replace(&mut self.cursor, cursor);
        let result = f(self);
        self.cursor = saved;
        result
    }

    /// Runs `f` with `frame` pushed onto the cursor and returns the frame for inspection.
    pub(super) fn within<T>(
        &mut self,
        frame: Frame,
        f: impl FnOnce(&mut CfgBuilder) -> Result<T, Abort>,
    ) -> Result<(T, Rc<FrameNode>), Abort> {
        let frame = Rc::new(FrameNode {
            frame,
            parent: self.cursor.frames.clone(),
        });
        let cursor = Cursor {
            frames: Some(Rc::clone(&frame)),
            path: Rc::clone(&self.cursor.path),
        };
        let result = self.at(cursor, f)?;
        Ok((result, frame))
    }

    /// The current cursor with `id` appended to its path.
    pub(super) fn copy_cursor(&self, id: usize) -> Cursor {
        let mut path = (*self.cursor.path).clone();
        path.push(id);
        Cursor {
            frames: self.cursor.frames.clone(),
            path: Rc::new(path),
        }
    }

    /// Adds exception edges for everything `node` throws by itself.
    fn raise(&mut self, node: &Node, from: NodeIndex) {
        let types = Arc::clone(&self.env.types);
        let mut thrown = throw_types(node, types.as_ref());
        if let NodeKind::Assign(assign) = node.kind() {
            // The element access of an array store is not a term of its own.
            if assign.op == AssignOp::Assign && assign.left.tag() == NodeTag::ArrayAccess {
                thrown.extend(throw_types(&assign.left, types.as_ref()));
            }
        }

        let mut seen: Vec<Type> = Vec::new();
        for type_ in thrown {
            if !seen.contains(&type_) {
                seen.push(type_.clone());
                self.raise_type(from, type_);
            }
        }
    }

    /// Routes an exception thrown at `from` to the handlers that may catch it.
    pub(super) fn raise_type(&mut self, from: NodeIndex, type_: Type) {
        let types = Arc::clone(&self.env.types);
        let mut current = self.cursor.frames.clone();
        while let Some(frame) = current {
            if let Frame::Try {
                catches,
                finally,
                path,
                escaping,
            } = &frame.frame
            {
                for (caught, catch) in catches {
                    let always = types.is_subtype(&type_, caught);
                    if always || types.is_subtype(caught, &type_) {
                        let entry = self.peer_at(catch, PeerKind::Entry, Rc::clone(path));
                        self.graph
                            .add_edge(from, entry, EdgeKey::Exception(type_.clone()));
                        if always {
                            return;
                        }
                    }
                }
                if finally.is_some() {
                    escaping.borrow_mut().push((from, type_));
                    return;
                }
            }
            current = frame.parent.clone();
        }
        let exit = self.exit;
        self.graph.add_edge(from, exit, EdgeKey::Exception(type_));
    }

    fn branch(
        &mut self,
        node: &Node,
        branch: &Branch,
        completes: bool,
        exit: NodeIndex,
    ) -> Result<(), Abort> {
        match self.branch_target(branch, node) {
            Ok(target) => {
                if completes {
                    self.escape(node, vec![(exit, EdgeKey::Other)], Some(&target))?;
                }
                Ok(())
            }
            Err(error) => self.diagnostics.report(error),
        }
    }

    /// Finds the frame a `break` or `continue` leaves to.
    fn branch_target(&self, branch: &Branch, node: &Node) -> Result<Rc<FrameNode>, CompilationError> {
        let continues = branch.kind == BranchKind::Continue;
        let mut inner: Option<Rc<FrameNode>> = None;
        let mut current = self.cursor.frames.clone();

        while let Some(frame) = current {
            if let Frame::Target {
                node: target,
                kind,
                label,
                ..
            } = &frame.frame
            {
                match branch.label {
                    None if *kind == TargetKind::Loop => return Ok(Rc::clone(&frame)),
                    None if *kind == TargetKind::Switch && !continues => {
                        return Ok(Rc::clone(&frame))
                    }
                    Some(ref wanted) if label.as_ref() == Some(wanted) => {
                        if !continues {
                            return Ok(Rc::clone(&frame));
                        }
                        let labeled_loop = match (target.kind(), &inner) {
                            (NodeKind::Labeled(labeled), Some(inner)) => match inner.frame {
                                Frame::Target {
                                    node: ref looped,
                                    kind: TargetKind::Loop,
                                    ..
                                } if looped.ptr_eq(&labeled.statement) => Some(Rc::clone(inner)),
                                _ => None,
                            },
                            _ => None,
                        };
                        return labeled_loop
                            .ok_or_else(|| errors::continue_target_not_loop(wanted, node.position()));
                    }
                    _ => (),
                }
            }
            current = frame.parent.clone();
            inner = Some(frame);
        }

        Err(errors::branch_target_not_found(
            branch.kind.keyword(),
            branch.label.as_deref(),
            node.position(),
        ))
    }

    /// Leaves the current term by a jump, running the finally blocks on the way.
    ///
    /// `target` is the frame of the statement left by `break` or `continue`; a `return`
    /// leaves to the exit of the graph.
    fn escape(
        &mut self,
        jump: &Node,
        mut flow: Flow,
        target: Option<&Rc<FrameNode>>,
    ) -> Result<(), Abort> {
        let continues = match jump.kind() {
            NodeKind::Branch(branch) => branch.kind == BranchKind::Continue,
            _ => false,
        };
        let path = self.copy_cursor(jump.id()).path;

        let mut current = self.cursor.frames.clone();
        while let Some(frame) = current {
            if target.map_or(false, |target| Rc::ptr_eq(target, &frame)) {
                if let Frame::Target {
                    breaks,
                    continues: continuations,
                    ..
                } = &frame.frame
                {
                    let collected = if continues { continuations } else { breaks };
                    collected.borrow_mut().extend(flow);
                }
                return Ok(());
            }

            if let Frame::Try {
                finally: Some(finally),
                ..
            } = &frame.frame
            {
                let finally = finally.clone();
                let cursor = Cursor {
                    frames: frame.parent.clone(),
                    path: Rc::clone(&path),
                };
                flow = self.at(cursor, |builder| builder.term(&finally, flow))?;
                if flow.is_empty() {
                    return Ok(());
                }
            }
            current = frame.parent.clone();
        }

        let exit = self.exit;
        self.connect(flow, exit);
        Ok(())
    }
}

fn is_code(node: &Node) -> bool {
    match node.kind() {
        NodeKind::MethodDecl(decl) => decl.body.is_some(),
        NodeKind::Initializer(_) => true,
        NodeKind::FieldDecl(decl) => decl.init.is_some(),
        _ => false,
    }
}

fn is_short_circuit(node: &Node) -> bool {
    match node.kind() {
        NodeKind::Binary(binary) => binary.op.is_short_circuit(),
        _ => false,
    }
}

fn rekey(flow: &Flow, key: EdgeKey) -> Flow {
    flow.iter().map(|(from, _)| (*from, key.clone())).collect()
}
