//! Evaluation order and branching of each node kind.

use super::builder::{CfgBuilder, Frame, TargetKind};
use super::{is_term, EdgeKey, Flow, PeerKind};
use crate::ast::*;
use crate::errors::Abort;
use crate::passes::exceptions::caught_type;
use crate::passes::type_check::constants::is_constant_true;
use crate::types::Type;
use petgraph::graph::NodeIndex;

impl CfgBuilder {
    /// Builds the sub-terms of `node` and returns the flow reaching its exit.
    pub(super) fn term_body(&mut self, node: &Node, flow: Flow) -> Result<Flow, Abort> {
        match node.kind() {
            NodeKind::Assign(assign) => self.assign(assign, flow),
            NodeKind::Conditional(conditional) => {
                let (when_true, when_false) = self.condition(&conditional.cond, flow)?;
                let mut flow = self.term(&conditional.consequent, when_true)?;
                flow.extend(self.term(&conditional.alternative, when_false)?);
                Ok(flow)
            }
            NodeKind::If(if_) => {
                let (when_true, when_false) = self.condition(&if_.cond, flow)?;
                let mut flow = self.term(&if_.consequent, when_true)?;
                match if_.alternative {
                    Some(ref alternative) => flow.extend(self.term(alternative, when_false)?),
                    None => flow.extend(when_false),
                }
                Ok(flow)
            }
            NodeKind::While(while_) => self.while_(node, while_, flow),
            NodeKind::Do(do_) => self.do_(node, do_, flow),
            NodeKind::For(for_) => self.for_(node, for_, flow),
            NodeKind::Labeled(labeled) => {
                let frame = Frame::target(node, TargetKind::Labeled, Some(labeled.label.clone()));
                let (mut flow, frame) =
                    self.within(frame, |builder| builder.term(&labeled.statement, flow))?;
                flow.extend(frame.frame.take_jumps().0);
                Ok(flow)
            }
            NodeKind::Switch(switch) => self.switch(node, switch, flow),
            NodeKind::Try(try_) => self.try_(node, try_, flow),
            NodeKind::Catch(catch) => self.term(&catch.body, flow),
            NodeKind::Case(_) => Ok(flow),
            _ => {
                let children: Vec<Node> = node
                    .children()
                    .into_iter()
                    .filter(|child| is_term(child))
                    .cloned()
                    .collect();
                self.chain(&children, flow)
            }
        }
    }

    /// A plain store evaluates only the parts of its left side that locate the variable.
    fn assign(&mut self, assign: &Assign, flow: Flow) -> Result<Flow, Abort> {
        let mut parts: Vec<&Node> = Vec::new();
        if assign.op == AssignOp::Assign {
            match assign.left.kind() {
                NodeKind::ArrayAccess(access) => {
                    parts.push(&access.array);
                    parts.push(&access.index);
                }
                NodeKind::Field(field) if is_term(&field.target) => parts.push(&field.target),
                NodeKind::Field(_) | NodeKind::Local(_) => (),
                _ => parts.push(&assign.left),
            }
        } else {
            parts.push(&assign.left);
        }
        parts.push(&assign.right);
        self.chain(parts, flow)
    }

    fn while_(&mut self, node: &Node, while_: &While, flow: Flow) -> Result<Flow, Abort> {
        let (when_true, mut when_false) = self.condition(&while_.cond, flow)?;
        if is_constant_true(&while_.cond) {
            when_false.clear();
        }

        let frame = Frame::target(node, TargetKind::Loop, None);
        let (mut body, frame) = self.within(frame, |builder| builder.term(&while_.body, when_true))?;
        let (breaks, continues) = frame.frame.take_jumps();
        body.extend(continues);

        let head = self.peer(&while_.cond, PeerKind::Entry);
        self.connect(body, head);
        when_false.extend(breaks);
        Ok(when_false)
    }

    fn do_(&mut self, node: &Node, do_: &Do, flow: Flow) -> Result<Flow, Abort> {
        let frame = Frame::target(node, TargetKind::Loop, None);
        let (mut body, frame) = self.within(frame, |builder| builder.term(&do_.body, flow))?;
        let (breaks, continues) = frame.frame.take_jumps();
        body.extend(continues);

        let (when_true, mut when_false) = self.condition(&do_.cond, body)?;
        if is_constant_true(&do_.cond) {
            when_false.clear();
        }
        let head = self.peer(&do_.body, PeerKind::Entry);
        self.connect(when_true, head);
        when_false.extend(breaks);
        Ok(when_false)
    }

    fn for_(&mut self, node: &Node, for_: &For, flow: Flow) -> Result<Flow, Abort> {
        let flow = self.chain(&for_.inits, flow)?;
        let (when_true, mut when_false) = match for_.cond {
            Some(ref cond) => {
                let (when_true, mut when_false) = self.condition(cond, flow)?;
                if is_constant_true(cond) {
                    when_false.clear();
                }
                (when_true, when_false)
            }
            None => (flow, Vec::new()),
        };

        let frame = Frame::target(node, TargetKind::Loop, None);
        let (mut body, frame) = self.within(frame, |builder| builder.term(&for_.body, when_true))?;
        let (breaks, continues) = frame.frame.take_jumps();
        body.extend(continues);

        let updated = self.chain(&for_.updates, body)?;
        let head = match for_.cond {
            Some(ref cond) => self.peer(cond, PeerKind::Entry),
            None => self.peer(&for_.body, PeerKind::Entry),
        };
        self.connect(updated, head);
        when_false.extend(breaks);
        Ok(when_false)
    }

    /// Every case label is entered from the selector; blocks fall through to the next one.
    fn switch(&mut self, node: &Node, switch: &Switch, flow: Flow) -> Result<Flow, Abort> {
        let selector = self.term(&switch.expr, flow)?;

        let frame = Frame::target(node, TargetKind::Switch, None);
        let ((mut flow, has_default), frame) = self.within(frame, |builder| {
            let mut flow = Vec::new();
            let mut has_default = false;
            for element in &switch.elements {
                if let NodeKind::Case(case) = element.kind() {
                    has_default |= case.expr.is_none();
                    flow.extend(selector.iter().cloned());
                }
                flow = builder.term(element, flow)?;
            }
            Ok((flow, has_default))
        })?;

        if !has_default {
            flow.extend(selector);
        }
        flow.extend(frame.frame.take_jumps().0);
        Ok(flow)
    }

    fn try_(&mut self, node: &Node, try_: &Try, flow: Flow) -> Result<Flow, Abort> {
        let catches: Vec<(Type, Node)> = try_
            .catches
            .iter()
            .filter_map(|catch| caught_type(catch).map(|type_| (type_, catch.clone())))
            .collect();
        let path = self.cursor.path.clone();

        let guarded = Frame::Try {
            catches,
            finally: try_.finally.clone(),
            path: path.clone(),
            escaping: Default::default(),
        };
        let (mut normal, guarded) =
            self.within(guarded, |builder| builder.term(&try_.try_block, flow))?;

        let handlers = Frame::Try {
            catches: Vec::new(),
            finally: try_.finally.clone(),
            path,
            escaping: Default::default(),
        };
        let (handled, handlers) = self.within(handlers, |builder| {
            let mut flow = Vec::new();
            for catch in &try_.catches {
                flow.extend(builder.term(catch, Vec::new())?);
            }
            Ok(flow)
        })?;
        normal.extend(handled);

        let finally = match try_.finally {
            Some(ref finally) => finally,
            None => return Ok(normal),
        };

        let mut escaping = guarded.frame.take_escaping();
        escaping.extend(handlers.frame.take_escaping());
        if !escaping.is_empty() {
            self.exceptional_finally(node, finally, escaping)?;
        }
        self.term(finally, normal)
    }

    /// Builds the copy of a finally block run while exceptions propagate, and lets the
    /// exceptions continue once it completes.
    fn exceptional_finally(
        &mut self,
        try_: &Node,
        finally: &Node,
        escaping: Vec<(NodeIndex, Type)>,
    ) -> Result<(), Abort> {
        let cursor = self.copy_cursor(try_.id());
        let (entry, completed) = self.at(cursor, |builder| {
            let entry = builder.peer(finally, PeerKind::Entry);
            let completed = builder.term(finally, Vec::new())?;
            Ok((entry, completed))
        })?;

        let mut types: Vec<Type> = Vec::new();
        for (from, type_) in escaping {
            self.connect(vec![(from, EdgeKey::Exception(type_.clone()))], entry);
            if !types.contains(&type_) {
                types.push(type_);
            }
        }

        for (from, _) in completed {
            for type_ in &types {
                self.raise_type(from, type_.clone());
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::super::{entry_term, FlowGraph};
    use super::*;
    use crate::errors::{CompilationError, Diagnostics, ErrorKind};
    use crate::options::ErrorPolicy;
    use crate::passes::disambiguate::Disambiguator;
    use crate::passes::type_check::TypeChecker;
    use crate::passes::Env;
    use crate::source::Position;
    use crate::types::{ClassTable, ClassType, Constant, Flags, Package, StandardTypeSystem};
    use std::sync::Arc;

    fn pos(line: u32) -> Position {
        Position::at(line, 1)
    }

    /// Resolves and type checks `tree`, then builds its flow graphs.
    fn analyze_with(table: ClassTable, tree: &Node) -> (Node, Vec<FlowGraph>, Vec<CompilationError>) {
        let types = StandardTypeSystem::new(&table).unwrap();
        let env = Env::new(Arc::new(table), Arc::new(types));
        let diagnostics = Diagnostics::new(ErrorPolicy::Collect);
        let tree = Disambiguator::new(env.clone(), diagnostics.clone())
            .run(tree)
            .unwrap();
        let tree = TypeChecker::new(env.clone(), diagnostics.clone())
            .run(&tree)
            .unwrap();
        assert!(!diagnostics.has_errors(), "{:?}", diagnostics.snapshot());
        let graphs = CfgBuilder::new(env, diagnostics.clone())
            .build(&tree)
            .unwrap();
        (tree, graphs, diagnostics.into_vec())
    }

    fn analyze(tree: &Node) -> (Node, Vec<FlowGraph>, Vec<CompilationError>) {
        analyze_with(ClassTable::with_core_classes(), tree)
    }

    fn worker_table() -> ClassTable {
        let mut table = ClassTable::with_core_classes();
        table.add_class(&ClassType::builder("app.Worker").build());
        table.set_package("app");
        table
    }

    /// `package app; class Worker { <members> }`
    fn in_worker(members: Vec<Node>) -> Node {
        let class = build::class_decl(pos(1), Flags::NONE, "Worker", None, vec![], members);
        let package = build::package(pos(1), Package::new("app"));
        build::source_file(pos(1), Some(package), vec![], vec![class])
    }

    fn void_method(line: u32, name: &str, flags: Flags, body: Option<Node>) -> Node {
        build::method_decl(
            pos(line),
            flags,
            Some(build::canonical(pos(line), Type::void())),
            name,
            vec![],
            vec![],
            body,
        )
    }

    fn find(tree: &Node, tag: NodeTag) -> Node {
        tree.descendants()
            .into_iter()
            .find(|node| node.tag() == tag)
            .unwrap()
    }

    fn int_decl(line: u32, name: &str, value: i32) -> Node {
        build::local_decl(
            pos(line),
            build::amb_type(pos(line), "int"),
            name,
            Some(build::int(pos(line), value)),
        )
    }

    fn name(line: u32, name: &str) -> Node {
        build::amb_expr(pos(line), name)
    }

    /// Follows `Other` edges from the entry of `from` to its exit, listing the terms whose
    /// evaluation finishes on the way.
    fn evaluation_order(graph: &FlowGraph, from: &Node) -> Vec<Node> {
        let exit = graph.peer(from, PeerKind::Exit).unwrap();
        let mut current = graph.peer(from, PeerKind::Entry).unwrap();
        let mut order = Vec::new();
        while current != exit {
            current = graph
                .successors(current)
                .into_iter()
                .find(|(_, key)| **key == EdgeKey::Other)
                .map(|(next, _)| next)
                .unwrap();
            let peer = &graph.graph()[current];
            if peer.kind == PeerKind::Exit {
                order.push(peer.node.clone());
            }
        }
        order
    }

    #[test]
    fn array_stores_evaluate_array_then_index_then_value() {
        // int[] arr = {1}; int idx = 0; arr[idx] = 5;
        let array_type = build::array_type(pos(1), build::amb_type(pos(1), "int"));
        let tree = build::block(
            pos(1),
            vec![
                build::local_decl(
                    pos(1),
                    array_type,
                    "arr",
                    Some(build::array_init(pos(1), vec![build::int(pos(1), 1)])),
                ),
                int_decl(2, "idx", 0),
                build::eval(
                    pos(3),
                    build::assign(
                        pos(3),
                        AssignOp::Assign,
                        build::index(pos(3), name(3, "arr"), name(3, "idx")),
                        build::int(pos(3), 5),
                    ),
                ),
            ],
        );
        let (tree, graphs, _) = analyze(&tree);
        let store = find(&tree, NodeTag::Assign);
        let (array, index, value) = match store.kind() {
            NodeKind::Assign(assign) => match assign.left.kind() {
                NodeKind::ArrayAccess(access) => {
                    (access.array.clone(), access.index.clone(), assign.right.clone())
                }
                _ => unreachable!(),
            },
            _ => unreachable!(),
        };

        assert!(entry_term(&store).ptr_eq(&array));
        let order = evaluation_order(&graphs[0], &store);
        assert_eq!(order.len(), 4);
        assert!(order[0].ptr_eq(&array));
        assert!(order[1].ptr_eq(&index));
        assert!(order[2].ptr_eq(&value));
        assert!(order[3].ptr_eq(&store));
    }

    #[test]
    fn local_stores_evaluate_only_the_value() {
        // int x = 1; x = 2; x += 3;
        let tree = build::block(
            pos(1),
            vec![
                int_decl(1, "x", 1),
                build::eval(
                    pos(2),
                    build::assign(pos(2), AssignOp::Assign, name(2, "x"), build::int(pos(2), 2)),
                ),
                build::eval(
                    pos(3),
                    build::assign(pos(3), AssignOp::AddAssign, name(3, "x"), build::int(pos(3), 3)),
                ),
            ],
        );
        let (tree, graphs, _) = analyze(&tree);
        let stores: Vec<Node> = tree
            .descendants()
            .into_iter()
            .filter(|node| node.tag() == NodeTag::Assign)
            .collect();

        let plain = evaluation_order(&graphs[0], &stores[0]);
        assert_eq!(plain.len(), 2);
        assert_eq!(plain[0].tag(), NodeTag::Lit);

        let compound = evaluation_order(&graphs[0], &stores[1]);
        assert_eq!(compound.len(), 3);
        assert_eq!(compound[0].tag(), NodeTag::Local);
        assert_eq!(compound[1].tag(), NodeTag::Lit);
    }

    #[test]
    fn short_circuit_operators_branch_on_each_operand() {
        // boolean a = true; if (a && a) {}
        let tree = build::block(
            pos(1),
            vec![
                build::local_decl(
                    pos(1),
                    build::amb_type(pos(1), "boolean"),
                    "a",
                    Some(build::boolean(pos(1), true)),
                ),
                build::if_(
                    pos(2),
                    build::binary(pos(2), BinaryOp::CondAnd, name(2, "a"), name(2, "a")),
                    build::block(pos(2), vec![]),
                    None,
                ),
            ],
        );
        let (tree, graphs, _) = analyze(&tree);
        let graph = &graphs[0];
        let and = find(&tree, NodeTag::Binary);
        let left = and.children()[0].clone();

        let left_exit = graph.peer(&left, PeerKind::Exit).unwrap();
        let keys: Vec<EdgeKey> = graph
            .successors(left_exit)
            .into_iter()
            .map(|(_, key)| key.clone())
            .collect();
        assert_eq!(keys, vec![EdgeKey::True, EdgeKey::False]);

        let and_exit = graph.peer(&and, PeerKind::Exit).unwrap();
        let keys: Vec<EdgeKey> = graph
            .successors(and_exit)
            .into_iter()
            .map(|(_, key)| key.clone())
            .collect();
        assert_eq!(keys, vec![EdgeKey::True, EdgeKey::False]);
    }

    #[test]
    fn code_after_infinite_loops_is_unreachable_without_break() {
        let endless = build::while_(pos(1), build::boolean(pos(1), true), build::block(pos(1), vec![]));
        let after = build::empty(pos(2));
        let tree = build::block(pos(1), vec![endless, after]);
        let (tree, graphs, _) = analyze(&tree);
        let statements = tree.children();
        assert!(graphs[0].is_reachable(statements[0]));
        assert!(!graphs[0].is_reachable(statements[1]));

        let breaking = build::while_(
            pos(1),
            build::boolean(pos(1), true),
            build::block(pos(1), vec![build::break_(pos(1), None)]),
        );
        let tree = build::block(pos(1), vec![breaking, build::empty(pos(2))]);
        let (tree, graphs, _) = analyze(&tree);
        assert!(graphs[0].is_reachable(tree.children()[1]));
    }

    #[test]
    fn continue_returns_to_the_loop_condition() {
        // boolean c = true; while (c) { continue; }
        let tree = build::block(
            pos(1),
            vec![
                build::local_decl(
                    pos(1),
                    build::amb_type(pos(1), "boolean"),
                    "c",
                    Some(build::boolean(pos(1), true)),
                ),
                build::while_(
                    pos(2),
                    name(2, "c"),
                    build::block(pos(2), vec![build::continue_(pos(2), None)]),
                ),
            ],
        );
        let (tree, graphs, _) = analyze(&tree);
        let graph = &graphs[0];
        let cond = find(&tree, NodeTag::While).children()[0].clone();
        let branch = find(&tree, NodeTag::Branch);

        let branch_exit = graph.peer(&branch, PeerKind::Exit).unwrap();
        let head = graph.peer(&cond, PeerKind::Entry).unwrap();
        assert!(graph
            .successors(branch_exit)
            .iter()
            .any(|(target, key)| *target == head && **key == EdgeKey::Other));
    }

    #[test]
    fn switch_blocks_fall_through() {
        // int k = 1; switch (k) { case 1: k = 2; case 2: k = 3; break; }
        let store = |line: u32, value: i32| {
            build::eval(
                pos(line),
                build::assign(pos(line), AssignOp::Assign, name(line, "k"), build::int(pos(line), value)),
            )
        };
        let tree = build::block(
            pos(1),
            vec![
                int_decl(1, "k", 1),
                build::switch(
                    pos(2),
                    name(2, "k"),
                    vec![
                        build::case(pos(3), Some(build::int(pos(3), 1))),
                        build::switch_block(pos(3), vec![store(3, 2)]),
                        build::case(pos(4), Some(build::int(pos(4), 2))),
                        build::switch_block(pos(4), vec![store(4, 3), build::break_(pos(4), None)]),
                    ],
                ),
                build::empty(pos(5)),
            ],
        );
        let (tree, graphs, _) = analyze(&tree);
        let graph = &graphs[0];
        let switch = find(&tree, NodeTag::Switch);
        let elements: Vec<Node> = switch.children().into_iter().skip(1).cloned().collect();

        let first_block_exit = graph.peer(&elements[1], PeerKind::Exit).unwrap();
        let second_case = graph.peer(&elements[2], PeerKind::Entry).unwrap();
        assert!(graph
            .successors(first_block_exit)
            .iter()
            .any(|(target, _)| *target == second_case));
        assert!(graph.is_reachable(tree.children()[2]));
    }

    #[test]
    fn exceptions_reach_matching_catch_blocks() {
        // try { throw new java.io.IOException(); } catch (java.io.IOException e) {}
        let type_node = build::amb_dotted(pos(2), AmbiguityRole::TypeNode, "java.io.IOException");
        let tree = build::try_(
            pos(1),
            build::block(
                pos(1),
                vec![build::throw(
                    pos(1),
                    build::new(
                        pos(1),
                        build::amb_dotted(pos(1), AmbiguityRole::TypeNode, "java.io.IOException"),
                        vec![],
                    ),
                )],
            ),
            vec![build::catch(
                pos(2),
                build::formal(pos(2), type_node, "e"),
                build::block(pos(2), vec![]),
            )],
            None,
        );
        let (tree, graphs, _) = analyze(&tree);
        let graph = &graphs[0];
        let throw = find(&tree, NodeTag::Throw);
        let catch = find(&tree, NodeTag::Catch);

        let throw_exit = graph.peer(&throw, PeerKind::Exit).unwrap();
        let catch_entry = graph.peer(&catch, PeerKind::Entry).unwrap();
        let edges = graph.successors(throw_exit);
        assert!(edges.iter().any(|(target, key)| {
            *target == catch_entry
                && match key {
                    EdgeKey::Exception(type_) => type_.is_class_named("java.io.IOException"),
                    _ => false,
                }
        }));
        // Errors are not caught and leave the graph.
        assert!(edges.iter().any(|(target, _)| *target == graph.exit()));
        assert!(graph.is_reachable(&catch));
    }

    #[test]
    fn finally_blocks_are_copied_for_returns_and_exceptions() {
        // void m() { try { return; } finally { ; } }
        let finally = build::block(pos(3), vec![build::empty(pos(3))]);
        let statement = build::try_(
            pos(3),
            build::block(pos(3), vec![build::return_(pos(3), None)]),
            vec![],
            Some(finally),
        );
        let body = build::block(pos(2), vec![statement]);
        let tree = in_worker(vec![void_method(2, "m", Flags::NONE, Some(body))]);
        let (tree, graphs, _) = analyze_with(worker_table(), &tree);
        let graph = &graphs[0];
        let finally = match find(&tree, NodeTag::Try).kind() {
            NodeKind::Try(try_) => try_.finally.clone().unwrap(),
            _ => unreachable!(),
        };

        // The normal copy, one for the return and one for exceptions (`Error` from `return`).
        assert_eq!(graph.peers(&finally, PeerKind::Entry).len(), 3);
        assert!(graph.is_reachable(&finally));
        let normal = graph.peer(&finally, PeerKind::Entry).unwrap();
        assert!(!graph.is_peer_reachable(normal));
    }

    #[test]
    fn invalid_branch_targets_are_reported() {
        let loop_body = build::block(pos(2), vec![build::continue_(pos(2), Some("outer"))]);
        let tree = build::block(
            pos(1),
            vec![
                build::break_(pos(1), None),
                build::labeled(
                    pos(2),
                    "outer",
                    build::block(
                        pos(2),
                        vec![build::while_(pos(2), build::boolean(pos(2), true), loop_body)],
                    ),
                ),
                build::labeled(
                    pos(3),
                    "again",
                    build::while_(
                        pos(3),
                        build::boolean(pos(3), true),
                        build::block(pos(3), vec![build::continue_(pos(3), Some("again"))]),
                    ),
                ),
            ],
        );
        let (_, _, errors) = analyze(&tree);
        let kinds: Vec<ErrorKind> = errors.iter().map(|error| error.kind).collect();
        assert_eq!(
            kinds,
            vec![ErrorKind::InvalidBranchTarget, ErrorKind::InvalidBranchTarget]
        );
        assert_eq!(errors[0].message, "`break` outside of a loop or switch");
        assert_eq!(errors[1].message, "label `outer` does not name a loop");
    }

    #[test]
    fn code_bodies_get_their_own_graphs() {
        let field = build::field_decl(
            pos(2),
            Flags::NONE,
            build::amb_type(pos(2), "int"),
            "size",
            Some(build::lit(pos(2), Constant::Int(3))),
        );
        let method = void_method(3, "run", Flags::NONE, Some(build::block(pos(3), vec![])));
        let abstract_method = void_method(4, "stop", Flags::ABSTRACT, None);
        let tree = in_worker(vec![field, method, abstract_method]);
        let (_, graphs, _) = analyze_with(worker_table(), &tree);
        let roots: Vec<NodeTag> = graphs.iter().map(|graph| graph.root().tag()).collect();
        assert_eq!(roots, vec![NodeTag::FieldDecl, NodeTag::MethodDecl]);
        assert!(graphs[1].is_peer_reachable(graphs[1].exit()));
    }
}
