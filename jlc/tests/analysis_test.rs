//! End-to-end tests running whole compilation units through the pipeline.

use jlc::ast::{build, AmbiguityRole, AssignOp, BinaryOp, Node, NodeKind, NodeTag};
use jlc::cfg::{entry_term, EdgeKey, FlowGraph, PeerKind};
use jlc::errors::{Diagnostics, ErrorKind};
use jlc::options::{CompilerOptions, ErrorPolicy};
use jlc::passes::disambiguate::Disambiguator;
use jlc::passes::Env;
use jlc::pipeline::{Compilation, Pipeline};
use jlc::source::Position;
use jlc::types::{ClassTable, ClassType, Flags, StandardTypeSystem, Type};
use speculate::speculate;
use std::sync::Arc;

fn pos(line: u32) -> Position {
    Position::at(line, 1)
}

fn name(line: u32, name: &str) -> Node {
    build::amb_expr(pos(line), name)
}

fn compile_with(table: ClassTable, options: CompilerOptions, tree: &Node) -> Compilation {
    let types = StandardTypeSystem::new(&table).unwrap();
    Pipeline::new(Arc::new(table), Arc::new(types))
        .with_options(options)
        .run(tree)
        .unwrap()
}

fn compile(tree: &Node) -> Compilation {
    compile_with(ClassTable::with_core_classes(), CompilerOptions::default(), tree)
}

fn kinds(compilation: &Compilation) -> Vec<ErrorKind> {
    compilation.diagnostics.iter().map(|error| error.kind).collect()
}

fn find(tree: &Node, tag: NodeTag) -> Vec<Node> {
    tree.descendants()
        .into_iter()
        .filter(|node| node.tag() == tag)
        .collect()
}

fn point_table() -> ClassTable {
    let mut table = ClassTable::with_core_classes();
    table.add_class(
        &ClassType::builder("geo.Point")
            .field("x", Type::int(), Flags::PUBLIC)
            .build(),
    );
    table.set_package("geo");
    table
}

/// `int x = 5; x = x + 1;`
fn increment() -> Node {
    build::block(
        pos(1),
        vec![
            build::local_decl(
                pos(1),
                build::amb_type(pos(1), "int"),
                "x",
                Some(build::int(pos(1), 5)),
            ),
            build::eval(
                pos(2),
                build::assign(
                    pos(2),
                    AssignOp::Assign,
                    name(2, "x"),
                    build::binary(pos(2), BinaryOp::Add, name(2, "x"), build::int(pos(2), 1)),
                ),
            ),
        ],
    )
}

/// Terms whose evaluation finishes between the entry and the exit of `from`, in order.
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

speculate! {
    describe "locals" {
        it "resolves every use to the declared local and types it int" {
            let compilation = compile(&increment());
            assert!(compilation.diagnostics.is_empty(), "{:?}", compilation.diagnostics);

            let declared = match find(&compilation.tree, NodeTag::LocalDecl)[0].kind() {
                NodeKind::LocalDecl(decl) => decl.local.clone().unwrap(),
                _ => unreachable!(),
            };
            let uses = find(&compilation.tree, NodeTag::Local);
            assert_eq!(uses.len(), 2);
            for node in uses {
                assert_eq!(node.type_(), Some(&Type::int()));
                match node.kind() {
                    NodeKind::Local(local) => assert_eq!(local.local.as_ref(), Some(&declared)),
                    _ => unreachable!(),
                }
            }
        }

        it "reports initializers of the wrong type at the declaration" {
            // int y = true;
            let tree = build::block(
                pos(1),
                vec![build::local_decl(
                    pos(3),
                    build::amb_type(pos(3), "int"),
                    "y",
                    Some(build::boolean(pos(3), true)),
                )],
            );
            let compilation = compile(&tree);
            assert_eq!(kinds(&compilation), vec![ErrorKind::TypeMismatch]);
            assert_eq!(compilation.diagnostics[0].location, Some(pos(3)));
        }

        it "reports a local read in its own initializer" {
            // int y = y;
            let tree = build::block(
                pos(1),
                vec![build::local_decl(
                    pos(2),
                    build::amb_type(pos(2), "int"),
                    "y",
                    Some(name(2, "y")),
                )],
            );
            let compilation = compile(&tree);
            assert_eq!(kinds(&compilation), vec![ErrorKind::UnassignedVariable]);
            assert_eq!(compilation.diagnostics[0].location, Some(pos(2)));
            assert_eq!(find(&compilation.tree, NodeTag::Local).len(), 1);
        }
    }

    describe "casts" {
        it "accepts narrowing an Object to a String" {
            // Object o = "hi"; String s = (String) o;
            let tree = build::block(
                pos(1),
                vec![
                    build::local_decl(
                        pos(1),
                        build::amb_type(pos(1), "Object"),
                        "o",
                        Some(build::string(pos(1), "hi")),
                    ),
                    build::local_decl(
                        pos(2),
                        build::amb_type(pos(2), "String"),
                        "s",
                        Some(build::cast(pos(2), build::amb_type(pos(2), "String"), name(2, "o"))),
                    ),
                ],
            );
            let compilation = compile(&tree);
            assert!(compilation.diagnostics.is_empty(), "{:?}", compilation.diagnostics);
            let cast = &find(&compilation.tree, NodeTag::Cast)[0];
            assert!(cast.type_().map_or(false, |type_| type_.is_string()));
        }
    }

    describe "exceptions" {
        it "rejects handlers for exceptions the try block cannot throw" {
            // try { throw new java.io.IOException(); } catch (ArithmeticException e) {}
            let thrown = build::new(
                pos(2),
                build::amb_dotted(pos(2), AmbiguityRole::TypeNode, "java.io.IOException"),
                vec![],
            );
            let catch = build::catch(
                pos(3),
                build::formal(pos(3), build::amb_type(pos(3), "ArithmeticException"), "e"),
                build::block(pos(3), vec![]),
            );
            let tree = build::try_(
                pos(1),
                build::block(pos(1), vec![build::throw(pos(2), thrown)]),
                vec![catch],
                None,
            );
            let compilation = compile(&tree);
            assert_eq!(kinds(&compilation), vec![ErrorKind::UncaughtExceptionNotThrown]);
            assert_eq!(compilation.diagnostics[0].location, Some(pos(3)));
        }
    }

    describe "names" {
        it "assumes unknown bare names are packages until used as values" {
            // foo;
            let tree = build::block(pos(1), vec![build::eval(pos(2), name(2, "foo"))]);

            let table = ClassTable::with_core_classes();
            let types = StandardTypeSystem::new(&table).unwrap();
            let diagnostics = Diagnostics::new(ErrorPolicy::Collect);
            let env = Env::new(Arc::new(table), Arc::new(types));
            let resolved = Disambiguator::new(env, diagnostics.clone()).run(&tree).unwrap();
            assert!(diagnostics.is_empty());
            assert_eq!(find(&resolved, NodeTag::PackageNode).len(), 1);

            let compilation = compile(&tree);
            assert_eq!(kinds(&compilation), vec![ErrorKind::UnresolvedName]);
            assert_eq!(compilation.diagnostics[0].location, Some(pos(2)));
        }

        it "reports missing fields of locals during disambiguation" {
            // Point a; a.b.c;
            let tree = build::block(
                pos(1),
                vec![
                    build::local_decl(pos(1), build::amb_type(pos(1), "Point"), "a", None),
                    build::eval(pos(2), build::amb_dotted(pos(2), AmbiguityRole::Expr, "a.b.c")),
                ],
            );
            let compilation = compile_with(point_table(), CompilerOptions::default(), &tree);
            assert_eq!(kinds(&compilation), vec![ErrorKind::UnresolvedName]);
            assert!(compilation.diagnostics[0].message.contains("`b`"));
            assert_eq!(find(&compilation.tree, NodeTag::Error).len(), 1);
        }

        it "leaves resolved trees untouched" {
            let table = ClassTable::with_core_classes();
            let types = StandardTypeSystem::new(&table).unwrap();
            let diagnostics = Diagnostics::new(ErrorPolicy::Collect);
            let env = Env::new(Arc::new(table), Arc::new(types));
            let mut disambiguator = Disambiguator::new(env, diagnostics.clone());

            let once = disambiguator.run(&increment()).unwrap();
            let twice = disambiguator.run(&once).unwrap();
            assert!(twice.ptr_eq(&once));
            assert!(diagnostics.is_empty());
        }
    }

    describe "type checking" {
        it "assigns the same types when run again" {
            let options = CompilerOptions {
                check_exceptions: false,
                build_cfg: false,
                ..CompilerOptions::default()
            };
            let once = compile_with(ClassTable::with_core_classes(), options, &increment());
            let twice = compile_with(ClassTable::with_core_classes(), options, &once.tree);
            assert!(once.diagnostics.is_empty());
            assert!(twice.diagnostics.is_empty());
            assert_eq!(once.tree, twice.tree);
        }
    }

    describe "control flow" {
        it "evaluates array stores as array, index, value, store" {
            // int[] arr = {1}; int idx = 0; arr[idx] = 5;
            let tree = build::block(
                pos(1),
                vec![
                    build::local_decl(
                        pos(1),
                        build::array_type(pos(1), build::amb_type(pos(1), "int")),
                        "arr",
                        Some(build::array_init(pos(1), vec![build::int(pos(1), 1)])),
                    ),
                    build::local_decl(
                        pos(2),
                        build::amb_type(pos(2), "int"),
                        "idx",
                        Some(build::int(pos(2), 0)),
                    ),
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
            let compilation = compile(&tree);
            assert!(compilation.diagnostics.is_empty(), "{:?}", compilation.diagnostics);
            assert_eq!(compilation.flow_graphs.len(), 1);

            let store = find(&compilation.tree, NodeTag::Assign).remove(0);
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
            let order = evaluation_order(&compilation.flow_graphs[0], &store);
            assert_eq!(order.len(), 4);
            assert!(order[0].ptr_eq(&array));
            assert!(order[1].ptr_eq(&index));
            assert!(order[2].ptr_eq(&value));
            assert!(order[3].ptr_eq(&store));
        }
    }
}
