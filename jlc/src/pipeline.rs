//! Runs the analysis passes over one compilation unit.

use crate::ast::Node;
use crate::cfg::init::check_definite_assignment;
use crate::cfg::reach::check_reachability;
use crate::cfg::{CfgBuilder, CfgRule, FlowGraph};
use crate::errors::{Abort, CompilationError, Diagnostics};
use crate::options::CompilerOptions;
use crate::passes::disambiguate::{DisambiguationRule, Disambiguator};
use crate::passes::exceptions::{ExceptionChecker, ExceptionRule};
use crate::passes::type_check::{TypeCheckRule, TypeChecker};
use crate::passes::Env;
use crate::types::{Resolver, TypeSystem};
use crate::visit::RuleTable;
use std::sync::Arc;
use tracing::debug;

/// Rules a language extension registers with each pass.
#[derive(Clone, Default)]
pub struct Extensions {
    pub disambiguation: RuleTable<DisambiguationRule>,
    pub type_check: RuleTable<TypeCheckRule>,
    pub exceptions: RuleTable<ExceptionRule>,
    pub cfg: RuleTable<CfgRule>,
}

/// Result of analyzing a compilation unit.
pub struct Compilation {
    /// The tree left by the last pass that ran.
    pub tree: Node,

    /// Errors and warnings in reporting order.
    pub diagnostics: Vec<CompilationError>,

    pub flow_graphs: Vec<FlowGraph>,
}

impl Compilation {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(CompilationError::is_error)
    }

    pub fn errors(&self) -> impl Iterator<Item = &CompilationError> {
        self.diagnostics.iter().filter(|error| error.is_error())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &CompilationError> {
        self.diagnostics.iter().filter(|error| !error.is_error())
    }
}

pub struct Pipeline {
    env: Env,
    options: CompilerOptions,
    extensions: Extensions,
}

impl Pipeline {
    pub fn new(resolver: Arc<dyn Resolver>, types: Arc<dyn TypeSystem>) -> Pipeline {
        Pipeline {
            env: Env::new(resolver, types),
            options: CompilerOptions::default(),
            extensions: Extensions::default(),
        }
    }

    pub fn with_options(self, options: CompilerOptions) -> Pipeline {
        Pipeline { options, ..self }
    }

    pub fn with_extensions(self, extensions: Extensions) -> Pipeline {
        Pipeline { extensions, ..self }
    }

    pub fn options(&self) -> &CompilerOptions {
        &self.options
    }

    /// Analyzes `root`. Passes after the first one that reports an error are skipped, since
    /// they expect a tree without problems.
    ///
    /// User errors end up in the returned `Compilation`, except under
    /// `ErrorPolicy::FailFast` where the first one is returned as `Abort::Semantic`.
    pub fn run(&self, root: &Node) -> Result<Compilation, Abort> {
        let diagnostics = Diagnostics::new(self.options.error_policy);
        let mut tree = self.disambiguate(root, &diagnostics)?;
        let mut flow_graphs = Vec::new();

        if !diagnostics.has_errors() {
            tree = TypeChecker::new(self.env.clone(), diagnostics.clone())
                .with_rules(self.extensions.type_check.clone())
                .run(&tree)?;
        }

        if self.options.check_exceptions && !diagnostics.has_errors() {
            tree = ExceptionChecker::new(self.env.clone(), diagnostics.clone())
                .with_rules(self.extensions.exceptions.clone())
                .run(&tree)?;
        }

        if self.options.build_cfg && !diagnostics.has_errors() {
            flow_graphs = CfgBuilder::new(self.env.clone(), diagnostics.clone())
                .with_rules(self.extensions.cfg.clone())
                .build(&tree)?;
            for graph in &flow_graphs {
                check_reachability(graph, self.options.unreachable_code, &diagnostics)?;
                check_definite_assignment(graph, &diagnostics)?;
            }
        }

        debug!(
            "analysis finished with {} errors and {} diagnostics in total",
            diagnostics.error_count(),
            diagnostics.len()
        );
        Ok(Compilation {
            tree,
            diagnostics: diagnostics.into_vec(),
            flow_graphs,
        })
    }

    /// Runs disambiguation rounds until nothing is pending. Names still pending in the last
    /// allowed round are reported as unresolved.
    fn disambiguate(&self, root: &Node, diagnostics: &Diagnostics) -> Result<Node, Abort> {
        let mut disambiguator = Disambiguator::new(self.env.clone(), diagnostics.clone())
            .with_rules(self.extensions.disambiguation.clone());
        let rounds = self.options.max_disambiguation_rounds.max(1);

        let mut tree = root.clone();
        for round in 1..=rounds {
            disambiguator.set_final_round(round == rounds);
            tree = disambiguator.run(&tree)?;
            if disambiguator.pending() == 0 {
                debug!("disambiguation finished after {} rounds", round);
                break;
            }
        }
        Ok(tree)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{build, AssignOp, NodeTag};
    use crate::errors::{ErrorKind, Severity};
    use crate::source::Position;
    use crate::types::{ClassTable, ClassType, StandardTypeSystem};

    fn pos(line: u32) -> Position {
        Position::at(line, 1)
    }

    fn pipeline(table: ClassTable) -> Pipeline {
        let types = StandardTypeSystem::new(&table).unwrap();
        Pipeline::new(Arc::new(table), Arc::new(types))
    }

    fn kinds(compilation: &Compilation) -> Vec<ErrorKind> {
        compilation.diagnostics.iter().map(|error| error.kind).collect()
    }

    #[test]
    fn errors_stop_later_passes() {
        // int y = true; throw y;
        let decl = build::local_decl(
            pos(1),
            build::amb_type(pos(1), "int"),
            "y",
            Some(build::boolean(pos(1), true)),
        );
        let tree = build::block(pos(1), vec![decl, build::throw(pos(2), build::amb_expr(pos(2), "y"))]);
        let compilation = pipeline(ClassTable::with_core_classes()).run(&tree).unwrap();
        assert_eq!(kinds(&compilation), vec![ErrorKind::TypeMismatch, ErrorKind::TypeMismatch]);
        assert!(compilation.flow_graphs.is_empty());
        assert!(compilation.tree.exceptions().is_none());
    }

    #[test]
    fn fail_fast_returns_the_first_error() {
        let tree = build::local_decl(
            pos(1),
            build::amb_type(pos(1), "int"),
            "y",
            Some(build::boolean(pos(1), true)),
        );
        let result = pipeline(ClassTable::with_core_classes())
            .with_options(CompilerOptions::fail_fast())
            .run(&tree);
        match result {
            Err(Abort::Semantic(error)) => assert_eq!(error.kind, ErrorKind::TypeMismatch),
            _ => panic!("expected the first error to abort the pipeline"),
        }
    }

    #[test]
    fn pending_names_get_a_bounded_number_of_rounds() {
        let tree = build::local_decl(pos(1), build::amb_type(pos(1), "Late"), "l", None);

        let mut table = ClassTable::with_core_classes();
        table.add_class(&ClassType::builder("Late").build());
        table.mark_pending("Late", 2);
        let compilation = pipeline(table).run(&tree).unwrap();
        assert!(compilation.diagnostics.is_empty());
        assert_eq!(compilation.tree.children()[0].tag(), NodeTag::CanonicalType);

        let mut table = ClassTable::with_core_classes();
        table.add_class(&ClassType::builder("Late").build());
        table.mark_pending("Late", 2);
        let options = CompilerOptions {
            max_disambiguation_rounds: 2,
            ..CompilerOptions::default()
        };
        let compilation = pipeline(table).with_options(options).run(&tree).unwrap();
        assert_eq!(kinds(&compilation), vec![ErrorKind::UnresolvedName]);
    }

    #[test]
    fn uses_of_locals_with_pending_types_are_resolved_later() {
        // { Late l; l = null; }
        let store = build::assign(
            pos(2),
            AssignOp::Assign,
            build::amb_expr(pos(2), "l"),
            build::null(pos(2)),
        );
        let tree = build::block(
            pos(1),
            vec![
                build::local_decl(pos(1), build::amb_type(pos(1), "Late"), "l", None),
                build::eval(pos(2), store),
            ],
        );

        let mut table = ClassTable::with_core_classes();
        table.add_class(&ClassType::builder("Late").build());
        table.mark_pending("Late", 1);
        let compilation = pipeline(table).run(&tree).unwrap();
        assert!(compilation.diagnostics.is_empty());

        let nodes = compilation.tree.descendants();
        assert!(nodes.iter().all(|node| node.tag() != NodeTag::PackageNode));
        let local = nodes
            .iter()
            .find(|node| node.tag() == NodeTag::Local)
            .expect("`l` is a local");
        assert!(local.type_().unwrap().is_class_named("Late"));
    }

    #[test]
    fn passes_can_be_switched_off() {
        // throw new RuntimeException(); ;
        let throw = build::throw(
            pos(1),
            build::new(pos(1), build::amb_type(pos(1), "RuntimeException"), vec![]),
        );
        let tree = build::block(pos(1), vec![throw, build::empty(pos(2))]);
        let compilation = pipeline(ClassTable::with_core_classes()).run(&tree).unwrap();
        assert_eq!(kinds(&compilation), vec![ErrorKind::UnreachableCode]);
        assert_eq!(compilation.diagnostics[0].severity, Severity::Warning);
        assert!(!compilation.has_errors());
        assert_eq!(compilation.warnings().count(), 1);
        assert_eq!(compilation.flow_graphs.len(), 1);
        assert!(compilation.tree.exceptions().is_some());

        let options = CompilerOptions {
            check_exceptions: false,
            build_cfg: false,
            ..CompilerOptions::default()
        };
        let compilation = pipeline(ClassTable::with_core_classes())
            .with_options(options)
            .run(&tree)
            .unwrap();
        assert!(compilation.diagnostics.is_empty());
        assert!(compilation.flow_graphs.is_empty());
        assert!(compilation.tree.exceptions().is_none());
    }
}
