//! Checks that depend on which parts of a flow graph control can reach.

use super::FlowGraph;
use crate::ast::{Node, NodeKind};
use crate::errors::{self, Abort, Diagnostics, Severity};

/// Reports the first unreachable statement of every block, and non-void methods whose end
/// is reachable.
pub fn check_reachability(
    graph: &FlowGraph,
    severity: Severity,
    diagnostics: &Diagnostics,
) -> Result<(), Abort> {
    let checker = ReachabilityChecker {
        graph,
        severity,
        diagnostics,
    };
    checker.visit(graph.root())?;

    if let NodeKind::MethodDecl(decl) = graph.root().kind() {
        let returns_value = decl
            .method
            .as_ref()
            .and_then(|method| method.return_type.as_ref())
            .map_or(false, |type_| !type_.is_void());
        if let Some(ref body) = decl.body {
            if returns_value && graph.completes_normally(body) {
                diagnostics.report(errors::missing_return_statement(graph.root().position()))?;
            }
        }
    }
    Ok(())
}

struct ReachabilityChecker<'a> {
    graph: &'a FlowGraph,
    severity: Severity,
    diagnostics: &'a Diagnostics,
}

impl<'a> ReachabilityChecker<'a> {
    fn visit(&self, node: &Node) -> Result<(), Abort> {
        match node.kind() {
            NodeKind::Block(block) => self.statements(&block.statements),
            NodeKind::SwitchBlock(block) => self.statements(&block.statements),
            // Handlers nothing can reach are the exception checker's concern.
            NodeKind::Catch(_) if !self.graph.is_reachable(node) => Ok(()),
            _ => {
                for child in node.children() {
                    self.visit(child)?;
                }
                Ok(())
            }
        }
    }

    fn statements(&self, statements: &[Node]) -> Result<(), Abort> {
        for statement in statements {
            if !self.graph.is_reachable(statement) {
                let error = errors::unreachable_code(statement.position()).with_severity(self.severity);
                return self.diagnostics.report(error);
            }
            self.visit(statement)?;
        }
        Ok(())
    }
}
