//! The analysis passes run by the pipeline.
//!
//! Every pass is a `Visitor` that rewrites a tree and reports user errors into a shared
//! `Diagnostics` sink. Passes expect the tree shape left by the previous pass: no ambiguous
//! nodes after disambiguation, types on every expression after type checking.

pub mod disambiguate;
pub mod exceptions;
pub mod type_check;

use crate::ast::{Node, NodeKind};
use crate::types::{Package, Resolver, Type, TypeSystem};
use std::sync::Arc;

/// The external collaborators queried by every pass.
#[derive(Clone)]
pub struct Env {
    pub resolver: Arc<dyn Resolver>,
    pub types: Arc<dyn TypeSystem>,
}

impl Env {
    pub fn new(resolver: Arc<dyn Resolver>, types: Arc<dyn TypeSystem>) -> Env {
        Env { resolver, types }
    }
}

/// Package declared by a source file node, if any.
pub(crate) fn declared_package(node: &Node) -> Option<Package> {
    match node.kind() {
        NodeKind::SourceFile(file) => match file.package.as_ref().map(Node::kind) {
            Some(NodeKind::PackageNode(package)) => Some(package.package.clone()),
            _ => None,
        },
        _ => None,
    }
}

/// The type denoted by a resolved type node.
pub(crate) fn denoted_type(node: &Node) -> Option<&Type> {
    match node.kind() {
        NodeKind::CanonicalType(canonical) => Some(&canonical.type_),
        _ => None,
    }
}
