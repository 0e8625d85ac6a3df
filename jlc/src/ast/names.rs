//! Names before and after disambiguation.

use crate::ast::{AmbiguityRole, Node};
use crate::types::{Package, Type};

/// A dotted name whose meaning is not known yet: `prefix.name` or just `name`.
///
/// The parser produces these wherever it cannot tell a local from a field, a type or a
/// package. The disambiguator replaces every one of them.
#[derive(Clone, Debug, PartialEq)]
pub struct Ambiguous {
    pub role: AmbiguityRole,
    pub prefix: Option<Node>,
    pub name: String,
}

/// A reference to a fully resolved type.
#[derive(Clone, Debug, PartialEq)]
pub struct CanonicalType {
    pub type_: Type,
}

/// `base[]` in a type position.
#[derive(Clone, Debug, PartialEq)]
pub struct ArrayTypeNode {
    pub base: Node,
}

/// A name resolved to a package. Only valid as a prefix of a longer name.
#[derive(Clone, Debug, PartialEq)]
pub struct PackageNode {
    pub package: Package,
}

/// Stands for code with already reported errors.
#[derive(Clone, Debug, PartialEq)]
pub struct Erroneous {}
