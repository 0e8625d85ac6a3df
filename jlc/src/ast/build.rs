//! Node constructors, one per node kind.
//!
//! Parsers and tests build trees through these functions, and passes use them to synthesize
//! replacement nodes.

use crate::ast::*;
use crate::source::Position;
use crate::types::{Constant, FieldInstance, Flags, LocalInstance, Package, Type};

pub fn lit(position: Position, value: Constant) -> Node {
    Node::new(position, Lit { value })
}

pub fn int(position: Position, value: i32) -> Node {
    lit(position, Constant::Int(value))
}

pub fn boolean(position: Position, value: bool) -> Node {
    lit(position, Constant::Boolean(value))
}

pub fn char_(position: Position, value: char) -> Node {
    lit(position, Constant::Char(value))
}

pub fn string(position: Position, value: &str) -> Node {
    lit(position, Constant::String(value.to_string()))
}

pub fn null(position: Position) -> Node {
    Node::new(position, NullLit {})
}

pub fn ambiguous(
    position: Position,
    role: AmbiguityRole,
    prefix: Option<Node>,
    name: &str,
) -> Node {
    Node::new(
        position,
        Ambiguous {
            role,
            prefix,
            name: name.to_string(),
        },
    )
}

pub fn amb_expr(position: Position, name: &str) -> Node {
    ambiguous(position, AmbiguityRole::Expr, None, name)
}

pub fn amb_type(position: Position, name: &str) -> Node {
    ambiguous(position, AmbiguityRole::TypeNode, None, name)
}

/// A dotted name such as `java.io.IOException`, with every prefix ambiguous as well.
///
/// Prefixes of type names are qualifiers; prefixes of other names are general prefixes.
pub fn amb_dotted(position: Position, role: AmbiguityRole, dotted: &str) -> Node {
    let prefix_role = match role {
        AmbiguityRole::TypeNode | AmbiguityRole::Qualifier => AmbiguityRole::Qualifier,
        _ => AmbiguityRole::Prefix,
    };
    let mut components: Vec<&str> = dotted.split('.').collect();
    let last = components.pop().unwrap_or_default();
    let prefix = components.into_iter().fold(None, |prefix, component| {
        Some(ambiguous(position, prefix_role, prefix, component))
    });
    ambiguous(position, role, prefix, last)
}

pub fn canonical(position: Position, type_: Type) -> Node {
    Node::new(position, CanonicalType { type_ })
}

pub fn array_type(position: Position, base: Node) -> Node {
    Node::new(position, ArrayTypeNode { base })
}

pub fn package(position: Position, package: Package) -> Node {
    Node::new(position, PackageNode { package })
}

pub fn error(position: Position) -> Node {
    Node::new(position, Erroneous {})
}

pub fn local(position: Position, name: &str) -> Node {
    Node::new(
        position,
        Local {
            name: name.to_string(),
            local: None,
        },
    )
}

pub fn local_of(position: Position, instance: &LocalInstance) -> Node {
    Node::new(
        position,
        Local {
            name: instance.name.clone(),
            local: Some(instance.clone()),
        },
    )
}

pub fn field(position: Position, target: Node, name: &str) -> Node {
    Node::new(
        position,
        Field {
            target,
            name: name.to_string(),
            field: None,
            target_implicit: false,
        },
    )
}

pub fn field_of(
    position: Position,
    target: Node,
    instance: &FieldInstance,
    target_implicit: bool,
) -> Node {
    Node::new(
        position,
        Field {
            target,
            name: instance.name.clone(),
            field: Some(instance.clone()),
            target_implicit,
        },
    )
}

pub fn call(position: Position, target: Option<Node>, name: &str, arguments: Vec<Node>) -> Node {
    Node::new(
        position,
        Call {
            target,
            name: name.to_string(),
            arguments,
            method: None,
        },
    )
}

pub fn new(position: Position, class: Node, arguments: Vec<Node>) -> Node {
    Node::new(
        position,
        New {
            class,
            arguments,
            constructor: None,
        },
    )
}

pub fn new_array(
    position: Position,
    base: Node,
    dims: Vec<Node>,
    additional_dims: usize,
    init: Option<Node>,
) -> Node {
    Node::new(
        position,
        NewArray {
            base,
            dims,
            additional_dims,
            init,
        },
    )
}

pub fn array_init(position: Position, elements: Vec<Node>) -> Node {
    Node::new(position, ArrayInit { elements })
}

pub fn index(position: Position, array: Node, index: Node) -> Node {
    Node::new(position, ArrayAccess { array, index })
}

pub fn assign(position: Position, op: AssignOp, left: Node, right: Node) -> Node {
    Node::new(position, Assign { op, left, right })
}

pub fn binary(position: Position, op: BinaryOp, left: Node, right: Node) -> Node {
    Node::new(position, Binary { op, left, right })
}

pub fn unary(position: Position, op: UnaryOp, operand: Node) -> Node {
    Node::new(position, Unary { op, operand })
}

pub fn cast(position: Position, cast_type: Node, expr: Node) -> Node {
    Node::new(position, Cast { cast_type, expr })
}

pub fn instanceof(position: Position, expr: Node, compare_type: Node) -> Node {
    Node::new(position, Instanceof { expr, compare_type })
}

pub fn conditional(position: Position, cond: Node, consequent: Node, alternative: Node) -> Node {
    Node::new(
        position,
        Conditional {
            cond,
            consequent,
            alternative,
        },
    )
}

pub fn this(position: Position, qualifier: Option<Node>) -> Node {
    Node::new(
        position,
        Special {
            kind: SpecialKind::This,
            qualifier,
        },
    )
}

pub fn super_(position: Position, qualifier: Option<Node>) -> Node {
    Node::new(
        position,
        Special {
            kind: SpecialKind::Super,
            qualifier,
        },
    )
}

pub fn class_lit(position: Position, type_node: Node) -> Node {
    Node::new(position, ClassLit { type_node })
}

pub fn block(position: Position, statements: Vec<Node>) -> Node {
    Node::new(position, Block { statements })
}

pub fn empty(position: Position) -> Node {
    Node::new(position, Empty {})
}

pub fn eval(position: Position, expr: Node) -> Node {
    Node::new(position, Eval { expr })
}

pub fn local_decl(position: Position, type_node: Node, name: &str, init: Option<Node>) -> Node {
    Node::new(
        position,
        LocalDecl {
            flags: Flags::NONE,
            type_node,
            name: name.to_string(),
            init,
            local: None,
        },
    )
}

pub fn if_(position: Position, cond: Node, consequent: Node, alternative: Option<Node>) -> Node {
    Node::new(
        position,
        If {
            cond,
            consequent,
            alternative,
        },
    )
}

pub fn while_(position: Position, cond: Node, body: Node) -> Node {
    Node::new(position, While { cond, body })
}

pub fn do_(position: Position, body: Node, cond: Node) -> Node {
    Node::new(position, Do { body, cond })
}

pub fn for_(
    position: Position,
    inits: Vec<Node>,
    cond: Option<Node>,
    updates: Vec<Node>,
    body: Node,
) -> Node {
    Node::new(
        position,
        For {
            inits,
            cond,
            updates,
            body,
        },
    )
}

pub fn switch(position: Position, expr: Node, elements: Vec<Node>) -> Node {
    Node::new(position, Switch { expr, elements })
}

pub fn case(position: Position, expr: Option<Node>) -> Node {
    Node::new(position, Case { expr })
}

pub fn switch_block(position: Position, statements: Vec<Node>) -> Node {
    Node::new(position, SwitchBlock { statements })
}

pub fn try_(position: Position, try_block: Node, catches: Vec<Node>, finally: Option<Node>) -> Node {
    Node::new(
        position,
        Try {
            try_block,
            catches,
            finally,
        },
    )
}

pub fn catch(position: Position, formal: Node, body: Node) -> Node {
    Node::new(position, Catch { formal, body })
}

pub fn formal(position: Position, type_node: Node, name: &str) -> Node {
    Node::new(
        position,
        Formal {
            flags: Flags::NONE,
            type_node,
            name: name.to_string(),
            local: None,
        },
    )
}

pub fn throw(position: Position, expr: Node) -> Node {
    Node::new(position, Throw { expr })
}

pub fn return_(position: Position, expr: Option<Node>) -> Node {
    Node::new(position, Return { expr })
}

pub fn break_(position: Position, label: Option<&str>) -> Node {
    Node::new(
        position,
        Branch {
            kind: BranchKind::Break,
            label: label.map(str::to_string),
        },
    )
}

pub fn continue_(position: Position, label: Option<&str>) -> Node {
    Node::new(
        position,
        Branch {
            kind: BranchKind::Continue,
            label: label.map(str::to_string),
        },
    )
}

pub fn labeled(position: Position, label: &str, statement: Node) -> Node {
    Node::new(
        position,
        Labeled {
            label: label.to_string(),
            statement,
        },
    )
}

pub fn field_decl(
    position: Position,
    flags: Flags,
    type_node: Node,
    name: &str,
    init: Option<Node>,
) -> Node {
    Node::new(
        position,
        FieldDecl {
            flags,
            type_node,
            name: name.to_string(),
            init,
            field: None,
        },
    )
}

/// A method declaration, or a constructor declaration when `return_type` is `None`.
pub fn method_decl(
    position: Position,
    flags: Flags,
    return_type: Option<Node>,
    name: &str,
    formals: Vec<Node>,
    throws: Vec<Node>,
    body: Option<Node>,
) -> Node {
    Node::new(
        position,
        MethodDecl {
            flags,
            return_type,
            name: name.to_string(),
            formals,
            throws,
            body,
            method: None,
        },
    )
}

pub fn initializer(position: Position, flags: Flags, body: Node) -> Node {
    Node::new(position, Initializer { flags, body })
}

pub fn class_decl(
    position: Position,
    flags: Flags,
    name: &str,
    superclass: Option<Node>,
    interfaces: Vec<Node>,
    members: Vec<Node>,
) -> Node {
    Node::new(
        position,
        ClassDecl {
            flags,
            name: name.to_string(),
            superclass,
            interfaces,
            members,
            class: None,
        },
    )
}

pub fn import(position: Position, kind: ImportKind, name: &str) -> Node {
    Node::new(
        position,
        Import {
            kind,
            name: name.to_string(),
        },
    )
}

pub fn source_file(
    position: Position,
    package: Option<Node>,
    imports: Vec<Node>,
    decls: Vec<Node>,
) -> Node {
    Node::new(
        position,
        SourceFile {
            package,
            imports,
            decls,
        },
    )
}
