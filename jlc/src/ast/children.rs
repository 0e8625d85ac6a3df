//! Uniform access to the children of every node kind.

use crate::ast::*;

impl NodeKind {
    /// Direct children in source order.
    pub fn children(&self) -> Vec<&Node> {
        let mut children = Children(Vec::new());
        match self {
            NodeKind::Ambiguous(k) => children.opt(&k.prefix),
            NodeKind::CanonicalType(_)
            | NodeKind::PackageNode(_)
            | NodeKind::Error(_)
            | NodeKind::Lit(_)
            | NodeKind::NullLit(_)
            | NodeKind::Local(_)
            | NodeKind::Empty(_)
            | NodeKind::Branch(_)
            | NodeKind::Import(_) => {}
            NodeKind::ArrayTypeNode(k) => children.one(&k.base),

            NodeKind::Field(k) => children.one(&k.target),
            NodeKind::Call(k) => {
                children.opt(&k.target);
                children.list(&k.arguments);
            }
            NodeKind::New(k) => {
                children.one(&k.class);
                children.list(&k.arguments);
            }
            NodeKind::NewArray(k) => {
                children.one(&k.base);
                children.list(&k.dims);
                children.opt(&k.init);
            }
            NodeKind::ArrayInit(k) => children.list(&k.elements),
            NodeKind::ArrayAccess(k) => {
                children.one(&k.array);
                children.one(&k.index);
            }
            NodeKind::Assign(k) => {
                children.one(&k.left);
                children.one(&k.right);
            }
            NodeKind::Binary(k) => {
                children.one(&k.left);
                children.one(&k.right);
            }
            NodeKind::Unary(k) => children.one(&k.operand),
            NodeKind::Cast(k) => {
                children.one(&k.cast_type);
                children.one(&k.expr);
            }
            NodeKind::Instanceof(k) => {
                children.one(&k.expr);
                children.one(&k.compare_type);
            }
            NodeKind::Conditional(k) => {
                children.one(&k.cond);
                children.one(&k.consequent);
                children.one(&k.alternative);
            }
            NodeKind::Special(k) => children.opt(&k.qualifier),
            NodeKind::ClassLit(k) => children.one(&k.type_node),

            NodeKind::Block(k) => children.list(&k.statements),
            NodeKind::Eval(k) => children.one(&k.expr),
            NodeKind::LocalDecl(k) => {
                children.one(&k.type_node);
                children.opt(&k.init);
            }
            NodeKind::If(k) => {
                children.one(&k.cond);
                children.one(&k.consequent);
                children.opt(&k.alternative);
            }
            NodeKind::While(k) => {
                children.one(&k.cond);
                children.one(&k.body);
            }
            NodeKind::Do(k) => {
                children.one(&k.body);
                children.one(&k.cond);
            }
            NodeKind::For(k) => {
                children.list(&k.inits);
                children.opt(&k.cond);
                children.list(&k.updates);
                children.one(&k.body);
            }
            NodeKind::Switch(k) => {
                children.one(&k.expr);
                children.list(&k.elements);
            }
            NodeKind::Case(k) => children.opt(&k.expr),
            NodeKind::SwitchBlock(k) => children.list(&k.statements),
            NodeKind::Try(k) => {
                children.one(&k.try_block);
                children.list(&k.catches);
                children.opt(&k.finally);
            }
            NodeKind::Catch(k) => {
                children.one(&k.formal);
                children.one(&k.body);
            }
            NodeKind::Formal(k) => children.one(&k.type_node),
            NodeKind::Throw(k) => children.one(&k.expr),
            NodeKind::Return(k) => children.opt(&k.expr),
            NodeKind::Labeled(k) => children.one(&k.statement),

            NodeKind::FieldDecl(k) => {
                children.one(&k.type_node);
                children.opt(&k.init);
            }
            NodeKind::MethodDecl(k) => {
                children.opt(&k.return_type);
                children.list(&k.formals);
                children.list(&k.throws);
                children.opt(&k.body);
            }
            NodeKind::Initializer(k) => children.one(&k.body),
            NodeKind::ClassDecl(k) => {
                children.opt(&k.superclass);
                children.list(&k.interfaces);
                children.list(&k.members);
            }
            NodeKind::SourceFile(k) => {
                children.opt(&k.package);
                children.list(&k.imports);
                children.list(&k.decls);
            }
        }
        children.0
    }

    /// Rebuilds the contents with every child replaced by `f(child)`, visiting children in
    /// source order.
    ///
    /// Returns `None` if `f` returned every child unchanged, so that the caller can keep the
    /// original node.
    pub fn map_children<E>(
        &self,
        f: &mut dyn FnMut(&Node) -> Result<Node, E>,
    ) -> Result<Option<NodeKind>, E> {
        let mut m = Mapper { f, changed: false };
        let kind = match self {
            NodeKind::Ambiguous(k) => {
                let prefix = m.opt(&k.prefix)?;
                NodeKind::Ambiguous(Ambiguous { prefix, ..k.clone() })
            }
            NodeKind::CanonicalType(_)
            | NodeKind::PackageNode(_)
            | NodeKind::Error(_)
            | NodeKind::Lit(_)
            | NodeKind::NullLit(_)
            | NodeKind::Local(_)
            | NodeKind::Empty(_)
            | NodeKind::Branch(_)
            | NodeKind::Import(_) => return Ok(None),
            NodeKind::ArrayTypeNode(k) => {
                let base = m.one(&k.base)?;
                NodeKind::ArrayTypeNode(ArrayTypeNode { base })
            }

            NodeKind::Field(k) => {
                let target = m.one(&k.target)?;
                NodeKind::Field(Field { target, ..k.clone() })
            }
            NodeKind::Call(k) => {
                let target = m.opt(&k.target)?;
                let arguments = m.list(&k.arguments)?;
                NodeKind::Call(Call {
                    target,
                    arguments,
                    ..k.clone()
                })
            }
            NodeKind::New(k) => {
                let class = m.one(&k.class)?;
                let arguments = m.list(&k.arguments)?;
                NodeKind::New(New {
                    class,
                    arguments,
                    ..k.clone()
                })
            }
            NodeKind::NewArray(k) => {
                let base = m.one(&k.base)?;
                let dims = m.list(&k.dims)?;
                let init = m.opt(&k.init)?;
                NodeKind::NewArray(NewArray {
                    base,
                    dims,
                    init,
                    additional_dims: k.additional_dims,
                })
            }
            NodeKind::ArrayInit(k) => {
                let elements = m.list(&k.elements)?;
                NodeKind::ArrayInit(ArrayInit { elements })
            }
            NodeKind::ArrayAccess(k) => {
                let array = m.one(&k.array)?;
                let index = m.one(&k.index)?;
                NodeKind::ArrayAccess(ArrayAccess { array, index })
            }
            NodeKind::Assign(k) => {
                let left = m.one(&k.left)?;
                let right = m.one(&k.right)?;
                NodeKind::Assign(Assign {
                    op: k.op,
                    left,
                    right,
                })
            }
            NodeKind::Binary(k) => {
                let left = m.one(&k.left)?;
                let right = m.one(&k.right)?;
                NodeKind::Binary(Binary {
                    op: k.op,
                    left,
                    right,
                })
            }
            NodeKind::Unary(k) => {
                let operand = m.one(&k.operand)?;
                NodeKind::Unary(Unary { op: k.op, operand })
            }
            NodeKind::Cast(k) => {
                let cast_type = m.one(&k.cast_type)?;
                let expr = m.one(&k.expr)?;
                NodeKind::Cast(Cast { cast_type, expr })
            }
            NodeKind::Instanceof(k) => {
                let expr = m.one(&k.expr)?;
                let compare_type = m.one(&k.compare_type)?;
                NodeKind::Instanceof(Instanceof { expr, compare_type })
            }
            NodeKind::Conditional(k) => {
                let cond = m.one(&k.cond)?;
                let consequent = m.one(&k.consequent)?;
                let alternative = m.one(&k.alternative)?;
                NodeKind::Conditional(Conditional {
                    cond,
                    consequent,
                    alternative,
                })
            }
            NodeKind::Special(k) => {
                let qualifier = m.opt(&k.qualifier)?;
                NodeKind::Special(Special {
                    kind: k.kind,
                    qualifier,
                })
            }
            NodeKind::ClassLit(k) => {
                let type_node = m.one(&k.type_node)?;
                NodeKind::ClassLit(ClassLit { type_node })
            }

            NodeKind::Block(k) => {
                let statements = m.list(&k.statements)?;
                NodeKind::Block(Block { statements })
            }
            NodeKind::Eval(k) => {
                let expr = m.one(&k.expr)?;
                NodeKind::Eval(Eval { expr })
            }
            NodeKind::LocalDecl(k) => {
                let type_node = m.one(&k.type_node)?;
                let init = m.opt(&k.init)?;
                NodeKind::LocalDecl(LocalDecl {
                    type_node,
                    init,
                    ..k.clone()
                })
            }
            NodeKind::If(k) => {
                let cond = m.one(&k.cond)?;
                let consequent = m.one(&k.consequent)?;
                let alternative = m.opt(&k.alternative)?;
                NodeKind::If(If {
                    cond,
                    consequent,
                    alternative,
                })
            }
            NodeKind::While(k) => {
                let cond = m.one(&k.cond)?;
                let body = m.one(&k.body)?;
                NodeKind::While(While { cond, body })
            }
            NodeKind::Do(k) => {
                let body = m.one(&k.body)?;
                let cond = m.one(&k.cond)?;
                NodeKind::Do(Do { body, cond })
            }
            NodeKind::For(k) => {
                let inits = m.list(&k.inits)?;
                let cond = m.opt(&k.cond)?;
                let updates = m.list(&k.updates)?;
                let body = m.one(&k.body)?;
                NodeKind::For(For {
                    inits,
                    cond,
                    updates,
                    body,
                })
            }
            NodeKind::Switch(k) => {
                let expr = m.one(&k.expr)?;
                let elements = m.list(&k.elements)?;
                NodeKind::Switch(Switch { expr, elements })
            }
            NodeKind::Case(k) => {
                let expr = m.opt(&k.expr)?;
                NodeKind::Case(Case { expr })
            }
            NodeKind::SwitchBlock(k) => {
                let statements = m.list(&k.statements)?;
                NodeKind::SwitchBlock(SwitchBlock { statements })
            }
            NodeKind::Try(k) => {
                let try_block = m.one(&k.try_block)?;
                let catches = m.list(&k.catches)?;
                let finally = m.opt(&k.finally)?;
                NodeKind::Try(Try {
                    try_block,
                    catches,
                    finally,
                })
            }
            NodeKind::Catch(k) => {
                let formal = m.one(&k.formal)?;
                let body = m.one(&k.body)?;
                NodeKind::Catch(Catch { formal, body })
            }
            NodeKind::Formal(k) => {
                let type_node = m.one(&k.type_node)?;
                NodeKind::Formal(Formal {
                    type_node,
                    ..k.clone()
                })
            }
            NodeKind::Throw(k) => {
                let expr = m.one(&k.expr)?;
                NodeKind::Throw(Throw { expr })
            }
            NodeKind::Return(k) => {
                let expr = m.opt(&k.expr)?;
                NodeKind::Return(Return { expr })
            }
            NodeKind::Labeled(k) => {
                let statement = m.one(&k.statement)?;
                NodeKind::Labeled(Labeled {
                    label: k.label.clone(),
                    statement,
                })
            }

            NodeKind::FieldDecl(k) => {
                let type_node = m.one(&k.type_node)?;
                let init = m.opt(&k.init)?;
                NodeKind::FieldDecl(FieldDecl {
                    type_node,
                    init,
                    ..k.clone()
                })
            }
            NodeKind::MethodDecl(k) => {
                let return_type = m.opt(&k.return_type)?;
                let formals = m.list(&k.formals)?;
                let throws = m.list(&k.throws)?;
                let body = m.opt(&k.body)?;
                NodeKind::MethodDecl(MethodDecl {
                    return_type,
                    formals,
                    throws,
                    body,
                    ..k.clone()
                })
            }
            NodeKind::Initializer(k) => {
                let body = m.one(&k.body)?;
                NodeKind::Initializer(Initializer {
                    flags: k.flags,
                    body,
                })
            }
            NodeKind::ClassDecl(k) => {
                let superclass = m.opt(&k.superclass)?;
                let interfaces = m.list(&k.interfaces)?;
                let members = m.list(&k.members)?;
                NodeKind::ClassDecl(ClassDecl {
                    superclass,
                    interfaces,
                    members,
                    ..k.clone()
                })
            }
            NodeKind::SourceFile(k) => {
                let package = m.opt(&k.package)?;
                let imports = m.list(&k.imports)?;
                let decls = m.list(&k.decls)?;
                NodeKind::SourceFile(SourceFile {
                    package,
                    imports,
                    decls,
                })
            }
        };

        Ok(if m.changed { Some(kind) } else { None })
    }
}

struct Children<'a>(Vec<&'a Node>);

impl<'a> Children<'a> {
    fn one(&mut self, node: &'a Node) {
        self.0.push(node);
    }

    fn opt(&mut self, node: &'a Option<Node>) {
        self.0.extend(node.iter());
    }

    fn list(&mut self, nodes: &'a [Node]) {
        self.0.extend(nodes.iter());
    }
}

struct Mapper<'f, E> {
    f: &'f mut dyn FnMut(&Node) -> Result<Node, E>,
    changed: bool,
}

impl<'f, E> Mapper<'f, E> {
    fn one(&mut self, node: &Node) -> Result<Node, E> {
        let new = (self.f)(node)?;
        if !new.ptr_eq(node) {
            self.changed = true;
        }
        Ok(new)
    }

    fn opt(&mut self, node: &Option<Node>) -> Result<Option<Node>, E> {
        match node {
            Some(node) => self.one(node).map(Some),
            None => Ok(None),
        }
    }

    fn list(&mut self, nodes: &[Node]) -> Result<Vec<Node>, E> {
        nodes.iter().map(|node| self.one(node)).collect()
    }
}
