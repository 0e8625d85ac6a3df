//! Debug rendering of syntax trees as s-expressions.

use crate::ast::{Node, NodeKind};
use crate::types::Constant;
use crate::utils::sexp::{Sexp, ToSexp};

impl ToSexp for Node {
    /// `(tag attributes... children...)`, followed by `: type` for typed nodes.
    fn to_sexp(&self) -> Sexp {
        let mut attributes = Vec::new();
        match self.kind() {
            NodeKind::Ambiguous(k) => {
                attributes.push(Sexp::atom(k.role.name()));
                attributes.push(Sexp::atom(&k.name));
            }
            NodeKind::CanonicalType(k) => attributes.push(Sexp::atom(&k.type_)),
            NodeKind::PackageNode(k) => attributes.push(Sexp::atom(&k.package)),
            NodeKind::Lit(k) => attributes.push(Sexp::atom(constant_text(&k.value))),
            NodeKind::Local(k) => attributes.push(Sexp::atom(&k.name)),
            NodeKind::Field(k) => attributes.push(Sexp::atom(&k.name)),
            NodeKind::Call(k) => attributes.push(Sexp::atom(&k.name)),
            NodeKind::NewArray(k) if k.additional_dims > 0 => {
                attributes.push(Sexp::atom(format!("+{}", k.additional_dims)))
            }
            NodeKind::Assign(k) => attributes.push(Sexp::atom(k.op)),
            NodeKind::Binary(k) => attributes.push(Sexp::atom(k.op)),
            NodeKind::Unary(k) => attributes.push(Sexp::atom(format!("{:?}", k.op))),
            NodeKind::Special(k) => attributes.push(Sexp::atom(format!("{:?}", k.kind))),
            NodeKind::LocalDecl(k) => attributes.push(Sexp::atom(&k.name)),
            NodeKind::Formal(k) => attributes.push(Sexp::atom(&k.name)),
            NodeKind::Branch(k) => {
                attributes.push(Sexp::atom(k.kind.keyword()));
                attributes.extend(k.label.iter().map(Sexp::atom));
            }
            NodeKind::Labeled(k) => attributes.push(Sexp::atom(&k.label)),
            NodeKind::FieldDecl(k) => attributes.push(Sexp::atom(&k.name)),
            NodeKind::MethodDecl(k) => attributes.push(Sexp::atom(&k.name)),
            NodeKind::ClassDecl(k) => attributes.push(Sexp::atom(&k.name)),
            NodeKind::Import(k) => attributes.push(Sexp::atom(&k.name)),
            _ => {}
        }

        let children = self.children().into_iter().map(ToSexp::to_sexp);
        let mut sexp = Sexp::tagged(self.tag().name(), attributes.into_iter().chain(children));
        if let (Some(type_), Sexp::List(elements)) = (self.type_(), &mut sexp) {
            elements.push(Sexp::atom(format!(": {}", type_)));
        }
        sexp
    }
}

fn constant_text(value: &Constant) -> String {
    match value {
        Constant::Boolean(value) => value.to_string(),
        Constant::Char(value) => format!("{:?}", value),
        Constant::Int(value) => value.to_string(),
        Constant::Long(value) => format!("{}L", value),
        Constant::Float(value) => format!("{}f", value),
        Constant::Double(value) => format!("{}d", value),
        Constant::String(value) => format!("{:?}", value),
    }
}
