//! Compile-time evaluation of constant expressions.

use crate::ast::{BinaryOp, Node, NodeKind, UnaryOp};
use crate::types::{Constant, PrimitiveKind, Type};

/// The value of `node` if it is a constant expression.
pub fn constant_value(node: &Node) -> Option<Constant> {
    match node.kind() {
        NodeKind::Lit(lit) => Some(lit.value.clone()),
        NodeKind::Field(field) => field.field.as_ref()?.constant.clone(),
        NodeKind::Unary(unary) => fold_unary(unary.op, constant_value(&unary.operand)?),
        NodeKind::Binary(binary) => fold_binary(
            binary.op,
            constant_value(&binary.left)?,
            constant_value(&binary.right)?,
        ),
        NodeKind::Cast(cast) => match cast.cast_type.kind() {
            NodeKind::CanonicalType(target) => {
                fold_cast(&target.type_, constant_value(&cast.expr)?)
            }
            _ => None,
        },
        NodeKind::Conditional(conditional) => match constant_value(&conditional.cond)? {
            Constant::Boolean(true) => constant_value(&conditional.consequent),
            Constant::Boolean(false) => constant_value(&conditional.alternative),
            _ => None,
        },
        _ => None,
    }
}

/// Whether `node` is the constant `true`.
pub fn is_constant_true(node: &Node) -> bool {
    constant_value(node) == Some(Constant::Boolean(true))
}

/// A numeric value after binary or unary promotion.
#[derive(Clone, Copy, PartialEq, PartialOrd, Debug)]
enum Num {
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
}

impl Num {
    fn of(value: &Constant) -> Option<Num> {
        let num = match *value {
            Constant::Char(c) => Num::Int(c as i32),
            Constant::Int(i) => Num::Int(i),
            Constant::Long(l) => Num::Long(l),
            Constant::Float(f) => Num::Float(f),
            Constant::Double(d) => Num::Double(d),
            Constant::Boolean(_) | Constant::String(_) => return None,
        };
        Some(num)
    }

    fn rank(self) -> u8 {
        match self {
            Num::Int(_) => 0,
            Num::Long(_) => 1,
            Num::Float(_) => 2,
            Num::Double(_) => 3,
        }
    }

    fn widen_to(self, rank: u8) -> Num {
        let (as_i64, as_f64) = match self {
            Num::Int(i) => (i as i64, i as f64),
            Num::Long(l) => (l, l as f64),
            Num::Float(f) => (f as i64, f as f64),
            Num::Double(d) => (d as i64, d),
        };
        match rank {
            0 => self,
            1 => Num::Long(as_i64),
            2 => match self {
                Num::Float(_) => self,
                _ => Num::Float(as_f64 as f32),
            },
            _ => Num::Double(as_f64),
        }
    }

    fn into_constant(self) -> Constant {
        match self {
            Num::Int(i) => Constant::Int(i),
            Num::Long(l) => Constant::Long(l),
            Num::Float(f) => Constant::Float(f),
            Num::Double(d) => Constant::Double(d),
        }
    }
}

fn fold_unary(op: UnaryOp, value: Constant) -> Option<Constant> {
    if let Constant::Boolean(b) = value {
        return match op {
            UnaryOp::Not => Some(Constant::Boolean(!b)),
            _ => None,
        };
    }
    let num = Num::of(&value)?;
    let result = match (op, num) {
        (UnaryOp::Pos, _) => num,
        (UnaryOp::Neg, Num::Int(i)) => Num::Int(i.wrapping_neg()),
        (UnaryOp::Neg, Num::Long(l)) => Num::Long(l.wrapping_neg()),
        (UnaryOp::Neg, Num::Float(f)) => Num::Float(-f),
        (UnaryOp::Neg, Num::Double(d)) => Num::Double(-d),
        (UnaryOp::BitNot, Num::Int(i)) => Num::Int(!i),
        (UnaryOp::BitNot, Num::Long(l)) => Num::Long(!l),
        _ => return None,
    };
    Some(result.into_constant())
}

fn fold_binary(op: BinaryOp, left: Constant, right: Constant) -> Option<Constant> {
    if op == BinaryOp::Add {
        if let (Constant::String(_), _) | (_, Constant::String(_)) = (&left, &right) {
            return Some(Constant::String(format!(
                "{}{}",
                string_text(&left),
                string_text(&right)
            )));
        }
    }

    if let (Constant::Boolean(l), Constant::Boolean(r)) = (&left, &right) {
        let (l, r) = (*l, *r);
        let result = match op {
            BinaryOp::CondAnd | BinaryOp::BitAnd => l && r,
            BinaryOp::CondOr | BinaryOp::BitOr => l || r,
            BinaryOp::BitXor => l ^ r,
            BinaryOp::Eq => l == r,
            BinaryOp::Ne => l != r,
            _ => return None,
        };
        return Some(Constant::Boolean(result));
    }

    let left = Num::of(&left)?;
    let right = Num::of(&right)?;

    if op.is_shift() {
        return fold_shift(op, left, right);
    }

    let rank = left.rank().max(right.rank());
    let (left, right) = (left.widen_to(rank), right.widen_to(rank));

    if op.is_relational() || op.is_equality() {
        let result = match op {
            BinaryOp::Lt => left < right,
            BinaryOp::Gt => left > right,
            BinaryOp::Le => left <= right,
            BinaryOp::Ge => left >= right,
            BinaryOp::Eq => left == right,
            _ => left != right,
        };
        return Some(Constant::Boolean(result));
    }

    let result = match (left, right) {
        (Num::Int(l), Num::Int(r)) => Num::Int(match op {
            BinaryOp::Add => l.wrapping_add(r),
            BinaryOp::Sub => l.wrapping_sub(r),
            BinaryOp::Mul => l.wrapping_mul(r),
            BinaryOp::Div => l.checked_div(r)?,
            BinaryOp::Mod => l.checked_rem(r)?,
            BinaryOp::BitAnd => l & r,
            BinaryOp::BitOr => l | r,
            BinaryOp::BitXor => l ^ r,
            _ => return None,
        }),
        (Num::Long(l), Num::Long(r)) => Num::Long(match op {
            BinaryOp::Add => l.wrapping_add(r),
            BinaryOp::Sub => l.wrapping_sub(r),
            BinaryOp::Mul => l.wrapping_mul(r),
            BinaryOp::Div => l.checked_div(r)?,
            BinaryOp::Mod => l.checked_rem(r)?,
            BinaryOp::BitAnd => l & r,
            BinaryOp::BitOr => l | r,
            BinaryOp::BitXor => l ^ r,
            _ => return None,
        }),
        (Num::Float(l), Num::Float(r)) => Num::Float(match op {
            BinaryOp::Add => l + r,
            BinaryOp::Sub => l - r,
            BinaryOp::Mul => l * r,
            BinaryOp::Div => l / r,
            BinaryOp::Mod => l % r,
            _ => return None,
        }),
        (Num::Double(l), Num::Double(r)) => Num::Double(match op {
            BinaryOp::Add => l + r,
            BinaryOp::Sub => l - r,
            BinaryOp::Mul => l * r,
            BinaryOp::Div => l / r,
            BinaryOp::Mod => l % r,
            _ => return None,
        }),
        _ => return None,
    };
    Some(result.into_constant())
}

/// Shifts only promote the left operand; the distance is masked to the operand width.
fn fold_shift(op: BinaryOp, left: Num, distance: Num) -> Option<Constant> {
    let distance = match distance {
        Num::Int(i) => i as i64,
        Num::Long(l) => l,
        _ => return None,
    };
    let result = match left {
        Num::Int(value) => {
            let distance = (distance & 0x1f) as u32;
            Num::Int(match op {
                BinaryOp::Shl => value.wrapping_shl(distance),
                BinaryOp::Shr => value.wrapping_shr(distance),
                _ => ((value as u32) >> distance) as i32,
            })
        }
        Num::Long(value) => {
            let distance = (distance & 0x3f) as u32;
            Num::Long(match op {
                BinaryOp::Shl => value.wrapping_shl(distance),
                BinaryOp::Shr => value.wrapping_shr(distance),
                _ => ((value as u64) >> distance) as i64,
            })
        }
        _ => return None,
    };
    Some(result.into_constant())
}

fn fold_cast(target: &Type, value: Constant) -> Option<Constant> {
    if target.is_string() {
        return match value {
            Constant::String(_) => Some(value),
            _ => None,
        };
    }
    let target = target.primitive()?;
    if target == PrimitiveKind::Boolean {
        return match value {
            Constant::Boolean(_) => Some(value),
            _ => None,
        };
    }

    let num = Num::of(&value)?;
    // Floating values saturate to `int` before narrowing to the smaller integral types.
    let (as_i32, as_i64, as_f64) = match num {
        Num::Int(i) => (i, i as i64, i as f64),
        Num::Long(l) => (l as i32, l, l as f64),
        Num::Float(f) => (f as i32, f as i64, f as f64),
        Num::Double(d) => (d as i32, d as i64, d),
    };
    let result = match target {
        PrimitiveKind::Byte => Constant::Int(as_i32 as i8 as i32),
        PrimitiveKind::Short => Constant::Int(as_i32 as i16 as i32),
        PrimitiveKind::Char => Constant::Char(std::char::from_u32(as_i32 as u16 as u32)?),
        PrimitiveKind::Int => Constant::Int(as_i32),
        PrimitiveKind::Long => Constant::Long(as_i64),
        PrimitiveKind::Float => Constant::Float(as_f64 as f32),
        PrimitiveKind::Double => Constant::Double(as_f64),
        PrimitiveKind::Boolean | PrimitiveKind::Void => return None,
    };
    Some(result)
}

/// Text of a constant as it appears in string concatenation.
fn string_text(value: &Constant) -> String {
    match value {
        Constant::Boolean(b) => b.to_string(),
        Constant::Char(c) => c.to_string(),
        Constant::Int(i) => i.to_string(),
        Constant::Long(l) => l.to_string(),
        Constant::Float(f) if f.is_finite() && f.fract() == 0.0 => format!("{:.1}", f),
        Constant::Float(f) => f.to_string(),
        Constant::Double(d) if d.is_finite() && d.fract() == 0.0 => format!("{:.1}", d),
        Constant::Double(d) => d.to_string(),
        Constant::String(s) => s.clone(),
    }
}
