//! Operators and small syntactic enumerations.

use std::fmt::{self, Display, Formatter};

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Shl,
    Shr,
    Ushr,
    Lt,
    Gt,
    Le,
    Ge,
    Eq,
    Ne,
    BitAnd,
    BitOr,
    BitXor,
    CondAnd,
    CondOr,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        use BinaryOp::*;
        match self {
            Add => "+",
            Sub => "-",
            Mul => "*",
            Div => "/",
            Mod => "%",
            Shl => "<<",
            Shr => ">>",
            Ushr => ">>>",
            Lt => "<",
            Gt => ">",
            Le => "<=",
            Ge => ">=",
            Eq => "==",
            Ne => "!=",
            BitAnd => "&",
            BitOr => "|",
            BitXor => "^",
            CondAnd => "&&",
            CondOr => "||",
        }
    }

    pub fn is_shift(self) -> bool {
        use BinaryOp::*;
        match self {
            Shl | Shr | Ushr => true,
            _ => false,
        }
    }

    pub fn is_relational(self) -> bool {
        use BinaryOp::*;
        match self {
            Lt | Gt | Le | Ge => true,
            _ => false,
        }
    }

    pub fn is_equality(self) -> bool {
        self == BinaryOp::Eq || self == BinaryOp::Ne
    }

    pub fn is_bitwise(self) -> bool {
        use BinaryOp::*;
        match self {
            BitAnd | BitOr | BitXor => true,
            _ => false,
        }
    }

    pub fn is_short_circuit(self) -> bool {
        self == BinaryOp::CondAnd || self == BinaryOp::CondOr
    }

    /// Integral `/` and `%` can throw `ArithmeticException`.
    pub fn may_divide_by_zero(self) -> bool {
        self == BinaryOp::Div || self == BinaryOp::Mod
    }
}

impl Display for BinaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AssignOp {
    Assign,
    AddAssign,
    SubAssign,
    MulAssign,
    DivAssign,
    ModAssign,
    BitAndAssign,
    BitOrAssign,
    BitXorAssign,
    ShlAssign,
    ShrAssign,
    UshrAssign,
}

impl AssignOp {
    pub fn symbol(self) -> &'static str {
        use AssignOp::*;
        match self {
            Assign => "=",
            AddAssign => "+=",
            SubAssign => "-=",
            MulAssign => "*=",
            DivAssign => "/=",
            ModAssign => "%=",
            BitAndAssign => "&=",
            BitOrAssign => "|=",
            BitXorAssign => "^=",
            ShlAssign => "<<=",
            ShrAssign => ">>=",
            UshrAssign => ">>>=",
        }
    }

    /// The binary operator applied by a compound assignment.
    pub fn binary_op(self) -> Option<BinaryOp> {
        use AssignOp::*;
        let op = match self {
            Assign => return None,
            AddAssign => BinaryOp::Add,
            SubAssign => BinaryOp::Sub,
            MulAssign => BinaryOp::Mul,
            DivAssign => BinaryOp::Div,
            ModAssign => BinaryOp::Mod,
            BitAndAssign => BinaryOp::BitAnd,
            BitOrAssign => BinaryOp::BitOr,
            BitXorAssign => BinaryOp::BitXor,
            ShlAssign => BinaryOp::Shl,
            ShrAssign => BinaryOp::Shr,
            UshrAssign => BinaryOp::Ushr,
        };
        Some(op)
    }
}

impl Display for AssignOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Pos,
    BitNot,
    Not,
    PreInc,
    PreDec,
    PostInc,
    PostDec,
}

impl UnaryOp {
    pub fn symbol(self) -> &'static str {
        use UnaryOp::*;
        match self {
            Neg => "-",
            Pos => "+",
            BitNot => "~",
            Not => "!",
            PreInc | PostInc => "++",
            PreDec | PostDec => "--",
        }
    }

    /// Increments and decrements write to their operand.
    pub fn is_update(self) -> bool {
        use UnaryOp::*;
        match self {
            PreInc | PreDec | PostInc | PostDec => true,
            _ => false,
        }
    }
}

impl Display for UnaryOp {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum SpecialKind {
    This,
    Super,
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum BranchKind {
    Break,
    Continue,
}

impl BranchKind {
    pub fn keyword(self) -> &'static str {
        match self {
            BranchKind::Break => "break",
            BranchKind::Continue => "continue",
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum ImportKind {
    /// `import a.b.C;`
    Class,

    /// `import a.b.*;`
    Package,
}

/// The syntactic position an ambiguous name was parsed in. Restricts what the name may
/// resolve to.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum AmbiguityRole {
    /// A value.
    Expr,

    /// A type.
    TypeNode,

    /// The target of a field access or a call: a value or a type.
    Receiver,

    /// Left of a dot in a longer name: a value, a type or a package.
    Prefix,

    /// Left of a dot in a type name: a type or a package.
    Qualifier,
}

impl AmbiguityRole {
    pub fn allows_expr(self) -> bool {
        use AmbiguityRole::*;
        match self {
            Expr | Receiver | Prefix => true,
            TypeNode | Qualifier => false,
        }
    }

    pub fn allows_type(self) -> bool {
        self != AmbiguityRole::Expr
    }

    pub fn allows_package(self) -> bool {
        self == AmbiguityRole::Prefix || self == AmbiguityRole::Qualifier
    }

    pub fn name(self) -> &'static str {
        use AmbiguityRole::*;
        match self {
            Expr => "expr",
            TypeNode => "type",
            Receiver => "receiver",
            Prefix => "prefix",
            Qualifier => "qualifier",
        }
    }
}
