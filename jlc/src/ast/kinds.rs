use crate::ast::declarations::*;
use crate::ast::expressions::*;
use crate::ast::names::*;
use crate::ast::statements::*;
use enum_dispatch::enum_dispatch;
use std::fmt::{self, Display, Formatter};

/// Kind-specific contents of a syntax node.
#[enum_dispatch]
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Ambiguous(Ambiguous),
    CanonicalType(CanonicalType),
    ArrayTypeNode(ArrayTypeNode),
    PackageNode(PackageNode),
    Error(Erroneous),

    Lit(Lit),
    NullLit(NullLit),
    Local(Local),
    Field(Field),
    Call(Call),
    New(New),
    NewArray(NewArray),
    ArrayInit(ArrayInit),
    ArrayAccess(ArrayAccess),
    Assign(Assign),
    Binary(Binary),
    Unary(Unary),
    Cast(Cast),
    Instanceof(Instanceof),
    Conditional(Conditional),
    Special(Special),
    ClassLit(ClassLit),

    Block(Block),
    Empty(Empty),
    Eval(Eval),
    LocalDecl(LocalDecl),
    If(If),
    While(While),
    Do(Do),
    For(For),
    Switch(Switch),
    Case(Case),
    SwitchBlock(SwitchBlock),
    Try(Try),
    Catch(Catch),
    Formal(Formal),
    Throw(Throw),
    Return(Return),
    Branch(Branch),
    Labeled(Labeled),

    FieldDecl(FieldDecl),
    MethodDecl(MethodDecl),
    Initializer(Initializer),
    ClassDecl(ClassDecl),
    Import(Import),
    SourceFile(SourceFile),
}

/// Common behavior for all node kinds.
#[enum_dispatch(NodeKind)]
pub trait KindInfo {
    fn tag(&self) -> NodeTag;
}

/// Identifies a node kind without its contents. Used as the key of extension rule tables.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
pub enum NodeTag {
    Ambiguous,
    CanonicalType,
    ArrayTypeNode,
    PackageNode,
    Error,
    Lit,
    NullLit,
    Local,
    Field,
    Call,
    New,
    NewArray,
    ArrayInit,
    ArrayAccess,
    Assign,
    Binary,
    Unary,
    Cast,
    Instanceof,
    Conditional,
    Special,
    ClassLit,
    Block,
    Empty,
    Eval,
    LocalDecl,
    If,
    While,
    Do,
    For,
    Switch,
    Case,
    SwitchBlock,
    Try,
    Catch,
    Formal,
    Throw,
    Return,
    Branch,
    Labeled,
    FieldDecl,
    MethodDecl,
    Initializer,
    ClassDecl,
    Import,
    SourceFile,
}

macro_rules! impl_kind_info {
    ($($payload:ident => $tag:ident),* $(,)?) => {
        $(
            impl KindInfo for $payload {
                fn tag(&self) -> NodeTag {
                    NodeTag::$tag
                }
            }
        )*
    };
}

impl_kind_info! {
    Ambiguous => Ambiguous,
    CanonicalType => CanonicalType,
    ArrayTypeNode => ArrayTypeNode,
    PackageNode => PackageNode,
    Erroneous => Error,
    Lit => Lit,
    NullLit => NullLit,
    Local => Local,
    Field => Field,
    Call => Call,
    New => New,
    NewArray => NewArray,
    ArrayInit => ArrayInit,
    ArrayAccess => ArrayAccess,
    Assign => Assign,
    Binary => Binary,
    Unary => Unary,
    Cast => Cast,
    Instanceof => Instanceof,
    Conditional => Conditional,
    Special => Special,
    ClassLit => ClassLit,
    Block => Block,
    Empty => Empty,
    Eval => Eval,
    LocalDecl => LocalDecl,
    If => If,
    While => While,
    Do => Do,
    For => For,
    Switch => Switch,
    Case => Case,
    SwitchBlock => SwitchBlock,
    Try => Try,
    Catch => Catch,
    Formal => Formal,
    Throw => Throw,
    Return => Return,
    Branch => Branch,
    Labeled => Labeled,
    FieldDecl => FieldDecl,
    MethodDecl => MethodDecl,
    Initializer => Initializer,
    ClassDecl => ClassDecl,
    Import => Import,
    SourceFile => SourceFile,
}

impl NodeTag {
    pub fn name(self) -> &'static str {
        use NodeTag::*;
        match self {
            Ambiguous => "ambiguous",
            CanonicalType => "type",
            ArrayTypeNode => "array-type",
            PackageNode => "package",
            Error => "error",
            Lit => "lit",
            NullLit => "null",
            Local => "local",
            Field => "field",
            Call => "call",
            New => "new",
            NewArray => "new-array",
            ArrayInit => "array-init",
            ArrayAccess => "index",
            Assign => "assign",
            Binary => "binary",
            Unary => "unary",
            Cast => "cast",
            Instanceof => "instanceof",
            Conditional => "conditional",
            Special => "special",
            ClassLit => "class-lit",
            Block => "block",
            Empty => "empty",
            Eval => "eval",
            LocalDecl => "local-decl",
            If => "if",
            While => "while",
            Do => "do",
            For => "for",
            Switch => "switch",
            Case => "case",
            SwitchBlock => "switch-block",
            Try => "try",
            Catch => "catch",
            Formal => "formal",
            Throw => "throw",
            Return => "return",
            Branch => "branch",
            Labeled => "labeled",
            FieldDecl => "field-decl",
            MethodDecl => "method-decl",
            Initializer => "initializer",
            ClassDecl => "class-decl",
            Import => "import",
            SourceFile => "source-file",
        }
    }

    /// Nodes that denote values and get a type from the type checker.
    pub fn is_expression(self) -> bool {
        use NodeTag::*;
        match self {
            Lit | NullLit | Local | Field | Call | New | NewArray | ArrayInit | ArrayAccess
            | Assign | Binary | Unary | Cast | Instanceof | Conditional | Special | ClassLit => true,
            _ => false,
        }
    }

    /// Nodes that denote types (or could, before disambiguation).
    pub fn is_type_node(self) -> bool {
        use NodeTag::*;
        match self {
            CanonicalType | ArrayTypeNode => true,
            _ => false,
        }
    }

    pub fn is_statement(self) -> bool {
        use NodeTag::*;
        match self {
            Block | Empty | Eval | LocalDecl | If | While | Do | For | Switch | Case
            | SwitchBlock | Try | Throw | Return | Branch | Labeled => true,
            _ => false,
        }
    }

    /// Statements without nested statements. Any of them may throw `java.lang.Error`.
    pub fn is_simple_statement(self) -> bool {
        use NodeTag::*;
        match self {
            Empty | Eval | LocalDecl | Throw | Return | Branch | Case => true,
            _ => false,
        }
    }

    /// Nodes that own a body of code with its own flow graph.
    pub fn is_code_decl(self) -> bool {
        use NodeTag::*;
        match self {
            MethodDecl | Initializer | FieldDecl => true,
            _ => false,
        }
    }
}

impl Display for NodeTag {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
