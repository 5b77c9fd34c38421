//! Abstract syntax tree.
//!
//! Nodes live in one owning `Vec` inside [`Ast`] and are referred to by
//! [`NodeId`], so `parent` is a plain index rather than a second owner
//! creating a reference cycle. The closed `NodeKind` enum has one
//! variant per construct with its operands as typed fields, not a
//! generic `{children, props}` bag; things like `is_array`/
//! `pointer_depth`/`dimensions` are typed fields on the declarator
//! variants that own them rather than a loose property map.

use serde::Serialize;

use crate::token::Punct;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct NodeId(pub u32);

#[derive(Debug, Clone, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    pub line: u32,
    pub column: u32,
    pub parent: Option<NodeId>,
}

#[derive(Debug, Default, Clone, Serialize)]
pub struct Ast {
    nodes: Vec<Node>,
    root: Option<NodeId>,
}

impl Ast {
    pub fn new() -> Self {
        Self { nodes: Vec::new(), root: None }
    }

    /// Set once, by the parser, after the `TranslationUnit` node (whose
    /// children must already exist) has been allocated — it is therefore
    /// never node 0, so the root is tracked explicitly rather than assumed.
    pub fn set_root(&mut self, id: NodeId) {
        self.root = Some(id);
    }

    pub fn root(&self) -> NodeId {
        self.root.expect("Ast::root() called before the parser set a root node")
    }

    pub fn get(&self, id: NodeId) -> &Node {
        &self.nodes[id.0 as usize]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.0 as usize].kind
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Allocate a node and back-link its immediate children's `parent`
    /// field to it. Children must already exist in the arena — callers
    /// build bottom-up, exactly as a recursive-descent parser naturally
    /// does (innermost expressions first).
    pub fn alloc(&mut self, kind: NodeKind, line: u32, column: u32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        let children = kind.children();
        self.nodes.push(Node { kind, line, column, parent: None });
        for child in children {
            self.nodes[child.0 as usize].parent = Some(id);
        }
        id
    }

    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.get(id).kind.children()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
    LogicalAnd,
    LogicalOr,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum UnaryOp {
    Plus,
    Neg,
    Not,
    BitNot,
    Deref,
    AddrOf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum IncDecOp {
    Inc,
    Dec,
}

/// Compound-assignment operator; `None` spelled `=` is handled in
/// `AssignExpr.op` as `Assign`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    BitOr,
    BitXor,
    BitAnd,
    Shl,
    Shr,
}

impl AssignOp {
    pub fn from_punct(p: Punct) -> Option<AssignOp> {
        Some(match p {
            Punct::Assign => AssignOp::Assign,
            Punct::PlusAssign => AssignOp::Add,
            Punct::MinusAssign => AssignOp::Sub,
            Punct::StarAssign => AssignOp::Mul,
            Punct::SlashAssign => AssignOp::Div,
            Punct::PercentAssign => AssignOp::Mod,
            Punct::PipeAssign => AssignOp::BitOr,
            Punct::CaretAssign => AssignOp::BitXor,
            Punct::AmpAssign => AssignOp::BitAnd,
            Punct::ShlAssign => AssignOp::Shl,
            Punct::ShrAssign => AssignOp::Shr,
            _ => return None,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StorageClass {
    Typedef,
    Extern,
    Static,
    Auto,
    Register,
    ThreadLocal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TypeQualifier {
    Const,
    Volatile,
    Restrict,
    Atomic,
}

/// A declarator's base type name plus the pointer/array shape wrapped
/// around it. Deliberately simplified rather than a full C type system.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TypeName {
    pub base: String,
    pub pointer_depth: u32,
    pub dimensions: Vec<Option<i64>>,
}

impl TypeName {
    pub fn is_pointer(&self) -> bool {
        self.pointer_depth > 0
    }
    pub fn is_array(&self) -> bool {
        !self.dimensions.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Declarator {
    pub name: String,
    pub ty: TypeName,
}

#[derive(Debug, Clone, Serialize)]
pub enum NodeKind {
    // --- Declarations ---------------------------------------------------
    TranslationUnit { decls: Vec<NodeId> },
    FunctionDef { name: String, return_type: TypeName, params: Vec<NodeId>, variadic: bool, body: NodeId },
    FunctionDecl { name: String, return_type: TypeName, params: Vec<NodeId>, variadic: bool },
    VarDecl { declarator: Declarator, storage: Option<StorageClass>, qualifiers: Vec<TypeQualifier>, init: Option<NodeId> },
    MultiVarDecl { decls: Vec<NodeId> },
    TypedefDecl { name: String, ty: TypeName },
    EmptyDeclaration,
    StructSpecifier { tag: Option<String>, members: Vec<NodeId> },
    UnionSpecifier { tag: Option<String>, members: Vec<NodeId> },
    EnumSpecifier { tag: Option<String>, enumerators: Vec<NodeId> },
    Enumerator { name: String, value: Option<NodeId> },
    StructMemberDecl { members: Vec<NodeId> },
    StructMember { name: String, ty: TypeName, bitfield: Option<NodeId> },
    Parameter { name: Option<String>, ty: TypeName },

    // --- Statements -------------------------------------------------------
    CompoundStmt { stmts: Vec<NodeId> },
    ExprStmt { expr: NodeId },
    EmptyStmt,
    IfStmt { cond: NodeId, then_branch: NodeId, else_branch: Option<NodeId> },
    SwitchStmt { cond: NodeId, body: NodeId },
    WhileStmt { cond: NodeId, body: NodeId },
    DoWhileStmt { body: NodeId, cond: NodeId },
    ForStmt { init: NodeId, cond: NodeId, inc: NodeId, body: NodeId },
    BreakStmt,
    ContinueStmt,
    ReturnStmt { value: Option<NodeId> },
    GotoStmt { label: String },
    LabeledStmt { label: String, stmt: NodeId },
    CaseStmt { value: NodeId, stmt: NodeId },
    DefaultStmt { stmt: NodeId },

    // --- Expressions --------------------------------------------------
    IdentifierExpr { name: String },
    IntLiteral { value: i64 },
    FloatLiteral { value: f64 },
    CharLiteral { value: u32 },
    StringLiteral { value: String },
    Utf8CharLiteral { value: u32 },
    Utf8StringLiteral { value: String },
    BoolLiteral { value: bool },
    NullptrLiteral,
    AssignExpr { op: AssignOp, target: NodeId, value: NodeId },
    ConditionalExpr { cond: NodeId, then_expr: NodeId, else_expr: NodeId },
    BinaryExpr { op: BinOp, lhs: NodeId, rhs: NodeId },
    CastExpr { ty: TypeName, expr: NodeId },
    UnaryExpr { op: UnaryOp, expr: NodeId },
    PrefixExpr { op: IncDecOp, expr: NodeId },
    PostfixExpr { op: IncDecOp, expr: NodeId },
    SizeofExpr { expr: NodeId },
    SizeofType { ty: TypeName },
    AlignofExpr { ty: TypeName },
    CallExpr { callee: NodeId, args: Vec<NodeId> },
    ArraySubscriptExpr { array: NodeId, index: NodeId },
    MemberExpr { object: NodeId, member: String },
    ArrowExpr { object: NodeId, member: String },
    CommaExpr { exprs: Vec<NodeId> },
    InitializerList { elements: Vec<NodeId> },
    DesignatedInit { designators: Vec<NodeId>, value: NodeId },
    ArrayDesignator { index: NodeId },
    MemberDesignator { member: String },
    GenericSelection { controlling: NodeId, associations: Vec<NodeId> },
    GenericAssociation { ty: TypeName, expr: NodeId },
    GenericDefault { expr: NodeId },
}

impl NodeKind {
    /// Ordered children — order is semantically significant (e.g. an
    /// `if`'s condition always precedes its branches). Used both by the
    /// interpreter to walk the tree and by tests verifying arity (an
    /// `IfStmt` has 2 or 3 children, a `ForStmt` exactly 4, every
    /// binary-expr kind exactly 2, a `CallExpr` at least 1).
    pub fn children(&self) -> Vec<NodeId> {
        use NodeKind::*;
        match self {
            TranslationUnit { decls } => decls.clone(),
            FunctionDef { params, body, .. } => params.iter().copied().chain([*body]).collect(),
            FunctionDecl { params, .. } => params.clone(),
            VarDecl { init, .. } => init.iter().copied().collect(),
            MultiVarDecl { decls } => decls.clone(),
            TypedefDecl { .. } => vec![],
            EmptyDeclaration => vec![],
            StructSpecifier { members, .. } => members.clone(),
            UnionSpecifier { members, .. } => members.clone(),
            EnumSpecifier { enumerators, .. } => enumerators.clone(),
            Enumerator { value, .. } => value.iter().copied().collect(),
            StructMemberDecl { members, .. } => members.clone(),
            StructMember { bitfield, .. } => bitfield.iter().copied().collect(),
            Parameter { .. } => vec![],

            CompoundStmt { stmts } => stmts.clone(),
            ExprStmt { expr } => vec![*expr],
            EmptyStmt => vec![],
            IfStmt { cond, then_branch, else_branch } => {
                let mut v = vec![*cond, *then_branch];
                if let Some(e) = else_branch {
                    v.push(*e);
                }
                v
            }
            SwitchStmt { cond, body } => vec![*cond, *body],
            WhileStmt { cond, body } => vec![*cond, *body],
            DoWhileStmt { body, cond } => vec![*body, *cond],
            ForStmt { init, cond, inc, body } => vec![*init, *cond, *inc, *body],
            BreakStmt | ContinueStmt => vec![],
            ReturnStmt { value } => value.iter().copied().collect(),
            GotoStmt { .. } => vec![],
            LabeledStmt { stmt, .. } => vec![*stmt],
            CaseStmt { value, stmt } => vec![*value, *stmt],
            DefaultStmt { stmt } => vec![*stmt],

            IdentifierExpr { .. } => vec![],
            IntLiteral { .. } => vec![],
            FloatLiteral { .. } => vec![],
            CharLiteral { .. } => vec![],
            StringLiteral { .. } => vec![],
            Utf8CharLiteral { .. } => vec![],
            Utf8StringLiteral { .. } => vec![],
            BoolLiteral { .. } => vec![],
            NullptrLiteral => vec![],
            AssignExpr { target, value, .. } => vec![*target, *value],
            ConditionalExpr { cond, then_expr, else_expr } => vec![*cond, *then_expr, *else_expr],
            BinaryExpr { lhs, rhs, .. } => vec![*lhs, *rhs],
            CastExpr { expr, .. } => vec![*expr],
            UnaryExpr { expr, .. } => vec![*expr],
            PrefixExpr { expr, .. } => vec![*expr],
            PostfixExpr { expr, .. } => vec![*expr],
            SizeofExpr { expr } => vec![*expr],
            SizeofType { .. } => vec![],
            AlignofExpr { .. } => vec![],
            CallExpr { callee, args } => {
                let mut v = vec![*callee];
                v.extend(args.iter().copied());
                v
            }
            ArraySubscriptExpr { array, index } => vec![*array, *index],
            MemberExpr { object, .. } => vec![*object],
            ArrowExpr { object, .. } => vec![*object],
            CommaExpr { exprs } => exprs.clone(),
            InitializerList { elements } => elements.clone(),
            DesignatedInit { designators, value } => {
                let mut v = designators.clone();
                v.push(*value);
                v
            }
            ArrayDesignator { index } => vec![*index],
            MemberDesignator { .. } => vec![],
            GenericSelection { controlling, associations } => {
                let mut v = vec![*controlling];
                v.extend(associations.iter().copied());
                v
            }
            GenericAssociation { expr, .. } => vec![*expr],
            GenericDefault { expr } => vec![*expr],
        }
    }

    pub fn is_binary_expr(&self) -> bool {
        matches!(self, NodeKind::BinaryExpr { .. })
    }
}
