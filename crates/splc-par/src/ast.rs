//! Typed, identified abstract syntax tree.
//!
//! Every node is the same shape — `(id, kind, value, children)` — so
//! generic walks stay uniform, while the accessors below give each kind
//! its named children. Node ids come from a per-compilation
//! [`NodeIdGen`](splc_util::NodeIdGen) and are unique for the duration
//! of a compilation.

use splc_util::NodeId;

/// The closed set of AST node kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    // structure
    Program,
    Globals,
    Procs,
    Funcs,
    Main,
    Vars,
    LocalsBlock,
    Body,
    Algo,

    // declarations
    Var,
    Proc,
    Func,

    // instructions
    Halt,
    Print,
    Assign,
    AssignCall,
    Call,
    Loop,
    Branch,
    Return,
    While,
    DoUntil,
    If,
    Input,

    // terms
    UnOp,
    BinOp,
    Number,
    Str,
}

impl NodeKind {
    /// The display name, matching the tree dumps in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Program => "PROGRAM",
            NodeKind::Globals => "GLOBALS",
            NodeKind::Procs => "PROCS",
            NodeKind::Funcs => "FUNCS",
            NodeKind::Main => "MAIN",
            NodeKind::Vars => "VARS",
            NodeKind::LocalsBlock => "LOCALS_BLOCK",
            NodeKind::Body => "BODY",
            NodeKind::Algo => "ALGO",
            NodeKind::Var => "VAR",
            NodeKind::Proc => "PROC",
            NodeKind::Func => "FUNC",
            NodeKind::Halt => "HALT",
            NodeKind::Print => "PRINT",
            NodeKind::Assign => "ASSIGN",
            NodeKind::AssignCall => "ASSIGN_CALL",
            NodeKind::Call => "CALL",
            NodeKind::Loop => "LOOP",
            NodeKind::Branch => "BRANCH",
            NodeKind::Return => "RETURN",
            NodeKind::While => "WHILE",
            NodeKind::DoUntil => "DO_UNTIL",
            NodeKind::If => "IF",
            NodeKind::Input => "INPUT",
            NodeKind::UnOp => "UNOP",
            NodeKind::BinOp => "BINOP",
            NodeKind::Number => "NUMBER",
            NodeKind::Str => "STRING",
        }
    }
}

impl std::fmt::Display for NodeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One AST node: id, kind, optional scalar value, owned children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AstNode {
    pub id: NodeId,
    pub kind: NodeKind,
    /// Name text, literal text, or operator name, depending on kind.
    pub value: Option<String>,
    pub children: Vec<AstNode>,
}

impl AstNode {
    pub fn new(id: NodeId, kind: NodeKind) -> Self {
        Self {
            id,
            kind,
            value: None,
            children: Vec::new(),
        }
    }

    pub fn with_value(id: NodeId, kind: NodeKind, value: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            value: Some(value.into()),
            children: Vec::new(),
        }
    }

    pub fn with_children(id: NodeId, kind: NodeKind, children: Vec<AstNode>) -> Self {
        Self {
            id,
            kind,
            value: None,
            children,
        }
    }

    /// The node's scalar value, if any.
    pub fn value_str(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// True for the expression atoms: a variable use or a number.
    pub fn is_atom(&self) -> bool {
        matches!(self.kind, NodeKind::Var | NodeKind::Number)
    }

    // ----- named accessors per kind -----

    /// PROGRAM → its GLOBALS child.
    pub fn globals(&self) -> &AstNode {
        debug_assert_eq!(self.kind, NodeKind::Program);
        &self.children[0]
    }

    /// PROGRAM → its PROCS child.
    pub fn procs(&self) -> &AstNode {
        debug_assert_eq!(self.kind, NodeKind::Program);
        &self.children[1]
    }

    /// PROGRAM → its FUNCS child.
    pub fn funcs(&self) -> &AstNode {
        debug_assert_eq!(self.kind, NodeKind::Program);
        &self.children[2]
    }

    /// PROGRAM → its MAIN child.
    pub fn main(&self) -> &AstNode {
        debug_assert_eq!(self.kind, NodeKind::Program);
        &self.children[3]
    }

    /// MAIN → its VARS child.
    pub fn main_vars(&self) -> &AstNode {
        debug_assert_eq!(self.kind, NodeKind::Main);
        &self.children[0]
    }

    /// MAIN → its ALGO child.
    pub fn main_algo(&self) -> &AstNode {
        debug_assert_eq!(self.kind, NodeKind::Main);
        &self.children[1]
    }

    /// BODY → its LOCALS_BLOCK child.
    pub fn body_locals(&self) -> &AstNode {
        debug_assert_eq!(self.kind, NodeKind::Body);
        &self.children[0]
    }

    /// BODY → its ALGO child.
    pub fn body_algo(&self) -> &AstNode {
        debug_assert_eq!(self.kind, NodeKind::Body);
        &self.children[1]
    }

    /// PROC/FUNC → its parameter VAR children.
    pub fn params(&self) -> &[AstNode] {
        debug_assert!(matches!(self.kind, NodeKind::Proc | NodeKind::Func));
        let body_at = self
            .children
            .iter()
            .position(|c| c.kind == NodeKind::Body)
            .unwrap_or(self.children.len());
        &self.children[..body_at]
    }

    /// PROC/FUNC → its BODY child, if present.
    pub fn routine_body(&self) -> Option<&AstNode> {
        debug_assert!(matches!(self.kind, NodeKind::Proc | NodeKind::Func));
        self.children.iter().find(|c| c.kind == NodeKind::Body)
    }

    /// FUNC → its explicit trailing return atom, if present.
    pub fn func_return_atom(&self) -> Option<&AstNode> {
        debug_assert_eq!(self.kind, NodeKind::Func);
        match self.children.last() {
            Some(last) if last.kind != NodeKind::Body => Some(last),
            _ => None,
        }
    }

    /// IF → its condition TERM.
    pub fn if_cond(&self) -> &AstNode {
        debug_assert_eq!(self.kind, NodeKind::If);
        &self.children[0]
    }

    /// IF → its then ALGO.
    pub fn if_then(&self) -> &AstNode {
        debug_assert_eq!(self.kind, NodeKind::If);
        &self.children[1]
    }

    /// IF → its else ALGO, if present.
    pub fn if_else(&self) -> Option<&AstNode> {
        debug_assert_eq!(self.kind, NodeKind::If);
        self.children.get(2)
    }

    /// WHILE → (condition, body).
    pub fn while_parts(&self) -> (&AstNode, &AstNode) {
        debug_assert_eq!(self.kind, NodeKind::While);
        (&self.children[0], &self.children[1])
    }

    /// DO_UNTIL → (body, condition).
    pub fn do_until_parts(&self) -> (&AstNode, &AstNode) {
        debug_assert_eq!(self.kind, NodeKind::DoUntil);
        (&self.children[0], &self.children[1])
    }

    /// Renders the tree in the indented diagnostic format.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.pretty_into(&mut out, 0);
        out
    }

    fn pretty_into(&self, out: &mut String, indent: usize) {
        for _ in 0..indent {
            out.push_str("  ");
        }
        out.push_str(self.kind.name());
        if let Some(value) = &self.value {
            out.push_str(": ");
            out.push_str(value);
        }
        out.push_str(&format!(" (id={})\n", self.id));
        for child in &self.children {
            child.pretty_into(out, indent + 1);
        }
    }

    /// Visits every node in the tree, parents before children.
    pub fn walk(&self, visit: &mut impl FnMut(&AstNode)) {
        visit(self);
        for child in &self.children {
            child.walk(visit);
        }
    }
}
