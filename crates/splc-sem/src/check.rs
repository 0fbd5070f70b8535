//! Type checking.
//!
//! A tree walker carrying a stack of scope ids over the declaration
//! tree the symbol table builder produced. Expression types are
//! `numeric` or `boolean`; variables are always numeric. Errors are
//! accumulated into a [`Report`] and the walk continues, so a single
//! run surfaces every diagnostic. Each error carries a contextual path
//! such as `main/algo/instr[2]`.

use splc_par::{AstNode, NodeKind};
use splc_util::NodeId;
use thiserror::Error;

use crate::scope::{ScopeId, ScopeTree, SymbolKind};

/// Maximum arity for parameter lists, local lists and call inputs.
const MAX_THREE: usize = 3;

/// Expression type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ty {
    Numeric,
    Boolean,
}

impl std::fmt::Display for Ty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Ty::Numeric => write!(f, "numeric"),
            Ty::Boolean => write!(f, "boolean"),
        }
    }
}

/// One accumulated type error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TypeError {
    #[error("{ctx}: undeclared variable '{name}'")]
    UndeclaredVariable { ctx: String, name: String },

    #[error("{ctx}: '{name}' is a {category}, not a variable")]
    NotAVariable {
        ctx: String,
        name: String,
        category: &'static str,
    },

    #[error("unary '{op}' expects a {expected} operand (id={id})")]
    UnaryOperand {
        op: String,
        expected: Ty,
        id: NodeId,
    },

    #[error("operator '{op}' requires {expected} operands (id={id})")]
    BinaryOperands {
        op: String,
        expected: Ty,
        id: NodeId,
    },

    #[error("STRING used where ATOM expected (id={id})")]
    StringAsAtom { id: NodeId },

    #[error("{ctx}: output atom must be numeric")]
    OutputNotNumeric { ctx: String },

    #[error("{ctx}: right-hand side of assignment must be numeric")]
    AssignRhsNotNumeric { ctx: String },

    #[error("{ctx}: {construct} condition must be boolean")]
    ConditionNotBoolean {
        ctx: String,
        construct: &'static str,
    },

    #[error("{ctx}: {what} '{name}' must be typeless")]
    NameNotTypeless {
        ctx: String,
        what: &'static str,
        name: String,
    },

    #[error("{ctx}: at most 3 input atoms allowed (got {count})")]
    TooManyInputs { ctx: String, count: usize },

    #[error("{ctx}: input atoms must be numeric")]
    InputNotNumeric { ctx: String },

    #[error("{ctx}: at most 3 variables allowed (got {count})")]
    TooManyVars { ctx: String, count: usize },

    #[error("{ctx}: duplicate variable '{name}' in declaration list")]
    DuplicateInList { ctx: String, name: String },

    #[error("{ctx}: function return atom must be numeric")]
    ReturnNotNumeric { ctx: String },

    #[error("{ctx}: missing return atom")]
    MissingReturn { ctx: String },

    #[error("{ctx}: malformed {what}")]
    Malformed { ctx: String, what: &'static str },
}

/// The accumulated result of a type-checking run.
#[derive(Debug, Default)]
pub struct Report {
    errors: Vec<TypeError>,
}

impl Report {
    pub fn ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn errors(&self) -> &[TypeError] {
        &self.errors
    }

    pub fn into_errors(self) -> Vec<TypeError> {
        self.errors
    }

    fn push(&mut self, error: TypeError) {
        self.errors.push(error);
    }
}

impl std::fmt::Display for Report {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.ok() {
            return write!(f, "OK");
        }
        write!(f, "Type errors:")?;
        for error in &self.errors {
            write!(f, "\n- {error}")?;
        }
        Ok(())
    }
}

/// The type checker for one compilation.
pub struct TypeChecker<'a> {
    tree: &'a mut ScopeTree,
    stack: Vec<ScopeId>,
    report: Report,
}

impl<'a> TypeChecker<'a> {
    /// Checks a PROGRAM against the declaration scope tree, pushing
    /// anonymous control-flow scopes as it walks.
    pub fn check(program: &AstNode, tree: &'a mut ScopeTree) -> Report {
        let mut checker = Self {
            tree,
            stack: vec![ScopeTree::ROOT],
            report: Report::default(),
        };
        checker.check_program(program);
        checker.report
    }

    // ----- scope helpers -----

    fn scope(&self) -> ScopeId {
        *self.stack.last().expect("scope stack never empties")
    }

    /// Enters a child scope by name, creating it if the builder did not
    /// (control-flow scopes exist only during checking).
    fn push_scope(&mut self, name: &str) {
        let current = self.scope();
        let child = self
            .tree
            .find_child(current, name)
            .unwrap_or_else(|| self.tree.add_scope(current, name));
        self.stack.push(child);
    }

    fn pop_scope(&mut self) {
        self.stack.pop();
    }

    fn is_typeless(&self, name: &str) -> bool {
        self.tree.lookup(self.scope(), name).is_none()
    }

    /// Ensures a name resolves to a variable; reports otherwise.
    fn require_var(&mut self, name: &str, ctx: &str) -> bool {
        match self.tree.lookup(self.scope(), name) {
            None => {
                self.report.push(TypeError::UndeclaredVariable {
                    ctx: ctx.to_string(),
                    name: name.to_string(),
                });
                false
            }
            Some(symbol) if symbol.category != SymbolKind::Var => {
                let category = symbol.category.name();
                self.report.push(TypeError::NotAVariable {
                    ctx: ctx.to_string(),
                    name: name.to_string(),
                    category,
                });
                false
            }
            Some(_) => true,
        }
    }

    // ----- atoms and terms -----

    fn type_atom(&mut self, node: &AstNode, ctx: &str) -> Option<Ty> {
        match node.kind {
            NodeKind::Var => {
                let name = node.value_str().unwrap_or_default().to_string();
                self.require_var(&name, ctx).then_some(Ty::Numeric)
            }
            NodeKind::Number => Some(Ty::Numeric),
            NodeKind::Str => {
                self.report.push(TypeError::StringAsAtom { id: node.id });
                None
            }
            _ => {
                self.report.push(TypeError::Malformed {
                    ctx: ctx.to_string(),
                    what: "atom",
                });
                None
            }
        }
    }

    fn type_term(&mut self, node: &AstNode, ctx: &str) -> Option<Ty> {
        match node.kind {
            NodeKind::Var | NodeKind::Number | NodeKind::Str => self.type_atom(node, ctx),

            NodeKind::UnOp => {
                let op = node.value_str().unwrap_or_default().to_string();
                let operand = self.type_term(&node.children[0], ctx);
                match op.as_str() {
                    "neg" => {
                        if operand == Some(Ty::Numeric) {
                            Some(Ty::Numeric)
                        } else {
                            self.report.push(TypeError::UnaryOperand {
                                op,
                                expected: Ty::Numeric,
                                id: node.id,
                            });
                            None
                        }
                    }
                    "not" => {
                        if operand == Some(Ty::Boolean) {
                            Some(Ty::Boolean)
                        } else {
                            self.report.push(TypeError::UnaryOperand {
                                op,
                                expected: Ty::Boolean,
                                id: node.id,
                            });
                            None
                        }
                    }
                    _ => {
                        self.report.push(TypeError::Malformed {
                            ctx: ctx.to_string(),
                            what: "unary operator",
                        });
                        None
                    }
                }
            }

            NodeKind::BinOp => {
                let op = node.value_str().unwrap_or_default().to_string();
                let lhs = self.type_term(&node.children[0], ctx);
                let rhs = self.type_term(&node.children[1], ctx);
                match op.as_str() {
                    "plus" | "minus" | "mult" | "div" => {
                        if lhs == Some(Ty::Numeric) && rhs == Some(Ty::Numeric) {
                            Some(Ty::Numeric)
                        } else {
                            self.report.push(TypeError::BinaryOperands {
                                op,
                                expected: Ty::Numeric,
                                id: node.id,
                            });
                            None
                        }
                    }
                    "and" | "or" => {
                        if lhs == Some(Ty::Boolean) && rhs == Some(Ty::Boolean) {
                            Some(Ty::Boolean)
                        } else {
                            self.report.push(TypeError::BinaryOperands {
                                op,
                                expected: Ty::Boolean,
                                id: node.id,
                            });
                            None
                        }
                    }
                    "eq" | ">" => {
                        if lhs == Some(Ty::Numeric) && rhs == Some(Ty::Numeric) {
                            Some(Ty::Boolean)
                        } else {
                            self.report.push(TypeError::BinaryOperands {
                                op,
                                expected: Ty::Numeric,
                                id: node.id,
                            });
                            None
                        }
                    }
                    _ => {
                        self.report.push(TypeError::Malformed {
                            ctx: ctx.to_string(),
                            what: "binary operator",
                        });
                        None
                    }
                }
            }

            _ => {
                self.report.push(TypeError::Malformed {
                    ctx: ctx.to_string(),
                    what: "term",
                });
                None
            }
        }
    }

    // ----- instructions -----

    fn check_output(&mut self, node: &AstNode, ctx: &str) {
        if node.kind == NodeKind::Str {
            return;
        }
        if self.type_atom(node, ctx) != Some(Ty::Numeric) {
            self.report.push(TypeError::OutputNotNumeric {
                ctx: ctx.to_string(),
            });
        }
    }

    fn check_input(&mut self, node: &AstNode, ctx: &str) {
        let atoms = &node.children;
        if atoms.len() > MAX_THREE {
            self.report.push(TypeError::TooManyInputs {
                ctx: ctx.to_string(),
                count: atoms.len(),
            });
        }
        for atom in atoms {
            if self.type_atom(atom, ctx) != Some(Ty::Numeric) {
                self.report.push(TypeError::InputNotNumeric {
                    ctx: ctx.to_string(),
                });
            }
        }
    }

    fn check_condition(&mut self, cond: &AstNode, construct: &'static str, ctx: &str) {
        if self.type_term(cond, ctx) != Some(Ty::Boolean) {
            self.report.push(TypeError::ConditionNotBoolean {
                ctx: ctx.to_string(),
                construct,
            });
        }
    }

    fn check_instr(&mut self, node: &AstNode, ctx: &str) {
        match node.kind {
            NodeKind::Halt => {}

            NodeKind::Print => match node.children.first() {
                Some(output) => self.check_output(output, &format!("{ctx}/print")),
                None => self.report.push(TypeError::Malformed {
                    ctx: ctx.to_string(),
                    what: "print",
                }),
            },

            NodeKind::Call => {
                let name = node.value_str().unwrap_or_default().to_string();
                if !self.is_typeless(&name) {
                    self.report.push(TypeError::NameNotTypeless {
                        ctx: ctx.to_string(),
                        what: "procedure/function name",
                        name,
                    });
                }
                if let Some(input) = node.children.first() {
                    self.check_input(input, &format!("{ctx}/call-input"));
                }
            }

            NodeKind::AssignCall => {
                let name = node.value_str().unwrap_or_default().to_string();
                if !self.is_typeless(&name) {
                    self.report.push(TypeError::NameNotTypeless {
                        ctx: ctx.to_string(),
                        what: "procedure/function name",
                        name,
                    });
                }
                self.check_input(&node.children[1], &format!("{ctx}/assign-call-input"));
                let target = &node.children[0];
                if target.kind == NodeKind::Var {
                    let target_name = target.value_str().unwrap_or_default().to_string();
                    self.require_var(&target_name, &format!("{ctx}/target"));
                } else {
                    self.report.push(TypeError::Malformed {
                        ctx: ctx.to_string(),
                        what: "assignment target",
                    });
                }
            }

            NodeKind::Assign => {
                let target = &node.children[0];
                let term = &node.children[1];
                if self.type_term(term, ctx) != Some(Ty::Numeric) {
                    self.report.push(TypeError::AssignRhsNotNumeric {
                        ctx: ctx.to_string(),
                    });
                }
                if target.kind == NodeKind::Var {
                    let target_name = target.value_str().unwrap_or_default().to_string();
                    self.require_var(&target_name, &format!("{ctx}/target"));
                } else {
                    self.report.push(TypeError::Malformed {
                        ctx: ctx.to_string(),
                        what: "assignment target",
                    });
                }
            }

            NodeKind::If => {
                self.check_condition(node.if_cond(), "if", ctx);
                self.push_scope("then");
                self.check_algo(node.if_then(), &format!("{ctx}/then"));
                self.pop_scope();
                if let Some(else_algo) = node.if_else() {
                    self.push_scope("else");
                    self.check_algo(else_algo, &format!("{ctx}/else"));
                    self.pop_scope();
                }
            }

            NodeKind::While => {
                let (cond, body) = node.while_parts();
                self.check_condition(cond, "while", ctx);
                self.push_scope("while");
                self.check_algo(body, &format!("{ctx}/while-body"));
                self.pop_scope();
            }

            NodeKind::DoUntil => {
                let (body, cond) = node.do_until_parts();
                self.push_scope("do");
                self.check_algo(body, &format!("{ctx}/do-body"));
                self.pop_scope();
                self.check_condition(cond, "do-until", ctx);
            }

            NodeKind::Loop => match node.children.first() {
                Some(inner)
                    if matches!(inner.kind, NodeKind::While | NodeKind::DoUntil) =>
                {
                    self.check_instr(inner, ctx)
                }
                _ => self.report.push(TypeError::Malformed {
                    ctx: ctx.to_string(),
                    what: "loop",
                }),
            },

            NodeKind::Branch => match node.children.first() {
                Some(inner) if inner.kind == NodeKind::If => self.check_instr(inner, ctx),
                _ => self.report.push(TypeError::Malformed {
                    ctx: ctx.to_string(),
                    what: "branch",
                }),
            },

            NodeKind::Return => {
                // only meaningful as the trailing instruction of a
                // function body; presence is validated by check_func
                match node.children.first() {
                    Some(atom) => {
                        if self.type_atom(atom, ctx) != Some(Ty::Numeric) {
                            self.report.push(TypeError::ReturnNotNumeric {
                                ctx: ctx.to_string(),
                            });
                        }
                    }
                    None => self.report.push(TypeError::Malformed {
                        ctx: ctx.to_string(),
                        what: "return",
                    }),
                }
            }

            _ => self.report.push(TypeError::Malformed {
                ctx: ctx.to_string(),
                what: "instruction",
            }),
        }
    }

    fn check_algo(&mut self, node: &AstNode, ctx: &str) {
        if node.kind != NodeKind::Algo {
            self.report.push(TypeError::Malformed {
                ctx: ctx.to_string(),
                what: "algorithm",
            });
            return;
        }
        if node.children.is_empty() {
            self.report.push(TypeError::Malformed {
                ctx: ctx.to_string(),
                what: "empty algorithm",
            });
            return;
        }
        for (i, instr) in node.children.iter().enumerate() {
            self.check_instr(instr, &format!("{ctx}/instr[{i}]"));
        }
    }

    // ----- declaration lists -----

    /// MAXTHREE rule: at most three entries, no duplicates in the list.
    fn check_maxthree(&mut self, vars: &[AstNode], ctx: &str) {
        if vars.len() > MAX_THREE {
            self.report.push(TypeError::TooManyVars {
                ctx: ctx.to_string(),
                count: vars.len(),
            });
        }
        let mut seen: Vec<&str> = Vec::new();
        for var in vars {
            if var.kind != NodeKind::Var {
                self.report.push(TypeError::Malformed {
                    ctx: ctx.to_string(),
                    what: "variable declaration",
                });
                continue;
            }
            let name = var.value_str().unwrap_or_default();
            if seen.contains(&name) {
                self.report.push(TypeError::DuplicateInList {
                    ctx: ctx.to_string(),
                    name: name.to_string(),
                });
            }
            seen.push(name);
        }
    }

    // ----- routines and program -----

    fn check_routine_name(&mut self, node: &AstNode, what: &'static str, ctx: &str) {
        let name = node.value_str().unwrap_or_default().to_string();
        if !self.is_typeless(&name) {
            self.report.push(TypeError::NameNotTypeless {
                ctx: ctx.to_string(),
                what,
                name,
            });
        }
    }

    fn check_proc(&mut self, node: &AstNode, ctx: &str) {
        self.check_routine_name(node, "procedure name", ctx);
        let name = node.value_str().unwrap_or_default();
        self.push_scope(&format!("proc {name}"));
        self.check_maxthree(node.params(), &format!("{ctx}/params"));
        match node.routine_body() {
            Some(body) => self.check_body(body, &format!("{ctx}/body"), None),
            None => self.report.push(TypeError::Malformed {
                ctx: ctx.to_string(),
                what: "procedure body",
            }),
        }
        self.pop_scope();
    }

    fn check_func(&mut self, node: &AstNode, ctx: &str) {
        self.check_routine_name(node, "function name", ctx);
        let name = node.value_str().unwrap_or_default();
        self.push_scope(&format!("func {name}"));
        self.check_maxthree(node.params(), &format!("{ctx}/params"));
        match node.routine_body() {
            Some(body) => {
                self.check_body(body, &format!("{ctx}/body"), Some(node));
            }
            None => self.report.push(TypeError::Malformed {
                ctx: ctx.to_string(),
                what: "function body",
            }),
        }
        self.pop_scope();
    }

    /// BODY = [LOCALS_BLOCK, ALGO]. For functions, the return atom is
    /// validated while the body scope is still open so locals are in
    /// view.
    fn check_body(&mut self, body: &AstNode, ctx: &str, func: Option<&AstNode>) {
        if body.kind != NodeKind::Body || body.children.len() < 2 {
            self.report.push(TypeError::Malformed {
                ctx: ctx.to_string(),
                what: "body",
            });
            return;
        }
        self.push_scope("body");
        self.check_maxthree(&body.body_locals().children, &format!("{ctx}/locals"));
        self.check_algo(body.body_algo(), &format!("{ctx}/algo"));
        if let Some(func_node) = func {
            self.check_func_return(func_node, body, &format!("{ctx}/return"));
        }
        self.pop_scope();
    }

    /// A function needs a numeric return atom: an explicit trailing
    /// child, a trailing RETURN instruction, or both.
    fn check_func_return(&mut self, func: &AstNode, body: &AstNode, ctx: &str) {
        let explicit = func.func_return_atom();
        if let Some(atom) = explicit {
            if self.type_atom(atom, ctx) != Some(Ty::Numeric) {
                self.report.push(TypeError::ReturnNotNumeric {
                    ctx: ctx.to_string(),
                });
            }
        }

        // a trailing RETURN instruction was already typed by check_algo
        let has_return_instr = body
            .body_algo()
            .children
            .last()
            .map(|last| last.kind == NodeKind::Return)
            .unwrap_or(false);

        if explicit.is_none() && !has_return_instr {
            self.report.push(TypeError::MissingReturn {
                ctx: ctx.to_string(),
            });
        }
    }

    fn check_program(&mut self, program: &AstNode) {
        if program.kind != NodeKind::Program || program.children.len() != 4 {
            self.report.push(TypeError::Malformed {
                ctx: "program".to_string(),
                what: "program",
            });
            return;
        }

        self.push_scope("global");

        // globals were declared by the symbol table builder; the block
        // itself only needs shape checking here
        for var in &program.globals().children {
            if var.kind != NodeKind::Var {
                self.report.push(TypeError::Malformed {
                    ctx: "globals".to_string(),
                    what: "variable declaration",
                });
            }
        }

        for (i, proc) in program.procs().children.iter().enumerate() {
            if proc.kind != NodeKind::Proc {
                self.report.push(TypeError::Malformed {
                    ctx: format!("proc[{i}]"),
                    what: "procedure",
                });
                continue;
            }
            self.check_proc(proc, &format!("proc[{i}]"));
        }

        for (i, func) in program.funcs().children.iter().enumerate() {
            if func.kind != NodeKind::Func {
                self.report.push(TypeError::Malformed {
                    ctx: format!("func[{i}]"),
                    what: "function",
                });
                continue;
            }
            self.check_func(func, &format!("func[{i}]"));
        }

        let main = program.main();
        if main.kind != NodeKind::Main || main.children.len() < 2 {
            self.report.push(TypeError::Malformed {
                ctx: "main".to_string(),
                what: "main",
            });
        } else {
            self.push_scope("main");
            self.check_algo(main.main_algo(), "main/algo");
            self.pop_scope();
        }

        self.pop_scope();
    }
}
