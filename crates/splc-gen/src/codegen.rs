//! Three-address-style code generation.
//!
//! Walks the type-checked AST and emits [`Instr`] lines for MAIN's
//! algorithm. Fresh temporaries (`t1, t2, …`) and labels (`L1, L2, …`)
//! come from counters owned by the generator, so each compilation is
//! deterministic. Variables are emitted under their mangled
//! `<scope>_<name>` form after a successful lookup; a miss falls back
//! to the bare name, which a type-clean tree never produces.

use splc_par::{AstNode, NodeKind};
use splc_sem::{ScopeId, ScopeTree};

use crate::ir::Instr;

/// Code generator for one compilation.
pub struct CodeGenerator<'a> {
    tree: &'a ScopeTree,
    scope: ScopeId,
    temp_counter: u32,
    label_counter: u32,
}

impl<'a> CodeGenerator<'a> {
    /// Creates a generator resolving variables from the given scope.
    pub fn new(tree: &'a ScopeTree, scope: ScopeId) -> Self {
        Self {
            tree,
            scope,
            temp_counter: 0,
            label_counter: 0,
        }
    }

    /// Generates the instruction sequence for a PROGRAM node,
    /// resolving variables from the `main` scope.
    pub fn generate_program(program: &AstNode, tree: &'a ScopeTree) -> Vec<Instr> {
        let scope = tree
            .find_path(&["global", "main"])
            .unwrap_or(ScopeTree::ROOT);
        let mut generator = CodeGenerator::new(tree, scope);
        let mut out = Vec::new();
        if program.kind == NodeKind::Program && program.children.len() == 4 {
            generator.emit_algo(program.main().main_algo(), &mut out);
        }
        out
    }

    /// Generates the instruction sequence for one ALGO node.
    pub fn generate_algo(&mut self, algo: &AstNode) -> Vec<Instr> {
        let mut out = Vec::new();
        self.emit_algo(algo, &mut out);
        out
    }

    fn new_temp(&mut self) -> String {
        self.temp_counter += 1;
        format!("t{}", self.temp_counter)
    }

    fn new_label(&mut self) -> String {
        self.label_counter += 1;
        format!("L{}", self.label_counter)
    }

    /// The target-code name of a variable: mangled when the lookup
    /// succeeds, bare otherwise.
    fn var_operand(&self, name: &str) -> String {
        match self.tree.lookup(self.scope, name) {
            Some(symbol) => symbol.mangled(),
            None => name.to_string(),
        }
    }

    fn emit_algo(&mut self, algo: &AstNode, out: &mut Vec<Instr>) {
        for instr in &algo.children {
            self.emit_instr(instr, out);
        }
    }

    fn emit_instr(&mut self, node: &AstNode, out: &mut Vec<Instr>) {
        match node.kind {
            NodeKind::Halt => out.push(Instr::Stop),

            NodeKind::Print => {
                let output = &node.children[0];
                match output.kind {
                    NodeKind::Str => {
                        out.push(Instr::PrintStr(
                            output.value_str().unwrap_or_default().to_string(),
                        ));
                    }
                    _ => {
                        let operand = self.emit_term(output, out);
                        out.push(Instr::PrintOperand(operand));
                    }
                }
            }

            NodeKind::Assign => {
                let target = &node.children[0];
                let rhs = self.emit_term(&node.children[1], out);
                let name = target.value_str().unwrap_or_default();
                out.push(Instr::Assign {
                    target: self.var_operand(name),
                    rhs,
                });
            }

            // calls stay opaque markers until a call convention exists;
            // the assigned variable is left untouched
            NodeKind::Call | NodeKind::AssignCall => {
                let name = node.value_str().unwrap_or_default().to_string();
                out.push(Instr::Call(name));
            }

            NodeKind::Loop => {
                if let Some(inner) = node.children.first() {
                    self.emit_instr(inner, out);
                }
            }

            NodeKind::Branch => {
                if let Some(inner) = node.children.first() {
                    self.emit_instr(inner, out);
                }
            }

            NodeKind::If => self.emit_if(node, out),
            NodeKind::While => self.emit_while(node, out),
            NodeKind::DoUntil => self.emit_do_until(node, out),

            // return only appears in routine bodies, which compile to
            // call markers
            NodeKind::Return => {}

            _ => {}
        }
    }

    /// `if c { then }`:
    ///
    /// ```text
    ///   <cond code>
    ///   IF <cond> = 1 THEN Lt
    ///   GOTO Lx
    ///   REM Lt
    ///   <then>
    ///   REM Lx
    /// ```
    ///
    /// With an else branch the fall-through path holds the else body:
    ///
    /// ```text
    ///   <cond code>
    ///   IF <cond> = 1 THEN Lt
    ///   <else>
    ///   GOTO Lx
    ///   REM Lt
    ///   <then>
    ///   REM Lx
    /// ```
    fn emit_if(&mut self, node: &AstNode, out: &mut Vec<Instr>) {
        let label_true = self.new_label();
        let label_exit = self.new_label();

        let cond = self.emit_term(node.if_cond(), out);
        out.push(Instr::IfThen {
            cond,
            target: label_true.clone(),
        });

        match node.if_else() {
            Some(else_algo) => {
                self.emit_algo(else_algo, out);
                out.push(Instr::Goto(label_exit.clone()));
                out.push(Instr::Label(label_true));
                self.emit_algo(node.if_then(), out);
                out.push(Instr::Label(label_exit));
            }
            None => {
                out.push(Instr::Goto(label_exit.clone()));
                out.push(Instr::Label(label_true));
                self.emit_algo(node.if_then(), out);
                out.push(Instr::Label(label_exit));
            }
        }
    }

    /// `while c { body }`:
    ///
    /// ```text
    ///   REM Ls
    ///   <cond code>
    ///   IF <cond> = 1 THEN Lb
    ///   GOTO Lx
    ///   REM Lb
    ///   <body>
    ///   GOTO Ls
    ///   REM Lx
    /// ```
    fn emit_while(&mut self, node: &AstNode, out: &mut Vec<Instr>) {
        let (cond_node, body) = node.while_parts();
        let label_start = self.new_label();
        let label_body = self.new_label();
        let label_exit = self.new_label();

        out.push(Instr::Label(label_start.clone()));
        let cond = self.emit_term(cond_node, out);
        out.push(Instr::IfThen {
            cond,
            target: label_body.clone(),
        });
        out.push(Instr::Goto(label_exit.clone()));
        out.push(Instr::Label(label_body));
        self.emit_algo(body, out);
        out.push(Instr::Goto(label_start));
        out.push(Instr::Label(label_exit));
    }

    /// `do { body } until c`:
    ///
    /// ```text
    ///   REM Ls
    ///   <body>
    ///   <cond code>
    ///   IF <cond> = 1 THEN Lx
    ///   GOTO Ls
    ///   REM Lx
    /// ```
    fn emit_do_until(&mut self, node: &AstNode, out: &mut Vec<Instr>) {
        let (body, cond_node) = node.do_until_parts();
        let label_start = self.new_label();
        let label_exit = self.new_label();

        out.push(Instr::Label(label_start.clone()));
        self.emit_algo(body, out);
        let cond = self.emit_term(cond_node, out);
        out.push(Instr::IfThen {
            cond,
            target: label_exit.clone(),
        });
        out.push(Instr::Goto(label_start));
        out.push(Instr::Label(label_exit));
    }

    /// Generates a term and returns its result operand.
    fn emit_term(&mut self, node: &AstNode, out: &mut Vec<Instr>) -> String {
        match node.kind {
            NodeKind::Var => self.var_operand(node.value_str().unwrap_or_default()),
            NodeKind::Number => node.value_str().unwrap_or_default().to_string(),

            NodeKind::UnOp => {
                let operand = self.emit_term(&node.children[0], out);
                let temp = self.new_temp();
                let rhs = match node.value_str() {
                    Some("neg") => format!("-{operand}"),
                    _ => format!("!{operand}"),
                };
                out.push(Instr::Assign {
                    target: temp.clone(),
                    rhs,
                });
                temp
            }

            NodeKind::BinOp => {
                let lhs = self.emit_term(&node.children[0], out);
                let rhs = self.emit_term(&node.children[1], out);
                let temp = self.new_temp();
                let sym = binop_symbol(node.value_str().unwrap_or_default());
                out.push(Instr::Assign {
                    target: temp.clone(),
                    rhs: format!("{lhs} {sym} {rhs}"),
                });
                temp
            }

            _ => "0".to_string(),
        }
    }
}

/// SPL word operators mapped to target symbols.
fn binop_symbol(op: &str) -> &str {
    match op {
        "plus" => "+",
        "minus" => "-",
        "mult" => "*",
        "div" => "/",
        "eq" => "=",
        ">" => ">",
        other => other,
    }
}
