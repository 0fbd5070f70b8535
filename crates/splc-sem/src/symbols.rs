//! Symbol table construction.
//!
//! A top-down AST walk that creates the declaration scopes:
//!
//! ```text
//! everywhere
//! └── global            globals from GLOBALS
//!     ├── proc <name>   the proc symbol + its params, nested "body"
//!     ├── func <name>   the func symbol + its params, nested "body"
//!     └── main          declarations from MAIN's VARS
//! ```
//!
//! `global` parents the routine and main scopes so upward lookup can
//! resolve globals from anywhere. Control-flow scopes are not created
//! here; the type checker pushes those while walking.
//!
//! Duplicate declarations in the unbounded variable blocks are
//! collected as [`SymbolError`]s. Duplicates *inside* a parameter or
//! local MAXTHREE list are skipped here and reported by the type
//! checker's list rule, so each mistake surfaces exactly once.

use splc_par::{AstNode, NodeKind};

use crate::scope::{ScopeId, ScopeTree, Symbol, SymbolError, SymbolExtras, SymbolKind};

/// Builds the declaration scope tree for a program.
pub struct SymbolTableBuilder {
    tree: ScopeTree,
    errors: Vec<SymbolError>,
}

impl SymbolTableBuilder {
    /// Walks the PROGRAM node and returns the scope tree plus any
    /// duplicate-declaration errors.
    pub fn build(program: &AstNode) -> (ScopeTree, Vec<SymbolError>) {
        let mut builder = Self {
            tree: ScopeTree::new(),
            errors: Vec::new(),
        };
        builder.walk_program(program);
        (builder.tree, builder.errors)
    }

    fn walk_program(&mut self, program: &AstNode) {
        if program.kind != NodeKind::Program || program.children.len() != 4 {
            return;
        }

        let global = self.tree.add_scope(ScopeTree::ROOT, "global");
        self.declare_vars(global, &program.globals().children);

        for proc in &program.procs().children {
            if proc.kind == NodeKind::Proc {
                self.walk_routine(global, proc, SymbolKind::Proc);
            }
        }
        for func in &program.funcs().children {
            if func.kind == NodeKind::Func {
                self.walk_routine(global, func, SymbolKind::Func);
            }
        }

        let main_node = program.main();
        let main = self.tree.add_scope(global, "main");
        if main_node.kind == NodeKind::Main && !main_node.children.is_empty() {
            self.declare_vars(main, &main_node.main_vars().children);
        }
    }

    /// One PROC or FUNC: its own scope carrying the routine symbol and
    /// the parameters, with a nested `body` scope for locals.
    fn walk_routine(&mut self, global: ScopeId, routine: &AstNode, category: SymbolKind) {
        let name = routine.value_str().unwrap_or_default().to_string();
        let prefix = match category {
            SymbolKind::Proc => "proc",
            _ => "func",
        };
        let scope = self.tree.add_scope(global, format!("{prefix} {name}"));

        let extras = SymbolExtras {
            params: routine
                .params()
                .iter()
                .filter_map(|p| p.value_str().map(str::to_string))
                .collect(),
            returns_numeric: category == SymbolKind::Func,
        };
        let symbol = Symbol {
            name,
            category,
            scope: String::new(),
            node_id: routine.id,
            extras,
        };
        if let Err(err) = self.tree.insert(scope, symbol) {
            self.errors.push(err);
        }

        self.declare_list(scope, routine.params());

        let body = self.tree.add_scope(scope, "body");
        if let Some(body_node) = routine.routine_body() {
            self.declare_list(body, &body_node.body_locals().children);
        }
    }

    /// Declares an unbounded VARIABLES block, reporting duplicates.
    fn declare_vars(&mut self, scope: ScopeId, vars: &[AstNode]) {
        for var in vars {
            if var.kind != NodeKind::Var {
                continue;
            }
            let name = var.value_str().unwrap_or_default();
            if let Err(err) = self.tree.insert(scope, Symbol::var(name, "", var.id)) {
                self.errors.push(err);
            }
        }
    }

    /// Declares a MAXTHREE list. A collision with another variable in
    /// the same list is left for the type checker's duplicate rule; a
    /// collision with a routine symbol is a name rule violation here.
    fn declare_list(&mut self, scope: ScopeId, vars: &[AstNode]) {
        for var in vars {
            if var.kind != NodeKind::Var {
                continue;
            }
            let name = var.value_str().unwrap_or_default();
            let clashes_with_var = self
                .tree
                .lookup_local(scope, name)
                .map(|existing| existing.category == SymbolKind::Var)
                .unwrap_or(false);
            if clashes_with_var {
                continue;
            }
            if let Err(err) = self.tree.insert(scope, Symbol::var(name, "", var.id)) {
                self.errors.push(err);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use splc_lex::Lexer;
    use splc_par::AstBuilder;

    fn build(source: &str) -> (ScopeTree, Vec<SymbolError>) {
        let tokens = Lexer::tokenize(source).expect("fixture lexes");
        let ast = AstBuilder::build(&tokens).expect("fixture builds");
        SymbolTableBuilder::build(&ast)
    }

    #[test]
    fn test_global_and_main_scopes() {
        let (tree, errors) = build(
            "glob { g1 g2 } proc { } func { } main { var { x } x = 1 }",
        );
        assert!(errors.is_empty());

        let global = tree.find_path(&["global"]).unwrap();
        assert!(tree.lookup_local(global, "g1").is_some());
        assert!(tree.lookup_local(global, "g2").is_some());

        let main = tree.find_path(&["global", "main"]).unwrap();
        let x = tree.lookup_local(main, "x").unwrap();
        assert_eq!(x.scope, "main");
        assert_eq!(x.mangled(), "main_x");
    }

    #[test]
    fn test_routine_scopes() {
        let (tree, errors) = build(
            "glob { } proc { show ( a b ) { local { t } print a } } \
             func { add ( x y ) { local { s } s = ( x plus y ) ; return s } } \
             main { var { } halt }",
        );
        assert!(errors.is_empty());

        let proc = tree.find_path(&["global", "proc show"]).unwrap();
        let proc_sym = tree.lookup_local(proc, "show").unwrap();
        assert_eq!(proc_sym.category, SymbolKind::Proc);
        assert_eq!(proc_sym.extras.params, vec!["a", "b"]);
        assert!(tree.lookup_local(proc, "a").is_some());

        let body = tree.find_path(&["global", "proc show", "body"]).unwrap();
        assert!(tree.lookup_local(body, "t").is_some());
        // params visible from the body via the parent link
        assert!(tree.lookup(body, "b").is_some());

        let func = tree.find_path(&["global", "func add"]).unwrap();
        let func_sym = tree.lookup_local(func, "add").unwrap();
        assert_eq!(func_sym.category, SymbolKind::Func);
        assert!(func_sym.extras.returns_numeric);
    }

    #[test]
    fn test_duplicate_global_reported() {
        let (_, errors) = build("glob { x x } proc { } func { } main { var { } halt }");
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().contains("'x' already declared"));
    }

    #[test]
    fn test_duplicate_main_var_reported() {
        let (_, errors) = build("glob { } proc { } func { } main { var { a a } halt }");
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_duplicate_param_left_to_checker() {
        // duplicates inside a MAXTHREE list belong to the checker
        let (tree, errors) = build(
            "glob { } proc { p ( a a ) { local { } halt } } func { } \
             main { var { } halt }",
        );
        assert!(errors.is_empty());
        let proc = tree.find_path(&["global", "proc p"]).unwrap();
        assert!(tree.lookup_local(proc, "a").is_some());
    }

    #[test]
    fn test_param_clashing_with_routine_name_reported() {
        let (_, errors) = build(
            "glob { } proc { p ( p ) { local { } halt } } func { } \
             main { var { } halt }",
        );
        assert_eq!(errors.len(), 1);
    }

    #[test]
    fn test_shadowing_global_in_main() {
        let (tree, errors) =
            build("glob { x } proc { } func { } main { var { x } x = 10 }");
        assert!(errors.is_empty());
        let main = tree.find_path(&["global", "main"]).unwrap();
        // lookup inside main resolves to the main-scoped x
        assert_eq!(tree.lookup(main, "x").unwrap().scope, "main");
        // lookup from global still sees the global one
        let global = tree.find_path(&["global"]).unwrap();
        assert_eq!(tree.lookup(global, "x").unwrap().scope, "global");
    }
}
