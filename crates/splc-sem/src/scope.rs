//! Lexically nested scope tree.
//!
//! Scopes live in one arena indexed by [`ScopeId`]; each scope holds an
//! ordered `name → Symbol` map, a non-owning parent id, and its child
//! ids. Upward lookup walks parent links, so shadowing across nested
//! scopes works while names stay unique within a single scope.

use indexmap::IndexMap;
use splc_util::NodeId;
use thiserror::Error;

/// Index of a scope in the tree's arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScopeId(pub u32);

impl ScopeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Symbol category.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Var,
    Func,
    Proc,
}

impl SymbolKind {
    pub fn name(self) -> &'static str {
        match self {
            SymbolKind::Var => "var",
            SymbolKind::Func => "func",
            SymbolKind::Proc => "proc",
        }
    }
}

/// Advisory metadata on a symbol: parameter names and whether the
/// routine returns a numeric atom. The type checker does not rely on
/// this; it exists for diagnostics and tooling.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SymbolExtras {
    pub params: Vec<String>,
    pub returns_numeric: bool,
}

/// A declared name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub category: SymbolKind,
    /// Name of the owning scope, used for target-name mangling.
    pub scope: String,
    /// The AST node that declared this name.
    pub node_id: NodeId,
    pub extras: SymbolExtras,
}

impl Symbol {
    pub fn var(name: impl Into<String>, scope: impl Into<String>, node_id: NodeId) -> Self {
        Self {
            name: name.into(),
            category: SymbolKind::Var,
            scope: scope.into(),
            node_id,
            extras: SymbolExtras::default(),
        }
    }

    /// The mangled target-code name, `<scope>_<name>`.
    pub fn mangled(&self) -> String {
        format!("{}_{}", self.scope, self.name)
    }
}

/// Duplicate declaration within one scope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("name rule violation: '{name}' already declared in scope '{scope}'")]
    Duplicate { name: String, scope: String },
}

/// One scope: a named symbol container with tree links.
#[derive(Debug)]
pub struct Scope {
    pub name: String,
    symbols: IndexMap<String, Symbol>,
    parent: Option<ScopeId>,
    children: Vec<ScopeId>,
}

/// The scope tree for one compilation, rooted at `everywhere`.
#[derive(Debug)]
pub struct ScopeTree {
    scopes: Vec<Scope>,
}

impl ScopeTree {
    /// The root scope id.
    pub const ROOT: ScopeId = ScopeId(0);

    /// Creates a tree containing only the `everywhere` root.
    pub fn new() -> Self {
        Self {
            scopes: vec![Scope {
                name: "everywhere".to_string(),
                symbols: IndexMap::new(),
                parent: None,
                children: Vec::new(),
            }],
        }
    }

    /// Creates a child scope and returns its id.
    pub fn add_scope(&mut self, parent: ScopeId, name: impl Into<String>) -> ScopeId {
        let id = ScopeId(self.scopes.len() as u32);
        self.scopes.push(Scope {
            name: name.into(),
            symbols: IndexMap::new(),
            parent: Some(parent),
            children: Vec::new(),
        });
        self.scopes[parent.index()].children.push(id);
        id
    }

    /// Declares a symbol in the scope. Fails when the name already
    /// exists in this scope; shadowing an ancestor is fine.
    pub fn insert(&mut self, scope: ScopeId, mut symbol: Symbol) -> Result<(), SymbolError> {
        let target = &mut self.scopes[scope.index()];
        if target.symbols.contains_key(&symbol.name) {
            return Err(SymbolError::Duplicate {
                name: symbol.name.clone(),
                scope: target.name.clone(),
            });
        }
        symbol.scope = target.name.clone();
        target.symbols.insert(symbol.name.clone(), symbol);
        Ok(())
    }

    /// Looks a name up by crawling up the scope chain; the first hit
    /// wins.
    pub fn lookup(&self, from: ScopeId, name: &str) -> Option<&Symbol> {
        let mut current = Some(from);
        while let Some(id) = current {
            let scope = &self.scopes[id.index()];
            if let Some(symbol) = scope.symbols.get(name) {
                return Some(symbol);
            }
            current = scope.parent;
        }
        None
    }

    /// Looks a name up in one scope only, without walking parents.
    pub fn lookup_local(&self, scope: ScopeId, name: &str) -> Option<&Symbol> {
        self.scopes[scope.index()].symbols.get(name)
    }

    /// Finds a direct child scope by name.
    pub fn find_child(&self, parent: ScopeId, name: &str) -> Option<ScopeId> {
        self.scopes[parent.index()]
            .children
            .iter()
            .copied()
            .find(|&id| self.scopes[id.index()].name == name)
    }

    /// Resolves a path of child names starting at the root.
    pub fn find_path(&self, path: &[&str]) -> Option<ScopeId> {
        let mut current = Self::ROOT;
        for name in path {
            current = self.find_child(current, name)?;
        }
        Some(current)
    }

    pub fn scope_name(&self, id: ScopeId) -> &str {
        &self.scopes[id.index()].name
    }

    pub fn parent(&self, id: ScopeId) -> Option<ScopeId> {
        self.scopes[id.index()].parent
    }

    pub fn children(&self, id: ScopeId) -> &[ScopeId] {
        &self.scopes[id.index()].children
    }

    /// Symbols of one scope in declaration order.
    pub fn symbols(&self, id: ScopeId) -> impl Iterator<Item = &Symbol> {
        self.scopes[id.index()].symbols.values()
    }

    /// Renders the tree in the indented diagnostic format.
    pub fn pretty(&self) -> String {
        let mut out = String::new();
        self.pretty_scope(Self::ROOT, 0, &mut out);
        out
    }

    fn pretty_scope(&self, id: ScopeId, indent: usize, out: &mut String) {
        let pad = "  ".repeat(indent);
        let scope = &self.scopes[id.index()];
        out.push_str(&format!("{pad}[Scope: {}]\n", scope.name));
        for symbol in scope.symbols.values() {
            out.push_str(&format!(
                "{pad}  {} {} (scope={}, node_id={})\n",
                symbol.category.name().to_uppercase(),
                symbol.name,
                symbol.scope,
                symbol.node_id,
            ));
        }
        for &child in &scope.children {
            self.pretty_scope(child, indent + 1, out);
        }
    }
}

impl Default for ScopeTree {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn var(name: &str) -> Symbol {
        Symbol::var(name, "", NodeId(0))
    }

    #[test]
    fn test_root_is_everywhere() {
        let tree = ScopeTree::new();
        assert_eq!(tree.scope_name(ScopeTree::ROOT), "everywhere");
        assert!(tree.parent(ScopeTree::ROOT).is_none());
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut tree = ScopeTree::new();
        let global = tree.add_scope(ScopeTree::ROOT, "global");
        tree.insert(global, var("x")).unwrap();

        let symbol = tree.lookup(global, "x").unwrap();
        assert_eq!(symbol.name, "x");
        assert_eq!(symbol.scope, "global");
        assert_eq!(symbol.mangled(), "global_x");
        assert!(tree.lookup(global, "y").is_none());
    }

    #[test]
    fn test_duplicate_in_same_scope_fails() {
        let mut tree = ScopeTree::new();
        let global = tree.add_scope(ScopeTree::ROOT, "global");
        tree.insert(global, var("x")).unwrap();
        let err = tree.insert(global, var("x")).unwrap_err();
        assert_eq!(
            err.to_string(),
            "name rule violation: 'x' already declared in scope 'global'"
        );
    }

    #[test]
    fn test_shadowing_across_scopes() {
        let mut tree = ScopeTree::new();
        let global = tree.add_scope(ScopeTree::ROOT, "global");
        let func = tree.add_scope(global, "func f");
        let main = tree.add_scope(global, "main");
        tree.insert(global, var("x")).unwrap();
        tree.insert(func, var("x")).unwrap();

        // inside the function the inner x wins
        assert_eq!(tree.lookup(func, "x").unwrap().scope, "func f");
        // main falls through to the global
        assert_eq!(tree.lookup(main, "x").unwrap().scope, "global");
    }

    #[test]
    fn test_lookup_walks_to_root() {
        let mut tree = ScopeTree::new();
        let global = tree.add_scope(ScopeTree::ROOT, "global");
        let proc = tree.add_scope(global, "proc p");
        let body = tree.add_scope(proc, "body");
        tree.insert(global, var("g")).unwrap();
        assert_eq!(tree.lookup(body, "g").unwrap().scope, "global");
        assert!(tree.lookup(body, "missing").is_none());
    }

    #[test]
    fn test_find_child_and_path() {
        let mut tree = ScopeTree::new();
        let global = tree.add_scope(ScopeTree::ROOT, "global");
        let main = tree.add_scope(global, "main");
        assert_eq!(tree.find_child(ScopeTree::ROOT, "global"), Some(global));
        assert_eq!(tree.find_path(&["global", "main"]), Some(main));
        assert_eq!(tree.find_path(&["global", "nope"]), None);
    }

    #[test]
    fn test_pretty_contains_nesting() {
        let mut tree = ScopeTree::new();
        let global = tree.add_scope(ScopeTree::ROOT, "global");
        tree.insert(global, var("x")).unwrap();
        let rendered = tree.pretty();
        assert!(rendered.contains("[Scope: everywhere]"));
        assert!(rendered.contains("[Scope: global]"));
        assert!(rendered.contains("VAR x (scope=global"));
    }
}
