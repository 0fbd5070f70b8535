//! Grammar model for the SLR generator.
//!
//! A [`Grammar`] maps each nonterminal to an ordered list of
//! alternative right-hand sides. Terminals are exactly the symbols that
//! appear on a right-hand side without having productions of their own.
//! Construction augments the grammar with a unique start production
//! `S' → S`.

use indexmap::IndexMap;
use rustc_hash::FxHashSet;

/// The synthetic augmented start symbol.
pub const AUGMENTED_START: &str = "S'";

/// The end-of-input marker used in FOLLOW sets and by the driver.
pub const END_MARKER: &str = "$";

/// A context-free grammar with an augmented start production.
pub struct Grammar {
    /// The real start nonterminal (the single alternative of `S'`).
    start: &'static str,
    /// Nonterminal → ordered alternatives. The empty body denotes ε.
    /// Includes the augmented `S' → start` production.
    productions: IndexMap<&'static str, Vec<Vec<&'static str>>>,
    /// All right-hand-side symbols without productions.
    terminals: FxHashSet<&'static str>,
}

impl Grammar {
    /// Builds a grammar from the real start symbol and its productions,
    /// adding the augmented start production.
    ///
    /// # Panics
    ///
    /// Panics if `start` has no productions or if `S'` is already used
    /// as a nonterminal.
    pub fn new(
        start: &'static str,
        rules: Vec<(&'static str, Vec<Vec<&'static str>>)>,
    ) -> Self {
        let mut productions: IndexMap<&'static str, Vec<Vec<&'static str>>> = IndexMap::new();
        productions.insert(AUGMENTED_START, vec![vec![start]]);
        for (head, alts) in rules {
            assert!(head != AUGMENTED_START, "S' is reserved");
            productions.entry(head).or_default().extend(alts);
        }
        assert!(
            productions.contains_key(start),
            "start symbol '{start}' has no productions"
        );

        let mut terminals = FxHashSet::default();
        for alts in productions.values() {
            for body in alts {
                for &sym in body {
                    if !productions.contains_key(sym) {
                        terminals.insert(sym);
                    }
                }
            }
        }

        Self {
            start,
            productions,
            terminals,
        }
    }

    /// The real start nonterminal.
    pub fn start(&self) -> &'static str {
        self.start
    }

    /// True if the symbol has productions of its own.
    pub fn is_nonterminal(&self, sym: &str) -> bool {
        self.productions.contains_key(sym)
    }

    /// True if the symbol appears only on right-hand sides.
    pub fn is_terminal(&self, sym: &str) -> bool {
        self.terminals.contains(sym)
    }

    /// The alternatives of a nonterminal, in declaration order.
    pub fn alternatives(&self, head: &str) -> &[Vec<&'static str>] {
        self.productions
            .get(head)
            .map(|alts| alts.as_slice())
            .unwrap_or(&[])
    }

    /// The body of one specific alternative.
    pub fn body(&self, head: &str, alt: usize) -> &[&'static str] {
        &self.productions[head][alt]
    }

    /// Iterates `(head, alt_index, body)` over every production.
    pub fn iter_productions(
        &self,
    ) -> impl Iterator<Item = (&'static str, usize, &Vec<&'static str>)> + '_ {
        self.productions
            .iter()
            .flat_map(|(&head, alts)| alts.iter().enumerate().map(move |(i, b)| (head, i, b)))
    }

    /// All nonterminals in declaration order (augmented start first).
    pub fn nonterminals(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.productions.keys().copied()
    }

    /// Every distinct grammar symbol: nonterminals then terminals.
    pub fn symbols(&self) -> Vec<&'static str> {
        let mut syms: Vec<&'static str> = self.productions.keys().copied().collect();
        let mut terms: Vec<&'static str> = self.terminals.iter().copied().collect();
        terms.sort_unstable();
        syms.extend(terms);
        syms
    }

    /// Maps an input terminal string to the grammar's own symbol, so
    /// downstream tables can key on `&'static str`.
    pub fn intern_terminal(&self, sym: &str) -> Option<&'static str> {
        self.terminals.get(sym).copied()
    }

    /// The fixed SPL grammar.
    ///
    /// The function-definition productions are a language-preserving
    /// rewrite of the surface shape `{ BODY ; return ATOM }`: splitting
    /// the function body into `FBODY`/`FALGO`/`FTAIL` generates the
    /// identical token language while keeping every `;` decision
    /// resolvable with one token of lookahead.
    pub fn spl() -> Self {
        Grammar::new(
            "SPL_PROG",
            vec![
                (
                    "SPL_PROG",
                    vec![vec![
                        "glob", "{", "VARIABLES", "}", "proc", "{", "PROCDEFS", "}", "func", "{",
                        "FUNCDEFS", "}", "main", "{", "MAINPROG", "}",
                    ]],
                ),
                ("VARIABLES", vec![vec![], vec!["IDENT", "VARIABLES"]]),
                ("PROCDEFS", vec![vec![], vec!["PDEF", "PROCDEFS"]]),
                (
                    "PDEF",
                    vec![vec!["IDENT", "(", "PARAM", ")", "{", "BODY", "}"]],
                ),
                ("FUNCDEFS", vec![vec![], vec!["FDEF", "FUNCDEFS"]]),
                (
                    "FDEF",
                    vec![vec!["IDENT", "(", "PARAM", ")", "{", "FBODY", "}"]],
                ),
                ("FBODY", vec![vec!["local", "{", "MAXTHREE", "}", "FALGO"]]),
                ("FALGO", vec![vec!["INSTR", ";", "FTAIL"]]),
                (
                    "FTAIL",
                    vec![vec!["return", "ATOM"], vec!["INSTR", ";", "FTAIL"]],
                ),
                ("PARAM", vec![vec!["MAXTHREE"]]),
                (
                    "MAXTHREE",
                    vec![
                        vec![],
                        vec!["IDENT"],
                        vec!["IDENT", "IDENT"],
                        vec!["IDENT", "IDENT", "IDENT"],
                    ],
                ),
                ("BODY", vec![vec!["local", "{", "MAXTHREE", "}", "ALGO"]]),
                ("MAINPROG", vec![vec!["var", "{", "VARIABLES", "}", "ALGO"]]),
                ("ALGO", vec![vec!["INSTR"], vec!["INSTR", ";", "ALGO"]]),
                (
                    "INSTR",
                    vec![
                        vec!["halt"],
                        vec!["print", "OUTPUT"],
                        vec!["ASSIGN"],
                        vec!["IDENT", "(", "INPUT", ")"],
                        vec!["LOOP"],
                        vec!["BRANCH"],
                    ],
                ),
                (
                    "ASSIGN",
                    vec![
                        vec!["IDENT", "=", "IDENT", "(", "INPUT", ")"],
                        vec!["IDENT", "=", "TERM"],
                    ],
                ),
                (
                    "INPUT",
                    vec![
                        vec![],
                        vec!["ATOM"],
                        vec!["ATOM", "ATOM"],
                        vec!["ATOM", "ATOM", "ATOM"],
                    ],
                ),
                ("OUTPUT", vec![vec!["ATOM"], vec!["STRING"]]),
                ("ATOM", vec![vec!["IDENT"], vec!["NUMBER"]]),
                (
                    "TERM",
                    vec![
                        vec!["ATOM"],
                        vec!["(", "UNOP", "TERM", ")"],
                        vec!["(", "TERM", "BINOP", "TERM", ")"],
                    ],
                ),
                ("UNOP", vec![vec!["neg"], vec!["not"]]),
                (
                    "BINOP",
                    vec![
                        vec!["eq"],
                        vec![">"],
                        vec!["or"],
                        vec!["and"],
                        vec!["plus"],
                        vec!["minus"],
                        vec!["mult"],
                        vec!["div"],
                    ],
                ),
                (
                    "LOOP",
                    vec![
                        vec!["while", "TERM", "{", "ALGO", "}"],
                        vec!["do", "{", "ALGO", "}", "until", "TERM"],
                    ],
                ),
                (
                    "BRANCH",
                    vec![
                        vec!["if", "TERM", "{", "ALGO", "}"],
                        vec!["if", "TERM", "{", "ALGO", "}", "else", "{", "ALGO", "}"],
                    ],
                ),
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_augmentation() {
        let g = Grammar::new("S", vec![("S", vec![vec!["a"]])]);
        assert_eq!(g.start(), "S");
        assert_eq!(g.alternatives(AUGMENTED_START), &[vec!["S"]]);
    }

    #[test]
    fn test_terminal_classification() {
        let g = Grammar::new(
            "S",
            vec![("S", vec![vec!["a", "B"]]), ("B", vec![vec!["b"], vec![]])],
        );
        assert!(g.is_terminal("a"));
        assert!(g.is_terminal("b"));
        assert!(g.is_nonterminal("S"));
        assert!(g.is_nonterminal("B"));
        assert!(!g.is_terminal("S"));
        assert!(!g.is_nonterminal("c"));
    }

    #[test]
    fn test_intern_terminal() {
        let g = Grammar::spl();
        let owned = String::from("while");
        assert_eq!(g.intern_terminal(&owned), Some("while"));
        assert_eq!(g.intern_terminal("IDENT"), Some("IDENT"));
        assert_eq!(g.intern_terminal("nosuch"), None);
        // nonterminals are not terminals
        assert_eq!(g.intern_terminal("ALGO"), None);
    }

    #[test]
    fn test_spl_grammar_shape() {
        let g = Grammar::spl();
        assert_eq!(g.start(), "SPL_PROG");
        // literal classes are terminals
        for class in ["IDENT", "NUMBER", "STRING"] {
            assert!(g.is_terminal(class), "{class} should be a terminal");
        }
        // every keyword and punctuation mark used by the lexer is a
        // grammar terminal
        for sym in [
            "glob", "proc", "func", "main", "local", "var", "halt", "print", "do", "until",
            "while", "if", "else", "return", "neg", "not", "eq", "or", "and", "plus", "minus",
            "mult", "div", "(", ")", "{", "}", ";", "=", ">",
        ] {
            assert!(g.is_terminal(sym), "{sym} should be a terminal");
        }
    }

    #[test]
    fn test_spl_epsilon_alternatives() {
        let g = Grammar::spl();
        for nt in ["VARIABLES", "PROCDEFS", "FUNCDEFS", "MAXTHREE", "INPUT"] {
            assert!(
                g.alternatives(nt).iter().any(|body| body.is_empty()),
                "{nt} should be nullable"
            );
        }
        assert!(!g.alternatives("ALGO").iter().any(|body| body.is_empty()));
    }
}
