//! FIRST and FOLLOW set computation.
//!
//! Both sets are computed by fixpoint iteration over the productions,
//! exactly as in the textbook construction: FIRST collects the
//! terminals that can begin a nonterminal's derivations (with explicit
//! nullability), FOLLOW collects the terminals that can appear
//! immediately after one, seeded with the end marker on the start
//! symbol.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::grammar::{Grammar, AUGMENTED_START, END_MARKER};

/// FIRST/FOLLOW sets for a grammar's nonterminals.
pub struct FirstFollow {
    first: FxHashMap<&'static str, FxHashSet<&'static str>>,
    follow: FxHashMap<&'static str, FxHashSet<&'static str>>,
    nullable: FxHashSet<&'static str>,
}

impl FirstFollow {
    /// Computes both sets for the grammar.
    pub fn compute(grammar: &Grammar) -> Self {
        let mut ff = Self {
            first: FxHashMap::default(),
            follow: FxHashMap::default(),
            nullable: FxHashSet::default(),
        };
        for nt in grammar.nonterminals() {
            ff.first.insert(nt, FxHashSet::default());
            ff.follow.insert(nt, FxHashSet::default());
        }
        ff.compute_first(grammar);
        ff.compute_follow(grammar);
        ff
    }

    /// FIRST set of a nonterminal (terminals only; see [`is_nullable`]).
    ///
    /// [`is_nullable`]: FirstFollow::is_nullable
    pub fn first(&self, nt: &str) -> &FxHashSet<&'static str> {
        &self.first[nt]
    }

    /// FOLLOW set of a nonterminal. May contain the end marker `$`.
    pub fn follow(&self, nt: &str) -> &FxHashSet<&'static str> {
        &self.follow[nt]
    }

    /// True if the nonterminal derives ε.
    pub fn is_nullable(&self, nt: &str) -> bool {
        self.nullable.contains(nt)
    }

    /// FIRST of a symbol sequence: the terminals that can begin it,
    /// plus whether the whole sequence is nullable.
    pub fn first_of_sequence(
        &self,
        grammar: &Grammar,
        symbols: &[&'static str],
    ) -> (FxHashSet<&'static str>, bool) {
        let mut out = FxHashSet::default();
        for &sym in symbols {
            if grammar.is_terminal(sym) {
                out.insert(sym);
                return (out, false);
            }
            out.extend(self.first[sym].iter().copied());
            if !self.nullable.contains(sym) {
                return (out, false);
            }
        }
        (out, true)
    }

    fn compute_first(&mut self, grammar: &Grammar) {
        loop {
            let mut changed = false;
            for (head, _, body) in grammar.iter_productions() {
                let mut all_nullable = true;
                let mut additions: Vec<&'static str> = Vec::new();
                for &sym in body {
                    if grammar.is_terminal(sym) {
                        additions.push(sym);
                        all_nullable = false;
                        break;
                    }
                    additions.extend(self.first[sym].iter().copied());
                    if !self.nullable.contains(sym) {
                        all_nullable = false;
                        break;
                    }
                }

                let set = self.first.get_mut(head).expect("nonterminal registered");
                for sym in additions {
                    changed |= set.insert(sym);
                }
                if all_nullable {
                    changed |= self.nullable.insert(head);
                }
            }
            if !changed {
                break;
            }
        }
    }

    fn compute_follow(&mut self, grammar: &Grammar) {
        self.follow
            .get_mut(AUGMENTED_START)
            .expect("augmented start registered")
            .insert(END_MARKER);

        loop {
            let mut changed = false;
            for (head, _, body) in grammar.iter_productions() {
                for (i, &sym) in body.iter().enumerate() {
                    if !grammar.is_nonterminal(sym) {
                        continue;
                    }
                    let (firsts, rest_nullable) =
                        self.first_of_sequence(grammar, &body[i + 1..]);
                    let head_follow: Vec<&'static str> = if rest_nullable {
                        self.follow[head].iter().copied().collect()
                    } else {
                        Vec::new()
                    };

                    let set = self.follow.get_mut(sym).expect("nonterminal registered");
                    for t in firsts {
                        changed |= set.insert(t);
                    }
                    for t in head_follow {
                        changed |= set.insert(t);
                    }
                }
            }
            if !changed {
                break;
            }
        }
    }
}
