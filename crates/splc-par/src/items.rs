//! LR(0) items and the canonical collection.
//!
//! An [`Item`] is a production with a dot position; a state is the set
//! of items reachable by closure. [`Collection::build`] discovers all
//! states from the augmented start item, recording the GOTO transitions
//! as it goes. States are identified by their discovery index.

use std::collections::BTreeSet;

use rustc_hash::FxHashMap;

use crate::grammar::{Grammar, AUGMENTED_START};

/// An LR(0) item: `(head, alternative, dot)`.
///
/// The alternative index identifies the body within
/// `grammar.alternatives(head)`, so item identity is exactly the
/// `(head, body, dot)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub head: &'static str,
    pub alt: usize,
    pub dot: usize,
}

impl Item {
    /// The start item of an alternative: dot at position zero.
    pub fn start(head: &'static str, alt: usize) -> Self {
        Self { head, alt, dot: 0 }
    }

    /// The production body this item ranges over.
    pub fn body<'g>(&self, grammar: &'g Grammar) -> &'g [&'static str] {
        grammar.body(self.head, self.alt)
    }

    /// True when the dot has reached the end of the body.
    pub fn is_complete(&self, grammar: &Grammar) -> bool {
        self.dot == self.body(grammar).len()
    }

    /// The symbol immediately after the dot, if any.
    pub fn next_symbol(&self, grammar: &Grammar) -> Option<&'static str> {
        self.body(grammar).get(self.dot).copied()
    }

    /// The item with the dot advanced one position.
    pub fn advanced(&self) -> Self {
        Self {
            head: self.head,
            alt: self.alt,
            dot: self.dot + 1,
        }
    }
}

/// A state in the canonical collection: an item set.
pub type State = BTreeSet<Item>;

/// Computes the closure of an item set: for every item with a
/// nonterminal after the dot, add that nonterminal's start items, to
/// fixpoint.
pub fn closure(grammar: &Grammar, mut items: State) -> State {
    let mut work: Vec<Item> = items.iter().copied().collect();
    while let Some(item) = work.pop() {
        let Some(sym) = item.next_symbol(grammar) else {
            continue;
        };
        if !grammar.is_nonterminal(sym) {
            continue;
        }
        for alt in 0..grammar.alternatives(sym).len() {
            let start = Item::start(sym, alt);
            if items.insert(start) {
                work.push(start);
            }
        }
    }
    items
}

/// Computes `GOTO(state, symbol)`: advance every item whose dot sits
/// before `symbol`, then close.
pub fn goto(grammar: &Grammar, state: &State, symbol: &str) -> State {
    let kernel: State = state
        .iter()
        .filter(|item| item.next_symbol(grammar) == Some(symbol))
        .map(Item::advanced)
        .collect();
    closure(grammar, kernel)
}

/// The canonical LR(0) collection: every reachable state plus the
/// transition table between them.
pub struct Collection {
    pub states: Vec<State>,
    pub transitions: FxHashMap<(usize, &'static str), usize>,
}

impl Collection {
    /// Builds the collection from `CLOSURE({[S' → •S]})`.
    pub fn build(grammar: &Grammar) -> Self {
        let start_state = closure(
            grammar,
            State::from([Item::start(AUGMENTED_START, 0)]),
        );

        let mut states: Vec<State> = vec![start_state.clone()];
        let mut index: FxHashMap<State, usize> = FxHashMap::default();
        index.insert(start_state, 0);

        let mut transitions: FxHashMap<(usize, &'static str), usize> = FxHashMap::default();
        let symbols = grammar.symbols();

        let mut pending = 0;
        while pending < states.len() {
            let i = pending;
            pending += 1;

            for &sym in &symbols {
                if sym == AUGMENTED_START {
                    continue;
                }
                let next = goto(grammar, &states[i], sym);
                if next.is_empty() {
                    continue;
                }
                let j = match index.get(&next) {
                    Some(&j) => j,
                    None => {
                        let j = states.len();
                        states.push(next.clone());
                        index.insert(next, j);
                        j
                    }
                };
                transitions.insert((i, sym), j);
            }
        }

        Self {
            states,
            transitions,
        }
    }

    /// Number of discovered states.
    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}
