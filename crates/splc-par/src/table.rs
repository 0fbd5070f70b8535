//! ACTION/GOTO table construction.
//!
//! Shift entries come from terminal transitions, reduce entries from
//! complete items over the head's FOLLOW set, accept from the complete
//! augmented item on `$`. A shift–reduce collision keeps the shift and
//! records the conflict (logged, not fatal); a reduce–reduce collision
//! aborts table construction.

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::first_follow::FirstFollow;
use crate::grammar::{Grammar, AUGMENTED_START, END_MARKER};
use crate::items::Collection;

/// One ACTION table entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Shift the lookahead and move to the state.
    Shift(usize),
    /// Reduce by `alternatives(head)[alt]`.
    Reduce { head: &'static str, alt: usize },
    /// Accept the input.
    Accept,
}

/// A recorded (and resolved) shift–reduce conflict.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub terminal: &'static str,
    /// The action kept in the table (always the shift).
    pub kept: Action,
    /// The reduce that lost.
    pub dropped: Action,
}

/// A fatal table-construction error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("reduce-reduce conflict in state {state} on '{terminal}': {first_head} vs {second_head}")]
    ReduceReduce {
        state: usize,
        terminal: &'static str,
        first_head: &'static str,
        second_head: &'static str,
    },
}

/// The completed ACTION and GOTO tables.
#[derive(Debug)]
pub struct Tables {
    action: FxHashMap<(usize, &'static str), Action>,
    goto_table: FxHashMap<(usize, &'static str), usize>,
    conflicts: Vec<Conflict>,
}

impl Tables {
    /// Builds the tables from the canonical collection and FOLLOW sets.
    pub fn build(
        grammar: &Grammar,
        collection: &Collection,
        first_follow: &FirstFollow,
    ) -> Result<Self, TableError> {
        let mut action: FxHashMap<(usize, &'static str), Action> = FxHashMap::default();
        let mut goto_table: FxHashMap<(usize, &'static str), usize> = FxHashMap::default();
        let mut conflicts = Vec::new();

        for (&(state, sym), &target) in &collection.transitions {
            if grammar.is_terminal(sym) {
                action.insert((state, sym), Action::Shift(target));
            } else {
                goto_table.insert((state, sym), target);
            }
        }

        for (state_index, state) in collection.states.iter().enumerate() {
            for item in state {
                if !item.is_complete(grammar) {
                    continue;
                }

                if item.head == AUGMENTED_START {
                    action.insert((state_index, END_MARKER), Action::Accept);
                    continue;
                }

                let reduce = Action::Reduce {
                    head: item.head,
                    alt: item.alt,
                };
                let mut lookaheads: Vec<&'static str> =
                    first_follow.follow(item.head).iter().copied().collect();
                lookaheads.sort_unstable();

                for terminal in lookaheads {
                    let existing = action.get(&(state_index, terminal)).copied();
                    match existing {
                        None => {
                            action.insert((state_index, terminal), reduce);
                        }
                        Some(shift @ Action::Shift(_)) => {
                            tracing::warn!(
                                state = state_index,
                                terminal,
                                head = item.head,
                                "shift-reduce conflict resolved in favor of shift"
                            );
                            conflicts.push(Conflict {
                                state: state_index,
                                terminal,
                                kept: shift,
                                dropped: reduce,
                            });
                        }
                        Some(Action::Reduce { head, .. }) => {
                            if action[&(state_index, terminal)] != reduce {
                                return Err(TableError::ReduceReduce {
                                    state: state_index,
                                    terminal,
                                    first_head: head,
                                    second_head: item.head,
                                });
                            }
                        }
                        Some(Action::Accept) => {}
                    }
                }
            }
        }

        Ok(Self {
            action,
            goto_table,
            conflicts,
        })
    }

    /// ACTION table lookup.
    pub fn action(&self, state: usize, terminal: &'static str) -> Option<Action> {
        self.action.get(&(state, terminal)).copied()
    }

    /// GOTO table lookup.
    pub fn goto(&self, state: usize, nonterminal: &str) -> Option<usize> {
        self.goto_table
            .get(&(state, nonterminal))
            .copied()
    }

    /// Shift–reduce conflicts recorded during construction.
    pub fn conflicts(&self) -> &[Conflict] {
        &self.conflicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(grammar: &Grammar) -> Result<Tables, TableError> {
        let collection = Collection::build(grammar);
        let ff = FirstFollow::compute(grammar);
        Tables::build(grammar, &collection, &ff)
    }

    #[test]
    fn test_accept_entry_exists() {
        let g = Grammar::new("S", vec![("S", vec![vec!["x"]])]);
        let collection = Collection::build(&g);
        let ff = FirstFollow::compute(&g);
        let tables = Tables::build(&g, &collection, &ff).unwrap();

        // state after shifting S from the start state accepts on $
        let s_state = collection.transitions[&(0, "S")];
        assert_eq!(tables.action(s_state, END_MARKER), Some(Action::Accept));
    }

    #[test]
    fn test_shift_and_reduce_entries() {
        let g = Grammar::new("S", vec![("S", vec![vec!["x"]])]);
        let collection = Collection::build(&g);
        let ff = FirstFollow::compute(&g);
        let tables = Tables::build(&g, &collection, &ff).unwrap();

        assert!(matches!(tables.action(0, "x"), Some(Action::Shift(_))));
        let x_state = collection.transitions[&(0, "x")];
        assert_eq!(
            tables.action(x_state, END_MARKER),
            Some(Action::Reduce { head: "S", alt: 0 })
        );
    }

    #[test]
    fn test_shift_reduce_conflict_prefers_shift() {
        // E → E + E | x is ambiguous: after "x + x" with lookahead "+",
        // both shift and reduce apply.
        let g = Grammar::new(
            "E",
            vec![("E", vec![vec!["E", "+", "E"], vec!["x"]])],
        );
        let tables = build(&g).unwrap();

        assert!(!tables.conflicts().is_empty());
        for conflict in tables.conflicts() {
            assert!(matches!(conflict.kept, Action::Shift(_)));
            assert!(matches!(conflict.dropped, Action::Reduce { .. }));
            // the table still holds the shift
            assert_eq!(
                tables.action(conflict.state, conflict.terminal),
                Some(conflict.kept)
            );
        }
    }

    #[test]
    fn test_reduce_reduce_is_fatal() {
        // A and B both derive x with identical FOLLOW sets.
        let g = Grammar::new(
            "S",
            vec![
                ("S", vec![vec!["A"], vec!["B"]]),
                ("A", vec![vec!["x"]]),
                ("B", vec![vec!["x"]]),
            ],
        );
        let err = build(&g).unwrap_err();
        assert!(matches!(err, TableError::ReduceReduce { .. }));
    }

    #[test]
    fn test_spl_tables_are_conflict_free() {
        let g = Grammar::spl();
        let tables = build(&g).unwrap();
        assert!(
            tables.conflicts().is_empty(),
            "SPL tables should build without conflicts, got {:?}",
            tables.conflicts()
        );
    }

    #[test]
    fn test_every_state_has_an_action() {
        // completed-table invariant: every reachable state acts on at
        // least one terminal
        let g = Grammar::spl();
        let collection = Collection::build(&g);
        let ff = FirstFollow::compute(&g);
        let tables = Tables::build(&g, &collection, &ff).unwrap();

        let terminals: Vec<&'static str> = g
            .symbols()
            .into_iter()
            .filter(|&s| g.is_terminal(s))
            .collect();
        for state in 0..collection.len() {
            let has_action = terminals
                .iter()
                .any(|&t| tables.action(state, t).is_some())
                || tables.action(state, END_MARKER).is_some();
            assert!(has_action, "state {state} has no outgoing action");
        }
    }
}
