//! # Nondeterministic finite automata with ε-moves and tagged accept states
//! The [Nfa] struct represents an ε-NFA over a finite alphabet of characters. Instances come
//! from the Thompson construction ([Regex::to_nfa](crate::regex::Regex::to_nfa)) or from
//! merging several automata with [Nfa::merge]; there is no text format for them.
//!
//! Accept states may carry a *tag* (for the lexer: the token class the state recognises), and
//! the automaton keeps a ranking of its accept states. When several accept states are active at
//! once — which routinely happens after merging the automata of all lexer rules — the
//! earliest-ranked one wins, and [Nfa::merge] concatenates rankings in input order. That is the
//! whole mechanism behind lexer rule priority.
//!
//! ## Example
//! ```
//! use parsnip::nfa::Nfa;
//!
//! let keyword = parsnip::parser::regex("if").unwrap().to_nfa_tagged("IF");
//! let ident = parsnip::parser::regex("[a-z]([a-z])*").unwrap().to_nfa_tagged("IDENT");
//! let merged = Nfa::merge(vec![keyword, ident]);
//!
//! assert!(merged.accepts("if"));
//! assert!(merged.accepts("ifx"));
//! // Both rules accept "if"; the IF automaton was listed first, so its tag wins.
//! let scan = merged.scan("if");
//! assert_eq!(scan.last_accept_position, Some(2));
//! assert_eq!(scan.last_accept_tag.as_deref(), Some("IF"));
//! ```

use std::collections::HashSet;
use std::rc::Rc;

use crate::dfa::{Dfa, Scan};
use crate::util::merge_alphabets;
pub use eval::NfaEvaluator;

pub mod eval;

/// A nondeterministic finite automaton: alphabet, states, initial state and the priority
/// ranking of its accept states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Nfa {
    pub(crate) alphabet: Rc<[char]>,
    pub(crate) states: Vec<NfaState>,
    pub(crate) initial_state: usize,
    pub(crate) accept_ranking: Vec<usize>,
}

/// A state in a NFA: its name (for diagnostics), whether it accepts, an optional tag on accept
/// states, its ε-transitions and one transition set per element of the alphabet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NfaState {
    pub(crate) name: Rc<str>,
    pub(crate) accepting: bool,
    pub(crate) tag: Option<Rc<str>>,
    pub(crate) epsilon_transitions: Vec<usize>,
    pub(crate) transitions: Vec<Vec<usize>>,
}

impl NfaState {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// The ε-transitions as state indices.
    pub fn epsilon_transitions(&self) -> &[usize] {
        &self.epsilon_transitions
    }

    /// Transition sets per element of the alphabet, in alphabet order.
    pub fn transitions(&self) -> &[Vec<usize>] {
        &self.transitions
    }
}

impl Nfa {
    /// The disjoint union of several automata: a fresh start state with ε-edges to every input
    /// automaton's start. Alphabets are unioned and every transition table is remapped onto the
    /// merged alphabet. Tags are preserved and the accept rankings are concatenated in input
    /// order, so earlier automata take priority wherever their accepts coincide with later ones.
    pub fn merge(nfas: Vec<Nfa>) -> Nfa {
        let alphabets: Vec<Rc<[char]>> = nfas.iter().map(|nfa| nfa.alphabet.clone()).collect();
        let alphabet = merge_alphabets(&alphabets);

        let mut states = vec![NfaState {
            name: Rc::from("0"),
            accepting: false,
            tag: None,
            epsilon_transitions: vec![],
            transitions: vec![vec![]; alphabet.len()],
        }];
        let mut start_targets = Vec::with_capacity(nfas.len());
        let mut accept_ranking = Vec::new();

        for (nth, nfa) in nfas.into_iter().enumerate() {
            let offset = states.len();
            let translation: Vec<usize> = nfa
                .alphabet
                .iter()
                .map(|c| {
                    alphabet
                        .binary_search(c)
                        .expect("merged alphabet contains every source character")
                })
                .collect();
            start_targets.push(offset + nfa.initial_state);
            accept_ranking.extend(nfa.accept_ranking.iter().map(|&q| q + offset));

            for state in nfa.states {
                let mut transitions = vec![vec![]; alphabet.len()];
                for (from, targets) in state.transitions.into_iter().enumerate() {
                    transitions[translation[from]] =
                        targets.into_iter().map(|q| q + offset).collect();
                }
                states.push(NfaState {
                    name: Rc::from(format!("r{}_{}", nth + 1, state.name)),
                    accepting: state.accepting,
                    tag: state.tag,
                    epsilon_transitions: state
                        .epsilon_transitions
                        .into_iter()
                        .map(|q| q + offset)
                        .collect(),
                    transitions,
                });
            }
        }

        states[0].epsilon_transitions = start_targets;
        Nfa {
            alphabet,
            states,
            initial_state: 0,
            accept_ranking,
        }
    }

    /// The ε-closure of a state: everything reachable through ε-edges alone, found by BFS.
    pub fn closure(&self, start: usize) -> HashSet<usize> {
        let mut all = HashSet::from([start]);
        let mut worklist = vec![start];
        while let Some(state) = worklist.pop() {
            for &target in &self.states[state].epsilon_transitions {
                if all.insert(target) {
                    worklist.push(target);
                }
            }
        }
        all
    }

    /// Whether the automaton accepts the whole input.
    pub fn accepts(&self, input: &str) -> bool {
        let mut evaluator = self.evaluator();
        for c in input.chars() {
            if evaluator.step(c).is_none() {
                return false;
            }
        }
        evaluator.is_accepting()
    }

    /// Runs the parallel-state simulation over the input, recording the accept observations
    /// (characters consumed, last accepting position and the tag chosen by ranking). Stops
    /// early once the state set runs empty, since no further input can change the outcome.
    pub fn scan(&self, input: &str) -> Scan {
        let mut evaluator = self.evaluator();
        for c in input.chars() {
            if evaluator.step(c).is_none() {
                break;
            }
        }
        evaluator.scan()
    }

    /// A step-by-step evaluator positioned at the initial state.
    pub fn evaluator(&self) -> NfaEvaluator<'_> {
        self.into()
    }

    /// Converts to a DFA with the subset construction; see [Dfa::from_nfa].
    pub fn to_dfa(&self) -> Dfa {
        Dfa::from_nfa(self)
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn states(&self) -> &[NfaState] {
        &self.states
    }

    pub fn initial_state(&self) -> &NfaState {
        &self.states[self.initial_state]
    }

    pub fn initial_state_index(&self) -> usize {
        self.initial_state
    }

    /// Accept states in priority order, highest priority first.
    pub fn accept_ranking(&self) -> &[usize] {
        &self.accept_ranking
    }
}
