use crate::dfa::{Dfa, DfaState, Scan};
use std::collections::HashMap;
use std::rc::Rc;

/// Step-by-step evaluation of a [Dfa], tracking the longest-match observations as it goes.
/// Once the evaluator sees a character outside the alphabet, or gets trapped in the sink, it
/// latches dead: no further input is consumed and the observations are frozen.
#[derive(Clone, Debug)]
pub struct DfaEvaluator<'a> {
    dfa: &'a Dfa,
    rev_map: HashMap<char, usize>,
    current_state: usize,
    dead: bool,
    chars_consumed: usize,
    last_accept_position: Option<usize>,
    last_accept_tag: Option<Rc<str>>,
}

impl<'a> DfaEvaluator<'a> {
    pub fn is_accepting(&self) -> bool {
        !self.dead && self.dfa.states[self.current_state].accepting
    }

    /// The current state, or `None` once the evaluator is dead.
    pub fn current_state(&self) -> Option<&'a DfaState> {
        if self.dead {
            None
        } else {
            Some(&self.dfa.states[self.current_state])
        }
    }

    pub fn current_state_index(&self) -> usize {
        self.current_state
    }

    /// Consumes one character and returns the state entered. Returns `None` without consuming
    /// anything when the evaluator is dead or the character is not in the alphabet (which
    /// kills the evaluator).
    pub fn step(&mut self, c: char) -> Option<&'a DfaState> {
        if self.dead {
            return None;
        }
        let Some(&at) = self.rev_map.get(&c) else {
            self.dead = true;
            return None;
        };
        let dfa = self.dfa;
        self.current_state = dfa.states[self.current_state].transitions[at];
        self.chars_consumed += 1;
        let state = &dfa.states[self.current_state];
        if state.accepting {
            self.last_accept_position = Some(self.chars_consumed);
            self.last_accept_tag = state.tag.clone();
        }
        if state.is_sink(self.current_state) {
            self.dead = true;
        }
        Some(state)
    }

    pub fn step_multiple(&mut self, input: &str) -> Option<&'a DfaState> {
        let mut last = None;
        for c in input.chars() {
            last = self.step(c);
            if last.is_none() {
                return None;
            }
        }
        last.or_else(|| self.current_state())
    }

    /// Snapshot of the longest-match observations so far.
    pub fn scan(&self) -> Scan {
        Scan {
            chars_consumed: self.chars_consumed,
            last_accept_position: self.last_accept_position,
            last_accept_tag: self.last_accept_tag.clone(),
        }
    }
}

impl<'a> From<&'a Dfa> for DfaEvaluator<'a> {
    fn from(value: &'a Dfa) -> Self {
        let rev_map = value
            .alphabet
            .iter()
            .enumerate()
            .map(|(at, &c)| (c, at))
            .collect();
        let initial = &value.states[value.initial_state];
        DfaEvaluator {
            dfa: value,
            rev_map,
            current_state: value.initial_state,
            dead: false,
            chars_consumed: 0,
            last_accept_position: initial.accepting.then_some(0),
            last_accept_tag: if initial.accepting {
                initial.tag.clone()
            } else {
                None
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn step_returns_the_entered_state() {
        let dfa = crate::parser::regex("ab").unwrap().to_nfa().to_dfa();
        let mut evaluator = dfa.evaluator();
        assert!(!evaluator.is_accepting());
        evaluator.step('a');
        assert!(!evaluator.is_accepting());
        evaluator.step('b');
        assert!(evaluator.is_accepting());
    }

    #[test]
    fn unknown_character_latches_dead() {
        let dfa = crate::parser::regex("ab").unwrap().to_nfa().to_dfa();
        let mut evaluator = dfa.evaluator();
        assert!(evaluator.step('z').is_none());
        assert!(evaluator.current_state().is_none());
        assert!(evaluator.step('a').is_none());
        assert_eq!(evaluator.scan().chars_consumed, 0);
    }

    #[test]
    fn sink_stops_consumption_early() {
        let dfa = crate::parser::regex("ab").unwrap().to_nfa().to_dfa();
        let mut evaluator = dfa.evaluator();
        evaluator.step_multiple("ba");
        // The b trapped the automaton immediately; the a was never consumed.
        assert!(evaluator.scan().chars_consumed <= 1);
    }
}
