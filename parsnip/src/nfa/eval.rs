use crate::dfa::Scan;
use crate::nfa::{Nfa, NfaState};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;

/// Step-by-step evaluation of a [Nfa]: tracks the set of states the automaton could be in, and
/// the accept observations needed for longest-match scanning (characters consumed, last
/// accepting position, the tag of the earliest-ranked active accept state).
#[derive(Clone, Debug)]
pub struct NfaEvaluator<'a> {
    nfa: &'a Nfa,
    rev_map: HashMap<char, usize>,
    current_states: HashSet<usize>,
    chars_consumed: usize,
    last_accept_position: Option<usize>,
    last_accept_tag: Option<Rc<str>>,
}

impl<'a> NfaEvaluator<'a> {
    pub fn is_accepting(&self) -> bool {
        self.current_states()
            .iter()
            .any(|state| state.accepting)
    }

    pub fn current_states(&self) -> Vec<&NfaState> {
        self.current_states
            .iter()
            .map(|&q| &self.nfa.states[q])
            .collect()
    }

    pub fn current_states_idx(&self) -> &HashSet<usize> {
        &self.current_states
    }

    /// Whether no state is active any more; no amount of further input can be accepted.
    pub fn is_dead(&self) -> bool {
        self.current_states.is_empty()
    }

    /// Consumes one character. Returns `None` without consuming anything when the evaluator is
    /// dead or the character is not in the alphabet (which kills the evaluator).
    pub fn step(&mut self, c: char) -> Option<()> {
        if self.current_states.is_empty() {
            return None;
        }
        let Some(&at) = self.rev_map.get(&c) else {
            self.current_states.clear();
            return None;
        };
        self.current_states = self
            .current_states
            .iter()
            .flat_map(|&q| self.nfa.states[q].transitions[at].iter().copied())
            .collect();
        self.include_closure();
        self.chars_consumed += 1;
        self.record_accept();
        Some(())
    }

    pub fn step_multiple(&mut self, input: &str) -> Option<()> {
        input.chars().try_for_each(|c| self.step(c))
    }

    /// Snapshot of the accept observations so far.
    pub fn scan(&self) -> Scan {
        Scan {
            chars_consumed: self.chars_consumed,
            last_accept_position: self.last_accept_position,
            last_accept_tag: self.last_accept_tag.clone(),
        }
    }

    fn include_closure(&mut self) {
        let mut worklist: Vec<usize> = self.current_states.iter().copied().collect();
        while let Some(state) = worklist.pop() {
            for &target in &self.nfa.states[state].epsilon_transitions {
                if self.current_states.insert(target) {
                    worklist.push(target);
                }
            }
        }
    }

    fn record_accept(&mut self) {
        if !self.is_accepting() {
            return;
        }
        self.last_accept_position = Some(self.chars_consumed);
        self.last_accept_tag = self
            .nfa
            .accept_ranking
            .iter()
            .find(|q| self.current_states.contains(q))
            .and_then(|&q| self.nfa.states[q].tag.clone());
    }
}

impl<'a> From<&'a Nfa> for NfaEvaluator<'a> {
    fn from(value: &'a Nfa) -> Self {
        let rev_map = value
            .alphabet
            .iter()
            .enumerate()
            .map(|(at, &c)| (c, at))
            .collect();
        let mut evaluator = Self {
            nfa: value,
            rev_map,
            current_states: HashSet::from([value.initial_state]),
            chars_consumed: 0,
            last_accept_position: None,
            last_accept_tag: None,
        };
        evaluator.include_closure();
        evaluator.record_accept();
        evaluator
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evaluator_steps_through_a_match() {
        let nfa = crate::parser::regex("ab").unwrap().to_nfa();
        let mut evaluator = nfa.evaluator();
        assert!(!evaluator.is_accepting());
        evaluator.step('a');
        assert!(!evaluator.is_accepting());
        evaluator.step('b');
        assert!(evaluator.is_accepting());
    }

    #[test]
    fn unknown_character_kills_the_evaluator() {
        let nfa = crate::parser::regex("ab").unwrap().to_nfa();
        let mut evaluator = nfa.evaluator();
        assert_eq!(evaluator.step('z'), None);
        assert!(evaluator.is_dead());
        assert_eq!(evaluator.step('a'), None);
    }

    #[test]
    fn zero_length_accept_is_recorded_up_front() {
        let nfa = crate::parser::regex("(a)*").unwrap().to_nfa_tagged("AS");
        let evaluator = nfa.evaluator();
        let scan = evaluator.scan();
        assert_eq!(scan.chars_consumed, 0);
        assert_eq!(scan.last_accept_position, Some(0));
        assert_eq!(scan.last_accept_tag.as_deref(), Some("AS"));
    }
}
