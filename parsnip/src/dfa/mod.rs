//! # Deterministic finite automata
//! The [Dfa] struct represents a total DFA over a finite alphabet of characters: every state
//! has exactly one transition per alphabet element, with an ordinary (non-accepting,
//! self-looping) state playing the role of the error sink. Instances are produced from a
//! [Nfa](crate::nfa::Nfa) by the subset construction.
//!
//! A DFA state inherits a *tag* when the subset it was built from contains tagged accept
//! states of the source NFA; ties are broken by the NFA's accept ranking, earliest wins.
//! Scanning comes in two modes:
//!
//! * [Dfa::accepts] — does the whole input land in an accepting state?
//! * [Dfa::scan] — longest match: consume characters while recording the last accepting
//!   position seen and its tag. An accepting start state yields a zero-length match, and
//!   scanning exits early once it can tell no further accept is reachable.
//!
//! ## Example
//! ```
//! let dfa = parsnip::parser::regex("a(a)*b").unwrap().to_nfa().to_dfa();
//! assert!(dfa.accepts("aab"));
//! assert!(!dfa.accepts("ba"));
//!
//! let dfa = parsnip::parser::regex("a(a)*").unwrap().to_nfa_tagged("AS").to_dfa();
//! let scan = dfa.scan("aaab");
//! assert_eq!(scan.last_accept_position, Some(3));
//! assert_eq!(scan.last_accept_tag.as_deref(), Some("AS"));
//! ```

use std::collections::{BTreeSet, HashMap, VecDeque};
use std::rc::Rc;

use crate::nfa::Nfa;
pub use eval::DfaEvaluator;

pub mod eval;

/// A deterministic finite automaton with a total transition function and tagged accept states.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dfa {
    pub(crate) alphabet: Rc<[char]>,
    pub(crate) states: Vec<DfaState>,
    pub(crate) initial_state: usize,
}

/// A state in a DFA: name, acceptance, optional tag and one transition per alphabet element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DfaState {
    pub(crate) name: Rc<str>,
    pub(crate) accepting: bool,
    pub(crate) tag: Option<Rc<str>>,
    pub(crate) transitions: Vec<usize>,
}

/// The transient observations of one scan over an input: how many characters were consumed,
/// the position just after the last accepted prefix (monotone non-decreasing during the scan)
/// and the tag of the state that accepted it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Scan {
    pub chars_consumed: usize,
    pub last_accept_position: Option<usize>,
    pub last_accept_tag: Option<Rc<str>>,
}

impl DfaState {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_accepting(&self) -> bool {
        self.accepting
    }

    pub fn tag(&self) -> Option<&str> {
        self.tag.as_deref()
    }

    /// Transition targets per element of the alphabet, in alphabet order.
    pub fn transitions(&self) -> &[usize] {
        &self.transitions
    }

    /// A non-accepting state whose transitions all loop back on itself can never accept again.
    pub(crate) fn is_sink(&self, index: usize) -> bool {
        !self.accepting && self.transitions.iter().all(|&target| target == index)
    }
}

impl Dfa {
    /// The subset construction. Each DFA state corresponds to an ε-closed set of NFA states,
    /// discovered by worklist search from the closure of the NFA's initial state; the empty set
    /// becomes an ordinary sink state, keeping the transition function total. States are named
    /// sequentially from 0 in discovery order and the search visits alphabet elements in
    /// order, so the result is deterministic. A state accepts iff its set contains an accepting
    /// NFA state, and its tag comes from the earliest-ranked accepting member.
    pub fn from_nfa(nfa: &Nfa) -> Dfa {
        let alphabet = Rc::clone(&nfa.alphabet);

        let close = |set: BTreeSet<usize>| -> BTreeSet<usize> {
            set.iter().flat_map(|&q| nfa.closure(q)).collect()
        };

        let start: BTreeSet<usize> = nfa.closure(nfa.initial_state_index()).into_iter().collect();
        let mut sets = vec![start.clone()];
        let mut index: HashMap<BTreeSet<usize>, usize> = HashMap::from([(start, 0)]);
        let mut transitions: Vec<Vec<usize>> = Vec::new();
        let mut queue = VecDeque::from([0usize]);

        while let Some(at) = queue.pop_front() {
            debug_assert_eq!(transitions.len(), at);
            let current = sets[at].clone();
            let mut row = Vec::with_capacity(alphabet.len());
            for element in 0..alphabet.len() {
                let moved: BTreeSet<usize> = current
                    .iter()
                    .flat_map(|&q| nfa.states()[q].transitions[element].iter().copied())
                    .collect();
                let target = close(moved);
                let to = match index.get(&target) {
                    Some(&existing) => existing,
                    None => {
                        let fresh = sets.len();
                        sets.push(target.clone());
                        index.insert(target, fresh);
                        queue.push_back(fresh);
                        fresh
                    }
                };
                row.push(to);
            }
            transitions.push(row);
        }

        let states = sets
            .iter()
            .zip(transitions)
            .enumerate()
            .map(|(number, (set, row))| DfaState {
                name: Rc::from(number.to_string()),
                accepting: set.iter().any(|&q| nfa.states()[q].accepting),
                tag: nfa
                    .accept_ranking()
                    .iter()
                    .find(|q| set.contains(q))
                    .and_then(|&q| nfa.states()[q].tag.clone()),
                transitions: row,
            })
            .collect();

        Dfa {
            alphabet,
            states,
            initial_state: 0,
        }
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

    /// Longest-match scan: consumes characters while recording the last accepting position and
    /// its tag. Returns as soon as the automaton is trapped in the sink (or sees a character
    /// outside the alphabet), so the observations cover the longest accepted prefix even when
    /// the input continues past it.
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
    pub fn evaluator(&self) -> DfaEvaluator<'_> {
        self.into()
    }

    pub fn alphabet(&self) -> &[char] {
        &self.alphabet
    }

    pub fn states(&self) -> &[DfaState] {
        &self.states
    }

    pub fn initial_state(&self) -> &DfaState {
        &self.states[self.initial_state]
    }

    pub fn initial_state_index(&self) -> usize {
        self.initial_state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dfa(pattern: &str) -> Dfa {
        crate::parser::regex(pattern).unwrap().to_nfa().to_dfa()
    }

    #[test]
    fn subset_construction_agrees_with_the_nfa() {
        let nfa = crate::parser::regex("(a+b)(ab)*").unwrap().to_nfa();
        let dfa = nfa.to_dfa();
        for input in ["a", "b", "aab", "bab", "aabab", "", "ab", "ba", "aa"] {
            assert_eq!(nfa.accepts(input), dfa.accepts(input), "{input:?}");
        }
    }

    #[test]
    fn construction_is_deterministic() {
        let nfa = crate::parser::regex("(a+b)(ab)*").unwrap().to_nfa();
        assert_eq!(nfa.to_dfa(), nfa.to_dfa());
    }

    #[test]
    fn tag_comes_from_the_earliest_ranked_accept() {
        let first = crate::parser::regex("ab").unwrap().to_nfa_tagged("FIRST");
        let second = crate::parser::regex("a(b+c)").unwrap().to_nfa_tagged("SECOND");
        let dfa = Nfa::merge(vec![first, second]).to_dfa();
        // "ab" is accepted by both; the first automaton outranks the second.
        assert_eq!(dfa.scan("ab").last_accept_tag.as_deref(), Some("FIRST"));
        // "ac" only by the second.
        assert_eq!(dfa.scan("ac").last_accept_tag.as_deref(), Some("SECOND"));
    }

    #[test]
    fn scan_is_a_longest_match() {
        let dfa = crate::parser::regex("a(a)*")
            .unwrap()
            .to_nfa_tagged("AS")
            .to_dfa();
        let scan = dfa.scan("aaab");
        assert_eq!(scan.last_accept_position, Some(3));
        assert_eq!(scan.last_accept_tag.as_deref(), Some("AS"));
    }

    #[test]
    fn zero_length_match_on_an_accepting_start() {
        let dfa = crate::parser::regex("(a)*").unwrap().to_nfa_tagged("AS").to_dfa();
        let scan = dfa.scan("b");
        assert_eq!(scan.last_accept_position, Some(0));
        assert_eq!(scan.last_accept_tag.as_deref(), Some("AS"));
    }

    #[test]
    fn scan_positions_are_monotone() {
        let dfa = crate::parser::regex("(ab)*").unwrap().to_nfa_tagged("ABS").to_dfa();
        let mut evaluator = dfa.evaluator();
        let mut previous = evaluator.scan().last_accept_position;
        for c in "ababab".chars() {
            evaluator.step(c);
            let current = evaluator.scan().last_accept_position;
            assert!(current >= previous);
            previous = current;
        }
        assert_eq!(previous, Some(6));
    }

    #[test]
    fn sink_state_is_total_and_rejecting() {
        let dfa = dfa("ab");
        assert!(!dfa.accepts("ba"));
        assert!(!dfa.accepts("abab"));
        // Every state has a transition for every alphabet element.
        for state in dfa.states() {
            assert_eq!(state.transitions().len(), dfa.alphabet().len());
        }
    }
}
