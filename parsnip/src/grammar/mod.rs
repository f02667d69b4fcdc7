//! # Context-free grammars
//! This module contains the grammar model used by the parser generator: [Symbol]s (terminals and
//! nonterminals), [Production]s and the [Cfg] container. A [Cfg] owns the declared symbol lists
//! (in declaration order, which fixes the numbering of the generated tables), a flattened list of
//! productions and the start symbol. All analyses — FIRST/FOLLOW sets, the LR(0) item-set
//! automaton and the SLR(1) tables — are computed on first access and cached on the instance, so
//! a `Cfg` behaves as a build-once, read-many value.
//!
//! ## Symbols
//! A [Terminal] may carry a lexeme value (the `STORE` lexer flag puts the matched text there), but
//! identity is by name only: `id(x)` and `id(y)` are the same terminal as far as grammars, tables
//! and table lookups are concerned. Use [Terminal::identical_to] when the value matters. Two
//! reserved terminals exist: [epsilon()] (the empty string) and [dollar()] (the end-of-input
//! sentinel); both are plain terminals with reserved names and structural equality.
//!
//! ## Example
//! ```
//! use parsnip::grammar::{dollar, Cfg, NonTerminal, Production, Symbol, Terminal};
//!
//! // E -> E plus id | id
//! let e = NonTerminal::new("E");
//! let plus = Terminal::new("plus");
//! let id = Terminal::new("id");
//! let cfg = Cfg::new(
//!     vec![e.clone()],
//!     vec![plus.clone(), id.clone()],
//!     vec![
//!         Production::new(
//!             e.clone(),
//!             vec![
//!                 Symbol::NonTerminal(e.clone()),
//!                 Symbol::Terminal(plus.clone()),
//!                 Symbol::Terminal(id.clone()),
//!             ],
//!         ),
//!         Production::new(e.clone(), vec![Symbol::Terminal(id.clone())]),
//!     ],
//!     e.clone(),
//! );
//! assert!(!cfg.is_nullable(&Symbol::NonTerminal(e.clone())));
//! assert_eq!(cfg.first(&Symbol::NonTerminal(e.clone())), [id].into());
//!
//! // Augmenting introduces a fresh start E' -> E, which gives the
//! // SLR(1) construction its unambiguous accept state.
//! let augmented = cfg.into_augmented();
//! assert_eq!(augmented.start().name(), "E'");
//! assert!(augmented.follow(&e).contains(&dollar()));
//! ```

use std::cell::OnceCell;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::Rc;

use crate::lr0::ItemSetAutomaton;
use crate::slr::Slr1Table;

pub use crate::parser::grammar as parse;
pub use parse::{GrammarError, GrammarFile, MethodBodies};

pub mod analysis;
pub mod parse;

/// The reserved terminal `ε`, the empty string. It may only appear as the sole RHS of a
/// production, where it denotes the empty production.
pub fn epsilon() -> Terminal {
    Terminal::new("ε")
}

/// The reserved terminal `$`, the end-of-input sentinel appended to token streams.
pub fn dollar() -> Terminal {
    Terminal::new("$")
}

/// A terminal symbol: a token name plus an optional lexeme value. The value is carried for
/// diagnostics and for `STORE`d tokens but does not participate in equality, hashing or ordering.
#[derive(Clone, Debug, Eq)]
pub struct Terminal {
    pub(crate) name: Rc<str>,
    pub(crate) value: Option<Rc<str>>,
}

impl Terminal {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        Terminal {
            name: name.into(),
            value: None,
        }
    }

    pub fn with_value(name: impl Into<Rc<str>>, value: impl Into<Rc<str>>) -> Self {
        Terminal {
            name: name.into(),
            value: Some(value.into()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The stored lexeme, if this terminal was produced by a `STORE` lexer rule.
    pub fn value(&self) -> Option<&str> {
        self.value.as_deref()
    }

    /// Compares name *and* value, unlike `==` which is by name only.
    pub fn identical_to(&self, other: &Terminal) -> bool {
        self.name == other.name && self.value == other.value
    }

    pub fn is_epsilon(&self) -> bool {
        &*self.name == "ε"
    }

    pub fn is_dollar(&self) -> bool {
        &*self.name == "$"
    }
}

impl PartialEq for Terminal {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Hash for Terminal {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Terminal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Terminal {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Terminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Some(value) => write!(f, "{}({})", self.name, value),
            None => write!(f, "{}", self.name),
        }
    }
}

/// A nonterminal symbol, identified by its name.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NonTerminal {
    pub(crate) name: Rc<str>,
}

impl NonTerminal {
    pub fn new(name: impl Into<Rc<str>>) -> Self {
        NonTerminal { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for NonTerminal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// A grammar symbol, either a [Terminal] or a [NonTerminal].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Symbol {
    Terminal(Terminal),
    NonTerminal(NonTerminal),
}

impl Symbol {
    pub fn name(&self) -> &str {
        match self {
            Symbol::Terminal(t) => t.name(),
            Symbol::NonTerminal(n) => n.name(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Symbol::Terminal(_))
    }

    pub fn as_terminal(&self) -> Option<&Terminal> {
        match self {
            Symbol::Terminal(t) => Some(t),
            Symbol::NonTerminal(_) => None,
        }
    }

    pub fn as_nonterminal(&self) -> Option<&NonTerminal> {
        match self {
            Symbol::Terminal(_) => None,
            Symbol::NonTerminal(n) => Some(n),
        }
    }
}

impl From<Terminal> for Symbol {
    fn from(value: Terminal) -> Self {
        Symbol::Terminal(value)
    }
}

impl From<NonTerminal> for Symbol {
    fn from(value: NonTerminal) -> Self {
        Symbol::NonTerminal(value)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symbol::Terminal(t) => t.fmt(f),
            Symbol::NonTerminal(n) => n.fmt(f),
        }
    }
}

/// A production `A -> α`. The empty production is written with the single RHS symbol `ε` and
/// counts zero symbols towards the shift-reduce driver's pop count.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Production {
    pub(crate) lhs: NonTerminal,
    pub(crate) rhs: Vec<Symbol>,
}

impl Production {
    /// Creates a production. `ε` may only appear as the sole RHS symbol; mixing it into a longer
    /// RHS is a construction bug and panics.
    pub fn new(lhs: NonTerminal, rhs: Vec<Symbol>) -> Self {
        assert!(
            !rhs.is_empty(),
            "a production must have at least one RHS symbol, use ε for the empty production"
        );
        if rhs.len() > 1 {
            assert!(
                !rhs.iter()
                    .any(|s| matches!(s, Symbol::Terminal(t) if t.is_epsilon())),
                "ε may only appear as the whole RHS of a production"
            );
        }
        Production { lhs, rhs }
    }

    /// The empty production `A -> ε`.
    pub fn empty(lhs: NonTerminal) -> Self {
        Production {
            lhs,
            rhs: vec![Symbol::Terminal(epsilon())],
        }
    }

    pub fn lhs(&self) -> &NonTerminal {
        &self.lhs
    }

    /// The RHS exactly as written, so the empty production yields `[ε]`.
    pub fn rhs(&self) -> &[Symbol] {
        &self.rhs
    }

    /// The RHS with the `[ε]` convention normalised away: the empty production has an empty body.
    /// Items, FOLLOW collection and the driver's pop count all work on the body.
    pub fn body(&self) -> &[Symbol] {
        if self.is_empty_production() {
            &[]
        } else {
            &self.rhs
        }
    }

    pub fn is_empty_production(&self) -> bool {
        matches!(self.rhs.as_slice(), [Symbol::Terminal(t)] if t.is_epsilon())
    }

    /// Number of symbols the production really derives: 0 for the empty production.
    pub fn len(&self) -> usize {
        self.body().len()
    }

    pub fn is_empty(&self) -> bool {
        self.is_empty_production()
    }
}

impl fmt::Display for Production {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ->", self.lhs)?;
        for sym in &self.rhs {
            write!(f, " {sym}")?;
        }
        Ok(())
    }
}

/// A context-free grammar: ordered nonterminal and terminal lists, a flattened production list
/// (declaration order, used for table indexing) and a start symbol. Analyses are cached on the
/// instance; see the [module documentation](crate::grammar).
#[derive(Debug)]
pub struct Cfg {
    pub(crate) nonterminals: Vec<NonTerminal>,
    pub(crate) terminals: Vec<Terminal>,
    pub(crate) productions: Vec<Production>,
    pub(crate) by_lhs: HashMap<NonTerminal, Vec<usize>>,
    pub(crate) start: NonTerminal,
    pub(crate) analysis: OnceCell<analysis::Analysis>,
    pub(crate) automaton: OnceCell<ItemSetAutomaton>,
    pub(crate) table: OnceCell<Slr1Table>,
}

impl Cfg {
    /// Builds a grammar from its parts. This is the programmatic entry point; grammars read from
    /// files go through [GrammarFile], which reports malformed input as [GrammarError]s before
    /// ever calling this. Misuse here (duplicate names, undeclared symbols in a RHS, ε mixed
    /// into a longer RHS) is therefore a caller bug and panics.
    pub fn new(
        nonterminals: Vec<NonTerminal>,
        terminals: Vec<Terminal>,
        productions: Vec<Production>,
        start: NonTerminal,
    ) -> Self {
        let nonterminal_set: HashSet<&NonTerminal> = nonterminals.iter().collect();
        assert_eq!(
            nonterminal_set.len(),
            nonterminals.len(),
            "duplicate nonterminal declaration"
        );
        let terminal_set: HashSet<&Terminal> = terminals.iter().collect();
        assert_eq!(
            terminal_set.len(),
            terminals.len(),
            "duplicate terminal declaration"
        );
        assert!(
            !terminals.iter().any(|t| t.is_epsilon()),
            "ε is reserved and may not be declared as a terminal"
        );
        assert!(
            !nonterminals
                .iter()
                .any(|n| terminals.iter().any(|t| t.name == n.name)),
            "a name may not be both a terminal and a nonterminal"
        );
        assert!(
            nonterminal_set.contains(&start),
            "start symbol {start} is not a declared nonterminal"
        );

        let mut by_lhs: HashMap<NonTerminal, Vec<usize>> = nonterminals
            .iter()
            .map(|n| (n.clone(), Vec::new()))
            .collect();
        for (index, production) in productions.iter().enumerate() {
            for sym in production.body() {
                match sym {
                    Symbol::Terminal(t) => assert!(
                        terminal_set.contains(t),
                        "production '{production}' uses undeclared terminal '{t}'"
                    ),
                    Symbol::NonTerminal(n) => assert!(
                        nonterminal_set.contains(n),
                        "production '{production}' uses undeclared nonterminal '{n}'"
                    ),
                }
            }
            by_lhs
                .get_mut(production.lhs())
                .unwrap_or_else(|| panic!("production '{production}' has an undeclared LHS"))
                .push(index);
        }

        Cfg {
            nonterminals,
            terminals,
            productions,
            by_lhs,
            start,
            analysis: OnceCell::new(),
            automaton: OnceCell::new(),
            table: OnceCell::new(),
        }
    }

    /// Ensures the grammar has a canonical start production. If the current start symbol already
    /// has the single rule `S -> E $`, the grammar is returned unchanged; otherwise a fresh
    /// nonterminal (the start's name with primes appended until unused) is introduced with the
    /// single rule `S' -> S` and made the new start. This gives the SLR(1) construction its
    /// unambiguous Accept transition.
    pub fn into_augmented(self) -> Cfg {
        let start_rules = &self.by_lhs[&self.start];
        if let [single] = start_rules.as_slice() {
            let rhs = self.productions[*single].rhs();
            if rhs.len() == 2
                && matches!(&rhs[0], Symbol::NonTerminal(_))
                && matches!(&rhs[1], Symbol::Terminal(t) if t.is_dollar())
            {
                return self;
            }
        }

        let mut name = format!("{}'", self.start.name());
        while self.nonterminals.iter().any(|n| &*n.name == name)
            || self.terminals.iter().any(|t| &*t.name == name)
        {
            name.push('\'');
        }
        let fresh = NonTerminal::new(name);

        let mut nonterminals = self.nonterminals;
        nonterminals.push(fresh.clone());
        let mut productions = self.productions;
        productions.push(Production::new(
            fresh.clone(),
            vec![Symbol::NonTerminal(self.start)],
        ));
        Cfg::new(nonterminals, self.terminals, productions, fresh)
    }

    pub fn nonterminals(&self) -> &[NonTerminal] {
        &self.nonterminals
    }

    pub fn terminals(&self) -> &[Terminal] {
        &self.terminals
    }

    pub fn start(&self) -> &NonTerminal {
        &self.start
    }

    /// All productions, flattened in declaration order. [crate::slr::Action::Reduce] and the
    /// LL(1) table refer to productions by index into this list.
    pub fn productions(&self) -> &[Production] {
        &self.productions
    }

    pub fn production(&self, index: usize) -> &Production {
        &self.productions[index]
    }

    /// Indices of the productions with the given LHS, in declaration order. Every declared
    /// nonterminal has an entry, possibly empty.
    pub fn productions_of(&self, nonterminal: &NonTerminal) -> &[usize] {
        self.by_lhs
            .get(nonterminal)
            .map(Vec::as_slice)
            .unwrap_or_else(|| panic!("{nonterminal} is not a declared nonterminal"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_identity_ignores_value() {
        let bare = Terminal::new("id");
        let stored = Terminal::with_value("id", "x");
        assert_eq!(bare, stored);
        assert!(!bare.identical_to(&stored));
        assert_eq!(stored.to_string(), "id(x)");

        let mut set = std::collections::HashSet::new();
        set.insert(bare);
        assert!(set.contains(&stored));
    }

    #[test]
    fn epsilon_and_dollar_are_structural() {
        assert_eq!(epsilon(), Terminal::new("ε"));
        assert_eq!(dollar(), Terminal::new("$"));
        assert!(epsilon().is_epsilon());
        assert!(dollar().is_dollar());
    }

    #[test]
    fn empty_production_has_no_body() {
        let production = Production::empty(NonTerminal::new("A"));
        assert!(production.is_empty_production());
        assert_eq!(production.rhs().len(), 1);
        assert_eq!(production.body().len(), 0);
        assert_eq!(production.len(), 0);
        assert_eq!(production.to_string(), "A -> ε");
    }

    #[test]
    #[should_panic(expected = "whole RHS")]
    fn epsilon_mixed_into_rhs_panics() {
        Production::new(
            NonTerminal::new("A"),
            vec![
                Symbol::Terminal(epsilon()),
                Symbol::Terminal(Terminal::new("a")),
            ],
        );
    }

    #[test]
    fn augmentation_introduces_fresh_start() {
        let a = NonTerminal::new("A");
        let x = Terminal::new("x");
        let cfg = Cfg::new(
            vec![a.clone()],
            vec![x.clone()],
            vec![Production::new(a.clone(), vec![Symbol::Terminal(x)])],
            a.clone(),
        )
        .into_augmented();
        assert_eq!(cfg.start().name(), "A'");
        assert_eq!(cfg.productions_of(cfg.start()).len(), 1);
        let start_production = cfg.production(cfg.productions_of(cfg.start())[0]);
        assert_eq!(start_production.rhs(), &[Symbol::NonTerminal(a)]);
    }

    #[test]
    fn augmentation_skips_dollar_terminated_start() {
        let s = NonTerminal::new("S");
        let e = NonTerminal::new("E");
        let x = Terminal::new("x");
        let cfg = Cfg::new(
            vec![s.clone(), e.clone()],
            vec![x.clone(), dollar()],
            vec![
                Production::new(
                    s.clone(),
                    vec![Symbol::NonTerminal(e.clone()), Symbol::Terminal(dollar())],
                ),
                Production::new(e.clone(), vec![Symbol::Terminal(x)]),
            ],
            s.clone(),
        )
        .into_augmented();
        assert_eq!(cfg.start(), &s);
        assert_eq!(cfg.nonterminals().len(), 2);
    }

    #[test]
    fn augmentation_avoids_name_collisions() {
        let a = NonTerminal::new("A");
        let a_prime = NonTerminal::new("A'");
        let x = Terminal::new("x");
        let cfg = Cfg::new(
            vec![a.clone(), a_prime.clone()],
            vec![x.clone()],
            vec![
                Production::new(a.clone(), vec![Symbol::NonTerminal(a_prime.clone())]),
                Production::new(a_prime, vec![Symbol::Terminal(x)]),
            ],
            a,
        )
        .into_augmented();
        assert_eq!(cfg.start().name(), "A''");
    }
}
