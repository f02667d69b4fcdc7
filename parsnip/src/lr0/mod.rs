//! # LR(0) items and the canonical item-set automaton
//! An [Item] is a production with a dot marking how much of the RHS the parser has recognised;
//! a parser state is a frozen set of items. This module implements CLOSURE and GOTO and builds
//! the canonical collection of item sets as a little DFA over the grammar symbols, which the
//! SLR(1) table construction then reads off.
//!
//! Item sets are `BTreeSet<Item>` values used directly as hash-map keys during the worklist
//! search, so state identity is plain set equality. The worklist visits symbols in a fixed
//! order (nonterminals in declaration order, then terminals in declaration order), which makes
//! the state numbering deterministic across runs.

use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::fmt::Write;

use crate::grammar::{Cfg, Symbol};

/// An LR(0) item: a production (by index into [Cfg::productions]) plus a dot position. The
/// single item of an empty production `C -> ε` is `C -> ·` with the dot at 0, already complete.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Item {
    pub(crate) production: usize,
    pub(crate) dot: usize,
}

/// A frozen set of items; one state of the item-set automaton.
pub type ItemSet = BTreeSet<Item>;

impl Item {
    pub fn new(production: usize, dot: usize) -> Self {
        Item { production, dot }
    }

    pub fn production(&self) -> usize {
        self.production
    }

    pub fn dot(&self) -> usize {
        self.dot
    }

    /// The symbol just after the dot, or `None` for a complete item.
    pub fn next_symbol<'c>(&self, cfg: &'c Cfg) -> Option<&'c Symbol> {
        cfg.production(self.production).body().get(self.dot)
    }

    /// Whether the dot has reached the end of the RHS.
    pub fn is_complete(&self, cfg: &Cfg) -> bool {
        self.dot == cfg.production(self.production).len()
    }

    pub(crate) fn advanced(self) -> Item {
        Item {
            production: self.production,
            dot: self.dot + 1,
        }
    }

    /// Display form `A -> α · β`.
    pub fn display(&self, cfg: &Cfg) -> String {
        let production = cfg.production(self.production);
        let mut out = format!("{} ->", production.lhs());
        for (at, sym) in production.body().iter().enumerate() {
            if at == self.dot {
                out.push_str(" ·");
            }
            let _ = write!(out, " {sym}");
        }
        if self.dot == production.len() {
            out.push_str(" ·");
        }
        out
    }
}

/// The canonical collection of item sets together with its transition function. State 0 is the
/// closure of the start symbol's initial items; the error sink is implicit (absent transitions).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemSetAutomaton {
    pub(crate) states: Vec<ItemSet>,
    pub(crate) transitions: Vec<BTreeMap<Symbol, usize>>,
}

impl ItemSetAutomaton {
    pub fn states(&self) -> &[ItemSet] {
        &self.states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// All transitions out of a state.
    pub fn transitions(&self, state: usize) -> &BTreeMap<Symbol, usize> {
        &self.transitions[state]
    }

    /// The state reached from `state` on `symbol`, if any.
    pub fn transition(&self, state: usize, symbol: &Symbol) -> Option<usize> {
        self.transitions[state].get(symbol).copied()
    }
}

impl Cfg {
    /// CLOSURE(I): repeatedly add `C -> ·η` for every item `B -> γ · C δ` with nonterminal C.
    pub fn closure(&self, mut items: ItemSet) -> ItemSet {
        let mut worklist: Vec<Item> = items.iter().copied().collect();
        while let Some(item) = worklist.pop() {
            let Some(Symbol::NonTerminal(c)) = item.next_symbol(self) else {
                continue;
            };
            for &index in self.productions_of(c) {
                let fresh = Item::new(index, 0);
                if items.insert(fresh) {
                    worklist.push(fresh);
                }
            }
        }
        items
    }

    /// GOTO(I, X): the closure of every item of I with the dot advanced over X. Empty when no
    /// item has X after its dot.
    pub fn goto_set(&self, items: &ItemSet, symbol: &Symbol) -> ItemSet {
        let advanced: ItemSet = items
            .iter()
            .filter(|item| item.next_symbol(self) == Some(symbol))
            .map(|item| item.advanced())
            .collect();
        if advanced.is_empty() {
            advanced
        } else {
            self.closure(advanced)
        }
    }

    /// The canonical collection, built once and cached.
    pub fn item_set_automaton(&self) -> &ItemSetAutomaton {
        self.automaton.get_or_init(|| build_automaton(self))
    }
}

fn build_automaton(cfg: &Cfg) -> ItemSetAutomaton {
    let symbols: Vec<Symbol> = cfg
        .nonterminals()
        .iter()
        .cloned()
        .map(Symbol::NonTerminal)
        .chain(cfg.terminals().iter().cloned().map(Symbol::Terminal))
        .collect();

    let start: ItemSet = cfg.closure(
        cfg.productions_of(cfg.start())
            .iter()
            .map(|&index| Item::new(index, 0))
            .collect(),
    );

    let mut states = vec![start.clone()];
    let mut index: HashMap<ItemSet, usize> = HashMap::from([(start, 0)]);
    let mut transitions: Vec<BTreeMap<Symbol, usize>> = Vec::new();
    let mut queue = VecDeque::from([0usize]);

    while let Some(at) = queue.pop_front() {
        // FIFO order means states are expanded in index order.
        debug_assert_eq!(transitions.len(), at);
        let current = states[at].clone();
        let mut row = BTreeMap::new();
        for symbol in &symbols {
            let target = cfg.goto_set(&current, symbol);
            if target.is_empty() {
                continue;
            }
            let to = match index.get(&target) {
                Some(&existing) => existing,
                None => {
                    let fresh = states.len();
                    states.push(target.clone());
                    index.insert(target, fresh);
                    queue.push_back(fresh);
                    fresh
                }
            };
            row.insert(symbol.clone(), to);
        }
        transitions.push(row);
    }

    ItemSetAutomaton {
        states,
        transitions,
    }
}
