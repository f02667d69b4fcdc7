//! # SLR(1) table construction
//! Builds the ACTION and GOTO tables from the canonical LR(0) collection and the FOLLOW sets:
//! terminal transitions become shifts, complete items reduce under every terminal in the FOLLOW
//! set of their LHS, and the complete start item accepts under `$`. Cells hold a *list* of
//! actions: a well-formed SLR(1) grammar never puts more than one action in a cell, and longer
//! lists are exactly the shift-reduce and reduce-reduce conflicts, kept in the table so they can
//! be inspected with [Slr1Table::conflicts] (the driver refuses to execute them).

use std::collections::BTreeMap;
use std::fmt;

use crate::grammar::{dollar, Cfg, NonTerminal, Symbol, Terminal};
use crate::table::Table;

pub use driver::{ConflictError, ParseError, ParseTree, SlrParser};

pub mod driver;

const NO_ACTIONS: &[Action] = &[];

/// One entry of an ACTION cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    /// Consume the lookahead and enter the given state.
    Shift(usize),
    /// Reduce by the production with this index in [Cfg::productions].
    Reduce(usize),
    /// The input is a sentence of the grammar.
    Accept,
}

impl Action {
    /// Long form naming the production, for diagnostics.
    pub fn describe(&self, cfg: &Cfg) -> String {
        match self {
            Action::Shift(state) => format!("shift {state}"),
            Action::Reduce(index) => format!("reduce {}", cfg.production(*index)),
            Action::Accept => "accept".to_string(),
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Action::Shift(state) => write!(f, "s{state}"),
            Action::Reduce(index) => write!(f, "r{index}"),
            Action::Accept => write!(f, "acc"),
        }
    }
}

/// A cell holding more than one action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Conflict {
    pub state: usize,
    pub lookahead: Terminal,
    pub actions: Vec<Action>,
}

/// The SLR(1) ACTION and GOTO tables. Rows are item-set automaton states; absent entries are
/// the error cases (empty ACTION cell, no GOTO target).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slr1Table {
    pub(crate) action: Vec<BTreeMap<Terminal, Vec<Action>>>,
    pub(crate) goto: Vec<BTreeMap<NonTerminal, usize>>,
}

impl Slr1Table {
    /// The action list for a state and lookahead; empty when the cell is empty.
    pub fn actions(&self, state: usize, lookahead: &Terminal) -> &[Action] {
        self.action[state]
            .get(lookahead)
            .map(Vec::as_slice)
            .unwrap_or(NO_ACTIONS)
    }

    /// The GOTO target for a state and nonterminal, if any.
    pub fn goto_state(&self, state: usize, nonterminal: &NonTerminal) -> Option<usize> {
        self.goto[state].get(nonterminal).copied()
    }

    /// The terminals with a non-empty ACTION cell in the given state, in name order. This is
    /// what a parse error reports as "expected".
    pub fn expected_terminals(&self, state: usize) -> Vec<Terminal> {
        self.action[state]
            .iter()
            .filter(|(_, actions)| !actions.is_empty())
            .map(|(t, _)| t.clone())
            .collect()
    }

    /// Number of table rows (= item-set automaton states).
    pub fn len(&self) -> usize {
        self.action.len()
    }

    pub fn is_empty(&self) -> bool {
        self.action.is_empty()
    }

    /// Every cell with more than one action, in (state, lookahead) order.
    pub fn conflicts(&self) -> Vec<Conflict> {
        self.action
            .iter()
            .enumerate()
            .flat_map(|(state, row)| {
                row.iter()
                    .filter(|(_, actions)| actions.len() > 1)
                    .map(move |(lookahead, actions)| Conflict {
                        state,
                        lookahead: lookahead.clone(),
                        actions: actions.clone(),
                    })
            })
            .collect()
    }

    /// Renders both tables side by side: one row per state, ACTION columns for every terminal
    /// (plus `$`), GOTO columns for every nonterminal. Conflicted cells are `/`-separated.
    pub fn render(&self, cfg: &Cfg) -> String {
        let mut columns: Vec<Terminal> = cfg.terminals().to_vec();
        if !columns.iter().any(|t| t.is_dollar()) {
            columns.push(dollar());
        }
        let mut table = Table::default();
        let mut header = vec![String::new()];
        header.extend(columns.iter().map(|t| t.name().to_string()));
        header.extend(cfg.nonterminals().iter().map(|n| n.name().to_string()));
        table.push_row(header);
        for state in 0..self.len() {
            let mut row = vec![state.to_string()];
            for t in &columns {
                let cell = self
                    .actions(state, t)
                    .iter()
                    .map(Action::to_string)
                    .collect::<Vec<_>>()
                    .join("/");
                row.push(cell);
            }
            for n in cfg.nonterminals() {
                row.push(
                    self.goto_state(state, n)
                        .map(|s| s.to_string())
                        .unwrap_or_default(),
                );
            }
            table.push_row(row);
        }
        table.to_string("  ")
    }
}

impl Cfg {
    /// The SLR(1) tables, built once from the item-set automaton and the FOLLOW sets and cached.
    pub fn slr1_table(&self) -> &Slr1Table {
        self.table.get_or_init(|| build_table(self))
    }
}

fn build_table(cfg: &Cfg) -> Slr1Table {
    let automaton = cfg.item_set_automaton();
    let mut action: Vec<BTreeMap<Terminal, Vec<Action>>> = Vec::with_capacity(automaton.len());
    let mut goto: Vec<BTreeMap<NonTerminal, usize>> = Vec::with_capacity(automaton.len());

    for (state, items) in automaton.states().iter().enumerate() {
        let mut action_row: BTreeMap<Terminal, Vec<Action>> = BTreeMap::new();
        let mut goto_row: BTreeMap<NonTerminal, usize> = BTreeMap::new();

        for (symbol, &target) in automaton.transitions(state) {
            match symbol {
                Symbol::Terminal(t) => action_row
                    .entry(t.clone())
                    .or_default()
                    .push(Action::Shift(target)),
                Symbol::NonTerminal(n) => {
                    goto_row.insert(n.clone(), target);
                }
            }
        }

        for item in items {
            if !item.is_complete(cfg) {
                continue;
            }
            let production = cfg.production(item.production());
            if production.lhs() == cfg.start() {
                action_row.entry(dollar()).or_default().push(Action::Accept);
            } else {
                for lookahead in cfg.follow(production.lhs()) {
                    action_row
                        .entry(lookahead.clone())
                        .or_default()
                        .push(Action::Reduce(item.production()));
                }
            }
        }

        action.push(action_row);
        goto.push(goto_row);
    }

    Slr1Table { action, goto }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::{Production, Symbol};
    use crate::tests::g2_cfg;

    fn t(name: &str) -> Terminal {
        Terminal::new(name)
    }

    #[test]
    fn g2_table_matches_the_classic_numbering() {
        let cfg = g2_cfg();
        let table = cfg.slr1_table();
        assert_eq!(table.len(), 12);
        assert!(table.conflicts().is_empty());

        // State 0 shifts on ( and id only.
        assert_eq!(table.actions(0, &t("(")), &[Action::Shift(4)]);
        assert_eq!(table.actions(0, &t("id")), &[Action::Shift(5)]);
        assert!(table.actions(0, &t("+")).is_empty());

        // State 1 accepts on $ and shifts + to state 6.
        assert_eq!(table.actions(1, &dollar()), &[Action::Accept]);
        assert_eq!(table.actions(1, &t("+")), &[Action::Shift(6)]);

        // State 9 reduces by E -> E + T (production 0) on +, ) and $, and shifts * to 7.
        for lookahead in ["+", ")", "$"] {
            assert_eq!(table.actions(9, &t(lookahead)), &[Action::Reduce(0)]);
        }
        assert_eq!(table.actions(9, &t("*")), &[Action::Shift(7)]);
    }

    #[test]
    fn g2_goto_rows() {
        let cfg = g2_cfg();
        let table = cfg.slr1_table();
        let e = NonTerminal::new("E");
        let tt = NonTerminal::new("T");
        let f = NonTerminal::new("F");
        assert_eq!(table.goto_state(0, &e), Some(1));
        assert_eq!(table.goto_state(0, &tt), Some(2));
        assert_eq!(table.goto_state(0, &f), Some(3));
        assert_eq!(table.goto_state(4, &e), Some(8));
        assert_eq!(table.goto_state(6, &tt), Some(9));
        assert_eq!(table.goto_state(7, &f), Some(10));
        assert_eq!(table.goto_state(1, &e), None);
    }

    #[test]
    fn expected_terminals_reports_non_empty_cells() {
        let cfg = g2_cfg();
        let table = cfg.slr1_table();
        // State 7 is T -> T * · F: only id and ( can follow.
        assert_eq!(table.expected_terminals(7), vec![t("("), t("id")]);
    }

    #[test]
    fn ambiguous_grammar_produces_conflicts() {
        // E -> E + E | id is ambiguous: after E + E with lookahead +, both
        // shifting and reducing are justified.
        let e = NonTerminal::new("E");
        let cfg = Cfg::new(
            vec![e.clone()],
            vec![t("+"), t("id")],
            vec![
                Production::new(
                    e.clone(),
                    vec![
                        Symbol::NonTerminal(e.clone()),
                        Symbol::Terminal(t("+")),
                        Symbol::NonTerminal(e.clone()),
                    ],
                ),
                Production::new(e.clone(), vec![Symbol::Terminal(t("id"))]),
            ],
            e,
        )
        .into_augmented();
        let conflicts = cfg.slr1_table().conflicts();
        assert!(!conflicts.is_empty());
        let conflict = &conflicts[0];
        assert_eq!(conflict.lookahead, t("+"));
        assert!(conflict.actions.len() > 1);
    }

    #[test]
    fn render_includes_every_state() {
        let cfg = g2_cfg();
        let rendered = cfg.slr1_table().render(&cfg);
        assert_eq!(rendered.lines().count(), 13); // header + 12 states
        assert!(rendered.contains("acc"));
    }
}
