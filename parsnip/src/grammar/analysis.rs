//! Fixed-point grammar analyses: nullability, FIRST and FOLLOW sets, the LL(1) diagnostic table
//! and the left/right recursion predicates. Results are cached on the [Cfg] on first access.
//!
//! Nullability is definitional rather than a separate fixpoint: a symbol is nullable iff
//! `ε ∈ FIRST(X)`. FIRST converges monotonically from the empty sets, which makes the mutual
//! recursion between per-symbol FIRST and FIRST over symbol strings safe, and sidesteps the
//! degenerate self-cycles a standalone nullability pass has to special-case.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::grammar::{dollar, epsilon, Cfg, NonTerminal, Symbol, Terminal};
use crate::table::Table;

/// The cached fixpoint results: FIRST and FOLLOW for every nonterminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Analysis {
    pub(crate) first: HashMap<NonTerminal, BTreeSet<Terminal>>,
    pub(crate) follow: HashMap<NonTerminal, BTreeSet<Terminal>>,
}

impl Analysis {
    fn compute(cfg: &Cfg) -> Analysis {
        // FIRST: iterate FIRST(A) ⊇ ⋃ FIRST(rhs) to a fixed point, visiting nonterminals in
        // declaration order so the iteration is deterministic.
        let mut first: HashMap<NonTerminal, BTreeSet<Terminal>> = cfg
            .nonterminals()
            .iter()
            .map(|n| (n.clone(), BTreeSet::new()))
            .collect();
        let mut changed = true;
        while changed {
            changed = false;
            for n in cfg.nonterminals() {
                let mut additions = BTreeSet::new();
                for &index in cfg.productions_of(n) {
                    additions.extend(string_first(&first, cfg.production(index).rhs()));
                }
                let current = first.get_mut(n).unwrap();
                if !additions.is_subset(current) {
                    changed = true;
                    current.extend(additions);
                }
            }
        }

        // FOLLOW, phase one: collect the FIRST-based additions and record an edge A -> X for
        // every obligation FOLLOW(X) ⊇ FOLLOW(A) (X at the end of a rule for A, or followed
        // only by nullable symbols).
        let mut follow: HashMap<NonTerminal, BTreeSet<Terminal>> = cfg
            .nonterminals()
            .iter()
            .map(|n| (n.clone(), BTreeSet::new()))
            .collect();
        follow.get_mut(cfg.start()).unwrap().insert(dollar());

        let mut edges: Vec<(NonTerminal, NonTerminal)> = Vec::new();
        for production in cfg.productions() {
            let body = production.body();
            for (at, sym) in body.iter().enumerate() {
                let Symbol::NonTerminal(x) = sym else {
                    continue;
                };
                let beta = &body[at + 1..];
                let mut beta_first = string_first(&first, beta);
                let beta_nullable = beta_first.remove(&epsilon());
                follow.get_mut(x).unwrap().extend(beta_first);
                if beta_nullable {
                    edges.push((production.lhs().clone(), x.clone()));
                }
            }
        }

        // Phase two: iterate the recorded edges to a fixed point.
        let mut changed = true;
        while changed {
            changed = false;
            for (a, x) in &edges {
                if a == x {
                    continue;
                }
                let additions: Vec<Terminal> = follow[a].difference(&follow[x]).cloned().collect();
                if !additions.is_empty() {
                    changed = true;
                    follow.get_mut(x).unwrap().extend(additions);
                }
            }
        }

        Analysis { first, follow }
    }
}

/// FIRST over a string of symbols, against a (possibly partial) FIRST map:
/// FIRST(ε) = {ε}; FIRST(a) = {a}; FIRST(Xβ) = (FIRST(X) \ {ε}) ∪ (FIRST(β) if X nullable),
/// plus ε iff the whole string is nullable. The empty string yields {ε}.
fn string_first(
    first: &HashMap<NonTerminal, BTreeSet<Terminal>>,
    symbols: &[Symbol],
) -> BTreeSet<Terminal> {
    let mut out = BTreeSet::new();
    let mut all_nullable = true;
    for sym in symbols {
        match sym {
            Symbol::Terminal(t) if t.is_epsilon() => {}
            Symbol::Terminal(t) => {
                out.insert(t.clone());
                all_nullable = false;
                break;
            }
            Symbol::NonTerminal(n) => {
                let f = &first[n];
                out.extend(f.iter().filter(|t| !t.is_epsilon()).cloned());
                if !f.contains(&epsilon()) {
                    all_nullable = false;
                    break;
                }
            }
        }
    }
    if all_nullable {
        out.insert(epsilon());
    }
    out
}

impl Cfg {
    pub(crate) fn analysis(&self) -> &Analysis {
        self.analysis.get_or_init(|| Analysis::compute(self))
    }

    /// Whether the symbol derives the empty string. For a terminal this holds only for ε itself.
    pub fn is_nullable(&self, symbol: &Symbol) -> bool {
        match symbol {
            Symbol::Terminal(t) => t.is_epsilon(),
            Symbol::NonTerminal(n) => self.analysis().first[n].contains(&epsilon()),
        }
    }

    /// Whether every symbol of the string is nullable (trivially true for the empty string).
    pub fn is_nullable_string(&self, symbols: &[Symbol]) -> bool {
        symbols.iter().all(|s| self.is_nullable(s))
    }

    /// FIRST of a single symbol.
    pub fn first(&self, symbol: &Symbol) -> BTreeSet<Terminal> {
        match symbol {
            Symbol::Terminal(t) => BTreeSet::from([t.clone()]),
            Symbol::NonTerminal(n) => self.analysis().first[n].clone(),
        }
    }

    /// FIRST of a string of symbols.
    pub fn first_of_string(&self, symbols: &[Symbol]) -> BTreeSet<Terminal> {
        string_first(&self.analysis().first, symbols)
    }

    /// FOLLOW of a nonterminal.
    pub fn follow(&self, nonterminal: &NonTerminal) -> &BTreeSet<Terminal> {
        self.analysis()
            .follow
            .get(nonterminal)
            .unwrap_or_else(|| panic!("{nonterminal} is not a declared nonterminal"))
    }

    /// Builds the LL(1) parse table. The table is a diagnostic: the SLR(1) driver does not use
    /// it, cells keep every applicable production so conflicts stay observable, and
    /// left-recursive grammars are accepted (they simply produce conflicting cells).
    pub fn ll1_table(&self) -> Ll1Table {
        let mut cells: BTreeMap<(NonTerminal, Terminal), Vec<usize>> = BTreeMap::new();
        for (index, production) in self.productions().iter().enumerate() {
            let mut first = self.first_of_string(production.rhs());
            let nullable = first.remove(&epsilon());
            for t in first {
                cells
                    .entry((production.lhs().clone(), t))
                    .or_default()
                    .push(index);
            }
            if nullable {
                for b in self.follow(production.lhs()) {
                    cells
                        .entry((production.lhs().clone(), b.clone()))
                        .or_default()
                        .push(index);
                }
            }
        }
        Ll1Table { cells }
    }

    /// Whether some rule `A -> αAβ` has nullable α.
    pub fn is_left_recursive(&self) -> bool {
        self.has_recursion(|body, at| &body[..at])
    }

    /// Whether some rule `A -> αAβ` has nullable β.
    pub fn is_right_recursive(&self) -> bool {
        self.has_recursion(|body, at| &body[at + 1..])
    }

    fn has_recursion<'a>(&'a self, context: impl Fn(&'a [Symbol], usize) -> &'a [Symbol]) -> bool {
        self.productions().iter().any(|production| {
            let body = production.body();
            body.iter().enumerate().any(|(at, sym)| {
                sym.as_nonterminal() == Some(production.lhs())
                    && self.is_nullable_string(context(body, at))
            })
        })
    }
}

/// The LL(1) parse table: for each (nonterminal, lookahead) cell, the indices of the applicable
/// productions in [Cfg::productions] order. A well-formed LL(1) grammar has at most one entry
/// per cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ll1Table {
    pub(crate) cells: BTreeMap<(NonTerminal, Terminal), Vec<usize>>,
}

impl Ll1Table {
    /// Production indices applicable for the given nonterminal and lookahead.
    pub fn productions_for(&self, nonterminal: &NonTerminal, lookahead: &Terminal) -> &[usize] {
        self.cells
            .get(&(nonterminal.clone(), lookahead.clone()))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Cells holding more than one production.
    pub fn conflicts(&self) -> Vec<(NonTerminal, Terminal, Vec<usize>)> {
        self.cells
            .iter()
            .filter(|(_, productions)| productions.len() > 1)
            .map(|((n, t), productions)| (n.clone(), t.clone(), productions.clone()))
            .collect()
    }

    pub fn is_ll1(&self) -> bool {
        self.conflicts().is_empty()
    }

    /// Renders the table with nonterminal rows and terminal columns; cells list production
    /// indices, `/`-separated when a cell conflicts.
    pub fn render(&self, cfg: &Cfg) -> String {
        let mut columns: Vec<Terminal> = cfg.terminals().to_vec();
        if !columns.iter().any(|t| t.is_dollar()) {
            columns.push(dollar());
        }
        let mut table = Table::default();
        let mut header = vec![String::new()];
        header.extend(columns.iter().map(|t| t.name().to_string()));
        table.push_row(header);
        for n in cfg.nonterminals() {
            let mut row = vec![n.name().to_string()];
            for t in &columns {
                let cell = self
                    .productions_for(n, t)
                    .iter()
                    .map(usize::to_string)
                    .collect::<Vec<_>>()
                    .join("/");
                row.push(cell);
            }
            table.push_row(row);
        }
        table.to_string("  ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tests::{g2_cfg, g3_prime_cfg};

    fn nt(name: &str) -> NonTerminal {
        NonTerminal::new(name)
    }

    fn terminals(names: &[&str]) -> BTreeSet<Terminal> {
        names.iter().map(|n| Terminal::new(*n)).collect()
    }

    #[test]
    fn g3_prime_nullability() {
        let cfg = g3_prime_cfg();
        let expected = [
            ("S", false),
            ("E", false),
            ("E'", true),
            ("T", false),
            ("T'", true),
            ("F", false),
        ];
        for (name, nullable) in expected {
            assert_eq!(
                cfg.is_nullable(&Symbol::NonTerminal(nt(name))),
                nullable,
                "nullable({name})"
            );
        }
    }

    #[test]
    fn g3_prime_first_sets() {
        let cfg = g3_prime_cfg();
        assert_eq!(
            cfg.first(&Symbol::NonTerminal(nt("E'"))),
            terminals(&["+", "ε"])
        );
        assert_eq!(
            cfg.first(&Symbol::NonTerminal(nt("T'"))),
            terminals(&["*", "ε"])
        );
        assert_eq!(
            cfg.first(&Symbol::NonTerminal(nt("F"))),
            terminals(&["(", "id"])
        );
        assert_eq!(
            cfg.first(&Symbol::NonTerminal(nt("E"))),
            terminals(&["(", "id"])
        );
    }

    #[test]
    fn g3_prime_follow_sets() {
        let cfg = g3_prime_cfg();
        assert_eq!(cfg.follow(&nt("E")), &terminals(&["$", ")"]));
        assert_eq!(cfg.follow(&nt("T")), &terminals(&["+", "$", ")"]));
        assert_eq!(cfg.follow(&nt("F")), &terminals(&["*", "+", "$", ")"]));
    }

    #[test]
    fn first_of_string_matches_unfolding() {
        let cfg = g3_prime_cfg();
        // FIRST(T' E') = (FIRST(T') \ {ε}) ∪ FIRST(E') since T' is nullable,
        // with ε kept because both are nullable.
        let string = [Symbol::NonTerminal(nt("T'")), Symbol::NonTerminal(nt("E'"))];
        assert_eq!(cfg.first_of_string(&string), terminals(&["*", "+", "ε"]));
        // A leading terminal cuts the string off.
        let string = [
            Symbol::Terminal(Terminal::new("id")),
            Symbol::NonTerminal(nt("E'")),
        ];
        assert_eq!(cfg.first_of_string(&string), terminals(&["id"]));
        assert_eq!(cfg.first_of_string(&[]), terminals(&["ε"]));
    }

    #[test]
    fn recursion_predicates() {
        assert!(g2_cfg().is_left_recursive());
        assert!(!g2_cfg().is_right_recursive());
        assert!(!g3_prime_cfg().is_left_recursive());
        assert!(g3_prime_cfg().is_right_recursive());
    }

    #[test]
    fn ll1_table_flags_left_recursion_as_conflicts() {
        let cfg = g2_cfg();
        let table = cfg.ll1_table();
        assert!(!table.is_ll1());
        // E -> E + T and E -> T both predict on FIRST(E) = {(, id}.
        assert_eq!(table.productions_for(&nt("E"), &Terminal::new("id")).len(), 2);
    }

    #[test]
    fn ll1_table_of_ll1_grammar_is_clean() {
        let cfg = g3_prime_cfg();
        let table = cfg.ll1_table();
        assert!(table.is_ll1(), "conflicts: {:?}", table.conflicts());
        // E' -> + T E' on +, E' -> ε on FOLLOW(E') = {$, )}.
        assert_eq!(
            table.productions_for(&nt("E'"), &Terminal::new("+")).len(),
            1
        );
        assert_eq!(table.productions_for(&nt("E'"), &dollar()).len(), 1);
        assert_eq!(
            table.productions_for(&nt("E'"), &Terminal::new(")")).len(),
            1
        );
    }
}
