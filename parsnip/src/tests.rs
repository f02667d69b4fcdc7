use crate::grammar::{dollar, Cfg, GrammarFile, NonTerminal, Production, Symbol, Terminal};
use crate::lexer::{Lexer, LexerRule, RuleFlags};
use crate::regex::Regex;
use crate::slr::SlrParser;
use ::regex::Regex as LibRegex;
use proptest::prelude::*;
use rand::prelude::*;
use rand::Rng;
use std::collections::BTreeSet;

fn t(name: &str) -> Terminal {
    Terminal::new(name)
}

fn nt(name: &str) -> NonTerminal {
    NonTerminal::new(name)
}

fn production(lhs: &NonTerminal, rhs: &[Symbol]) -> Production {
    Production::new(lhs.clone(), rhs.to_vec())
}

/// The arithmetic expression grammar G2 (E -> E + T | T, T -> T * F | F, F -> id | ( E )),
/// augmented. Terminal and nonterminal declaration order is the conventional one, under which
/// the canonical collection reproduces the classic textbook state numbering.
pub(crate) fn g2_cfg() -> Cfg {
    let (e, tt, f) = (nt("E"), nt("T"), nt("F"));
    let (plus, times, open, close, id) = (t("+"), t("*"), t("("), t(")"), t("id"));
    Cfg::new(
        vec![e.clone(), tt.clone(), f.clone()],
        vec![
            plus.clone(),
            times.clone(),
            open.clone(),
            close.clone(),
            id.clone(),
        ],
        vec![
            production(
                &e,
                &[
                    Symbol::NonTerminal(e.clone()),
                    Symbol::Terminal(plus),
                    Symbol::NonTerminal(tt.clone()),
                ],
            ),
            production(&e, &[Symbol::NonTerminal(tt.clone())]),
            production(
                &tt,
                &[
                    Symbol::NonTerminal(tt.clone()),
                    Symbol::Terminal(times),
                    Symbol::NonTerminal(f.clone()),
                ],
            ),
            production(&tt, &[Symbol::NonTerminal(f.clone())]),
            production(&f, &[Symbol::Terminal(id)]),
            production(
                &f,
                &[
                    Symbol::Terminal(open),
                    Symbol::NonTerminal(e.clone()),
                    Symbol::Terminal(close),
                ],
            ),
        ],
        e,
    )
    .into_augmented()
}

/// The classic nullable grammar G3' (S -> E $, E -> T E', E' -> + T E' | ε, T -> F T',
/// T' -> * F T' | ε, F -> ( E ) | id), with `$` a declared terminal and no augmentation.
pub(crate) fn g3_prime_cfg() -> Cfg {
    let (s, e, e_prime, tt, t_prime, f) = (nt("S"), nt("E"), nt("E'"), nt("T"), nt("T'"), nt("F"));
    let (plus, times, open, close, id) = (t("+"), t("*"), t("("), t(")"), t("id"));
    Cfg::new(
        vec![
            s.clone(),
            e.clone(),
            e_prime.clone(),
            tt.clone(),
            t_prime.clone(),
            f.clone(),
        ],
        vec![
            plus.clone(),
            times.clone(),
            open.clone(),
            close.clone(),
            id.clone(),
            dollar(),
        ],
        vec![
            production(
                &s,
                &[Symbol::NonTerminal(e.clone()), Symbol::Terminal(dollar())],
            ),
            production(
                &e,
                &[
                    Symbol::NonTerminal(tt.clone()),
                    Symbol::NonTerminal(e_prime.clone()),
                ],
            ),
            production(
                &e_prime,
                &[
                    Symbol::Terminal(plus),
                    Symbol::NonTerminal(tt.clone()),
                    Symbol::NonTerminal(e_prime.clone()),
                ],
            ),
            Production::empty(e_prime.clone()),
            production(
                &tt,
                &[
                    Symbol::NonTerminal(f.clone()),
                    Symbol::NonTerminal(t_prime.clone()),
                ],
            ),
            production(
                &t_prime,
                &[
                    Symbol::Terminal(times),
                    Symbol::NonTerminal(f.clone()),
                    Symbol::NonTerminal(t_prime.clone()),
                ],
            ),
            Production::empty(t_prime.clone()),
            production(
                &f,
                &[
                    Symbol::Terminal(open),
                    Symbol::NonTerminal(e.clone()),
                    Symbol::Terminal(close),
                ],
            ),
            production(&f, &[Symbol::Terminal(id)]),
        ],
        s,
    )
}

/// The five-rule keyword/identifier lexer used throughout the lexer tests.
pub(crate) fn if_then_lexer() -> Lexer {
    let rule = |name: &str, pattern: &str, flags: RuleFlags| {
        LexerRule::new(t(name), crate::parser::regex(pattern).unwrap(), flags)
    };
    Lexer::new(vec![
        rule("IF", "if", RuleFlags::default()),
        rule("THEN", "then", RuleFlags::default()),
        rule("IDENT", "[a-zA-Z]([a-zA-Z0-9])*", RuleFlags::store()),
        rule("INT", "[0-9]", RuleFlags::store()),
        rule("SKIP", "[ \\t\\n]", RuleFlags::ignore()),
    ])
}

#[test]
fn grammar_file_end_to_end() {
    let source = include_str!("../tests/test_files/g2.grammar");
    let file: GrammarFile = crate::parser::grammar(source).unwrap().try_into().unwrap();
    assert_eq!(file.name(), "G2");

    let tokens = file.tokenize("x + y * z").unwrap();
    let tree = file.parser().parse(&tokens).unwrap();
    assert_eq!(
        tree.to_string(),
        "E(E(T(F(id(x)))), +, T(T(F(id(y))), *, F(id(z))))"
    );

    // Parenthesised input exercises F -> ( E ).
    let tokens = file.tokenize("(x + y) * z").unwrap();
    let tree = file.parser().parse(&tokens).unwrap();
    assert_eq!(
        tree.to_string(),
        "E(T(T(F((, E(E(T(F(id(x)))), +, T(F(id(y)))), ))), *, F(id(z))))"
    );
}

#[test]
fn tables_are_identical_across_independent_builds() {
    let first = g2_cfg();
    let second = g2_cfg();
    assert_eq!(first.item_set_automaton(), second.item_set_automaton());
    assert_eq!(first.slr1_table(), second.slr1_table());
}

#[test]
fn first_and_follow_are_insensitive_to_declaration_order() {
    let ordered = g2_cfg();
    // The same grammar with both declaration lists reversed. Production order is kept so the
    // two grammars agree on indices; only the symbol orderings differ.
    let (e, tt, f) = (nt("E"), nt("T"), nt("F"));
    let reversed = Cfg::new(
        vec![f.clone(), tt.clone(), e.clone()],
        vec![t("id"), t(")"), t("("), t("*"), t("+")],
        ordered.productions()[..6].to_vec(),
        e.clone(),
    )
    .into_augmented();
    for symbol in [&e, &tt, &f] {
        assert_eq!(
            ordered.first(&Symbol::NonTerminal(symbol.clone())),
            reversed.first(&Symbol::NonTerminal(symbol.clone())),
            "FIRST({symbol})"
        );
        assert_eq!(
            ordered.follow(symbol),
            reversed.follow(symbol),
            "FOLLOW({symbol})"
        );
    }
}

/// Expands the start symbol to a random terminal string. Once the remaining depth reaches
/// zero, the production with the fewest nonterminals is chosen, which terminates for any
/// grammar with a terminal-only alternative on every path.
fn random_sentence(cfg: &Cfg, rng: &mut StdRng, depth: usize) -> Vec<Terminal> {
    fn expand(cfg: &Cfg, rng: &mut StdRng, head: &NonTerminal, depth: usize, out: &mut Vec<Terminal>) {
        let options = cfg.productions_of(head);
        let choice = if depth == 0 {
            options
                .iter()
                .copied()
                .min_by_key(|&index| {
                    cfg.production(index)
                        .body()
                        .iter()
                        .filter(|symbol| !symbol.is_terminal())
                        .count()
                })
                .unwrap()
        } else {
            options[rng.gen_range(0..options.len())]
        };
        for symbol in cfg.production(choice).body() {
            match symbol {
                Symbol::Terminal(terminal) => out.push(terminal.clone()),
                Symbol::NonTerminal(inner) => {
                    expand(cfg, rng, inner, depth.saturating_sub(1), out)
                }
            }
        }
    }
    let mut out = Vec::new();
    expand(cfg, rng, cfg.start(), depth, &mut out);
    out
}

#[test]
fn generated_sentences_are_accepted() {
    let cfg = g2_cfg();
    let parser = SlrParser::new(&cfg);
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..200 {
        let mut tokens = random_sentence(&cfg, &mut rng, 6);
        tokens.push(dollar());
        parser
            .parse(&tokens)
            .unwrap_or_else(|error| panic!("rejected generated sentence: {error}"));
    }
}

/// Random regexes over {a, b, c}, avoiding [Regex::Empty] so every value translates to the
/// `regex` crate for the differential test.
fn regex_strategy() -> impl Strategy<Value = Regex> {
    let leaf = prop_oneof![
        Just(Regex::Epsilon),
        prop::char::range('a', 'c').prop_map(Regex::Char),
    ];
    leaf.prop_recursive(3, 24, 2, |inner| {
        prop_oneof![
            (inner.clone(), inner.clone()).prop_map(|(lhs, rhs)| Regex::or(lhs, rhs)),
            (inner.clone(), inner.clone()).prop_map(|(lhs, rhs)| Regex::concat(lhs, rhs)),
            inner.prop_map(Regex::star),
        ]
    })
}

/// Renders an AST in the `regex` crate's syntax (total for ASTs without [Regex::Empty]).
fn lib_pattern(regex: &Regex) -> String {
    match regex {
        Regex::Empty => unreachable!("the strategy never produces Empty"),
        Regex::Epsilon => String::new(),
        Regex::Char(c) => ::regex::escape(&c.to_string()),
        Regex::Or(lhs, rhs) => format!("(?:{}|{})", lib_pattern(lhs), lib_pattern(rhs)),
        Regex::Concat(lhs, rhs) => format!("(?:{}{})", lib_pattern(lhs), lib_pattern(rhs)),
        Regex::Star(inner) => format!("(?:{})*", lib_pattern(inner)),
    }
}

proptest! {
    /// The NFA and the DFA built from it accept exactly the same strings.
    #[test]
    fn nfa_and_dfa_agree(regex in regex_strategy(), inputs in prop::collection::vec("[a-c]{0,8}", 16)) {
        let nfa = regex.to_nfa();
        let dfa = nfa.to_dfa();
        for input in &inputs {
            prop_assert_eq!(nfa.accepts(input), dfa.accepts(input), "input {:?} of {}", input, regex);
        }
    }

    /// Differential check against the `regex` crate on the translatable fragment.
    #[test]
    fn agrees_with_the_regex_crate(regex in regex_strategy(), inputs in prop::collection::vec("[a-c]{0,8}", 16)) {
        let lib = LibRegex::new(&format!("^(?:{})$", lib_pattern(&regex))).unwrap();
        let nfa = regex.to_nfa();
        for input in &inputs {
            prop_assert_eq!(nfa.accepts(input), lib.is_match(input), "input {:?} of {}", input, regex);
        }
    }

    /// Longest-match scanning never reports an accept position beyond what was consumed, and
    /// reported prefixes really are accepted.
    #[test]
    fn scan_reports_a_true_accepted_prefix(regex in regex_strategy(), input in "[a-c]{0,8}") {
        let dfa = regex.to_nfa().to_dfa();
        let scan = dfa.scan(&input);
        if let Some(length) = scan.last_accept_position {
            prop_assert!(length <= input.chars().count());
            let prefix: String = input.chars().take(length).collect();
            prop_assert!(dfa.accepts(&prefix), "prefix {:?} of {}", prefix, regex);
        }
    }

    /// The subset construction only ever mentions characters of the source alphabet.
    #[test]
    fn dfa_alphabet_matches_the_regex(regex in regex_strategy()) {
        let dfa = regex.to_nfa().to_dfa();
        let alphabet: BTreeSet<char> = dfa.alphabet().iter().copied().collect();
        prop_assert_eq!(alphabet, regex.alphabet());
    }
}
