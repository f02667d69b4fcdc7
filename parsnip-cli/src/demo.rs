//! Small self-contained demonstrations of the toolkit's components, one per CLI flag.

use parsnip::grammar::{dollar, Symbol, Terminal};
use parsnip::lexer::{Lexer, LexerRule, RuleFlags};
use parsnip::nfa::Nfa;
use parsnip::slr::SlrParser;

const G2_SOURCE: &str = include_str!("g2.grammar");

pub fn regex_demo() {
    println!("== regex ==");
    let pattern = "0(0)*1(0+1)";
    let regex = parsnip::parser::regex(pattern).unwrap();
    println!("pattern: {pattern}");
    println!("parsed:  {regex}");
    for input in ["011", "00010", "0110", "10"] {
        let verdict = if regex.matches(input) { "accept" } else { "reject" };
        println!("  {input:>6}  {verdict}");
    }
}

pub fn nfa_demo() {
    println!("== nfa ==");
    let keyword = parsnip::parser::regex("if").unwrap().to_nfa_tagged("IF");
    let ident = parsnip::parser::regex("[a-z]([a-z])*")
        .unwrap()
        .to_nfa_tagged("IDENT");
    let merged = Nfa::merge(vec![keyword, ident]);
    println!(
        "merged automaton: {} states over {:?}",
        merged.states().len(),
        merged.alphabet()
    );
    for input in ["if", "ifx", "x", "if0"] {
        let scan = merged.scan(input);
        println!(
            "  {input:>4}  longest accept: {:?} as {:?}",
            scan.last_accept_position, scan.last_accept_tag
        );
    }
}

pub fn dfa_demo() {
    println!("== dfa ==");
    let nfa = parsnip::parser::regex("(a+b)(ab)*").unwrap().to_nfa_tagged("X");
    let dfa = nfa.to_dfa();
    println!(
        "subset construction: {} NFA states -> {} DFA states",
        nfa.states().len(),
        dfa.states().len()
    );
    for input in ["a", "bab", "aabab", "ba"] {
        println!("  {input:>6}  accepted: {}", dfa.accepts(input));
    }
    let scan = dfa.scan("babxyz");
    println!(
        "  longest match in \"babxyz\": {:?} characters",
        scan.last_accept_position
    );
}

pub fn lexer_demo() {
    println!("== lexer ==");
    let rule = |name: &str, pattern: &str, flags: RuleFlags| {
        LexerRule::new(
            Terminal::new(name),
            parsnip::parser::regex(pattern).unwrap(),
            flags,
        )
    };
    let lexer = Lexer::new(vec![
        rule("IF", "if", RuleFlags::default()),
        rule("THEN", "then", RuleFlags::default()),
        rule("IDENT", "[a-zA-Z]([a-zA-Z0-9])*", RuleFlags::store()),
        rule("INT", "[0-9]", RuleFlags::store()),
        rule("SKIP", "[ \\t\\n]", RuleFlags::ignore()),
    ]);
    let input = "if x then y";
    let tokens = lexer.lex(input).unwrap();
    let rendered: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
    println!("lex {input:?} -> [{}]", rendered.join(", "));
}

pub fn cfg_demo() {
    println!("== cfg ==");
    let file: parsnip::grammar::GrammarFile = parsnip::parser::grammar(G2_SOURCE)
        .unwrap()
        .try_into()
        .unwrap();
    let cfg = file.augmented_cfg();

    println!("grammar {} (augmented start {})", file.name(), cfg.start());
    for n in cfg.nonterminals() {
        let symbol = Symbol::NonTerminal(n.clone());
        let first: Vec<String> = cfg.first(&symbol).iter().map(|t| t.to_string()).collect();
        let follow: Vec<String> = cfg.follow(n).iter().map(|t| t.to_string()).collect();
        println!(
            "  {n}: nullable={} FIRST={{{}}} FOLLOW={{{}}}",
            cfg.is_nullable(&symbol),
            first.join(", "),
            follow.join(", ")
        );
    }
    println!("left-recursive: {}", cfg.is_left_recursive());
    println!();
    println!("{}", cfg.slr1_table().render(cfg));

    let parser = SlrParser::new(cfg);
    let mut tokens: Vec<Terminal> = ["id", "*", "id"].iter().map(|n| Terminal::new(*n)).collect();
    tokens.push(dollar());
    println!();
    println!("parse id * id -> {}", parser.parse(&tokens).unwrap());
}
