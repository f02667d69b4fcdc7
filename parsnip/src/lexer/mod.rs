//! # Lexical scanner
//! A [Lexer] is built from an ordered list of [LexerRule]s (token name, regular expression,
//! flags). Construction builds one tagged NFA per rule, merges them in rule order and converts
//! the union to a single DFA; scanning then repeatedly takes the longest match from the current
//! offset. Ties on length are broken by rule order — the earlier rule wins — which is why a
//! keyword rule listed before an identifier rule claims the literal `if` even though the
//! identifier rule matches it too.
//!
//! Flags control what a match emits: `IGNORE` discards it (whitespace, comments), `STORE` keeps
//! the matched lexeme as the token's value, and a plain rule emits the bare token name.
//!
//! ## Example
//! ```
//! use parsnip::grammar::Terminal;
//! use parsnip::lexer::{Lexer, LexerRule, RuleFlags};
//!
//! let lexer = Lexer::new(vec![
//!     LexerRule::new(Terminal::new("IF"), parsnip::parser::regex("if").unwrap(), RuleFlags::default()),
//!     LexerRule::new(Terminal::new("IDENT"), parsnip::parser::regex("[a-z]([a-z])*").unwrap(), RuleFlags::store()),
//!     LexerRule::new(Terminal::new("WS"), parsnip::parser::regex(" ").unwrap(), RuleFlags::ignore()),
//! ]);
//! let tokens = lexer.lex("if x").unwrap();
//! assert_eq!(tokens, vec![Terminal::new("IF"), Terminal::with_value("IDENT", "x")]);
//! ```

use std::rc::Rc;

use thiserror::Error;

use crate::dfa::Dfa;
use crate::grammar::Terminal;
use crate::nfa::Nfa;
use crate::regex::Regex;

/// What to do with a matched lexeme. `STORE` and `IGNORE` are mutually exclusive in the grammar
/// file format; a rule with neither emits the bare token.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RuleFlags {
    pub store: bool,
    pub ignore: bool,
}

impl RuleFlags {
    pub fn store() -> Self {
        RuleFlags {
            store: true,
            ignore: false,
        }
    }

    pub fn ignore() -> Self {
        RuleFlags {
            store: false,
            ignore: true,
        }
    }
}

/// One lexer rule: the terminal it produces, the regular expression it matches and its flags.
#[derive(Clone, Debug)]
pub struct LexerRule {
    pub terminal: Terminal,
    pub regex: Regex,
    pub flags: RuleFlags,
}

impl LexerRule {
    pub fn new(terminal: Terminal, regex: Regex, flags: RuleFlags) -> Self {
        LexerRule {
            terminal,
            regex,
            flags,
        }
    }
}

/// No rule matched at the given offset.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("no token matches at offset {offset} (next character is {next:?})")]
pub struct LexerError {
    /// Offset in characters from the start of the input.
    pub offset: usize,
    /// The character at that offset.
    pub next: char,
}

/// A priority-ordered, longest-match scanner driven by one combined DFA.
#[derive(Clone, Debug)]
pub struct Lexer {
    rules: Vec<LexerRule>,
    dfa: Dfa,
}

impl Lexer {
    /// Compiles the rules into a single DFA: one tagged NFA per rule, merged in rule order
    /// (which embeds the priority ranking), then the subset construction.
    pub fn new(rules: Vec<LexerRule>) -> Self {
        let nfas = rules
            .iter()
            .map(|rule| rule.regex.to_nfa_tagged(rule.terminal.name()))
            .collect();
        let dfa = Nfa::merge(nfas).to_dfa();
        Lexer { rules, dfa }
    }

    /// Scans the whole input into tokens. Each round takes the longest match from the current
    /// offset; a round that accepts zero characters (including a zero-length match) fails with
    /// [LexerError] so the scanner always makes progress.
    pub fn lex(&self, input: &str) -> Result<Vec<Terminal>, LexerError> {
        let mut tokens = Vec::new();
        let mut offset = 0usize; // in characters, for error reporting
        let mut at = 0usize; // in bytes, for slicing
        while at < input.len() {
            let rest = &input[at..];
            let scan = self.dfa.scan(rest);
            let accepted = scan.last_accept_position.unwrap_or(0);
            if accepted == 0 {
                return Err(LexerError {
                    offset,
                    next: rest.chars().next().expect("rest is non-empty"),
                });
            }
            let bytes = rest
                .char_indices()
                .nth(accepted)
                .map(|(index, _)| index)
                .unwrap_or(rest.len());
            let tag = scan
                .last_accept_tag
                .expect("every accept state of a lexer DFA carries a rule tag");
            let rule = self
                .rule_for(&tag)
                .expect("scan tags refer to a lexer rule");
            if !rule.flags.ignore {
                if rule.flags.store {
                    tokens.push(Terminal::with_value(rule.terminal.name(), &rest[..bytes]));
                } else {
                    tokens.push(Terminal::new(rule.terminal.name()));
                }
            }
            offset += accepted;
            at += bytes;
        }
        Ok(tokens)
    }

    fn rule_for(&self, tag: &Rc<str>) -> Option<&LexerRule> {
        self.rules
            .iter()
            .find(|rule| rule.terminal.name() == tag.as_ref())
    }

    pub fn rules(&self) -> &[LexerRule] {
        &self.rules
    }

    /// The combined DFA driving the scanner.
    pub fn dfa(&self) -> &Dfa {
        &self.dfa
    }
}
